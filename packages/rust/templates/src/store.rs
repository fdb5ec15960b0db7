//! Read-only inventory of installed `.docx` templates.
//!
//! The store is a flat directory of `{name}.docx` artifacts. Generation
//! consults it only for existence checks and reads; installing or removing
//! templates is a separate concern handled outside this crate.

use std::path::{Path, PathBuf};

use tracing::debug;

use opagen_shared::{OpagenError, Result};

/// Extension every stored template must carry.
const TEMPLATE_EXTENSION: &str = "docx";

/// A directory of installed document templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

/// One installed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    /// Name used to request the template (file stem).
    pub name: String,
    /// File name within the store.
    pub file_name: String,
}

impl TemplateStore {
    /// Open a store rooted at `root`. The directory need not exist; a
    /// missing store simply has no templates.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `name` to an installed template path, if one exists.
    ///
    /// Names are plain identifiers; anything containing a path separator
    /// cannot match.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return None;
        }
        let path = self.root.join(format!("{name}.{TEMPLATE_EXTENSION}"));
        if path.is_file() { Some(path) } else { None }
    }

    /// Read an installed template's bytes.
    ///
    /// An unreadable artifact is a render-path failure, not grounds for
    /// falling back to the scratch-build path.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self
            .find(name)
            .ok_or_else(|| OpagenError::template(format!("template '{name}' is not installed")))?;
        std::fs::read(&path).map_err(|e| {
            OpagenError::template(format!("template '{}' unreadable: {e}", path.display()))
        })
    }

    /// List installed templates, sorted by name.
    pub fn list(&self) -> Result<Vec<TemplateInfo>> {
        if !self.root.is_dir() {
            debug!(root = %self.root.display(), "template store directory absent");
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| OpagenError::artifact_io(&self.root, e))?;

        let mut templates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| OpagenError::artifact_io(&self.root, e))?;
            let path = entry.path();
            let is_template = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION));
            if !is_template {
                continue;
            }
            if let (Some(stem), Some(file_name)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
            ) {
                templates.push(TemplateInfo {
                    name: stem.to_string(),
                    file_name: file_name.to_string(),
                });
            }
        }

        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }
}
