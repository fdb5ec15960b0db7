//! Generation dispatcher: template-vs-scratch selection and output
//! artifact lifecycle.
//!
//! One generation call acquires exactly one ephemeral scratch file. The
//! returned [`OutputArtifact`] owns it; dropping the artifact (on any
//! failure path included) deletes the file, so no dangling output is ever
//! left behind. Callers keep the document by persisting the artifact into
//! a destination directory.

use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use opagen_docx::write_docx;
use opagen_shared::{Agreement, OpagenError, Result};
use opagen_templates::{TemplateStore, TemplatingEngine, TeraDocxEngine};

use crate::context::build_context;
use crate::sections;

/// Which path produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMethod {
    /// Substituted into an installed template.
    Template,
    /// Built section-by-section from scratch.
    ScratchBuild,
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMethod::Template => write!(f, "template"),
            GenerationMethod::ScratchBuild => write!(f, "scratch-build"),
        }
    }
}

/// The document assembly engine: template store plus an injected
/// templating capability.
pub struct Generator {
    store: TemplateStore,
    engine: Box<dyn TemplatingEngine>,
}

impl Generator {
    /// Assemble a generator from its collaborators.
    pub fn new(store: TemplateStore, engine: Box<dyn TemplatingEngine>) -> Self {
        Self { store, engine }
    }

    /// Generator with the shipped Tera-backed `.docx` engine.
    pub fn with_tera(store: TemplateStore) -> Self {
        Self::new(store, Box::new(TeraDocxEngine::new()))
    }

    /// Generate the agreement document.
    ///
    /// If `template_name` resolves in the store the template path is taken;
    /// template absence (not render failure) selects the scratch-build
    /// path. The input record is read-only throughout.
    #[instrument(skip_all, fields(company = %agreement.company_name, template = template_name))]
    pub fn generate(&self, agreement: &Agreement, template_name: &str) -> Result<OutputArtifact> {
        let start = Instant::now();

        validate_required(agreement)?;
        let context = build_context(agreement);

        let (bytes, method) = match self.store.find(template_name) {
            Some(path) => {
                debug!(path = %path.display(), "template found, rendering");
                let template = self.store.read(template_name)?;
                let rendered = self.engine.render(&template, &context)?;
                (rendered, GenerationMethod::Template)
            }
            None => {
                debug!("no template installed, building from scratch");
                let document = sections::build(agreement);
                (write_docx(&document)?, GenerationMethod::ScratchBuild)
            }
        };

        let artifact = OutputArtifact::create(&agreement.company_name, bytes, method)?;

        info!(
            id = %artifact.id,
            file_name = %artifact.file_name,
            size = artifact.size_bytes,
            method = %artifact.method,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "document generated"
        );

        Ok(artifact)
    }

    /// The template inventory this generator consults.
    pub fn store(&self) -> &TemplateStore {
        &self.store
    }
}

/// Required-field check. Dates are structurally required by the record
/// type; the string fields must additionally be non-blank.
fn validate_required(agreement: &Agreement) -> Result<()> {
    if agreement.company_name.trim().is_empty() {
        return Err(OpagenError::missing_field("company_name"));
    }
    if agreement.manager_name.trim().is_empty() {
        return Err(OpagenError::missing_field("manager_name"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output artifact
// ---------------------------------------------------------------------------

/// One generated document, backed by a scratch file that is deleted when
/// the artifact is dropped.
#[derive(Debug)]
pub struct OutputArtifact {
    /// Time-sortable id for this generation call.
    pub id: Uuid,
    /// Deterministic delivered name:
    /// `{company_name}_Operating_Agreement_{YYYYMMDD}.docx`.
    pub file_name: String,
    /// Size of the document in bytes.
    pub size_bytes: usize,
    /// SHA-256 of the document bytes.
    pub sha256: String,
    /// Which path produced it.
    pub method: GenerationMethod,
    temp: tempfile::TempPath,
}

impl OutputArtifact {
    fn create(company_name: &str, bytes: Vec<u8>, method: GenerationMethod) -> Result<Self> {
        let mut file = NamedTempFile::new()
            .map_err(|e| OpagenError::artifact_io(std::env::temp_dir(), e))?;
        file.write_all(&bytes)
            .map_err(|e| OpagenError::artifact_io(file.path(), e))?;
        file.flush()
            .map_err(|e| OpagenError::artifact_io(file.path(), e))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let sha256 = format!("{:x}", hasher.finalize());

        Ok(Self {
            id: Uuid::now_v7(),
            file_name: delivered_file_name(company_name, Utc::now().date_naive()),
            size_bytes: bytes.len(),
            sha256,
            method,
            temp: file.into_temp_path(),
        })
    }

    /// Path of the backing scratch file. Valid until the artifact is
    /// dropped or persisted.
    pub fn path(&self) -> &Path {
        &self.temp
    }

    /// Copy the document into `dir` under its delivered name, releasing
    /// the scratch file. Returns the destination path.
    pub fn persist_to(self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| OpagenError::artifact_io(dir, e))?;
        let dest = dir.join(&self.file_name);
        std::fs::copy(self.path(), &dest).map_err(|e| OpagenError::artifact_io(&dest, e))?;
        debug!(dest = %dest.display(), "artifact persisted");
        Ok(dest)
        // `self.temp` drops here, deleting the scratch file.
    }
}

/// `{company_name}_Operating_Agreement_{YYYYMMDD}.docx`, with path
/// separators stripped from the company name.
fn delivered_file_name(company_name: &str, date: NaiveDate) -> String {
    let safe: String = company_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    format!("{safe}_Operating_Agreement_{}.docx", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use opagen_shared::Member;
    use serde_json::{Map, Value};
    use std::io::Read;

    fn acme_agreement() -> Agreement {
        Agreement {
            company_name: "Acme LLC".into(),
            state: "Delaware".into(),
            formation_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            effective_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            manager_name: "Jane Doe".into(),
            manager_entity: None,
            principal_place_of_business: None,
            registered_agent: None,
            purpose: None,
            data: Map::new(),
            members: vec![Member {
                name: "Bob".into(),
                entity_name: None,
                member_class: "A".into(),
                units: 0.0,
                capital_commitment: 50_000.0,
                percentage_interest: 25.0,
                is_manager: false,
                address: None,
                email: None,
                capital_commitments: vec![],
            }],
            capital_structure: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn empty_store() -> (tempfile::TempDir, TemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        (dir, store)
    }

    fn read_document_part(path: &Path) -> String {
        let bytes = std::fs::read(path).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name("word/document.xml").unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    /// Install a template whose document part is `body`.
    fn install_template(dir: &Path, name: &str, body: &str) {
        let mut doc = opagen_docx::Document::new();
        doc.push(opagen_docx::Paragraph::text(body));
        let bytes = write_docx(&doc).unwrap();
        std::fs::write(dir.join(format!("{name}.docx")), bytes).unwrap();
    }

    #[test]
    fn scratch_build_when_no_template_installed() {
        let (_dir, store) = empty_store();
        let generator = Generator::with_tera(store);

        let artifact = generator.generate(&acme_agreement(), "default").unwrap();
        assert_eq!(artifact.method, GenerationMethod::ScratchBuild);

        let xml = read_document_part(artifact.path());
        assert!(xml.contains("ACME LLC"));
        assert!(xml.contains("£50,000"));
        assert!(xml.contains("See Schedule C"));
        assert!(xml.contains("Signature Page"));
    }

    #[test]
    fn delivered_name_is_deterministic() {
        let (_dir, store) = empty_store();
        let generator = Generator::with_tera(store);

        let artifact = generator.generate(&acme_agreement(), "default").unwrap();
        let expected = format!(
            "Acme LLC_Operating_Agreement_{}.docx",
            Utc::now().date_naive().format("%Y%m%d")
        );
        assert_eq!(artifact.file_name, expected);
        assert_eq!(artifact.sha256.len(), 64);
        assert!(artifact.size_bytes > 0);
    }

    #[test]
    fn delivered_name_strips_path_separators() {
        let name = delivered_file_name("Acme/Sub\\Co", NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(name, "Acme-Sub-Co_Operating_Agreement_20240201.docx");
    }

    #[test]
    fn template_path_substitutes_context() {
        let (dir, store) = empty_store();
        install_template(
            dir.path(),
            "default",
            "{{ company_name }}, effective {{ effective_date }}",
        );
        let generator = Generator::with_tera(store);

        let artifact = generator.generate(&acme_agreement(), "default").unwrap();
        assert_eq!(artifact.method, GenerationMethod::Template);

        let xml = read_document_part(artifact.path());
        assert!(xml.contains("ACME LLC"));
        assert!(xml.contains("1 February 2024"));
    }

    #[test]
    fn template_renders_members_table() {
        let (dir, store) = empty_store();
        install_template(
            dir.path(),
            "default",
            "{% for m in members_table %}{{ m.name }} ({{ m.class }}) holds {{ m.percentage }}{% endfor %}",
        );
        let generator = Generator::with_tera(store);

        let artifact = generator.generate(&acme_agreement(), "default").unwrap();
        let xml = read_document_part(artifact.path());
        assert!(xml.contains("Bob (A) holds 25.0%"));
    }

    #[test]
    fn extension_override_reaches_template_output() {
        let (dir, store) = empty_store();
        install_template(dir.path(), "default", "Purpose: {{ purpose }}");
        let generator = Generator::with_tera(store);

        let mut agreement = acme_agreement();
        agreement.purpose = Some("typed purpose".into());
        agreement
            .data
            .insert("purpose".into(), Value::String("override purpose".into()));

        let artifact = generator.generate(&agreement, "default").unwrap();
        let xml = read_document_part(artifact.path());
        assert!(xml.contains("override purpose"));
        assert!(!xml.contains("typed purpose"));
    }

    #[test]
    fn undeclared_placeholder_fails_without_fallback() {
        let (dir, store) = empty_store();
        install_template(dir.path(), "default", "{{ undeclared_key }}");
        let generator = Generator::with_tera(store);

        let err = generator.generate(&acme_agreement(), "default").unwrap_err();
        assert!(matches!(err, OpagenError::TemplateRender { .. }));
    }

    #[test]
    fn corrupt_template_fails_without_fallback() {
        let (dir, store) = empty_store();
        std::fs::write(dir.path().join("default.docx"), b"not a zip archive").unwrap();
        let generator = Generator::with_tera(store);

        let err = generator.generate(&acme_agreement(), "default").unwrap_err();
        assert!(matches!(err, OpagenError::TemplateRender { .. }));
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let (_dir, store) = empty_store();
        let generator = Generator::with_tera(store);

        let mut agreement = acme_agreement();
        agreement.company_name = "  ".into();
        let err = generator.generate(&agreement, "default").unwrap_err();
        assert!(matches!(err, OpagenError::MissingField { ref field } if field == "company_name"));

        let mut agreement = acme_agreement();
        agreement.manager_name = String::new();
        let err = generator.generate(&agreement, "default").unwrap_err();
        assert!(matches!(err, OpagenError::MissingField { ref field } if field == "manager_name"));
    }

    #[test]
    fn dropping_artifact_releases_scratch_file() {
        let (_dir, store) = empty_store();
        let generator = Generator::with_tera(store);

        let artifact = generator.generate(&acme_agreement(), "default").unwrap();
        let scratch = artifact.path().to_path_buf();
        assert!(scratch.exists());

        drop(artifact);
        assert!(!scratch.exists(), "scratch file must be released on drop");
    }

    #[test]
    fn persist_moves_document_and_releases_scratch() {
        let (_dir, store) = empty_store();
        let generator = Generator::with_tera(store);
        let out = tempfile::tempdir().unwrap();

        let artifact = generator.generate(&acme_agreement(), "default").unwrap();
        let scratch = artifact.path().to_path_buf();
        let expected_name = artifact.file_name.clone();

        let dest = artifact.persist_to(out.path()).unwrap();
        assert_eq!(dest, out.path().join(expected_name));
        assert!(dest.exists());
        assert!(!scratch.exists());

        let xml = read_document_part(&dest);
        assert!(xml.contains("ACME LLC"));
    }

    #[test]
    fn zero_member_agreement_generates() {
        let (_dir, store) = empty_store();
        let generator = Generator::with_tera(store);

        let mut agreement = acme_agreement();
        agreement.members.clear();
        let artifact = generator.generate(&agreement, "default").unwrap();

        let xml = read_document_part(artifact.path());
        // The commitments table keeps its header with no member rows.
        assert!(xml.contains("Payment Terms"));
        assert!(!xml.contains("Pro-rata calls"));
    }
}
