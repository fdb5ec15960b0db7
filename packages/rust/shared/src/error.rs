//! Error types for opagen.
//!
//! Library crates use [`OpagenError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all opagen operations.
#[derive(Debug, thiserror::Error)]
pub enum OpagenError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A required agreement field is absent or empty. Generation cannot
    /// proceed and no output artifact is created.
    #[error("required agreement field missing: {field}")]
    MissingField { field: String },

    /// Template substitution failed: the template archive is malformed or
    /// unreadable, or it references a placeholder absent from the context.
    /// Never falls back to the scratch-build path.
    #[error("template render error: {message}")]
    TemplateRender { message: String },

    /// The ephemeral output artifact (or the template store backing it)
    /// could not be created, read, or written.
    #[error("artifact I/O error at {path:?}: {source}")]
    ArtifactIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Document AST serialization error (OOXML packaging layer).
    #[error("document build error: {message}")]
    Document { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OpagenError>;

impl OpagenError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a missing-required-field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a template render error from any displayable message.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::TemplateRender {
            message: msg.into(),
        }
    }

    /// Create a document build error from any displayable message.
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with the artifact path for context.
    pub fn artifact_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ArtifactIo {
            path: path.into(),
            source,
        }
    }
}
