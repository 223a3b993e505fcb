use scriptdoc_core::FormatError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RebuildError>;

/// Fatal rebuild failures. Everything non-fatal travels in the diff report
/// as a warning instead; a rebuild call returns either a fully updated
/// document plus warnings, or one of these and no document at all.
#[derive(Error, Debug)]
pub enum RebuildError {
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Blocks rebuild entirely; raw decode/encode still work.
    #[error("unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    /// Rebuild never runs against an already-inconsistent document.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("unknown section: {0}")]
    UnknownSection(String),

    /// Internal signal raised between chapters; the orchestrator converts
    /// it into a `RebuildWarning::Cancelled` and returns the last fully
    /// completed document.
    #[error("rebuild cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RebuildError::UnsupportedSchemaVersion("2.0".to_string());
        assert_eq!(err.to_string(), "unsupported schema version: 2.0");

        let err: RebuildError = FormatError::MissingDelimiters.into();
        assert_eq!(err.to_string(), "front matter delimiters not found");
    }
}
