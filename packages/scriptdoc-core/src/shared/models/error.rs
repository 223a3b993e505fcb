//! Core error types
//!
//! Two families, per the document contract:
//! - `FormatError`: fatal to the codec call in progress, never retried.
//! - `ValidationError`: findings surfaced as diff-report warnings, except
//!   the schema-version gate which blocks rebuild entirely.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormatError>;

/// Fatal document text-format failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("front matter delimiters not found")]
    MissingDelimiters,

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("malformed structure: {0}")]
    MalformedStructure(String),
}

impl FormatError {
    pub fn malformed<E: std::fmt::Display>(detail: E) -> Self {
        Self::MalformedStructure(detail.to_string())
    }
}

/// Non-fatal consistency findings raised while deriving sections.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    /// One variant string claimed by two canonical names. The first mapping
    /// wins for resolution; the collision is reported, never dropped.
    #[error("alias '{variant}' maps to both '{first}' and '{second}'")]
    AliasCollision {
        variant: String,
        first: String,
        second: String,
    },

    #[error("unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    /// An establishing shot with no following scene heading to link to.
    #[error("establishing shot at {location} (chapter {chapter}, line {line}) has no following scene")]
    OrphanedEstablishingShot {
        location: String,
        chapter: u32,
        line: u32,
    },
}
