//! Shared models

mod character;
mod document;
mod error;
mod scene;

pub use character::{
    AliasTable, CharacterEntry, FirstAppearance, Gender, VoiceEntry,
};
pub use document::{
    ChapterEntry, ChapterList, ChapterStatus, CharactersSection, FilesSection,
    FrontMatterDocument, ScenesSection, StatusSection, VoicesSection, SCHEMA_VERSION,
};
pub use error::{FormatError, Result, ValidationError};
pub use scene::{AreaKey, EstablishingShot, LeadsTo, Lighting, SceneLocation, SceneOccurrence};

// Re-export serde_yaml::Value for convenience (extension section payloads)
pub use serde_yaml::Value;
