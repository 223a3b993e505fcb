//! Front-matter project document
//!
//! The document owns the structured front-matter sections plus an open
//! extension map for sections the schema does not know. Unknown sections
//! are opaque payloads, round-tripped verbatim and decodable on demand.

use super::character::{AliasTable, CharacterEntry, VoiceEntry};
use super::error::FormatError;
use super::scene::SceneLocation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// The only schema version this build understands. Documents with any other
/// version still decode and encode, but refuse to rebuild.
pub const SCHEMA_VERSION: &str = "1.0";

/// Authoring state of one chapter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChapterStatus {
    Complete,
    #[default]
    Incomplete,
}

/// One chapter source file tracked by the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterEntry {
    pub file: String,

    /// Character the chapter centers on. Derived: the chapter's top speaker.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub focus: Option<String>,

    /// Authorial note, preserved across rebuilds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intent: Option<String>,

    #[serde(default)]
    pub status: ChapterStatus,
}

/// Chapter list with its own rebuild stamp (`files.chapters`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChapterList {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rebuilt: Option<DateTime<Utc>>,

    #[serde(default)]
    pub items: Vec<ChapterEntry>,
}

/// `files` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilesSection {
    #[serde(default)]
    pub chapters: ChapterList,
}

/// `characters` section: curated aliases plus the derived list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CharactersSection {
    #[serde(default, skip_serializing_if = "AliasTable::is_empty")]
    pub aliases: AliasTable,

    #[serde(default)]
    pub list: Vec<CharacterEntry>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rebuilt: Option<DateTime<Utc>>,
}

/// `voices` section: the casting projection over the character set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VoicesSection {
    #[serde(default)]
    pub list: Vec<VoiceEntry>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rebuilt: Option<DateTime<Utc>>,
}

/// `scenes` section: curated location aliases plus the derived index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScenesSection {
    #[serde(default, skip_serializing_if = "AliasTable::is_empty")]
    pub aliases: AliasTable,

    #[serde(default)]
    pub locations: Vec<SceneLocation>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rebuilt: Option<DateTime<Utc>>,
}

/// `status` section: writing-progress summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatusSection {
    #[serde(default)]
    pub phase: String,

    #[serde(default)]
    pub chapters_complete: u32,

    #[serde(default)]
    pub chapters_total: u32,

    /// Free-text dangling-thread notes, preserved verbatim across rebuilds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub threads: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rebuilt: Option<DateTime<Utc>>,
}

/// The project document: required identity fields, optional sections, and
/// the open extension map (unknown top-level keys in source order).
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatterDocument {
    /// Fixed discriminator, always `"project"`.
    pub doc_type: String,

    pub schema_version: String,

    pub title: String,
    pub short_title: String,
    pub author: String,

    pub created: DateTime<Utc>,
    pub updated: NaiveDate,

    pub intent: Option<String>,
    pub files: Option<FilesSection>,
    pub characters: Option<CharactersSection>,
    pub voices: Option<VoicesSection>,
    pub scenes: Option<ScenesSection>,

    /// Opaque audio-export configuration, owned by the TTS collaborator.
    pub audio_export: Option<Value>,

    pub status: Option<StatusSection>,

    /// Unknown top-level sections in their original insertion order.
    pub extensions: Vec<(String, Value)>,
}

impl FrontMatterDocument {
    /// Bootstrap an empty project document stamped now.
    pub fn empty<S: Into<String>>(title: S, short_title: S, author: S) -> Self {
        let now = Utc::now();
        Self {
            doc_type: "project".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            title: title.into(),
            short_title: short_title.into(),
            author: author.into(),
            created: now,
            updated: now.date_naive(),
            intent: None,
            files: None,
            characters: None,
            voices: None,
            scenes: None,
            audio_export: None,
            status: None,
            extensions: Vec::new(),
        }
    }

    pub fn is_supported_version(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }

    /// Decode an extension section into a concrete type on demand.
    ///
    /// `Ok(None)` when the key is absent; `MalformedStructure` when the
    /// stored payload does not match the requested type.
    pub fn extension_as<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, FormatError> {
        match self.extension(key) {
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| {
                    FormatError::malformed(format!("extension section '{}': {}", key, e))
                }),
            None => Ok(None),
        }
    }

    /// Raw extension payload, if present.
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Insert or replace an extension section, preserving insertion order
    /// for new keys.
    pub fn set_extension<S: Into<String>>(&mut self, key: S, value: Value) {
        let key = key.into();
        if let Some(slot) = self.extensions.iter_mut().find(|(name, _)| *name == key) {
            slot.1 = value;
        } else {
            self.extensions.push((key, value));
        }
    }
}
