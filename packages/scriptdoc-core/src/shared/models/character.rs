//! Character and voice models
//!
//! Characters are derived from dialogue cues; voices are the casting
//! projection over the character set consumed by the audio pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Perceived gender of a character, as marked in the introduction
/// descriptor (`BERNARD (60s, M)`). `NS` means not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,

    #[serde(rename = "F")]
    Female,

    #[serde(rename = "NB")]
    NonBinary,

    #[serde(rename = "NS")]
    #[default]
    NotSpecified,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::NonBinary => "NB",
            Gender::NotSpecified => "NS",
        }
    }

    /// Parse an introduction-descriptor token. Anything unrecognized is `NS`.
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "M" => Gender::Male,
            "F" => Gender::Female,
            "NB" => Gender::NonBinary,
            _ => Gender::NotSpecified,
        }
    }
}

/// Source position where a character first appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstAppearance {
    pub chapter: u32,
    pub line: u32,
}

/// One canonical character, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterEntry {
    pub name: String,

    #[serde(default)]
    pub gender: Gender,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub first_appearance: Option<FirstAppearance>,

    /// Total dialogue lines across all chapters.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lines: Option<u32>,
}

/// Casting entry for one character. A superset of the character identity
/// plus curated voice metadata. Entries whose character no longer exists
/// are retained and flagged stale, never silently deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceEntry {
    pub name: String,

    #[serde(default)]
    pub gender: Gender,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub first_appearance: Option<FirstAppearance>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lines: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub age: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tone: Option<String>,

    /// Voice identifier in the TTS provider's catalog.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub voice: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

impl VoiceEntry {
    /// Fresh projection of a character with no casting metadata yet.
    pub fn for_character(character: &CharacterEntry) -> Self {
        Self {
            name: character.name.clone(),
            gender: character.gender,
            first_appearance: character.first_appearance,
            lines: character.lines,
            age: None,
            description: None,
            tone: None,
            voice: None,
            stale: false,
        }
    }
}

/// Curated canonical-name → variants table, one for characters and one for
/// locations. Validation of variant uniqueness happens in the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct AliasTable {
    pub entries: BTreeMap<String, Vec<String>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert<S: Into<String>>(&mut self, canonical: S, variants: Vec<String>) {
        self.entries.insert(canonical.into(), variants);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }
}
