//! Scene index models
//!
//! A location groups its headings by lighting, then by area, preserving
//! document order within each bucket. Establishing shots live beside the
//! grouped occurrences and point forward at the scene they introduce.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Lighting token of a scene heading. `EST` is not a lighting — establishing
/// shots are tagged separately by the parser and never enter these buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lighting {
    #[serde(rename = "INT")]
    Int,

    #[serde(rename = "EXT")]
    Ext,

    #[serde(rename = "INT/EXT")]
    IntExt,
}

impl Lighting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lighting::Int => "INT",
            Lighting::Ext => "EXT",
            Lighting::IntExt => "INT/EXT",
        }
    }
}

impl fmt::Display for Lighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Area bucket key within a location. Headings without an area segment file
/// under the reserved `_default` key, so "no area" can never collide with a
/// named area.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AreaKey {
    Default,
    Named(String),
}

impl AreaKey {
    pub const DEFAULT_KEY: &'static str = "_default";

    pub fn as_str(&self) -> &str {
        match self {
            AreaKey::Default => Self::DEFAULT_KEY,
            AreaKey::Named(name) => name,
        }
    }

    pub fn named<S: Into<String>>(name: S) -> Self {
        AreaKey::Named(name.into())
    }
}

impl fmt::Display for AreaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for AreaKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AreaKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AreaKeyVisitor;

        impl Visitor<'_> for AreaKeyVisitor {
            type Value = AreaKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an area name or the reserved key _default")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<AreaKey, E> {
                if value == AreaKey::DEFAULT_KEY {
                    Ok(AreaKey::Default)
                } else {
                    Ok(AreaKey::Named(value.to_string()))
                }
            }
        }

        deserializer.deserialize_str(AreaKeyVisitor)
    }
}

/// One scene heading filed under a location/lighting/area bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneOccurrence {
    pub chapter: u32,

    /// Time-of-day token as written (`DAY`, `NIGHT`, `LATER`); empty when
    /// the heading carried no time segment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time: String,

    pub line: u32,
}

/// Forward reference from an establishing shot to the scene it introduces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadsTo {
    pub lighting: Lighting,

    #[serde(default = "default_area", skip_serializing_if = "is_default_area")]
    pub area: AreaKey,

    pub line: u32,
}

fn default_area() -> AreaKey {
    AreaKey::Default
}

fn is_default_area(area: &AreaKey) -> bool {
    *area == AreaKey::Default
}

/// An `EST.` heading. Absent `leads_to` means no following scene heading
/// was found - the shot is orphaned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstablishingShot {
    pub chapter: u32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time: String,

    pub line: u32,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub leads_to: Option<LeadsTo>,
}

/// All activity at one canonical location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneLocation {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub establishing: Vec<EstablishingShot>,

    /// lighting → area → ordered occurrences.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<Lighting, BTreeMap<AreaKey, Vec<SceneOccurrence>>>,
}

impl SceneLocation {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            establishing: Vec::new(),
            settings: BTreeMap::new(),
        }
    }

    /// File an occurrence under its lighting/area bucket, preserving call order.
    pub fn push_occurrence(&mut self, lighting: Lighting, area: AreaKey, occ: SceneOccurrence) {
        self.settings
            .entry(lighting)
            .or_default()
            .entry(area)
            .or_default()
            .push(occ);
    }

    /// Total occurrence count across all buckets.
    pub fn occurrence_count(&self) -> usize {
        self.settings
            .values()
            .flat_map(|areas| areas.values())
            .map(|occs| occs.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_key_reserved() {
        assert_eq!(AreaKey::Default.as_str(), "_default");
        assert_eq!(AreaKey::named("Kitchen").as_str(), "Kitchen");

        let yaml = serde_yaml::to_string(&AreaKey::Default).unwrap();
        let back: AreaKey = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, AreaKey::Default);

        let back: AreaKey = serde_yaml::from_str("Kitchen").unwrap();
        assert_eq!(back, AreaKey::named("Kitchen"));
    }

    #[test]
    fn test_push_occurrence_preserves_order() {
        let mut location = SceneLocation::new("Cemetery");
        location.push_occurrence(
            Lighting::Ext,
            AreaKey::Default,
            SceneOccurrence { chapter: 1, time: "DAY".to_string(), line: 408 },
        );
        location.push_occurrence(
            Lighting::Ext,
            AreaKey::Default,
            SceneOccurrence { chapter: 2, time: "NIGHT".to_string(), line: 51 },
        );

        let bucket = &location.settings[&Lighting::Ext][&AreaKey::Default];
        assert_eq!(bucket[0].line, 408);
        assert_eq!(bucket[1].line, 51);
        assert_eq!(location.occurrence_count(), 2);
    }

    #[test]
    fn test_location_yaml_roundtrip() {
        let mut location = SceneLocation::new("Sylvia's House");
        location.push_occurrence(
            Lighting::Int,
            AreaKey::named("Kitchen"),
            SceneOccurrence { chapter: 1, time: "DAY".to_string(), line: 12 },
        );
        location.establishing.push(EstablishingShot {
            chapter: 1,
            time: "DAY".to_string(),
            line: 5,
            leads_to: Some(LeadsTo { lighting: Lighting::Int, area: AreaKey::named("Kitchen"), line: 12 }),
        });

        let yaml = serde_yaml::to_string(&location).unwrap();
        let back: SceneLocation = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, location);
    }
}
