//! Diff reporting
//!
//! Every rebuild call returns a report beside the updated document: which
//! keys each stage added, removed or changed, plus the non-fatal warnings
//! collected along the way. Presentation layers render it; callers can
//! skip persistence when it is a no-op.

use crate::error::{RebuildError, Result};
use scriptdoc_core::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Rebuildable section selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Chapters,
    Characters,
    Voices,
    Scenes,
    Status,
    All,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Chapters => "chapters",
            SectionKind::Characters => "characters",
            SectionKind::Voices => "voices",
            SectionKind::Scenes => "scenes",
            SectionKind::Status => "status",
            SectionKind::All => "all",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "chapters" => Ok(SectionKind::Chapters),
            "characters" => Ok(SectionKind::Characters),
            "voices" => Ok(SectionKind::Voices),
            "scenes" => Ok(SectionKind::Scenes),
            "status" => Ok(SectionKind::Status),
            "all" => Ok(SectionKind::All),
            other => Err(RebuildError::UnknownSection(other.to_string())),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key-level changes one stage made to its section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDiff {
    pub section: SectionKind,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl SectionDiff {
    pub fn new(section: SectionKind) -> Self {
        Self {
            section,
            added: Vec::new(),
            removed: Vec::new(),
            changed: Vec::new(),
        }
    }

    /// Compare old and new keyed entries. Rebuild timestamps never appear
    /// in these maps, so a pure re-derivation diffs empty.
    pub fn from_maps<V: PartialEq>(
        section: SectionKind,
        old: &BTreeMap<String, V>,
        new: &BTreeMap<String, V>,
    ) -> Self {
        let mut diff = Self::new(section);
        for key in new.keys() {
            match old.get(key) {
                None => diff.added.push(key.clone()),
                Some(old_value) if *old_value != new[key] => diff.changed.push(key.clone()),
                Some(_) => {}
            }
        }
        for key in old.keys() {
            if !new.contains_key(key) {
                diff.removed.push(key.clone());
            }
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Non-fatal findings attached to a rebuild pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebuildWarning {
    /// A chapter's text could not be processed; the file was skipped and
    /// the stage completed with the rest.
    PerFile { file: String, detail: String },

    Validation(ValidationError),

    /// The pass stopped cooperatively; sections before this one are
    /// complete, this one and later ones were not touched.
    Cancelled { before: SectionKind },
}

impl fmt::Display for RebuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebuildWarning::PerFile { file, detail } => {
                write!(f, "{}: {}", file, detail)
            }
            RebuildWarning::Validation(err) => write!(f, "{}", err),
            RebuildWarning::Cancelled { before } => {
                write!(f, "rebuild cancelled before {}", before)
            }
        }
    }
}

/// The full result narrative of one rebuild call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    pub sections: Vec<SectionDiff>,
    pub warnings: Vec<RebuildWarning>,
}

impl DiffReport {
    /// True when nothing changed and nothing went wrong - callers can skip
    /// persisting the document.
    pub fn is_noop(&self) -> bool {
        self.sections.iter().all(SectionDiff::is_empty) && self.warnings.is_empty()
    }

    pub fn per_file_warnings(&self) -> impl Iterator<Item = &RebuildWarning> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, RebuildWarning::PerFile { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_section_kind_roundtrip() {
        for kind in &[
            SectionKind::Chapters,
            SectionKind::Characters,
            SectionKind::Voices,
            SectionKind::Scenes,
            SectionKind::Status,
            SectionKind::All,
        ] {
            let parsed = SectionKind::from_str(kind.as_str()).unwrap();
            assert_eq!(*kind, parsed);
        }
        assert!(SectionKind::from_str("metadata").is_err());
    }

    #[test]
    fn test_diff_from_maps() {
        let old: BTreeMap<String, u32> =
            [("a".to_string(), 1), ("b".to_string(), 2)].into_iter().collect();
        let new: BTreeMap<String, u32> =
            [("b".to_string(), 3), ("c".to_string(), 4)].into_iter().collect();

        let diff = SectionDiff::from_maps(SectionKind::Characters, &old, &new);
        assert_eq!(diff.added, vec!["c".to_string()]);
        assert_eq!(diff.removed, vec!["a".to_string()]);
        assert_eq!(diff.changed, vec!["b".to_string()]);
        assert!(!diff.is_empty());
    }

    #[test]
    fn test_noop_report() {
        let mut report = DiffReport::default();
        report.sections.push(SectionDiff::new(SectionKind::Scenes));
        assert!(report.is_noop());

        report.warnings.push(RebuildWarning::PerFile {
            file: "chapter-02.md".to_string(),
            detail: "unreadable".to_string(),
        });
        assert!(!report.is_noop());
        assert_eq!(report.per_file_warnings().count(), 1);
    }
}
