use crate::features::slugline::{Slugline, SluglineKind};
use crate::shared::models::{
    EstablishingShot, LeadsTo, SceneLocation, SceneOccurrence, ValidationError,
};
use std::collections::HashMap;
use tracing::debug;

/// One heading in the chronological stream: chapter-ascending, then
/// line-ascending across all chapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneHeading {
    pub chapter: u32,
    pub line: u32,
    pub slugline: Slugline,
}

/// Build output: locations in first-encounter order plus validation
/// findings (orphaned establishing shots).
#[derive(Debug, Clone, Default)]
pub struct SceneIndex {
    pub locations: Vec<SceneLocation>,
    pub warnings: Vec<ValidationError>,
}

/// Walks an ordered heading stream, maintaining at most one pending
/// establishing shot.
///
/// A pending shot links to the next non-establishing heading. A second
/// `EST` before linkage replaces the pending pointer; the earlier shot
/// stays recorded with `leads_to` absent - the back-to-back-EST policy.
/// Whatever is still pending at the end of the stream is orphaned the
/// same way.
pub struct SceneIndexBuilder {
    locations: Vec<SceneLocation>,
    by_name: HashMap<String, usize>,
    /// (location index, establishing index) of the unlinked shot.
    pending: Option<(usize, usize)>,
    warnings: Vec<ValidationError>,
}

impl SceneIndexBuilder {
    pub fn new() -> Self {
        Self {
            locations: Vec::new(),
            by_name: HashMap::new(),
            pending: None,
            warnings: Vec::new(),
        }
    }

    /// Index a whole pre-sorted stream.
    pub fn build(headings: impl IntoIterator<Item = SceneHeading>) -> SceneIndex {
        let mut builder = Self::new();
        for heading in headings {
            builder.push(heading);
        }
        builder.finish()
    }

    /// Process the next heading in document order.
    pub fn push(&mut self, heading: SceneHeading) {
        let SceneHeading { chapter, line, slugline } = heading;

        match slugline.kind {
            SluglineKind::Establishing => {
                if self.pending.is_some() {
                    // Back-to-back EST: the earlier shot stays orphaned.
                    self.orphan_pending();
                }
                let loc_idx = self.location_index(&slugline.location);
                let location = &mut self.locations[loc_idx];
                location.establishing.push(EstablishingShot {
                    chapter,
                    time: slugline.time,
                    line,
                    leads_to: None,
                });
                self.pending = Some((loc_idx, location.establishing.len() - 1));
            }
            SluglineKind::Scene(lighting) => {
                if let Some((loc_idx, shot_idx)) = self.pending.take() {
                    debug!(
                        location = %self.locations[loc_idx].name,
                        line,
                        "linking establishing shot"
                    );
                    self.locations[loc_idx].establishing[shot_idx].leads_to = Some(LeadsTo {
                        lighting,
                        area: slugline.area.clone(),
                        line,
                    });
                }

                let loc_idx = self.location_index(&slugline.location);
                self.locations[loc_idx].push_occurrence(
                    lighting,
                    slugline.area,
                    SceneOccurrence {
                        chapter,
                        time: slugline.time,
                        line,
                    },
                );
            }
        }
    }

    /// Finish the stream; a still-pending shot is orphaned.
    pub fn finish(mut self) -> SceneIndex {
        if self.pending.is_some() {
            self.orphan_pending();
        }
        SceneIndex {
            locations: self.locations,
            warnings: self.warnings,
        }
    }

    fn orphan_pending(&mut self) {
        if let Some((loc_idx, shot_idx)) = self.pending.take() {
            let location = &self.locations[loc_idx];
            let shot = &location.establishing[shot_idx];
            self.warnings.push(ValidationError::OrphanedEstablishingShot {
                location: location.name.clone(),
                chapter: shot.chapter,
                line: shot.line,
            });
        }
    }

    fn location_index(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.by_name.get(name) {
            return idx;
        }
        let idx = self.locations.len();
        self.locations.push(SceneLocation::new(name));
        self.by_name.insert(name.to_string(), idx);
        idx
    }
}

impl Default for SceneIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}
