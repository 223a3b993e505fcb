use crate::error::Result;
use crate::pipeline::{RebuildStage, StageContext, StageOutcome};
use crate::report::{SectionDiff, SectionKind};
use scriptdoc_core::{FrontMatterDocument, VoiceEntry, VoicesSection};
use std::collections::BTreeMap;
use tracing::debug;

/// Rebuilds `voices` as a projection over the character list produced
/// earlier in the same pass.
///
/// Casting metadata (age, description, tone, voice id) is curated and
/// carried over by name. A voice whose character vanished is retained and
/// flagged stale, never deleted.
pub struct VoicesStage;

impl RebuildStage for VoicesStage {
    fn kind(&self) -> SectionKind {
        SectionKind::Voices
    }

    fn run(&self, document: &FrontMatterDocument, ctx: &StageContext<'_>) -> Result<StageOutcome> {
        ctx.checkpoint()?;

        let section = document.voices.clone().unwrap_or_default();
        let existing: BTreeMap<String, VoiceEntry> = section
            .list
            .iter()
            .map(|entry| (entry.name.clone(), entry.clone()))
            .collect();

        let characters: Vec<_> = document
            .characters
            .as_ref()
            .map(|s| s.list.clone())
            .unwrap_or_default();

        let mut list: Vec<VoiceEntry> = Vec::with_capacity(section.list.len());
        for character in &characters {
            let entry = match existing.get(&character.name) {
                Some(prior) => VoiceEntry {
                    gender: character.gender,
                    first_appearance: character.first_appearance,
                    lines: character.lines,
                    stale: false,
                    ..prior.clone()
                },
                None => {
                    debug!(character = %character.name, "new voice entry");
                    VoiceEntry::for_character(character)
                }
            };
            list.push(entry);
        }

        // Retain voices for vanished characters, in their original order.
        for prior in &section.list {
            if !characters.iter().any(|c| c.name == prior.name) {
                debug!(character = %prior.name, "voice flagged stale");
                list.push(VoiceEntry {
                    stale: true,
                    ..prior.clone()
                });
            }
        }

        let fresh: BTreeMap<String, VoiceEntry> = list
            .iter()
            .map(|entry| (entry.name.clone(), entry.clone()))
            .collect();
        let diff = SectionDiff::from_maps(self.kind(), &existing, &fresh);

        let mut updated = document.clone();
        updated.voices = Some(VoicesSection {
            list,
            rebuilt: Some(ctx.now),
        });

        Ok(StageOutcome {
            document: updated,
            diff,
            warnings: Vec::new(),
        })
    }
}
