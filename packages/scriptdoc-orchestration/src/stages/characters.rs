use crate::error::Result;
use crate::pipeline::{RebuildStage, StageContext, StageOutcome};
use crate::report::{RebuildWarning, SectionDiff, SectionKind};
use scriptdoc_core::{
    AliasResolver, CharacterEntry, CharactersSection, CharacterExtractor, FirstAppearance,
    FrontMatterDocument, Gender,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Rebuilds `characters.list` from dialogue cues across all chapters.
///
/// Per-chapter extraction runs on the worker pool; the merge re-sorts by
/// chapter then line, so worker completion order never shows. The curated
/// alias table is read, never rewritten; its collisions surface as
/// warnings. Gender detection falling back to `NS` keeps an existing
/// entry's curated gender.
pub struct CharactersStage;

impl RebuildStage for CharactersStage {
    fn kind(&self) -> SectionKind {
        SectionKind::Characters
    }

    fn run(&self, document: &FrontMatterDocument, ctx: &StageContext<'_>) -> Result<StageOutcome> {
        let section = document.characters.clone().unwrap_or_default();
        let (resolver, collisions) = AliasResolver::build(&section.aliases);
        let extractor = CharacterExtractor::new(resolver);

        let mut warnings = ctx.unreadable_warnings();
        warnings.extend(collisions.into_iter().map(RebuildWarning::Validation));

        let per_chapter = ctx.map_readable(|_, text| extractor.extract(text))?;

        // Merge, chapter-ascending (map_readable already re-sorted); cues
        // within a chapter are line-ascending by construction.
        let mut totals: BTreeMap<String, u32> = BTreeMap::new();
        let mut firsts: BTreeMap<String, FirstAppearance> = BTreeMap::new();
        let mut spellings: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (source, extraction) in &per_chapter {
            ctx.checkpoint()?;
            for cue in &extraction.cues {
                *totals.entry(cue.canonical.clone()).or_insert(0) += cue.dialogue_lines;
                firsts
                    .entry(cue.canonical.clone())
                    .or_insert(FirstAppearance {
                        chapter: source.number,
                        line: cue.line,
                    });
                // Bare spelling for the introduction scan: cue text minus
                // any parenthetical and dual-dialogue caret.
                let bare = cue
                    .raw
                    .split('(')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .trim_end_matches('^')
                    .trim()
                    .to_string();
                if !bare.is_empty() {
                    spellings
                        .entry(cue.canonical.clone())
                        .or_default()
                        .insert(bare);
                }
            }
        }

        let existing: BTreeMap<String, CharacterEntry> = section
            .list
            .iter()
            .map(|entry| (entry.name.clone(), entry.clone()))
            .collect();

        let no_spellings = BTreeSet::new();
        let mut list: Vec<CharacterEntry> = totals
            .keys()
            .map(|name| {
                let spelled = spellings.get(name).unwrap_or(&no_spellings);
                let mut gender = detect_gender(&per_chapter, name, spelled);
                if gender == Gender::NotSpecified {
                    if let Some(prior) = existing.get(name) {
                        gender = prior.gender;
                    }
                }
                debug!(character = %name, gender = gender.as_str(), "character entry");
                CharacterEntry {
                    name: name.clone(),
                    gender,
                    first_appearance: firsts.get(name).copied(),
                    lines: totals.get(name).copied(),
                }
            })
            .collect();

        // Document order: first appearance, then name.
        list.sort_by(|a, b| {
            let key_a = a.first_appearance.map(|f| (f.chapter, f.line));
            let key_b = b.first_appearance.map(|f| (f.chapter, f.line));
            key_a.cmp(&key_b).then_with(|| a.name.cmp(&b.name))
        });

        info!(characters = list.len(), "characters derived");

        let fresh: BTreeMap<String, CharacterEntry> = list
            .iter()
            .map(|entry| (entry.name.clone(), entry.clone()))
            .collect();
        let diff = SectionDiff::from_maps(self.kind(), &existing, &fresh);

        let mut updated = document.clone();
        updated.characters = Some(CharactersSection {
            aliases: section.aliases,
            list,
            rebuilt: Some(ctx.now),
        });

        Ok(StageOutcome {
            document: updated,
            diff,
            warnings,
        })
    }
}

/// Scan chapters in order for an introduction descriptor, trying the
/// canonical name first and then every raw cue spelling.
fn detect_gender(
    per_chapter: &[(&crate::source::ChapterSource, scriptdoc_core::ChapterCharacters)],
    canonical: &str,
    spellings: &BTreeSet<String>,
) -> Gender {
    for (source, _) in per_chapter {
        let Some(text) = source.readable_text() else {
            continue;
        };
        let gender = CharacterExtractor::detect_gender(text, canonical);
        if gender != Gender::NotSpecified {
            return gender;
        }
        for raw in spellings {
            let gender = CharacterExtractor::detect_gender(text, raw);
            if gender != Gender::NotSpecified {
                return gender;
            }
        }
    }
    Gender::NotSpecified
}
