use crate::error::Result;
use crate::pipeline::{RebuildStage, StageContext, StageOutcome};
use crate::report::{SectionDiff, SectionKind};
use crate::source::ChapterText;
use scriptdoc_core::{
    AliasResolver, ChapterEntry, ChapterList, ChapterStatus, CharacterExtractor, FilesSection,
    FrontMatterDocument,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Rebuilds `files.chapters` from the chapter set.
///
/// `focus` is derived (the chapter's top speaker); `intent` and `status`
/// are authorial judgment and carried over from the existing entry. New
/// files default to incomplete. An unreadable chapter keeps its existing
/// entry and contributes a per-file warning.
pub struct ChaptersStage;

impl RebuildStage for ChaptersStage {
    fn kind(&self) -> SectionKind {
        SectionKind::Chapters
    }

    fn run(&self, document: &FrontMatterDocument, ctx: &StageContext<'_>) -> Result<StageOutcome> {
        let existing: BTreeMap<String, ChapterEntry> = document
            .files
            .as_ref()
            .map(|files| {
                files
                    .chapters
                    .items
                    .iter()
                    .map(|entry| (entry.file.clone(), entry.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let character_aliases = document
            .characters
            .as_ref()
            .map(|section| &section.aliases);
        let (resolver, _collisions) = match character_aliases {
            Some(table) => AliasResolver::build(table),
            None => (AliasResolver::empty(), Vec::new()),
        };
        let extractor = CharacterExtractor::new(resolver);

        let focus_by_file: BTreeMap<String, Option<String>> = ctx
            .map_readable(|_, text| extractor.extract(text).top_speaker())?
            .into_iter()
            .map(|(source, focus)| (source.file.clone(), focus))
            .collect();

        let mut items = Vec::with_capacity(ctx.chapters.len());
        for source in ctx.chapters.iter() {
            ctx.checkpoint()?;
            let prior = existing.get(&source.file);
            let entry = match &source.text {
                ChapterText::Ready(_) => ChapterEntry {
                    file: source.file.clone(),
                    focus: focus_by_file.get(&source.file).cloned().flatten(),
                    intent: prior.and_then(|e| e.intent.clone()),
                    status: prior.map(|e| e.status).unwrap_or(ChapterStatus::Incomplete),
                },
                ChapterText::Unreadable(_) => match prior {
                    Some(entry) => entry.clone(),
                    None => ChapterEntry {
                        file: source.file.clone(),
                        focus: None,
                        intent: None,
                        status: ChapterStatus::Incomplete,
                    },
                },
            };
            debug!(file = %entry.file, focus = ?entry.focus, "chapter entry");
            items.push(entry);
        }

        let fresh: BTreeMap<String, ChapterEntry> = items
            .iter()
            .map(|entry| (entry.file.clone(), entry.clone()))
            .collect();
        let diff = SectionDiff::from_maps(self.kind(), &existing, &fresh);

        let mut updated = document.clone();
        updated.files = Some(FilesSection {
            chapters: ChapterList {
                rebuilt: Some(ctx.now),
                items,
            },
        });

        Ok(StageOutcome {
            document: updated,
            diff,
            warnings: ctx.unreadable_warnings(),
        })
    }
}
