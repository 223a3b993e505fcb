use crate::error::Result;
use crate::pipeline::{RebuildStage, StageContext, StageOutcome};
use crate::report::{RebuildWarning, SectionDiff, SectionKind};
use scriptdoc_core::{
    AliasResolver, FrontMatterDocument, SceneHeading, SceneIndexBuilder, SceneLocation,
    ScenesSection, SluglineParser,
};
use std::collections::BTreeMap;
use tracing::info;

/// Rebuilds `scenes.locations` from sluglines across all chapters.
///
/// Per-chapter parsing runs on the worker pool; the merged heading stream
/// is re-sorted chapter-ascending then line-ascending before linking, so
/// establishing shots always attach to the heading that actually follows
/// them in document order. The curated location alias table is read, never
/// rewritten.
pub struct ScenesStage;

impl RebuildStage for ScenesStage {
    fn kind(&self) -> SectionKind {
        SectionKind::Scenes
    }

    fn run(&self, document: &FrontMatterDocument, ctx: &StageContext<'_>) -> Result<StageOutcome> {
        let section = document.scenes.clone().unwrap_or_default();
        let (resolver, collisions) = AliasResolver::build(&section.aliases);
        let parser = SluglineParser::new(resolver);

        let mut warnings = ctx.unreadable_warnings();
        warnings.extend(collisions.into_iter().map(RebuildWarning::Validation));

        let per_chapter = ctx.map_readable(|_, text| {
            text.lines()
                .enumerate()
                .filter_map(|(idx, line)| {
                    parser
                        .parse(line)
                        .map(|slugline| ((idx + 1) as u32, slugline))
                })
                .collect::<Vec<_>>()
        })?;

        let mut headings: Vec<SceneHeading> = Vec::new();
        for (source, parsed) in per_chapter {
            ctx.checkpoint()?;
            for (line, slugline) in parsed {
                headings.push(SceneHeading {
                    chapter: source.number,
                    line,
                    slugline,
                });
            }
        }
        // Deterministic stream order regardless of worker completion.
        headings.sort_by_key(|h| (h.chapter, h.line));

        let index = SceneIndexBuilder::build(headings);
        warnings.extend(index.warnings.into_iter().map(RebuildWarning::Validation));

        info!(locations = index.locations.len(), "scene index derived");

        let existing: BTreeMap<String, SceneLocation> = section
            .locations
            .iter()
            .map(|location| (location.name.clone(), location.clone()))
            .collect();
        let fresh: BTreeMap<String, SceneLocation> = index
            .locations
            .iter()
            .map(|location| (location.name.clone(), location.clone()))
            .collect();
        let diff = SectionDiff::from_maps(self.kind(), &existing, &fresh);

        let mut updated = document.clone();
        updated.scenes = Some(ScenesSection {
            aliases: section.aliases,
            locations: index.locations,
            rebuilt: Some(ctx.now),
        });

        Ok(StageOutcome {
            document: updated,
            diff,
            warnings,
        })
    }
}
