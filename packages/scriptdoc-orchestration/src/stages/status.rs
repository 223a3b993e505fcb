use crate::error::Result;
use crate::pipeline::{RebuildStage, StageContext, StageOutcome};
use crate::report::{SectionDiff, SectionKind};
use scriptdoc_core::{ChapterStatus, FrontMatterDocument, StatusSection};
use std::collections::BTreeMap;
use tracing::debug;

/// Rebuilds `status` from the files section produced earlier in the same
/// pass. Counts and phase are derived; dangling-thread notes are free text
/// and preserved verbatim.
pub struct StatusStage;

impl RebuildStage for StatusStage {
    fn kind(&self) -> SectionKind {
        SectionKind::Status
    }

    fn run(&self, document: &FrontMatterDocument, ctx: &StageContext<'_>) -> Result<StageOutcome> {
        ctx.checkpoint()?;

        let existing = document.status.clone().unwrap_or_default();

        let items = document
            .files
            .as_ref()
            .map(|files| files.chapters.items.as_slice())
            .unwrap_or(&[]);
        let total = items.len() as u32;
        let complete = items
            .iter()
            .filter(|entry| entry.status == ChapterStatus::Complete)
            .count() as u32;

        let phase = if total == 0 {
            "outline"
        } else if complete == total {
            "complete"
        } else {
            "drafting"
        };
        debug!(phase, complete, total, "status derived");

        let fresh = StatusSection {
            phase: phase.to_string(),
            chapters_complete: complete,
            chapters_total: total,
            threads: existing.threads.clone(),
            rebuilt: Some(ctx.now),
        };

        let diff = SectionDiff::from_maps(
            self.kind(),
            &status_fields(&existing),
            &status_fields(&fresh),
        );

        let mut updated = document.clone();
        updated.status = Some(fresh);

        Ok(StageOutcome {
            document: updated,
            diff,
            warnings: Vec::new(),
        })
    }
}

/// Field-level key map for diffing; the rebuild stamp stays out.
fn status_fields(section: &StatusSection) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    fields.insert("phase".to_string(), section.phase.clone());
    fields.insert(
        "chaptersComplete".to_string(),
        section.chapters_complete.to_string(),
    );
    fields.insert(
        "chaptersTotal".to_string(),
        section.chapters_total.to_string(),
    );
    fields.insert("threads".to_string(), section.threads.join("\n"));
    fields
}
