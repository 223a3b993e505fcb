use crate::error::{RebuildError, Result};
use crate::pipeline::{RebuildConfig, RebuildStage, StageContext};
use crate::report::{DiffReport, RebuildWarning, SectionKind};
use crate::source::ChapterSet;
use crate::stages::{ChaptersStage, CharactersStage, ScenesStage, StatusStage, VoicesStage};
use chrono::Utc;
use scriptdoc_core::FrontMatterDocument;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs the derivation stages in dependency order and folds their output
/// into a fresh document copy.
///
/// The orchestrator never holds a document across calls: each rebuild
/// takes a document value and returns a new one, so a caller holding the
/// pre-rebuild document observes no change and independent projects can
/// rebuild fully in parallel.
pub struct RebuildOrchestrator {
    config: RebuildConfig,
    stages: Vec<Box<dyn RebuildStage>>,
}

impl RebuildOrchestrator {
    pub fn new() -> Self {
        Self::with_config(RebuildConfig::default())
    }

    pub fn with_config(config: RebuildConfig) -> Self {
        // Fixed dependency order; later stages read earlier output within
        // the same pass, never the pre-pass document.
        let stages: Vec<Box<dyn RebuildStage>> = vec![
            Box::new(ChaptersStage),
            Box::new(CharactersStage),
            Box::new(VoicesStage),
            Box::new(ScenesStage),
            Box::new(StatusStage),
        ];
        Self { config, stages }
    }

    /// Rebuild every section in one pass.
    pub fn rebuild_all(
        &self,
        document: &FrontMatterDocument,
        chapters: &ChapterSet,
    ) -> Result<(FrontMatterDocument, DiffReport)> {
        self.rebuild_all_with(document, chapters, &CancellationToken::new())
    }

    /// Rebuild every section, honoring a cooperative cancellation token.
    pub fn rebuild_all_with(
        &self,
        document: &FrontMatterDocument,
        chapters: &ChapterSet,
        cancel: &CancellationToken,
    ) -> Result<(FrontMatterDocument, DiffReport)> {
        let selected: Vec<&dyn RebuildStage> =
            self.stages.iter().map(|stage| stage.as_ref()).collect();
        self.run(&selected, document, chapters, cancel)
    }

    /// Rebuild a single section (`All` delegates to the full pass).
    pub fn rebuild_section(
        &self,
        kind: SectionKind,
        document: &FrontMatterDocument,
        chapters: &ChapterSet,
    ) -> Result<(FrontMatterDocument, DiffReport)> {
        self.rebuild_section_with(kind, document, chapters, &CancellationToken::new())
    }

    pub fn rebuild_section_with(
        &self,
        kind: SectionKind,
        document: &FrontMatterDocument,
        chapters: &ChapterSet,
        cancel: &CancellationToken,
    ) -> Result<(FrontMatterDocument, DiffReport)> {
        if kind == SectionKind::All {
            return self.rebuild_all_with(document, chapters, cancel);
        }
        let selected: Vec<&dyn RebuildStage> = self
            .stages
            .iter()
            .map(|stage| stage.as_ref())
            .filter(|stage| stage.kind() == kind)
            .collect();
        if selected.is_empty() {
            return Err(RebuildError::UnknownSection(kind.to_string()));
        }
        self.run(&selected, document, chapters, cancel)
    }

    fn run(
        &self,
        stages: &[&dyn RebuildStage],
        document: &FrontMatterDocument,
        chapters: &ChapterSet,
        cancel: &CancellationToken,
    ) -> Result<(FrontMatterDocument, DiffReport)> {
        check_preconditions(document)?;

        let start = Instant::now();
        info!(
            stages = stages.len(),
            chapters = chapters.len(),
            "rebuild pass starting"
        );

        let mut current = document.clone();
        let mut report = DiffReport::default();

        for stage in stages {
            if cancel.is_cancelled() {
                warn!(before = %stage.kind(), "rebuild cancelled between stages");
                report
                    .warnings
                    .push(RebuildWarning::Cancelled { before: stage.kind() });
                return Ok((current, report));
            }

            let ctx = StageContext {
                chapters,
                config: &self.config,
                cancel,
                now: Utc::now(),
            };

            match stage.run(&current, &ctx) {
                Ok(outcome) => {
                    info!(
                        section = %stage.kind(),
                        added = outcome.diff.added.len(),
                        removed = outcome.diff.removed.len(),
                        changed = outcome.diff.changed.len(),
                        "stage completed"
                    );
                    current = outcome.document;
                    report.sections.push(outcome.diff);
                    report.warnings.extend(outcome.warnings);
                }
                // Mid-stage cancellation: the half-built section is
                // dropped; the last fully completed document goes back.
                Err(RebuildError::Cancelled) => {
                    warn!(before = %stage.kind(), "rebuild cancelled mid-stage");
                    report
                        .warnings
                        .push(RebuildWarning::Cancelled { before: stage.kind() });
                    return Ok((current, report));
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            warnings = report.warnings.len(),
            "rebuild pass finished"
        );
        Ok((current, report))
    }
}

impl Default for RebuildOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuild never runs against an inconsistent or unsupported document;
/// raw decode/encode remain available either way.
fn check_preconditions(document: &FrontMatterDocument) -> Result<()> {
    if document.doc_type != "project" {
        return Err(RebuildError::MalformedDocument(format!(
            "expected type 'project', found '{}'",
            document.doc_type
        )));
    }
    if !document.is_supported_version() {
        return Err(RebuildError::UnsupportedSchemaVersion(
            document.schema_version.clone(),
        ));
    }
    Ok(())
}
