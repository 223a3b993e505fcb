//! Stage contract
//!
//! The rebuild pipeline is an explicit fold over an ordered list of pure
//! stage functions: each takes the previous stage's document and returns a
//! fresh one with exactly one section replaced, plus the diff and warnings
//! for that section. Ordering and dependency live in the orchestrator's
//! stage list, not in implementation convention.

use crate::error::{RebuildError, Result};
use crate::report::{RebuildWarning, SectionDiff, SectionKind};
use crate::source::{ChapterSet, ChapterSource};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use scriptdoc_core::FrontMatterDocument;
use tokio_util::sync::CancellationToken;

/// Rebuild tuning knobs.
#[derive(Debug, Clone)]
pub struct RebuildConfig {
    /// Bounded worker pool for per-chapter extraction.
    pub parallel_workers: usize,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            parallel_workers: (num_cpus::get() * 3 / 4).max(1), // 75% of cores
        }
    }
}

/// Per-pass inputs shared by every stage.
pub struct StageContext<'a> {
    pub chapters: &'a ChapterSet,
    pub config: &'a RebuildConfig,
    pub cancel: &'a CancellationToken,

    /// Stamp applied to the section a stage regenerates.
    pub now: DateTime<Utc>,
}

impl StageContext<'_> {
    /// Cooperative cancellation point, honored between chapters and
    /// between stages.
    pub fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(RebuildError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// One `PerFile` warning per unreadable chapter; the stage continues
    /// with the rest.
    pub fn unreadable_warnings(&self) -> Vec<RebuildWarning> {
        self.chapters
            .iter()
            .filter_map(|source| match &source.text {
                crate::source::ChapterText::Unreadable(detail) => {
                    Some(RebuildWarning::PerFile {
                        file: source.file.clone(),
                        detail: detail.clone(),
                    })
                }
                crate::source::ChapterText::Ready(_) => None,
            })
            .collect()
    }

    /// Run `f` over every readable chapter on a bounded worker pool and
    /// return the results sorted chapter-ascending - worker completion
    /// order must never affect output ordering.
    pub fn map_readable<T, F>(&self, f: F) -> Result<Vec<(&ChapterSource, T)>>
    where
        T: Send,
        F: Fn(&ChapterSource, &str) -> T + Send + Sync,
    {
        self.checkpoint()?;

        let readable: Vec<(&ChapterSource, &str)> = self.chapters.readable().collect();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.parallel_workers)
            .build()
            .map_err(|e| RebuildError::Other(anyhow::anyhow!("worker pool: {}", e)))?;

        let mut results: Vec<(&ChapterSource, T)> = pool.install(|| {
            readable
                .par_iter()
                .map(|&(source, text)| (source, f(source, text)))
                .collect()
        });

        self.checkpoint()?;
        results.sort_by_key(|(source, _)| source.number);
        Ok(results)
    }
}

/// What one stage hands back to the fold.
pub struct StageOutcome {
    pub document: FrontMatterDocument,
    pub diff: SectionDiff,
    pub warnings: Vec<RebuildWarning>,
}

/// One derivation stage. Stages are pure with respect to the document:
/// they read the input value and return a new one, replacing only their
/// own section. Manually curated data is carried over, never recomputed.
pub trait RebuildStage: Send + Sync {
    fn kind(&self) -> SectionKind;

    fn run(&self, document: &FrontMatterDocument, ctx: &StageContext<'_>) -> Result<StageOutcome>;
}
