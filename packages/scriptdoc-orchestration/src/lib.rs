/*
 * Scriptdoc Orchestration - Rebuild Pipeline
 *
 * Regenerates the derived sections of a project document from chapter
 * source text, in fixed dependency order:
 *
 *   chapters → characters → voices → scenes → status
 *
 * Each stage folds its freshly derived section into a copy of the
 * previous stage's document. Per-file failures become warnings, stages
 * finish with the remaining files, and a rebuild call returns either a
 * fully updated document plus a diff report or a fatal error - never a
 * half-merged result.
 */

// Public modules
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod stages;

// Re-exports
pub use error::{RebuildError, Result};
pub use orchestrator::RebuildOrchestrator;
pub use pipeline::{RebuildConfig, RebuildStage, StageContext, StageOutcome};
pub use report::{DiffReport, RebuildWarning, SectionDiff, SectionKind};
pub use source::{ChapterSet, ChapterSource, ChapterText};
pub use stages::{ChaptersStage, CharactersStage, ScenesStage, StatusStage, VoicesStage};

// The cancellation primitive is part of the public rebuild API.
pub use tokio_util::sync::CancellationToken;
