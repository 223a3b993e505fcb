/*
 * Scriptdoc Core - Screenplay Project Document Engine
 *
 * Feature-First Architecture:
 * - shared/      : Document schema models (front matter sections, scenes, characters)
 * - features/    : Vertical slices (alias -> slugline -> characters -> scenes -> frontmatter)
 *
 * The core is pure value transformation: it receives already-read chapter
 * text, derives structured sections from it, and round-trips the project
 * document through a deterministic YAML front-matter codec. File discovery,
 * git and persistence belong to collaborators.
 */

/// Shared schema models
pub mod shared;

/// Feature modules (extraction and codec slices)
pub mod features;

// Re-exports for the public API
pub use shared::models::{
    AliasTable, AreaKey, ChapterEntry, ChapterList, ChapterStatus, CharacterEntry,
    CharactersSection, EstablishingShot, FilesSection, FirstAppearance, FormatError,
    FrontMatterDocument, Gender, LeadsTo, Lighting, Result, SceneLocation, SceneOccurrence,
    ScenesSection, StatusSection, ValidationError, VoiceEntry, VoicesSection, SCHEMA_VERSION,
};

pub use features::alias::AliasResolver;
pub use features::characters::{CharacterExtractor, ChapterCharacters, Cue};
pub use features::frontmatter::{decode, encode};
pub use features::scenes::{SceneHeading, SceneIndex, SceneIndexBuilder};
pub use features::slugline::{Slugline, SluglineKind, SluglineParser};
