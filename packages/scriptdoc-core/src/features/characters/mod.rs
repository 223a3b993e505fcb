//! Character extraction from chapter text
//!
//! Dialogue cues are ALL-CAPS name lines preceding a block of dialogue.
//! Raw cue spellings normalize through suffix-marker stripping and the
//! character alias table; introduction descriptors in action lines carry
//! the gender marker.

mod extractor;

pub use extractor::{ChapterCharacters, CharacterExtractor, Cue};
