//! Front-matter codec
//!
//! Two `---` delimiter lines bracket a YAML mapping; everything after the
//! second delimiter is free-form body prose. One declarative field table
//! drives both directions, so encode and decode can never disagree about
//! field order or requiredness.

mod codec;
mod schema;

pub use codec::{decode, encode};
pub use schema::{FieldSpec, DELIMITER, FIELDS};
