//! Scene-heading (slugline) parsing
//!
//! A slugline opens with one of a fixed set of tokens - `INT.`, `EXT.`,
//! `INT/EXT.`, `I/E.`, `EST.` - followed by location, optional area and
//! time segments separated by `" - "`. Any line not opening with a token
//! is simply not a heading.

mod parser;

pub use parser::{Slugline, SluglineKind, SluglineParser};
