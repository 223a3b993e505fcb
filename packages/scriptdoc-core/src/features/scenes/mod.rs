//! Scene index building
//!
//! Consumes parsed headings in document order and produces the location
//! hierarchy, linking each establishing shot forward to the scene heading
//! that follows it.

mod builder;

pub use builder::{SceneHeading, SceneIndex, SceneIndexBuilder};
