//! Models for the section timeline
//!
//! Section identifiers and registry, viewport geometry, and the
//! language/direction flag.

pub mod section;
pub mod geometry;
pub mod direction;

// Re-export commonly used types
pub use section::{SectionId, SectionRegistry};
pub use geometry::{RegionRect, Viewport};
pub use direction::{Direction, Language};
