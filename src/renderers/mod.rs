//! Renderers for the timeline overlay
//!
//! `scene` produces the display list; `svg` turns it into markup.

pub mod scene;
pub mod svg;

pub use scene::{RenderDot, RenderLine, RenderPulse, TimelineScene};
pub use svg::SvgRenderer;
