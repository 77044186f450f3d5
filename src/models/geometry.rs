//! Viewport-space geometry
//!
//! Rectangles are expressed the way `getBoundingClientRect` reports them:
//! relative to the top of the viewport, so they move as the page scrolls.

use serde::{Deserialize, Serialize};

/// Vertical extent of a region in viewport coordinates
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct RegionRect {
    /// Top edge (pixels from the viewport top, negative when scrolled past)
    pub top: f64,

    /// Height in pixels
    pub height: f64,
}

impl RegionRect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Build from page-space edges and the current scroll offset
    pub fn from_page_span(page_top: f64, page_bottom: f64, scroll_y: f64) -> Self {
        Self {
            top: page_top - scroll_y,
            height: page_bottom - page_top,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Vertical midpoint in viewport coordinates
    pub fn mid(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Visible viewport height, used by the polled visibility fallback
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub height: f64,
}

impl Viewport {
    pub fn new(height: f64) -> Self {
        Self { height }
    }

    /// The band left after cutting `margin` (fraction of the height) from
    /// both the top and the bottom, as `(top, bottom)`.
    pub fn band(&self, margin: f64) -> (f64, f64) {
        let cut = self.height * margin;
        (cut, self.height - cut)
    }
}
