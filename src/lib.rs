//! Section Timeline Tracker WASM Module
//!
//! Tracks which content section is in focus and lays out a vertical
//! timeline of indicator dots beside the content. The tracking core is
//! host-independent; `api` binds it to the browser.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod renderers;
pub mod tracker;

// Re-export commonly used types
pub use config::{GliderConfig, PulseConfig};
pub use error::{GliderError, GliderResult};
pub use models::*;
pub use renderers::{SvgRenderer, TimelineScene};
pub use tracker::{LayoutEngine, PositionTable, SectionTracker, TrackerPorts};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Fails only if a logger is already installed
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Glider timeline WASM module initialized");
}
