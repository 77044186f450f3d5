//! Timeline WASM API
//!
//! - `helpers`: console logging macros, serde bridging, error conversion
//! - `dom`: `web-sys` implementations of the tracker ports
//! - `glider`: the `Glider` class exported to JavaScript
//! - `layout`: stateless geometry and rendering functions

pub mod helpers;
pub mod dom;
pub mod glider;
pub mod layout;

pub use glider::Glider;
pub use layout::{compose_timeline_scene, compute_section_positions, render_timeline_svg};
