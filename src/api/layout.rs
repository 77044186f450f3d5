//! Stateless layout and rendering functions
//!
//! For hosts that run their own DOM loop and only want the geometry and
//! the overlay markup.

use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, deserialize_or_default, serialize, to_js_error};
use crate::config::GliderConfig;
use crate::models::{Language, RegionRect, SectionId, SectionRegistry};
use crate::renderers::scene::TimelineScene;
use crate::renderers::svg::SvgRenderer;
use crate::tracker::layout::{LayoutEngine, PositionTable};

/// Container-relative midpoints for `regions` (`null` entries give 0)
#[wasm_bindgen(js_name = computeSectionPositions)]
pub fn compute_section_positions(container: JsValue, regions: JsValue, scroll_y: f64) -> Result<Vec<f64>, JsValue> {
    let container: RegionRect = deserialize(container, "Failed to read container rect")?;
    let regions: Vec<Option<RegionRect>> = deserialize(regions, "Failed to read region rects")?;

    let table = LayoutEngine::compute(container, &regions, scroll_y);
    Ok(table.as_slice().to_vec())
}

/// Build the display list for an explicit state
#[wasm_bindgen(js_name = composeTimelineScene)]
pub fn compose_timeline_scene(
    sections: JsValue,
    positions: Vec<f64>,
    active: Option<String>,
    lang: &str,
    config: JsValue,
) -> Result<JsValue, JsValue> {
    let registry: SectionRegistry = deserialize(sections, "Failed to read sections")?;
    let language: Language = lang.parse().map_err(to_js_error)?;
    let config: GliderConfig = deserialize_or_default(config, "Failed to read config")?;
    config.validate().map_err(to_js_error)?;

    let active = active.map(SectionId::new);
    let scene = TimelineScene::compose(
        &registry,
        &PositionTable::new(positions),
        active.as_ref(),
        language.direction(),
        &config,
    );
    serialize(&scene, "Failed to serialize scene")
}

/// SVG markup for a display list produced by `composeTimelineScene`
#[wasm_bindgen(js_name = renderTimelineSvg)]
pub fn render_timeline_svg(scene: JsValue) -> Result<String, JsValue> {
    let scene: TimelineScene = deserialize(scene, "Failed to read scene")?;
    Ok(SvgRenderer::render(&scene))
}
