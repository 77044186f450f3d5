//! Display list for the timeline overlay
//!
//! A `TimelineScene` holds every coordinate, color and animation parameter
//! needed to draw the overlay, so a host can render it without doing any
//! layout of its own. It is a pure function of the position table, the
//! active section and the direction.

use serde::{Deserialize, Serialize};

use crate::config::GliderConfig;
use crate::models::{Direction, SectionId, SectionRegistry};
use crate::tracker::layout::PositionTable;

/// Everything drawn in the overlay
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineScene {
    /// Edge the timeline hugs
    pub direction: Direction,

    /// Horizontal position of line and dots, percent of container width
    pub x_percent: f64,

    /// Connecting line; absent with fewer than two dots
    pub line: Option<RenderLine>,

    /// One dot per measured section, in registry order
    pub dots: Vec<RenderDot>,
}

/// Vertical line from the first dot to the last
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderLine {
    pub y1: f64,
    pub y2: f64,
    pub stroke: String,
    pub stroke_width: f64,
}

/// A clickable section indicator
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderDot {
    /// Section this dot navigates to
    pub section_id: SectionId,

    /// Position in the registry
    pub index: usize,

    /// Vertical center, container-relative
    pub cy: f64,

    pub r: f64,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,

    /// Pulsing ring, present only on the active dot
    pub pulse: Option<RenderPulse>,
}

/// Looping highlight drawn over the active dot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderPulse {
    pub r: f64,
    pub fill: String,
    pub stroke: String,

    /// Scale keyframes (multiplied into `r`)
    pub scale: Vec<f64>,

    /// Stroke width keyframes
    pub stroke_width: Vec<f64>,

    /// Seconds for one forward pass; playback mirrors back and forth forever
    pub duration_secs: f64,
}

impl TimelineScene {
    /// Compose the scene.
    ///
    /// Dots pair registry entries with table entries by index; a table from
    /// an earlier measurement that is shorter than the registry only yields
    /// dots for the measured prefix.
    pub fn compose(
        registry: &SectionRegistry,
        positions: &PositionTable,
        active: Option<&SectionId>,
        direction: Direction,
        config: &GliderConfig,
    ) -> Self {
        let line = positions.endpoints().map(|(y1, y2)| RenderLine {
            y1,
            y2,
            stroke: config.line_color.clone(),
            stroke_width: config.line_width,
        });

        let dots = registry
            .iter()
            .zip(positions.iter())
            .enumerate()
            .map(|(index, (id, cy))| {
                let is_active = active == Some(id);
                RenderDot {
                    section_id: id.clone(),
                    index,
                    cy,
                    r: config.dot_radius,
                    fill: config.dot_fill.clone(),
                    stroke: config.dot_stroke.clone(),
                    stroke_width: config.dot_stroke_width,
                    pulse: is_active.then(|| RenderPulse {
                        r: config.pulse_radius,
                        fill: config.dot_fill.clone(),
                        stroke: config.dot_stroke.clone(),
                        scale: config.pulse.scale.clone(),
                        stroke_width: config.pulse.stroke_width.clone(),
                        duration_secs: config.pulse.duration_secs,
                    }),
                }
            })
            .collect();

        Self {
            direction,
            x_percent: direction.x_percent(config.edge_inset_percent),
            line,
            dots,
        }
    }

    /// The dot carrying the pulse, if any
    pub fn active_dot(&self) -> Option<&RenderDot> {
        self.dots.iter().find(|d| d.pulse.is_some())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(ids: &[&str]) -> SectionRegistry {
        SectionRegistry::new(ids.iter().copied()).unwrap()
    }

    #[test]
    fn test_no_line_for_short_registries() {
        let config = GliderConfig::default();
        let empty = TimelineScene::compose(
            &registry(&[]),
            &PositionTable::default(),
            None,
            Direction::End,
            &config,
        );
        assert!(empty.line.is_none());
        assert!(empty.dots.is_empty());

        let single = TimelineScene::compose(
            &registry(&["intro"]),
            &PositionTable::new(vec![120.0]),
            None,
            Direction::End,
            &config,
        );
        assert!(single.line.is_none());
        assert_eq!(single.dots.len(), 1);
    }

    #[test]
    fn test_line_spans_first_to_last() {
        let scene = TimelineScene::compose(
            &registry(&["intro", "about", "contact"]),
            &PositionTable::new(vec![100.0, 200.0, 300.0]),
            None,
            Direction::Start,
            &GliderConfig::default(),
        );
        let line = scene.line.expect("line for three sections");
        assert_eq!((line.y1, line.y2), (100.0, 300.0));
        assert_eq!(line.stroke_width, 5.0);
        assert_eq!(scene.x_percent, 10.0);
    }

    #[test]
    fn test_only_active_dot_pulses() {
        let active = SectionId::new("about");
        let scene = TimelineScene::compose(
            &registry(&["intro", "about", "contact"]),
            &PositionTable::new(vec![100.0, 200.0, 300.0]),
            Some(&active),
            Direction::End,
            &GliderConfig::default(),
        );
        let pulsing: Vec<_> = scene.dots.iter().filter(|d| d.pulse.is_some()).collect();
        assert_eq!(pulsing.len(), 1);
        assert_eq!(pulsing[0].section_id, active);
        assert_eq!(scene.active_dot().map(|d| d.index), Some(1));
        assert_eq!(scene.x_percent, 90.0);
    }

    #[test]
    fn test_scene_json_is_camel_case() {
        let scene = TimelineScene::compose(
            &registry(&["a", "b"]),
            &PositionTable::new(vec![1.0, 2.0]),
            None,
            Direction::End,
            &GliderConfig::default(),
        );
        let json = scene.to_json().unwrap();
        assert!(json.contains("\"xPercent\":90"));
        assert!(json.contains("\"sectionId\":\"a\""));
        assert!(json.contains("\"direction\":\"end\""));
    }
}
