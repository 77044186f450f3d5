//! Tracker configuration
//!
//! Every field has a default matching the shipped site, so hosts can pass
//! a partial object (or nothing) from JavaScript.

use serde::{Deserialize, Serialize};

use crate::error::{GliderError, GliderResult};

/// Pulse animation shown on the active dot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PulseConfig {
    /// Scale keyframes applied to the pulse ring
    pub scale: Vec<f64>,

    /// Stroke width keyframes applied to the pulse ring
    pub stroke_width: Vec<f64>,

    /// Seconds per cycle
    pub duration_secs: f64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            scale: vec![1.0, 1.6, 1.1],
            stroke_width: vec![2.0, 3.0, 2.0],
            duration_secs: 1.8,
        }
    }
}

/// Configuration for detection, measurement and rendering
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GliderConfig {
    /// Delay before the first measurement after mount or a section change
    pub settle_delay_ms: u32,

    /// Fraction of the viewport cut from both top and bottom of the
    /// detection band (0.4 leaves the middle 20%)
    pub band_margin: f64,

    /// Minimum visible fraction of a region before it counts as intersecting
    pub threshold: f64,

    /// Distance of the line from the container's near edge, percent of width
    pub edge_inset_percent: f64,

    /// Connecting line color
    pub line_color: String,

    /// Connecting line stroke width
    pub line_width: f64,

    /// Dot radius
    pub dot_radius: f64,

    /// Dot fill color
    pub dot_fill: String,

    /// Dot outline color (also used for the pulse ring)
    pub dot_stroke: String,

    /// Dot outline width
    pub dot_stroke_width: f64,

    /// Radius of the pulse ring on the active dot
    pub pulse_radius: f64,

    pub pulse: PulseConfig,
}

impl Default for GliderConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 200,
            band_margin: 0.4,
            threshold: 0.2,
            edge_inset_percent: 10.0,
            line_color: "#fffffe".to_string(),
            line_width: 5.0,
            dot_radius: 8.0,
            dot_fill: "#fffffe".to_string(),
            dot_stroke: "#6B7C8F".to_string(),
            dot_stroke_width: 2.5,
            pulse_radius: 10.0,
            pulse: PulseConfig::default(),
        }
    }
}

impl GliderConfig {
    /// Check ranges; the tracker refuses to start with an invalid config
    pub fn validate(&self) -> GliderResult<()> {
        if !(0.0..0.5).contains(&self.band_margin) {
            return Err(GliderError::InvalidConfig(format!(
                "bandMargin {} must be in [0, 0.5)",
                self.band_margin
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(GliderError::InvalidConfig(format!(
                "threshold {} must be in [0, 1]",
                self.threshold
            )));
        }
        if !(0.0..=100.0).contains(&self.edge_inset_percent) {
            return Err(GliderError::InvalidConfig(format!(
                "edgeInsetPercent {} must be in [0, 100]",
                self.edge_inset_percent
            )));
        }

        let sizes = [
            ("lineWidth", self.line_width),
            ("dotRadius", self.dot_radius),
            ("dotStrokeWidth", self.dot_stroke_width),
            ("pulseRadius", self.pulse_radius),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value < 0.0 {
                return Err(GliderError::InvalidConfig(format!(
                    "{} {} must be a non-negative number",
                    name, value
                )));
            }
        }

        if !(self.pulse.duration_secs.is_finite() && self.pulse.duration_secs > 0.0) {
            return Err(GliderError::InvalidConfig(
                "pulse.durationSecs must be positive".to_string(),
            ));
        }
        if self.pulse.scale.is_empty() || self.pulse.stroke_width.is_empty() {
            return Err(GliderError::InvalidConfig(
                "pulse keyframes must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
