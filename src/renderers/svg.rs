//! SVG rendering of the timeline overlay
//!
//! The overlay covers the whole container with pointer events disabled,
//! except on dot groups so clicks reach them. The pulse on the active dot
//! is a SMIL animation: radius and stroke width cycle through the
//! keyframes forward and back, forever.

use std::fmt::Write;

use crate::renderers::scene::{RenderDot, RenderLine, RenderPulse, TimelineScene};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Style of the overlay root element
pub const OVERLAY_STYLE: &str =
    "position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;z-index:0";

/// Dots grow slightly on hover
const DOT_HOVER_STYLE: &str = "<style>.glider-dot{transition:transform 300ms ease-in-out;\
transform-box:fill-box;transform-origin:center}.glider-dot:hover{transform:scale(1.1)}</style>";

/// Cubic bezier matching CSS `ease-in-out`
const EASE_IN_OUT: &str = "0.42 0 0.58 1";

/// Attribute carrying the section id on each dot group
pub const DATA_SECTION_ID: &str = "data-section-id";
pub const DATA_SECTION_INDEX: &str = "data-section-index";

pub struct SvgRenderer;

impl SvgRenderer {
    /// Complete `<svg>` element for the scene
    pub fn render(scene: &TimelineScene) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="{}" class="glider-timeline" style="{}">"#,
            SVG_NS, OVERLAY_STYLE
        );
        out.push_str(&Self::render_contents(scene));
        out.push_str("</svg>");
        out
    }

    /// Children of the overlay only (line and dot groups)
    pub fn render_contents(scene: &TimelineScene) -> String {
        let x = format!("{}%", fmt_num(scene.x_percent));
        let mut out = String::from(DOT_HOVER_STYLE);

        if let Some(line) = &scene.line {
            Self::write_line(&mut out, &x, line);
        }
        for dot in &scene.dots {
            Self::write_dot(&mut out, &x, dot);
        }

        out
    }

    fn write_line(out: &mut String, x: &str, line: &RenderLine) {
        let _ = write!(
            out,
            r#"<line x1="{x}" y1="{}" x2="{x}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_num(line.y1),
            fmt_num(line.y2),
            escape_xml(&line.stroke),
            fmt_num(line.stroke_width),
        );
    }

    fn write_dot(out: &mut String, x: &str, dot: &RenderDot) {
        let _ = write!(
            out,
            r#"<g class="glider-dot" {}="{}" {}="{}" style="pointer-events:auto;cursor:pointer">"#,
            DATA_SECTION_ID,
            escape_xml(dot.section_id.as_str()),
            DATA_SECTION_INDEX,
            dot.index,
        );
        let _ = write!(
            out,
            r#"<circle cx="{x}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_num(dot.cy),
            fmt_num(dot.r),
            escape_xml(&dot.fill),
            escape_xml(&dot.stroke),
            fmt_num(dot.stroke_width),
        );
        if let Some(pulse) = &dot.pulse {
            Self::write_pulse(out, x, dot.cy, pulse);
        }
        out.push_str("</g>");
    }

    fn write_pulse(out: &mut String, x: &str, cy: f64, pulse: &RenderPulse) {
        let radii: Vec<f64> = pulse.scale.iter().map(|s| s * pulse.r).collect();
        let first_width = pulse.stroke_width.first().copied().unwrap_or(0.0);

        let _ = write!(
            out,
            r#"<circle class="glider-pulse" cx="{x}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="{}">"#,
            fmt_num(cy),
            fmt_num(pulse.r),
            escape_xml(&pulse.fill),
            escape_xml(&pulse.stroke),
            fmt_num(first_width),
        );
        Self::write_animate(out, "r", &radii, pulse.duration_secs);
        Self::write_animate(out, "stroke-width", &pulse.stroke_width, pulse.duration_secs);
        out.push_str("</circle>");
    }

    fn write_animate(out: &mut String, attribute: &str, keyframes: &[f64], duration_secs: f64) {
        let values = mirrored(keyframes);
        if values.len() < 2 {
            return;
        }
        let segments = values.len() - 1;
        let key_times: Vec<String> = (0..=segments)
            .map(|i| fmt_num(i as f64 / segments as f64))
            .collect();
        let splines = vec![EASE_IN_OUT; segments].join(";");

        let _ = write!(
            out,
            r#"<animate attributeName="{}" values="{}" keyTimes="{}" calcMode="spline" keySplines="{}" dur="{}s" repeatCount="indefinite"/>"#,
            attribute,
            values.iter().map(|v| fmt_num(*v)).collect::<Vec<_>>().join(";"),
            key_times.join(";"),
            splines,
            // one forward pass plus its mirror
            fmt_num(duration_secs * 2.0),
        );
    }
}

/// Keyframes followed by their reverse, so the loop plays back and forth
fn mirrored(keyframes: &[f64]) -> Vec<f64> {
    let mut values = keyframes.to_vec();
    values.extend(keyframes.iter().rev().skip(1));
    values
}

/// Shortest decimal form, rounded to 0.001
fn fmt_num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
