//! Visibility watching
//!
//! Options and entries mirror `IntersectionObserver`. `PolledObserver`
//! provides the same contract from plain geometry for hosts that have no
//! native intersection primitive: call `poll` on scroll/resize and it
//! delivers only the regions whose intersecting state changed.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::GliderConfig;
use crate::models::{RegionRect, SectionId, Viewport};
use crate::tracker::ports::{BatchSink, RegionSource, VisibilityPort, VisibilityWatch};

/// Detection band and threshold for one observer
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObserverOptions {
    /// Fraction of the viewport excluded at the top and at the bottom
    pub band_margin: f64,

    /// Minimum visible fraction of the region
    pub threshold: f64,
}

impl ObserverOptions {
    pub fn from_config(config: &GliderConfig) -> Self {
        Self {
            band_margin: config.band_margin,
            threshold: config.threshold,
        }
    }

    /// CSS root margin string, e.g. `-40% 0px -40% 0px`
    pub fn root_margin(&self) -> String {
        let pct = format_percent(self.band_margin * 100.0);
        format!("-{}% 0px -{}% 0px", pct, pct)
    }

    pub fn is_intersecting(&self, ratio: f64) -> bool {
        ratio > 0.0 && ratio >= self.threshold
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::from_config(&GliderConfig::default())
    }
}

fn format_percent(value: f64) -> String {
    // 40.0 -> "40", 12.5 -> "12.5"
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// One visibility change for one section
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityEntry {
    pub id: SectionId,
    pub is_intersecting: bool,
    pub ratio: f64,
}

impl VisibilityEntry {
    pub fn new(id: impl Into<SectionId>, is_intersecting: bool, ratio: f64) -> Self {
        Self {
            id: id.into(),
            is_intersecting,
            ratio,
        }
    }
}

/// Fraction of `rect` inside the middle band of the viewport
///
/// Zero-height regions count as fully visible when their top edge lies in
/// the band.
pub fn band_intersection(viewport: Viewport, rect: RegionRect, band_margin: f64) -> f64 {
    let (band_top, band_bottom) = viewport.band(band_margin);

    if rect.height <= 0.0 {
        return if rect.top >= band_top && rect.top <= band_bottom {
            1.0
        } else {
            0.0
        };
    }

    let overlap = rect.bottom().min(band_bottom) - rect.top.max(band_top);
    if overlap <= 0.0 {
        0.0
    } else {
        (overlap / rect.height).min(1.0)
    }
}

struct PolledState {
    options: ObserverOptions,
    sink: BatchSink,
    /// Watched sections with the last reported intersecting state
    targets: Vec<(SectionId, Option<bool>)>,
    connected: bool,
}

/// Geometry-polling implementation of `VisibilityPort`
pub struct PolledObserver {
    regions: Rc<dyn RegionSource>,
    watches: Rc<RefCell<Vec<Weak<RefCell<PolledState>>>>>,
}

impl PolledObserver {
    pub fn new(regions: Rc<dyn RegionSource>) -> Self {
        Self {
            regions,
            watches: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Number of connected watches
    pub fn live_watches(&self) -> usize {
        self.live().iter().filter(|w| w.borrow().connected).count()
    }

    fn live(&self) -> Vec<Rc<RefCell<PolledState>>> {
        let mut watches = self.watches.borrow_mut();
        watches.retain(|w| w.strong_count() > 0);
        watches.iter().filter_map(Weak::upgrade).collect()
    }

    /// Re-test every watched region and deliver changes, one batch per watch
    pub fn poll(&self) {
        let viewport = self.regions.viewport();

        for watch in self.live() {
            let (sink, entries) = {
                let mut state = watch.borrow_mut();
                if !state.connected {
                    continue;
                }
                let options = state.options;
                let mut entries = Vec::new();

                for (id, last) in state.targets.iter_mut() {
                    let Some(rect) = self.regions.region(id) else {
                        continue;
                    };
                    let ratio = band_intersection(viewport, rect, options.band_margin);
                    let now = options.is_intersecting(ratio);
                    if *last != Some(now) {
                        *last = Some(now);
                        entries.push(VisibilityEntry::new(id.clone(), now, ratio));
                    }
                }

                (state.sink.clone(), entries)
            };

            if !entries.is_empty() {
                sink(entries);
            }
        }
    }
}

impl VisibilityPort for PolledObserver {
    fn watch(&self, options: &ObserverOptions, sink: BatchSink) -> Box<dyn VisibilityWatch> {
        let state = Rc::new(RefCell::new(PolledState {
            options: *options,
            sink,
            targets: Vec::new(),
            connected: true,
        }));
        self.watches.borrow_mut().push(Rc::downgrade(&state));

        Box::new(PolledWatch {
            state,
            regions: self.regions.clone(),
        })
    }
}

struct PolledWatch {
    state: Rc<RefCell<PolledState>>,
    regions: Rc<dyn RegionSource>,
}

impl VisibilityWatch for PolledWatch {
    fn observe(&mut self, id: &SectionId) -> bool {
        if self.regions.region(id).is_none() {
            return false;
        }
        let mut state = self.state.borrow_mut();
        if !state.connected || state.targets.iter().any(|(t, _)| t == id) {
            return state.connected;
        }
        state.targets.push((id.clone(), None));
        true
    }

    fn disconnect(&mut self) {
        let mut state = self.state.borrow_mut();
        state.connected = false;
        state.targets.clear();
    }
}

impl Drop for PolledWatch {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport { height: 1000.0 };

    #[test]
    fn test_root_margin_string() {
        assert_eq!(ObserverOptions::default().root_margin(), "-40% 0px -40% 0px");
        let opts = ObserverOptions { band_margin: 0.125, threshold: 0.0 };
        assert_eq!(opts.root_margin(), "-12.5% 0px -12.5% 0px");
    }

    #[test]
    fn test_band_is_middle_fifth() {
        assert_eq!(VIEWPORT.band(0.4), (400.0, 600.0));
    }

    #[test]
    fn test_region_fully_inside_band() {
        let ratio = band_intersection(VIEWPORT, RegionRect::new(450.0, 100.0), 0.4);
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn test_region_partially_inside_band() {
        // 200px tall region, 50px of it between 400 and 600
        let ratio = band_intersection(VIEWPORT, RegionRect::new(550.0, 200.0), 0.4);
        assert!((ratio - 0.25).abs() < 1e-9);
        assert!(ObserverOptions::default().is_intersecting(ratio));

        let ratio = band_intersection(VIEWPORT, RegionRect::new(580.0, 200.0), 0.4);
        assert!((ratio - 0.1).abs() < 1e-9);
        assert!(!ObserverOptions::default().is_intersecting(ratio));
    }

    #[test]
    fn test_region_outside_band() {
        assert_eq!(band_intersection(VIEWPORT, RegionRect::new(0.0, 300.0), 0.4), 0.0);
        assert_eq!(band_intersection(VIEWPORT, RegionRect::new(700.0, 300.0), 0.4), 0.0);
    }

    #[test]
    fn test_zero_height_region() {
        assert_eq!(band_intersection(VIEWPORT, RegionRect::new(500.0, 0.0), 0.4), 1.0);
        assert_eq!(band_intersection(VIEWPORT, RegionRect::new(100.0, 0.0), 0.4), 0.0);
    }
}
