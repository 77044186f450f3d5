//! Indicator Layout Engine
//!
//! Computes where each dot goes: the vertical midpoint of every section's
//! region, relative to the top of the tracker container. The table is always
//! rebuilt from scratch, one entry per registered section.

use serde::{Deserialize, Serialize};

use crate::models::{RegionRect, SectionRegistry};
use crate::tracker::ports::RegionSource;

/// Container-relative vertical offsets, parallel to the section registry
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct PositionTable {
    offsets: Vec<f64>,
}

impl PositionTable {
    pub fn new(offsets: Vec<f64>) -> Self {
        Self { offsets }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.offsets.get(index).copied()
    }

    pub fn first(&self) -> Option<f64> {
        self.offsets.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.offsets.last().copied()
    }

    /// Line endpoints (first, last); None with fewer than two entries
    pub fn endpoints(&self) -> Option<(f64, f64)> {
        if self.offsets.len() < 2 {
            return None;
        }
        Some((self.offsets[0], self.offsets[self.offsets.len() - 1]))
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.offsets.iter().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.offsets
    }
}

/// Offset of one region's midpoint below the container top.
///
/// Both edges are lifted into page coordinates with the same scroll offset,
/// so the result does not depend on where the page was scrolled when the
/// rects were read.
pub fn section_offset(container: RegionRect, region: RegionRect, scroll_y: f64) -> f64 {
    let container_top = container.top + scroll_y;
    region.mid() + scroll_y - container_top
}

/// Stateless position calculator
pub struct LayoutEngine;

impl LayoutEngine {
    /// Build a table from already-resolved rects (`None` = not mounted → 0)
    pub fn compute(container: RegionRect, regions: &[Option<RegionRect>], scroll_y: f64) -> PositionTable {
        let offsets = regions
            .iter()
            .map(|region| match region {
                Some(rect) => section_offset(container, *rect, scroll_y),
                None => 0.0,
            })
            .collect();

        PositionTable::new(offsets)
    }

    /// Measure every section of `registry` through the host.
    ///
    /// Returns None when the container itself is not mounted; callers keep
    /// their previous table in that case.
    pub fn measure(registry: &SectionRegistry, source: &dyn RegionSource) -> Option<PositionTable> {
        let container = source.container()?;
        let scroll_y = source.scroll_y();

        let regions: Vec<Option<RegionRect>> = registry.iter().map(|id| source.region(id)).collect();

        Some(Self::compute(container, &regions, scroll_y))
    }
}
