//! Active Section Detector
//!
//! Watches the region behind every registered section and keeps the one
//! most recently reported as intersecting the middle band of the viewport.

use crate::models::{SectionId, SectionRegistry};
use crate::tracker::observer::{ObserverOptions, VisibilityEntry};
use crate::tracker::ports::{BatchSink, VisibilityPort, VisibilityWatch};

/// Holds the active section and the live watch of the current epoch
#[derive(Default)]
pub struct ActiveSectionDetector {
    active: Option<SectionId>,
    watch: Option<Box<dyn VisibilityWatch>>,
}

impl ActiveSectionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&SectionId> {
        self.active.as_ref()
    }

    /// Create a watch for `registry` and observe every mounted region.
    ///
    /// Sections without a mounted region are skipped. Returns the watch
    /// together with the number of regions actually observed.
    pub fn observe_all(
        port: &dyn VisibilityPort,
        options: &ObserverOptions,
        registry: &SectionRegistry,
        sink: BatchSink,
    ) -> (Box<dyn VisibilityWatch>, usize) {
        let mut watch = port.watch(options, sink);
        let mut observed = 0;

        for id in registry {
            if watch.observe(id) {
                observed += 1;
            } else {
                log::debug!("Section '{}' has no region, not watching it", id);
            }
        }

        (watch, observed)
    }

    /// Install the watch for a new epoch, releasing any previous one first
    pub fn attach(&mut self, watch: Box<dyn VisibilityWatch>) {
        self.release();
        self.watch = Some(watch);
    }

    /// Disconnect the current watch, if any
    pub fn release(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            watch.disconnect();
        }
    }

    /// Drop the active section if it is not part of `registry`
    pub fn retain_in(&mut self, registry: &SectionRegistry) {
        if let Some(active) = &self.active {
            if !registry.contains(active) {
                self.active = None;
            }
        }
    }

    /// Apply one batch of visibility changes.
    ///
    /// Every intersecting entry overwrites the active section in delivery
    /// order, so the last one in the batch wins. Entries for sections that
    /// are not in `registry` are ignored. Returns true if the active
    /// section changed.
    pub fn apply_batch(&mut self, registry: &SectionRegistry, entries: &[VisibilityEntry]) -> bool {
        let before = self.active.clone();

        for entry in entries {
            if !entry.is_intersecting {
                continue;
            }
            if !registry.contains(&entry.id) {
                log::debug!("Ignoring visibility entry for unknown section '{}'", entry.id);
                continue;
            }
            self.active = Some(entry.id.clone());
        }

        self.active != before
    }
}

impl Drop for ActiveSectionDetector {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SectionRegistry {
        SectionRegistry::new(["intro", "about", "contact"]).unwrap()
    }

    #[test]
    fn test_intersecting_entry_becomes_active() {
        let mut detector = ActiveSectionDetector::new();
        let changed = detector.apply_batch(&registry(), &[VisibilityEntry::new("about", true, 0.25)]);
        assert!(changed);
        assert_eq!(detector.active().map(|s| s.as_str()), Some("about"));
    }

    #[test]
    fn test_non_intersecting_entry_keeps_previous() {
        let mut detector = ActiveSectionDetector::new();
        detector.apply_batch(&registry(), &[VisibilityEntry::new("intro", true, 0.5)]);
        let changed = detector.apply_batch(&registry(), &[VisibilityEntry::new("intro", false, 0.0)]);
        assert!(!changed);
        assert_eq!(detector.active().map(|s| s.as_str()), Some("intro"));
    }

    #[test]
    fn test_last_writer_wins_within_batch() {
        let mut detector = ActiveSectionDetector::new();
        detector.apply_batch(
            &registry(),
            &[
                VisibilityEntry::new("contact", true, 0.3),
                VisibilityEntry::new("intro", false, 0.0),
                VisibilityEntry::new("about", true, 0.9),
            ],
        );
        assert_eq!(detector.active().map(|s| s.as_str()), Some("about"));
    }

    #[test]
    fn test_unknown_section_ignored() {
        let mut detector = ActiveSectionDetector::new();
        let changed = detector.apply_batch(&registry(), &[VisibilityEntry::new("pricing", true, 1.0)]);
        assert!(!changed);
        assert!(detector.active().is_none());
    }

    #[test]
    fn test_retain_in_clears_missing_active() {
        let mut detector = ActiveSectionDetector::new();
        detector.apply_batch(&registry(), &[VisibilityEntry::new("about", true, 1.0)]);

        detector.retain_in(&SectionRegistry::new(["about", "faq"]).unwrap());
        assert_eq!(detector.active().map(|s| s.as_str()), Some("about"));

        detector.retain_in(&SectionRegistry::new(["faq"]).unwrap());
        assert!(detector.active().is_none());
    }
}
