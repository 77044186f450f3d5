//! Section tracking core
//!
//! Host-independent: everything the browser provides comes in through
//! `ports`, so the detector, the layout engine and the epoch lifecycle can
//! be driven by synthetic events.

pub mod ports;
pub mod observer;
pub mod detector;
pub mod layout;
pub mod glider;

pub use detector::ActiveSectionDetector;
pub use glider::{SectionTracker, TrackerPorts};
pub use layout::{section_offset, LayoutEngine, PositionTable};
pub use observer::{band_intersection, ObserverOptions, PolledObserver, VisibilityEntry};
pub use ports::{
    BatchSink, Handler, PageEvent, PageEvents, RegionSource, ScenePresenter, Subscription, Timer,
    VisibilityPort, VisibilityWatch,
};
