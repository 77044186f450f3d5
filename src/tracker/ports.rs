//! Host ports the tracker depends on
//!
//! The tracker never touches the browser directly. Geometry lookups, page
//! events, the settling timer, visibility watching and presentation all go
//! through these traits, so tests can drive it with synthetic events and
//! the WASM layer can plug in `web-sys` implementations.

use std::rc::Rc;

use crate::models::{RegionRect, SectionId, Viewport};
use crate::renderers::scene::TimelineScene;
use crate::tracker::observer::{ObserverOptions, VisibilityEntry};

/// Geometry and navigation for the regions backing each section
pub trait RegionSource {
    /// Viewport rect of the region backing `id`, if it is mounted
    fn region(&self, id: &SectionId) -> Option<RegionRect>;

    /// Viewport rect of the tracker container (the coordinate origin)
    fn container(&self) -> Option<RegionRect>;

    /// Current vertical page scroll offset
    fn scroll_y(&self) -> f64;

    fn viewport(&self) -> Viewport;

    /// Smooth-scroll the region to the vertical center of the viewport.
    /// Returns false when the region is not mounted.
    fn scroll_into_view(&self, id: &SectionId) -> bool;
}

/// Page-level events that trigger a layout recompute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageEvent {
    Resize,
    Scroll,
}

impl PageEvent {
    pub const ALL: [PageEvent; 2] = [PageEvent::Resize, PageEvent::Scroll];

    /// DOM event type name
    pub fn dom_name(self) -> &'static str {
        match self {
            PageEvent::Resize => "resize",
            PageEvent::Scroll => "scroll",
        }
    }
}

pub type Handler = Rc<dyn Fn()>;

pub trait PageEvents {
    /// Register `handler` for `event` until the returned guard is dropped
    fn listen(&self, event: PageEvent, handler: Handler) -> Subscription;
}

pub trait Timer {
    /// Run `task` once after `delay_ms`, unless the guard is dropped first
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Subscription;
}

/// Receives each batch of visibility changes
pub type BatchSink = Rc<dyn Fn(Vec<VisibilityEntry>)>;

/// Factory for visibility watches (an `IntersectionObserver` in the browser)
pub trait VisibilityPort {
    fn watch(&self, options: &ObserverOptions, sink: BatchSink) -> Box<dyn VisibilityWatch>;
}

/// One live observer. Implementations must stop delivering batches once
/// `disconnect` returns.
pub trait VisibilityWatch {
    /// Start watching the region backing `id`; false when it is not mounted
    fn observe(&mut self, id: &SectionId) -> bool;

    /// Release every region watched by this observer
    fn disconnect(&mut self);
}

/// Receives a fresh scene whenever positions or the active section change
pub trait ScenePresenter {
    fn present(&self, scene: &TimelineScene);
}

/// Cancel guard for a listener or pending timer
///
/// Dropping the guard (or calling `cancel`) runs the cancellation exactly once.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A guard with nothing to cancel
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}
