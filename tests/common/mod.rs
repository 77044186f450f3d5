//! Synthetic host for driving the tracker without a browser
//!
//! Regions live in page coordinates; the fake converts them to viewport
//! rects using the current scroll offset, as `getBoundingClientRect` would.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use glider_timeline::models::{RegionRect, SectionId, SectionRegistry, Viewport};
use glider_timeline::renderers::TimelineScene;
use glider_timeline::tracker::{
    BatchSink, Handler, ObserverOptions, PageEvent, PageEvents, RegionSource, ScenePresenter,
    Subscription, Timer, TrackerPorts, VisibilityEntry, VisibilityPort, VisibilityWatch,
};

#[derive(Default)]
pub struct FakeRegions {
    container: RefCell<Option<(f64, f64)>>,
    regions: RefCell<HashMap<String, (f64, f64)>>,
    scroll: Cell<f64>,
    viewport: Cell<f64>,
    scrolled_to: RefCell<Vec<String>>,
}

impl FakeRegions {
    pub fn new() -> Rc<Self> {
        let regions = Self::default();
        regions.viewport.set(1000.0);
        Rc::new(regions)
    }

    /// Container spanning `[top, bottom]` in page coordinates
    pub fn set_container(&self, top: f64, bottom: f64) {
        *self.container.borrow_mut() = Some((top, bottom));
    }

    pub fn remove_container(&self) {
        *self.container.borrow_mut() = None;
    }

    /// Mount a region spanning `[top, bottom]` in page coordinates
    pub fn mount(&self, id: &str, top: f64, bottom: f64) {
        self.regions.borrow_mut().insert(id.to_string(), (top, bottom));
    }

    pub fn unmount(&self, id: &str) {
        self.regions.borrow_mut().remove(id);
    }

    pub fn set_scroll(&self, y: f64) {
        self.scroll.set(y);
    }

    pub fn scrolled_to(&self) -> Vec<String> {
        self.scrolled_to.borrow().clone()
    }
}

impl RegionSource for FakeRegions {
    fn region(&self, id: &SectionId) -> Option<RegionRect> {
        let (top, bottom) = *self.regions.borrow().get(id.as_str())?;
        Some(RegionRect::from_page_span(top, bottom, self.scroll.get()))
    }

    fn container(&self) -> Option<RegionRect> {
        let (top, bottom) = (*self.container.borrow())?;
        Some(RegionRect::from_page_span(top, bottom, self.scroll.get()))
    }

    fn scroll_y(&self) -> f64 {
        self.scroll.get()
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport.get())
    }

    fn scroll_into_view(&self, id: &SectionId) -> bool {
        if !self.regions.borrow().contains_key(id.as_str()) {
            return false;
        }
        self.scrolled_to.borrow_mut().push(id.as_str().to_string());
        true
    }
}

/// Page events with a live listener count per event kind
#[derive(Default)]
pub struct FakeEvents {
    next: Cell<u64>,
    listeners: Rc<RefCell<Vec<(u64, PageEvent, Handler)>>>,
    log: Rc<RefCell<Vec<String>>>,
}

impl FakeEvents {
    pub fn new(log: Rc<RefCell<Vec<String>>>) -> Rc<Self> {
        Rc::new(Self {
            log,
            ..Self::default()
        })
    }

    pub fn fire(&self, event: PageEvent) {
        let handlers: Vec<Handler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in handlers {
            handler();
        }
    }

    pub fn count(&self, event: PageEvent) -> usize {
        self.listeners.borrow().iter().filter(|(_, e, _)| *e == event).count()
    }
}

impl PageEvents for FakeEvents {
    fn listen(&self, event: PageEvent, handler: Handler) -> Subscription {
        let id = self.next.get();
        self.next.set(id + 1);
        self.listeners.borrow_mut().push((id, event, handler));
        self.log.borrow_mut().push(format!("listen {}", event.dom_name()));

        let listeners = self.listeners.clone();
        let log = self.log.clone();
        Subscription::new(move || {
            listeners.borrow_mut().retain(|(i, _, _)| *i != id);
            log.borrow_mut().push(format!("unlisten {}", event.dom_name()));
        })
    }
}

/// Manually advanced timer
#[derive(Default)]
pub struct FakeTimer {
    next: Cell<u64>,
    pending: Rc<RefCell<Vec<(u64, u32, Box<dyn FnOnce()>)>>>,
    log: Rc<RefCell<Vec<String>>>,
}

impl FakeTimer {
    pub fn new(log: Rc<RefCell<Vec<String>>>) -> Rc<Self> {
        Rc::new(Self {
            log,
            ..Self::default()
        })
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn last_delay(&self) -> Option<u32> {
        self.pending.borrow().last().map(|(_, d, _)| *d)
    }

    /// Run every pending task
    pub fn run_all(&self) {
        let tasks: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        for (_, _, task) in tasks {
            task();
        }
    }
}

impl Timer for FakeTimer {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Subscription {
        let id = self.next.get();
        self.next.set(id + 1);
        self.pending.borrow_mut().push((id, delay_ms, task));
        self.log.borrow_mut().push("schedule".to_string());

        let pending = self.pending.clone();
        let log = self.log.clone();
        Subscription::new(move || {
            pending.borrow_mut().retain(|(i, _, _)| *i != id);
            log.borrow_mut().push("cancel timer".to_string());
        })
    }
}

struct FakeWatchState {
    sink: BatchSink,
    observed: Vec<SectionId>,
    connected: bool,
}

/// Visibility port that records watches and lets tests deliver batches
pub struct FakeVisibility {
    regions: Rc<FakeRegions>,
    watches: Rc<RefCell<Vec<Rc<RefCell<FakeWatchState>>>>>,
    options: RefCell<Option<ObserverOptions>>,
    log: Rc<RefCell<Vec<String>>>,
}

impl FakeVisibility {
    pub fn new(regions: Rc<FakeRegions>, log: Rc<RefCell<Vec<String>>>) -> Rc<Self> {
        Rc::new(Self {
            regions,
            watches: Rc::new(RefCell::new(Vec::new())),
            options: RefCell::new(None),
            log,
        })
    }

    pub fn connected(&self) -> usize {
        self.watches.borrow().iter().filter(|w| w.borrow().connected).count()
    }

    pub fn total_watches(&self) -> usize {
        self.watches.borrow().len()
    }

    pub fn last_options(&self) -> Option<ObserverOptions> {
        *self.options.borrow()
    }

    /// Ids observed by the most recent watch
    pub fn observed(&self) -> Vec<String> {
        self.watches
            .borrow()
            .last()
            .map(|w| w.borrow().observed.iter().map(|s| s.as_str().to_string()).collect())
            .unwrap_or_default()
    }

    /// Deliver a batch through watch number `index`, even if it was
    /// disconnected (simulates a late callback from the host)
    pub fn deliver_via(&self, index: usize, entries: Vec<VisibilityEntry>) {
        let sink = self.watches.borrow()[index].borrow().sink.clone();
        sink(entries);
    }

    /// Deliver a batch through every connected watch
    pub fn deliver(&self, entries: Vec<VisibilityEntry>) {
        let sinks: Vec<BatchSink> = self
            .watches
            .borrow()
            .iter()
            .filter(|w| w.borrow().connected)
            .map(|w| w.borrow().sink.clone())
            .collect();
        for sink in sinks {
            sink(entries.clone());
        }
    }
}

impl VisibilityPort for FakeVisibility {
    fn watch(&self, options: &ObserverOptions, sink: BatchSink) -> Box<dyn VisibilityWatch> {
        *self.options.borrow_mut() = Some(*options);
        let state = Rc::new(RefCell::new(FakeWatchState {
            sink,
            observed: Vec::new(),
            connected: true,
        }));
        self.watches.borrow_mut().push(state.clone());
        self.log.borrow_mut().push("watch".to_string());

        Box::new(FakeWatch {
            state,
            regions: self.regions.clone(),
            log: self.log.clone(),
        })
    }
}

struct FakeWatch {
    state: Rc<RefCell<FakeWatchState>>,
    regions: Rc<FakeRegions>,
    log: Rc<RefCell<Vec<String>>>,
}

impl VisibilityWatch for FakeWatch {
    fn observe(&mut self, id: &SectionId) -> bool {
        if self.regions.region(id).is_none() {
            return false;
        }
        self.state.borrow_mut().observed.push(id.clone());
        true
    }

    fn disconnect(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.connected {
            state.connected = false;
            self.log.borrow_mut().push("disconnect".to_string());
        }
    }
}

/// Records every presented scene
#[derive(Default)]
pub struct RecordingPresenter {
    scenes: RefCell<Vec<TimelineScene>>,
}

impl RecordingPresenter {
    pub fn count(&self) -> usize {
        self.scenes.borrow().len()
    }

    pub fn last(&self) -> Option<TimelineScene> {
        self.scenes.borrow().last().cloned()
    }
}

impl ScenePresenter for RecordingPresenter {
    fn present(&self, scene: &TimelineScene) {
        self.scenes.borrow_mut().push(scene.clone());
    }
}

/// All fakes wired together
pub struct Host {
    pub regions: Rc<FakeRegions>,
    pub events: Rc<FakeEvents>,
    pub timer: Rc<FakeTimer>,
    pub visibility: Rc<FakeVisibility>,
    pub presenter: Rc<RecordingPresenter>,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl Host {
    pub fn new() -> Self {
        let log = Rc::new(RefCell::new(Vec::new()));
        let regions = FakeRegions::new();
        Self {
            events: FakeEvents::new(log.clone()),
            timer: FakeTimer::new(log.clone()),
            visibility: FakeVisibility::new(regions.clone(), log.clone()),
            presenter: Rc::new(RecordingPresenter::default()),
            regions,
            log,
        }
    }

    /// The three-section page used throughout the tests
    pub fn with_sample_page() -> Self {
        let host = Self::new();
        host.regions.set_container(100.0, 1000.0);
        host.regions.mount("intro", 100.0, 300.0);
        host.regions.mount("about", 400.0, 600.0);
        host.regions.mount("contact", 700.0, 900.0);
        host
    }

    pub fn ports(&self) -> TrackerPorts {
        TrackerPorts {
            regions: self.regions.clone(),
            events: self.events.clone(),
            timer: self.timer.clone(),
            visibility: self.visibility.clone(),
            presenter: Some(self.presenter.clone() as Rc<dyn ScenePresenter>),
        }
    }

    pub fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

pub fn registry(ids: &[&str]) -> SectionRegistry {
    SectionRegistry::new(ids.iter().copied()).expect("valid registry")
}
