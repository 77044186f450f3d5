//! Section Timeline Tracker
//!
//! Ties the detector and the layout engine to the host ports. Every call to
//! `set_sections` with a new registry starts a new epoch:
//!
//! 1. the previous epoch's visibility watch, settling timer and page
//!    listeners are released together;
//! 2. the epoch counter moves on, so anything the host still delivers for
//!    the old epoch is discarded;
//! 3. the new watch, listeners and timer are registered.
//!
//! The settling timer, resize and scroll all run the same recompute closure.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::GliderConfig;
use crate::error::GliderResult;
use crate::models::{Direction, SectionId, SectionRegistry};
use crate::renderers::scene::TimelineScene;
use crate::tracker::detector::ActiveSectionDetector;
use crate::tracker::layout::{LayoutEngine, PositionTable};
use crate::tracker::observer::{ObserverOptions, VisibilityEntry};
use crate::tracker::ports::{
    BatchSink, Handler, PageEvent, PageEvents, RegionSource, ScenePresenter, Subscription, Timer,
    VisibilityPort,
};

/// Host services the tracker runs on
#[derive(Clone)]
pub struct TrackerPorts {
    pub regions: Rc<dyn RegionSource>,
    pub events: Rc<dyn PageEvents>,
    pub timer: Rc<dyn Timer>,
    pub visibility: Rc<dyn VisibilityPort>,
    pub presenter: Option<Rc<dyn ScenePresenter>>,
}

/// Guards owned by one epoch; dropping them cancels the timer and
/// removes both page listeners.
struct EpochGuards {
    _settle: Subscription,
    _listeners: Vec<Subscription>,
}

struct TrackerState {
    config: GliderConfig,
    direction: Direction,
    registry: SectionRegistry,
    epoch: u64,
    subscribed: bool,
    detector: ActiveSectionDetector,
    positions: PositionTable,
    guards: Option<EpochGuards>,
}

impl TrackerState {
    fn scene(&self) -> TimelineScene {
        TimelineScene::compose(
            &self.registry,
            &self.positions,
            self.detector.active(),
            self.direction,
            &self.config,
        )
    }

    /// Release the detector watch and hand back the epoch guards, so the
    /// caller can drop them outside the borrow.
    fn release_epoch(&mut self) -> Option<EpochGuards> {
        self.detector.release();
        self.subscribed = false;
        self.guards.take()
    }
}

pub struct SectionTracker {
    state: Rc<RefCell<TrackerState>>,
    ports: TrackerPorts,
}

impl SectionTracker {
    pub fn new(config: GliderConfig, direction: Direction, ports: TrackerPorts) -> GliderResult<Self> {
        config.validate()?;

        let state = TrackerState {
            config,
            direction,
            registry: SectionRegistry::empty(),
            epoch: 0,
            subscribed: false,
            detector: ActiveSectionDetector::new(),
            positions: PositionTable::default(),
            guards: None,
        };

        Ok(Self {
            state: Rc::new(RefCell::new(state)),
            ports,
        })
    }

    /// Track `registry`, re-subscribing everything if it differs from the
    /// current one. Passing an identical registry while subscribed is a no-op.
    pub fn set_sections(&mut self, registry: SectionRegistry) {
        let previous = {
            let mut state = self.state.borrow_mut();
            if state.subscribed && state.registry == registry {
                return;
            }
            state.release_epoch()
        };
        drop(previous);

        let (epoch, options, delay_ms) = {
            let mut state = self.state.borrow_mut();
            state.epoch += 1;
            state.registry = registry.clone();
            state.positions = PositionTable::default();
            state.detector.retain_in(&registry);
            (
                state.epoch,
                ObserverOptions::from_config(&state.config),
                state.config.settle_delay_ms,
            )
        };

        let weak = Rc::downgrade(&self.state);

        let sink = batch_sink(weak.clone(), epoch, self.ports.presenter.clone());
        let (watch, observed) =
            ActiveSectionDetector::observe_all(self.ports.visibility.as_ref(), &options, &registry, sink);

        let recompute = recompute_handler(weak, epoch, self.ports.regions.clone(), self.ports.presenter.clone());
        let listeners = PageEvent::ALL
            .iter()
            .map(|event| self.ports.events.listen(*event, recompute.clone()))
            .collect();
        let settle = {
            let recompute = recompute.clone();
            self.ports.timer.schedule(delay_ms, Box::new(move || recompute()))
        };

        {
            let mut state = self.state.borrow_mut();
            state.detector.attach(watch);
            state.guards = Some(EpochGuards {
                _settle: settle,
                _listeners: listeners,
            });
            state.subscribed = true;
        }

        log::debug!(
            "Tracking {} sections (epoch {}, {} regions watched, settle {}ms)",
            registry.len(),
            epoch,
            observed,
            delay_ms
        );

        self.present();
    }

    /// Release every watch, listener and pending timer
    pub fn teardown(&mut self) {
        let previous = {
            let mut state = self.state.borrow_mut();
            if !state.subscribed {
                return;
            }
            state.epoch += 1;
            state.release_epoch()
        };
        drop(previous);
        log::debug!("Section tracker torn down");
    }

    /// Run the recompute routine now, as a resize or scroll would.
    /// A torn-down tracker ignores it.
    pub fn recompute(&self) {
        let epoch = {
            let state = self.state.borrow();
            if !state.subscribed {
                return;
            }
            state.epoch
        };
        recompute_positions(
            &Rc::downgrade(&self.state),
            epoch,
            self.ports.regions.as_ref(),
            self.ports.presenter.as_ref(),
        );
    }

    pub fn set_direction(&mut self, direction: Direction) {
        {
            let mut state = self.state.borrow_mut();
            if state.direction == direction {
                return;
            }
            state.direction = direction;
        }
        self.present();
    }

    /// Smooth-scroll the section's region into the middle of the viewport.
    /// Returns false for unknown or unmounted sections.
    pub fn navigate_to(&self, id: &str) -> bool {
        let target = {
            let state = self.state.borrow();
            state.registry.iter().find(|s| s.as_str() == id).cloned()
        };
        match target {
            Some(id) => self.ports.regions.scroll_into_view(&id),
            None => {
                log::debug!("navigate_to: '{}' is not a tracked section", id);
                false
            }
        }
    }

    pub fn navigate_to_index(&self, index: usize) -> bool {
        let target = self.state.borrow().registry.get(index).cloned();
        match target {
            Some(id) => self.ports.regions.scroll_into_view(&id),
            None => false,
        }
    }

    pub fn active_section(&self) -> Option<SectionId> {
        self.state.borrow().detector.active().cloned()
    }

    pub fn positions(&self) -> PositionTable {
        self.state.borrow().positions.clone()
    }

    pub fn registry(&self) -> SectionRegistry {
        self.state.borrow().registry.clone()
    }

    pub fn direction(&self) -> Direction {
        self.state.borrow().direction
    }

    pub fn epoch(&self) -> u64 {
        self.state.borrow().epoch
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.borrow().subscribed
    }

    pub fn scene(&self) -> TimelineScene {
        self.state.borrow().scene()
    }

    fn present(&self) {
        if let Some(presenter) = &self.ports.presenter {
            let scene = self.scene();
            presenter.present(&scene);
        }
    }
}

impl Drop for SectionTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn batch_sink(
    state: Weak<RefCell<TrackerState>>,
    epoch: u64,
    presenter: Option<Rc<dyn ScenePresenter>>,
) -> BatchSink {
    Rc::new(move |entries: Vec<VisibilityEntry>| {
        let Some(state) = state.upgrade() else {
            return;
        };
        let scene = {
            let Ok(mut state) = state.try_borrow_mut() else {
                log::warn!("Visibility batch delivered re-entrantly, dropping it");
                return;
            };
            if state.epoch != epoch {
                log::warn!("Dropping visibility batch from stale epoch {}", epoch);
                return;
            }
            let TrackerState { detector, registry, .. } = &mut *state;
            if !detector.apply_batch(registry, &entries) {
                return;
            }
            state.scene()
        };
        if let Some(presenter) = &presenter {
            presenter.present(&scene);
        }
    })
}

fn recompute_handler(
    state: Weak<RefCell<TrackerState>>,
    epoch: u64,
    regions: Rc<dyn RegionSource>,
    presenter: Option<Rc<dyn ScenePresenter>>,
) -> Handler {
    Rc::new(move || recompute_positions(&state, epoch, regions.as_ref(), presenter.as_ref()))
}

/// The single recompute routine behind the settling timer, resize and scroll
fn recompute_positions(
    state: &Weak<RefCell<TrackerState>>,
    epoch: u64,
    regions: &dyn RegionSource,
    presenter: Option<&Rc<dyn ScenePresenter>>,
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let scene = {
        let Ok(mut state) = state.try_borrow_mut() else {
            log::warn!("Recompute requested re-entrantly, skipping it");
            return;
        };
        if state.epoch != epoch {
            log::warn!("Ignoring recompute from stale epoch {}", epoch);
            return;
        }
        let Some(table) = LayoutEngine::measure(&state.registry, regions) else {
            log::debug!("Container not mounted, keeping previous positions");
            return;
        };
        if table == state.positions {
            return;
        }
        state.positions = table;
        state.scene()
    };
    if let Some(presenter) = presenter {
        presenter.present(&scene);
    }
}
