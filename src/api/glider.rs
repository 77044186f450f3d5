//! JavaScript-facing timeline tracker
//!
//! `new Glider("timeline", "he", ["intro", "about", "contact"])` mounts an
//! SVG overlay inside the container, starts watching the sections and keeps
//! the overlay in sync. Clicking a dot smooth-scrolls to its section.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use crate::api::dom::{
    browser_document, browser_window, DomRegions, NativeVisibility, SvgOverlay, WindowEvents,
    WindowTimer,
};
use crate::api::helpers::{deserialize, deserialize_or_default, serialize, to_js_error};
use crate::config::GliderConfig;
use crate::error::GliderError;
use crate::models::{Language, SectionRegistry};
use crate::renderers::svg::{SvgRenderer, DATA_SECTION_ID};
use crate::tracker::glider::{SectionTracker, TrackerPorts};
use crate::tracker::observer::PolledObserver;
use crate::tracker::ports::{
    PageEvent, PageEvents, RegionSource, ScenePresenter, Subscription, VisibilityPort,
};
use crate::{wasm_log, wasm_warn};

/// Keeps the polled visibility fallback ticking on scroll and resize
struct PollDriver {
    observer: Rc<PolledObserver>,
    _listeners: Vec<Subscription>,
}

#[wasm_bindgen]
pub struct Glider {
    tracker: Rc<RefCell<SectionTracker>>,
    overlay: Rc<SvgOverlay>,
    click: Option<Closure<dyn Fn(web_sys::Event)>>,
    poll: Option<PollDriver>,
    destroyed: bool,
}

#[wasm_bindgen]
impl Glider {
    /// Mount the tracker inside the element with id `container_id`.
    ///
    /// `lang` is "he" (timeline on the right) or "en" (on the left);
    /// `sections` is an array of section element ids; `config` is an
    /// optional partial `GliderConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, lang: &str, sections: JsValue, config: JsValue) -> Result<Glider, JsValue> {
        let language: Language = lang.parse().map_err(to_js_error)?;
        let registry: SectionRegistry = deserialize(sections, "Failed to read sections")?;
        let config: GliderConfig = deserialize_or_default(config, "Failed to read config")?;
        // Reject bad input before touching the DOM
        config.validate().map_err(to_js_error)?;

        let window = browser_window().map_err(to_js_error)?;
        let document = browser_document(&window).map_err(to_js_error)?;

        let regions = Rc::new(DomRegions::new(window.clone(), document.clone(), container_id));
        let container = regions.container_element().ok_or_else(|| {
            to_js_error(GliderError::DomUnavailable(format!(
                "container '#{}' not found",
                container_id
            )))
        })?;
        let overlay = Rc::new(SvgOverlay::mount(&document, &container).map_err(to_js_error)?);

        let events: Rc<dyn PageEvents> = Rc::new(WindowEvents::new(window.clone()));

        let (visibility, poll): (Rc<dyn VisibilityPort>, Option<PollDriver>) =
            if NativeVisibility::is_supported(&window) {
                (Rc::new(NativeVisibility::new(document.clone())) as Rc<dyn VisibilityPort>, None)
            } else {
                wasm_warn!("IntersectionObserver missing, polling section geometry instead");
                let observer = Rc::new(PolledObserver::new(regions.clone()));
                let listeners = PageEvent::ALL
                    .iter()
                    .map(|event| {
                        let observer = observer.clone();
                        events.listen(*event, Rc::new(move || observer.poll()))
                    })
                    .collect();
                (
                    observer.clone() as Rc<dyn VisibilityPort>,
                    Some(PollDriver {
                        observer,
                        _listeners: listeners,
                    }),
                )
            };

        let ports = TrackerPorts {
            regions: regions.clone() as Rc<dyn RegionSource>,
            events,
            timer: Rc::new(WindowTimer::new(window.clone())),
            visibility,
            presenter: Some(overlay.clone() as Rc<dyn ScenePresenter>),
        };

        let mut tracker = SectionTracker::new(config, language.direction(), ports).map_err(to_js_error)?;
        tracker.set_sections(registry);
        let tracker = Rc::new(RefCell::new(tracker));

        let click = Self::attach_click(&overlay, &tracker);

        let glider = Glider {
            tracker,
            overlay,
            click,
            poll,
            destroyed: false,
        };
        glider.poll_now();

        wasm_log!("Glider mounted in #{} ({})", container_id, language.code());
        Ok(glider)
    }

    /// Replace the tracked sections; re-subscribes when the list changed
    #[wasm_bindgen(js_name = setSections)]
    pub fn set_sections(&mut self, sections: JsValue) -> Result<(), JsValue> {
        if self.destroyed {
            return Err(to_js_error(GliderError::DomUnavailable(
                "glider was destroyed".to_string(),
            )));
        }
        let registry: SectionRegistry = deserialize(sections, "Failed to read sections")?;
        self.tracker.borrow_mut().set_sections(registry);
        self.poll_now();
        Ok(())
    }

    #[wasm_bindgen(js_name = setLanguage)]
    pub fn set_language(&mut self, lang: &str) -> Result<(), JsValue> {
        let language: Language = lang.parse().map_err(to_js_error)?;
        self.tracker.borrow_mut().set_direction(language.direction());
        Ok(())
    }

    /// Re-measure section positions now
    pub fn recompute(&self) {
        self.tracker.borrow().recompute();
    }

    /// Id of the active section, or `undefined`
    #[wasm_bindgen(js_name = activeSection)]
    pub fn active_section(&self) -> Option<String> {
        self.tracker
            .borrow()
            .active_section()
            .map(|id| id.as_str().to_string())
    }

    /// Current position table (container-relative dot offsets)
    pub fn positions(&self) -> Vec<f64> {
        self.tracker.borrow().positions().as_slice().to_vec()
    }

    /// Current display list
    pub fn scene(&self) -> Result<JsValue, JsValue> {
        serialize(&self.tracker.borrow().scene(), "Failed to serialize scene")
    }

    #[wasm_bindgen(js_name = renderSvg)]
    pub fn render_svg(&self) -> String {
        SvgRenderer::render(&self.tracker.borrow().scene())
    }

    /// Smooth-scroll to a section; false if it is unknown or not mounted
    #[wasm_bindgen(js_name = navigateTo)]
    pub fn navigate_to(&self, id: &str) -> bool {
        self.tracker.borrow().navigate_to(id)
    }

    /// Stop tracking and remove the overlay. Safe to call more than once;
    /// `free()` runs it too.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        self.tracker.borrow_mut().teardown();
        self.poll = None;

        if let Some(click) = self.click.take() {
            let _ = self
                .overlay
                .element()
                .remove_event_listener_with_callback("click", click.as_ref().unchecked_ref());
        }
        self.overlay.unmount();
        wasm_log!("Glider destroyed");
    }
}

impl Drop for Glider {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl Glider {
    fn attach_click(
        overlay: &SvgOverlay,
        tracker: &Rc<RefCell<SectionTracker>>,
    ) -> Option<Closure<dyn Fn(web_sys::Event)>> {
        let tracker = Rc::downgrade(tracker);
        let callback = Closure::<dyn Fn(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let selector = format!("[{}]", DATA_SECTION_ID);
            let Some(dot) = target.closest(&selector).ok().flatten() else {
                return;
            };
            let Some(id) = dot.get_attribute(DATA_SECTION_ID) else {
                return;
            };
            if let Some(tracker) = tracker.upgrade() {
                tracker.borrow().navigate_to(&id);
            }
        });

        match overlay
            .element()
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
        {
            Ok(()) => Some(callback),
            Err(e) => {
                wasm_warn!("Failed to attach dot click handler: {:?}", e);
                None
            }
        }
    }

    fn poll_now(&self) {
        if let Some(poll) = &self.poll {
            poll.observer.poll();
        }
    }
}
