//! Browser implementations of the tracker ports
//!
//! Regions are looked up by DOM id on every call, so sections that mount
//! late are picked up by the next measurement without re-subscribing.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::error::{GliderError, GliderResult};
use crate::models::{RegionRect, SectionId, Viewport};
use crate::renderers::scene::TimelineScene;
use crate::renderers::svg::{SvgRenderer, OVERLAY_STYLE, SVG_NS};
use crate::tracker::observer::{ObserverOptions, VisibilityEntry};
use crate::tracker::ports::{
    BatchSink, Handler, PageEvent, PageEvents, RegionSource, ScenePresenter, Subscription, Timer,
    VisibilityPort, VisibilityWatch,
};

pub fn browser_window() -> GliderResult<Window> {
    web_sys::window().ok_or_else(|| GliderError::DomUnavailable("no window".to_string()))
}

pub fn browser_document(window: &Window) -> GliderResult<Document> {
    window
        .document()
        .ok_or_else(|| GliderError::DomUnavailable("no document".to_string()))
}

fn element_rect(element: &Element) -> RegionRect {
    let rect = element.get_bounding_client_rect();
    RegionRect::new(rect.top(), rect.height())
}

/// Geometry and scrolling through `document.getElementById`
pub struct DomRegions {
    window: Window,
    document: Document,
    container_id: String,
}

impl DomRegions {
    pub fn new(window: Window, document: Document, container_id: impl Into<String>) -> Self {
        Self {
            window,
            document,
            container_id: container_id.into(),
        }
    }

    pub fn container_element(&self) -> Option<Element> {
        self.document.get_element_by_id(&self.container_id)
    }
}

impl RegionSource for DomRegions {
    fn region(&self, id: &SectionId) -> Option<RegionRect> {
        self.document
            .get_element_by_id(id.as_str())
            .map(|el| element_rect(&el))
    }

    fn container(&self) -> Option<RegionRect> {
        self.container_element().map(|el| element_rect(&el))
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport(&self) -> Viewport {
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        Viewport::new(height)
    }

    #[allow(deprecated)]
    fn scroll_into_view(&self, id: &SectionId) -> bool {
        let Some(element) = self.document.get_element_by_id(id.as_str()) else {
            return false;
        };
        let mut options = ScrollIntoViewOptions::new();
        options.behavior(ScrollBehavior::Smooth);
        options.block(ScrollLogicalPosition::Center);
        element.scroll_into_view_with_scroll_into_view_options(&options);
        true
    }
}

/// `resize` / `scroll` listeners on the window
pub struct WindowEvents {
    window: Window,
}

impl WindowEvents {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl PageEvents for WindowEvents {
    fn listen(&self, event: PageEvent, handler: Handler) -> Subscription {
        let name = event.dom_name();
        let callback = Closure::<dyn Fn()>::new(move || handler());

        if let Err(e) = self
            .window
            .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
        {
            log::warn!("Failed to add {} listener: {:?}", name, e);
            return Subscription::noop();
        }

        let window = self.window.clone();
        Subscription::new(move || {
            let _ = window.remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        })
    }
}

/// `setTimeout` / `clearTimeout`
pub struct WindowTimer {
    window: Window,
}

impl WindowTimer {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Timer for WindowTimer {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Subscription {
        let callback = Closure::once(move || task());
        let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);

        let handle = match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), timeout)
        {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Failed to schedule settling timer: {:?}", e);
                return Subscription::noop();
            }
        };

        let window = self.window.clone();
        Subscription::new(move || {
            window.clear_timeout_with_handle(handle);
            drop(callback);
        })
    }
}

/// Visibility watching through the native `IntersectionObserver`
pub struct NativeVisibility {
    document: Document,
}

impl NativeVisibility {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Whether the browser exposes `IntersectionObserver`
    pub fn is_supported(window: &Window) -> bool {
        js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }
}

fn to_entry(value: JsValue) -> Option<VisibilityEntry> {
    let entry: IntersectionObserverEntry = value.dyn_into().ok()?;
    let id = entry.target().id();
    if id.is_empty() {
        return None;
    }
    Some(VisibilityEntry::new(id, entry.is_intersecting(), entry.intersection_ratio()))
}

impl VisibilityPort for NativeVisibility {
    #[allow(deprecated)]
    fn watch(&self, options: &ObserverOptions, sink: BatchSink) -> Box<dyn VisibilityWatch> {
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let batch: Vec<VisibilityEntry> = entries.iter().filter_map(to_entry).collect();
                if !batch.is_empty() {
                    sink(batch);
                }
            },
        );

        let mut init = IntersectionObserverInit::new();
        init.root_margin(&options.root_margin());
        init.threshold(&JsValue::from_f64(options.threshold));

        let observer = match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => Some(observer),
            Err(e) => {
                log::warn!("IntersectionObserver unavailable: {:?}", e);
                None
            }
        };

        Box::new(DomWatch {
            observer,
            document: self.document.clone(),
            _callback: callback,
        })
    }
}

struct DomWatch {
    observer: Option<IntersectionObserver>,
    document: Document,
    _callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl VisibilityWatch for DomWatch {
    fn observe(&mut self, id: &SectionId) -> bool {
        let (Some(observer), Some(element)) = (&self.observer, self.document.get_element_by_id(id.as_str()))
        else {
            return false;
        };
        observer.observe(&element);
        true
    }

    fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl Drop for DomWatch {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Presents scenes into an `<svg>` overlay inserted as the container's
/// first child
pub struct SvgOverlay {
    svg: Element,
}

impl SvgOverlay {
    pub fn mount(document: &Document, container: &Element) -> GliderResult<Self> {
        let dom_err = |e: JsValue| GliderError::DomUnavailable(format!("{:?}", e));

        let svg = document.create_element_ns(Some(SVG_NS), "svg").map_err(dom_err)?;
        svg.set_attribute("class", "glider-timeline").map_err(dom_err)?;
        svg.set_attribute("style", OVERLAY_STYLE).map_err(dom_err)?;
        container
            .insert_before(&svg, container.first_child().as_ref())
            .map_err(dom_err)?;

        Ok(Self { svg })
    }

    pub fn element(&self) -> &Element {
        &self.svg
    }

    pub fn unmount(&self) {
        self.svg.remove();
    }
}

impl ScenePresenter for SvgOverlay {
    fn present(&self, scene: &TimelineScene) {
        self.svg.set_inner_html(&SvgRenderer::render_contents(scene));
    }
}
