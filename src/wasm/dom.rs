use crate::error::VizError;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

pub fn window() -> Result<Window, VizError> {
    web_sys::window().ok_or(VizError::MissingElement("window".into()))
}

pub fn document() -> Result<Document, VizError> {
    window()?
        .document()
        .ok_or(VizError::MissingElement("document".into()))
}

/// Look up `#id` and cast it.
pub fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, VizError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| VizError::MissingElement(id.to_owned()))?
        .dyn_into::<T>()
        .map_err(|_| VizError::MissingElement(format!("{} (wrong element type)", id)))
}

/// Optional control; absent controls are skipped.
pub fn optional<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    let found = by_id(document, id).ok();
    if found.is_none() {
        log::debug!("control #{} not on this page", id);
    }
    found
}

/// Window inner size in CSS pixels.
pub fn viewport(window: &Window) -> (f32, f32) {
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    (dim(window.inner_width()), dim(window.inner_height()))
}

pub fn now_ms(window: &Window) -> f64 {
    window
        .performance()
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Seed for the simulation RNGs.
pub fn random_seed() -> u64 {
    (js_sys::Math::random() * u32::MAX as f64) as u64 ^ js_sys::Date::now() as u64
}

pub fn set_text(element: &Element, text: &str) {
    element.set_text_content(Some(text));
}

pub fn set_display(element: &HtmlElement, value: &str) {
    if let Err(e) = element.style().set_property("display", value) {
        log::warn!("could not set display: {:?}", e);
    }
}

/// Every element matching `selector`.
pub fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, VizError> {
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

/// Whether `node` is `container` or inside it.
pub fn contains(container: Option<&Element>, target: Option<EventTarget>) -> bool {
    match (container, target.and_then(|t| t.dyn_into::<web_sys::Node>().ok())) {
        (Some(c), Some(node)) => c.contains(Some(&node)),
        _ => false,
    }
}

/// An event listener that detaches itself when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, VizError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// A repeating timer that is cleared when dropped.
pub struct Interval {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn new(ms: i32, handler: impl FnMut() + 'static) -> Result<Self, VizError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
        let id = window()?.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            ms,
        )?;
        Ok(Self {
            id,
            _callback: callback,
        })
    }

    /// Stop firing. Safe to call from inside the handler, unlike dropping.
    pub fn cancel(&self) {
        if let Ok(w) = window() {
            w.clear_interval_with_handle(self.id);
        }
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `f` once after `ms`. The callback frees itself after running.
pub fn after(ms: i32, f: impl FnOnce() + 'static) -> Result<(), VizError> {
    let callback = Closure::once_into_js(f);
    window()?.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms)?;
    Ok(())
}

/// Run `f` once on the next animation frame.
pub fn next_frame(f: impl FnOnce(f64) + 'static) -> Result<(), VizError> {
    let callback = Closure::once_into_js(f);
    window()?.request_animation_frame(callback.unchecked_ref())?;
    Ok(())
}
