use super::dom::{self, Interval, Listener};
use crate::error::VizError;
use crate::page::clock;
use crate::page::playback::{self, Playback, VIDEO_SELECTOR, VISIBILITY_THRESHOLD};
use crate::page::scramble::{Scrambler, AUTO_START_DELAY_MS, STEP_MS};
use crate::page::theme::{PreferenceStore, ThemeToggle, DARK_CLASS, STATIC_CLASS};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlInputElement, HtmlMediaElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, Storage,
};

const THEME_SWITCH: &str = ".toggle-switch input";
const HOVER_SCRAMBLE: &str = ".scramble-text";
const AUTO_SCRAMBLE: &str = ".scramble-auto";
const CLOCK_ID: &str = "pst-time";

/// Session storage, or nothing if the browser refuses it.
pub struct SessionStore(Option<Storage>);

impl SessionStore {
    pub fn open() -> Self {
        let storage = dom::window()
            .ok()
            .and_then(|w| w.session_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("session storage unavailable, theme will not persist");
        }
        Self(storage)
    }
}

impl PreferenceStore for SessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.0 {
            if let Err(e) = storage.set_item(key, value) {
                log::warn!("could not store {}: {:?}", key, e);
            }
        }
    }
}

/// Text that scrambles into place on a timer.
struct ScrambleText {
    element: Element,
    scrambler: RefCell<Scrambler>,
    timer: RefCell<Option<Interval>>,
}

impl ScrambleText {
    fn new(element: Element, scrambler: Scrambler) -> Rc<Self> {
        Rc::new(Self {
            element,
            scrambler: RefCell::new(scrambler),
            timer: RefCell::new(None),
        })
    }

    fn run(self: &Rc<Self>) -> Result<(), VizError> {
        self.scrambler.borrow_mut().restart();
        let weak: Weak<Self> = Rc::downgrade(self);
        let timer = Interval::new(STEP_MS, move || {
            let Some(this) = weak.upgrade() else {
                return;
            };
            let frame = this.scrambler.borrow_mut().step();
            match frame {
                Some(text) => dom::set_text(&this.element, &text),
                None => this.halt(),
            }
        })?;
        // Replacing drops the previous run's timer.
        *self.timer.borrow_mut() = Some(timer);
        Ok(())
    }

    fn halt(&self) {
        if let Some(timer) = self.timer.borrow().as_ref() {
            timer.cancel();
        }
    }

    fn restore(&self) {
        self.halt();
        dom::set_text(&self.element, &self.scrambler.borrow().target());
    }

    /// Swap in a new target and scramble into it.
    fn retarget(self: &Rc<Self>, target: &str, seed: u64) -> Result<(), VizError> {
        *self.scrambler.borrow_mut() = Scrambler::clock(target, seed);
        self.run()
    }
}

/// Page chrome: theme switch, scrambled labels, clock and video gating.
pub struct Effects {
    _listeners: Vec<Listener>,
    _scrambles: Vec<Rc<ScrambleText>>,
    _clock: Option<(Rc<ScrambleText>, Interval)>,
    _videos: Option<VideoGate>,
}

/// Wire whatever chrome the page has. Each part is optional.
pub fn start(document: &Document) -> Result<Effects, VizError> {
    let mut listeners = Vec::new();
    if let Some(listener) = bind_theme(document)? {
        listeners.push(listener);
    }

    let mut scrambles = Vec::new();
    for element in dom::query_all(document, HOVER_SCRAMBLE)? {
        let text = ScrambleText::new(
            element.clone(),
            Scrambler::label(&label_text(&element), dom::random_seed()),
        );
        {
            let text = text.clone();
            listeners.push(Listener::new(&element, "mouseenter", move |_| {
                if let Err(e) = text.run() {
                    log::warn!("scramble failed: {}", e);
                }
            })?);
        }
        {
            let text = text.clone();
            listeners.push(Listener::new(&element, "mouseleave", move |_| text.restore())?);
        }
        scrambles.push(text);
    }

    for element in dom::query_all(document, AUTO_SCRAMBLE)? {
        let text = ScrambleText::new(
            element.clone(),
            Scrambler::label(&label_text(&element), dom::random_seed()),
        );
        let weak = Rc::downgrade(&text);
        dom::after(AUTO_START_DELAY_MS, move || {
            if let Some(text) = weak.upgrade() {
                if let Err(e) = text.run() {
                    log::warn!("scramble failed: {}", e);
                }
            }
        })?;
        scrambles.push(text);
    }

    let clock = match dom::optional::<Element>(document, CLOCK_ID) {
        Some(element) => Some(start_clock(element)?),
        None => None,
    };

    let videos = match VideoGate::observe(document) {
        Ok(gate) => gate,
        Err(e) => {
            log::warn!("video gating off: {}", e);
            None
        }
    };

    log::debug!("{} scramble labels", scrambles.len());
    Ok(Effects {
        _listeners: listeners,
        _scrambles: scrambles,
        _clock: clock,
        _videos: videos,
    })
}

fn bind_theme(document: &Document) -> Result<Option<Listener>, VizError> {
    let Some(root) = document.document_element() else {
        return Ok(None);
    };
    let theme = Rc::new(RefCell::new(ThemeToggle::load(SessionStore::open())));
    let dark = theme.borrow().is_dark();
    let _ = root.class_list().toggle_with_force(DARK_CLASS, dark);

    // Transitions stay off for the first paint so a stored theme does not animate in.
    {
        let root = root.clone();
        dom::next_frame(move |_| {
            let _ = root.class_list().remove_1(STATIC_CLASS);
        })?;
    }

    let Some(switch) = document
        .query_selector(THEME_SWITCH)?
        .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
    else {
        return Ok(None);
    };
    switch.set_checked(dark);

    let source = switch.clone();
    let listener = Listener::new(&switch, "change", move |_| {
        let enabled = source.checked();
        theme.borrow_mut().set_dark(enabled);
        let _ = root.class_list().toggle_with_force(DARK_CLASS, enabled);
    })?;
    Ok(Some(listener))
}

/// The label to reveal: `data-text` when present, else the element's text.
fn label_text(element: &Element) -> String {
    element
        .get_attribute("data-text")
        .or_else(|| element.text_content())
        .unwrap_or_default()
}

fn start_clock(element: Element) -> Result<(Rc<ScrambleText>, Interval), VizError> {
    let first = clock::display(js_sys::Date::now());
    dom::set_text(&element, &first);
    let text = ScrambleText::new(element, Scrambler::clock(&first, dom::random_seed()));

    let weak = Rc::downgrade(&text);
    dom::after(clock::SCRAMBLE_DELAY_MS, move || {
        if let Some(text) = weak.upgrade() {
            if let Err(e) = text.retarget(&first, dom::random_seed()) {
                log::warn!("clock scramble failed: {}", e);
            }
        }
    })?;

    let weak = Rc::downgrade(&text);
    let refresh = Interval::new(clock::REFRESH_MS, move || {
        if let Some(text) = weak.upgrade() {
            let now = clock::display(js_sys::Date::now());
            text.halt();
            *text.scrambler.borrow_mut() = Scrambler::clock(&now, dom::random_seed());
            dom::set_text(&text.element, &now);
        }
    })?;

    Ok((text, refresh))
}

/// Plays `.work-card` videos only while fully visible.
struct VideoGate {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl VideoGate {
    fn observe(document: &Document) -> Result<Option<Self>, VizError> {
        let videos = dom::query_all(document, VIDEO_SELECTOR)?;
        if videos.is_empty() {
            return Ok(None);
        }

        let callback = Closure::wrap(Box::new(|entries: js_sys::Array| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let Ok(video) = entry.target().dyn_into::<HtmlMediaElement>() else {
                    continue;
                };
                match playback::decide(entry.is_intersecting(), entry.intersection_ratio()) {
                    // Autoplay rejections surface as a rejected promise; nothing to do.
                    Playback::Play => {
                        let _ = video.play();
                    }
                    Playback::Pause => {
                        let _ = video.pause();
                    }
                }
            }
        }) as Box<dyn FnMut(js_sys::Array)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(VISIBILITY_THRESHOLD));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
        for video in &videos {
            observer.observe(video);
        }
        log::debug!("gating {} videos", videos.len());

        Ok(Some(Self {
            observer,
            _callback: callback,
        }))
    }
}

impl Drop for VideoGate {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
