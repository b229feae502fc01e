use super::dom;
use crate::error::VizError;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` loop. Stops when dropped.
pub struct AnimationFrameLoop {
    callback: FrameCallback,
    handle: Rc<Cell<Option<i32>>>,
}

impl AnimationFrameLoop {
    /// Call `frame` with the frame timestamp on every display refresh.
    pub fn start(mut frame: impl FnMut(f64) + 'static) -> Result<Self, VizError> {
        let window = dom::window()?;

        // The closure re-schedules itself, so it needs a handle to its own
        // slot. Stopping empties the slot, which breaks the cycle.
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));

        let slot = callback.clone();
        let next_handle = handle.clone();
        let next_window = window.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            frame(now);

            // schedule next
            if let Some(cb) = slot.borrow().as_ref() {
                match next_window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => next_handle.set(Some(id)),
                    Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let first = match callback.borrow().as_ref() {
            Some(cb) => window.request_animation_frame(cb.as_ref().unchecked_ref())?,
            None => return Err(VizError::Js("frame callback missing".into())),
        };
        handle.set(Some(first));

        Ok(Self { callback, handle })
    }

    pub fn stop(&self) {
        if let (Some(id), Ok(window)) = (self.handle.take(), dom::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for AnimationFrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
