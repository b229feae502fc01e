//! Particle effects for a personal site: a 2D interactive particle field and
//! a 3D particle sphere that morphs between shapes, plus some page chrome.
//!
//! Everything outside `wasm` is plain Rust and runs under `cargo test` on the
//! host. The browser glue only compiles for wasm32.

pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod frame;
pub mod page;
pub mod sphere;

pub use error::VizError;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use wasm_bindgen::prelude::*;

    mod dom;
    mod effects;
    mod field_canvas;
    mod frame_loop;
    mod render;
    mod sphere_page;

    /// Whatever managed to start on this page.
    struct Page {
        field: Option<field_canvas::FieldPage>,
        sphere: Option<sphere_page::SpherePage>,
        effects: Option<effects::Effects>,
        _unload: Option<dom::Listener>,
    }

    impl Page {
        /// Stops the loops and frees GL objects. The unload listener stays,
        /// since it is the caller.
        fn shut_down(&mut self) {
            self.field.take();
            self.sphere.take();
            self.effects.take();
        }
    }

    thread_local! {
        static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
    }

    /// Log the failure and keep going; one broken part must not take the
    /// others down.
    fn attempt<T>(what: &str, result: Result<T, crate::VizError>) -> Option<T> {
        result
            .map_err(|e| log::error!("{} not started: {}", what, e))
            .ok()
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let window = dom::window()?;
        let document = dom::document()?;

        // Pages carry one engine or the other; a missing anchor is not an error.
        let field = document
            .get_element_by_id("canvas")
            .and_then(|_| attempt("particle field", field_canvas::start(&document)));
        let sphere = document
            .get_element_by_id("container")
            .and_then(|_| attempt("particle sphere", sphere_page::start(&document)));
        let effects = attempt("page effects", effects::start(&document));

        let unload = attempt(
            "unload hook",
            dom::Listener::new(&window, "beforeunload", |_| {
                PAGE.with(|p| {
                    if let Some(page) = p.borrow_mut().as_mut() {
                        page.shut_down();
                    }
                });
            }),
        );

        PAGE.with(|p| {
            *p.borrow_mut() = Some(Page {
                field,
                sphere,
                effects,
                _unload: unload,
            })
        });
        Ok(())
    }
}
