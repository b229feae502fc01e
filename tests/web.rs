#![cfg(target_arch = "wasm32")]

use glam::Vec2;
use particle_viz::config::FieldConfig;
use particle_viz::field::{FieldPainter, ParticleField};
use particle_viz::page::theme::{PreferenceStore, ThemeToggle, STORAGE_KEY};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Storage};

wasm_bindgen_test_configure!(run_in_browser);

struct Session(Storage);

impl PreferenceStore for Session {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get_item(key).unwrap()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.set_item(key, value).unwrap();
    }
}

struct Ctx(CanvasRenderingContext2d);

impl FieldPainter for Ctx {
    fn fade(&mut self, css_color: &str) {
        self.0.set_fill_style_str(css_color);
        self.0.fill_rect(0.0, 0.0, 200.0, 200.0);
    }

    fn line(&mut self, from: Vec2, to: Vec2, css_color: &str) {
        self.0.set_stroke_style_str(css_color);
        self.0.begin_path();
        self.0.move_to(from.x as f64, from.y as f64);
        self.0.line_to(to.x as f64, to.y as f64);
        self.0.stroke();
    }

    fn dot(&mut self, center: Vec2, radius: f32, inner: &str, _outer: &str) {
        self.0.set_fill_style_str(inner);
        self.0.begin_path();
        self.0
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, std::f64::consts::TAU)
            .unwrap();
        self.0.fill();
    }
}

fn session() -> Storage {
    web_sys::window().unwrap().session_storage().unwrap().unwrap()
}

#[wasm_bindgen_test]
fn theme_survives_reload_within_session() {
    let storage = session();
    storage.remove_item(STORAGE_KEY).unwrap();

    let mut theme = ThemeToggle::load(Session(storage.clone()));
    assert!(!theme.is_dark());
    assert!(theme.toggle());
    assert_eq!(storage.get_item(STORAGE_KEY).unwrap().as_deref(), Some("true"));

    let reloaded = ThemeToggle::load(Session(storage.clone()));
    assert!(reloaded.is_dark());
    storage.remove_item(STORAGE_KEY).unwrap();
}

#[wasm_bindgen_test]
fn field_paints_onto_a_canvas() {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    canvas.set_width(200);
    canvas.set_height(200);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();

    let mut field = ParticleField::new(FieldConfig::default(), 3);
    field.initialize(200.0, 200.0, 25.0);
    field.update(16.0);
    let mut painter = Ctx(ctx.clone());
    field.render(&mut painter);

    // The first particle sits near (12.5, 12.5) and is drawn in white-ish.
    let pixel = ctx.get_image_data(11.0, 11.0, 3.0, 3.0).unwrap().data();
    assert!(pixel.iter().step_by(4).any(|&r| r > 0), "nothing drawn");
}
