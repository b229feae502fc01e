use super::dom::{self, Listener};
use super::frame_loop::AnimationFrameLoop;
use crate::config::FieldConfig;
use crate::error::VizError;
use crate::field::{FieldPainter, ParticleField};
use crate::frame::Tick;
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlInputElement, MouseEvent,
};

/// Slider and color inputs, by element id. Each `<id>Value` element, if
/// present, mirrors the value.
const CONTROLS: [&str; 7] = [
    "gridSize",
    "particleSize",
    "mouseInfluence",
    "connectionOpacity",
    "animationSpeed",
    "particleColor",
    "connectionColor",
];

struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    canvas: HtmlCanvasElement,
}

impl FieldPainter for CanvasPainter {
    fn fade(&mut self, css_color: &str) {
        self.ctx.set_fill_style_str(css_color);
        self.ctx.fill_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        self.ctx.set_line_width(0.5);
    }

    fn line(&mut self, from: Vec2, to: Vec2, css_color: &str) {
        self.ctx.set_stroke_style_str(css_color);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn dot(&mut self, center: Vec2, radius: f32, inner: &str, outer: &str) {
        let (x, y, r) = (center.x as f64, center.y as f64, radius as f64);
        match self.ctx.create_radial_gradient(x, y, 0.0, x, y, r * 2.0) {
            Ok(gradient) => {
                let _ = gradient.add_color_stop(0.0, inner);
                let _ = gradient.add_color_stop(1.0, outer);
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
            Err(_) => self.ctx.set_fill_style_str(inner),
        }
        self.ctx.begin_path();
        if self.ctx.arc(x, y, r, 0.0, std::f64::consts::TAU).is_ok() {
            self.ctx.close_path();
            self.ctx.fill();
        }
    }
}

/// The running 2D field: engine, loop and listeners.
pub struct FieldPage {
    _frames: AnimationFrameLoop,
    _listeners: Vec<Listener>,
}

/// Mount the particle field on `#canvas`.
pub fn start(document: &Document) -> Result<FieldPage, VizError> {
    let window = dom::window()?;
    let canvas: HtmlCanvasElement = dom::by_id(document, "canvas")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or(VizError::ContextUnavailable("2d"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| VizError::ContextUnavailable("2d"))?;

    let config = match canvas.get_attribute("data-config") {
        Some(json) => FieldConfig::from_json(&json).unwrap_or_else(|e| {
            log::warn!("ignoring data-config: {}", e);
            FieldConfig::default()
        }),
        None => FieldConfig::default(),
    };

    let (width, height) = dom::viewport(&window);
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);

    let grid = config.grid_size;
    let field = Rc::new(RefCell::new(ParticleField::new(config, dom::random_seed())));
    field.borrow_mut().initialize(width, height, grid);
    log::info!("particle field: {} particles", field.borrow().particles().len());

    let mut listeners = Vec::new();

    {
        let field = field.clone();
        let canvas = canvas.clone();
        let w = window.clone();
        listeners.push(Listener::new(&window, "resize", move |_| {
            let (width, height) = dom::viewport(&w);
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
            field.borrow_mut().resize(width, height);
        })?);
    }

    {
        let field = field.clone();
        listeners.push(Listener::new(&window, "mousemove", move |e| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                field
                    .borrow_mut()
                    .set_pointer(e.client_x() as f32, e.client_y() as f32);
            }
        })?);
    }

    let panel: Option<Element> = dom::optional(document, "controlPanel");
    let panel_button: Option<Element> = dom::optional(document, "controlsBtn");

    {
        let field = field.clone();
        let w = window.clone();
        let panel = panel.clone();
        let panel_button = panel_button.clone();
        listeners.push(Listener::new(&window, "click", move |e| {
            if dom::contains(panel.as_ref(), e.target())
                || dom::contains(panel_button.as_ref(), e.target())
            {
                return;
            }
            field.borrow_mut().trigger_impulse(dom::now_ms(&w));
        })?);
    }

    if let (Some(panel), Some(button)) = (panel, panel_button) {
        listeners.push(Listener::new(&button, "click", move |_| {
            let _ = panel.class_list().toggle("open");
        })?);
    }

    listeners.extend(bind_controls(document, &field)?);

    let mut painter = CanvasPainter { ctx, canvas };
    let frames = AnimationFrameLoop::start(move |now| {
        let mut field = field.borrow_mut();
        field.tick(now);
        field.render(&mut painter);
    })?;

    Ok(FieldPage {
        _frames: frames,
        _listeners: listeners,
    })
}

fn bind_controls(
    document: &Document,
    field: &Rc<RefCell<ParticleField>>,
) -> Result<Vec<Listener>, VizError> {
    let mut listeners = Vec::new();

    for name in CONTROLS {
        let Some(input) = dom::optional::<HtmlInputElement>(document, name) else {
            continue;
        };
        let display: Option<Element> = dom::optional(document, &format!("{}Value", name));
        let field = field.clone();
        let source = input.clone();
        listeners.push(Listener::new(&input, "input", move |_| {
            let value = source.value();
            field.borrow_mut().apply_control(name, &value);
            if let Some(display) = &display {
                dom::set_text(display, &value);
            }
        })?);
    }

    if let Some(reset) = dom::optional::<Element>(document, "resetBtn") {
        let document = document.clone();
        let field = field.clone();
        listeners.push(Listener::new(&reset, "click", move |_| {
            let mut config = field.borrow().config().clone();
            config.reset();
            sync_controls(&document, &config);
            field.borrow_mut().set_config(config);
        })?);
    }

    Ok(listeners)
}

/// Write `config` back into the inputs and their value readouts.
fn sync_controls(document: &Document, config: &FieldConfig) {
    let values = [
        ("gridSize", config.grid_size.to_string()),
        ("particleSize", config.particle_size.to_string()),
        ("mouseInfluence", config.mouse_influence.to_string()),
        ("connectionOpacity", config.connection_opacity.to_string()),
        ("animationSpeed", config.animation_speed.to_string()),
        ("particleColor", config.particle_color.to_string()),
        ("connectionColor", config.connection_color.to_string()),
    ];
    for (name, value) in values {
        if let Some(input) = dom::optional::<HtmlInputElement>(document, name) {
            input.set_value(&value);
        }
        if let Some(display) = dom::optional::<Element>(document, &format!("{}Value", name)) {
            dom::set_text(&display, &value);
        }
    }
}
