use super::dom::{self, Listener};
use super::frame_loop::AnimationFrameLoop;
use super::render::PointRenderer;
use crate::config::SphereConfig;
use crate::error::VizError;
use crate::frame::{FpsCounter, Tick};
use crate::sphere::{Shape, SphereEngine, SphereScene};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlSelectElement,
    MouseEvent, WheelEvent, Window,
};

/// The running sphere: scene, renderer, loop and listeners.
pub struct SpherePage {
    frames: AnimationFrameLoop,
    renderer: Rc<RefCell<PointRenderer>>,
    _listeners: Vec<Listener>,
}

impl Drop for SpherePage {
    fn drop(&mut self) {
        self.frames.stop();
        self.renderer.borrow().dispose();
        log::info!("sphere disposed");
    }
}

/// Mount the sphere inside `#container`. The engine is validated and the GL
/// resources created before anything is attached to the page.
pub fn start(document: &Document) -> Result<SpherePage, VizError> {
    let window = dom::window()?;
    let container: Element = dom::by_id(document, "container")?;

    let config = match container.get_attribute("data-config") {
        Some(json) => SphereConfig::from_json(&json).unwrap_or_else(|e| {
            log::warn!("ignoring data-config: {}", e);
            SphereConfig::default()
        }),
        None => SphereConfig::default(),
    };

    let engine: SphereEngine = SphereEngine::new(config, dom::random_seed())?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| VizError::Js("created element is not a canvas".into()))?;
    let renderer = PointRenderer::new(canvas.clone())?;

    container.append_child(&canvas)?;
    let (width, height) = dom::viewport(&window);
    renderer.resize(width, height, window.device_pixel_ratio() as f32);
    let style = canvas.style();
    let _ = style.set_property("width", "100%");
    let _ = style.set_property("height", "100%");

    if let Some(loading) = dom::optional::<HtmlElement>(document, "loading") {
        dom::set_display(&loading, "none");
    }

    let scene = Rc::new(RefCell::new(SphereScene::new(engine, width, height)));
    let renderer_cell = Rc::new(RefCell::new(renderer));

    let mut listeners = bind_input(&window, &canvas, &scene, &renderer_cell)?;
    listeners.extend(bind_controls(document, &scene)?);
    listeners.extend(bind_panel(document)?);

    let fps_display: Option<Element> = dom::optional(document, "fpsValue");
    let mut fps = FpsCounter::default();
    let frame_scene = scene.clone();
    let frame_renderer = renderer_cell.clone();
    let frames = AnimationFrameLoop::start(move |now| {
        let mut scene = frame_scene.borrow_mut();
        scene.tick(now);
        frame_renderer.borrow_mut().render(&scene);
        if let (Some(reading), Some(display)) = (fps.frame(now), &fps_display) {
            dom::set_text(display, &reading.to_string());
        }
    })?;

    log::info!("sphere running");
    Ok(SpherePage {
        frames,
        renderer: renderer_cell,
        _listeners: listeners,
    })
}

fn bind_input(
    window: &Window,
    canvas: &HtmlCanvasElement,
    scene: &Rc<RefCell<SphereScene>>,
    renderer: &Rc<RefCell<PointRenderer>>,
) -> Result<Vec<Listener>, VizError> {
    let mut listeners = Vec::new();
    let dragging = Rc::new(Cell::new(false));

    {
        let scene = scene.clone();
        let dragging = dragging.clone();
        listeners.push(Listener::new(canvas, "mousemove", move |e| {
            let Some(e) = e.dyn_ref::<MouseEvent>() else {
                return;
            };
            let mut scene = scene.borrow_mut();
            scene.pointer_moved(e.client_x() as f32, e.client_y() as f32);
            if dragging.get() {
                scene.drag(e.movement_x() as f32, e.movement_y() as f32);
            }
        })?);
    }

    {
        let dragging = dragging.clone();
        listeners.push(Listener::new(canvas, "mousedown", move |_| dragging.set(true))?);
    }
    listeners.push(Listener::new(window, "mouseup", move |_| dragging.set(false))?);

    {
        let scene = scene.clone();
        listeners.push(Listener::new(canvas, "wheel", move |e| {
            if let Some(e) = e.dyn_ref::<WheelEvent>() {
                e.prevent_default();
                scene.borrow_mut().wheel(e.delta_y() as f32);
            }
        })?);
    }

    {
        let scene = scene.clone();
        let renderer = renderer.clone();
        let w = window.clone();
        listeners.push(Listener::new(window, "resize", move |_| {
            let (width, height) = dom::viewport(&w);
            scene.borrow_mut().resize(width, height);
            renderer
                .borrow()
                .resize(width, height, w.device_pixel_ratio() as f32);
        })?);
    }

    Ok(listeners)
}

/// Sliders and the shape picker. Readouts use the same precision the page shows.
fn bind_controls(
    document: &Document,
    scene: &Rc<RefCell<SphereScene>>,
) -> Result<Vec<Listener>, VizError> {
    type Apply = fn(&mut SphereEngine, f32);
    let sliders: [(&str, &str, usize, Apply); 4] = [
        ("particleSizeSlider", "particleSizeValue", 3, |e, v| e.set_particle_size(v)),
        ("particleCountSlider", "particleCountValue", 0, |e, v| {
            e.set_particle_count(v.max(0.0) as usize)
        }),
        ("scatterSlider", "scatterValue", 2, |e, v| e.set_scatter_amount(v)),
        ("clusterSlider", "clusterValue", 2, |e, v| e.set_cluster_amount(v)),
    ];

    let mut listeners = Vec::new();
    for (slider_id, display_id, precision, apply) in sliders {
        let Some(slider) = dom::optional::<HtmlInputElement>(document, slider_id) else {
            continue;
        };
        let display: Option<Element> = dom::optional(document, display_id);
        let source = slider.clone();
        let scene = scene.clone();
        listeners.push(Listener::new(&slider, "input", move |_| {
            let Ok(value) = source.value().trim().parse::<f32>() else {
                return;
            };
            apply(&mut scene.borrow_mut().engine, value);
            if let Some(display) = &display {
                dom::set_text(display, &format!("{:.*}", precision, value));
            }
        })?);
    }

    if let Some(select) = dom::optional::<HtmlSelectElement>(document, "shapeSelect") {
        let source = select.clone();
        let scene = scene.clone();
        listeners.push(Listener::new(&select, "change", move |_| {
            let shape = Shape::from_name(&source.value());
            scene.borrow_mut().engine.set_shape(shape);
        })?);
    }

    if let Some(outline) = dom::optional::<HtmlInputElement>(document, "outlineToggle") {
        let source = outline.clone();
        let scene = scene.clone();
        listeners.push(Listener::new(&outline, "change", move |_| {
            scene.borrow_mut().engine.set_outline_mode(source.checked());
        })?);
    }

    Ok(listeners)
}

/// Collapsible control panel: open from the call-to-action, close from the
/// close button or any click outside.
fn bind_panel(document: &Document) -> Result<Vec<Listener>, VizError> {
    let (Some(panel), Some(cta)) = (
        dom::optional::<Element>(document, "controlPanel"),
        dom::optional::<HtmlElement>(document, "controlPanelCta"),
    ) else {
        return Ok(Vec::new());
    };

    let close = {
        let panel = panel.clone();
        let cta = cta.clone();
        move || {
            let _ = panel.class_list().remove_1("open");
            dom::set_display(&cta, "block");
        }
    };

    let mut listeners = Vec::new();
    {
        let panel = panel.clone();
        let target = cta.clone();
        listeners.push(Listener::new(&cta, "click", move |_| {
            let _ = panel.class_list().add_1("open");
            dom::set_display(&target, "none");
        })?);
    }

    if let Some(button) = dom::optional::<Element>(document, "closeControlPanel") {
        let close = close.clone();
        listeners.push(Listener::new(&button, "click", move |_| close())?);
    }

    let cta_element: Element = cta.clone().into();
    listeners.push(Listener::new(document, "click", move |e| {
        let inside = dom::contains(Some(&panel), e.target())
            || dom::contains(Some(&cta_element), e.target());
        if !inside && panel.class_list().contains("open") {
            close();
        }
    })?);

    Ok(listeners)
}
