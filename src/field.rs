//! 2D particle field: a grid of points that leans toward the pointer,
//! blows apart on click and draws proximity connections.
//!
//! The engine is backend-agnostic. Drawing goes through [`FieldPainter`],
//! which the wasm build implements for `CanvasRenderingContext2d`.

use crate::color::Rgb;
use crate::config::FieldConfig;
use crate::frame::Tick;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Peak speed handed out by an explosion, in pixels per frame.
pub const EXPLOSION_FORCE: f32 = 15.0;
/// Per-frame velocity multiplier while exploding.
pub const EXPLOSION_DECAY: f32 = 0.92;
/// How long attraction stays suspended after a click.
pub const EXPLOSION_DURATION_MS: f64 = 1000.0;
/// Velocities slower than this snap to zero.
pub const VELOCITY_SNAP: f32 = 0.1;
/// Distance at which explosion force and render intensity fade to zero.
pub const FALLOFF_DISTANCE: f32 = 200.0;
/// Fraction of the way back to base covered per frame while exploding.
const EXPLOSION_RETURN: f32 = 0.05;
/// Divisor of the base offset removed per frame outside pointer influence.
const IDLE_RETURN_DIVISOR: f32 = 20.0;
const PHASE_STEP: f32 = 0.02;
const WOBBLE: f32 = 0.1;
/// Connections are drawn between particles closer than `grid_size * CONNECTION_SPAN`.
pub const CONNECTION_SPAN: f32 = 1.5;
const TRAIL_FADE: &str = "rgba(0, 0, 0, 0.1)";

/// One point of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParticle {
    pub position: Vec2,
    pub base: Vec2,
    /// Phase of the idle wobble.
    pub angle: f32,
    /// Individual responsiveness to the pointer.
    pub density: f32,
    /// Only non-zero while an explosion is decaying.
    pub velocity: Vec2,
    /// Pointer distance measured on the last attraction frame.
    pub distance: f32,
}

impl FieldParticle {
    fn new(base: Vec2, rng: &mut SmallRng) -> Self {
        Self {
            position: base,
            base,
            angle: rng.gen::<f32>() * std::f32::consts::TAU,
            density: rng.gen::<f32>() * 5.0 + 8.0,
            velocity: Vec2::ZERO,
            distance: 0.0,
        }
    }

    fn explode(&mut self, pointer: Vec2) {
        let offset = self.position - pointer;
        let distance = offset.length();
        let force = (1.0 - distance / FALLOFF_DISTANCE).max(0.0) * EXPLOSION_FORCE;
        self.velocity = offset.normalize_or_zero() * force;
    }

    fn step_exploding(&mut self) {
        self.position += self.velocity;
        self.velocity *= EXPLOSION_DECAY;
        self.position += (self.base - self.position) * EXPLOSION_RETURN;
        if self.velocity.length() < VELOCITY_SNAP {
            self.velocity = Vec2::ZERO;
        }
    }

    fn step_attracted(&mut self, pointer: Vec2, config: &FieldConfig) {
        let delta = pointer - self.position;
        let distance = delta.length();
        self.distance = distance;

        let radius = config.mouse_influence;
        if distance < radius {
            let force = ((radius - distance) / radius).max(0.0);
            self.position +=
                delta.normalize_or_zero() * force * self.density * config.animation_speed;
        } else {
            self.position -= (self.position - self.base) / IDLE_RETURN_DIVISOR;
        }

        self.angle += PHASE_STEP;
        self.position += Vec2::new(self.angle.sin(), self.angle.cos()) * WOBBLE;
    }

    /// 1 at the pointer, 0 beyond [`FALLOFF_DISTANCE`].
    pub fn intensity(&self) -> f32 {
        (1.0 - self.distance / FALLOFF_DISTANCE).max(0.0)
    }
}

/// Drawing surface for the field.
pub trait FieldPainter {
    /// Cover the whole surface with a translucent fill.
    fn fade(&mut self, css_color: &str);
    fn line(&mut self, from: Vec2, to: Vec2, css_color: &str);
    /// A dot whose fill runs from `inner` at the centre to `outer` at `2 * radius`.
    fn dot(&mut self, center: Vec2, radius: f32, inner: &str, outer: &str);
}

/// The particle field engine.
pub struct ParticleField {
    config: FieldConfig,
    particles: Vec<FieldParticle>,
    width: f32,
    height: f32,
    pointer: Vec2,
    explosion_until: Option<f64>,
    rng: SmallRng,
}

impl ParticleField {
    pub fn new(config: FieldConfig, seed: u64) -> Self {
        Self {
            config,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            pointer: Vec2::ZERO,
            explosion_until: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Lay out `floor(w / g) * floor(h / g)` particles at cell centres and
    /// park the pointer in the middle of the viewport.
    pub fn initialize(&mut self, width: f32, height: f32, grid_size: f32) {
        self.config.set_grid_size(grid_size);
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.pointer = Vec2::new(self.width, self.height) / 2.0;
        self.rebuild();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.rebuild();
    }

    pub fn set_grid_size(&mut self, grid_size: f32) {
        self.config.set_grid_size(grid_size);
        self.rebuild();
    }

    /// Replace the whole configuration (reset button); rebuilds the grid.
    pub fn set_config(&mut self, config: FieldConfig) {
        self.config = config;
        self.rebuild();
    }

    /// Slider input; rebuilds the grid when the grid size changed.
    pub fn apply_control(&mut self, name: &str, value: &str) {
        if self.config.apply(name, value) {
            self.rebuild();
        }
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.pointer = Vec2::new(x, y);
        }
    }

    /// Blow every particle away from the pointer. Attraction resumes
    /// [`EXPLOSION_DURATION_MS`] after the latest trigger.
    pub fn trigger_impulse(&mut self, now_ms: f64) {
        let pointer = self.pointer;
        for p in &mut self.particles {
            p.explode(pointer);
        }
        self.explosion_until = Some(now_ms + EXPLOSION_DURATION_MS);
        log::debug!("explosion triggered at {:?}", pointer);
    }

    pub fn is_exploding(&self) -> bool {
        self.explosion_until.is_some()
    }

    /// Advance one frame.
    pub fn update(&mut self, now_ms: f64) {
        if matches!(self.explosion_until, Some(until) if now_ms >= until) {
            self.explosion_until = None;
        }

        let pointer = self.pointer;
        if self.is_exploding() {
            for p in &mut self.particles {
                p.step_exploding();
            }
        } else {
            for p in &mut self.particles {
                p.step_attracted(pointer, &self.config);
            }
        }
    }

    /// Draw the current frame.
    pub fn render<P: FieldPainter>(&self, painter: &mut P) {
        painter.fade(TRAIL_FADE);
        self.render_connections(painter);

        let outer = self.config.connection_color.rgba(0.1);
        for p in &self.particles {
            let inner = self.particle_color(p).rgba(0.8);
            painter.dot(p.position, self.config.particle_size, &inner, &outer);
        }
    }

    fn render_connections<P: FieldPainter>(&self, painter: &mut P) {
        let max = self.config.grid_size * CONNECTION_SPAN;
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let distance = a.position.distance(b.position);
                if distance < max {
                    let opacity = (1.0 - distance / max) * self.config.connection_opacity;
                    let color = self.config.connection_color.rgba(opacity);
                    painter.line(a.position, b.position, &color);
                }
            }
        }
    }

    /// Particle color near the pointer, fading into the connection color.
    pub fn particle_color(&self, p: &FieldParticle) -> Rgb {
        self.config
            .particle_color
            .lerp(self.config.connection_color, 1.0 - p.intensity())
    }

    pub fn particles(&self) -> &[FieldParticle] {
        &self.particles
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    fn rebuild(&mut self) {
        let g = self.config.grid_size;
        let columns = (self.width / g).floor() as usize;
        let rows = (self.height / g).floor() as usize;

        self.particles.clear();
        self.particles.reserve(columns * rows);
        for y in 0..rows {
            for x in 0..columns {
                let base = Vec2::new(x as f32 * g + g / 2.0, y as f32 * g + g / 2.0);
                self.particles.push(FieldParticle::new(base, &mut self.rng));
            }
        }
        log::debug!("field rebuilt: {}x{} = {} particles", columns, rows, self.particles.len());
    }
}

impl Tick for ParticleField {
    fn tick(&mut self, now_ms: f64) {
        self.update(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_stays_in_range() {
        let mut field = ParticleField::new(FieldConfig::default(), 3);
        field.initialize(400.0, 400.0, 20.0);
        assert!(field
            .particles()
            .iter()
            .all(|p| (8.0..13.0).contains(&p.density)));
    }

    #[test]
    fn explosion_ends_after_deadline() {
        let mut field = ParticleField::new(FieldConfig::default(), 3);
        field.initialize(100.0, 100.0, 25.0);
        field.trigger_impulse(0.0);
        field.update(999.0);
        assert!(field.is_exploding());
        field.update(1000.0);
        assert!(!field.is_exploding());
    }

    #[test]
    fn retrigger_extends_deadline() {
        let mut field = ParticleField::new(FieldConfig::default(), 3);
        field.initialize(100.0, 100.0, 25.0);
        field.trigger_impulse(0.0);
        field.trigger_impulse(800.0);
        field.update(1500.0);
        assert!(field.is_exploding());
    }

    #[test]
    fn non_finite_pointer_is_ignored() {
        let mut field = ParticleField::new(FieldConfig::default(), 3);
        field.initialize(100.0, 100.0, 25.0);
        field.set_pointer(f32::NAN, 10.0);
        assert_eq!(field.pointer(), Vec2::new(50.0, 50.0));
    }
}
