//! Morphing and interaction loop of the particle sphere.

use super::particle::{Renderable, SphereParticle, TrailPoint};
use super::shapes::Shape;
use super::PointMesh;
use crate::config::{MaterialUpdate, SphereConfig};
use crate::error::VizError;
use glam::{EulerRot, Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Ease rate toward the target while scatter is above one half.
pub const FAST_EASE: f32 = 0.15;
pub const SLOW_EASE: f32 = 0.08;
/// Radians the ring advances per frame.
pub const RING_SPIN: f32 = 0.02;
/// Camera distance change per frame that counts as motion.
pub const CAMERA_MOTION_THRESHOLD: f32 = 0.005;
const CAMERA_SPEED_GAIN: f32 = 20.0;
const WARP_GAIN: f32 = 0.2;
const INITIAL_CAMERA_DISTANCE: f32 = 10.0;
const REST_OPACITY: f32 = 0.95;

/// Per-frame input from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds since the engine started.
    pub time: f32,
    pub camera_position: Vec3,
}

/// Values read by every particle update of one frame.
struct FrameState {
    time: f32,
    shape: Shape,
    rotation: (f32, f32),
    pointer: Option<Vec3>,
    ease: f32,
    camera_moving: bool,
    camera_speed: f32,
    warp: Vec3,
}

/// The particle sphere.
pub struct SphereEngine<R: Renderable = PointMesh> {
    config: SphereConfig,
    particles: Vec<SphereParticle<R>>,
    shape: Shape,
    outline: bool,
    shape_rotation: f32,
    pointer: Vec3,
    pointer_near: bool,
    last_camera_distance: f32,
    camera_speed: f32,
    camera_moving: bool,
    rng: SmallRng,
}

impl<R: Renderable> SphereEngine<R> {
    /// Build the particle set. Fails without creating anything if the
    /// geometry cannot be laid out.
    pub fn new(config: SphereConfig, seed: u64) -> Result<Self, VizError> {
        validate(&config)?;
        let mut engine = Self {
            config,
            particles: Vec::new(),
            shape: Shape::Sphere,
            outline: false,
            shape_rotation: 0.0,
            pointer: Vec3::ZERO,
            pointer_near: false,
            last_camera_distance: INITIAL_CAMERA_DISTANCE,
            camera_speed: 0.0,
            camera_moving: false,
            rng: SmallRng::seed_from_u64(seed),
        };
        engine.rebuild();
        log::info!("sphere created with {} particles", engine.particles.len());
        Ok(engine)
    }

    /// Replace every particle's shape target with the generator output.
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.apply_shape();
    }

    /// Regenerates the active shape's targets.
    pub fn set_outline_mode(&mut self, enabled: bool) {
        self.outline = enabled;
        if self.shape != Shape::Sphere {
            self.apply_shape();
        }
    }

    pub fn set_scatter_amount(&mut self, v: f32) {
        self.config.set_scatter(v);
    }

    pub fn set_cluster_amount(&mut self, v: f32) {
        self.config.set_cluster(v);
    }

    /// Tear down and rebuild every particle.
    pub fn set_particle_count(&mut self, n: usize) {
        self.config.set_particle_count(n);
        self.rebuild();
    }

    /// Tear down and rebuild every particle.
    pub fn set_particle_size(&mut self, size: f32) {
        self.config.set_particle_size(size);
        self.rebuild();
    }

    pub fn set_pointer_3d(&mut self, point: Vec3, is_near: bool) {
        if point.is_finite() {
            self.pointer = point;
            self.pointer_near = is_near;
        } else {
            self.pointer_near = false;
        }
    }

    pub fn set_rotation_speed(&mut self, v: f32) {
        self.config.set_rotation_speed(v);
    }

    pub fn set_streak_length(&mut self, v: f32) {
        self.config.set_streak_length(v);
    }

    pub fn set_streak_intensity(&mut self, v: f32) {
        self.config.set_streak_intensity(v);
    }

    pub fn set_motion_blur(&mut self, v: f32) {
        self.config.set_motion_blur(v);
    }

    pub fn set_lightspeed_zoom(&mut self, v: f32) {
        self.config.set_lightspeed_zoom(v);
    }

    pub fn set_interaction_radius(&mut self, v: f32) {
        self.config.set_interaction_radius(v);
    }

    pub fn set_interaction_strength(&mut self, v: f32) {
        self.config.set_interaction_strength(v);
    }

    /// Merge material changes and push them to every particle.
    pub fn update_material(&mut self, update: &MaterialUpdate) {
        self.config.material.merge(update);
        let material = &self.config.material;
        for p in &mut self.particles {
            p.mesh.set_metalness(material.metalness);
            p.mesh.set_intensity(material.emissive_intensity);
        }
    }

    /// Advance one frame.
    pub fn tick(&mut self, input: FrameInput) {
        let camera_distance = input.camera_position.length();
        let camera_delta = (camera_distance - self.last_camera_distance).abs();
        self.camera_speed = camera_delta * CAMERA_SPEED_GAIN;
        self.camera_moving = camera_delta > CAMERA_MOTION_THRESHOLD;
        self.last_camera_distance = camera_distance;

        if self.shape == Shape::Ring {
            self.shape_rotation = (self.shape_rotation + RING_SPIN) % TAU;
        }

        let frame = FrameState {
            time: input.time,
            shape: self.shape,
            rotation: self.shape_rotation.sin_cos(),
            pointer: self.pointer_near.then_some(self.pointer),
            ease: if self.config.scatter > 0.5 { FAST_EASE } else { SLOW_EASE },
            camera_moving: self.camera_moving,
            camera_speed: self.camera_speed,
            warp: input.camera_position.normalize_or_zero() * self.camera_speed * WARP_GAIN,
        };

        let config = &self.config;
        for p in &mut self.particles {
            let target = interact(p, base_target(p, &frame, config), &frame, config);
            let previous = p.mesh.position();
            let position = previous.lerp(target, frame.ease);
            p.mesh.set_position(position);
            decorate(p, position - previous, &frame, config);
        }
    }

    /// Slow wobble applied to the whole group at render time.
    pub fn group_rotation(&self, time: f32) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            (time * 0.2).sin() * 0.1,
            time * self.config.rotation_speed * 0.01,
            (time * 0.15).cos() * 0.05,
        )
    }

    /// How far the camera should dolly toward the centre this frame.
    pub fn zoom_step(&self) -> f32 {
        self.config.lightspeed_zoom * 0.15 * 5.0 * 0.05
    }

    pub fn particles(&self) -> &[SphereParticle<R>] {
        &self.particles
    }

    pub fn config(&self) -> &SphereConfig {
        &self.config
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_camera_moving(&self) -> bool {
        self.camera_moving
    }

    pub fn shape_rotation(&self) -> f32 {
        self.shape_rotation
    }

    fn apply_shape(&mut self) {
        let count = self.particles.len();
        match self.shape {
            Shape::Sphere => {
                for p in &mut self.particles {
                    p.shape_target = p.original();
                }
            }
            shape => {
                let targets = shape.targets(count, self.config.sphere_radius, self.outline);
                for (p, target) in self.particles.iter_mut().zip(targets) {
                    p.shape_target = target;
                }
            }
        }
        log::debug!("morphing {} particles to {}", count, self.shape);
    }

    fn rebuild(&mut self) {
        let count = self.config.particle_count;
        let radius = self.config.sphere_radius;
        let material = self.config.material.clone();

        self.particles.clear();
        self.particles.reserve(count);
        for i in 0..count {
            let original = super::shapes::sphere_point(i, count, radius);
            let scattered = self.scattered_position();
            let mut mesh = R::create(original, self.config.particle_size);
            mesh.set_intensity(material.emissive_intensity);
            mesh.set_metalness(material.metalness);
            mesh.set_opacity(REST_OPACITY);
            mesh.set_scale(1.0);
            self.particles.push(SphereParticle::new(mesh, original, scattered));
        }
        self.apply_shape();
    }

    fn scattered_position(&mut self) -> Vec3 {
        let theta = self.rng.gen::<f32>() * TAU;
        let phi = (self.rng.gen::<f32>() * 2.0 - 1.0).acos();
        let radius = self.config.scatter_radius * (0.2 + self.rng.gen::<f32>() * 0.8);
        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        )
    }
}

fn validate(config: &SphereConfig) -> Result<(), VizError> {
    let positive = |v: f32| v.is_finite() && v > 0.0;
    if !positive(config.sphere_radius) {
        return Err(VizError::InvalidConfig(format!("sphere radius {}", config.sphere_radius)));
    }
    if !positive(config.scatter_radius) {
        return Err(VizError::InvalidConfig(format!("scatter radius {}", config.scatter_radius)));
    }
    if !positive(config.particle_size) {
        return Err(VizError::InvalidConfig(format!("particle size {}", config.particle_size)));
    }
    Ok(())
}

/// Shape target (spun for the ring), or the symmetric scatter/cluster blend.
fn base_target<R: Renderable>(p: &SphereParticle<R>, frame: &FrameState, config: &SphereConfig) -> Vec3 {
    match frame.shape {
        Shape::Sphere => {
            let scatter = p.original().lerp(p.scattered(), config.scatter);
            let cluster = p.scattered().lerp(p.original(), config.cluster);
            scatter.lerp(cluster, 0.5)
        }
        Shape::Ring => {
            let (sin, cos) = frame.rotation;
            let t = p.shape_target;
            Vec3::new(t.x * cos - t.y * sin, t.x * sin + t.y * cos, t.z)
        }
        _ => p.shape_target,
    }
}

/// Push the target away from a nearby pointer and track the interaction flag.
fn interact<R: Renderable>(
    p: &mut SphereParticle<R>,
    target: Vec3,
    frame: &FrameState,
    config: &SphereConfig,
) -> Vec3 {
    let Some(pointer) = frame.pointer else {
        p.interacting = false;
        return target;
    };

    let radius = config.interaction_radius;
    let offset = p.mesh.position() - pointer;
    let distance = offset.length();
    if distance >= radius {
        p.interacting = false;
        return target;
    }

    let strength = (radius - distance) / radius;
    p.interacting = true;
    p.interaction_start = frame.time;
    target + offset.normalize_or_zero() * strength * config.interaction_strength
}

/// Visual-only effects after interpolation. Nothing here touches targets.
fn decorate<R: Renderable>(p: &mut SphereParticle<R>, velocity: Vec3, frame: &FrameState, config: &SphereConfig) {
    let material = &config.material;
    let speed = velocity.length();
    let lightspeed = frame.camera_moving || (config.scatter > 0.3 && speed > 0.01);

    if lightspeed {
        p.trail.push(TrailPoint {
            position: p.mesh.position(),
            time: frame.time,
            intensity: speed * config.streak_intensity,
        });
        p.mesh.set_opacity(0.9 + (speed * 2.0).min(1.0) * 0.1);

        let boost = ((speed + frame.camera_speed) * config.streak_intensity).min(1.0);
        p.mesh.set_intensity(material.emissive_intensity + boost * 0.5);
        p.mesh.set_scale(1.0 + (speed + frame.camera_speed) * config.streak_length);

        if frame.camera_moving {
            p.mesh.set_position(p.mesh.position() + frame.warp);
            p.mesh.set_intensity(material.emissive_intensity + frame.camera_speed * 0.3);
        }
    } else {
        p.mesh.set_intensity(material.emissive_intensity);
        let scale = p.mesh.scale();
        p.mesh.set_scale(scale + (1.0 - scale) * 0.1);
    }

    if p.interacting {
        let pulse = ((frame.time - p.interaction_start) * 8.0).sin() * 0.5 + 0.5;
        p.mesh.set_intensity(0.3 + pulse * 0.4);
        p.mesh.set_metalness(material.metalness + pulse * 0.2);
        p.mesh.set_scale(1.0 + pulse * 0.2);
    } else {
        p.mesh.set_metalness(material.metalness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(count: usize) -> SphereEngine {
        let mut config = SphereConfig::default();
        config.set_particle_count(count);
        SphereEngine::new(config, 11).unwrap()
    }

    fn still(time: f32) -> FrameInput {
        FrameInput {
            time,
            camera_position: Vec3::new(0.0, 0.0, INITIAL_CAMERA_DISTANCE),
        }
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let config = SphereConfig {
            sphere_radius: f32::NAN,
            ..SphereConfig::default()
        };
        assert!(matches!(
            SphereEngine::<PointMesh>::new(config, 0),
            Err(VizError::InvalidConfig(_))
        ));
    }

    fn sphere_frame() -> FrameState {
        FrameState {
            time: 0.0,
            shape: Shape::Sphere,
            rotation: (0.0, 1.0),
            pointer: None,
            ease: 0.0,
            camera_moving: false,
            camera_speed: 0.0,
            warp: Vec3::ZERO,
        }
    }

    fn blend(e: &mut SphereEngine, scatter: f32, cluster: f32) -> Vec3 {
        e.set_scatter_amount(scatter);
        e.set_cluster_amount(cluster);
        base_target(&e.particles()[0], &sphere_frame(), e.config())
    }

    #[test]
    fn scatter_and_cluster_blend_symmetrically() {
        let mut e = engine(50);
        let original = e.particles()[0].original();
        let scattered = e.particles()[0].scattered();

        assert!(blend(&mut e, 0.0, 1.0).distance(original) < 1e-5);
        assert!(blend(&mut e, 1.0, 0.0).distance(scattered) < 1e-5);
        let midpoint = (original + scattered) / 2.0;
        assert!(blend(&mut e, 1.0, 1.0).distance(midpoint) < 1e-5);
    }

    #[test]
    fn ease_rate_switches_above_half_scatter() {
        for (scatter, ease) in [(0.5, SLOW_EASE), (0.51, FAST_EASE)] {
            let mut e = engine(50);
            e.set_scatter_amount(scatter);
            e.set_cluster_amount(0.0);
            let original = e.particles()[0].original();
            let scattered = e.particles()[0].scattered();
            // With no clustering the target is o(1 - s)/2 + S(1 + s)/2.
            let target = original * (1.0 - scatter) / 2.0 + scattered * (1.0 + scatter) / 2.0;

            let start = e.particles()[0].mesh.position();
            e.tick(still(0.0));
            let moved = e.particles()[0].mesh.position();
            let expected = start + (target - start) * ease;
            assert!(moved.distance(expected) < 1e-4, "scatter {}", scatter);
        }
    }

    #[test]
    fn nearby_pointer_pushes_particle_away() {
        let mut e = engine(400);
        let p0 = e.particles()[0].original();
        let pointer = p0 * 0.95;
        e.set_pointer_3d(pointer, true);
        e.tick(still(1.5));

        let p = &e.particles()[0];
        assert!(p.is_interacting());
        assert_eq!(p.interaction_start, 1.5);

        // d = 0.3 inside r = 2: push of (r - d) / r * strength, eased.
        let config = e.config();
        let d = p0.distance(pointer);
        let push = (config.interaction_radius - d) / config.interaction_radius
            * config.interaction_strength;
        let after = p.mesh.position();
        assert!((after.distance(pointer) - (d + push * SLOW_EASE)).abs() < 1e-4);
        let away = (p0 - pointer).normalize();
        assert!((after - p0).normalize().dot(away) > 0.999);
    }

    #[test]
    fn ring_spins_once_per_frame() {
        let mut e = engine(200);
        e.set_shape(Shape::Ring);
        e.tick(still(0.0));
        e.tick(still(0.016));
        assert!((e.shape_rotation() - 2.0 * RING_SPIN).abs() < 1e-6);
    }

    #[test]
    fn camera_motion_is_detected_from_distance_change() {
        let mut e = engine(50);
        e.tick(still(0.0));
        assert!(!e.is_camera_moving());
        e.tick(FrameInput {
            time: 0.1,
            camera_position: Vec3::new(0.0, 0.0, 9.0),
        });
        assert!(e.is_camera_moving());
        assert!(e.particles().iter().all(|p| p.trail().len() == 1));
    }

    #[test]
    fn material_update_reaches_particles() {
        let mut e = engine(50);
        e.update_material(&MaterialUpdate {
            metalness: Some(0.2),
            ..Default::default()
        });
        assert!(e.particles().iter().all(|p| p.mesh.metalness() == 0.2));
    }

    #[test]
    fn group_rotation_starts_near_identity() {
        let e = engine(50);
        let q = e.group_rotation(0.0);
        assert!(q.angle_between(Quat::IDENTITY) < 0.06);
    }
}
