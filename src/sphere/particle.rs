//! Per-particle state of the sphere and the renderable seam.

use glam::Vec3;
use std::collections::VecDeque;

/// Minimal view of a drawable particle. The simulation only talks to
/// particles through this trait, so it runs the same against the WebGL
/// backend and against plain structs in tests.
pub trait Renderable {
    fn create(position: Vec3, size: f32) -> Self
    where
        Self: Sized;

    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    /// Emissive intensity.
    fn intensity(&self) -> f32;
    fn set_intensity(&mut self, intensity: f32);

    /// Uniform scale, 1 at rest.
    fn scale(&self) -> f32;
    fn set_scale(&mut self, scale: f32);

    fn opacity(&self) -> f32;
    fn set_opacity(&mut self, opacity: f32);

    fn metalness(&self) -> f32;
    fn set_metalness(&mut self, metalness: f32);
}

/// Plain-data particle, uploaded as one vertex by the GL renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMesh {
    pub position: Vec3,
    pub size: f32,
    pub intensity: f32,
    pub scale: f32,
    pub opacity: f32,
    pub metalness: f32,
}

impl Renderable for PointMesh {
    fn create(position: Vec3, size: f32) -> Self {
        Self {
            position,
            size,
            intensity: 0.0,
            scale: 1.0,
            opacity: 0.95,
            metalness: 0.0,
        }
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn intensity(&self) -> f32 {
        self.intensity
    }

    fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    fn metalness(&self) -> f32 {
        self.metalness
    }

    fn set_metalness(&mut self, metalness: f32) {
        self.metalness = metalness;
    }
}

/// One sample of a particle's streak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec3,
    pub time: f32,
    pub intensity: f32,
}

/// Recent positions, oldest first, never more than [`Trail::CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
}

impl Trail {
    pub const CAPACITY: usize = 5;

    pub fn push(&mut self, point: TrailPoint) {
        if self.points.len() == Self::CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    pub fn oldest(&self) -> Option<&TrailPoint> {
        self.points.front()
    }

    pub fn newest(&self) -> Option<&TrailPoint> {
        self.points.back()
    }
}

/// A sphere particle: renderable handle plus morph targets.
#[derive(Debug, Clone)]
pub struct SphereParticle<R> {
    pub mesh: R,
    original: Vec3,
    scattered: Vec3,
    pub(crate) shape_target: Vec3,
    pub(crate) interacting: bool,
    pub(crate) interaction_start: f32,
    pub(crate) trail: Trail,
}

impl<R: Renderable> SphereParticle<R> {
    pub(crate) fn new(mesh: R, original: Vec3, scattered: Vec3) -> Self {
        Self {
            mesh,
            original,
            scattered,
            shape_target: original,
            interacting: false,
            interaction_start: 0.0,
            trail: Trail::default(),
        }
    }

    /// Point on the sphere this particle was created at.
    pub fn original(&self) -> Vec3 {
        self.original
    }

    /// Point in the outer shell picked once at creation.
    pub fn scattered(&self) -> Vec3 {
        self.scattered
    }

    pub fn shape_target(&self) -> Vec3 {
        self.shape_target
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }
}
