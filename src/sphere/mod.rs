//! 3D particle sphere: particles on a sphere that scatter, cluster and
//! morph into named shapes, pushed around by the pointer.

pub mod camera;
pub mod engine;
pub mod particle;
pub mod shapes;

pub use camera::OrbitCamera;
pub use engine::{FrameInput, SphereEngine};
pub use particle::{PointMesh, Renderable, SphereParticle, Trail, TrailPoint};
pub use shapes::Shape;

use crate::frame::Tick;
use glam::{Vec2, Vec3};

/// Engine plus camera: everything the render loop needs per frame.
pub struct SphereScene<R: Renderable = PointMesh> {
    pub engine: SphereEngine<R>,
    pub camera: OrbitCamera,
    viewport: Vec2,
    start_ms: Option<f64>,
    time: f32,
}

impl<R: Renderable> SphereScene<R> {
    pub fn new(engine: SphereEngine<R>, width: f32, height: f32) -> Self {
        let viewport = Vec2::new(width, height);
        Self {
            engine,
            camera: OrbitCamera::new(width / height),
            viewport,
            start_ms: None,
            time: 0.0,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        self.camera.set_aspect(width / height);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Seconds since the first frame.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Cast the pointer onto the z = 0 plane. The pointer counts as near
    /// while that point is within the interaction radius of the group centre.
    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32) {
        let ndc = camera::pointer_ndc(Vec2::new(client_x, client_y), self.viewport);
        match self.camera.ray_to_plane(ndc) {
            Some(point) => {
                let near = point.distance(Vec3::ZERO) < self.engine.config().interaction_radius;
                self.engine.set_pointer_3d(point, near);
            }
            None => self.engine.set_pointer_3d(Vec3::ZERO, false),
        }
    }

    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.camera.drag(Vec2::new(dx, dy), self.viewport.y);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.camera.zoom(delta_y);
    }
}

impl<R: Renderable> Tick for SphereScene<R> {
    fn tick(&mut self, now_ms: f64) {
        let start = *self.start_ms.get_or_insert(now_ms);
        self.time = ((now_ms - start) / 1000.0) as f32;

        self.camera.update();
        let zoom = self.engine.zoom_step();
        if zoom > 0.0 {
            self.camera.dolly(zoom);
        }

        self.engine.tick(FrameInput {
            time: self.time,
            camera_position: self.camera.position(),
        });
    }
}
