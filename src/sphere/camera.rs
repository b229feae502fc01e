//! Damped orbit camera with pointer ray casting.

use glam::{Mat4, Vec2, Vec3};

pub const FOV_Y_DEGREES: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;
pub const MIN_DISTANCE: f32 = 3.0;
pub const MAX_DISTANCE: f32 = 25.0;
pub const DAMPING: f32 = 0.05;
const ZOOM_BASE: f32 = 0.95;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Pointer position in normalized device coordinates, y up.
pub fn pointer_ndc(client: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(client.x / viewport.x * 2.0 - 1.0, -(client.y / viewport.y) * 2.0 + 1.0)
}

/// Orbit camera looking at the origin.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    aspect: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance: 10.0,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            aspect: 1.0,
        }
    }
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self::default();
        camera.set_aspect(aspect);
        camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Queue a rotation from a pointer drag of `delta` pixels.
    pub fn drag(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let scale = std::f32::consts::TAU / viewport_height;
        self.yaw_velocity -= delta.x * scale;
        self.pitch_velocity += delta.y * scale;
    }

    /// Wheel zoom; positive `delta_y` moves away.
    pub fn zoom(&mut self, delta_y: f32) {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return;
        }
        let factor = if delta_y > 0.0 { 1.0 / ZOOM_BASE } else { ZOOM_BASE };
        self.set_distance(self.distance * factor);
    }

    /// Move toward the target by `amount` world units.
    pub fn dolly(&mut self, amount: f32) {
        self.set_distance(self.distance - amount);
    }

    /// Apply a damped share of the queued rotation.
    pub fn update(&mut self) {
        self.yaw += self.yaw_velocity * DAMPING;
        self.pitch = (self.pitch + self.pitch_velocity * DAMPING).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw_velocity *= 1.0 - DAMPING;
        self.pitch_velocity *= 1.0 - DAMPING;
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), self.aspect, NEAR, FAR)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Where the pointer ray hits the z = 0 plane, if it does.
    pub fn ray_to_plane(&self, ndc: Vec2) -> Option<Vec3> {
        let inverse = self.view_projection().inverse();
        let unproject = |z: f32| {
            let p = inverse * ndc.extend(z).extend(1.0);
            p.truncate() / p.w
        };
        let near = unproject(-1.0);
        let far = unproject(1.0);
        let dir = (far - near).normalize_or_zero();
        if dir.z.abs() < 1e-6 {
            return None;
        }
        let t = -near.z / dir.z;
        (t >= 0.0).then(|| near + dir * t)
    }

    fn set_distance(&mut self, distance: f32) {
        if distance.is_finite() {
            self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_the_z_axis() {
        let cam = OrbitCamera::new(16.0 / 9.0);
        assert!(cam.position().distance(Vec3::new(0.0, 0.0, 10.0)) < 1e-5);
    }

    #[test]
    fn centre_ray_hits_origin() {
        let cam = OrbitCamera::new(1.5);
        let hit = cam.ray_to_plane(Vec2::ZERO).unwrap();
        assert!(hit.length() < 1e-3, "hit = {:?}", hit);
    }

    #[test]
    fn distance_is_clamped() {
        let mut cam = OrbitCamera::default();
        for _ in 0..200 {
            cam.zoom(100.0);
        }
        assert_eq!(cam.distance(), MAX_DISTANCE);
        cam.dolly(1000.0);
        assert_eq!(cam.distance(), MIN_DISTANCE);
    }

    #[test]
    fn drag_is_damped() {
        let mut cam = OrbitCamera::default();
        cam.drag(Vec2::new(100.0, 0.0), 800.0);
        cam.update();
        let first = cam.position();
        cam.update();
        let second = cam.position();
        assert!(first.distance(Vec3::new(0.0, 0.0, 10.0)) > 0.0);
        assert!(second.distance(first) < first.distance(Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn ndc_corners() {
        let vp = Vec2::new(800.0, 600.0);
        assert_eq!(pointer_ndc(Vec2::ZERO, vp), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_ndc(vp, vp), Vec2::new(1.0, -1.0));
    }
}
