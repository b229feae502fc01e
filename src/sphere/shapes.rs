//! Target layouts the sphere can morph into.
//!
//! Every generator is a pure function of particle index and count, so
//! selecting the same shape twice yields identical targets. Generators may
//! return more or fewer points than asked for; [`normalize`] fixes the
//! length for all of them the same way.

use glam::Vec3;
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

/// Golden angle in radians; spreads successive samples evenly around a circle.
const GOLDEN_ANGLE: f32 = 2.399_963;

/// The closed catalog of layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Sphere,
    Smiley,
    Thumbs,
    Ring,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Sphere, Shape::Smiley, Shape::Thumbs, Shape::Ring];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Sphere => "sphere",
            Shape::Smiley => "smiley",
            Shape::Thumbs => "thumbs",
            Shape::Ring => "ring",
        }
    }

    /// Unknown names fall back to the sphere.
    pub fn from_name(name: &str) -> Shape {
        name.parse().unwrap_or_default()
    }

    /// Raw generator output, not yet normalized to `count`.
    pub fn generate(self, count: usize, sphere_radius: f32, outline: bool) -> Vec<Vec3> {
        match self {
            Shape::Sphere => (0..count).map(|i| sphere_point(i, count, sphere_radius)).collect(),
            Shape::Smiley => smiley(count, outline),
            Shape::Thumbs => thumbs(count),
            Shape::Ring => ring(count),
        }
    }

    /// Generator output normalized to exactly `count` points.
    pub fn targets(self, count: usize, sphere_radius: f32, outline: bool) -> Vec<Vec3> {
        let raw = self.generate(count, sphere_radius, outline);
        normalize(raw, count, |i| sphere_point(i, count, sphere_radius))
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sphere" | "default" => Ok(Shape::Sphere),
            "smiley" => Ok(Shape::Smiley),
            "thumbs" => Ok(Shape::Thumbs),
            "ring" => Ok(Shape::Ring),
            other => Err(format!("unknown shape {:?}", other)),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Truncate to `count`, or pad by cycling through `points` from the start.
/// Empty input is filled from `fallback`.
pub fn normalize(mut points: Vec<Vec3>, count: usize, fallback: impl Fn(usize) -> Vec3) -> Vec<Vec3> {
    if points.len() >= count {
        points.truncate(count);
        return points;
    }
    if points.is_empty() {
        return (0..count).map(fallback).collect();
    }
    let generated = points.len();
    let padding: Vec<Vec3> = (generated..count).map(|i| points[i % generated]).collect();
    points.extend(padding);
    points
}

/// Fibonacci-spiral point `i` of `count` on a sphere.
pub fn sphere_point(i: usize, count: usize, radius: f32) -> Vec3 {
    let n = count.max(1) as f32;
    let phi = (-1.0 + 2.0 * i as f32 / n).clamp(-1.0, 1.0).acos();
    let theta = (n * PI).sqrt() * phi;
    Vec3::new(
        radius * theta.cos() * phi.sin(),
        radius * theta.sin() * phi.sin(),
        radius * phi.cos(),
    )
}

fn circle(count: usize, radius: f32, center: Vec3, start: f32, sweep: f32) -> impl Iterator<Item = Vec3> {
    (0..count).map(move |i| {
        let angle = start + i as f32 / count as f32 * sweep;
        center + Vec3::new(angle.cos() * radius, angle.sin() * radius, 0.0)
    })
}

fn smiley(count: usize, outline: bool) -> Vec<Vec3> {
    const FACE_RADIUS: f32 = 3.0;
    const EYE_RADIUS: f32 = 0.5;
    const SMILE_RADIUS: f32 = 1.5;

    let n = count as f32;
    let mut points = Vec::with_capacity(count);
    points.extend(circle((n * 0.4) as usize, FACE_RADIUS, Vec3::ZERO, 0.0, TAU));

    let eyes = (n * 0.2) as usize;
    let left = circle(eyes, EYE_RADIUS, Vec3::new(-1.0, 1.0, 0.0), 0.0, TAU);
    let right = circle(eyes, EYE_RADIUS, Vec3::new(1.0, 1.0, 0.0), 0.0, TAU);
    for (l, r) in left.zip(right) {
        points.push(l);
        points.push(r);
    }

    points.extend(circle((n * 0.2) as usize, SMILE_RADIUS, Vec3::new(0.0, -0.5, 0.0), PI, PI));

    // Outline mode leaves the face hollow and lets normalization pad it.
    if !outline {
        let remaining = count.saturating_sub(points.len());
        for k in 0..remaining {
            let r = FACE_RADIUS * 0.8 * ((k as f32 + 0.5) / remaining as f32).sqrt();
            let angle = k as f32 * GOLDEN_ANGLE;
            points.push(Vec3::new(angle.cos() * r, angle.sin() * r, 0.0));
        }
    }
    points
}

fn thumbs(count: usize) -> Vec<Vec3> {
    // (share of particles, arc width, height, vertical offset)
    const STROKES: [(f32, f32, f32, f32); 3] = [
        (0.3, 1.5, 3.0, -1.5), // thumb
        (0.4, 2.0, 2.0, -1.0), // hand
        (0.3, 1.8, 1.5, -0.5), // fingers
    ];

    let n = count as f32;
    let mut points = Vec::with_capacity(count);
    for (share, width, height, offset) in STROKES {
        let strokes = (n * share) as usize;
        points.extend((0..strokes).map(|i| {
            let t = i as f32 / strokes as f32;
            Vec3::new((t * PI).sin() * width, t * height + offset, 0.0)
        }));
    }
    points
}

fn ring(count: usize) -> Vec<Vec3> {
    const RING_RADIUS: f32 = 3.0;
    const TUBE_RADIUS: f32 = 0.5;

    (0..count)
        .map(|i| {
            let theta = i as f32 / count as f32 * TAU;
            let phi = i as f32 * GOLDEN_ANGLE;
            let r = RING_RADIUS + phi.cos() * TUBE_RADIUS;
            Vec3::new(r * theta.cos(), r * theta.sin(), phi.sin() * TUBE_RADIUS)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_and_unknown_falls_back() {
        for shape in Shape::ALL {
            assert_eq!(Shape::from_name(shape.name()), shape);
        }
        assert_eq!(Shape::from_name("dodecahedron"), Shape::Sphere);
        assert_eq!(Shape::from_name(" Ring "), Shape::Ring);
    }

    #[test]
    fn normalize_truncates_and_cycles() {
        let pts: Vec<Vec3> = (0..3).map(|i| Vec3::splat(i as f32)).collect();
        assert_eq!(normalize(pts.clone(), 2, |_| Vec3::ZERO).len(), 2);

        let padded = normalize(pts, 7, |_| Vec3::ZERO);
        assert_eq!(padded.len(), 7);
        assert_eq!(padded[3], Vec3::splat(0.0));
        assert_eq!(padded[4], Vec3::splat(1.0));
        assert_eq!(padded[6], Vec3::splat(0.0));

        let filled = normalize(Vec::new(), 2, |i| Vec3::splat(i as f32 + 10.0));
        assert_eq!(filled, vec![Vec3::splat(10.0), Vec3::splat(11.0)]);
    }

    #[test]
    fn thumbs_is_undersized_for_odd_counts() {
        // floor(0.3n) + floor(0.4n) + floor(0.3n) < n here, so padding kicks in.
        assert!(Shape::Thumbs.generate(401, 6.0, false).len() < 401);
        assert_eq!(Shape::Thumbs.targets(401, 6.0, false).len(), 401);
    }

    #[test]
    fn sphere_points_lie_on_the_sphere() {
        for i in 0..100 {
            let p = sphere_point(i, 100, 6.0);
            assert!((p.length() - 6.0).abs() < 1e-4);
        }
    }

    #[test]
    fn ring_stays_inside_the_tube() {
        for p in Shape::Ring.generate(500, 6.0, false) {
            let radial = (p.x * p.x + p.y * p.y).sqrt();
            let tube = ((radial - 3.0).powi(2) + p.z * p.z).sqrt();
            assert!(tube <= 0.5 + 1e-4);
        }
    }

    #[test]
    fn outline_smiley_has_no_fill() {
        let full = Shape::Smiley.generate(400, 6.0, false);
        let hollow = Shape::Smiley.generate(400, 6.0, true);
        assert_eq!(full.len(), 400);
        assert!(hollow.len() <= full.len());
    }
}
