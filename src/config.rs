//! Tunable parameters for both engines.
//!
//! UI sliders write through the `set_*` methods, which clamp silently to the
//! documented ranges. A page may also embed overrides as JSON in a
//! `data-config` attribute; those pass through the same clamping.

use crate::color::Rgb;
use crate::error::VizError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const GRID_SIZE_RANGE: RangeInclusive<f32> = 10.0..=100.0;
pub const FIELD_PARTICLE_SIZE_RANGE: RangeInclusive<f32> = 0.5..=5.0;
pub const MOUSE_INFLUENCE_RANGE: RangeInclusive<f32> = 50.0..=400.0;
pub const ANIMATION_SPEED_RANGE: RangeInclusive<f32> = 0.05..=2.0;

pub const PARTICLE_COUNT_RANGE: RangeInclusive<usize> = 50..=2000;
pub const SPHERE_PARTICLE_SIZE_RANGE: RangeInclusive<f32> = 0.01..=0.2;
pub const SPHERE_RADIUS_RANGE: RangeInclusive<f32> = 1.0..=20.0;
pub const SCATTER_RADIUS_RANGE: RangeInclusive<f32> = 1.0..=100.0;
pub const ROTATION_SPEED_RANGE: RangeInclusive<f32> = 0.0..=5.0;
pub const STREAK_LENGTH_RANGE: RangeInclusive<f32> = 0.0..=2.0;
pub const INTERACTION_RADIUS_RANGE: RangeInclusive<f32> = 0.1..=10.0;
pub const INTERACTION_STRENGTH_RANGE: RangeInclusive<f32> = 0.0..=5.0;

/// Clamp into `range`, mapping NaN to the lower bound.
pub fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

/// Clamp into [0, 1], mapping NaN to 0.
pub fn unit(value: f32) -> f32 {
    clamp_to(value, &(0.0..=1.0))
}

/// Parameters of the 2D particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    pub grid_size: f32,
    pub particle_size: f32,
    pub mouse_influence: f32,
    pub connection_opacity: f32,
    pub animation_speed: f32,
    pub particle_color: Rgb,
    pub connection_color: Rgb,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            grid_size: 25.0,
            particle_size: 1.0,
            mouse_influence: 150.0,
            connection_opacity: 0.05,
            animation_speed: 0.3,
            particle_color: Rgb::WHITE,
            connection_color: Rgb::from_u32(0x87ceeb),
        }
    }
}

impl FieldConfig {
    /// Parse JSON overrides on top of the defaults, then clamp.
    pub fn from_json(json: &str) -> Result<Self, VizError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.clamp_all();
        Ok(config)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_grid_size(&mut self, v: f32) {
        self.grid_size = clamp_to(v, &GRID_SIZE_RANGE);
    }

    pub fn set_particle_size(&mut self, v: f32) {
        self.particle_size = clamp_to(v, &FIELD_PARTICLE_SIZE_RANGE);
    }

    pub fn set_mouse_influence(&mut self, v: f32) {
        self.mouse_influence = clamp_to(v, &MOUSE_INFLUENCE_RANGE);
    }

    pub fn set_connection_opacity(&mut self, v: f32) {
        self.connection_opacity = unit(v);
    }

    pub fn set_animation_speed(&mut self, v: f32) {
        self.animation_speed = clamp_to(v, &ANIMATION_SPEED_RANGE);
    }

    /// Unparseable colors are ignored.
    pub fn set_particle_color(&mut self, hex: &str) {
        if let Some(c) = Rgb::from_hex(hex) {
            self.particle_color = c;
        }
    }

    pub fn set_connection_color(&mut self, hex: &str) {
        if let Some(c) = Rgb::from_hex(hex) {
            self.connection_color = c;
        }
    }

    /// Apply a named slider value. Unknown names are ignored; returns
    /// whether the particle grid has to be rebuilt.
    pub fn apply(&mut self, name: &str, value: &str) -> bool {
        let number = value.trim().parse::<f32>().ok();
        match (name, number) {
            ("gridSize", Some(v)) => {
                self.set_grid_size(v);
                return true;
            }
            ("particleSize", Some(v)) => self.set_particle_size(v),
            ("mouseInfluence", Some(v)) => self.set_mouse_influence(v),
            ("connectionOpacity", Some(v)) => self.set_connection_opacity(v),
            ("animationSpeed", Some(v)) => self.set_animation_speed(v),
            ("particleColor", _) => self.set_particle_color(value),
            ("connectionColor", _) => self.set_connection_color(value),
            _ => {}
        }
        false
    }

    fn clamp_all(&mut self) {
        self.set_grid_size(self.grid_size);
        self.set_particle_size(self.particle_size);
        self.set_mouse_influence(self.mouse_influence);
        self.set_connection_opacity(self.connection_opacity);
        self.set_animation_speed(self.animation_speed);
    }
}

/// Surface properties of the sphere particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialProperties {
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub ior: f32,
    pub color: Rgb,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            metalness: 0.9,
            roughness: 0.1,
            clearcoat: 0.8,
            ior: 1.5,
            color: Rgb::WHITE,
            emissive: Rgb::from_u32(0x333333),
            emissive_intensity: 0.05,
        }
    }
}

/// Partial material update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialUpdate {
    pub metalness: Option<f32>,
    pub roughness: Option<f32>,
    pub clearcoat: Option<f32>,
    pub ior: Option<f32>,
    pub emissive_intensity: Option<f32>,
}

impl MaterialProperties {
    pub fn merge(&mut self, update: &MaterialUpdate) {
        if let Some(v) = update.metalness {
            self.metalness = unit(v);
        }
        if let Some(v) = update.roughness {
            self.roughness = unit(v);
        }
        if let Some(v) = update.clearcoat {
            self.clearcoat = unit(v);
        }
        if let Some(v) = update.ior {
            self.ior = clamp_to(v, &(1.0..=2.333));
        }
        if let Some(v) = update.emissive_intensity {
            self.emissive_intensity = unit(v);
        }
    }
}

/// Parameters of the 3D particle sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SphereConfig {
    pub particle_count: usize,
    pub particle_size: f32,
    pub sphere_radius: f32,
    pub scatter_radius: f32,
    pub rotation_speed: f32,
    pub scatter: f32,
    pub cluster: f32,
    pub streak_length: f32,
    pub streak_intensity: f32,
    pub motion_blur: f32,
    pub lightspeed_zoom: f32,
    pub interaction_radius: f32,
    pub interaction_strength: f32,
    pub material: MaterialProperties,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            particle_count: 400,
            particle_size: 0.04,
            sphere_radius: 6.0,
            scatter_radius: 20.0,
            rotation_speed: 0.3,
            scatter: 0.0,
            cluster: 1.0,
            streak_length: 0.5,
            streak_intensity: 0.3,
            motion_blur: 0.2,
            lightspeed_zoom: 0.0,
            interaction_radius: 2.0,
            interaction_strength: 0.5,
            material: MaterialProperties::default(),
        }
    }
}

impl SphereConfig {
    pub fn from_json(json: &str) -> Result<Self, VizError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.clamp_all();
        Ok(config)
    }

    pub fn set_particle_count(&mut self, n: usize) {
        self.particle_count = n.clamp(*PARTICLE_COUNT_RANGE.start(), *PARTICLE_COUNT_RANGE.end());
    }

    pub fn set_particle_size(&mut self, v: f32) {
        self.particle_size = clamp_to(v, &SPHERE_PARTICLE_SIZE_RANGE);
    }

    pub fn set_rotation_speed(&mut self, v: f32) {
        self.rotation_speed = clamp_to(v, &ROTATION_SPEED_RANGE);
    }

    pub fn set_scatter(&mut self, v: f32) {
        self.scatter = unit(v);
    }

    pub fn set_cluster(&mut self, v: f32) {
        self.cluster = unit(v);
    }

    pub fn set_streak_length(&mut self, v: f32) {
        self.streak_length = clamp_to(v, &STREAK_LENGTH_RANGE);
    }

    pub fn set_streak_intensity(&mut self, v: f32) {
        self.streak_intensity = unit(v);
    }

    pub fn set_motion_blur(&mut self, v: f32) {
        self.motion_blur = unit(v);
    }

    pub fn set_lightspeed_zoom(&mut self, v: f32) {
        self.lightspeed_zoom = unit(v);
    }

    pub fn set_interaction_radius(&mut self, v: f32) {
        self.interaction_radius = clamp_to(v, &INTERACTION_RADIUS_RANGE);
    }

    pub fn set_interaction_strength(&mut self, v: f32) {
        self.interaction_strength = clamp_to(v, &INTERACTION_STRENGTH_RANGE);
    }

    fn clamp_all(&mut self) {
        self.set_particle_count(self.particle_count);
        self.set_particle_size(self.particle_size);
        self.sphere_radius = clamp_to(self.sphere_radius, &SPHERE_RADIUS_RANGE);
        self.scatter_radius = clamp_to(self.scatter_radius, &SCATTER_RADIUS_RANGE);
        self.set_rotation_speed(self.rotation_speed);
        self.set_scatter(self.scatter);
        self.set_cluster(self.cluster);
        self.set_streak_length(self.streak_length);
        self.set_streak_intensity(self.streak_intensity);
        self.set_motion_blur(self.motion_blur);
        self.set_lightspeed_zoom(self.lightspeed_zoom);
        self.set_interaction_radius(self.interaction_radius);
        self.set_interaction_strength(self.interaction_strength);
        let material = MaterialUpdate {
            metalness: Some(self.material.metalness),
            roughness: Some(self.material.roughness),
            clearcoat: Some(self.material.clearcoat),
            ior: Some(self.material.ior),
            emissive_intensity: Some(self.material.emissive_intensity),
        };
        self.material.merge(&material);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_clamps_and_swallows_nan() {
        assert_eq!(unit(5.0), 1.0);
        assert_eq!(unit(-2.0), 0.0);
        assert_eq!(unit(f32::NAN), 0.0);
    }

    #[test]
    fn field_apply_reports_grid_rebuild() {
        let mut cfg = FieldConfig::default();
        assert!(cfg.apply("gridSize", "40"));
        assert_eq!(cfg.grid_size, 40.0);
        assert!(!cfg.apply("mouseInfluence", "9000"));
        assert_eq!(cfg.mouse_influence, 400.0);
        assert!(!cfg.apply("particleColor", "not a color"));
        assert_eq!(cfg.particle_color, Rgb::WHITE);
    }

    #[test]
    fn json_overrides_are_clamped() {
        let cfg = FieldConfig::from_json(r##"{"gridSize": 2, "connectionColor": "#ff0000"}"##).unwrap();
        assert_eq!(cfg.grid_size, 10.0);
        assert_eq!(cfg.connection_color, Rgb::new(255, 0, 0));
        assert_eq!(cfg.mouse_influence, 150.0);

        let sphere = SphereConfig::from_json(r#"{"particleCount": 5, "scatter": 3.0}"#).unwrap();
        assert_eq!(sphere.particle_count, 50);
        assert_eq!(sphere.scatter, 1.0);
    }

    #[test]
    fn degenerate_radii_are_clamped() {
        let sphere =
            SphereConfig::from_json(r#"{"sphereRadius": 0, "scatterRadius": -4}"#).unwrap();
        assert_eq!(sphere.sphere_radius, 1.0);
        assert_eq!(sphere.scatter_radius, 1.0);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(
            FieldConfig::from_json("{"),
            Err(VizError::InvalidConfig(_))
        ));
    }

    #[test]
    fn material_merge_keeps_unset_fields() {
        let mut m = MaterialProperties::default();
        m.merge(&MaterialUpdate {
            roughness: Some(0.7),
            ..Default::default()
        });
        assert_eq!(m.roughness, 0.7);
        assert_eq!(m.metalness, 0.9);
    }
}
