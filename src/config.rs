//! Startup configuration.
//!
//! Build an [`EngineConfig`] with chained `with_*` setters, or load one
//! from JSON; every field has a default, so a file only needs the values
//! it changes:
//!
//! ```ignore
//! let config = EngineConfig::new()
//!     .with_particle_count(2_000_000)
//!     .with_preset("rossler")
//!     .with_step(0.01, 2);
//! config.validate()?;
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::attractor::{AttractorField, Preset, PresetRegistry};
use crate::camera::{CameraState, CameraStyle, Viewport};
use crate::error::ConfigError;
use crate::render::ColorPolicy;

/// Where particle integration runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Compute shader over device-resident buffers.
    #[default]
    Gpu,
    /// rayon over host buffers, uploaded for drawing each frame.
    Cpu,
}

/// Window size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// A user-defined preset, appended after the built-ins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetDef {
    pub name: String,
    pub x: [f32; 10],
    pub y: [f32; 10],
    pub z: [f32; 10],
    #[serde(default)]
    pub center: [f32; 3],
}

impl From<&PresetDef> for Preset {
    fn from(def: &PresetDef) -> Self {
        Preset::new(
            def.name.clone(),
            AttractorField::new(def.x, def.y, def.z),
            Vec3::from_array(def.center),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub resolution: Resolution,
    pub particle_count: usize,
    /// Name of the preset active at startup.
    pub preset: String,
    /// Camera zoom: particle coordinates are divided by this.
    pub scale_factor: f32,
    pub step_size: f32,
    pub sub_steps_per_frame: u32,
    pub initial_camera_position: [f32; 3],
    pub initial_yaw: f32,
    pub initial_pitch: f32,
    pub camera_style: CameraStyle,
    /// Half-extent of the cube used by the full reset.
    pub reset_volume: f32,
    /// Half-extent of the cube used by the small reset.
    pub small_reset_volume: f32,
    /// Fixed RNG seed for resets. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub backend: Backend,
    pub vsync: bool,
    pub color: ColorPolicy,
    pub custom_presets: Vec<PresetDef>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            particle_count: 1_000_000,
            preset: "lorenz".to_string(),
            scale_factor: 30.0,
            step_size: 0.0015,
            sub_steps_per_frame: 4,
            initial_camera_position: [0.0, 0.0, 3.0],
            initial_yaw: 0.0,
            initial_pitch: 0.0,
            camera_style: CameraStyle::FirstPerson,
            reset_volume: 20.0,
            small_reset_volume: 1.0,
            seed: None,
            backend: Backend::Gpu,
            vsync: true,
            color: ColorPolicy::default(),
            custom_presets: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Resolution { width, height };
        self
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_preset(mut self, name: impl Into<String>) -> Self {
        self.preset = name.into();
        self
    }

    pub fn with_scale_factor(mut self, scale: f32) -> Self {
        self.scale_factor = scale;
        self
    }

    /// Set the Euler step size and the number of sub-steps per frame.
    pub fn with_step(mut self, step_size: f32, sub_steps: u32) -> Self {
        self.step_size = step_size;
        self.sub_steps_per_frame = sub_steps;
        self
    }

    pub fn with_camera_position(mut self, position: Vec3) -> Self {
        self.initial_camera_position = position.to_array();
        self
    }

    pub fn with_camera_style(mut self, style: CameraStyle) -> Self {
        self.camera_style = style;
        self
    }

    /// Set the full and small reset half-extents.
    pub fn with_reset_volumes(mut self, full: f32, small: f32) -> Self {
        self.reset_volume = full;
        self.small_reset_volume = small;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_color(mut self, color: ColorPolicy) -> Self {
        self.color = color;
        self
    }

    pub fn with_custom_preset(mut self, preset: PresetDef) -> Self {
        self.custom_presets.push(preset);
        self
    }

    /// Built-in presets followed by `custom_presets`.
    pub fn preset_registry(&self) -> Result<PresetRegistry, ConfigError> {
        let mut registry = PresetRegistry::builtin();
        for def in &self.custom_presets {
            registry.register(def.into())?;
        }
        Ok(registry)
    }

    pub fn viewport(&self) -> Result<Viewport, ConfigError> {
        Viewport::new(self.resolution.width, self.resolution.height)
    }

    /// Initial camera built from the configured position, angles and scale.
    pub fn camera(&self) -> CameraState {
        let mut camera = CameraState::new(Vec3::from_array(self.initial_camera_position), self.scale_factor);
        camera.yaw = self.initial_yaw;
        camera.pitch = self.initial_pitch;
        camera.style = self.camera_style;
        camera
    }

    /// Reject anything that would make startup or the first frame invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::InvalidParticleCount(self.particle_count));
        }
        self.viewport()?;
        if !(self.step_size.is_finite() && self.step_size >= 0.0) {
            return Err(ConfigError::InvalidStepSize(self.step_size));
        }
        if self.sub_steps_per_frame == 0 {
            return Err(ConfigError::InvalidSubSteps(self.sub_steps_per_frame));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(ConfigError::InvalidScale(self.scale_factor));
        }
        for volume in [self.reset_volume, self.small_reset_volume] {
            if !(volume.is_finite() && volume > 0.0) {
                return Err(ConfigError::InvalidVolume(volume));
            }
        }
        self.preset_registry()?.get(&self.preset)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_zero_particles() {
        let err = EngineConfig::new().with_particle_count(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParticleCount(0)));
    }

    #[test]
    fn test_rejects_zero_viewport() {
        let err = EngineConfig::new().with_resolution(0, 600).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidViewport { .. }));
    }

    #[test]
    fn test_rejects_unknown_preset() {
        let err = EngineConfig::new().with_preset("henon").validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(name) if name == "henon"));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(EngineConfig::new().with_step(-0.1, 1).validate().is_err());
        assert!(EngineConfig::new().with_step(f32::NAN, 1).validate().is_err());
        assert!(EngineConfig::new().with_step(0.01, 0).validate().is_err());
        assert!(EngineConfig::new().with_scale_factor(0.0).validate().is_err());
        assert!(EngineConfig::new().with_reset_volumes(1.0, -1.0).validate().is_err());
    }

    #[test]
    fn test_zero_step_is_allowed() {
        EngineConfig::new().with_step(0.0, 1).validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "particle_count": 500000, "preset": "rossler", "backend": "cpu", "camera_style": "orbit" }"#,
        )
        .unwrap();
        assert_eq!(config.particle_count, 500_000);
        assert_eq!(config.preset, "rossler");
        assert_eq!(config.backend, Backend::Cpu);
        assert_eq!(config.camera_style, CameraStyle::Orbit);
        assert_eq!(config.resolution, Resolution::default());
        assert_eq!(config.sub_steps_per_frame, 4);
    }

    #[test]
    fn test_custom_presets_join_registry() {
        let config = EngineConfig::new()
            .with_custom_preset(PresetDef {
                name: "drift".into(),
                x: [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                y: [0.0; 10],
                z: [0.0; 10],
                center: [0.0; 3],
            })
            .with_preset("drift");
        config.validate().unwrap();
        let registry = config.preset_registry().unwrap();
        assert_eq!(registry.position("drift"), Some(3));
        assert_eq!(registry.get("drift").unwrap().field.velocity(Vec3::ZERO), Vec3::X);
    }

    #[test]
    fn test_duplicate_custom_preset_fails() {
        let config = EngineConfig::new().with_custom_preset(PresetDef {
            name: "Lorenz".into(),
            x: [0.0; 10],
            y: [0.0; 10],
            z: [0.0; 10],
            center: [0.0; 3],
        });
        assert!(matches!(config.validate(), Err(ConfigError::DuplicatePreset(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ particle_count: }"),
            Err(ConfigError::Parse(_))
        ));
    }
}
