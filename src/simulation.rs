//! Simulation state: the active preset, run mode, and reset policy,
//! wrapped around an [`IntegrationBackend`].

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::attractor::{AttractorField, Preset, PresetRegistry};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::integrator::{IntegrationBackend, StepParams};
use crate::particles::scatter;
use crate::render::PointSource;

/// Whether `step()` moves particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Running,
    /// Integrates with a zero step size; buffers still swap every frame.
    Paused,
    /// Take one real step on the next frame, then pause.
    SingleStep,
}

pub struct Simulation<B: IntegrationBackend> {
    backend: B,
    registry: PresetRegistry,
    active: usize,
    preset: Preset,
    params: StepParams,
    mode: RunMode,
    rng: SmallRng,
    /// Reset positions are generated here, then loaded into both buffers.
    scratch: Vec<Vec3>,
    reset_volume: f32,
    small_reset_volume: f32,
    frames: u64,
}

impl<B: IntegrationBackend> Simulation<B> {
    /// Validate `config`, select its preset and scatter the particles.
    pub fn new(config: &EngineConfig, backend: B) -> Result<Self, ConfigError> {
        config.validate()?;
        if backend.particle_count() != config.particle_count {
            return Err(ConfigError::ParticleCountMismatch {
                expected: config.particle_count,
                actual: backend.particle_count(),
            });
        }

        let registry = config.preset_registry()?;
        let active = registry
            .position(&config.preset)
            .ok_or_else(|| ConfigError::UnknownPreset(config.preset.clone()))?;
        let preset = registry.by_index(active)?.clone();

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut sim = Self {
            backend,
            registry,
            active,
            preset,
            params: StepParams::new(config.step_size, config.sub_steps_per_frame),
            mode: RunMode::Running,
            rng,
            scratch: vec![Vec3::ZERO; config.particle_count],
            reset_volume: config.reset_volume,
            small_reset_volume: config.small_reset_volume,
            frames: 0,
        };
        sim.reset_full()?;

        log::info!(
            "Simulation ready: {} particles, preset '{}', {} backend",
            sim.particle_count(),
            sim.preset.name,
            sim.backend.name()
        );
        Ok(sim)
    }

    /// Replace the active field with the preset called `name`.
    ///
    /// On error the current field is left untouched.
    pub fn select_preset(&mut self, name: &str) -> Result<&Preset, ConfigError> {
        let index = self
            .registry
            .position(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
        self.select_preset_index(index)
    }

    /// Replace the active field with the preset at `index`.
    pub fn select_preset_index(&mut self, index: usize) -> Result<&Preset, ConfigError> {
        let preset = self.registry.by_index(index)?.clone();
        log::info!("Switched to preset '{}'", preset.name);
        self.active = index;
        self.preset = preset;
        Ok(&self.preset)
    }

    /// Scatter every particle inside `[-volume, volume]³`.
    ///
    /// Both physical buffers receive the new positions, so the next swap
    /// cannot bring back pre-reset data.
    pub fn reset(&mut self, volume: f32) -> Result<(), ConfigError> {
        scatter(&mut self.scratch, volume, &mut self.rng)?;
        self.backend.load(&self.scratch);
        log::debug!("Reset {} particles within ±{}", self.scratch.len(), volume);
        Ok(())
    }

    pub fn reset_full(&mut self) -> Result<(), ConfigError> {
        self.reset(self.reset_volume)
    }

    pub fn reset_small(&mut self) -> Result<(), ConfigError> {
        self.reset(self.small_reset_volume)
    }

    /// Load explicit positions into both buffers.
    pub fn load_positions(&mut self, positions: &[Vec3]) -> Result<(), ConfigError> {
        if positions.len() != self.particle_count() {
            return Err(ConfigError::ParticleCountMismatch {
                expected: self.particle_count(),
                actual: positions.len(),
            });
        }
        self.scratch.copy_from_slice(positions);
        self.backend.load(&self.scratch);
        Ok(())
    }

    /// Run one frame's integration pass and swap the buffer labels.
    pub fn step(&mut self) {
        let params = match self.mode {
            RunMode::Running => self.params,
            RunMode::Paused => self.params.paused(),
            RunMode::SingleStep => {
                self.mode = RunMode::Paused;
                self.params
            }
        };
        self.backend.advance(&self.preset.field, params);
        self.frames += 1;
    }

    pub fn pause(&mut self) {
        self.mode = RunMode::Paused;
    }

    pub fn resume(&mut self) {
        self.mode = RunMode::Running;
    }

    pub fn toggle_pause(&mut self) {
        match self.mode {
            RunMode::Running => self.pause(),
            RunMode::Paused | RunMode::SingleStep => self.resume(),
        }
        log::info!("{}", if self.is_paused() { "Paused" } else { "Resumed" });
    }

    /// Advance exactly one frame on the next `step()`, then stay paused.
    pub fn request_single_step(&mut self) {
        self.mode = RunMode::SingleStep;
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn is_paused(&self) -> bool {
        self.mode != RunMode::Running
    }

    pub fn field(&self) -> &AttractorField {
        &self.preset.field
    }

    pub fn active_preset(&self) -> &Preset {
        &self.preset
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn step_params(&self) -> StepParams {
        self.params
    }

    pub fn particle_count(&self) -> usize {
        self.backend.particle_count()
    }

    /// Frames stepped since startup.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The READABLE buffer for this frame's draw.
    pub fn front_points(&self) -> PointSource<'_> {
        self.backend.front_points()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use crate::integrator::CpuIntegrator;

    fn config(n: usize) -> EngineConfig {
        EngineConfig::new()
            .with_particle_count(n)
            .with_backend(Backend::Cpu)
            .with_seed(11)
    }

    fn sim(n: usize) -> Simulation<CpuIntegrator> {
        Simulation::new(&config(n), CpuIntegrator::new(n)).unwrap()
    }

    #[test]
    fn test_startup_scatters_both_buffers() {
        let sim = sim(256);
        let buffers = sim.backend().buffers();
        assert_eq!(buffers.front(), buffers.back());
        assert!(buffers.front().as_slice().iter().any(|p| *p != Vec3::ZERO));
        for p in buffers.front().as_slice() {
            assert!(p.abs().max_element() <= 20.0);
        }
    }

    #[test]
    fn test_backend_size_mismatch() {
        let err = Simulation::new(&config(10), CpuIntegrator::new(9)).err().unwrap();
        assert!(matches!(
            err,
            ConfigError::ParticleCountMismatch { expected: 10, actual: 9 }
        ));
    }

    #[test]
    fn test_unknown_preset_keeps_field() {
        let mut sim = sim(4);
        let before = *sim.field();
        assert!(matches!(sim.select_preset("henon"), Err(ConfigError::UnknownPreset(_))));
        assert!(sim.select_preset_index(7).is_err());
        assert_eq!(*sim.field(), before);
        assert_eq!(sim.active_preset().name, "lorenz");
    }

    #[test]
    fn test_select_replaces_whole_field() {
        let mut sim = sim(4);
        sim.select_preset("Rossler").unwrap();
        assert_eq!(*sim.field(), Preset::rossler(0.2, 0.2, 5.7).field);
        assert_eq!(sim.active_index(), 1);
    }

    #[test]
    fn test_paused_step_swaps_without_moving() {
        let mut sim = sim(64);
        sim.pause();
        let before = sim.backend().front().clone();
        let slot = sim.backend().front_slot();

        sim.step();

        assert_eq!(sim.backend().front_slot(), slot.other());
        assert_eq!(sim.backend().front(), &before);
    }

    #[test]
    fn test_pause_keeps_far_particles_bit_exact() {
        let mut sim = sim(2);
        let far = Vec3::splat(1.0e20);
        sim.load_positions(&[far, Vec3::ONE]).unwrap();
        sim.pause();

        sim.step();
        sim.step();

        let front = sim.backend().front().as_slice();
        assert_eq!(front[0].to_array().map(f32::to_bits), far.to_array().map(f32::to_bits));
        assert_eq!(front[1], Vec3::ONE);
    }

    #[test]
    fn test_single_step_then_paused() {
        let mut sim = sim(16);
        sim.pause();
        sim.request_single_step();
        let before = sim.backend().front().clone();

        sim.step();
        assert_eq!(sim.mode(), RunMode::Paused);
        assert_ne!(sim.backend().front(), &before);

        let after = sim.backend().front().clone();
        sim.step();
        assert_eq!(sim.backend().front(), &after);
    }

    #[test]
    fn test_toggle_pause() {
        let mut sim = sim(1);
        assert!(!sim.is_paused());
        sim.toggle_pause();
        assert!(sim.is_paused());
        sim.toggle_pause();
        assert_eq!(sim.mode(), RunMode::Running);
    }

    #[test]
    fn test_reset_after_steps_overwrites_back_buffer() {
        let mut sim = sim(32);
        sim.step();
        sim.step();
        sim.step();
        sim.reset_small().unwrap();

        let buffers = sim.backend().buffers();
        assert_eq!(buffers.front(), buffers.back());
        for p in buffers.front().as_slice() {
            assert!(p.abs().max_element() <= 1.0);
        }
    }

    #[test]
    fn test_load_positions_checks_length() {
        let mut sim = sim(3);
        assert!(sim.load_positions(&[Vec3::ONE]).is_err());
        sim.load_positions(&[Vec3::ONE, Vec3::ZERO, Vec3::NEG_ONE]).unwrap();
        assert_eq!(sim.backend().buffers().back().as_slice()[2], Vec3::NEG_ONE);
    }
}
