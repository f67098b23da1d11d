//! Forward-Euler integration of independent particles.
//!
//! Every particle advances on its own: no shared state, no neighbours.
//! The CPU kernel fans the particle set out across rayon's thread pool;
//! the GPU kernel (`gpu/integrate.wgsl`) runs the same arithmetic, one
//! invocation per particle.

use glam::Vec3;
use rayon::prelude::*;

use crate::attractor::AttractorField;
use crate::double_buffer::{DoubleBuffer, Slot};
use crate::particles::ParticleBuffer;
use crate::render::PointSource;

/// Particles per rayon task. Keeps scheduling overhead small next to the
/// per-particle arithmetic.
const PARALLEL_CHUNK: usize = 4096;

/// Integration parameters for one displayed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    /// Euler time step `h`. Zero makes the step a no-op (pause).
    pub step_size: f32,
    /// Euler iterations per frame.
    pub sub_steps: u32,
}

impl StepParams {
    pub fn new(step_size: f32, sub_steps: u32) -> Self {
        Self { step_size, sub_steps }
    }

    /// Same sub-step count, zero step size.
    pub fn paused(self) -> Self {
        Self {
            step_size: 0.0,
            ..self
        }
    }
}

/// Advance a single position by `sub_steps` explicit Euler steps.
///
/// No clamping: unstable fields or large steps may diverge to infinity
/// or NaN, and that is passed through unchanged. A zero step size returns
/// `p` untouched; the field is not evaluated, so an overflowing velocity
/// cannot turn `0 * inf` into NaN.
#[inline]
pub fn integrate_point(field: &AttractorField, mut p: Vec3, params: StepParams) -> Vec3 {
    if params.step_size == 0.0 {
        return p;
    }
    for _ in 0..params.sub_steps {
        p += params.step_size * field.velocity(p);
    }
    p
}

/// Read every particle from `src`, write its advanced position to `dst`.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn advance(src: &[Vec3], dst: &mut [Vec3], field: &AttractorField, params: StepParams) {
    assert_eq!(src.len(), dst.len(), "front and back buffers must be the same size");

    dst.par_chunks_mut(PARALLEL_CHUNK)
        .zip(src.par_chunks(PARALLEL_CHUNK))
        .for_each(|(out, inp)| {
            for (d, s) in out.iter_mut().zip(inp) {
                *d = integrate_point(field, *s, params);
            }
        });
}

/// Storage and execution of the per-frame integration pass.
///
/// Implementations own a front/back buffer pair. `advance` reads the
/// front, writes the back, waits for completion and then swaps labels.
pub trait IntegrationBackend {
    /// Fixed particle count N.
    fn particle_count(&self) -> usize;

    /// Overwrite both buffers with `positions` before the next step.
    fn load(&mut self, positions: &[Vec3]);

    /// One integration pass followed by a label swap.
    fn advance(&mut self, field: &AttractorField, params: StepParams);

    /// Which physical slot currently carries the READABLE label.
    fn front_slot(&self) -> Slot;

    /// The READABLE buffer, as the render pass consumes it.
    fn front_points(&self) -> PointSource<'_>;

    /// Block until submitted work has finished.
    fn finish(&self) {}

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

impl<B: IntegrationBackend + ?Sized> IntegrationBackend for Box<B> {
    fn particle_count(&self) -> usize {
        (**self).particle_count()
    }

    fn load(&mut self, positions: &[Vec3]) {
        (**self).load(positions)
    }

    fn advance(&mut self, field: &AttractorField, params: StepParams) {
        (**self).advance(field, params)
    }

    fn front_slot(&self) -> Slot {
        (**self).front_slot()
    }

    fn front_points(&self) -> PointSource<'_> {
        (**self).front_points()
    }

    fn finish(&self) {
        (**self).finish()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Host-memory backend driven by rayon.
pub struct CpuIntegrator {
    buffers: DoubleBuffer<ParticleBuffer>,
}

impl CpuIntegrator {
    /// Allocate both buffers for `count` particles, all at the origin.
    pub fn new(count: usize) -> Self {
        Self {
            buffers: DoubleBuffer::from_fn(|_| ParticleBuffer::zeroed(count)),
        }
    }

    pub fn front(&self) -> &ParticleBuffer {
        self.buffers.front()
    }

    pub fn buffers(&self) -> &DoubleBuffer<ParticleBuffer> {
        &self.buffers
    }
}

impl IntegrationBackend for CpuIntegrator {
    fn particle_count(&self) -> usize {
        self.buffers.front().len()
    }

    fn load(&mut self, positions: &[Vec3]) {
        let (front, back) = self.buffers.both_mut();
        front.copy_from(positions);
        back.copy_from(positions);
    }

    fn advance(&mut self, field: &AttractorField, params: StepParams) {
        self.buffers.step(|front, back| {
            advance(front.as_slice(), back.as_mut_slice(), field, params);
        });
    }

    fn front_slot(&self) -> Slot {
        self.buffers.front_slot()
    }

    fn front_points(&self) -> PointSource<'_> {
        PointSource::Host(self.buffers.front().as_slice())
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attractor::Preset;

    fn lorenz() -> AttractorField {
        Preset::lorenz(10.0, 28.0, 8.0 / 3.0).field
    }

    #[test]
    fn test_zero_step_is_identity() {
        let p = Vec3::new(1.5, -2.0, 30.0);
        let out = integrate_point(&lorenz(), p, StepParams::new(0.0, 8));
        assert_eq!(out, p);
    }

    #[test]
    fn test_zero_step_skips_overflowing_field() {
        // Lorenz velocity overflows here; 0 * inf must not leak in as NaN
        for p in [Vec3::splat(1.0e20), Vec3::splat(f32::INFINITY)] {
            let out = integrate_point(&lorenz(), p, StepParams::new(0.0, 4));
            assert_eq!(out.to_array().map(f32::to_bits), p.to_array().map(f32::to_bits));
        }
    }

    #[test]
    fn test_sub_steps_compose() {
        let field = lorenz();
        let p = Vec3::new(1.0, 1.0, 1.0);
        let once = integrate_point(&field, p, StepParams::new(0.001, 1));
        let twice = integrate_point(&field, once, StepParams::new(0.001, 1));
        assert_eq!(integrate_point(&field, p, StepParams::new(0.001, 2)), twice);
    }

    #[test]
    fn test_advance_matches_scalar_kernel() {
        let field = lorenz();
        let params = StepParams::new(0.002, 3);
        let src: Vec<Vec3> = (0..10_000)
            .map(|i| Vec3::new(i as f32 * 0.001, 1.0, 20.0 - i as f32 * 0.0005))
            .collect();
        let mut dst = vec![Vec3::ZERO; src.len()];

        advance(&src, &mut dst, &field, params);

        for (s, d) in src.iter().zip(&dst) {
            assert_eq!(*d, integrate_point(&field, *s, params));
        }
    }

    #[test]
    #[should_panic(expected = "same size")]
    fn test_advance_rejects_mismatched_buffers() {
        let src = vec![Vec3::ZERO; 3];
        let mut dst = vec![Vec3::ZERO; 2];
        advance(&src, &mut dst, &lorenz(), StepParams::new(0.1, 1));
    }

    #[test]
    fn test_divergence_is_not_clamped() {
        let blowup = AttractorField::ZERO
            .with_term(crate::attractor::Axis::X, crate::attractor::Monomial::XX, 1.0);
        let p = integrate_point(&blowup, Vec3::new(10.0, 0.0, 0.0), StepParams::new(1.0, 12));
        assert!(!p.x.is_finite() || p.x > 1.0e30);
    }

    #[test]
    fn test_cpu_backend_load_writes_both_buffers() {
        let mut cpu = CpuIntegrator::new(2);
        let positions = [Vec3::ONE, Vec3::NEG_ONE];
        cpu.load(&positions);
        assert_eq!(cpu.buffers().front().as_slice(), &positions);
        assert_eq!(cpu.buffers().back().as_slice(), &positions);
    }
}
