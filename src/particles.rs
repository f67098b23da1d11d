//! Particle position storage and the reset policy.

use glam::Vec3;
use rand::Rng;

use crate::error::ConfigError;

/// Fixed-length, index-stable sequence of particle positions.
///
/// The memory layout is a flat array of interleaved `f32` triples, which
/// is also the vertex and storage buffer layout on the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
}

impl ParticleBuffer {
    /// A buffer of `count` particles at the origin.
    pub fn zeroed(count: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; count],
        }
    }

    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn as_mut_slice(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    /// Raw bytes, 12 per particle.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Overwrite every position from `src`. Lengths must match.
    pub fn copy_from(&mut self, src: &[Vec3]) {
        self.positions.copy_from_slice(src);
    }
}

/// Byte size of `count` packed positions.
pub fn buffer_size_bytes(count: usize) -> u64 {
    (count * std::mem::size_of::<Vec3>()) as u64
}

/// Scatter every position uniformly inside the cube `[-volume, volume]³`.
///
/// Each component is `2·volume·(U − 0.5)` with `U` drawn independently
/// from `[0, 1)`. Runs in O(N) and touches nothing but `positions`.
pub fn scatter<R: Rng + ?Sized>(positions: &mut [Vec3], volume: f32, rng: &mut R) -> Result<(), ConfigError> {
    if !(volume.is_finite() && volume > 0.0) {
        return Err(ConfigError::InvalidVolume(volume));
    }

    let span = 2.0 * volume;
    for p in positions.iter_mut() {
        let ux: f32 = rng.gen();
        let uy: f32 = rng.gen();
        let uz: f32 = rng.gen();
        *p = Vec3::new(span * (ux - 0.5), span * (uy - 0.5), span * (uz - 0.5));
    }
    Ok(())
}
