//! What the render pass consumes and how points are coloured.
//!
//! The renderer itself lives in [`crate::gpu`]; this module pins down the
//! contract: which buffer is drawn, with which matrices, and the exact
//! per-point colour rule.

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::attractor::AttractorField;
use crate::camera::ViewTransform;

/// Smallest view-space distance used in the alpha term.
pub const MIN_ALPHA_DISTANCE: f32 = 1.0e-4;

/// Speed-ramp colouring with distance-attenuated alpha.
///
/// ```text
/// speed = |F(p)|
/// t     = 1                      if speed <= 0
///         min(speed_k / speed, 1) otherwise
/// rgb   = mix(fast, slow, t)
/// alpha = clamp(alpha_k / max(d, 1e-4), alpha_min, 1)
/// ```
///
/// `F` is the active field evaluated at the untransformed position and
/// `d` is the view-space distance of the transformed point. The vertex
/// shader evaluates the same expressions in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPolicy {
    pub slow_color: [f32; 3],
    pub fast_color: [f32; 3],
    pub speed_k: f32,
    pub alpha_k: f32,
    pub alpha_min: f32,
}

impl Default for ColorPolicy {
    fn default() -> Self {
        Self {
            slow_color: [0.10, 0.35, 1.00],
            fast_color: [1.00, 0.55, 0.10],
            speed_k: 20.0,
            alpha_k: 1.5,
            alpha_min: 0.05,
        }
    }
}

impl ColorPolicy {
    /// Ramp parameter for a given speed.
    #[inline]
    pub fn ramp(&self, speed: f32) -> f32 {
        if speed > 0.0 {
            (self.speed_k / speed).min(1.0)
        } else {
            1.0
        }
    }

    /// Alpha for a given view-space distance.
    #[inline]
    pub fn alpha(&self, distance: f32) -> f32 {
        (self.alpha_k / distance.max(MIN_ALPHA_DISTANCE)).clamp(self.alpha_min, 1.0)
    }

    /// Colour from a speed and a view-space distance.
    pub fn shade(&self, speed: f32, distance: f32) -> Vec4 {
        let t = self.ramp(speed);
        let fast = Vec3::from_array(self.fast_color);
        let slow = Vec3::from_array(self.slow_color);
        // mix(a, b, t) = a * (1 - t) + b * t, matching WGSL's definition
        let rgb = fast * (1.0 - t) + slow * t;
        rgb.extend(self.alpha(distance))
    }

    /// Full colour of one particle, as the vertex shader computes it.
    pub fn point_color(&self, field: &AttractorField, position: Vec3, transform: &ViewTransform) -> Vec4 {
        let speed = field.velocity(position).length();
        let world = transform.model() * position.extend(1.0);
        let eye = transform.camera * world;
        self.shade(speed, eye.truncate().length())
    }
}

/// Where the READABLE particle buffer lives.
#[derive(Clone, Copy)]
pub enum PointSource<'a> {
    /// Host memory; the renderer uploads it before drawing.
    Host(&'a [Vec3]),
    /// Already on the device as packed `f32` triples.
    Device(&'a wgpu::Buffer),
}

impl std::fmt::Debug for PointSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointSource::Host(points) => write!(f, "Host({} points)", points.len()),
            PointSource::Device(buffer) => write!(f, "Device({} bytes)", buffer.size()),
        }
    }
}

/// Everything one frame's draw call reads.
#[derive(Debug, Clone, Copy)]
pub struct FrameSubmission<'a> {
    /// The buffer labelled READABLE after this frame's swap.
    pub points: PointSource<'a>,
    pub point_count: u32,
    /// View (look-at), projection and model matrices for this frame.
    pub transform: &'a ViewTransform,
    /// Active field, needed for speed colouring.
    pub field: &'a AttractorField,
    pub color: &'a ColorPolicy,
}

impl FrameSubmission<'_> {
    pub fn view(&self) -> Mat4 {
        self.transform.camera
    }

    pub fn projection(&self) -> Mat4 {
        self.transform.perspective
    }

    pub fn model(&self) -> Mat4 {
        self.transform.model()
    }
}

/// A sink for finished frames.
pub trait RenderBackend {
    /// Draw one frame. Surface errors are reported, not fatal.
    fn submit_frame(&mut self, frame: &FrameSubmission<'_>) -> Result<(), wgpu::SurfaceError>;

    /// The drawable area changed size.
    fn resize(&mut self, width: u32, height: u32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attractor::{Axis, Monomial};

    #[test]
    fn test_still_particles_use_slow_color() {
        let policy = ColorPolicy::default();
        let c = policy.shade(0.0, 1.0);
        assert_eq!(c.truncate(), Vec3::from_array(policy.slow_color));
    }

    #[test]
    fn test_fast_particles_approach_fast_color() {
        let policy = ColorPolicy::default();
        let c = policy.shade(policy.speed_k * 1000.0, 1.0);
        let fast = Vec3::from_array(policy.fast_color);
        assert!((c.truncate() - fast).length() < 1e-2);
    }

    #[test]
    fn test_ramp_saturates_below_k() {
        let policy = ColorPolicy {
            speed_k: 5.0,
            ..Default::default()
        };
        assert_eq!(policy.ramp(2.0), 1.0);
        assert_eq!(policy.ramp(10.0), 0.5);
    }

    #[test]
    fn test_point_color_uses_particle_space_speed_and_eye_distance() {
        let policy = ColorPolicy {
            slow_color: [0.0, 0.0, 1.0],
            fast_color: [1.0, 0.0, 0.0],
            speed_k: 20.0,
            alpha_k: 6.5,
            alpha_min: 0.05,
        };
        // dx/dt = x, so speed is |x|
        let field = AttractorField::ZERO.with_term(Axis::X, Monomial::X, 1.0);
        let transform = ViewTransform {
            rotation: Mat4::IDENTITY,
            translation: Mat4::from_translation(Vec3::new(-30.0, 0.0, 0.0)),
            camera: Mat4::from_translation(Vec3::new(0.0, 0.0, -12.0)),
            perspective: Mat4::IDENTITY,
            inv_scale: 0.5,
        };
        let position = Vec3::new(40.0, 0.0, 0.0);

        let color = policy.point_color(&field, position, &transform);

        // speed 40 gives t = 0.5; eye point (5, 0, -12) is 13 away
        assert_eq!(color, Vec4::new(0.5, 0.0, 0.5, 0.5));

        let world = (transform.model() * position.extend(1.0)).truncate();
        assert_eq!(world, Vec3::new(5.0, 0.0, 0.0));
        assert_ne!(color, policy.shade(field.velocity(world).length(), 13.0));
    }

    #[test]
    fn test_alpha_falls_off_with_distance() {
        let policy = ColorPolicy {
            alpha_k: 2.0,
            alpha_min: 0.1,
            ..Default::default()
        };
        assert_eq!(policy.alpha(1.0), 1.0);
        assert_eq!(policy.alpha(4.0), 0.5);
        assert_eq!(policy.alpha(1000.0), 0.1);
        assert_eq!(policy.alpha(0.0), 1.0);
    }
}
