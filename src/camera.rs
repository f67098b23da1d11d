//! Camera state and the view/projection transform pipeline.
//!
//! Two independent rotations coexist:
//! - the *look* rotation (`yaw`/`pitch`), driven by the pointer, which
//!   orients the camera itself;
//! - the *model* rotation (`theta`/`phi`), driven by the arrow keys,
//!   which spins the particle cloud in front of the camera.
//!
//! [`CameraState::recompute`] is a pure function of the state and the
//! viewport; the frame loop calls it whenever either changes.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pitch is kept short of straight up/down so the look-at basis stays valid.
pub const PITCH_LIMIT: f32 = 1.5;

/// Closest the orbit camera may get to the origin.
const MIN_ORBIT_DISTANCE: f32 = 0.05;

/// How camera position and look direction are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraStyle {
    /// Free camera: `position` plus a yaw/pitch look direction.
    #[default]
    FirstPerson,
    /// Eye on a sphere of radius `distance` around the origin, looking at it.
    Orbit,
}

/// Camera translation directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Camera for viewing the particle cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    /// First-person eye position.
    pub position: Vec3,
    /// Horizontal look angle in radians. Zero looks down −Z.
    pub yaw: f32,
    /// Vertical look angle in radians, clamped to ±[`PITCH_LIMIT`].
    pub pitch: f32,
    /// Orbit radius (orbit style only).
    pub distance: f32,
    /// Particle coordinates are divided by this before projection.
    pub scale: f32,
    /// Model rotation about the world Y axis.
    pub theta: f32,
    /// Model rotation about the world X axis.
    pub phi: f32,
    /// Point of the attractor moved to the origin before rotating.
    pub model_center: Vec3,
    pub style: CameraStyle,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraState {
    pub fn new(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            distance: position.length().max(MIN_ORBIT_DISTANCE),
            scale,
            theta: 0.0,
            // Attractors are usually drawn with their z axis up
            phi: -std::f32::consts::FRAC_PI_2,
            model_center: Vec3::ZERO,
            style: CameraStyle::FirstPerson,
            fov_y: 45.0_f32.to_radians(),
            near: 0.01,
            far: 100.0,
        }
    }

    /// Unit look direction from yaw/pitch.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// Unit vector to the camera's right, parallel to the ground plane.
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    /// Eye position for the active style.
    pub fn eye(&self) -> Vec3 {
        match self.style {
            CameraStyle::FirstPerson => self.position,
            CameraStyle::Orbit => {
                let x = self.distance * self.pitch.cos() * self.yaw.sin();
                let y = self.distance * self.pitch.sin();
                let z = self.distance * self.pitch.cos() * self.yaw.cos();
                Vec3::new(x, y, z)
            }
        }
    }

    /// Apply a pointer delta, already multiplied by the sensitivity.
    ///
    /// First person turns toward the pointer; orbit drags the scene.
    pub fn look(&mut self, dx: f32, dy: f32) {
        match self.style {
            CameraStyle::FirstPerson => {
                self.yaw += dx;
                self.pitch -= dy;
            }
            CameraStyle::Orbit => {
                self.yaw -= dx;
                self.pitch += dy;
            }
        }
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move the camera by `amount` world units (or radians for orbit turns).
    pub fn translate(&mut self, movement: Movement, amount: f32) {
        match self.style {
            CameraStyle::FirstPerson => {
                let delta = match movement {
                    Movement::Forward => self.forward(),
                    Movement::Backward => -self.forward(),
                    Movement::Right => self.right(),
                    Movement::Left => -self.right(),
                    Movement::Up => Vec3::Y,
                    Movement::Down => Vec3::NEG_Y,
                };
                self.position += delta * amount;
            }
            CameraStyle::Orbit => match movement {
                Movement::Forward => self.distance = (self.distance - amount).max(MIN_ORBIT_DISTANCE),
                Movement::Backward => self.distance += amount,
                Movement::Left => self.yaw -= amount,
                Movement::Right => self.yaw += amount,
                Movement::Up => self.pitch = (self.pitch + amount).clamp(-PITCH_LIMIT, PITCH_LIMIT),
                Movement::Down => self.pitch = (self.pitch - amount).clamp(-PITCH_LIMIT, PITCH_LIMIT),
            },
        }
    }

    /// Spin the particle cloud.
    pub fn rotate_model(&mut self, d_theta: f32, d_phi: f32) {
        self.theta += d_theta;
        self.phi += d_phi;
    }

    /// Multiply the scale factor. Non-positive or non-finite results are ignored.
    pub fn zoom(&mut self, factor: f32) {
        let scale = self.scale * factor;
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
    }

    pub fn toggle_style(&mut self) {
        self.style = match self.style {
            CameraStyle::FirstPerson => CameraStyle::Orbit,
            CameraStyle::Orbit => CameraStyle::FirstPerson,
        };
    }

    /// Derive all matrices for this state and viewport.
    pub fn recompute(&self, viewport: Viewport) -> ViewTransform {
        let rotation = Mat4::from_rotation_y(self.theta) * Mat4::from_rotation_x(self.phi);
        let translation = Mat4::from_translation(-self.model_center);

        let eye = self.eye();
        let camera = match self.style {
            CameraStyle::FirstPerson => Mat4::look_at_rh(eye, eye + self.forward(), Vec3::Y),
            CameraStyle::Orbit => Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y),
        };

        let perspective = Mat4::perspective_rh(self.fov_y, viewport.aspect(), self.near, self.far);

        ViewTransform {
            rotation,
            translation,
            camera,
            perspective,
            inv_scale: 1.0 / self.scale,
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), 30.0)
    }
}

/// Matrices derived from a [`CameraState`] for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Model rotation (theta about Y after phi about X).
    pub rotation: Mat4,
    /// Moves the attractor's centre to the origin.
    pub translation: Mat4,
    /// Look-at view matrix.
    pub camera: Mat4,
    pub perspective: Mat4,
    /// Reciprocal of the camera scale factor.
    pub inv_scale: f32,
}

impl ViewTransform {
    /// Particle space → world space: centre, rotate, then shrink.
    pub fn model(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.inv_scale)) * self.rotation * self.translation
    }

    pub fn view_proj(&self) -> Mat4 {
        self.perspective * self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1280, 720).unwrap()
    }

    #[test]
    fn test_viewport_rejects_zero() {
        assert!(matches!(
            Viewport::new(0, 720),
            Err(ConfigError::InvalidViewport { width: 0, height: 720 })
        ));
        assert!(Viewport::new(1280, 0).is_err());
    }

    #[test]
    fn test_default_forward_is_negative_z() {
        let cam = CameraState::default();
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((cam.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let mut cam = CameraState::default();
        cam.look(0.3, -0.2);
        cam.rotate_model(0.7, 0.1);
        assert_eq!(cam.recompute(viewport()), cam.recompute(viewport()));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = CameraState::default();
        cam.look(0.0, -100.0);
        assert_eq!(cam.pitch, PITCH_LIMIT);
        cam.look(0.0, 100.0);
        assert_eq!(cam.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_movement_follows_look_direction_not_model_rotation() {
        let mut cam = CameraState::default();
        cam.rotate_model(1.0, 1.0);
        cam.translate(Movement::Forward, 2.0);
        assert!((cam.position - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);

        cam.yaw = std::f32::consts::FRAC_PI_2;
        cam.translate(Movement::Forward, 1.0);
        assert!((cam.position - Vec3::new(1.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_orbit_eye_stays_on_sphere() {
        let mut cam = CameraState::default();
        cam.toggle_style();
        assert_eq!(cam.style, CameraStyle::Orbit);
        cam.look(0.4, 0.3);
        assert!((cam.eye().length() - cam.distance).abs() < 1e-5);

        cam.translate(Movement::Forward, 100.0);
        assert!(cam.distance > 0.0);
    }

    #[test]
    fn test_model_maps_center_to_origin() {
        let mut cam = CameraState::default();
        cam.model_center = Vec3::new(0.0, 0.0, 25.0);
        cam.rotate_model(0.5, 0.25);
        let t = cam.recompute(viewport());
        let p = t.model().transform_point3(cam.model_center);
        assert!(p.length() < 1e-5);
    }

    #[test]
    fn test_scale_divides_coordinates() {
        let mut cam = CameraState::default();
        cam.theta = 0.0;
        cam.phi = 0.0;
        cam.scale = 10.0;
        let t = cam.recompute(viewport());
        let p = t.model().transform_point3(Vec3::new(10.0, 0.0, 0.0));
        assert!((p - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_zoom_ignores_degenerate_factors() {
        let mut cam = CameraState::default();
        cam.zoom(0.0);
        cam.zoom(f32::INFINITY);
        assert_eq!(cam.scale, 30.0);
        cam.zoom(2.0);
        assert_eq!(cam.scale, 60.0);
    }
}
