//! Mapping from keys and pointer motion to viewer actions.

use std::collections::HashMap;

use crate::camera::Movement;
use crate::input::{Input, KeyCode, MouseButton};

/// Model rotation directions (arrow keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelRotation {
    ThetaPlus,
    ThetaMinus,
    PhiPlus,
    PhiMinus,
}

impl ModelRotation {
    /// `(d_theta, d_phi)` unit step.
    pub fn delta(self) -> (f32, f32) {
        match self {
            ModelRotation::ThetaPlus => (1.0, 0.0),
            ModelRotation::ThetaMinus => (-1.0, 0.0),
            ModelRotation::PhiPlus => (0.0, 1.0),
            ModelRotation::PhiMinus => (0.0, -1.0),
        }
    }
}

/// Something the viewer can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    ScaleIn,
    ScaleOut,
    ResetFull,
    ResetSmall,
    TogglePause,
    SingleStep,
    SelectPreset(usize),
    Move(Movement),
    Rotate(ModelRotation),
    /// Pointer look, delta already scaled by the sensitivity.
    Look { dx: f32, dy: f32 },
    ToggleCameraStyle,
    Exit,
}

impl Action {
    /// Continuous actions fire every frame while their key is held;
    /// the rest fire once per key press.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            Action::ScaleIn | Action::ScaleOut | Action::Move(_) | Action::Rotate(_) | Action::Look { .. }
        )
    }
}

/// Key → action table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyCode, Action>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `key`, replacing any earlier binding for it.
    pub fn bind(&mut self, key: KeyCode, action: Action) -> &mut Self {
        self.bindings.insert(key, action);
        self
    }

    pub fn unbind(&mut self, key: KeyCode) {
        self.bindings.remove(&key);
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeyCode, Action)> + '_ {
        self.bindings.iter().map(|(k, a)| (*k, *a))
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut keys = Self::empty();
        keys.bind(KeyCode::Equal, Action::ScaleIn)
            .bind(KeyCode::Minus, Action::ScaleOut)
            .bind(KeyCode::R, Action::ResetFull)
            .bind(KeyCode::T, Action::ResetSmall)
            .bind(KeyCode::Space, Action::TogglePause)
            .bind(KeyCode::N, Action::SingleStep)
            .bind(KeyCode::Key1, Action::SelectPreset(0))
            .bind(KeyCode::Key2, Action::SelectPreset(1))
            .bind(KeyCode::Key3, Action::SelectPreset(2))
            .bind(KeyCode::Key4, Action::SelectPreset(3))
            .bind(KeyCode::Key5, Action::SelectPreset(4))
            .bind(KeyCode::Key6, Action::SelectPreset(5))
            .bind(KeyCode::Key7, Action::SelectPreset(6))
            .bind(KeyCode::Key8, Action::SelectPreset(7))
            .bind(KeyCode::Key9, Action::SelectPreset(8))
            .bind(KeyCode::W, Action::Move(Movement::Forward))
            .bind(KeyCode::S, Action::Move(Movement::Backward))
            .bind(KeyCode::A, Action::Move(Movement::Left))
            .bind(KeyCode::D, Action::Move(Movement::Right))
            .bind(KeyCode::E, Action::Move(Movement::Up))
            .bind(KeyCode::Q, Action::Move(Movement::Down))
            .bind(KeyCode::Right, Action::Rotate(ModelRotation::ThetaPlus))
            .bind(KeyCode::Left, Action::Rotate(ModelRotation::ThetaMinus))
            .bind(KeyCode::Up, Action::Rotate(ModelRotation::PhiPlus))
            .bind(KeyCode::Down, Action::Rotate(ModelRotation::PhiMinus))
            .bind(KeyCode::C, Action::ToggleCameraStyle)
            .bind(KeyCode::Escape, Action::Exit);
        keys
    }
}

/// Turns one frame of [`Input`] into a list of actions.
#[derive(Debug, Clone)]
pub struct Controller {
    pub bindings: KeyBindings,
    /// Radians per pixel of pointer motion.
    pub look_sensitivity: f32,
    /// Holding a look button is required before pointer motion turns the camera.
    pub look_button: MouseButton,
    /// World units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub rotate_speed: f32,
    /// Zoom rate: `ScaleOut` multiplies the scale divisor by this per second.
    pub scale_rate: f32,
    /// Holding shift multiplies movement by this.
    pub fast_multiplier: f32,
}

impl Default for Controller {
    fn default() -> Self {
        Self {
            bindings: KeyBindings::default(),
            look_sensitivity: 0.005,
            look_button: MouseButton::Left,
            move_speed: 1.5,
            rotate_speed: 1.2,
            scale_rate: 2.0,
            fast_multiplier: 4.0,
        }
    }
}

impl Controller {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Default::default()
        }
    }

    /// Actions for this frame, in a stable order: one-shot actions first,
    /// then held keys, then pointer look.
    pub fn actions(&self, input: &Input) -> Vec<Action> {
        let mut one_shot = Vec::new();
        let mut held = Vec::new();

        for (key, action) in self.bindings.iter() {
            if action.is_continuous() {
                if input.key_held(key) {
                    held.push(action);
                }
            } else if input.key_pressed(key) {
                one_shot.push(action);
            }
        }
        // HashMap order is arbitrary; keep the per-frame order reproducible.
        one_shot.sort_by_key(action_rank);
        held.sort_by_key(action_rank);

        let mut actions = one_shot;
        actions.extend(held);

        let delta = input.mouse_delta();
        if input.mouse_held(self.look_button) && delta != glam::Vec2::ZERO {
            actions.push(Action::Look {
                dx: delta.x * self.look_sensitivity,
                dy: delta.y * self.look_sensitivity,
            });
        }
        actions
    }

    /// Movement distance for a frame of `dt` seconds.
    pub fn move_step(&self, input: &Input, dt: f32) -> f32 {
        let boost = if input.key_held(KeyCode::Shift) {
            self.fast_multiplier
        } else {
            1.0
        };
        self.move_speed * boost * dt
    }

    pub fn rotate_step(&self, dt: f32) -> f32 {
        self.rotate_speed * dt
    }

    /// Factor applied to the scale divisor for a frame of `dt` seconds.
    /// Scaling in shrinks the divisor, so the cloud appears larger.
    pub fn scale_step(&self, action: Action, dt: f32) -> f32 {
        match action {
            Action::ScaleIn => self.scale_rate.powf(-dt),
            Action::ScaleOut => self.scale_rate.powf(dt),
            _ => 1.0,
        }
    }
}

fn action_rank(action: &Action) -> u32 {
    match action {
        Action::Exit => 0,
        Action::SelectPreset(i) => 100 + *i as u32,
        Action::ResetFull => 1,
        Action::ResetSmall => 2,
        Action::TogglePause => 3,
        Action::SingleStep => 4,
        Action::ToggleCameraStyle => 5,
        Action::ScaleIn => 6,
        Action::ScaleOut => 7,
        Action::Move(m) => 10 + *m as u32,
        Action::Rotate(r) => 20 + *r as u32,
        Action::Look { .. } => 30,
    }
}
