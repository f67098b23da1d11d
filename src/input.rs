//! Keyboard and pointer state collected from window events.
//!
//! [`Input`] tracks both instantaneous events (key went down this frame)
//! and continuous state (key held). The event loop feeds it winit events,
//! the [`Controller`](crate::controls::Controller) reads it once per frame,
//! and `begin_frame` clears the per-frame part afterwards.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Left,
        }
    }
}

/// Keys the viewer can bind. Anything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    A, C, D, E, N, P, Q, R, S, T, W,
    Key1, Key2, Key3, Key4, Key5, Key6, Key7, Key8, Key9,
    Up, Down, Left, Right,
    Space, Escape, Equal, Minus, Shift,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        use WinitKeyCode as K;
        match key {
            K::KeyA => Self::A,
            K::KeyC => Self::C,
            K::KeyD => Self::D,
            K::KeyE => Self::E,
            K::KeyN => Self::N,
            K::KeyP => Self::P,
            K::KeyQ => Self::Q,
            K::KeyR => Self::R,
            K::KeyS => Self::S,
            K::KeyT => Self::T,
            K::KeyW => Self::W,

            K::Digit1 | K::Numpad1 => Self::Key1,
            K::Digit2 | K::Numpad2 => Self::Key2,
            K::Digit3 | K::Numpad3 => Self::Key3,
            K::Digit4 | K::Numpad4 => Self::Key4,
            K::Digit5 | K::Numpad5 => Self::Key5,
            K::Digit6 | K::Numpad6 => Self::Key6,
            K::Digit7 | K::Numpad7 => Self::Key7,
            K::Digit8 | K::Numpad8 => Self::Key8,
            K::Digit9 | K::Numpad9 => Self::Key9,

            K::ArrowUp => Self::Up,
            K::ArrowDown => Self::Down,
            K::ArrowLeft => Self::Left,
            K::ArrowRight => Self::Right,

            K::Space => Self::Space,
            K::Escape => Self::Escape,
            K::Equal | K::NumpadAdd => Self::Equal,
            K::Minus | K::NumpadSubtract => Self::Minus,
            K::ShiftLeft | K::ShiftRight => Self::Shift,

            other => Self::Other(other as u32),
        }
    }
}

/// Input state tracking for keyboard and mouse.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    mouse_held: HashSet<MouseButton>,

    mouse_position: Option<Vec2>,
    /// Pointer motion accumulated since `begin_frame`.
    mouse_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down this frame (auto-repeat excluded).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Last pointer position in window pixels, if the pointer has moved yet.
    pub fn mouse_position(&self) -> Option<Vec2> {
        self.mouse_position
    }

    /// Pointer movement in pixels since the start of the frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    pub fn press_key(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    pub fn press_mouse(&mut self, button: MouseButton) {
        self.mouse_held.insert(button);
    }

    pub fn release_mouse(&mut self, button: MouseButton) {
        self.mouse_held.remove(&button);
    }

    /// Record a new pointer position. The first sample produces no delta.
    pub fn move_mouse(&mut self, position: Vec2) {
        if let Some(last) = self.mouse_position {
            self.mouse_delta += position - last;
        }
        self.mouse_position = Some(position);
    }

    /// Clear per-frame state. Held keys and buttons persist.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Drop everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys_held.clear();
        self.mouse_held.clear();
        self.begin_frame();
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    let key = KeyCode::from(keycode);
                    match event.state {
                        ElementState::Pressed => self.press_key(key),
                        ElementState::Released => self.release_key(key),
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let btn = MouseButton::from(*button);
                match state {
                    ElementState::Pressed => self.press_mouse(btn),
                    ElementState::Released => self.release_mouse(btn),
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.move_mouse(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
            }

            WindowEvent::Focused(false) => self.clear(),

            _ => {}
        }
    }
}
