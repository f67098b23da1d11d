//! The per-frame pipeline.
//!
//! One iteration of the event loop calls, in order:
//!
//! 1. [`Engine::handle_input`]: actions mutate the camera, the active
//!    preset, the run mode, or request a reset;
//! 2. [`Engine::frame`]: the integrator reads the front buffer and writes
//!    the back one, the labels swap, the view transform is recomputed if
//!    the camera or viewport changed, and the renderer draws the new front.
//!
//! Camera and field are only mutated in step 1, so the renderer never
//! observes a half-applied change.

use crate::camera::{CameraState, ViewTransform, Viewport};
use crate::config::EngineConfig;
use crate::controls::{Action, Controller};
use crate::error::ConfigError;
use crate::input::Input;
use crate::integrator::IntegrationBackend;
use crate::render::{ColorPolicy, FrameSubmission, RenderBackend};
use crate::simulation::Simulation;

/// Whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Engine<B: IntegrationBackend, R: RenderBackend> {
    sim: Simulation<B>,
    renderer: R,
    camera: CameraState,
    controller: Controller,
    viewport: Viewport,
    color: ColorPolicy,
    transform: ViewTransform,
    /// Camera and viewport `transform` was computed from.
    transform_source: (CameraState, Viewport),
}

impl<B: IntegrationBackend, R: RenderBackend> Engine<B, R> {
    pub fn new(config: &EngineConfig, backend: B, renderer: R) -> Result<Self, ConfigError> {
        let sim = Simulation::new(config, backend)?;
        let viewport = config.viewport()?;

        let mut camera = config.camera();
        camera.model_center = sim.active_preset().center();
        let transform = camera.recompute(viewport);

        Ok(Self {
            sim,
            renderer,
            transform_source: (camera.clone(), viewport),
            camera,
            controller: Controller::default(),
            viewport,
            color: config.color,
            transform,
        })
    }

    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    /// Apply this frame's input. `dt` scales held-key actions.
    pub fn handle_input(&mut self, input: &Input, dt: f32) -> Flow {
        let mut flow = Flow::Continue;
        for action in self.controller.actions(input) {
            if self.apply(action, input, dt) == Flow::Exit {
                flow = Flow::Exit;
            }
        }
        flow
    }

    /// Apply a single action.
    pub fn apply(&mut self, action: Action, input: &Input, dt: f32) -> Flow {
        match action {
            Action::ScaleIn | Action::ScaleOut => {
                self.camera.zoom(self.controller.scale_step(action, dt));
            }
            Action::ResetFull => {
                if let Err(e) = self.sim.reset_full() {
                    log::error!("Reset failed: {}", e);
                }
            }
            Action::ResetSmall => {
                if let Err(e) = self.sim.reset_small() {
                    log::error!("Reset failed: {}", e);
                }
            }
            Action::TogglePause => self.sim.toggle_pause(),
            Action::SingleStep => self.sim.request_single_step(),
            Action::SelectPreset(index) => self.select_preset_index(index),
            Action::Move(movement) => {
                let amount = self.controller.move_step(input, dt);
                self.camera.translate(movement, amount);
            }
            Action::Rotate(rotation) => {
                let (d_theta, d_phi) = rotation.delta();
                let step = self.controller.rotate_step(dt);
                self.camera.rotate_model(d_theta * step, d_phi * step);
            }
            Action::Look { dx, dy } => self.camera.look(dx, dy),
            Action::ToggleCameraStyle => {
                self.camera.toggle_style();
                log::info!("Camera style: {:?}", self.camera.style);
            }
            Action::Exit => return Flow::Exit,
        }
        Flow::Continue
    }

    fn select_preset_index(&mut self, index: usize) {
        match self.sim.select_preset_index(index) {
            Ok(preset) => self.camera.model_center = preset.center(),
            Err(e) => log::warn!("{}", e),
        }
    }

    /// Select a preset by name and recentre the model on it.
    pub fn select_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        let center = self.sim.select_preset(name)?.center();
        self.camera.model_center = center;
        Ok(())
    }

    /// Integrate, swap, and draw the new front buffer.
    pub fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.sim.step();
        self.refresh_transform();

        let frame = FrameSubmission {
            points: self.sim.front_points(),
            point_count: self.sim.particle_count() as u32,
            transform: &self.transform,
            field: self.sim.field(),
            color: &self.color,
        };
        self.renderer.submit_frame(&frame)
    }

    /// Recompute the view transform if its inputs changed since last time.
    pub fn refresh_transform(&mut self) -> &ViewTransform {
        if self.transform_source.0 != self.camera || self.transform_source.1 != self.viewport {
            self.transform = self.camera.recompute(self.viewport);
            self.transform_source = (self.camera.clone(), self.viewport);
        }
        &self.transform
    }

    /// Zero-sized resizes (minimised window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        match Viewport::new(width, height) {
            Ok(viewport) => {
                self.viewport = viewport;
                self.renderer.resize(width, height);
            }
            Err(_) => log::debug!("Ignoring resize to {}x{}", width, height),
        }
    }

    /// Block until in-flight integration has completed.
    pub fn finish(&self) {
        self.sim.backend().finish();
    }

    /// Window title text.
    pub fn status_line(&self, fps: f32) -> String {
        format!(
            "Attractors | {} | {} particles | {:.0} fps{}",
            self.sim.active_preset().name,
            self.sim.particle_count(),
            fps,
            if self.sim.is_paused() { " | paused" } else { "" }
        )
    }

    pub fn simulation(&self) -> &Simulation<B> {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation<B> {
        &mut self.sim
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraState {
        &mut self.camera
    }

    /// Transform used by the most recent frame.
    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
