//! # Attractors
//!
//! Millions of independent particles advected through a chaotic vector
//! field (Lorenz, Rössler, Lu-Chen, or any quadratic field you register),
//! integrated on the GPU or across CPU cores and drawn as a point cloud
//! with a free or orbiting camera.
//!
//! ## Quick Start
//!
//! ```ignore
//! use attractors::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     attractors::run(
//!         EngineConfig::new()
//!             .with_particle_count(2_000_000)
//!             .with_preset("lorenz")
//!             .with_step(0.0015, 4),
//!     )
//! }
//! ```
//!
//! ## Frame pipeline
//!
//! Particle positions live in two equally-sized buffers. Each frame the
//! integrator reads the *front* buffer and writes the *back* one, then
//! the two labels swap (no data moves) and the renderer draws the new
//! front. See [`double_buffer`] for the protocol and [`engine`] for the
//! order of operations.
//!
//! ## Headless use
//!
//! The simulation does not need a window. [`Simulation`] with a
//! [`CpuIntegrator`] runs anywhere:
//!
//! ```ignore
//! let config = EngineConfig::new().with_particle_count(1000).with_seed(7);
//! let mut sim = Simulation::new(&config, CpuIntegrator::new(1000))?;
//! for _ in 0..100 {
//!     sim.step();
//! }
//! ```
//!
//! ## Controls
//!
//! | Key | Action |
//! |-----|--------|
//! | `=` / `-` | Scale in / out |
//! | `R` / `T` | Reset particles (full / small volume) |
//! | `Space` | Pause / resume |
//! | `N` | Single step |
//! | `1` .. `9` | Select preset (built-ins first, then custom presets) |
//! | `W` `A` `S` `D` `E` `Q` | Move camera |
//! | Arrow keys | Rotate model |
//! | Left drag | Look around |
//! | `C` | Toggle first-person / orbit camera |
//! | `Esc` | Quit |

mod app;
pub mod attractor;
pub mod camera;
pub mod config;
pub mod controls;
pub mod double_buffer;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod integrator;
pub mod logging;
pub mod particles;
pub mod render;
pub mod simulation;
pub mod time;

pub use app::run;
pub use attractor::{AttractorField, Axis, Monomial, Preset, PresetRegistry};
pub use camera::{CameraState, CameraStyle, Movement, ViewTransform, Viewport};
pub use config::{Backend, EngineConfig, PresetDef, Resolution};
pub use controls::{Action, Controller, KeyBindings, ModelRotation};
pub use double_buffer::{BufferRole, DoubleBuffer, Slot};
pub use engine::{Engine, Flow};
pub use error::{ConfigError, EngineError, ResourceError};
pub use glam::Vec3;
pub use integrator::{CpuIntegrator, IntegrationBackend, StepParams};
pub use particles::ParticleBuffer;
pub use render::{ColorPolicy, FrameSubmission, PointSource, RenderBackend};
pub use simulation::{RunMode, Simulation};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::attractor::{AttractorField, Axis, Monomial, Preset, PresetRegistry};
    pub use crate::camera::{CameraState, CameraStyle};
    pub use crate::config::{Backend, EngineConfig};
    pub use crate::error::{ConfigError, EngineError};
    pub use crate::integrator::{CpuIntegrator, IntegrationBackend};
    pub use crate::render::ColorPolicy;
    pub use crate::simulation::Simulation;
    pub use crate::Vec3;
}
