//! Error types for the attractor engine.
//!
//! Setup is fail-fast: a [`ConfigError`] or [`ResourceError`] aborts
//! initialization and is reported from [`crate::run`]. Nothing in the
//! steady-state frame loop produces these errors. Numeric divergence of
//! particle positions is not an error at all.

use std::fmt;

/// Invalid startup parameters or an invalid runtime selection.
#[derive(Debug)]
pub enum ConfigError {
    /// No preset with this name (or index) is registered.
    UnknownPreset(String),
    /// A preset with this name is already registered.
    DuplicatePreset(String),
    /// Particle count must be at least one.
    InvalidParticleCount(usize),
    /// Viewport dimensions must both be non-zero.
    InvalidViewport { width: u32, height: u32 },
    /// Step size must be finite and non-negative.
    InvalidStepSize(f32),
    /// At least one sub-step per frame is required.
    InvalidSubSteps(u32),
    /// Scale factor must be finite and positive.
    InvalidScale(f32),
    /// Reset volume must be finite and positive.
    InvalidVolume(f32),
    /// The integration backend holds a different number of particles.
    ParticleCountMismatch { expected: usize, actual: usize },
    /// Failed to parse a JSON configuration.
    Parse(serde_json::Error),
    /// Failed to read a configuration file.
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownPreset(name) => write!(f, "Unknown attractor preset '{}'", name),
            ConfigError::DuplicatePreset(name) => {
                write!(f, "An attractor preset named '{}' is already registered", name)
            }
            ConfigError::InvalidParticleCount(n) => {
                write!(f, "Particle count must be greater than zero (got {})", n)
            }
            ConfigError::InvalidViewport { width, height } => {
                write!(f, "Viewport must have non-zero dimensions (got {}x{})", width, height)
            }
            ConfigError::InvalidStepSize(s) => {
                write!(f, "Step size must be finite and non-negative (got {})", s)
            }
            ConfigError::InvalidSubSteps(n) => {
                write!(f, "Sub-steps per frame must be at least 1 (got {})", n)
            }
            ConfigError::InvalidScale(s) => {
                write!(f, "Scale factor must be finite and positive (got {})", s)
            }
            ConfigError::InvalidVolume(v) => {
                write!(f, "Reset volume must be finite and positive (got {})", v)
            }
            ConfigError::ParticleCountMismatch { expected, actual } => write!(
                f,
                "Integration backend holds {} particles but {} were configured",
                actual, expected
            ),
            ConfigError::Parse(e) => write!(f, "Failed to parse configuration: {}", e),
            ConfigError::Io(e) => write!(f, "Failed to read configuration file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Failure to acquire a window, graphics device or buffer.
#[derive(Debug)]
pub enum ResourceError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create the GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// A particle buffer exceeds what the device can bind.
    BufferTooLarge { requested: u64, limit: u64 },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ResourceError::Window(e) => write!(f, "Failed to create window: {}", e),
            ResourceError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            ResourceError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with Vulkan/Metal/DX12 support."
            ),
            ResourceError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            ResourceError::BufferTooLarge { requested, limit } => write!(
                f,
                "Particle buffer of {} bytes exceeds the device limit of {} bytes; lower the particle count",
                requested, limit
            ),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::EventLoop(e) => Some(e),
            ResourceError::Window(e) => Some(e),
            ResourceError::SurfaceCreation(e) => Some(e),
            ResourceError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<winit::error::EventLoopError> for ResourceError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ResourceError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ResourceError {
    fn from(e: winit::error::OsError) -> Self {
        ResourceError::Window(e)
    }
}

impl From<wgpu::CreateSurfaceError> for ResourceError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        ResourceError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for ResourceError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        ResourceError::DeviceCreation(e)
    }
}

/// Top-level error returned by [`crate::run`].
#[derive(Debug)]
pub enum EngineError {
    /// Startup parameters were rejected.
    Config(ConfigError),
    /// A platform or GPU resource could not be acquired.
    Resource(ResourceError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "Configuration error: {}", e),
            EngineError::Resource(e) => write!(f, "Resource error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            EngineError::Resource(e) => Some(e),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}

impl From<ResourceError> for EngineError {
    fn from(e: ResourceError) -> Self {
        EngineError::Resource(e)
    }
}

impl From<winit::error::EventLoopError> for EngineError {
    fn from(e: winit::error::EventLoopError) -> Self {
        EngineError::Resource(ResourceError::EventLoop(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_preset_message_names_preset() {
        let err = ConfigError::UnknownPreset("henon".into());
        assert!(err.to_string().contains("henon"));
    }

    #[test]
    fn test_engine_error_wraps_source() {
        let err: EngineError = ConfigError::InvalidParticleCount(0).into();
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source, Some(ConfigError::InvalidParticleCount(0).to_string()));
    }
}
