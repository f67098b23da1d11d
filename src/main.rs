use std::path::PathBuf;
use std::process::ExitCode;

use attractors::logging::{init_logging, LoggingConfig};
use attractors::{Backend, CameraStyle, EngineConfig, EngineError};
use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    Gpu,
    Cpu,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Gpu => Backend::Gpu,
            BackendArg::Cpu => Backend::Cpu,
        }
    }
}

/// Real-time particle viewer for chaotic attractors.
#[derive(Parser, Debug)]
#[command(name = "attractors")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of particles
    #[arg(short = 'n', long)]
    particles: Option<usize>,

    /// Initial preset (lorenz, rossler, lu-chen, or a custom name)
    #[arg(short, long)]
    preset: Option<String>,

    /// Where integration runs
    #[arg(short, long, value_enum)]
    backend: Option<BackendArg>,

    /// RNG seed for particle resets
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Euler step size
    #[arg(long)]
    step_size: Option<f32>,

    /// Euler steps per displayed frame
    #[arg(long)]
    sub_steps: Option<u32>,

    /// Divisor applied to particle coordinates before projection
    #[arg(long)]
    scale: Option<f32>,

    /// Start with the orbit camera instead of first person
    #[arg(long)]
    orbit: bool,

    /// Disable vsync
    #[arg(long)]
    no_vsync: bool,

    /// Print the available presets and exit
    #[arg(long)]
    list_presets: bool,

    /// Log filter, e.g. "debug" or "attractors=trace"
    #[arg(long)]
    log: Option<String>,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig, EngineError> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };

        if let Some(n) = self.particles {
            config.particle_count = n;
        }
        if let Some(preset) = &self.preset {
            config.preset = preset.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend.into();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(width) = self.width {
            config.resolution.width = width;
        }
        if let Some(height) = self.height {
            config.resolution.height = height;
        }
        if let Some(step_size) = self.step_size {
            config.step_size = step_size;
        }
        if let Some(sub_steps) = self.sub_steps {
            config.sub_steps_per_frame = sub_steps;
        }
        if let Some(scale) = self.scale {
            config.scale_factor = scale;
        }
        if self.orbit {
            config.camera_style = CameraStyle::Orbit;
        }
        if self.no_vsync {
            config.vsync = false;
        }
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<(), EngineError> {
    let config = cli.engine_config()?;

    if cli.list_presets {
        for (i, preset) in config.preset_registry()?.iter().enumerate() {
            println!("{}  {}", i + 1, preset.name);
        }
        return Ok(());
    }

    attractors::run(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default();
    if let Some(filter) = &cli.log {
        logging = logging.with_filter(filter.clone());
    }
    init_logging(logging);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "attractors",
            "-n",
            "2000",
            "--preset",
            "rossler",
            "--backend",
            "cpu",
            "--orbit",
        ]);
        let config = cli.engine_config().unwrap();
        assert_eq!(config.particle_count, 2000);
        assert_eq!(config.preset, "rossler");
        assert_eq!(config.backend, Backend::Cpu);
        assert_eq!(config.camera_style, CameraStyle::Orbit);
        assert!(config.vsync);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "particle_count": 10, "preset": "lu-chen", "step_size": 0.01 }}"#).unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::parse_from(["attractors", "--config", path, "--particles", "20"]);
        let config = cli.engine_config().unwrap();
        assert_eq!(config.particle_count, 20);
        assert_eq!(config.preset, "lu-chen");
        assert_eq!(config.step_size, 0.01);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["attractors", "--config", "/nonexistent/attractors.json"]);
        assert!(matches!(cli.engine_config(), Err(EngineError::Config(_))));
    }
}
