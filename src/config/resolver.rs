//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`ROSTER_DATA_DIR`, `ROSTER_BACKEND`)
//! 3. config.kdl
//! 4. Built-in defaults

use crate::config::{OutputFormat, RosterConfig};
use crate::storage::{BackendType, DATA_DIR_ENV, default_data_dir};
use crate::store::CascadePolicy;
use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "ROSTER_CONFIG";

/// Environment variable overriding the storage backend.
pub const BACKEND_ENV: &str = "ROSTER_BACKEND";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    ConfigFile,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub output_format: Resolved<OutputFormat>,
    pub data_dir: Resolved<PathBuf>,
    pub backend: Resolved<BackendType>,
    pub cascade: Resolved<CascadePolicy>,
}

impl ResolvedConfig {
    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir.value
    }

    pub fn backend(&self) -> BackendType {
        self.backend.value
    }

    pub fn cascade(&self) -> CascadePolicy {
        self.cascade.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_format: Option<OutputFormat>,
    pub data_dir: Option<PathBuf>,
    pub backend: Option<BackendType>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_backend(mut self, backend: BackendType) -> Self {
        self.backend = Some(backend);
        self
    }
}

/// Location of config.kdl: `ROSTER_CONFIG` if set, else `<XDG config dir>/roster/config.kdl`.
pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let config_dir = dirs::config_dir()
        .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("roster").join("config.kdl"))
}

/// Resolve configuration against the process environment.
pub fn resolve_config(file: &RosterConfig, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    resolve_config_with_env(file, overrides, |name| std::env::var(name).ok())
}

/// Resolve configuration with an explicit environment lookup.
pub fn resolve_config_with_env<F>(file: &RosterConfig, overrides: &ConfigOverrides, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| env(name).filter(|v| !v.is_empty());

    let output_format = if let Some(format) = overrides.output_format {
        Resolved::new(format, ValueSource::CliFlag)
    } else if let Some(format) = file.output_format {
        Resolved::new(format, ValueSource::ConfigFile)
    } else {
        Resolved::new(OutputFormat::default(), ValueSource::Default)
    };

    let data_dir = if let Some(ref dir) = overrides.data_dir {
        Resolved::new(dir.clone(), ValueSource::CliFlag)
    } else if let Some(dir) = lookup(DATA_DIR_ENV) {
        Resolved::new(PathBuf::from(dir), ValueSource::EnvVar(DATA_DIR_ENV.to_string()))
    } else if let Some(ref dir) = file.data_dir {
        Resolved::new(dir.clone(), ValueSource::ConfigFile)
    } else {
        Resolved::new(default_data_dir()?, ValueSource::Default)
    };

    let backend = if let Some(backend) = overrides.backend {
        Resolved::new(backend, ValueSource::CliFlag)
    } else if let Some(raw) = lookup(BACKEND_ENV) {
        let backend = BackendType::parse(&raw)
            .ok_or_else(|| Error::Config(format!("{} must be 'file' or 'memory', got {}", BACKEND_ENV, raw)))?;
        Resolved::new(backend, ValueSource::EnvVar(BACKEND_ENV.to_string()))
    } else if let Some(backend) = file.backend() {
        Resolved::new(backend, ValueSource::ConfigFile)
    } else {
        Resolved::new(BackendType::default(), ValueSource::Default)
    };

    let cascade = match file.cascade_membership {
        Some(prune) => Resolved::new(CascadePolicy::from_flag(prune), ValueSource::ConfigFile),
        None => Resolved::new(CascadePolicy::default(), ValueSource::Default),
    };

    Ok(ResolvedConfig {
        output_format,
        data_dir,
        backend,
        cascade,
    })
}
