//! Configuration loading
//!
//! TOML configuration resolved with the usual priority order:
//! 1. Explicit path (command-line argument)
//! 2. `MURMUR_AUDIO_CONFIG` environment variable
//! 3. Per-user config directory default
//!
//! A missing file at the default location falls back to defaults; a file
//! that exists but does not parse is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "MURMUR_AUDIO_CONFIG";

/// Audio orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Backend preferred whenever it supports the requested scheme.
    /// A name matching no registered backend leaves the default unset.
    pub default_backend: Option<String>,

    /// Debounce window in milliseconds before a volume restore is issued.
    pub duck_grace_ms: u64,

    /// Notification broadcast channel capacity.
    pub event_bus_capacity: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            default_backend: None,
            duck_grace_ms: 2000,
            event_bus_capacity: 100,
        }
    }
}

impl AudioConfig {
    /// Resolve and load the configuration.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// The duck grace interval as a `Duration`.
    pub fn duck_grace(&self) -> Duration {
        Duration::from_millis(self.duck_grace_ms)
    }
}

/// `<config dir>/murmur/audio.toml`
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("murmur").join("audio.toml"))
}
