//! Persisted user settings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cv_ir::{Layout, SharpPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings that survive across sessions, stored as JSON.
///
/// Unknown fields are ignored and missing fields take defaults, so old
/// config files keep loading across upgrades.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: Layout,
    pub transpose: bool,
    pub sharp_policy: SharpPolicy,
    pub speed: f64,
    /// Last song opened, reloaded on startup when still present.
    pub last_song: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            transpose: false,
            sharp_policy: SharpPolicy::default(),
            speed: 1.0,
            last_song: None,
        }
    }
}

impl Config {
    /// Load from `path`. A missing file is not an error; it yields the
    /// defaults, so first launch needs no setup.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}
