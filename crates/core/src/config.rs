//! Application configuration
//!
//! Loaded from `config.toml` in the platform data directory. Every field
//! is optional; a missing file yields the defaults.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::models::{validate_color, DEFAULT_COLOR, DEFAULT_ICON};

pub const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "pocketbook.db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file backing the local backend (relative paths resolve
    /// against the config file's directory)
    pub database_path: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Accent color for new workspaces that don't pick one
    pub default_color: String,
    /// Icon tag for new workspaces that don't pick one
    pub default_icon: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DATABASE_FILE),
            log_filter: "info".to_string(),
            default_color: DEFAULT_COLOR.to_string(),
            default_icon: DEFAULT_ICON.to_string(),
        }
    }
}

impl Config {
    /// Parse and validate TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()
    }

    /// Load from a file; a missing file yields defaults rooted next to it
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };

        if config.database_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.database_path = dir.join(&config.database_path);
            }
        }
        Ok(config)
    }

    /// Load from the platform data directory
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::data_dir()?.join(CONFIG_FILE))
    }

    /// Platform data directory for Pocketbook
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "pocketbook", "pocketbook").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;

        Ok(dirs.data_dir().to_path_buf())
    }

    fn validate(mut self) -> Result<Self> {
        self.default_color = validate_color(&self.default_color).map_err(|e| match e {
            Error::Validation(msg) => Error::Validation(format!("default_color: {}", msg)),
            other => other,
        })?;
        if self.default_icon.trim().is_empty() {
            return Err(Error::Validation("default_icon must not be empty".into()));
        }
        Ok(self)
    }
}
