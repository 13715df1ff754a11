use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// `~/.sandpilot/config.toml`, if a home directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|u| u.home_dir().join(".sandpilot").join("config.toml"))
}

impl Config {
    /// Load defaults, then the config file, then `.env` and the environment.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::load_from_path(&default)?,
                _ => Self::default(),
            },
        };

        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!(path = %env_file.display(), "loaded .env file");
        }
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(e.message().to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}
