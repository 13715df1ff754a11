use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

fn default_model() -> String {
    "gemini-2.0-flash-001".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_workspace_dir() -> String {
    ".".to_string()
}

fn default_max_iterations() -> usize {
    20
}

fn default_max_read_chars() -> usize {
    10_000
}

fn default_script_timeout_secs() -> u64 {
    30
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_script_extension() -> String {
    "py".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,
    /// Usually supplied through `GEMINI_API_KEY` rather than the file.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Sandbox root as written by the user; see [`Config::resolve_workspace`].
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            api_base_url: default_api_base_url(),
            workspace_dir: default_workspace_dir(),
            max_iterations: default_max_iterations(),
            temperature: 0.0,
            system_prompt: None,
            log_level: None,
            tools: ToolsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_max_read_chars")]
    pub max_read_chars: usize,
    #[serde(default = "default_script_timeout_secs")]
    pub script_timeout_secs: u64,
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Accepted script suffix, without the leading dot.
    #[serde(default = "default_script_extension")]
    pub script_extension: String,
    #[serde(default = "default_true")]
    pub reject_symlink_escapes: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            max_read_chars: default_max_read_chars(),
            script_timeout_secs: default_script_timeout_secs(),
            interpreter: default_interpreter(),
            script_extension: default_script_extension(),
            reject_symlink_escapes: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("model must not be empty".into()));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.tools.max_read_chars == 0 {
            return Err(ConfigError::Validation(
                "tools.max_read_chars must be at least 1".into(),
            ));
        }
        if self.tools.script_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "tools.script_timeout_secs must be at least 1".into(),
            ));
        }
        if self.tools.interpreter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tools.interpreter must not be empty".into(),
            ));
        }
        if self.tools.script_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Validation(
                "tools.script_extension must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The model credential. Its absence is a startup fault.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                var: API_KEY_ENV.to_string(),
            })
    }

    /// Expand `~` and canonicalize the workspace once, at startup.
    pub fn resolve_workspace(&self) -> Result<PathBuf, ConfigError> {
        let expanded = shellexpand::tilde(&self.workspace_dir);
        let workspace = std::fs::canonicalize(&*expanded).map_err(|_| {
            ConfigError::Workspace {
                path: self.workspace_dir.clone(),
            }
        })?;
        if !workspace.is_dir() {
            return Err(ConfigError::Workspace {
                path: self.workspace_dir.clone(),
            });
        }
        Ok(workspace)
    }
}
