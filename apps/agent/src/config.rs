use std::time::Duration;
use std::{env, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(std::io::Error),
    #[error("failed to write config file: {0}")]
    Write(std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no config path available (set XDG_CONFIG_HOME or HOME)")]
    PathUnavailable,
}

/// Agent configuration: shared init options plus one entry per monitored
/// target.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub init_config: InitConfig,

    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitConfig {
    /// Fallback per-request timeout for instances that declare none.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout: f64,
}

fn default_timeout_secs() -> f64 {
    checkup::DEFAULT_TIMEOUT_SECS
}

impl Default for InitConfig {
    fn default() -> Self {
        Self { default_timeout: default_timeout_secs() }
    }
}

/// One monitored target.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Base URL of the target; instances without one are skipped.
    pub url: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Per-request timeout in seconds, overriding `default_timeout`.
    pub timeout: Option<f64>,
}

impl Instance {
    pub fn timeout(&self, default_timeout: f64) -> Duration {
        Duration::from_secs_f64(self.timeout.unwrap_or(default_timeout))
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/checkup/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::PathUnavailable);
    };

    Ok(path.join("checkup/config.toml"))
}

impl AgentConfig {
    /// Load the configuration from the given path, or the default path
    /// when none is given. A default config is written when the file does
    /// not exist yet.
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }

        fs::write(path, config_str).map_err(ConfigError::Write)
    }
}

/// Check that a configured base URL is something the transport can poll.
pub fn validate_base_url(target: &str) -> Result<(), String> {
    match Url::parse(target) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(parsed) => Err(format!("unsupported scheme '{}'", parsed.scheme())),
        Err(error) => Err(format!("invalid url: {error}")),
    }
}
