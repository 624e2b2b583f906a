//! Configuration types for edgelab.
//!
//! Values come from built-in defaults, an optional YAML file, and then CLI
//! flags / environment variables (see [`crate::cli::Args`]). The result is
//! validated once at startup and never changes afterwards.

mod listen;

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use listen::{ListenConfig, LogFormat, LoggingConfig, MetricsConfig};

use crate::engine::posture::Posture;
use crate::engine::EngineSettings;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fixed for the process lifetime
    #[serde(default)]
    pub posture: Posture,
    #[serde(default = "default_admin_token")]
    pub admin_token: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_user")]
    pub default_user: String,
    /// Directory holding `gallery.html` and `assets/`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_admin_token() -> String {
    "letmein".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_user() -> String {
    "guest".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
            posture: Posture::default(),
            admin_token: default_admin_token(),
            app_version: default_app_version(),
            default_user: default_user(),
            static_dir: default_static_dir(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self, anyhow::Error> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.admin_token.is_empty() {
            anyhow::bail!("'admin_token' must not be empty");
        }
        if self.default_user.trim().is_empty() {
            anyhow::bail!("'default_user' must not be blank");
        }
        if self.app_version.trim().is_empty() {
            anyhow::bail!("'app_version' must not be blank");
        }
        if self.metrics.enabled && self.metrics.port == self.listen.port {
            anyhow::bail!(
                "Metrics port {} collides with the listen port. \
                 Choose a different 'metrics.port' or disable metrics",
                self.metrics.port
            );
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            posture: self.posture,
            admin_token: self.admin_token.clone(),
            app_version: self.app_version.clone(),
            default_user: self.default_user.clone(),
        }
    }
}
