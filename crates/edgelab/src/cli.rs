//! Command-line flags and their environment-variable fallbacks.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, LogFormat};
use crate::engine::posture::Posture;

#[derive(Parser, Debug, Default)]
#[command(name = "edgelab", version, about = "Deterministic HTTP behavior simulator")]
pub struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "EDGELAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "EDGELAB_HOST")]
    pub host: Option<IpAddr>,

    /// Port for the simulated surface
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Port for the Prometheus metrics listener
    #[arg(long, env = "EDGELAB_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Disable the metrics listener
    #[arg(long, env = "EDGELAB_METRICS_DISABLED")]
    pub no_metrics: bool,

    /// vulnerable or safe
    #[arg(long, env = "POSTURE")]
    pub posture: Option<Posture>,

    /// Secret required by /admin in safe posture
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Version reported by /version and /page
    #[arg(long, env = "APP_VERSION")]
    pub app_version: Option<String>,

    /// Identity used when no header or cookie names one
    #[arg(long, env = "DEFAULT_USER")]
    pub default_user: Option<String>,

    /// Directory holding gallery.html and assets/
    #[arg(long, env = "EDGELAB_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Default log filter (RUST_LOG wins when set)
    #[arg(long, env = "EDGELAB_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[arg(long, env = "EDGELAB_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Args {
    /// Load the config file (if any), then layer flags and env on top.
    pub fn resolve_config(&self) -> Result<Config, anyhow::Error> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(host) = self.host {
            config.listen.host = host;
        }
        if let Some(port) = self.port {
            config.listen.port = port;
        }
        if let Some(port) = self.metrics_port {
            config.metrics.port = port;
        }
        if self.no_metrics {
            config.metrics.enabled = false;
        }
        if let Some(posture) = self.posture {
            config.posture = posture;
        }
        if let Some(token) = &self.admin_token {
            config.admin_token = token.clone();
        }
        if let Some(version) = &self.app_version {
            config.app_version = version.clone();
        }
        if let Some(user) = &self.default_user {
            config.default_user = user.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.static_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}
