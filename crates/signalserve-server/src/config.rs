//! Server configuration
//!
//! Sources, lowest precedence first: built-in defaults, the YAML config file,
//! `SIGNALSERVE__*` environment variables, then CLI flags (the port flag also
//! reads `PORT`).

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SIGNALSERVE";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub listen: String,

    /// Listen port
    pub port: u16,

    /// Model descriptor file
    pub descriptor_path: PathBuf,

    /// Model artifact file
    pub model_path: PathBuf,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Cross-origin settings
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from file, environment and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        Self::load_with_env(config_path, cli, None)
    }

    /// Like [`ServerConfig::load`], reading `SIGNALSERVE__*` overrides from
    /// `env` instead of the process environment when it is given
    pub fn load_with_env(
        config_path: &str,
        cli: &Cli,
        env: Option<HashMap<String, String>>,
    ) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.apply_cli(cli);
        Ok(config)
    }

    /// Apply CLI overrides
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            self.port = port;
        }

        if let Some(descriptor) = &cli.descriptor {
            self.descriptor_path = descriptor.clone();
        }

        if let Some(model) = &cli.model {
            self.model_path = model.clone();
        }
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0".to_string(),
            port: 5000,
            descriptor_path: PathBuf::from("model_info.json"),
            model_path: PathBuf::from("modelo_trading.json"),
            max_body_bytes: 64 * 1024,
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Accept requests from any origin
    pub allow_any_origin: bool,

    /// Origins accepted when `allow_any_origin` is false
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
            allowed_origins: Vec::new(),
        }
    }
}
