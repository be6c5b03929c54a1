//! Configuration management for enterprise and midway.
//!
//! Supports layered configuration: defaults → project → user → explicit file → env

use crate::error::ConfigError;
use crate::protocol::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project-local configuration file name
pub const PROJECT_CONFIG_FILE: &str = ".enterprise.toml";

/// Highest simulation rate Midway will run at
pub const MAX_TPS: u32 = 1000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Settings {
    /// Load configuration with hierarchy: defaults → project → user → file → env
    pub fn load(project_root: Option<&Path>, file: Option<&Path>) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();

        // 1. Start with defaults
        builder = builder.add_source(
            config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            )
            .required(false),
        );

        // 2. Project-specific config (.enterprise.toml in the working directory)
        if let Some(root) = project_root {
            let project_config = root.join(PROJECT_CONFIG_FILE);
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        // 3. User config (~/.config/enterprise/config.toml)
        if let Some(config_dir) = directories::ProjectDirs::from("com", "enterprise", "enterprise")
        {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        // 4. Explicitly requested file
        if let Some(path) = file {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // 5. Environment variables (ENTERPRISE__*)
        builder = builder.add_source(
            Environment::with_prefix("ENTERPRISE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let settings: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.tps == 0 || self.server.tps > MAX_TPS {
            return Err(ConfigError::Invalid(format!(
                "server.tps must be between 1 and {MAX_TPS}"
            )));
        }
        if !(self.server.radius.is_finite() && self.server.radius > 0.0) {
            return Err(ConfigError::Invalid(
                "server.radius must be a positive number".to_string(),
            ));
        }
        if !(self.server.spawn_radius.is_finite() && self.server.spawn_radius >= 0.0) {
            return Err(ConfigError::Invalid(
                "server.spawn_radius must not be negative".to_string(),
            ));
        }
        if self.ui.refresh_rate_ms == 0 {
            return Err(ConfigError::Invalid(
                "ui.refresh_rate_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Defaults for the connect menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Ship name offered in the connect menu
    #[serde(default)]
    pub name: String,
    /// Midway host
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Midway server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Simulation ticks per second
    #[serde(default = "default_tps")]
    pub tps: u32,
    /// Arena radius in metres
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Ships spawn within this distance of the arena centre
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: f32,
    /// How long a new connection may take to name its ship
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    /// Start automatically once this many ships have joined
    #[serde(default)]
    pub min_players: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            tps: default_tps(),
            radius: default_radius(),
            spawn_radius: default_spawn_radius(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            min_players: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_tps() -> u32 {
    60
}

fn default_radius() -> f32 {
    20_000.0
}

fn default_spawn_radius() -> f32 {
    2_000.0
}

fn default_handshake_timeout_ms() -> u64 {
    10_000
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// UI refresh rate in milliseconds
    #[serde(default = "default_refresh_rate_ms")]
    pub refresh_rate_ms: u64,
    /// Initial chart zoom level
    #[serde(default)]
    pub zoom: i32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate_ms(),
            zoom: 0,
        }
    }
}

fn default_refresh_rate_ms() -> u64 {
    16
}
