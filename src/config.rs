//! Configuration management for the media browser
//!
//! Everything here is startup configuration: a change requires a restart, and
//! the root directory it names is fixed for the lifetime of the process.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the control connection
    pub bind_address: String,

    /// Port for the control connection
    pub port: u16,

    /// Maximum concurrent sessions
    pub max_clients: usize,

    /// Directory the root spec is resolved against
    pub base_dir: String,

    /// Root directory spec, relative to `base_dir`
    pub root_dir: String,

    /// Staging directory for incoming upload bytes
    #[serde(default)]
    pub upload_tmp_dir: Option<String>,

    /// Maximum upload size in MB
    pub max_upload_size_mb: u64,

    /// Maximum command line length in bytes
    pub max_command_length: usize,
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_paths = ["media-browser/config", "config"];

        let mut last_error = None;

        for config_path in &config_paths {
            match Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(Environment::with_prefix("MEDIA_BROWSER"))
                .build()
            {
                Ok(settings) => {
                    let config: ServerConfig = settings.try_deserialize()?;
                    config.validate()?;
                    return Ok(config);
                }
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            config::ConfigError::Message(format!(
                "Failed to load config.toml from any location. Tried: {config_paths:?}"
            ))
        }))
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.root_dir.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "root_dir cannot be empty".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_upload_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get base directory as PathBuf
    pub fn base_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.base_dir)
    }

    /// Staging directory for uploads, falling back to the OS temp dir
    pub fn upload_tmp_path(&self) -> PathBuf {
        self.upload_tmp_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}
