//! Configuration loader

use std::path::Path;

use genonav_utils::{config_file, GenonavError, Result};

use super::AppConfig;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from default location
    pub fn load() -> Result<AppConfig> {
        let path = config_file();
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            Ok(AppConfig::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| GenonavError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration from string
    pub fn parse(content: &str, path: &Path) -> Result<AppConfig> {
        toml::from_str(content).map_err(|e| GenonavError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Validate configuration
    pub fn validate(config: &AppConfig) -> Result<()> {
        if config.server.listen_addr.trim().is_empty() {
            return Err(GenonavError::config("listen_addr must not be empty"));
        }

        if config.server.max_frame_bytes < 1024 {
            return Err(GenonavError::config(
                "max_frame_bytes must be at least 1024",
            ));
        }

        if config.navigation.default_window == 0 {
            return Err(GenonavError::config("default_window must be at least 1"));
        }

        if config.channel.ack_timeout_ms < 100 {
            return Err(GenonavError::config(
                "ack_timeout_ms must be at least 100",
            ));
        }

        if config.channel.outbound_buffer == 0 {
            return Err(GenonavError::config("outbound_buffer must be at least 1"));
        }

        let temperature = config.llm.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(GenonavError::config(
                "temperature must be between 0.0 and 2.0",
            ));
        }

        Ok(())
    }

    /// Load from an explicit path (or the default location) and validate
    pub fn load_and_validate(path: Option<&Path>) -> Result<AppConfig> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        Self::validate(&config)?;
        Ok(config)
    }
}
