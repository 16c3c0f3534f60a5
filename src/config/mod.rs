//! Configuration management for fetchzip
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use fetchzip::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `FETCHZIP__<section>__<key>`
//!
//! Examples:
//! - `FETCHZIP__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `FETCHZIP__DOWNLOADS__ALLOWED_EXTENSIONS=.pdf,.jpeg,.jpg`
//! - `FETCHZIP__TELEMETRY__ENVIRONMENT=production`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/fetchzip.toml`.
//! This can be overridden using the `FETCHZIP_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{
    Config, DownloadConfig, Environment, ServerConfig, StorageConfig, TelemetryConfig,
};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`FETCHZIP__*`)
    /// 2. TOML file (default: `config/fetchzip.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path (environment still applies)
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[downloads]\nmax_open_tasks = 5\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.downloads.max_open_tasks, 5);
        assert_eq!(config.downloads.max_in_flight, 3);
    }

    #[test]
    fn test_validation_runs_after_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[downloads]\nallowed_extensions = []\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result,
            Err(ConfigError::ValidationError(
                ValidationError::NoAllowedExtensions
            ))
        ));
    }
}
