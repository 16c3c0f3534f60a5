use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "FETCHZIP_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/fetchzip.toml";
const ENV_PREFIX: &str = "FETCHZIP";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    load_from_sources(default_path())
}

/// Path of the TOML file, honouring `FETCHZIP_CONFIG`
fn default_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // FETCHZIP__DOWNLOADS__MAX_IN_FLIGHT -> downloads.max_in_flight
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.downloads.max_open_tasks, 3);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"
request_timeout_secs = 30
public_url = "https://files.example.com"

[storage]
files_dir = "/tmp/fz/static"
archives_dir = "/tmp/fz/archives"

[downloads]
allowed_extensions = ".pdf,.png"
max_in_flight = 5

[telemetry]
environment = "production"
log_filter = "fetchzip=debug"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(
            config.server.public_url.as_deref(),
            Some("https://files.example.com")
        );
        assert_eq!(config.storage.files_dir, PathBuf::from("/tmp/fz/static"));
        assert_eq!(config.downloads.allowed_extensions, vec![".pdf", ".png"]);
        assert_eq!(config.downloads.max_in_flight, 5);
        assert_eq!(config.downloads.max_open_tasks, 3);
        assert_eq!(
            config.telemetry.environment,
            super::super::models::Environment::Production
        );
    }
}
