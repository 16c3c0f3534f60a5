use serde::{Deserialize, Deserializer, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub downloads: DownloadConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Base URL used for archive download links (e.g. `https://files.example.com`).
    /// Links are relative when unset.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_timeout_secs: default_request_timeout_secs(),
            public_url: None,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Local working directories
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_files_dir")]
    pub files_dir: PathBuf,
    #[serde(default = "default_archives_dir")]
    pub archives_dir: PathBuf,
    /// Remove both directories after the server stops
    #[serde(default = "default_cleanup_on_shutdown")]
    pub cleanup_on_shutdown: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            files_dir: default_files_dir(),
            archives_dir: default_archives_dir(),
            cleanup_on_shutdown: default_cleanup_on_shutdown(),
        }
    }
}

fn default_files_dir() -> PathBuf {
    PathBuf::from("data/static")
}

fn default_archives_dir() -> PathBuf {
    PathBuf::from("data/archives")
}

fn default_cleanup_on_shutdown() -> bool {
    true
}

/// Download admission and fetching
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Accepted link suffixes; either a list or a comma-separated string
    #[serde(
        default = "default_allowed_extensions",
        deserialize_with = "deserialize_extensions"
    )]
    pub allowed_extensions: Vec<String>,
    /// Maximum number of tasks in `created`/`processing` at once
    #[serde(default = "default_max_open_tasks")]
    pub max_open_tasks: usize,
    /// Maximum number of concurrent downloads across all tasks
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            max_open_tasks: default_max_open_tasks(),
            max_in_flight: default_max_in_flight(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".pdf".to_string(), ".jpeg".to_string(), ".jpg".to_string()]
}

fn default_max_open_tasks() -> usize {
    3
}

fn default_max_in_flight() -> usize {
    3
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("fetchzip/{}", env!("CARGO_PKG_VERSION"))
}

fn deserialize_extensions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Extensions {
        Csv(String),
        List(Vec<String>),
    }

    let list = match Extensions::deserialize(deserializer)? {
        Extensions::Csv(raw) => raw.split(',').map(str::to_owned).collect(),
        Extensions::List(list) => list,
    };

    Ok(list.into_iter().map(|ext| ext.trim().to_string()).collect())
}

/// Deployment flavour, selects the log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub environment: Environment,
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
