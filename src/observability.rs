//! Logging setup and in-process counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

use crate::config::{Environment, TelemetryConfig};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter. Development gets human-readable
/// output, production gets JSON lines.
pub fn init_tracing(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.environment {
        Environment::Development => builder.pretty().try_init(),
        Environment::Production => builder.json().try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {e}");
    }
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    tasks_created: AtomicU64,
    tasks_rejected: AtomicU64,
    links_accepted: AtomicU64,
    downloads_succeeded: AtomicU64,
    downloads_failed: AtomicU64,
    archives_built: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_created(&self) {
        self.tasks_created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "tasks_created", "Metric incremented");
    }

    pub fn task_rejected(&self) {
        self.tasks_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "tasks_rejected", "Metric incremented");
    }

    pub fn link_accepted(&self) {
        self.links_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "links_accepted", "Metric incremented");
    }

    pub fn download_succeeded(&self) {
        self.downloads_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_succeeded", "Metric incremented");
    }

    pub fn download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_failed", "Metric incremented");
    }

    pub fn archive_built(&self) {
        self.archives_built.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "archives_built", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_created: self.tasks_created.load(Ordering::Relaxed),
            tasks_rejected: self.tasks_rejected.load(Ordering::Relaxed),
            links_accepted: self.links_accepted.load(Ordering::Relaxed),
            downloads_succeeded: self.downloads_succeeded.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
            archives_built: self.archives_built.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub tasks_created: u64,
    pub tasks_rejected: u64,
    pub links_accepted: u64,
    pub downloads_succeeded: u64,
    pub downloads_failed: u64,
    pub archives_built: u64,
}
