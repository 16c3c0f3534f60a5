//! Turns one link into a stored file or a recorded failure

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use super::http::{FetchError, Fetcher};
use crate::observability::Metrics;
use crate::storage::{StorageError, StorageLayout};
use crate::tasks::TaskStore;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("unsupported file type '{file}', allowed: {allowed}")]
    UnsupportedExtension { file: String, allowed: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// Downloads a single link and reports the outcome into the task store.
///
/// Failures are never returned to whoever submitted the link; they end up in
/// the task's `errors` list and flip its status to `Failed`.
pub struct Downloader {
    store: Arc<TaskStore>,
    fetcher: Arc<dyn Fetcher>,
    layout: StorageLayout,
    allowed_extensions: Vec<String>,
    metrics: Arc<Metrics>,
}

impl Downloader {
    pub fn new(
        store: Arc<TaskStore>,
        fetcher: Arc<dyn Fetcher>,
        layout: StorageLayout,
        allowed_extensions: Vec<String>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            fetcher,
            layout,
            allowed_extensions,
            metrics,
        }
    }

    /// Literal suffix match, no content sniffing.
    pub fn is_allowed(&self, link: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|ext| link.ends_with(ext.as_str()))
    }

    /// Download `link` for `task_id` and record the result on the task.
    pub async fn process(&self, task_id: u64, link: &str) {
        match self.download(task_id, link).await {
            Ok(path) => {
                info!(task_id, link, path = %path.display(), "File downloaded");
                self.metrics.download_succeeded();

                if let Err(e) = self.store.append_loaded_file(task_id, path).await {
                    error!(task_id, error = %e, "Failed to record downloaded file");
                }
            }
            Err(err) => {
                warn!(task_id, link, error = %err, "Download failed");
                self.metrics.download_failed();

                let message = format!("download for task {task_id} failed: {err}");
                if let Err(e) = self.store.record_failure(task_id, message).await {
                    error!(task_id, error = %e, "Failed to record download error");
                }
            }
        }
    }

    /// Check, fetch and persist `link`, returning where it was written.
    pub async fn download(&self, task_id: u64, link: &str) -> Result<PathBuf> {
        let file_name = file_name_from_url(link);

        if !self.is_allowed(link) {
            return Err(DownloadError::UnsupportedExtension {
                file: file_name.to_string(),
                allowed: self.allowed_extensions.join(", "),
            });
        }

        let body = self.fetcher.fetch(link).await?;

        self.layout.ensure_files_dir().await?;
        let path = self.layout.file_path(task_id, file_name);
        tokio::fs::write(&path, &body)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

/// Last `/`-separated segment of `link`.
pub fn file_name_from_url(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskStatus;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Serves a fixed body for every URL and counts calls.
    struct StaticFetcher {
        body: Option<&'static [u8]>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> super::super::http::Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.body {
                Some(body) => Ok(Bytes::from_static(body)),
                None => Err(FetchError::BadStatus(404)),
            }
        }
    }

    fn setup(body: Option<&'static [u8]>) -> (Downloader, Arc<TaskStore>, Arc<StaticFetcher>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(TaskStore::new());
        let fetcher = Arc::new(StaticFetcher {
            body,
            calls: AtomicUsize::new(0),
        });
        let layout = StorageLayout::new(
            temp_dir.path().join("static"),
            temp_dir.path().join("archives"),
        );
        let downloader = Downloader::new(
            store.clone(),
            fetcher.clone(),
            layout,
            vec![".pdf".into(), ".jpeg".into(), ".jpg".into()],
            Arc::new(Metrics::new()),
        );
        (downloader, store, fetcher, temp_dir)
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(file_name_from_url("http://h/a.pdf"), "a.pdf");
        assert_eq!(file_name_from_url("https://h/x/y/photo.jpg"), "photo.jpg");
        assert_eq!(file_name_from_url("http://h/"), "");
    }

    #[tokio::test]
    async fn test_success_records_file_and_keeps_status() {
        let (downloader, store, _fetcher, temp_dir) = setup(Some(b"%PDF-1.4"));
        let id = store.create_task().await.unwrap();
        store.update_status(id, TaskStatus::Processing).await.unwrap();

        downloader.process(id, "http://h/a.pdf").await;

        let task = store.get_task(id).await.unwrap();
        let expected = temp_dir.path().join("static").join("0_a.pdf");
        assert_eq!(task.loaded_files, vec![expected.clone()]);
        assert_eq!(task.status, TaskStatus::Processing);
        assert_eq!(std::fs::read(expected).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_disallowed_extension_never_fetches() {
        let (downloader, store, fetcher, _temp_dir) = setup(Some(b"MZ"));
        let id = store.create_task().await.unwrap();

        downloader.process(id, "http://h/b.exe").await;

        let task = store.get_task(id).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(task.errors.len(), 1);
        assert!(task.errors[0].contains("b.exe"));
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.loaded_files.is_empty());
    }

    #[tokio::test]
    async fn test_bad_status_is_recorded() {
        let (downloader, store, fetcher, _temp_dir) = setup(None);
        let id = store.create_task().await.unwrap();

        downloader.process(id, "http://h/missing.pdf").await;

        let task = store.get_task(id).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.errors[0].contains("404"));
    }

    #[tokio::test]
    async fn test_success_after_failure_stays_failed() {
        let (downloader, store, _fetcher, _temp_dir) = setup(Some(b"jpeg"));
        let id = store.create_task().await.unwrap();

        downloader.process(id, "http://h/b.exe").await;
        downloader.process(id, "http://h/a.jpg").await;

        let task = store.get_task(id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.loaded_files.len(), 1);
    }

    #[test]
    fn test_suffix_match_is_literal() {
        let (downloader, _store, _fetcher, _temp_dir) = setup(None);

        assert!(downloader.is_allowed("http://h/a.pdf"));
        assert!(downloader.is_allowed("http://h/a.jpeg"));
        assert!(!downloader.is_allowed("http://h/a.pdf?dl=1"));
        assert!(!downloader.is_allowed("http://h/a.PDF"));
    }
}
