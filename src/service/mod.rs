//! Task operations exposed to the HTTP layer.
//!
//! [`TaskService`] wires admission, the download scheduler, the read-time
//! status rule and the archiver around one shared [`TaskStore`].

mod admission;
pub mod aggregator;
mod links;

pub use admission::AdmissionController;
pub use links::validate_link;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::archive::Archiver;
use crate::config::Config;
use crate::observability::Metrics;
use crate::queue::DownloadScheduler;
use crate::storage::StorageLayout;
use crate::tasks::{Result, Task, TaskError, TaskStatus, TaskStore};
use crate::worker::{Downloader, FetchError, Fetcher, HttpConfig, HttpFetcher};

pub struct TaskService {
    store: Arc<TaskStore>,
    admission: AdmissionController,
    scheduler: DownloadScheduler,
    archiver: Archiver,
    metrics: Arc<Metrics>,
}

impl TaskService {
    pub fn new(
        store: Arc<TaskStore>,
        admission: AdmissionController,
        scheduler: DownloadScheduler,
        archiver: Archiver,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            admission,
            scheduler,
            archiver,
            metrics,
        }
    }

    /// Build the full component graph from configuration using `fetcher`.
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn Fetcher>, metrics: Arc<Metrics>) -> Self {
        let store = Arc::new(TaskStore::new());
        let layout = StorageLayout::from_config(&config.storage);

        let downloader = Downloader::new(
            store.clone(),
            fetcher,
            layout.clone(),
            config.downloads.allowed_extensions.clone(),
            metrics.clone(),
        );
        let scheduler = DownloadScheduler::new(Arc::new(downloader), config.downloads.max_in_flight);
        let admission = AdmissionController::new(store.clone(), config.downloads.max_open_tasks);

        Self::new(store, admission, scheduler, Archiver::new(layout), metrics)
    }

    /// Build the full component graph with the reqwest fetcher.
    pub fn from_config(config: &Config, metrics: Arc<Metrics>) -> std::result::Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(HttpConfig::from_config(&config.downloads))?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher), metrics))
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub fn scheduler(&self) -> &DownloadScheduler {
        &self.scheduler
    }

    /// Create a task, or fail with `Busy` when the open-task cap is reached.
    pub async fn create_task(&self) -> Result<u64> {
        match self.admission.admit().await {
            Ok(id) => {
                self.metrics.task_created();
                info!(task_id = id, "Task created");
                Ok(id)
            }
            Err(e) => {
                if matches!(e, TaskError::Busy { .. }) {
                    self.metrics.task_rejected();
                }
                Err(e)
            }
        }
    }

    /// Record `link` on the task and schedule its download.
    ///
    /// Returns as soon as the download is queued. A `Failed` task keeps its
    /// status; any other task moves to `Processing`.
    pub async fn append_link(&self, id: u64, link: String) -> Result<JoinHandle<()>> {
        validate_link(&link)?;

        let recorded = link.clone();
        let task = self
            .store
            .update_with(id, move |task| {
                task.links.push(recorded);
                if task.status != TaskStatus::Failed {
                    task.status = TaskStatus::Processing;
                }
            })
            .await?;

        self.metrics.link_accepted();
        info!(task_id = id, link, status = %task.status, "Link added");

        Ok(self.scheduler.submit(id, link))
    }

    /// Snapshot of the task after applying the read-time status rule.
    pub async fn get_task(&self, id: u64) -> Result<Task> {
        let mut task = self.store.get_task(id).await?;
        if aggregator::settle(&mut task) {
            task = self
                .store
                .update_with(id, |task| {
                    aggregator::settle(task);
                })
                .await?;
            info!(task_id = id, status = %task.status, "Task settled");
        }
        Ok(task)
    }

    /// Build the archive for `task` and remember where it went.
    pub async fn build_archive(&self, task: &Task) -> Result<PathBuf> {
        let path = self.archiver.build(task).await.map_err(|e| {
            error!(task_id = task.id, error = %e, "Archive build failed");
            TaskError::Archive(e.to_string())
        })?;

        self.store.set_archive_path(task.id, path.clone()).await?;
        self.metrics.archive_built();
        Ok(path)
    }

    /// Build the archive when `task` meets the archiving rule, otherwise do nothing.
    pub async fn archive_if_ready(&self, task: &Task) -> Result<Option<PathBuf>> {
        if !task.is_archivable() {
            return Ok(None);
        }
        self.build_archive(task).await.map(Some)
    }

    /// Path of the last archive built for `id`.
    pub async fn archive_path_for(&self, id: u64) -> Result<PathBuf> {
        let task = self.store.get_task(id).await?;
        task.archive_path.ok_or(TaskError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use tempfile::TempDir;

    struct PdfFetcher;

    #[async_trait]
    impl Fetcher for PdfFetcher {
        async fn fetch(&self, _url: &str) -> std::result::Result<Bytes, FetchError> {
            Ok(Bytes::from_static(b"%PDF"))
        }
    }

    fn service(temp_dir: &TempDir) -> TaskService {
        let mut config = Config::default();
        config.storage.files_dir = temp_dir.path().join("static");
        config.storage.archives_dir = temp_dir.path().join("archives");
        TaskService::with_fetcher(&config, Arc::new(PdfFetcher), Arc::new(Metrics::new()))
    }

    #[tokio::test]
    async fn test_append_link_validates_before_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);

        assert!(matches!(
            service.append_link(99, String::new()).await,
            Err(TaskError::Validation(_))
        ));
        assert!(matches!(
            service.append_link(99, "http://h/a.pdf".into()).await,
            Err(TaskError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_append_link_moves_to_processing() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        let id = service.create_task().await.unwrap();

        let handle = service.append_link(id, "http://h/a.pdf".into()).await.unwrap();
        assert_eq!(
            service.store().get_task(id).await.unwrap().status,
            TaskStatus::Processing
        );
        handle.await.unwrap();

        let task = service.get_task(id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Processing);
        assert_eq!(task.loaded_files.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_task_stays_failed_on_new_link() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        let id = service.create_task().await.unwrap();

        service.append_link(id, "http://h/x.exe".into()).await.unwrap().await.unwrap();
        service.append_link(id, "http://h/a.pdf".into()).await.unwrap();

        assert_eq!(
            service.store().get_task(id).await.unwrap().status,
            TaskStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_archive_path_requires_build() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        let id = service.create_task().await.unwrap();

        assert!(matches!(
            service.archive_path_for(id).await,
            Err(TaskError::NotFound(_))
        ));
        assert!(matches!(
            service.archive_path_for(1234).await,
            Err(TaskError::NotFound(1234))
        ));
    }

    #[tokio::test]
    async fn test_full_cycle_builds_archive() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        let id = service.create_task().await.unwrap();

        for link in ["http://h/a.pdf", "http://h/b.exe", "http://h/c.exe"] {
            service.append_link(id, link.into()).await.unwrap().await.unwrap();
        }

        let task = service.get_task(id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);

        let path = service.archive_if_ready(&task).await.unwrap().unwrap();
        assert_eq!(service.archive_path_for(id).await.unwrap(), path);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_same_file_name_from_two_hosts_still_archives() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        let id = service.create_task().await.unwrap();

        for link in ["http://h1/a.pdf", "http://h2/a.pdf", "http://h/c.exe"] {
            service.append_link(id, link.into()).await.unwrap().await.unwrap();
        }

        let task = service.get_task(id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.loaded_files.len(), 2);
        assert_eq!(task.loaded_files[0], task.loaded_files[1]);

        let path = service.archive_if_ready(&task).await.unwrap().unwrap();
        assert_eq!(service.archive_path_for(id).await.unwrap(), path);
    }

    #[tokio::test]
    async fn test_archive_failure_leaves_path_unset() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        let id = service.create_task().await.unwrap();

        let mut task = service.store().get_task(id).await.unwrap();
        task.loaded_files.push(temp_dir.path().join("static/0_missing.pdf"));

        assert!(matches!(
            service.build_archive(&task).await,
            Err(TaskError::Archive(_))
        ));
        assert!(service.store().get_task(id).await.unwrap().archive_path.is_none());
    }
}
