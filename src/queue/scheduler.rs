use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::worker::Downloader;

/// DownloadScheduler runs downloads under a global in-flight cap
///
/// Architecture:
/// 1. Service calls `scheduler.submit(task_id, link)`
/// 2. A tokio task is spawned right away; `submit` never waits
/// 3. The spawned task parks on the shared semaphore until a slot frees up
///    (no timeout, no cancellation)
/// 4. It runs the downloader, which records the outcome in the task store
/// 5. The permit drops when the download finishes, success or not
///
/// The number of spawned tasks is unbounded; only execution is throttled.
pub struct DownloadScheduler {
    downloader: Arc<Downloader>,
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl DownloadScheduler {
    pub fn new(downloader: Arc<Downloader>, capacity: usize) -> Self {
        info!(capacity, "Creating DownloadScheduler");

        Self {
            downloader,
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Queue a download of `link` for `task_id`.
    ///
    /// The returned handle resolves once the outcome is recorded; callers are
    /// free to drop it.
    pub fn submit(&self, task_id: u64, link: String) -> JoinHandle<()> {
        let downloader = self.downloader.clone();
        let slots = self.slots.clone();

        tokio::spawn(async move {
            let _permit = match slots.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!(task_id, link, "Scheduler closed, download dropped");
                    return;
                }
            };

            debug!(task_id, link, "Download slot acquired");
            downloader.process(task_id, &link).await;
        })
    }

    /// Configured in-flight cap
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Downloads currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.capacity - self.slots.available_permits()
    }
}
