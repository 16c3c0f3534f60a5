use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::tasks::{Result, TaskError, TaskStore};

/// Gates task creation on the number of open (`created`/`processing`) tasks.
///
/// The count and the insert happen under one admission lock so concurrent
/// creators cannot both slip under the cap.
pub struct AdmissionController {
    store: Arc<TaskStore>,
    limit: usize,
    gate: Mutex<()>,
}

impl AdmissionController {
    pub fn new(store: Arc<TaskStore>, limit: usize) -> Self {
        Self {
            store,
            limit,
            gate: Mutex::new(()),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Create a task unless `limit` tasks are already open.
    pub async fn admit(&self) -> Result<u64> {
        let _gate = self.gate.lock().await;

        let open = self.store.count_open_tasks(self.limit).await;
        if open >= self.limit {
            warn!(open, limit = self.limit, "Task rejected, server busy");
            return Err(TaskError::Busy { limit: self.limit });
        }

        let id = self.store.create_task().await?;
        debug!(task_id = id, open = open + 1, "Task admitted");
        Ok(id)
    }
}
