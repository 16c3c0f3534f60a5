use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::error::{Result, TaskError};
use super::model::{Task, TaskStatus};

/// In-memory task table, the single source of truth for task state.
///
/// Every operation takes the one lock for its whole duration, so each call is
/// atomic with respect to the entire map. Reads hand out clones.
#[derive(Debug, Default)]
pub struct TaskStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    tasks: HashMap<u64, Task>,
    next_id: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id and insert a `Created` record for it.
    pub async fn create_task(&self) -> Result<u64> {
        let mut inner = self.inner.write().await;

        let id = inner.next_id;
        inner.next_id += 1;

        if inner.tasks.contains_key(&id) {
            return Err(TaskError::DuplicateId(id));
        }

        inner.tasks.insert(id, Task::new(id));
        debug!(task_id = id, "Task created");
        Ok(id)
    }

    pub async fn append_link(&self, id: u64, link: String) -> Result<()> {
        self.update_with(id, |task| task.links.push(link)).await?;
        Ok(())
    }

    pub async fn append_loaded_file(&self, id: u64, path: PathBuf) -> Result<()> {
        self.update_with(id, |task| task.loaded_files.push(path)).await?;
        Ok(())
    }

    pub async fn append_error(&self, id: u64, message: String) -> Result<()> {
        self.update_with(id, |task| task.errors.push(message)).await?;
        Ok(())
    }

    pub async fn update_status(&self, id: u64, status: TaskStatus) -> Result<()> {
        self.update_with(id, |task| task.status = status).await?;
        Ok(())
    }

    pub async fn set_archive_path(&self, id: u64, path: PathBuf) -> Result<()> {
        self.update_with(id, |task| task.archive_path = Some(path)).await?;
        Ok(())
    }

    /// Append a failure description and flip the task to `Failed` in one step.
    pub async fn record_failure(&self, id: u64, message: String) -> Result<()> {
        self.update_with(id, |task| {
            task.errors.push(message);
            task.status = TaskStatus::Failed;
        })
        .await?;
        Ok(())
    }

    /// Apply `mutate` to the record under the store lock and return the
    /// resulting snapshot.
    pub async fn update_with<F>(&self, id: u64, mutate: F) -> Result<Task>
    where
        F: FnOnce(&mut Task),
    {
        let mut inner = self.inner.write().await;
        let task = inner.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;

        mutate(task);
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    pub async fn get_task(&self, id: u64) -> Result<Task> {
        let inner = self.inner.read().await;
        inner.tasks.get(&id).cloned().ok_or(TaskError::NotFound(id))
    }

    /// Count `Created`/`Processing` tasks, stopping once `cap` is reached.
    pub async fn count_open_tasks(&self, cap: usize) -> usize {
        let inner = self.inner.read().await;
        inner
            .tasks
            .values()
            .filter(|task| task.status.is_open())
            .take(cap)
            .count()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
