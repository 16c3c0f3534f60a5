//! Task record and its externally visible projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Number of recorded outcomes (or links plus errors, for archiving) a task
/// needs before it is considered finished.
pub const OUTCOME_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Created,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// `Created` and `Processing` count against the admission cap.
    pub fn is_open(self) -> bool {
        matches!(self, TaskStatus::Created | TaskStatus::Processing)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_open()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Created => "created",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Full task record as held by the store.
///
/// `links`, `loaded_files` and `errors` are append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub status: TaskStatus,
    pub links: Vec<String>,
    pub loaded_files: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub archive_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: u64) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: TaskStatus::Created,
            links: Vec::new(),
            loaded_files: Vec::new(),
            errors: Vec::new(),
            archive_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Downloads that finished, successfully or not.
    pub fn outcome_count(&self) -> usize {
        self.loaded_files.len() + self.errors.len()
    }

    /// Whether a status read should build an archive for this snapshot.
    ///
    /// Counts submitted links plus errors, not outcomes.
    pub fn is_archivable(&self) -> bool {
        self.links.len() + self.errors.len() >= OUTCOME_THRESHOLD
            && !self.loaded_files.is_empty()
            && self.status.is_terminal()
    }

    pub fn view(&self) -> TaskView {
        TaskView {
            status: self.status,
            errors: self.errors.clone(),
        }
    }
}

/// What clients get to see of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
