use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("task {0} not found")]
    NotFound(u64),

    #[error("server is busy: {limit} tasks already in progress")]
    Busy { limit: usize },

    #[error("task with id {0} already exists")]
    DuplicateId(u64),

    #[error("download failed: {0}")]
    Download(String),

    #[error("archive failed: {0}")]
    Archive(String),
}

pub type Result<T> = std::result::Result<T, TaskError>;
