//! On-disk layout for downloaded files and built archives

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to remove directory {path}: {source}")]
    RemoveDir { path: PathBuf, source: io::Error },
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Working directories for one process run.
///
/// Files land in `files_dir` as `<task_id>_<last url segment>`, archives in
/// `archives_dir` as `<task_id>_archive.zip`.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    files_dir: PathBuf,
    archives_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(files_dir: impl Into<PathBuf>, archives_dir: impl Into<PathBuf>) -> Self {
        Self {
            files_dir: files_dir.into(),
            archives_dir: archives_dir.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.files_dir, &config.archives_dir)
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn archives_dir(&self) -> &Path {
        &self.archives_dir
    }

    /// Destination of a downloaded file.
    pub fn file_path(&self, task_id: u64, file_name: &str) -> PathBuf {
        self.files_dir.join(format!("{task_id}_{file_name}"))
    }

    /// Destination of a task's archive.
    pub fn archive_path(&self, task_id: u64) -> PathBuf {
        self.archives_dir.join(format!("{task_id}_archive.zip"))
    }

    pub async fn ensure_files_dir(&self) -> Result<()> {
        create_dir(&self.files_dir).await
    }

    pub async fn ensure_archives_dir(&self) -> Result<()> {
        create_dir(&self.archives_dir).await
    }

    /// Recursively delete both working directories.
    ///
    /// Missing directories are not an error. Both removals are attempted even
    /// if the first fails; the first error is returned.
    pub async fn cleanup(&self) -> Result<()> {
        let files = remove_dir(&self.files_dir).await;
        let archives = remove_dir(&self.archives_dir).await;
        files.and(archives)
    }
}

async fn create_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| StorageError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
}

async fn remove_dir(path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {
            info!(path = %path.display(), "Removed storage directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => {
            warn!(path = %path.display(), error = %source, "Failed to remove storage directory");
            Err(StorageError::RemoveDir {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
