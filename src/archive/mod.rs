//! Bundles a task's downloaded files into a zip archive.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::storage::{StorageError, StorageLayout};
use crate::tasks::Task;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("task {0} has no downloaded files")]
    EmptyTask(u64),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Builds `<task_id>_archive.zip` from a task snapshot.
///
/// Every build starts from scratch and overwrites the previous archive.
/// Concurrent builds for the same task are not coordinated.
#[derive(Debug, Clone)]
pub struct Archiver {
    layout: StorageLayout,
}

impl Archiver {
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Write the archive for `task` and return its path.
    ///
    /// Entries are the files in `task.loaded_files`, named by base name.
    pub async fn build(&self, task: &Task) -> Result<PathBuf> {
        if task.loaded_files.is_empty() {
            return Err(ArchiveError::EmptyTask(task.id));
        }

        self.layout.ensure_archives_dir().await?;

        let archive_path = self.layout.archive_path(task.id);
        let files = task.loaded_files.clone();
        let target = archive_path.clone();

        tokio::task::spawn_blocking(move || write_zip(&target, &files)).await??;

        info!(
            task_id = task.id,
            files = task.loaded_files.len(),
            path = %archive_path.display(),
            "Archive built"
        );

        Ok(archive_path)
    }
}

fn write_zip(target: &Path, files: &[PathBuf]) -> Result<()> {
    let out = File::create(target).map_err(|source| ArchiveError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // Repeated links to the same file name land on one path on disk
    let mut written = HashSet::new();

    for path in files {
        let name = entry_name(path);
        if !written.insert(name.clone()) {
            debug!(entry = %name, "Skipping repeated archive entry");
            continue;
        }
        zip.start_file(name, options)?;

        let mut file = File::open(path).map_err(|source| ArchiveError::Io {
            path: path.clone(),
            source,
        })?;
        io::copy(&mut file, &mut zip).map_err(|source| ArchiveError::Io {
            path: path.clone(),
            source,
        })?;
    }

    zip.finish()?;
    Ok(())
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
