//! Task log files on disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use queuedeck_core::{LogStream, TaskId};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot use log directory {}: {source}", dir.display())]
    LogDir { dir: PathBuf, source: io::Error },
    #[error("writing log file failed: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` and its parents when missing. Fails when `dir` names a file.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    fs::create_dir_all(dir).map_err(|source| PersistError::LogDir {
        dir: dir.to_path_buf(),
        source,
    })
}

/// `<task_id>.<stream>.log`. Separators in the id become `_` so the file
/// stays inside the log directory.
pub fn task_log_filename(task_id: &TaskId, stream: LogStream) -> String {
    let safe = task_id.as_str().replace(['/', '\\', ':'], "_");
    format!("{safe}.{stream}.log")
}

/// Replaces files in one directory through a sibling temp file and a rename,
/// so readers see the old content or the new, never a prefix.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_dir(&self.dir)?;
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(content)?;
        staged.as_file().sync_all()?;

        let target = self.dir.join(filename);
        staged
            .persist(&target)
            .map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}
