use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("config directory missing or not writable: {0}")]
    ConfigDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the directory that will hold `path` exists; create if missing.
pub fn ensure_parent_dir(path: &Path) -> Result<PathBuf, PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if dir.exists() {
        let meta = fs::metadata(&dir).map_err(|e| PersistError::ConfigDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::ConfigDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(&dir).map_err(|e| PersistError::ConfigDir(e.to_string()))?;
    }
    Ok(dir)
}

/// Atomically replaces a file by writing a temp file beside it, then renaming.
pub struct AtomicFileWriter {
    path: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, content: &str) -> Result<(), PersistError> {
        let dir = ensure_parent_dir(&self.path)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }
}
