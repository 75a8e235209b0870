// src/storage/mod.rs

//! Local filesystem storage for the attachment tree and the calendar file.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Filesystem store rooted at the output directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Full path for a relative key.
    pub fn path(&self, key: impl AsRef<Path>) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Create a directory (and its parents) under the root. Idempotent.
    pub async fn ensure_dir(&self, key: impl AsRef<Path>) -> Result<()> {
        tokio::fs::create_dir_all(self.path(key)).await?;
        Ok(())
    }

    /// Whether a file already exists under the root.
    pub async fn exists(&self, key: impl AsRef<Path>) -> bool {
        tokio::fs::try_exists(self.path(key)).await.unwrap_or(false)
    }

    /// Write bytes atomically (write to temp, then rename).
    pub async fn write_bytes(&self, key: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp_name = path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the file doesn't exist.
    pub async fn read_bytes(&self, key: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
