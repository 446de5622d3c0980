//! Native filesystem implementation using tokio::fs.

use async_trait::async_trait;
use obsync_core::fs::{is_vault_relative, FileSystem, FsError, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Vault filesystem rooted at the working copy.
pub struct NativeFs {
    base_path: PathBuf,
}

impl NativeFs {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Resolve a vault-relative path. Absolute paths and `..` are rejected.
    fn full_path(&self, path: &str) -> Result<PathBuf> {
        if !is_vault_relative(path) {
            return Err(FsError::OutsideVault(path.to_string()));
        }
        Ok(self.base_path.join(path))
    }
}

#[async_trait]
impl FileSystem for NativeFs {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(path)?;
        fs::read(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => FsError::NotFound(path.to_string()),
            _ => FsError::Io(e.to_string()),
        })
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        let full_path = self.full_path(path)?;

        // Create parent directories if needed
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FsError::Io(e.to_string()))?;
        }

        fs::write(&full_path, content)
            .await
            .map_err(|e| FsError::Io(e.to_string()))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        fs::try_exists(self.full_path(path)?)
            .await
            .map_err(|e| FsError::Io(e.to_string()))
    }
}
