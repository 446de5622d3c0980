//! FileSystem trait abstraction for reading and writing vault files.
//!
//! Implementations:
//! - `InMemoryFs` - For testing
//! - `NativeFs` (in obsync) - Uses tokio::fs
//!
//! Paths are vault-relative and use `/` separators.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Path is outside the vault: {0}")]
    OutsideVault(String),
}

pub type Result<T> = std::result::Result<T, FsError>;

/// Whether `path` names something inside the vault: relative, non-empty,
/// and free of `..` components.
pub fn is_vault_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Vault filesystem used by content generators.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read file contents
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Write file contents (creates parent directories if needed)
    async fn write(&self, path: &str, content: &[u8]) -> Result<()>;

    /// Check if path exists
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// In-memory filesystem for testing
#[derive(Default)]
pub struct InMemoryFs {
    files: RwLock<HashMap<String, Vec<u8>>>,
    read_only: AtomicBool,
}

impl InMemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `FsError::Io`.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::Relaxed);
    }

    fn normalize_path(path: &str) -> String {
        path.trim_matches('/').to_string()
    }
}

#[async_trait]
impl FileSystem for InMemoryFs {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = Self::normalize_path(path);
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files.get(&path).cloned().ok_or(FsError::NotFound(path))
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        if self.read_only.load(Ordering::Relaxed) {
            return Err(FsError::Io(format!("read-only filesystem: {}", path)));
        }
        let path = Self::normalize_path(path);
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(path, content.to_vec());
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let path = Self::normalize_path(path);
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        Ok(files.contains_key(&path))
    }
}

// Lets a test keep a handle on the filesystem it hands to a generator.
#[async_trait]
impl<T: FileSystem + ?Sized> FileSystem for std::sync::Arc<T> {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        (**self).read(path).await
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        (**self).write(path, content).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        (**self).exists(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_vault_relative() {
        assert!(is_vault_relative("Inbox.md"));
        assert!(is_vault_relative("Daily/2026-10-19.md"));
        assert!(is_vault_relative("./Daily/Today.md"));

        assert!(!is_vault_relative(""));
        assert!(!is_vault_relative("/etc/passwd"));
        assert!(!is_vault_relative("../outside.md"));
        assert!(!is_vault_relative("Daily/../../outside.md"));
    }

    #[tokio::test]
    async fn test_inmemory_fs_basic_operations() {
        let fs = InMemoryFs::new();

        fs.write("notes/test.md", b"hello world").await.unwrap();

        let content = fs.read("/notes/test.md").await.unwrap();
        assert_eq!(content, b"hello world");

        assert!(fs.exists("notes/test.md").await.unwrap());
        assert!(!fs.exists("nonexistent.md").await.unwrap());
        assert!(matches!(
            fs.read("nonexistent.md").await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_inmemory_fs_read_only() {
        let fs = InMemoryFs::new();
        fs.set_read_only(true);

        assert!(matches!(fs.write("a.md", b"x").await, Err(FsError::Io(_))));
        assert!(!fs.exists("a.md").await.unwrap());
    }
}
