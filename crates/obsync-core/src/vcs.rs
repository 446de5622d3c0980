//! Version-control gateway abstraction.
//!
//! Implementations:
//! - `GitCli` - Runs the system `git` binary against the vault directory
//! - Fakes in the engine tests
//!
//! Every operation either returns a well-formed result or a typed `VcsError`.
//! A failed status check is an error, never an empty (clean) status.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("Not a git repository (vault folder is not initialized with git): {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("Failed to fetch from {remote}: {stderr}")]
    FetchFailed { remote: String, stderr: String },

    #[error("Commit failed: {stderr}")]
    CommitFailed { stderr: String },

    #[error("Push to {remote} failed: {stderr}")]
    PushFailed { remote: String, stderr: String },

    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },

    #[error("Failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` failed: {stderr}")]
    Backend { command: String, stderr: String },
}

pub type Result<T> = std::result::Result<T, VcsError>;

/// Commit counts relative to the tracked upstream branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AheadBehind {
    /// Commits present locally but not on the upstream
    pub ahead: u64,
    /// Commits present on the upstream but not locally
    pub behind: u64,
}

impl AheadBehind {
    pub fn new(ahead: u64, behind: u64) -> Self {
        Self { ahead, behind }
    }
}

/// Backend operations the sync engine needs, and nothing more.
///
/// All methods may suspend while the backend runs. No method returns a
/// partial result.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Fail with `NotARepository` unless the working directory is backend-managed.
    async fn ensure_repository(&self) -> Result<()>;

    /// Fetch the configured remote, pruning refs that no longer exist upstream.
    async fn fetch_remote(&self) -> Result<()>;

    /// Porcelain status text. Empty when the working copy has no uncommitted
    /// or untracked changes.
    async fn local_status(&self) -> Result<String>;

    /// Commit counts against the upstream. Only meaningful on a clean working copy.
    async fn ahead_behind(&self) -> Result<AheadBehind>;

    /// Stage every change in the working directory.
    async fn stage_all(&self) -> Result<()>;

    /// Commit the staged changes with `message`.
    async fn commit(&self, message: &str) -> Result<()>;

    /// Fast-forward push of the current branch to the upstream. Never forced.
    async fn push(&self) -> Result<()>;
}
