//! Content-generation hook run before local changes are committed.

use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;

/// Best-effort content generation invoked on the dirty-local path, before
/// staging. It may read the working tree and write files back into it.
///
/// Errors are reported to the user but never abort the sync.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self) -> anyhow::Result<()>;
}

/// Generator that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContent;

#[async_trait]
impl ContentGenerator for NoContent {
    async fn generate(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<G: ContentGenerator + ?Sized> ContentGenerator for Arc<G> {
    async fn generate(&self) -> anyhow::Result<()> {
        (**self).generate().await
    }
}

/// Source of human-readable timestamps for commit messages and summaries.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Local wall-clock time as `HH:MM:SS YYYY-MM-DD`.
pub fn local_clock() -> Clock {
    Arc::new(|| Local::now().format("%H:%M:%S %Y-%m-%d").to_string())
}

/// A clock that always returns `timestamp`.
pub fn fixed_clock(timestamp: impl Into<String>) -> Clock {
    let timestamp = timestamp.into();
    Arc::new(move || timestamp.clone())
}
