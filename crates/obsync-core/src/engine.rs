//! SyncEngine: reconciles the vault's working copy with its single remote.
//!
//! One sync attempt runs entirely under the engine's `ExclusivityGuard`:
//!
//! 1. Check that the vault is a repository
//! 2. Fetch (with prune) so the view of the remote is current
//! 3. Compute the `DivergenceState`:
//!    - any working-copy change → `DirtyLocal` (commit counts are not queried)
//!    - else `behind > 0` → `RemoteAhead`, even when also ahead
//!    - else `ahead > 0` → `AheadOnly`
//!    - else `Clean`
//! 4. Branch:
//!    - `Clean` → `NoChanges`, nothing is staged, committed or pushed
//!    - `RemoteAhead` → `RemoteAhead`, no merge or rebase is ever attempted
//!    - `DirtyLocal` → run the content hook, stage all, commit, push
//!    - `AheadOnly` → push
//!
//! Gateway failures stop the attempt and propagate unchanged. There is no
//! retry: a later `sync()` re-evaluates divergence from scratch, so a commit
//! whose push failed is picked up as `AheadOnly`.

use crate::content::{local_clock, Clock, ContentGenerator, NoContent};
use crate::events::{EventBus, SyncEvent};
use crate::guard::{AlreadyRunning, ExclusivityGuard};
use crate::vcs::{AheadBehind, VcsError, VersionControl};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Relationship between the working copy and the remote at decision time.
///
/// Computed fresh on every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DivergenceState {
    /// No working-copy changes, no unpushed commits, no unseen remote commits
    Clean,
    /// Uncommitted or untracked changes exist
    DirtyLocal,
    /// Local commits the remote lacks, and nothing the other way
    AheadOnly,
    /// The remote has commits the working copy lacks
    RemoteAhead,
}

impl DivergenceState {
    /// Classify a clean working copy from its commit counts.
    ///
    /// `behind` is checked first: being behind disqualifies a push no matter
    /// how far ahead the working copy is.
    pub fn from_counts(counts: AheadBehind) -> Self {
        if counts.behind > 0 {
            DivergenceState::RemoteAhead
        } else if counts.ahead > 0 {
            DivergenceState::AheadOnly
        } else {
            DivergenceState::Clean
        }
    }
}

/// Result of a completed sync attempt.
///
/// `NoChanges` and `RemoteAhead` are successful evaluations, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncOutcome {
    Success,
    NoChanges,
    RemoteAhead,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    AlreadyRunning(#[from] AlreadyRunning),

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Failure categories callers must render distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    AlreadyRunning,
    NotARepository,
    FetchFailed,
    CommitFailed,
    PushFailed,
    TimedOut,
    Backend,
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::AlreadyRunning(_) => FailureKind::AlreadyRunning,
            SyncError::Vcs(err) => match err {
                VcsError::NotARepository { .. } => FailureKind::NotARepository,
                VcsError::FetchFailed { .. } => FailureKind::FetchFailed,
                VcsError::CommitFailed { .. } => FailureKind::CommitFailed,
                VcsError::PushFailed { .. } => FailureKind::PushFailed,
                VcsError::TimedOut { .. } => FailureKind::TimedOut,
                VcsError::Spawn { .. } | VcsError::Backend { .. } => FailureKind::Backend,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Single-flight sync engine for one vault.
pub struct SyncEngine<V, C = NoContent> {
    vcs: V,
    content: C,
    clock: Clock,
    guard: ExclusivityGuard,
    events: Arc<EventBus>,
}

impl<V: VersionControl> SyncEngine<V> {
    /// Engine without a content-generation hook.
    pub fn without_content(vcs: V) -> Self {
        Self::new(vcs, NoContent)
    }
}

impl<V: VersionControl, C: ContentGenerator> SyncEngine<V, C> {
    pub fn new(vcs: V, content: C) -> Self {
        Self {
            vcs,
            content,
            clock: local_clock(),
            guard: ExclusivityGuard::new(),
            events: Arc::new(EventBus::new()),
        }
    }

    /// Replace the clock used for commit messages.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Whether a sync (or inspection) is in flight. Lets callers disable
    /// their trigger instead of relying on `AlreadyRunning`.
    ///
    /// For long-lived embedders (a plugin or daemon sharing one engine); the
    /// CLI runs a single attempt per process and never needs it.
    pub fn is_syncing(&self) -> bool {
        self.guard.is_busy()
    }

    /// Run one sync attempt.
    ///
    /// Fails with `AlreadyRunning` if another attempt holds the guard, and
    /// propagates any gateway failure unmodified.
    pub async fn sync(&self) -> Result<SyncOutcome> {
        let result = self.guard.run_exclusive(|| self.sync_exclusive()).await;

        match &result {
            Ok(outcome) => {
                info!("Sync finished: {:?}", outcome);
                self.events.emit(SyncEvent::Finished { outcome: *outcome });
            }
            Err(err) => {
                warn!("Sync failed: {}", err);
                self.events.emit(SyncEvent::Failed { kind: err.kind() });
            }
        }
        result
    }

    /// Check, fetch and compute divergence without changing anything.
    pub async fn inspect(&self) -> Result<DivergenceState> {
        self.guard
            .run_exclusive(|| async { Ok::<_, SyncError>(self.refresh_divergence().await?) })
            .await
    }

    async fn sync_exclusive(&self) -> Result<SyncOutcome> {
        self.events.emit(SyncEvent::Started);

        match self.refresh_divergence().await? {
            DivergenceState::Clean => {
                info!("Nothing to sync");
                return Ok(SyncOutcome::NoChanges);
            }
            DivergenceState::RemoteAhead => {
                warn!("Remote has commits this vault lacks, manual merge required");
                return Ok(SyncOutcome::RemoteAhead);
            }
            DivergenceState::DirtyLocal => {
                self.commit_local_changes().await?;
            }
            DivergenceState::AheadOnly => {
                debug!("No local changes, pushing existing commits");
            }
        }

        self.vcs.push().await?;
        info!("Pushed to upstream");
        self.events.emit(SyncEvent::Pushed);
        Ok(SyncOutcome::Success)
    }

    async fn refresh_divergence(&self) -> std::result::Result<DivergenceState, VcsError> {
        self.vcs.ensure_repository().await?;
        self.vcs.fetch_remote().await?;

        let state = self.divergence().await?;
        debug!("Divergence state: {:?}", state);
        self.events.emit(SyncEvent::StateComputed { state });
        Ok(state)
    }

    /// Working-copy changes are checked before commit counts. Until they are
    /// committed the counts say nothing about the divergence they create.
    async fn divergence(&self) -> std::result::Result<DivergenceState, VcsError> {
        let status = self.vcs.local_status().await?;
        if !status.trim().is_empty() {
            return Ok(DivergenceState::DirtyLocal);
        }

        let counts = self.vcs.ahead_behind().await?;
        debug!("ahead={} behind={}", counts.ahead, counts.behind);
        Ok(DivergenceState::from_counts(counts))
    }

    async fn commit_local_changes(&self) -> std::result::Result<(), VcsError> {
        // Generated content is optional: its error is reported and dropped here.
        if let Err(err) = self.content.generate().await {
            let message = format!("{:#}", err);
            warn!("Content generation failed, syncing without it: {}", message);
            self.events
                .emit(SyncEvent::ContentGenerationFailed { message });
        }

        self.vcs.stage_all().await?;

        let message = format!("Obsync {}", (self.clock)());
        self.vcs.commit(&message).await?;
        info!("Committed local changes: {}", message);
        self.events.emit(SyncEvent::Committed { message });
        Ok(())
    }
}
