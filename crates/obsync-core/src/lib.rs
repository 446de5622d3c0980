//! obsync-core: Git-backed synchronization for an Obsidian vault.
//!
//! This crate provides:
//! - `SyncEngine`: decides between no-op, push, commit-and-push, or
//!   "remote ahead, merge manually" and runs the chosen steps in order
//! - `ExclusivityGuard`: single-flight guard so overlapping triggers are
//!   rejected instead of interleaving
//! - `VersionControl` trait and the `GitCli` gateway over the system `git`
//! - `ContentGenerator` hook and the `SummaryGenerator` implementation
//! - `EventBus` for progress and notices

pub mod content;
pub mod engine;
pub mod events;
pub mod fs;
pub mod git;
pub mod guard;
pub mod summary;
pub mod vcs;

pub use content::{fixed_clock, local_clock, Clock, ContentGenerator, NoContent};
pub use engine::{DivergenceState, FailureKind, SyncEngine, SyncError, SyncOutcome};
pub use events::{EventBus, Subscription, SyncEvent};
pub use fs::{is_vault_relative, FileSystem, FsError, InMemoryFs};
pub use git::{GitCli, GitConfig};
pub use guard::{AlreadyRunning, ExclusivityGuard};
pub use summary::{SummaryConfig, SummaryGenerator};
pub use vcs::{AheadBehind, VcsError, VersionControl};
