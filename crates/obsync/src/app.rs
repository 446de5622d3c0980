//! Wiring between the resolved `Config`, the engine and the state file.

use crate::config::Config;
use crate::native_fs::NativeFs;
use crate::render::state_message;
use crate::state::{LastSync, StateStore};
use obsync_core::{
    Clock, ContentGenerator, GitCli, NoContent, SummaryGenerator, SyncEngine, SyncError,
    SyncOutcome, VersionControl,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Engine over the system `git`, with the summary hook unless disabled.
pub type VaultEngine = SyncEngine<GitCli, Arc<dyn ContentGenerator>>;

pub fn build_engine(config: &Config, clock: Clock) -> VaultEngine {
    let git = GitCli::new(config.vault_path.clone(), config.git.clone());

    let content: Arc<dyn ContentGenerator> = match &config.summary {
        Some(summary) => Arc::new(SummaryGenerator::new(
            NativeFs::new(config.vault_path.clone()),
            summary.clone(),
            clock.clone(),
        )),
        None => Arc::new(NoContent),
    };

    SyncEngine::new(git, content).with_clock(clock)
}

/// Key under which a vault's last sync is stored.
pub fn vault_key(config: &Config) -> String {
    config.vault_path.display().to_string()
}

/// Run one sync and record it when nothing is left to do.
///
/// A failure to write the state file is logged, never reported as a sync
/// failure: the remote already has the changes.
pub async fn sync_and_record<V, C>(
    engine: &SyncEngine<V, C>,
    store: &mut StateStore,
    vault: &str,
    clock: &Clock,
) -> Result<SyncOutcome, SyncError>
where
    V: VersionControl,
    C: ContentGenerator,
{
    let outcome = engine.sync().await?;

    if matches!(outcome, SyncOutcome::Success | SyncOutcome::NoChanges) {
        let record = LastSync {
            vault: vault.to_string(),
            at: clock(),
            outcome,
        };
        match store.record(record) {
            Ok(()) => debug!("Recorded last sync for {}", vault),
            Err(e) => warn!("Failed to record last sync for {}: {:#}", vault, e),
        }
    }

    Ok(outcome)
}

/// Two-line report: the last recorded sync, then the current divergence.
pub async fn status_report<V, C>(
    engine: &SyncEngine<V, C>,
    store: &StateStore,
    vault: &str,
) -> Result<String, SyncError>
where
    V: VersionControl,
    C: ContentGenerator,
{
    let last = match store.last_sync(vault) {
        Some(record) => format!(
            "Last obsync: {} ({})",
            record.at,
            outcome_label(record.outcome)
        ),
        None => "Last obsync: ~".to_string(),
    };

    let state = engine.inspect().await?;
    Ok(format!("{}\n{}", last, state_message(state)))
}

fn outcome_label(outcome: SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Success => "success",
        SyncOutcome::NoChanges => "no changes",
        SyncOutcome::RemoteAhead => "remote ahead",
    }
}
