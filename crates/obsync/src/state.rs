//! Persistence for the last sync of each vault.
//!
//! Stored as JSON outside the vault (by default under the platform data
//! directory), so recording a sync never dirties the working copy.

use anyhow::Result;
use obsync_core::SyncOutcome;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Last completed sync of one vault.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LastSync {
    /// Vault path as given on the command line
    pub vault: String,
    /// When the sync completed (same format as commit messages)
    pub at: String,
    pub outcome: SyncOutcome,
}

/// Last syncs of every vault this machine has synced.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncHistory {
    pub vaults: Vec<LastSync>,
}

impl SyncHistory {
    /// Add or replace the record for a vault.
    pub fn upsert(&mut self, record: LastSync) {
        if let Some(existing) = self.vaults.iter_mut().find(|r| r.vault == record.vault) {
            *existing = record;
        } else {
            self.vaults.push(record);
        }
    }

    pub fn get(&self, vault: &str) -> Option<&LastSync> {
        self.vaults.iter().find(|r| r.vault == vault)
    }
}

/// Storage for the sync history.
pub struct StateStore {
    /// Path to the storage file.
    path: PathBuf,
    /// In-memory cache.
    history: SyncHistory,
}

impl StateStore {
    /// Open the store at `path`. A missing or unreadable file is an empty
    /// history; the next `record` overwrites it.
    pub fn open(path: &Path) -> Self {
        let mut store = Self {
            path: path.to_path_buf(),
            history: SyncHistory::default(),
        };
        match store.load() {
            Ok(loaded) => store.history = loaded,
            Err(e) => warn!("Ignoring unreadable state file {}: {:#}", path.display(), e),
        }
        store
    }

    fn load(&self) -> Result<SyncHistory> {
        if !self.path.exists() {
            return Ok(SyncHistory::default());
        }

        let contents = fs::read_to_string(&self.path)?;
        let history: SyncHistory = serde_json::from_str(&contents)?;
        Ok(history)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&self.history)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Record a completed sync and save.
    pub fn record(&mut self, record: LastSync) -> Result<()> {
        self.history.upsert(record);
        self.save()
    }

    pub fn last_sync(&self, vault: &str) -> Option<&LastSync> {
        self.history.get(vault)
    }
}
