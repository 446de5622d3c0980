//! obsync library: the command-line caller around `obsync-core`.
//!
//! Split out of the binary so integration tests can reach the config,
//! rendering and state-file types.

pub mod app;
pub mod config;
pub mod native_fs;
pub mod render;
pub mod state;

pub use app::{build_engine, status_report, sync_and_record, vault_key, VaultEngine};
pub use config::{Args, Command, Config, ConfigError};
pub use native_fs::NativeFs;
pub use state::{LastSync, StateStore, SyncHistory};
