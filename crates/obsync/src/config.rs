//! Command-line arguments and the resolved run configuration.

use clap::{Parser, Subcommand};
use obsync_core::{GitConfig, SummaryConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "obsync")]
#[command(about = "Sync an Obsidian vault with its git remote", version)]
pub struct Args {
    /// Path to the vault directory (supports ~ for home directory)
    #[arg(short, long, env = "OBSYNC_VAULT_PATH", global = true)]
    pub vault: Option<String>,

    /// Name of the remote to sync with
    #[arg(long, default_value = "origin", global = true)]
    pub remote: String,

    /// Give up on any single git command after this many seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Don't regenerate the vault summary before committing
    #[arg(long, global = true)]
    pub no_summary: bool,

    /// Vault-relative JSON file listing the notes to summarize
    #[arg(long, default_value = "target_paths.json", global = true)]
    pub targets_file: String,

    /// Vault-relative summary output file
    #[arg(long, default_value = "README.md", global = true)]
    pub summary_file: String,

    /// Where to record the last successful sync
    #[arg(long, env = "OBSYNC_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Commit local changes and push them (the default)
    Sync {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the last sync and how the vault differs from the remote
    Status,
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Sync { yes: false })
    }
}

/// Everything a run needs, resolved from `Args`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the vault's working copy
    pub vault_path: PathBuf,
    pub git: GitConfig,
    /// `None` when summary generation is disabled
    pub summary: Option<SummaryConfig>,
    pub state_file: PathBuf,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let vault_path = args
            .vault
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(expand_tilde)
            .ok_or(ConfigError::MissingVaultPath)?;

        let timeout = match args.timeout_secs {
            Some(0) => return Err(ConfigError::InvalidTimeout),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let summary = (!args.no_summary).then(|| SummaryConfig {
            targets_file: args.targets_file.clone(),
            output_file: args.summary_file.clone(),
        });

        let state_file = match &args.state_file {
            Some(path) => path.clone(),
            None => default_state_file().ok_or(ConfigError::NoStateDir)?,
        };

        Ok(Self {
            vault_path,
            git: GitConfig {
                remote: args.remote.clone(),
                timeout,
            },
            summary,
            state_file,
        })
    }
}

fn default_state_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("obsync").join("state.json"))
}

/// Expand ~ or ~/ prefix to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No vault given: pass --vault or set OBSYNC_VAULT_PATH")]
    MissingVaultPath,

    #[error("--timeout-secs must be greater than zero")]
    InvalidTimeout,

    #[error("Could not determine a data directory for the state file, pass --state-file")]
    NoStateDir,
}
