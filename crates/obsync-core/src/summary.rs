//! Vault summary generation.
//!
//! Concatenates a configured list of notes into one markdown file (by
//! default `README.md`) so the remote's landing page shows them. The list
//! lives in the vault as a JSON array of vault-relative paths:
//!
//! ```json
//! ["Projects/Roadmap.md", "Daily/Today.md"]
//! ```
//!
//! Output layout:
//!
//! ```markdown
//! ### Last obsync: 09:30:00 2026-10-19
//!
//!
//! ---
//!
//! # File name: Roadmap
//!
//! <normalized note body>
//! ```

use crate::content::{Clock, ContentGenerator};
use crate::fs::{is_vault_relative, FileSystem, FsError};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Config file '{0}' not found")]
    MissingTargets(String),

    #[error("'{path}' must contain a JSON array of file paths: {reason}")]
    InvalidTargets { path: String, reason: String },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: FsError,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

pub type Result<T> = std::result::Result<T, SummaryError>;

/// Where the summary reads its target list and writes its output.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Vault-relative JSON file listing the notes to include
    pub targets_file: String,
    /// Vault-relative output file
    pub output_file: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            targets_file: "target_paths.json".to_string(),
            output_file: "README.md".to_string(),
        }
    }
}

/// Builds the summary file from the listed notes.
pub struct SummaryGenerator<F> {
    fs: F,
    config: SummaryConfig,
    clock: Clock,
}

impl<F: FileSystem> SummaryGenerator<F> {
    pub fn new(fs: F, config: SummaryConfig, clock: Clock) -> Self {
        Self { fs, config, clock }
    }

    /// Render the summary and write it to the output file.
    ///
    /// Listed notes that are missing, unreadable or outside the vault are
    /// skipped with a warning.
    pub async fn write_summary(&self) -> Result<()> {
        let targets = self.load_targets().await?;
        let content = self.render(&targets).await?;

        let output = &self.config.output_file;
        self.fs
            .write(output, content.as_bytes())
            .await
            .map_err(|source| SummaryError::Write {
                path: output.clone(),
                source,
            })?;
        info!("Done generating '{}'", output);
        Ok(())
    }

    async fn load_targets(&self) -> Result<Vec<String>> {
        let path = &self.config.targets_file;
        if !self.fs.exists(path).await? {
            return Err(SummaryError::MissingTargets(path.clone()));
        }

        let raw = self.fs.read(path).await?;
        serde_json::from_slice::<Vec<String>>(&raw).map_err(|e| SummaryError::InvalidTargets {
            path: path.clone(),
            reason: e.to_string(),
        })
    }

    async fn render(&self, targets: &[String]) -> Result<String> {
        let mut content = format!("### Last obsync: {}\n", (self.clock)());

        for path in targets {
            if !is_vault_relative(path) {
                warn!("'{}' is not inside the vault, leaving it out of the summary", path);
                continue;
            }
            if !self.fs.exists(path).await? {
                warn!("File '{}' not found, leaving it out of the summary", path);
                continue;
            }
            // Folders and unreadable entries are skipped like missing files.
            let raw = match self.fs.read(path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Cannot read '{}', leaving it out of the summary: {}", path, e);
                    continue;
                }
            };
            let body = normalize_line_breaks(&String::from_utf8_lossy(&raw));

            content.push_str("\n\n---\n\n");
            content.push_str(&format!("# File name: {}\n\n", basename(path)));
            content.push_str(&body);
        }

        Ok(content)
    }
}

#[async_trait]
impl<F: FileSystem> ContentGenerator for SummaryGenerator<F> {
    async fn generate(&self) -> anyhow::Result<()> {
        Ok(self.write_summary().await?)
    }
}

/// Normalize Windows line endings, then make every line break a paragraph
/// break: each run of newlines becomes exactly one blank line.
pub fn normalize_line_breaks(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\n' {
            out.push(c);
            continue;
        }
        while chars.peek() == Some(&'\n') {
            chars.next();
        }
        out.push_str("\n\n");
    }
    out
}

/// File name without directory or extension ("Daily/Today.md" → "Today").
fn basename(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}
