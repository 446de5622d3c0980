//! `VersionControl` backed by the system `git` binary.
//!
//! Each operation spawns one `git -C <vault> ...` subprocess through
//! `tokio::process`, so every call is a suspension point for the engine.
//! Non-zero exits are mapped to typed `VcsError`s carrying the captured
//! error text.

use crate::vcs::{AheadBehind, Result, VcsError, VersionControl};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Settings for the git gateway.
#[derive(Debug, Clone)]
pub struct GitConfig {
    /// The single remote the vault syncs with
    pub remote: String,
    /// Per-command timeout. `None` waits for git indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            timeout: None,
        }
    }
}

/// Captured result of one git invocation.
#[derive(Debug)]
struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl GitOutput {
    /// Text describing a failure. Some git commands (e.g. `commit` with
    /// nothing staged) report on stdout only.
    fn failure_text(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            self.stderr.clone()
        }
    }
}

/// Git gateway for one working directory.
pub struct GitCli {
    work_dir: PathBuf,
    config: GitConfig,
}

impl GitCli {
    pub fn new(work_dir: impl Into<PathBuf>, config: GitConfig) -> Self {
        Self {
            work_dir: work_dir.into(),
            config,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn remote(&self) -> &str {
        &self.config.remote
    }

    /// Base command: runs against the vault, never prompts for credentials,
    /// and is killed if the caller stops waiting for it.
    fn git_cmd(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.work_dir);
        cmd.arg("-c").arg("core.quotePath=false");
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);
        cmd
    }

    async fn run(&self, args: &[&str]) -> Result<GitOutput> {
        let command = format!("git {}", args.join(" "));
        debug!("Running {}", command);

        let mut cmd = self.git_cmd();
        cmd.args(args);

        let output = match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, cmd.output())
                .await
                .map_err(|_| VcsError::TimedOut {
                    command: command.clone(),
                    timeout,
                })?,
            None => cmd.output().await,
        }
        .map_err(|e| VcsError::Spawn {
            command: command.clone(),
            message: e.to_string(),
        })?;

        let output = GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };
        debug!("{} exited (success={})", command, output.success);
        Ok(output)
    }

    /// Run a command whose only failure mode is an unclassified backend error.
    async fn ok(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args).await?;
        if !output.success {
            return Err(VcsError::Backend {
                command: format!("git {}", args.join(" ")),
                stderr: output.failure_text(),
            });
        }
        Ok(output.stdout)
    }
}

/// Parse `git rev-list --left-right --count @{upstream}...HEAD` output.
///
/// The left column counts upstream-only commits (behind), the right column
/// local-only commits (ahead).
fn parse_ahead_behind(output: &str) -> Option<AheadBehind> {
    let mut counts = output.split_whitespace();
    let behind = counts.next()?.parse().ok()?;
    let ahead = counts.next()?.parse().ok()?;
    if counts.next().is_some() {
        return None;
    }
    Some(AheadBehind { ahead, behind })
}

#[async_trait]
impl VersionControl for GitCli {
    async fn ensure_repository(&self) -> Result<()> {
        let output = self.run(&["rev-parse", "--is-inside-work-tree"]).await?;
        if !output.success || output.stdout != "true" {
            return Err(VcsError::NotARepository {
                path: self.work_dir.clone(),
            });
        }
        Ok(())
    }

    async fn fetch_remote(&self) -> Result<()> {
        let remote = self.config.remote.as_str();
        let output = self.run(&["fetch", "--prune", remote]).await?;
        if !output.success {
            return Err(VcsError::FetchFailed {
                remote: remote.to_string(),
                stderr: output.failure_text(),
            });
        }
        Ok(())
    }

    async fn local_status(&self) -> Result<String> {
        self.ok(&["status", "--porcelain"]).await
    }

    async fn ahead_behind(&self) -> Result<AheadBehind> {
        let args = ["rev-list", "--left-right", "--count", "@{upstream}...HEAD"];
        let stdout = self.ok(&args).await?;
        parse_ahead_behind(&stdout).ok_or_else(|| VcsError::Backend {
            command: format!("git {}", args.join(" ")),
            stderr: format!("unexpected ahead/behind output: {:?}", stdout),
        })
    }

    async fn stage_all(&self) -> Result<()> {
        self.ok(&["add", "--all"]).await.map(|_| ())
    }

    async fn commit(&self, message: &str) -> Result<()> {
        let output = self.run(&["commit", "-m", message]).await?;
        if !output.success {
            return Err(VcsError::CommitFailed {
                stderr: output.failure_text(),
            });
        }
        Ok(())
    }

    async fn push(&self) -> Result<()> {
        let remote = self.config.remote.as_str();
        let output = self.run(&["push", remote, "HEAD"]).await?;
        if !output.success {
            return Err(VcsError::PushFailed {
                remote: remote.to_string(),
                stderr: output.failure_text(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let git = GitCli::new(
            "/vaults/notes",
            GitConfig {
                remote: "backup".into(),
                timeout: None,
            },
        );
        assert_eq!(git.work_dir(), Path::new("/vaults/notes"));
        assert_eq!(git.remote(), "backup");

        let git = GitCli::new("/vaults/notes", GitConfig::default());
        assert_eq!(git.remote(), "origin");
    }

    #[test]
    fn test_parse_ahead_behind() {
        assert_eq!(parse_ahead_behind("0\t0"), Some(AheadBehind::new(0, 0)));
        assert_eq!(parse_ahead_behind("3\t1"), Some(AheadBehind::new(1, 3)));
        assert_eq!(parse_ahead_behind("  2   5 "), Some(AheadBehind::new(5, 2)));
    }

    #[test]
    fn test_parse_ahead_behind_rejects_garbage() {
        assert_eq!(parse_ahead_behind(""), None);
        assert_eq!(parse_ahead_behind("4"), None);
        assert_eq!(parse_ahead_behind("a\tb"), None);
        assert_eq!(parse_ahead_behind("-1\t0"), None);
        assert_eq!(parse_ahead_behind("1\t2\t3"), None);
    }

    #[test]
    fn test_failure_text_falls_back_to_stdout() {
        let output = GitOutput {
            success: false,
            stdout: "nothing to commit, working tree clean".into(),
            stderr: String::new(),
        };
        assert_eq!(output.failure_text(), "nothing to commit, working tree clean");

        let output = GitOutput {
            success: false,
            stdout: "ignored".into(),
            stderr: "fatal: bad".into(),
        };
        assert_eq!(output.failure_text(), "fatal: bad");
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_a_repository_or_spawn_error() {
        let git = GitCli::new("/definitely/not/a/vault/path", GitConfig::default());
        let err = git.ensure_repository().await.unwrap_err();
        assert!(matches!(
            err,
            VcsError::NotARepository { .. } | VcsError::Spawn { .. }
        ));
    }
}
