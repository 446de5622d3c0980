//! End-to-end tests for the `obsync` binary.
//!
//! Runs the built binary against a bare remote and a vault clone in a temp
//! directory. Skipped when no `git` binary is available.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use obsync::StateStore;
use obsync_core::SyncOutcome;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "Obsync Test"]);
    git(dir, &["config", "user.email", "obsync@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

struct Fixture {
    root: TempDir,
    remote: PathBuf,
    vault: PathBuf,
    state_file: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let remote = root.path().join("remote.git");
        git(root.path(), &["init", "--bare", "remote.git"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        git(root.path(), &["clone", remote.to_str().unwrap(), "vault"]);
        let vault = root.path().join("vault");
        configure_identity(&vault);
        git(&vault, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        std::fs::write(vault.join("Welcome.md"), "# Welcome\n").unwrap();
        git(&vault, &["add", "--all"]);
        git(&vault, &["commit", "-m", "initial"]);
        git(&vault, &["push", "-u", "origin", "main"]);

        // Outside the vault so recording a sync leaves it clean
        let state_file = root.path().join("state").join("state.json");

        Self {
            root,
            remote,
            vault,
            state_file,
        }
    }

    /// Run `obsync` with `args`, feeding `stdin`.
    fn obsync(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_obsync"))
            .args(args)
            .arg("--vault")
            .arg(&self.vault)
            .arg("--state-file")
            .arg(&self.state_file)
            .env_remove("OBSYNC_VAULT_PATH")
            .env_remove("OBSYNC_STATE_FILE")
            .env("RUST_LOG", "off")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to run obsync");

        child
            .stdin
            .take()
            .unwrap()
            .write_all(stdin.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }

    fn remote_commit_count(&self) -> u64 {
        git(&self.remote, &["rev-list", "--count", "main"]).parse().unwrap()
    }

    fn last_sync(&self) -> Option<SyncOutcome> {
        let store = StateStore::open(&self.state_file);
        store
            .last_sync(&self.vault.display().to_string())
            .map(|r| r.outcome)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

macro_rules! require_git {
    () => {
        if !git_available() {
            eprintln!("git not available, skipping");
            return;
        }
    };
}

// ============================================================================
// Sync
// ============================================================================

#[test]
fn test_sync_with_summary() {
    require_git!();
    let fixture = Fixture::new();
    std::fs::write(fixture.vault.join("Todo.md"), "one\r\n\r\n\r\ntwo\n").unwrap();
    std::fs::write(fixture.vault.join("target_paths.json"), r#"["Todo.md"]"#).unwrap();

    let output = fixture.obsync(&["sync", "--yes"], "");

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Obsyncing..."));
    assert!(out.contains("Obsync success."));
    assert_eq!(fixture.remote_commit_count(), 2);

    let readme = git(&fixture.remote, &["show", "main:README.md"]);
    assert!(readme.starts_with("### Last obsync: "));
    assert!(readme.ends_with("# File name: Todo\n\none\n\ntwo"));
    assert_eq!(fixture.last_sync(), Some(SyncOutcome::Success));
    assert_eq!(git(&fixture.vault, &["status", "--porcelain"]), "");
}

#[test]
fn test_missing_targets_file_is_a_notice() {
    require_git!();
    let fixture = Fixture::new();
    std::fs::write(fixture.vault.join("Daily.md"), "today\n").unwrap();

    let output = fixture.obsync(&["sync", "--yes"], "");

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Notice: summary not generated"));
    assert!(out.contains("Obsync success."));
    assert_eq!(fixture.remote_commit_count(), 2);
}

#[test]
fn test_clean_vault() {
    require_git!();
    let fixture = Fixture::new();

    let output = fixture.obsync(&["--no-summary", "sync", "-y"], "");

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("No changes to sync."));
    assert_eq!(fixture.last_sync(), Some(SyncOutcome::NoChanges));
}

#[test]
fn test_declined_confirmation_changes_nothing() {
    require_git!();
    let fixture = Fixture::new();
    std::fs::write(fixture.vault.join("Daily.md"), "today\n").unwrap();

    let output = fixture.obsync(&["sync"], "n\n");

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("[y/N]"));
    assert!(out.contains("Cancelled."));
    assert_eq!(fixture.remote_commit_count(), 1);
    assert!(fixture.last_sync().is_none());
}

#[test]
fn test_default_command_is_sync() {
    require_git!();
    let fixture = Fixture::new();
    std::fs::write(fixture.vault.join("Daily.md"), "today\n").unwrap();

    let output = fixture.obsync(&["--no-summary"], "yes\n");

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Obsync success."));
    assert_eq!(fixture.remote_commit_count(), 2);
}

#[test]
fn test_remote_ahead_exits_with_two() {
    require_git!();
    let fixture = Fixture::new();
    git(fixture.root.path(), &["clone", fixture.remote.to_str().unwrap(), "laptop"]);
    let laptop = fixture.root.path().join("laptop");
    configure_identity(&laptop);
    std::fs::write(laptop.join("FromLaptop.md"), "hello\n").unwrap();
    git(&laptop, &["add", "--all"]);
    git(&laptop, &["commit", "-m", "from laptop"]);
    git(&laptop, &["push", "origin", "HEAD"]);

    let output = fixture.obsync(&["sync", "--yes"], "");

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("Remote has new commits. Pull/rebase manually first."));
    assert!(fixture.last_sync().is_none());
}

#[test]
fn test_corrupt_state_file_does_not_block_sync() {
    require_git!();
    let fixture = Fixture::new();
    std::fs::create_dir_all(fixture.state_file.parent().unwrap()).unwrap();
    std::fs::write(&fixture.state_file, "{not json").unwrap();
    std::fs::write(fixture.vault.join("Daily.md"), "today\n").unwrap();

    let output = fixture.obsync(&["--no-summary", "sync", "--yes"], "");

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Obsync success."));
    assert_eq!(fixture.remote_commit_count(), 2);
    assert_eq!(fixture.last_sync(), Some(SyncOutcome::Success));
}

#[test]
fn test_not_a_repository_exits_with_one() {
    require_git!();
    let fixture = Fixture::new();
    std::fs::remove_dir_all(fixture.vault.join(".git")).unwrap();

    let output = fixture.obsync(&["sync", "--yes"], "");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Vault is not a git repository."));
}

// ============================================================================
// Status
// ============================================================================

#[test]
fn test_status_before_and_after_sync() {
    require_git!();
    let fixture = Fixture::new();
    std::fs::write(fixture.vault.join("Daily.md"), "today\n").unwrap();

    let before = fixture.obsync(&["status"], "");
    assert_eq!(before.status.code(), Some(0), "{}", stderr(&before));
    let out = stdout(&before);
    assert!(out.contains("Last obsync: ~"));
    assert!(out.contains("Local changes not yet committed."));

    fixture.obsync(&["--no-summary", "sync", "--yes"], "");

    let after = fixture.obsync(&["status"], "");
    let out = stdout(&after);
    assert!(out.contains("(success)"));
    assert!(out.contains("In sync with the remote."));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_missing_vault_is_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_obsync"))
        .args(["status", "--state-file", "/tmp/obsync-unused.json"])
        .env_remove("OBSYNC_VAULT_PATH")
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No vault given"));
}
