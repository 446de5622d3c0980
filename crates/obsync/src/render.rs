//! User-facing text for outcomes, failures and progress events.
//!
//! Every outcome and every failure kind gets its own message: remote-ahead
//! needs a manual merge, a failed push needs a retry, and a busy engine
//! needs the user to wait.

use obsync_core::{DivergenceState, FailureKind, SyncError, SyncEvent, SyncOutcome};
use std::io::{self, BufRead, Write};

pub fn outcome_message(outcome: SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Success => "Obsync success.",
        SyncOutcome::NoChanges => "No changes to sync.",
        SyncOutcome::RemoteAhead => "Remote has new commits. Pull/rebase manually first.",
    }
}

fn failure_headline(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::AlreadyRunning => "Obsync is already running...",
        FailureKind::NotARepository => "Vault is not a git repository.",
        FailureKind::FetchFailed => "Could not fetch from the remote.",
        FailureKind::CommitFailed => "Could not commit local changes.",
        FailureKind::PushFailed => "Push failed. Run obsync again to retry the push.",
        FailureKind::TimedOut => "Git took too long and was stopped.",
        FailureKind::Backend => "Git failed.",
    }
}

/// Headline for the failure kind, then the underlying error text.
pub fn failure_message(err: &SyncError) -> String {
    match err {
        SyncError::AlreadyRunning(_) => failure_headline(err.kind()).to_string(),
        SyncError::Vcs(inner) => format!("{}\n  {}", failure_headline(err.kind()), inner),
    }
}

pub fn state_message(state: DivergenceState) -> &'static str {
    match state {
        DivergenceState::Clean => "In sync with the remote.",
        DivergenceState::DirtyLocal => "Local changes not yet committed.",
        DivergenceState::AheadOnly => "Local commits not yet pushed.",
        DivergenceState::RemoteAhead => "Remote has commits this vault lacks. Merge manually.",
    }
}

/// Process exit status: 0 when nothing needs attention, 2 when the remote is
/// ahead, 1 on failure.
pub fn exit_status(result: &Result<SyncOutcome, SyncError>) -> u8 {
    match result {
        Ok(SyncOutcome::Success | SyncOutcome::NoChanges) => 0,
        Ok(SyncOutcome::RemoteAhead) => 2,
        Err(_) => 1,
    }
}

/// Progress line for the status indicator, if the event warrants one.
/// Terminal events are rendered from the result instead.
pub fn event_line(event: &SyncEvent) -> Option<String> {
    match event {
        SyncEvent::Started => Some("Obsyncing...".to_string()),
        SyncEvent::ContentGenerationFailed { message } => {
            Some(format!("Notice: summary not generated ({})", message))
        }
        SyncEvent::Committed { message } => Some(format!("Committed \"{}\"", message)),
        SyncEvent::Pushed => Some("Pushed.".to_string()),
        SyncEvent::StateComputed { .. } | SyncEvent::Finished { .. } | SyncEvent::Failed { .. } => {
            None
        }
    }
}

/// Ask a yes/no question. Anything but `y`/`yes` is a no.
pub fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
