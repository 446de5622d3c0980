//! Single-flight guard for sync attempts.
//!
//! `ExclusivityGuard` lets at most one unit of work run at a time. A second
//! caller is turned away immediately with `AlreadyRunning` instead of being
//! queued or blocked. The busy flag is released by a drop guard, so it is
//! cleared on success, on error, on panic, and when the running future is
//! dropped mid-flight.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Returned when a unit of work is already running under the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("A sync is already in progress")]
pub struct AlreadyRunning;

/// Owns the busy flag for one engine instance.
#[derive(Debug, Default)]
pub struct ExclusivityGuard {
    busy: AtomicBool,
}

/// Held while a unit of work runs. Clears the busy flag when dropped.
#[derive(Debug)]
pub struct BusyLease<'a> {
    guard: &'a ExclusivityGuard,
}

impl Drop for BusyLease<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

impl ExclusivityGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a unit of work is currently running. Never blocks.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark the guard busy, or fail if it already is.
    ///
    /// Not reentrant: acquiring from inside a running unit fails the same way
    /// an outside caller would.
    pub fn try_acquire(&self) -> Result<BusyLease<'_>, AlreadyRunning> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyLease { guard: self })
            .map_err(|_| AlreadyRunning)
    }

    /// Run `work` exclusively.
    ///
    /// `work` is only constructed once the flag is held, so nothing runs when
    /// the guard is busy.
    pub async fn run_exclusive<F, Fut, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AlreadyRunning>,
    {
        let _lease = self.try_acquire()?;
        work().await
    }
}
