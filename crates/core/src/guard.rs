// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped ownership tokens
//!
//! A [`LockGuard`] owns the release action of one successful acquisition. The
//! action runs at most once: on the first explicit [`LockGuard::release`] or
//! when the guard is dropped, whichever comes first.

use crate::bridge::WaitOutcome;
use crate::error::SyncError;
use crate::named::OwnerRecord;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type ReleaseFn = Box<dyn FnOnce() + Send>;

/// Exclusive ownership of a resource, released on every exit path
pub struct LockGuard {
    action: Mutex<Option<ReleaseFn>>,
    released: AtomicBool,
}

impl LockGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Mutex::new(Some(Box::new(release))),
            released: AtomicBool::new(false),
        }
    }

    /// A guard that owns nothing
    pub fn noop() -> Self {
        Self {
            action: Mutex::new(None),
            released: AtomicBool::new(true),
        }
    }

    /// Run the release action if it has not run yet.
    ///
    /// Concurrent callers are serialized: the losers return once the winner's
    /// release has finished.
    pub fn release(&self) {
        let mut action = self.action.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(release) = action.take() {
            self.released.store(true, Ordering::Release);
            release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Result of a `try_*` acquisition. Never an error for timeouts or cancellation.
#[derive(Debug)]
pub struct Acquisition {
    outcome: WaitOutcome,
    abandoned: bool,
    previous_owner: Option<OwnerRecord>,
    guard: LockGuard,
}

impl Acquisition {
    pub(crate) fn granted(guard: LockGuard) -> Self {
        Self {
            outcome: WaitOutcome::Signaled,
            abandoned: false,
            previous_owner: None,
            guard,
        }
    }

    /// Ownership transferred from a holder that never released
    pub(crate) fn abandoned(guard: LockGuard, previous_owner: Option<OwnerRecord>) -> Self {
        Self {
            outcome: WaitOutcome::Signaled,
            abandoned: true,
            previous_owner,
            guard,
        }
    }

    pub(crate) fn denied(outcome: WaitOutcome) -> Self {
        Self {
            outcome,
            abandoned: false,
            previous_owner: None,
            guard: LockGuard::noop(),
        }
    }

    pub fn acquired(&self) -> bool {
        self.outcome.is_signaled()
    }

    pub fn outcome(&self) -> WaitOutcome {
        self.outcome
    }

    /// Whether the previous holder terminated without releasing.
    ///
    /// The lock is held either way; what it protected may be inconsistent.
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Owner record left behind by the holder that abandoned the lock, if readable
    pub fn previous_owner(&self) -> Option<&OwnerRecord> {
        self.previous_owner.as_ref()
    }

    pub fn guard(&self) -> &LockGuard {
        &self.guard
    }

    pub fn into_guard(self) -> LockGuard {
        self.guard
    }

    pub fn release(&self) {
        self.guard.release();
    }

    /// Turn a failed acquisition into [`SyncError::AcquisitionFailed`].
    pub fn into_result(self, resource: &str) -> Result<LockGuard, SyncError> {
        if self.acquired() {
            Ok(self.guard)
        } else {
            Err(SyncError::AcquisitionFailed {
                resource: resource.to_string(),
                outcome: self.outcome,
            })
        }
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
