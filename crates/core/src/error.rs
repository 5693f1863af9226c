// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the synchronization primitives

use crate::bridge::WaitOutcome;
use thiserror::Error;

/// Errors raised by locks, latches and named mutexes.
///
/// Timeouts and cancellations are only errors on the blocking `wait`/`acquire`
/// paths; the `try_*` operations report them as an [`Acquisition`] instead.
///
/// [`Acquisition`]: crate::Acquisition
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to acquire {resource}: {outcome}")]
    AcquisitionFailed {
        resource: String,
        outcome: WaitOutcome,
    },

    #[error("wait on {resource} ended without a value: {outcome}")]
    WaitFailed {
        resource: String,
        outcome: WaitOutcome,
    },

    #[error("latch is already set")]
    LatchAlreadySet,

    #[error("{resource} has been closed")]
    Closed { resource: String },

    #[error("invalid semaphore permits: initial {initial}, max {max}")]
    InvalidPermits { initial: usize, max: usize },

    #[error("semaphore released more times than it was acquired")]
    Overreleased,

    #[error("invalid mutex name {0:?}: nothing left after normalization")]
    InvalidName(String),

    #[error("acquisition worker for {resource} exited without reporting")]
    WorkerLost { resource: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
