// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped locks
//!
//! Three locks share one contract and differ only in what backs them:
//! - **SemaphoreLock** - counting semaphore admitting up to N holders
//! - **MutexLock** - cross-process named mutex
//! - **SlimLock** - single-holder auto-reset gate, cheapest of the three
//!
//! `try_*` operations report timeouts and cancellation in the returned
//! [`Acquisition`]; `wait*` and `acquire*` turn them into
//! [`SyncError::AcquisitionFailed`].

mod mutex;
mod semaphore;
mod slim;

pub use mutex::MutexLock;
pub use semaphore::SemaphoreLock;
pub use slim::SlimLock;

use crate::cancel::CancelToken;
use crate::error::SyncError;
use crate::guard::{Acquisition, LockGuard};
use async_trait::async_trait;
use std::time::Duration;

/// Mutual exclusion handing out [`LockGuard`]s, usable from threads and tasks
#[async_trait]
pub trait ScopedLock: Send + Sync {
    /// Name used in logs and errors
    fn resource(&self) -> &str;

    /// Block until acquired, timed out or canceled. `None` waits forever.
    fn try_wait_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError>;

    async fn try_acquire_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError>;

    /// Take the lock only if it is free right now
    fn try_wait(&self) -> Result<Acquisition, SyncError> {
        self.try_wait_with(Some(Duration::ZERO), &CancelToken::none())
    }

    fn wait(&self) -> Result<LockGuard, SyncError> {
        self.wait_with(None, &CancelToken::none())
    }

    fn wait_timeout(&self, timeout: Duration) -> Result<LockGuard, SyncError> {
        self.wait_with(Some(timeout), &CancelToken::none())
    }

    fn wait_cancel(&self, cancel: &CancelToken) -> Result<LockGuard, SyncError> {
        self.wait_with(None, cancel)
    }

    fn wait_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<LockGuard, SyncError> {
        self.try_wait_with(timeout, cancel)?.into_result(self.resource())
    }

    async fn try_acquire(&self) -> Result<Acquisition, SyncError> {
        self.try_acquire_with(Some(Duration::ZERO), &CancelToken::none()).await
    }

    async fn acquire(&self) -> Result<LockGuard, SyncError> {
        self.acquire_with(None, &CancelToken::none()).await
    }

    async fn acquire_timeout(&self, timeout: Duration) -> Result<LockGuard, SyncError> {
        self.acquire_with(Some(timeout), &CancelToken::none()).await
    }

    async fn acquire_cancel(&self, cancel: &CancelToken) -> Result<LockGuard, SyncError> {
        self.acquire_with(None, cancel).await
    }

    async fn acquire_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<LockGuard, SyncError> {
        self.try_acquire_with(timeout, cancel)
            .await?
            .into_result(self.resource())
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
