// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::ScopedLock;
use crate::bridge::WaitOutcome;
use crate::cancel::CancelToken;
use crate::error::SyncError;
use crate::guard::{Acquisition, LockGuard};
use crate::semaphore::Semaphore;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Lock admitting up to `max_entries` concurrent holders.
///
/// Dropping the lock closes the semaphore: pending waits time out, while
/// guards handed out earlier still release (as no-ops) on their own.
pub struct SemaphoreLock {
    name: String,
    semaphore: Arc<Semaphore>,
}

impl SemaphoreLock {
    pub fn new(name: impl Into<String>, max_entries: usize) -> Result<Self, SyncError> {
        Ok(Self {
            name: name.into(),
            semaphore: Arc::new(Semaphore::new(max_entries)?),
        })
    }

    pub fn max_entries(&self) -> usize {
        self.semaphore.max_permits()
    }

    /// Entries currently free
    pub fn available(&self) -> usize {
        self.semaphore.available()
    }

    pub fn close(&self) {
        tracing::debug!(lock = %self.name, "closing semaphore lock");
        self.semaphore.close();
    }

    fn ensure_open(&self) -> Result<(), SyncError> {
        if self.semaphore.is_closed() {
            return Err(SyncError::Closed {
                resource: self.name.clone(),
            });
        }
        Ok(())
    }

    fn finish(&self, outcome: WaitOutcome) -> Acquisition {
        if !outcome.is_signaled() {
            tracing::debug!(lock = %self.name, %outcome, "semaphore lock not acquired");
            return Acquisition::denied(outcome);
        }

        tracing::debug!(lock = %self.name, "semaphore lock acquired");
        let semaphore = Arc::clone(&self.semaphore);
        let name = self.name.clone();
        Acquisition::granted(LockGuard::new(move || {
            if let Err(e) = semaphore.release() {
                tracing::warn!(lock = %name, error = %e, "failed to release semaphore lock");
            } else {
                tracing::debug!(lock = %name, "semaphore lock released");
            }
        }))
    }
}

#[async_trait]
impl ScopedLock for SemaphoreLock {
    fn resource(&self) -> &str {
        &self.name
    }

    fn try_wait_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError> {
        self.ensure_open()?;
        let outcome = self.semaphore.wait(timeout, cancel);
        Ok(self.finish(outcome))
    }

    async fn try_acquire_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError> {
        self.ensure_open()?;
        let outcome = self.semaphore.wait_async(timeout, cancel).await;
        Ok(self.finish(outcome))
    }
}

impl Drop for SemaphoreLock {
    fn drop(&mut self) {
        self.semaphore.close();
    }
}
