// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-once variable that blocks readers until it is set

use crate::bridge::WaitOutcome;
use crate::cancel::CancelToken;
use crate::error::SyncError;
use crate::gate::Gate;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

const RESOURCE: &str = "latch";

/// Single-assignment value with blocking and async waits.
///
/// [`Latch::unset`] exists so a latch can be reused, but it is not a safe
/// reset: a waiter racing an `unset` followed by a new `set` may observe
/// either value.
pub struct Latch<T> {
    value: Mutex<Option<T>>,
    gate: Gate,
}

impl<T> Default for Latch<T> {
    fn default() -> Self {
        Self {
            value: Mutex::new(None),
            gate: Gate::manual(),
        }
    }
}

impl<T: Clone + Send> Latch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<T>> {
        self.value.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store the value and release all waiters.
    ///
    /// Setting twice without an `unset` in between fails: it almost always
    /// means two producers think they own the result.
    pub fn set(&self, value: T) -> Result<(), SyncError> {
        // Gate changes happen under the slot lock so the gate is open
        // exactly when the slot is full
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(SyncError::LatchAlreadySet);
        }
        *slot = Some(value);
        self.gate.set();
        drop(slot);
        tracing::trace!("latch set");
        Ok(())
    }

    pub fn unset(&self) {
        let mut slot = self.slot();
        self.gate.reset();
        *slot = None;
        drop(slot);
        tracing::trace!("latch unset");
    }

    pub fn is_set(&self) -> bool {
        self.slot().is_some()
    }

    pub fn try_get(&self) -> Option<T> {
        self.slot().clone()
    }

    /// Block until the latch is set.
    pub fn wait(&self) -> T {
        loop {
            if let Some(value) = self.try_get() {
                return value;
            }
            self.gate.wait(None, &CancelToken::none());
        }
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Result<T, SyncError> {
        self.wait_with(Some(timeout), &CancelToken::none())
    }

    pub fn wait_cancel(&self, cancel: &CancelToken) -> Result<T, SyncError> {
        self.wait_with(None, cancel)
    }

    pub fn wait_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<T, SyncError> {
        let deadline = Deadline::new(timeout);
        loop {
            match self.gate.wait(deadline.remaining(), cancel) {
                WaitOutcome::Signaled => {
                    // A racing unset can clear the slot after the gate opened
                    if let Some(value) = self.try_get() {
                        return Ok(value);
                    }
                }
                outcome => return Err(wait_failed(outcome)),
            }
        }
    }

    pub async fn wait_async(&self) -> T {
        loop {
            if let Some(value) = self.try_get() {
                return value;
            }
            self.gate.wait_async(None, &CancelToken::none()).await;
        }
    }

    pub async fn wait_async_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<T, SyncError> {
        let deadline = Deadline::new(timeout);
        loop {
            match self.gate.wait_async(deadline.remaining(), cancel).await {
                WaitOutcome::Signaled => {
                    if let Some(value) = self.try_get() {
                        return Ok(value);
                    }
                }
                outcome => return Err(wait_failed(outcome)),
            }
        }
    }
}

fn wait_failed(outcome: WaitOutcome) -> SyncError {
    SyncError::WaitFailed {
        resource: RESOURCE.to_string(),
        outcome,
    }
}

/// Timeout budget carried across retries
struct Deadline(Option<Instant>);

impl Deadline {
    fn new(timeout: Option<Duration>) -> Self {
        Self(timeout.and_then(|t| Instant::now().checked_add(t)))
    }

    fn remaining(&self) -> Option<Duration> {
        self.0.map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
#[path = "latch_tests.rs"]
mod tests;
