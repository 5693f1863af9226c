// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process counting semaphore
//!
//! Permits released while waiters are queued are handed directly to the first
//! waiter still waiting, so a released permit can't be stolen by a late
//! `try_take` ahead of a parked waiter.

use crate::bridge::{
    self, Registration, WaitFuture, WaitOutcome, WaitSlot, Waitable, WaiterKey, WaiterList,
};
use crate::cancel::CancelToken;
use crate::error::SyncError;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

struct SemaphoreState {
    available: usize,
    closed: bool,
    waiters: WaiterList,
}

/// Counting semaphore bounded by `max` permits
pub struct Semaphore {
    max: usize,
    state: Mutex<SemaphoreState>,
}

impl Semaphore {
    /// Semaphore with every permit available.
    pub fn new(permits: usize) -> Result<Self, SyncError> {
        Self::with_initial(permits, permits)
    }

    pub fn with_initial(initial: usize, max: usize) -> Result<Self, SyncError> {
        if max == 0 || initial > max {
            return Err(SyncError::InvalidPermits { initial, max });
        }
        Ok(Self {
            max,
            state: Mutex::new(SemaphoreState {
                available: initial,
                closed: false,
                waiters: WaiterList::new(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SemaphoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn max_permits(&self) -> usize {
        self.max
    }

    pub fn available(&self) -> usize {
        self.lock().available
    }

    /// Return one permit.
    ///
    /// Releasing past `max` is a caller bug and is refused. Releasing into a
    /// closed semaphore is a no-op so late guards can still drop cleanly.
    pub fn release(&self) -> Result<(), SyncError> {
        let mut state = self.lock();
        if state.closed || state.waiters.grant_one() {
            return Ok(());
        }
        if state.available >= self.max {
            return Err(SyncError::Overreleased);
        }
        state.available += 1;
        Ok(())
    }

    /// Tear the semaphore down. Outstanding and future waits time out.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.waiters.resolve_all(WaitOutcome::TimedOut);
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn wait(&self, timeout: Option<Duration>, cancel: &CancelToken) -> WaitOutcome {
        bridge::wait_blocking(self, timeout, cancel)
    }

    pub fn wait_async(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> WaitFuture<'_, Self> {
        bridge::wait_async(self, timeout, cancel)
    }
}

impl Waitable for Semaphore {
    fn try_take(&self) -> bool {
        let mut state = self.lock();
        if state.closed || state.available == 0 {
            return false;
        }
        state.available -= 1;
        true
    }

    fn register(&self, slot: &Arc<WaitSlot>, on_signal: WaitOutcome) -> Registration {
        let mut state = self.lock();
        if state.closed {
            return Registration::Closed;
        }
        if state.available > 0 {
            state.available -= 1;
            return Registration::Ready;
        }
        Registration::Queued(state.waiters.push(slot, on_signal))
    }

    fn unregister(&self, key: WaiterKey) {
        self.lock().waiters.remove(key);
    }

    fn restore(&self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "failed to restore unclaimed permit");
        }
    }

    fn waiter_count(&self) -> usize {
        self.lock().waiters.len()
    }
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
