// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binary gate (event) primitive
//!
//! A manual-reset gate stays open until reset and releases every waiter; an
//! auto-reset gate lets exactly one waiter through per `set`.

use crate::bridge::{
    self, Registration, WaitFuture, WaitOutcome, WaitSlot, Waitable, WaiterKey, WaiterList,
};
use crate::cancel::CancelToken;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetMode {
    Manual,
    Auto,
}

struct GateState {
    signaled: bool,
    closed: bool,
    waiters: WaiterList,
}

/// Signaled/unsignaled gate usable from threads and tasks
pub struct Gate {
    mode: ResetMode,
    state: Mutex<GateState>,
}

impl Gate {
    pub fn new(mode: ResetMode, initially_set: bool) -> Self {
        Self {
            mode,
            state: Mutex::new(GateState {
                signaled: initially_set,
                closed: false,
                waiters: WaiterList::new(),
            }),
        }
    }

    pub fn manual() -> Self {
        Self::new(ResetMode::Manual, false)
    }

    pub fn auto() -> Self {
        Self::new(ResetMode::Auto, false)
    }

    pub fn mode(&self) -> ResetMode {
        self.mode
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open the gate.
    ///
    /// An auto-reset gate with a queued waiter hands the signal straight to
    /// that waiter and stays closed.
    pub fn set(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        match self.mode {
            ResetMode::Manual => {
                state.signaled = true;
                state.waiters.grant_all();
            }
            ResetMode::Auto => {
                if !state.waiters.grant_one() {
                    state.signaled = true;
                }
            }
        }
    }

    pub fn reset(&self) {
        self.lock().signaled = false;
    }

    pub fn is_set(&self) -> bool {
        self.lock().signaled
    }

    /// Tear the gate down. Outstanding and future waits time out.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.signaled = false;
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

impl Waitable for Gate {
    fn try_take(&self) -> bool {
        let mut state = self.lock();
        if !state.signaled {
            return false;
        }
        if self.mode == ResetMode::Auto {
            state.signaled = false;
        }
        true
    }

    fn register(&self, slot: &Arc<WaitSlot>, on_signal: WaitOutcome) -> Registration {
        let mut state = self.lock();
        if state.closed {
            return Registration::Closed;
        }
        if state.signaled {
            if self.mode == ResetMode::Auto {
                state.signaled = false;
            }
            return Registration::Ready;
        }
        Registration::Queued(state.waiters.push(slot, on_signal))
    }

    fn unregister(&self, key: WaiterKey) {
        self.lock().waiters.remove(key);
    }

    fn restore(&self) {
        if self.mode == ResetMode::Auto {
            self.set();
        }
    }

    fn waiter_count(&self) -> usize {
        self.lock().waiters.len()
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
