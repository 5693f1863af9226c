// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridge from blocking wait primitives to parked threads and futures
//!
//! A primitive implements [`Waitable`]. A wait registers one [`WaitSlot`] with
//! the primitive and with the caller's cancel token; whichever side completes
//! the slot first decides the [`WaitOutcome`]. Blocking callers park on the
//! slot, async callers get a [`WaitFuture`] that the primitive wakes directly,
//! so no thread is dedicated to a wait and nothing spins.

use crate::cancel::CancelToken;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex};
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};
use tokio::time::Sleep;

/// How a bridged wait ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaitOutcome {
    /// The primitive was signaled and, for consuming primitives, taken
    Signaled,
    /// The timeout elapsed, or the primitive was closed under the waiter
    TimedOut,
    /// The cancel token fired first
    Canceled,
}

impl WaitOutcome {
    pub fn is_signaled(self) -> bool {
        matches!(self, WaitOutcome::Signaled)
    }
}

impl fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WaitOutcome::Signaled => "signaled",
            WaitOutcome::TimedOut => "timed out",
            WaitOutcome::Canceled => "canceled",
        };
        f.write_str(text)
    }
}

struct SlotState {
    outcome: Option<WaitOutcome>,
    waker: Option<Waker>,
}

/// One-shot completion cell shared by a waiter and everything it waits on.
///
/// The first [`complete`](WaitSlot::complete) wins; later calls are ignored
/// and report `false`, which is how a primitive learns that its grant was not
/// taken and must go to the next waiter.
pub struct WaitSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl WaitSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SlotState {
                outcome: None,
                waker: None,
            }),
            ready: Condvar::new(),
        })
    }

    /// Resolve the slot. Returns whether this call decided the outcome.
    pub fn complete(&self, outcome: WaitOutcome) -> bool {
        let waker = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.outcome.is_some() {
                return false;
            }
            state.outcome = Some(outcome);
            state.waker.take()
        };
        self.ready.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
        true
    }

    pub fn outcome(&self) -> Option<WaitOutcome> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).outcome
    }

    /// Park the calling thread until resolved or `deadline` passes.
    fn block_until(&self, deadline: Option<Instant>) -> Option<WaitOutcome> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(outcome) = state.outcome {
                return Some(outcome);
            }
            match deadline {
                None => {
                    state = self.ready.wait(state).unwrap_or_else(|e| e.into_inner());
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    let (guard, _) = self
                        .ready
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(|e| e.into_inner());
                    state = guard;
                }
            }
        }
    }

    fn poll_outcome(&self, cx: &mut Context<'_>) -> Poll<WaitOutcome> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(outcome) = state.outcome {
            return Poll::Ready(outcome);
        }
        match &state.waker {
            Some(waker) if waker.will_wake(cx.waker()) => {}
            _ => state.waker = Some(cx.waker().clone()),
        }
        Poll::Pending
    }
}

/// Handle to a queued registration, used to take it back out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaiterKey(u64);

/// Result of registering a slot with a primitive
#[derive(Debug, PartialEq, Eq)]
pub enum Registration {
    /// The primitive was already signaled; the signal is now owned by the caller
    Ready,
    /// The primitive has been torn down
    Closed,
    /// The slot is queued and will be completed by a later signal
    Queued(WaiterKey),
}

/// A blocking primitive that can hand its signal to registered waiters.
pub trait Waitable: Send + Sync {
    /// Take a pending signal without blocking.
    fn try_take(&self) -> bool;

    /// Check for a signal and enqueue `slot` atomically.
    ///
    /// Queued slots are completed with `on_signal` when the primitive grants
    /// them a signal.
    fn register(&self, slot: &Arc<WaitSlot>, on_signal: WaitOutcome) -> Registration;

    fn unregister(&self, key: WaiterKey);

    /// Give back a signal granted to a waiter that went away without using it.
    fn restore(&self) {}

    /// Number of queued registrations
    fn waiter_count(&self) -> usize;
}

struct Waiter {
    key: WaiterKey,
    slot: Arc<WaitSlot>,
    on_signal: WaitOutcome,
}

/// FIFO of registered slots, shared by the primitives in this crate.
#[derive(Default)]
pub struct WaiterList {
    waiters: VecDeque<Waiter>,
    next_key: u64,
}

impl WaiterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, slot: &Arc<WaitSlot>, on_signal: WaitOutcome) -> WaiterKey {
        let key = WaiterKey(self.next_key);
        self.next_key = self.next_key.wrapping_add(1);
        self.waiters.push_back(Waiter {
            key,
            slot: Arc::clone(slot),
            on_signal,
        });
        key
    }

    pub fn remove(&mut self, key: WaiterKey) {
        if let Some(pos) = self.waiters.iter().position(|w| w.key == key) {
            self.waiters.remove(pos);
        }
    }

    /// Hand one signal to the first waiter still waiting.
    ///
    /// Waiters already resolved by a timeout or cancellation are dropped on
    /// the way. Returns `false` if nobody took the signal.
    pub fn grant_one(&mut self) -> bool {
        while let Some(waiter) = self.waiters.pop_front() {
            if waiter.slot.complete(waiter.on_signal) {
                return true;
            }
        }
        false
    }

    pub fn grant_all(&mut self) {
        for waiter in self.waiters.drain(..) {
            waiter.slot.complete(waiter.on_signal);
        }
    }

    /// Resolve every waiter with `outcome` regardless of what it waited for.
    pub fn resolve_all(&mut self, outcome: WaitOutcome) {
        for waiter in self.waiters.drain(..) {
            waiter.slot.complete(outcome);
        }
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}

#[derive(Clone, Copy, Default)]
struct Keys {
    primitive: Option<WaiterKey>,
    cancel: Option<WaiterKey>,
}

fn fast_path<W: Waitable + ?Sized>(
    primitive: &W,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> Option<WaitOutcome> {
    if primitive.try_take() {
        return Some(WaitOutcome::Signaled);
    }
    if cancel.is_canceled() {
        return Some(WaitOutcome::Canceled);
    }
    if timeout == Some(Duration::ZERO) {
        return Some(WaitOutcome::TimedOut);
    }
    None
}

fn attach<W: Waitable + ?Sized>(primitive: &W, cancel: &CancelToken, slot: &Arc<WaitSlot>) -> Keys {
    let mut keys = Keys::default();
    match primitive.register(slot, WaitOutcome::Signaled) {
        Registration::Ready => {
            if !slot.complete(WaitOutcome::Signaled) {
                primitive.restore();
            }
            return keys;
        }
        Registration::Closed => {
            slot.complete(WaitOutcome::TimedOut);
            return keys;
        }
        Registration::Queued(key) => keys.primitive = Some(key),
    }
    if let Some(gate) = cancel.wait_handle() {
        match gate.register(slot, WaitOutcome::Canceled) {
            Registration::Ready => {
                slot.complete(WaitOutcome::Canceled);
            }
            Registration::Closed => {}
            Registration::Queued(key) => keys.cancel = Some(key),
        }
    }
    keys
}

fn detach<W: Waitable + ?Sized>(primitive: &W, cancel: &CancelToken, keys: Keys) {
    if let Some(key) = keys.primitive {
        primitive.unregister(key);
    }
    if let (Some(key), Some(gate)) = (keys.cancel, cancel.wait_handle()) {
        gate.unregister(key);
    }
}

/// Complete `slot` with `outcome` unless something else got there first.
fn settle(slot: &WaitSlot, outcome: WaitOutcome) -> WaitOutcome {
    slot.complete(outcome);
    slot.outcome().unwrap_or(outcome)
}

/// Block the calling thread on `primitive`.
///
/// `None` waits without a deadline.
pub fn wait_blocking<W: Waitable + ?Sized>(
    primitive: &W,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> WaitOutcome {
    if let Some(outcome) = fast_path(primitive, timeout, cancel) {
        return outcome;
    }

    let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
    let slot = WaitSlot::new();
    let keys = attach(primitive, cancel, &slot);
    let outcome = match slot.block_until(deadline) {
        Some(outcome) => outcome,
        None => settle(&slot, WaitOutcome::TimedOut),
    };
    detach(primitive, cancel, keys);
    outcome
}

/// Wait on `primitive` from async code.
///
/// Timeouts run on the tokio timer, so the future must be polled inside a
/// runtime with time enabled.
pub fn wait_async<'a, W: Waitable + ?Sized>(
    primitive: &'a W,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> WaitFuture<'a, W> {
    WaitFuture {
        primitive,
        cancel: cancel.clone(),
        timeout,
        state: FutureState::Init,
    }
}

enum FutureState {
    Init,
    Waiting {
        slot: Arc<WaitSlot>,
        keys: Keys,
        sleep: Option<Pin<Box<Sleep>>>,
    },
    Done(WaitOutcome),
}

/// Future returned by [`wait_async`].
///
/// Dropping it mid-wait removes its registrations; a signal granted to it in
/// the meantime is given back to the primitive.
#[must_use = "futures do nothing unless polled"]
pub struct WaitFuture<'a, W: Waitable + ?Sized> {
    primitive: &'a W,
    cancel: CancelToken,
    timeout: Option<Duration>,
    state: FutureState,
}

impl<W: Waitable + ?Sized> Future for WaitFuture<'_, W> {
    type Output = WaitOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<WaitOutcome> {
        let this = self.get_mut();

        if let FutureState::Init = this.state {
            if let Some(outcome) = fast_path(this.primitive, this.timeout, &this.cancel) {
                this.state = FutureState::Done(outcome);
                return Poll::Ready(outcome);
            }
            let slot = WaitSlot::new();
            let keys = attach(this.primitive, &this.cancel, &slot);
            let sleep = this.timeout.map(|t| Box::pin(tokio::time::sleep(t)));
            this.state = FutureState::Waiting { slot, keys, sleep };
        }

        let outcome = match &mut this.state {
            FutureState::Init => return Poll::Pending,
            FutureState::Done(outcome) => return Poll::Ready(*outcome),
            FutureState::Waiting { slot, keys, sleep } => {
                let outcome = match slot.poll_outcome(cx) {
                    Poll::Ready(outcome) => outcome,
                    Poll::Pending => {
                        let expired = sleep
                            .as_mut()
                            .is_some_and(|sleep| sleep.as_mut().poll(cx).is_ready());
                        if !expired {
                            return Poll::Pending;
                        }
                        settle(slot, WaitOutcome::TimedOut)
                    }
                };
                detach(this.primitive, &this.cancel, *keys);
                outcome
            }
        };

        this.state = FutureState::Done(outcome);
        Poll::Ready(outcome)
    }
}

impl<W: Waitable + ?Sized> Drop for WaitFuture<'_, W> {
    fn drop(&mut self) {
        if let FutureState::Waiting { slot, keys, .. } = &self.state {
            let granted = !slot.complete(WaitOutcome::Canceled)
                && slot.outcome() == Some(WaitOutcome::Signaled);
            detach(self.primitive, &self.cancel, *keys);
            if granted {
                self.primitive.restore();
            }
        }
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
