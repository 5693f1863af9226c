// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative cancellation and the shared timeout vocabulary
//!
//! A [`CancelToken`] is a manual-reset [`Gate`] behind an `Arc`. Every
//! "wait until the duration elapses or cancellation fires" question in this
//! crate is answered by bridging a wait on that gate.

use crate::bridge::{self, WaitOutcome};
use crate::gate::Gate;
use std::sync::Arc;
use std::time::Duration;

/// Cloneable cancellation signal. Clones share the same underlying gate.
///
/// The default token is [`CancelToken::none`], which never fires.
#[derive(Clone, Default)]
pub struct CancelToken {
    gate: Option<Arc<Gate>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            gate: Some(Arc::new(Gate::manual())),
        }
    }

    /// A token that can never be canceled
    pub fn none() -> Self {
        Self { gate: None }
    }

    pub fn cancel(&self) {
        if let Some(gate) = &self.gate {
            gate.set();
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.gate.as_ref().is_some_and(|gate| gate.is_set())
    }

    pub fn can_be_canceled(&self) -> bool {
        self.gate.is_some()
    }

    /// The gate that opens on cancellation, if this token can fire
    pub fn wait_handle(&self) -> Option<&Gate> {
        self.gate.as_deref()
    }

    /// Block until canceled or `duration` elapses.
    ///
    /// Returns `true` if cancellation came first.
    pub fn wait_for(&self, duration: Duration) -> bool {
        match &self.gate {
            Some(gate) => {
                bridge::wait_blocking(&**gate, Some(duration), &CancelToken::none())
                    == WaitOutcome::Signaled
            }
            None => {
                std::thread::sleep(duration);
                false
            }
        }
    }

    /// Sleep for `duration` unless canceled first.
    ///
    /// Returns `true` if the full duration elapsed.
    pub fn sleep(&self, duration: Duration) -> bool {
        !self.wait_for(duration)
    }

    pub async fn wait_for_async(&self, duration: Duration) -> bool {
        match &self.gate {
            Some(gate) => {
                bridge::wait_async(&**gate, Some(duration), &CancelToken::none()).await
                    == WaitOutcome::Signaled
            }
            None => {
                tokio::time::sleep(duration).await;
                false
            }
        }
    }

    pub async fn sleep_async(&self, duration: Duration) -> bool {
        !self.wait_for_async(duration).await
    }

    /// Resolve once the token is canceled. Never resolves for [`CancelToken::none`].
    pub async fn cancelled(&self) {
        match &self.gate {
            Some(gate) => {
                bridge::wait_async(&**gate, None, &CancelToken::none()).await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("can_be_canceled", &self.can_be_canceled())
            .field("is_canceled", &self.is_canceled())
            .finish()
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
