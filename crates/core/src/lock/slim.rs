// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::ScopedLock;
use crate::bridge::WaitOutcome;
use crate::cancel::CancelToken;
use crate::error::SyncError;
use crate::gate::{Gate, ResetMode};
use crate::guard::{Acquisition, LockGuard};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const RESOURCE: &str = "slim lock";

/// Single-holder, non-reentrant lock on an auto-reset gate.
///
/// The open gate is the free lock: taking the signal enters, setting the gate
/// again leaves. No name, no close tracking, no logging.
#[derive(Clone)]
pub struct SlimLock {
    gate: Arc<Gate>,
}

impl Default for SlimLock {
    fn default() -> Self {
        Self {
            gate: Arc::new(Gate::new(ResetMode::Auto, true)),
        }
    }
}

impl SlimLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self) -> bool {
        self.gate.is_set()
    }

    fn finish(&self, outcome: WaitOutcome) -> Acquisition {
        if !outcome.is_signaled() {
            return Acquisition::denied(outcome);
        }
        let gate = Arc::clone(&self.gate);
        Acquisition::granted(LockGuard::new(move || gate.set()))
    }
}

#[async_trait]
impl ScopedLock for SlimLock {
    fn resource(&self) -> &str {
        RESOURCE
    }

    fn try_wait_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError> {
        Ok(self.finish(self.gate.wait(timeout, cancel)))
    }

    async fn try_acquire_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError> {
        let outcome = self.gate.wait_async(timeout, cancel).await;
        Ok(self.finish(outcome))
    }
}
