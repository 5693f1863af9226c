// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::ScopedLock;
use crate::cancel::CancelToken;
use crate::config::MutexConfig;
use crate::error::SyncError;
use crate::guard::Acquisition;
use crate::named::NamedMutex;
use async_trait::async_trait;
use std::time::Duration;

/// Scoped lock over a cross-process [`NamedMutex`].
///
/// Heavier than the in-process locks, but it excludes other processes and an
/// abandoned mutex still counts as acquired (check
/// [`Acquisition::is_abandoned`] when the protected state matters).
#[derive(Debug)]
pub struct MutexLock {
    mutex: NamedMutex,
    resource: String,
}

impl MutexLock {
    pub fn new(name: &str) -> Result<Self, SyncError> {
        Ok(Self::from_mutex(NamedMutex::open(name)?))
    }

    pub fn with_config(name: &str, config: MutexConfig) -> Result<Self, SyncError> {
        Ok(Self::from_mutex(NamedMutex::with_config(name, config)?))
    }

    /// Lock named after the running application
    pub fn for_application() -> Result<Self, SyncError> {
        Ok(Self::from_mutex(NamedMutex::for_application()?))
    }

    pub fn from_mutex(mutex: NamedMutex) -> Self {
        let resource = mutex.name().global_key();
        Self { mutex, resource }
    }

    pub fn mutex(&self) -> &NamedMutex {
        &self.mutex
    }
}

#[async_trait]
impl ScopedLock for MutexLock {
    fn resource(&self) -> &str {
        &self.resource
    }

    fn try_wait_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError> {
        self.mutex.try_acquire(timeout, cancel)
    }

    async fn try_acquire_with(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError> {
        self.mutex.acquire_async(timeout, cancel).await
    }
}
