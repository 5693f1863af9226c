// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process named mutex
//!
//! A named mutex is an advisory exclusive lock on a file in the shared
//! namespace directory. While held, the file carries an [`OwnerRecord`]; the
//! holder clears it on release. The OS drops the lock when a holder dies, but
//! the record survives, which is how the next acquirer learns the mutex was
//! abandoned.
//!
//! Each acquisition opens its own handle, so two acquisitions through the same
//! [`NamedMutex`] exclude each other just like two processes do.

mod name;
mod owner;
mod worker;

pub use name::{application_mutex_name, normalize, MutexName, GLOBAL_PREFIX};
pub use owner::OwnerRecord;

use crate::bridge::WaitOutcome;
use crate::cancel::CancelToken;
use crate::config::{MutexConfig, MIN_POLL_INTERVAL};
use crate::error::SyncError;
use crate::gate::Gate;
use crate::guard::{Acquisition, LockGuard};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Mutual exclusion shared by every process on the machine
pub struct NamedMutex {
    name: MutexName,
    path: PathBuf,
    config: MutexConfig,
    // Opened eagerly so permission problems surface at construction
    handle: File,
    workers: Arc<AtomicUsize>,
}

impl NamedMutex {
    pub fn open(name: &str) -> Result<Self, SyncError> {
        Self::with_config(name, MutexConfig::default())
    }

    /// Mutex named after the running application
    pub fn for_application() -> Result<Self, SyncError> {
        Self::open(application_mutex_name())
    }

    pub fn with_config(name: &str, config: MutexConfig) -> Result<Self, SyncError> {
        let name = MutexName::new(name)?;
        std::fs::create_dir_all(&config.namespace_dir)?;
        let path = config.namespace_dir.join(name.file_name());
        let handle = open_lock_file(&path)?;

        tracing::debug!(mutex = %name, path = %path.display(), "opened named mutex");

        Ok(Self {
            name,
            path,
            config,
            handle,
            workers: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn name(&self) -> &MutexName {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &MutexConfig {
        &self.config
    }

    /// Record of the current holder, or of one that abandoned the mutex
    pub fn current_owner(&self) -> Result<Option<OwnerRecord>, SyncError> {
        let content = owner::read_marker(&self.handle)?;
        Ok(owner::parse_marker(&content))
    }

    /// Async acquisition threads still running for this mutex
    pub fn pending_workers(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }

    /// Wait for async acquisition threads to finish releasing.
    ///
    /// Returns `false` if some were still running when `timeout` elapsed. A
    /// process should drain before exiting, or the next acquirer may find the
    /// owner record of a release that never completed.
    pub async fn drain_workers(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        while self.pending_workers() > 0 {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return false;
            }
            tokio::time::sleep(self.config.poll_interval.max(MIN_POLL_INTERVAL)).await;
        }
        true
    }

    /// Acquire on the calling thread.
    ///
    /// Timeout and cancellation produce a non-acquired [`Acquisition`]; only
    /// native IO failures are errors.
    pub fn try_acquire(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError> {
        let attempt = acquire_blocking(
            &self.path,
            &self.name,
            self.config.poll_interval,
            timeout,
            cancel,
            None,
        )?;
        Ok(match attempt {
            Attempt::Held(held) => {
                let abandoned = held.abandoned;
                let previous = held.previous.clone();
                let guard = LockGuard::new(move || held.release());
                if abandoned {
                    Acquisition::abandoned(guard, previous)
                } else {
                    Acquisition::granted(guard)
                }
            }
            Attempt::Denied(outcome) => {
                tracing::debug!(mutex = %self.name, %outcome, "named mutex not acquired");
                Acquisition::denied(outcome)
            }
        })
    }

    /// Acquire from async code.
    ///
    /// The acquire and the eventual release both run on one dedicated thread
    /// that lives as long as the acquisition; the returned guard only signals
    /// that thread.
    pub async fn acquire_async(
        &self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<Acquisition, SyncError> {
        worker::acquire_on_worker(self, timeout, cancel.clone()).await
    }
}

impl std::fmt::Debug for NamedMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedMutex")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

pub(crate) enum Attempt {
    Held(HeldLock),
    Denied(WaitOutcome),
}

/// An exclusively locked lock file carrying our owner record.
///
/// Dropping it without [`HeldLock::release`] closes the handle (so the OS
/// unlocks) but leaves the record behind, exactly like a crashed holder.
pub(crate) struct HeldLock {
    file: File,
    name: MutexName,
    abandoned: bool,
    previous: Option<OwnerRecord>,
}

impl HeldLock {
    fn claim(file: File, name: &MutexName) -> Result<Self, SyncError> {
        let content = owner::read_marker(&file)?;
        let abandoned = !content.trim().is_empty();
        let previous = if abandoned {
            owner::parse_marker(&content)
        } else {
            None
        };
        owner::write_marker(&file, &OwnerRecord::current())?;

        if abandoned {
            tracing::warn!(
                mutex = %name,
                previous_pid = ?previous.as_ref().map(|p| p.pid),
                "acquired abandoned named mutex"
            );
        } else {
            tracing::debug!(mutex = %name, "acquired named mutex");
        }

        Ok(Self {
            file,
            name: name.clone(),
            abandoned,
            previous,
        })
    }

    /// Clear the owner record and unlock. Failures are logged, never raised.
    fn release(self) {
        if let Err(e) = owner::clear_marker(&self.file) {
            tracing::warn!(mutex = %self.name, error = %e, "failed to clear owner record");
        }
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(mutex = %self.name, error = %e, "failed to unlock named mutex");
        }
        tracing::debug!(mutex = %self.name, "released named mutex");
    }
}

/// Poll the lock file until it is ours, the timeout elapses, or we're told to stop.
///
/// Between attempts the thread sleeps on the cancel token, and on `abort` when
/// given, so either ends the wait immediately.
pub(crate) fn acquire_blocking(
    path: &Path,
    name: &MutexName,
    poll_interval: Duration,
    timeout: Option<Duration>,
    cancel: &CancelToken,
    abort: Option<&Gate>,
) -> Result<Attempt, SyncError> {
    let file = open_lock_file(path)?;
    let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(Attempt::Held(HeldLock::claim(file, name)?)),
            Err(e) if is_contended(&e) => {}
            Err(e) => return Err(e.into()),
        }

        if cancel.is_canceled() || abort.is_some_and(Gate::is_set) {
            return Ok(Attempt::Denied(WaitOutcome::Canceled));
        }

        let Some(pause) = retry_pause(deadline, poll_interval) else {
            return Ok(Attempt::Denied(WaitOutcome::TimedOut));
        };

        let stopped = match abort {
            Some(gate) => gate.wait(Some(pause), cancel) != WaitOutcome::TimedOut,
            None => cancel.wait_for(pause),
        };
        if stopped {
            return Ok(Attempt::Denied(WaitOutcome::Canceled));
        }
    }
}

/// Pause before the next lock attempt, or `None` once `deadline` has passed.
///
/// Never shorter than [`MIN_POLL_INTERVAL`] unless the deadline is closer.
fn retry_pause(deadline: Option<Instant>, poll_interval: Duration) -> Option<Duration> {
    let interval = poll_interval.max(MIN_POLL_INTERVAL);
    match deadline {
        None => Some(interval),
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            (!remaining.is_zero()).then(|| remaining.min(interval))
        }
    }
}

#[cfg(test)]
#[path = "mutex_tests.rs"]
mod tests;
