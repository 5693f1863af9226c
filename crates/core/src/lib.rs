// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hf-core: synchronization primitives for threads, tasks and processes
//!
//! This crate provides:
//! - A bridge turning blocking wait primitives into parked waits and futures
//! - Gates, a counting semaphore and cooperative cancellation built on it
//! - Scoped locks with idempotent guards
//! - A write-once latch
//! - A cross-process named mutex with abandonment detection

pub mod bridge;
pub mod cancel;
pub mod config;
pub mod error;
pub mod gate;
pub mod guard;
pub mod latch;
pub mod lock;
pub mod named;
pub mod semaphore;

pub use bridge::{wait_async, wait_blocking, WaitFuture, WaitOutcome, Waitable};
pub use cancel::CancelToken;
pub use config::{ConfigError, MutexConfig, MIN_POLL_INTERVAL};
pub use error::SyncError;
pub use gate::{Gate, ResetMode};
pub use guard::{Acquisition, LockGuard};
pub use latch::Latch;
pub use lock::{MutexLock, ScopedLock, SemaphoreLock, SlimLock};
pub use named::{application_mutex_name, MutexName, NamedMutex, OwnerRecord};
pub use semaphore::Semaphore;
