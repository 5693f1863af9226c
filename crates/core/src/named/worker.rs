// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dedicated-thread acquisition for async callers
//!
//! The worker owns the native lock for its whole life and talks to the caller
//! through two one-shot signals: a report channel (held, abandoned, denied or
//! failed) and a release gate. The handle never crosses threads.

use super::{acquire_blocking, Attempt, NamedMutex, OwnerRecord};
use crate::bridge::WaitOutcome;
use crate::cancel::CancelToken;
use crate::error::SyncError;
use crate::gate::Gate;
use crate::guard::{Acquisition, LockGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

enum Report {
    Held {
        abandoned: bool,
        previous: Option<OwnerRecord>,
    },
    Denied(WaitOutcome),
}

type ReportSender = oneshot::Sender<Result<Report, SyncError>>;

/// Opens the release gate when dropped, unless turned into a guard first.
///
/// Covers the caller going away at any point: the worker stops waiting, or
/// releases a lock nobody will ever see.
struct ReleaseSignal(Option<Arc<Gate>>);

impl ReleaseSignal {
    fn into_guard(mut self) -> LockGuard {
        let gate = self.0.take();
        LockGuard::new(move || {
            if let Some(gate) = gate {
                gate.set();
            }
        })
    }
}

impl Drop for ReleaseSignal {
    fn drop(&mut self) {
        if let Some(gate) = self.0.take() {
            gate.set();
        }
    }
}

/// Live worker count, decremented when the worker thread finishes
struct WorkerSlot(Arc<AtomicUsize>);

impl WorkerSlot {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub(super) async fn acquire_on_worker(
    mutex: &NamedMutex,
    timeout: Option<Duration>,
    cancel: CancelToken,
) -> Result<Acquisition, SyncError> {
    let (report_tx, report_rx) = oneshot::channel();
    let release = Arc::new(Gate::manual());
    let signal = ReleaseSignal(Some(Arc::clone(&release)));

    let path = mutex.path.clone();
    let name = mutex.name.clone();
    let poll_interval = mutex.config.poll_interval;
    let slot = WorkerSlot::enter(&mutex.workers);

    std::thread::Builder::new()
        .name(format!("hf-mutex-{}", name))
        .spawn(move || {
            let _slot = slot;
            tracing::debug!(mutex = %name, "acquisition worker started");

            let attempt = acquire_blocking(
                &path,
                &name,
                poll_interval,
                timeout,
                &cancel,
                Some(&release),
            );
            run_worker(attempt, report_tx, &release);

            tracing::debug!(mutex = %name, "acquisition worker finished");
        })?;

    let report = report_rx.await.map_err(|_| SyncError::WorkerLost {
        resource: mutex.name.global_key(),
    })??;

    Ok(match report {
        Report::Held {
            abandoned: false, ..
        } => Acquisition::granted(signal.into_guard()),
        Report::Held {
            abandoned: true,
            previous,
        } => Acquisition::abandoned(signal.into_guard(), previous),
        Report::Denied(outcome) => Acquisition::denied(outcome),
    })
}

fn run_worker(attempt: Result<Attempt, SyncError>, report_tx: ReportSender, release: &Gate) {
    let held = match attempt {
        Ok(Attempt::Held(held)) => held,
        Ok(Attempt::Denied(outcome)) => {
            let _ = report_tx.send(Ok(Report::Denied(outcome)));
            return;
        }
        Err(e) => {
            let _ = report_tx.send(Err(e));
            return;
        }
    };

    let report = Report::Held {
        abandoned: held.abandoned,
        previous: held.previous.clone(),
    };
    if report_tx.send(Ok(report)).is_err() {
        // Caller went away before it could see the lock
        held.release();
        return;
    }

    release.wait(None, &CancelToken::none());
    held.release();
}
