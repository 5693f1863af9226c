// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hf try`: one acquisition attempt, released immediately

use super::abandoned_suffix;
use anyhow::{bail, Result};
use clap::Args;
use hf_core::{CancelToken, MutexConfig, NamedMutex};
use std::time::Duration;

// Upper bound on waiting for the worker thread to release after --async
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Args)]
pub struct TryArgs {
    /// Mutex name
    pub name: String,

    /// How long to wait for the mutex (default: don't wait)
    #[arg(long, value_parser = humantime::parse_duration, default_value = "0s")]
    pub timeout: Duration,

    /// Acquire on a worker thread through the async path
    #[arg(long = "async")]
    pub use_async: bool,
}

pub async fn probe(args: TryArgs, config: MutexConfig) -> Result<()> {
    let mutex = NamedMutex::with_config(&args.name, config)?;
    let cancel = CancelToken::none();

    let acquisition = if args.use_async {
        mutex.acquire_async(Some(args.timeout), &cancel).await?
    } else {
        tokio::task::block_in_place(|| mutex.try_acquire(Some(args.timeout), &cancel))?
    };
    if !acquisition.acquired() {
        bail!("not acquired: {}", acquisition.outcome());
    }

    println!("acquired {}{}", mutex.name(), abandoned_suffix(&acquisition));
    acquisition.release();

    if !mutex.drain_workers(DRAIN_TIMEOUT).await {
        tracing::warn!(mutex = %mutex.name(), "acquisition worker still running at exit");
    }
    Ok(())
}
