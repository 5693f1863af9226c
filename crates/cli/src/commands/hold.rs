// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hf hold`: keep a named mutex until told to let go

use super::abandoned_suffix;
use anyhow::{bail, Result};
use clap::Args;
use hf_core::{CancelToken, MutexConfig, NamedMutex};
use std::time::Duration;

// How long one idle wait lasts when holding without a deadline
const IDLE_WAIT: Duration = Duration::from_secs(3600);

#[derive(Args)]
pub struct HoldArgs {
    /// Mutex name
    pub name: String,

    /// Release after this long instead of waiting for a signal
    #[arg(long = "for", value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Give up if the mutex isn't acquired within this long
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
}

pub fn hold(args: HoldArgs, config: MutexConfig) -> Result<()> {
    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    ctrlc::set_handler(move || on_signal.cancel())?;

    let mutex = NamedMutex::with_config(&args.name, config)?;
    let acquisition = mutex.try_acquire(args.timeout, &cancel)?;
    if !acquisition.acquired() {
        bail!("not acquired: {}", acquisition.outcome());
    }

    println!("held {}{}", mutex.name(), abandoned_suffix(&acquisition));

    match args.duration {
        Some(duration) => {
            if cancel.wait_for(duration) {
                tracing::debug!(mutex = %mutex.name(), "hold interrupted");
            }
        }
        None => while !cancel.wait_for(IDLE_WAIT) {},
    }

    acquisition.release();
    println!("released {}", mutex.name());
    Ok(())
}
