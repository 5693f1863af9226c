// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hf path`: where a name lives, without touching the file

use anyhow::Result;
use clap::Args;
use hf_core::{MutexConfig, MutexName};

#[derive(Args)]
pub struct PathArgs {
    /// Mutex name
    pub name: String,
}

pub fn path(args: PathArgs, config: &MutexConfig) -> Result<()> {
    let name = MutexName::new(&args.name)?;
    println!("{}", name.global_key());
    println!("{}", config.namespace_dir.join(name.file_name()).display());
    Ok(())
}
