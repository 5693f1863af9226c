// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hf - holdfast named mutex CLI

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{hold, path, probe};
use hf_core::MutexConfig;
use std::path::{Path, PathBuf};

/// Log filter for the CLI, in `EnvFilter` syntax
const LOG_ENV: &str = "HF_LOG";

#[derive(Parser)]
#[command(
    name = "hf",
    version,
    about = "holdfast - cross-process named mutexes"
)]
struct Cli {
    /// Directory holding the lock files (overrides config and HF_LOCK_DIR)
    #[arg(long, global = true)]
    lock_dir: Option<PathBuf>,

    /// TOML file with mutex settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire a named mutex and hold it until interrupted
    Hold(hold::HoldArgs),
    /// Acquire a named mutex once and release it right away
    Try(probe::TryArgs),
    /// Show the global key and lock file of a name
    Path(path::PathArgs),
    /// Print the mutex name derived from this executable
    AppName,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.lock_dir)?;

    match cli.command {
        Commands::Hold(args) => tokio::task::block_in_place(|| hold::hold(args, config)),
        Commands::Try(args) => probe::probe(args, config).await,
        Commands::Path(args) => path::path(args, &config),
        Commands::AppName => {
            println!("{}", hf_core::application_mutex_name());
            Ok(())
        }
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>, lock_dir: Option<PathBuf>) -> Result<MutexConfig> {
    let config = match path {
        Some(path) => MutexConfig::load(path)?,
        None => MutexConfig::default(),
    };
    Ok(match lock_dir {
        Some(dir) => config.with_namespace_dir(dir),
        None => config,
    })
}
