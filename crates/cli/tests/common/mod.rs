// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, ExitStatus, Stdio};

/// `hf` confined to `lock_dir`, with logging left at its default.
pub fn hf(lock_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hf").unwrap();
    cmd.env("HF_LOCK_DIR", lock_dir).env_remove("HF_LOG");
    cmd
}

/// A background `hf hold` process. Killed on drop if still running.
pub struct Holder {
    child: Child,
    stdout: BufReader<ChildStdout>,
}

impl Holder {
    pub fn spawn(lock_dir: &Path, name: &str, extra_args: &[&str]) -> Self {
        let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_hf"))
            .env("HF_LOCK_DIR", lock_dir)
            .env_remove("HF_LOG")
            .args(["hold", name])
            .args(extra_args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn hf hold");
        let stdout = BufReader::new(child.stdout.take().expect("stdout is piped"));
        Self { child, stdout }
    }

    /// Spawn and wait until the holder reports the mutex held.
    pub fn held(lock_dir: &Path, name: &str) -> Self {
        let mut holder = Self::spawn(lock_dir, name, &[]);
        assert_eq!(holder.next_line(), format!("held {}", name));
        holder
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Next stdout line without its newline; empty once the process exited.
    pub fn next_line(&mut self) -> String {
        let mut line = String::new();
        self.stdout.read_line(&mut line).expect("failed to read holder output");
        line.trim_end().to_string()
    }

    pub fn interrupt(&self) {
        let pid = i32::try_from(self.child.id()).expect("pid fits in i32");
        kill(Pid::from_raw(pid), Signal::SIGINT).expect("failed to signal holder");
    }

    /// Kill without giving the holder a chance to release.
    pub fn kill(&mut self) {
        self.child.kill().expect("failed to kill holder");
        self.child.wait().expect("failed to reap holder");
    }

    pub fn wait(&mut self) -> ExitStatus {
        self.child.wait().expect("failed to wait for holder")
    }
}

impl Drop for Holder {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
