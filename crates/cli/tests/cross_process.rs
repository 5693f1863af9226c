// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI integration tests for named mutexes shared between processes
//!
//! Each test gets its own lock directory, so tests can run in parallel.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(deprecated)]

mod common;

use common::{hf, Holder};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn held_mutex_excludes_other_process() {
    let dir = TempDir::new().unwrap();
    let _holder = Holder::held(dir.path(), "build");

    hf(dir.path())
        .args(["try", "build", "--timeout", "100ms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not acquired: timed out"));
}

#[test]
fn interrupted_holder_releases_cleanly() {
    let dir = TempDir::new().unwrap();
    let mut holder = Holder::held(dir.path(), "deploy");

    holder.interrupt();

    assert_eq!(holder.next_line(), "released deploy");
    assert!(holder.wait().success());

    hf(dir.path())
        .args(["try", "deploy"])
        .assert()
        .success()
        .stdout("acquired deploy\n");
}

#[test]
fn killed_holder_leaves_abandoned_mutex() {
    let dir = TempDir::new().unwrap();
    let mut holder = Holder::held(dir.path(), "crashy");
    let pid = holder.pid();

    holder.kill();

    hf(dir.path())
        .args(["try", "crashy"])
        .assert()
        .success()
        .stdout(format!("acquired crashy (abandoned by pid {})\n", pid));

    // The abandoned acquisition released cleanly, so the next one is clean
    hf(dir.path())
        .args(["try", "crashy"])
        .assert()
        .success()
        .stdout("acquired crashy\n");
}

#[test]
fn hold_reports_abandoning_pid() {
    let dir = TempDir::new().unwrap();
    let mut holder = Holder::held(dir.path(), "orphan");
    let pid = holder.pid();

    holder.kill();

    hf(dir.path())
        .args(["hold", "orphan", "--for", "50ms"])
        .assert()
        .success()
        .stdout(format!(
            "held orphan (abandoned by pid {})\nreleased orphan\n",
            pid
        ));
}

#[test]
fn waiting_acquirer_gets_mutex_after_release() {
    let dir = TempDir::new().unwrap();
    let mut holder = Holder::spawn(dir.path(), "handoff", &["--for", "300ms"]);
    assert_eq!(holder.next_line(), "held handoff");

    hf(dir.path())
        .args(["try", "handoff", "--timeout", "10s"])
        .assert()
        .success()
        .stdout("acquired handoff\n");
    assert!(holder.wait().success());
}

#[test]
fn hold_for_duration_releases() {
    let dir = TempDir::new().unwrap();

    hf(dir.path())
        .args(["hold", "brief", "--for", "50ms"])
        .assert()
        .success()
        .stdout("held brief\nreleased brief\n");
}

#[test]
fn hold_on_contended_mutex_times_out() {
    let dir = TempDir::new().unwrap();
    let _holder = Holder::held(dir.path(), "busy");

    hf(dir.path())
        .args(["hold", "busy", "--timeout", "50ms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not acquired: timed out"));
}

#[test]
fn async_try_acquires_and_releases() {
    let dir = TempDir::new().unwrap();

    for _ in 0..2 {
        hf(dir.path())
            .args(["try", "worker", "--async"])
            .assert()
            .success()
            .stdout("acquired worker\n");
    }
}

#[test]
fn async_try_sees_killed_holder() {
    let dir = TempDir::new().unwrap();
    let mut holder = Holder::held(dir.path(), "async-crashy");
    let pid = holder.pid();
    holder.kill();

    hf(dir.path())
        .args(["try", "async-crashy", "--async"])
        .assert()
        .success()
        .stdout(format!("acquired async-crashy (abandoned by pid {})\n", pid));
}

#[test]
fn separators_map_to_the_same_mutex() {
    let dir = TempDir::new().unwrap();
    let mut holder = Holder::spawn(dir.path(), "team/build", &[]);
    assert_eq!(holder.next_line(), "held teambuild");

    hf(dir.path())
        .args(["try", "team\\build"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not acquired"));
}

#[test]
fn lock_dir_flag_selects_namespace() {
    let dir = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    let _holder = Holder::held(dir.path(), "scoped");

    hf(dir.path())
        .arg("--lock-dir")
        .arg(other.path())
        .args(["try", "scoped"])
        .assert()
        .success();
}

#[test]
fn path_prints_key_and_file() {
    let dir = TempDir::new().unwrap();
    let expected = dir.path().join("Global.abc.lock");

    hf(dir.path())
        .args(["path", "a/bc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Global.abc\n"))
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn config_file_sets_namespace_dir() {
    let dir = TempDir::new().unwrap();
    let config_dir = TempDir::new().unwrap();
    let config = dir.path().join("hf.toml");
    std::fs::write(
        &config,
        format!(
            "namespace_dir = {:?}\npoll_interval = \"5ms\"\n",
            config_dir.path().display().to_string()
        ),
    )
    .unwrap();

    hf(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["path", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            config_dir.path().join("Global.x.lock").display().to_string(),
        ));
}

#[test]
fn malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("hf.toml");
    std::fs::write(&config, "poll_interval = \"whenever\"\n").unwrap();

    hf(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["path", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn invalid_name_is_rejected() {
    let dir = TempDir::new().unwrap();

    hf(dir.path())
        .args(["try", "///"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid mutex name"));
}

#[test]
fn app_name_is_stable() {
    let dir = TempDir::new().unwrap();
    let first = hf(dir.path()).arg("app-name").output().unwrap();
    let second = hf(dir.path()).arg("app-name").output().unwrap();

    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).starts_with("app-"));
    assert_eq!(first.stdout, second.stdout);
}
