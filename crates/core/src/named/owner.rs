// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owner records written into held lock files

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Who holds (or last held without releasing) a named mutex
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub pid: u32,
    /// Unique per acquisition
    pub token: String,
    pub thread: Option<String>,
    pub acquired_at: DateTime<Utc>,
}

impl OwnerRecord {
    /// Record for an acquisition made by the calling thread
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            token: uuid::Uuid::new_v4().to_string(),
            thread: std::thread::current().name().map(str::to_string),
            acquired_at: Utc::now(),
        }
    }
}

/// Raw lock file content; empty means nobody left a record.
pub(super) fn read_marker(mut file: &File) -> io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub(super) fn parse_marker(content: &str) -> Option<OwnerRecord> {
    serde_json::from_str(content.trim()).ok()
}

pub(super) fn write_marker(mut file: &File, owner: &OwnerRecord) -> io::Result<()> {
    let json = serde_json::to_string(owner).map_err(io::Error::other)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(json.as_bytes())?;
    file.flush()
}

pub(super) fn clear_marker(file: &File) -> io::Result<()> {
    file.set_len(0)
}
