// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod hold;
pub mod path;
pub mod probe;

use hf_core::Acquisition;

/// ` (abandoned...)` suffix for acquisition reports, empty for clean ones
pub(crate) fn abandoned_suffix(acquisition: &Acquisition) -> String {
    if !acquisition.is_abandoned() {
        return String::new();
    }
    match acquisition.previous_owner() {
        Some(owner) => format!(" (abandoned by pid {})", owner.pid),
        None => " (abandoned)".to_string(),
    }
}
