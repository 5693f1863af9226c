// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutex names and the machine-wide namespace
//!
//! The mapping from a logical name to a lock file is the only thing processes
//! have to agree on, so it must stay byte-for-byte stable.

use crate::error::SyncError;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::OnceLock;

/// Prefix placing every name in the global namespace
pub const GLOBAL_PREFIX: &str = "Global.";

const LOCK_SUFFIX: &str = ".lock";

// Stays well under the 255-byte limit common to filesystems
const MAX_FILE_NAME: usize = 200;

/// Normalized mutex name: no path separators, case preserved
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MutexName(String);

impl MutexName {
    pub fn new(name: &str) -> Result<Self, SyncError> {
        normalize(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Global.<name>`
    pub fn global_key(&self) -> String {
        format!("{}{}", GLOBAL_PREFIX, self.0)
    }

    /// Lock file name inside the namespace directory.
    ///
    /// Keys too long for a file name are replaced by their SHA-256.
    pub fn file_name(&self) -> String {
        let key = self.global_key();
        if key.len() + LOCK_SUFFIX.len() <= MAX_FILE_NAME {
            format!("{}{}", key, LOCK_SUFFIX)
        } else {
            format!("{}{}{}", GLOBAL_PREFIX, sha256_hex(self.0.as_bytes()), LOCK_SUFFIX)
        }
    }
}

impl fmt::Display for MutexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip path separators (and NUL) from `name`.
pub fn normalize(name: &str) -> Result<MutexName, SyncError> {
    let normalized: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .collect();
    if normalized.is_empty() {
        return Err(SyncError::InvalidName(name.to_string()));
    }
    Ok(MutexName(normalized))
}

/// Default mutex name for the running application.
///
/// Derived once from the executable path, so every instance of the same
/// installed binary shares it.
pub fn application_mutex_name() -> &'static str {
    static NAME: OnceLock<String> = OnceLock::new();
    NAME.get_or_init(derive_application_name)
}

fn derive_application_name() -> String {
    match std::env::current_exe().and_then(|path| path.canonicalize()) {
        Ok(path) => {
            let digest = sha256_hex(path.to_string_lossy().as_bytes());
            format!("app-{}", &digest[..16])
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not resolve executable path, using package name");
            format!("app-{}", env!("CARGO_PKG_NAME"))
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;
