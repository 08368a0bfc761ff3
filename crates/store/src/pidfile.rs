// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Durable pid records, one file per process name
//!
//! A record is a hint, not a guarantee of liveness: the pid may refer
//! to a since-exited or since-reused process. [`PidStore::check_and_heal`]
//! is the single authoritative liveness query; no other component reads
//! a pid file directly.

use crate::probe::LivenessProbe;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from pid record I/O.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write pid record {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to remove pid record {path}: {source}")]
    Remove {
        path: PathBuf,
        source: io::Error,
    },
}

/// File-per-process store of last-known pids.
pub struct PidStore<P> {
    dir: PathBuf,
    probe: P,
}

impl<P: LivenessProbe> PidStore<P> {
    pub fn new(dir: impl Into<PathBuf>, probe: P) -> Self {
        Self {
            dir: dir.into(),
            probe,
        }
    }

    /// Path of the record for `name`: `<dir>/<name>.pid`.
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.pid"))
    }

    /// Create or overwrite the record for `name`.
    ///
    /// Writes to a temp file and renames so a concurrent reader never
    /// observes a partially written value.
    pub fn write(&self, name: &str, pid: u32) -> Result<(), StoreError> {
        let path = self.record_path(name);
        let tmp = self.dir.join(format!(".{name}.pid.tmp"));
        let io_result = fs::write(&tmp, format!("{pid}\n")).and_then(|()| fs::rename(&tmp, &path));
        io_result.map_err(|source| StoreError::Write { path, source })
    }

    /// The stored pid, or `None` when no record exists or it holds
    /// something other than a pid.
    pub fn read(&self, name: &str) -> Option<u32> {
        let content = fs::read_to_string(self.record_path(name)).ok()?;
        content.trim().parse().ok()
    }

    /// Delete the record for `name`; absent is not an error.
    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        let path = self.record_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Remove { path, source }),
        }
    }

    /// Platform liveness probe for an arbitrary pid.
    pub fn is_live(&self, pid: u32) -> bool {
        self.probe.is_live(pid)
    }

    /// Read the record for `name`, healing stale state on the way.
    ///
    /// A record referencing a dead pid, or holding unparsable content,
    /// is deleted before answering, so repeated calls are idempotent.
    pub fn check_and_heal(&self, name: &str) -> Result<Option<u32>, StoreError> {
        let Some(pid) = self.read(name) else {
            // Unparsable content is stale state too; clear it.
            if self.record_path(name).exists() {
                tracing::debug!(name, "healing unreadable pid record");
                self.remove(name)?;
            }
            return Ok(None);
        };

        if self.probe.is_live(pid) {
            Ok(Some(pid))
        } else {
            tracing::debug!(name, pid, "healing stale pid record");
            self.remove(name)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
