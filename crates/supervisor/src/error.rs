// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Error types for the supervisor

use herd_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Per-operation supervisor errors.
///
/// Expected states (already running, not running) are not errors;
/// they are [`crate::StartOutcome`]/[`crate::StopOutcome`] variants.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("unknown process: {0}")]
    UnknownProcess(String),
    #[error("failed to spawn {name}: {source}")]
    Spawn {
        name: String,
        source: std::io::Error,
    },
    #[error("failed to open log file {path} for {name}: {source}")]
    LogOpen {
        name: String,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to install signal handler: {0}")]
    Signal(std::io::Error),
}
