// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herd-supervisor: the process lifecycle state machine
//!
//! Owns start/stop/restart/status per named process, decides liveness
//! through the pid store, applies the restart-on-fail backoff policy,
//! and runs the attached supervise loop that reacts to child exits and
//! interrupts.

pub mod error;
mod spawn;
pub mod supervisor;

pub use error::SupervisorError;
pub use supervisor::{Inspection, Supervisor};

use serde::Serialize;

/// Whether the invoking process stays attached to what it spawns.
///
/// Attached: the invocation holds runtime handles and parks in the
/// supervise loop. Detached: children are unlinked from the invoking
/// process's lifetime and it returns immediately after spawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnMode {
    Attached,
    Detached,
}

/// Running/stopped state of one named process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Running(u32),
    Stopped,
}

/// Outcome of a start request. Already-running is expected, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(u32),
    AlreadyRunning(u32),
}

/// Outcome of a stop request.
///
/// `SignalFailed` covers signal delivery to an already-dead or
/// inaccessible pid; the record is removed regardless so the same stale
/// state is not re-reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped(u32),
    SignalFailed { pid: u32, reason: String },
    NotRunning,
}
