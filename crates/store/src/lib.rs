// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herd-store: durable pid records and liveness probing
//!
//! The pid store is the only state shared across invocations of the
//! supervisor. One file per process name holds the last pid this
//! supervisor believed it started; every read is paired with a liveness
//! probe, and stale records are healed (deleted) on sight.

pub mod pidfile;
pub mod probe;

pub use pidfile::{PidStore, StoreError};
pub use probe::{KillProbe, LivenessProbe};

#[cfg(any(test, feature = "test-support"))]
pub use probe::FakeProbe;
