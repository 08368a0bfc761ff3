// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Process definitions and restart policy

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Static description of one supervisable workload.
///
/// Created once at configuration load and read-only thereafter. The
/// process name is the key of the definition table, not a field here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDefinition {
    /// Executable to run.
    pub command: String,

    /// Ordered argument templates. May contain `${VAR}` placeholders,
    /// substituted from the resolved environment at every start.
    #[serde(default)]
    pub args: Vec<String>,

    /// Process-level environment overrides (highest-precedence layer).
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Working directory for the spawned process.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Log file path. Defaults to `<name>.log` in the state directory.
    /// Stdout and stderr are both appended to this file.
    #[serde(default)]
    pub log: Option<PathBuf>,

    /// Restart the process whenever its exit is observed, success or
    /// failure, subject to the backoff budget below.
    #[serde(default)]
    pub restart_on_fail: bool,

    /// Backoff and budget applied when `restart_on_fail` triggers.
    #[serde(default)]
    pub backoff: RestartBackoff,
}

/// Backoff and budget for restart-on-fail.
///
/// A process may be restarted at most `max_restarts` times within a
/// sliding `window_secs` window. Each restart in the window waits an
/// exponentially growing delay, starting at `base_delay_ms` and capped
/// at `max_delay_ms`. When the budget is exhausted the process is left
/// stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartBackoff {
    pub max_restarts: u32,
    pub window_secs: u64,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RestartBackoff {
    fn default() -> Self {
        Self {
            max_restarts: 10,
            window_secs: 60,
            base_delay_ms: 200,
            max_delay_ms: 30_000,
        }
    }
}

impl RestartBackoff {
    /// The sliding window within which `max_restarts` applies.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Delay before the n-th consecutive restart (0-based): the base
    /// delay doubled per attempt, capped at `max_delay_ms`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms.max(1);
        // Shift saturates at 2^63; the cap makes larger factors moot.
        let factor = 1u64 << attempt.min(63);
        Duration::from_millis(base.saturating_mul(factor).min(self.max_delay_ms))
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
