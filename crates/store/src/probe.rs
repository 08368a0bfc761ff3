// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Liveness probing behind an OS-capability trait
//!
//! The state machine never inspects pids directly; it asks a probe.
//! This keeps the platform-specific "does this pid exist" check
//! swappable without touching supervision logic.

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Non-destructive check of whether a pid currently refers to a
/// running process.
pub trait LivenessProbe {
    fn is_live(&self, pid: u32) -> bool;
}

/// Signal-0 probe: sends no signal, only the permission check.
///
/// ESRCH means the process is gone. EPERM means it exists but belongs
/// to someone else, which still counts as live.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillProbe;

impl LivenessProbe for KillProbe {
    fn is_live(&self, pid: u32) -> bool {
        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        match kill(Pid::from_raw(raw), None) {
            Ok(()) | Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

// Shared probes (tests hand the same FakeProbe to a store and keep a
// handle for scripting it).
impl<P: LivenessProbe> LivenessProbe for std::sync::Arc<P> {
    fn is_live(&self, pid: u32) -> bool {
        (**self).is_live(pid)
    }
}

/// Scripted probe for tests: pids are live only while marked so.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct FakeProbe {
    live: std::sync::Mutex<std::collections::HashSet<u32>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_live(&self, pid: u32) {
        self.lock().insert(pid);
    }

    pub fn set_dead(&self, pid: u32) {
        self.lock().remove(&pid);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, std::collections::HashSet<u32>> {
        // A poisoned lock only means a test panicked; the set is still usable.
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(any(test, feature = "test-support"))]
impl LivenessProbe for FakeProbe {
    fn is_live(&self, pid: u32) -> bool {
        self.lock().contains(&pid)
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
