// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Tests for liveness probes

use super::*;

#[test]
fn kill_probe_sees_own_process() {
    assert!(KillProbe.is_live(std::process::id()));
}

#[test]
fn kill_probe_sees_reaped_child_as_dead() {
    // Spawn and reap a short-lived child; its pid no longer exists.
    let mut child = std::process::Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();

    assert!(!KillProbe.is_live(pid));
}

#[test]
fn kill_probe_rejects_out_of_range_pid() {
    assert!(!KillProbe.is_live(u32::MAX));
}

#[test]
fn fake_probe_tracks_marked_pids() {
    let probe = FakeProbe::new();
    assert!(!probe.is_live(42));

    probe.set_live(42);
    assert!(probe.is_live(42));

    probe.set_dead(42);
    assert!(!probe.is_live(42));
}
