// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Tests for definition parsing and restart backoff

use super::*;
use std::time::Duration;
use yare::parameterized;

#[test]
fn backoff_defaults() {
    let backoff = RestartBackoff::default();
    assert_eq!(backoff.max_restarts, 10);
    assert_eq!(backoff.window(), Duration::from_secs(60));
    assert_eq!(backoff.base_delay_ms, 200);
    assert_eq!(backoff.max_delay_ms, 30_000);
}

#[parameterized(
    first = { 0, 200 },
    second = { 1, 400 },
    third = { 2, 800 },
    fifth = { 4, 3_200 },
)]
fn backoff_delay_doubles(attempt: u32, expected_ms: u64) {
    let backoff = RestartBackoff::default();
    assert_eq!(
        backoff.delay_for(attempt),
        Duration::from_millis(expected_ms)
    );
}

#[test]
fn backoff_delay_caps_at_max() {
    let backoff = RestartBackoff::default();
    assert_eq!(backoff.delay_for(10), Duration::from_millis(30_000));
    // Large attempts must not overflow
    assert_eq!(backoff.delay_for(u32::MAX), Duration::from_millis(30_000));
}

#[test]
fn backoff_zero_base_delay_is_clamped() {
    let backoff = RestartBackoff {
        base_delay_ms: 0,
        ..RestartBackoff::default()
    };
    assert_eq!(backoff.delay_for(0), Duration::from_millis(1));
}

#[test]
fn definition_minimal_toml() {
    let def: ProcessDefinition = toml::from_str(r#"command = "sleep""#).unwrap();
    assert_eq!(def.command, "sleep");
    assert!(def.args.is_empty());
    assert!(def.env.is_empty());
    assert_eq!(def.cwd, None);
    assert_eq!(def.log, None);
    assert!(!def.restart_on_fail);
    assert_eq!(def.backoff, RestartBackoff::default());
}

#[test]
fn definition_full_toml() {
    let def: ProcessDefinition = toml::from_str(
        r#"
        command = "python3"
        args = ["-m", "http.server", "${PORT}"]
        cwd = "/srv/web"
        log = "web-custom.log"
        restart_on_fail = true

        [env]
        PORT = "8080"

        [backoff]
        max_restarts = 3
        window_secs = 30
        base_delay_ms = 50
        max_delay_ms = 1000
        "#,
    )
    .unwrap();

    assert_eq!(def.command, "python3");
    assert_eq!(def.args, vec!["-m", "http.server", "${PORT}"]);
    assert_eq!(def.env.get("PORT"), Some(&"8080".to_string()));
    assert_eq!(def.cwd, Some("/srv/web".into()));
    assert_eq!(def.log, Some("web-custom.log".into()));
    assert!(def.restart_on_fail);
    assert_eq!(def.backoff.max_restarts, 3);
    assert_eq!(def.backoff.base_delay_ms, 50);
}
