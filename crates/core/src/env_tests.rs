// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Tests for environment merging and argument substitution

use super::*;
use crate::definition::{ProcessDefinition, RestartBackoff};
use yare::parameterized;

fn env(pairs: &[(&str, &str)]) -> EnvMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn definition(args: &[&str], process_env: &[(&str, &str)]) -> ProcessDefinition {
    ProcessDefinition {
        command: "true".to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        env: env(process_env),
        cwd: None,
        log: None,
        restart_on_fail: false,
        backoff: RestartBackoff::default(),
    }
}

#[test]
fn merge_later_layers_win() {
    let system = env(&[("A", "sys"), ("S", "only")]);
    let global = env(&[("A", "glob"), ("G", "only")]);
    let process = env(&[("A", "proc"), ("P", "only")]);

    let merged = merge_env(&system, &global, &process);
    assert_eq!(merged.get("A"), Some(&"proc".to_string()));
    assert_eq!(merged.get("S"), Some(&"only".to_string()));
    assert_eq!(merged.get("G"), Some(&"only".to_string()));
    assert_eq!(merged.get("P"), Some(&"only".to_string()));
}

#[test]
fn merge_global_overrides_system() {
    let merged = merge_env(&env(&[("A", "1")]), &env(&[("A", "2")]), &EnvMap::new());
    assert_eq!(merged.get("A"), Some(&"2".to_string()));
}

#[test]
fn resolve_layering_and_missing_variable() {
    // The canonical precedence case: process wins over global over
    // system, and a missing variable substitutes the empty string.
    let system = env(&[("A", "1")]);
    let global = env(&[("A", "2"), ("B", "x")]);
    let def = definition(&["${A}-${B}-${C}"], &[("B", "y")]);

    let (merged, args) = resolve(&def, &global, &system);
    assert_eq!(args, vec!["2-y-".to_string()]);
    assert_eq!(merged.get("A"), Some(&"2".to_string()));
    assert_eq!(merged.get("B"), Some(&"y".to_string()));
    assert_eq!(merged.get("C"), None);
}

#[test]
fn resolve_is_deterministic() {
    let system = env(&[("A", "1")]);
    let global = env(&[("B", "2")]);
    let def = definition(&["${A}", "${B}", "plain"], &[]);

    let first = resolve(&def, &global, &system);
    let second = resolve(&def, &global, &system);
    assert_eq!(first, second);
}

#[parameterized(
    simple = { "${NAME}", "value" },
    embedded = { "pre-${NAME}-post", "pre-value-post" },
    repeated = { "${NAME}${NAME}", "valuevalue" },
    underscore_ident = { "${_NAME}", "" },
    missing = { "${OTHER}", "" },
    unterminated = { "${NAME", "${NAME" },
    digit_start = { "${1BAD}", "${1BAD}" },
    empty_braces = { "${}", "${}" },
    bare_dollar = { "$NAME", "$NAME" },
    no_placeholder = { "plain", "plain" },
)]
fn substitute_cases(template: &str, expected: &str) {
    let vars = env(&[("NAME", "value")]);
    assert_eq!(substitute(template, &vars), expected);
}

#[test]
fn substitute_multiple_variables() {
    let vars = env(&[("HOST", "localhost"), ("PORT", "8080")]);
    assert_eq!(
        substitute("--listen=${HOST}:${PORT}", &vars),
        "--listen=localhost:8080"
    );
}

#[test]
fn substitute_empty_value_is_kept() {
    let vars = env(&[("EMPTY", "")]);
    assert_eq!(substitute("[${EMPTY}]", &vars), "[]");
}
