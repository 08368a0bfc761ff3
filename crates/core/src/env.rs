// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Layered environment resolution and `${VAR}` argument substitution
//!
//! Three layers merge into the final environment of a spawned process,
//! later layers winning on key collision: system environment, global
//! config environment, process-level overrides. Argument templates are
//! substituted against the merged result.

use crate::definition::ProcessDefinition;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Environment mapping, ordered for deterministic iteration.
pub type EnvMap = BTreeMap<String, String>;

/// Regex pattern for `${IDENTIFIER}` placeholders.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("constant regex pattern is valid")
});

/// Merge the three environment layers, key-wise last-write-wins:
/// system < global < process.
pub fn merge_env(system: &EnvMap, global: &EnvMap, process: &EnvMap) -> EnvMap {
    let mut merged = system.clone();
    merged.extend(global.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged.extend(process.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Substitute `${NAME}` occurrences in one template from the merged env.
///
/// Names with no binding substitute the empty string. Malformed
/// placeholders (unterminated, non-identifier) pass through literally.
pub fn substitute(template: &str, env: &EnvMap) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match env.get(name) {
                Some(val) => val.clone(),
                None => {
                    tracing::debug!(name, template, "unset variable substitutes empty string");
                    String::new()
                }
            }
        })
        .to_string()
}

/// Resolve a definition's final environment and argument list.
///
/// Pure and deterministic given its three inputs; recomputed on every
/// start attempt, never persisted.
pub fn resolve(
    def: &ProcessDefinition,
    global: &EnvMap,
    system: &EnvMap,
) -> (EnvMap, Vec<String>) {
    let env = merge_env(system, global, &def.env);
    let args = def.args.iter().map(|t| substitute(t, &env)).collect();
    (env, args)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
