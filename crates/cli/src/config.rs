// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Configuration loading for the herd CLI
//!
//! `herd.toml` supplies the resolved definition table and the global
//! environment. The supervisor treats both as read-only input.

use herd_core::{EnvMap, ProcessDefinition};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Parsed configuration: global environment plus the definition table,
/// in file order.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub env: EnvMap,
    #[serde(default)]
    pub processes: IndexMap<String, ProcessDefinition>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Config {
    /// Load and parse a config file. Any failure here is fatal to the
    /// whole invocation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
