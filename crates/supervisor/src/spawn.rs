// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Child process spawning for both execution modes
//!
//! Attached children are tokio processes whose exit the supervise loop
//! observes. Detached children are spawned into their own process group
//! with std so they survive the invoking process.

use crate::error::SupervisorError;
use crate::SpawnMode;
use herd_core::{EnvMap, ProcessDefinition};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::process::Stdio;

/// A freshly spawned child. `child` is present only in attached mode.
pub(crate) struct Spawned {
    pub pid: u32,
    pub child: Option<tokio::process::Child>,
}

/// Open the log file in append mode, twice: one descriptor for stdout,
/// one for stderr, both pointing at the same file. Append mode keeps
/// concurrent writers from truncating each other's output.
fn open_log(name: &str, path: &Path) -> Result<(File, File), SupervisorError> {
    let open = || -> io::Result<(File, File)> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let out = OpenOptions::new().create(true).append(true).open(path)?;
        let err = out.try_clone()?;
        Ok((out, err))
    };
    open().map_err(|source| SupervisorError::LogOpen {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

/// Spawn the OS process for `name` with fully resolved env and args.
pub(crate) fn spawn(
    def: &ProcessDefinition,
    name: &str,
    env: &EnvMap,
    args: &[String],
    log_path: &Path,
    mode: SpawnMode,
) -> Result<Spawned, SupervisorError> {
    let (out, err) = open_log(name, log_path)?;
    let spawn_err = |source: io::Error| SupervisorError::Spawn {
        name: name.to_string(),
        source,
    };

    match mode {
        SpawnMode::Attached => {
            let mut cmd = tokio::process::Command::new(&def.command);
            cmd.args(args)
                .env_clear()
                .envs(env)
                .stdin(Stdio::null())
                .stdout(Stdio::from(out))
                .stderr(Stdio::from(err))
                .kill_on_drop(false);
            if let Some(cwd) = &def.cwd {
                cmd.current_dir(cwd);
            }

            let child = cmd.spawn().map_err(spawn_err)?;
            let pid = child
                .id()
                .ok_or_else(|| spawn_err(io::Error::other("spawned process has no pid")))?;
            Ok(Spawned {
                pid,
                child: Some(child),
            })
        }
        SpawnMode::Detached => {
            use std::os::unix::process::CommandExt;

            let mut cmd = std::process::Command::new(&def.command);
            cmd.args(args)
                .env_clear()
                .envs(env)
                .stdin(Stdio::null())
                .stdout(Stdio::from(out))
                .stderr(Stdio::from(err))
                // New process group: the child's lifetime is unlinked
                // from the invoking process and its terminal signals.
                .process_group(0);
            if let Some(cwd) = &def.cwd {
                cmd.current_dir(cwd);
            }

            let child = cmd.spawn().map_err(spawn_err)?;
            Ok(Spawned {
                pid: child.id(),
                child: None,
            })
        }
    }
}
