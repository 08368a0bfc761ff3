// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Command handlers: dispatch control-surface actions to the supervisor
//!
//! Batch semantics throughout: a name omitted means every defined name,
//! and one name's failure never prevents the rest from being attempted.
//! The exit code is 1 if any name reported an error, 0 otherwise.

use crate::logs;
use crate::output::{OutputFormat, Report};
use anyhow::{Context, Result};
use herd_supervisor::{
    SpawnMode, StartOutcome, Status, StopOutcome, Supervisor, SupervisorError,
};
use serde_json::json;

fn mode(detach: bool) -> SpawnMode {
    if detach {
        SpawnMode::Detached
    } else {
        SpawnMode::Attached
    }
}

type Outcomes<T> = Vec<(String, Result<T, SupervisorError>)>;

fn status_json(status: Status) -> serde_json::Value {
    match status {
        Status::Running(pid) => json!({ "state": "running", "pid": pid }),
        Status::Stopped => json!({ "state": "stopped" }),
    }
}

pub async fn start(
    sup: &mut Supervisor,
    name: Option<&str>,
    detach: bool,
    format: OutputFormat,
) -> Result<i32> {
    let spawn_mode = mode(detach);
    let results: Outcomes<StartOutcome> = match name {
        Some(name) => vec![(name.to_string(), sup.start(name, spawn_mode))],
        None => sup.start_all(spawn_mode),
    };

    let mut report = Report::new(format);
    let mut failed = false;
    for (name, result) in results {
        match result {
            Ok(StartOutcome::Started(pid)) => report.row(
                format!("started {name} (pid {pid})"),
                json!({ "name": name, "outcome": "started", "pid": pid }),
            ),
            Ok(StartOutcome::AlreadyRunning(pid)) => report.row(
                format!("{name} is already running (pid {pid})"),
                json!({ "name": name, "outcome": "already-running", "pid": pid }),
            ),
            Err(e) => {
                failed = true;
                report.error_row(
                    e.to_string(),
                    json!({ "name": name, "outcome": "error", "error": e.to_string() }),
                );
            }
        }
    }
    report.finish()?;

    // Attached mode parks here, holding runtime handles until the
    // children exit or an interrupt arrives.
    if spawn_mode == SpawnMode::Attached {
        sup.supervise().await?;
    }
    Ok(i32::from(failed))
}

pub fn stop(sup: &mut Supervisor, name: Option<&str>, format: OutputFormat) -> Result<i32> {
    let results: Outcomes<StopOutcome> = match name {
        Some(name) => vec![(name.to_string(), sup.stop(name))],
        None => sup.stop_all(),
    };

    let mut report = Report::new(format);
    let mut failed = false;
    for (name, result) in results {
        match result {
            Ok(StopOutcome::Stopped(pid)) => report.row(
                format!("stopped {name} (pid {pid})"),
                json!({ "name": name, "outcome": "stopped", "pid": pid }),
            ),
            Ok(StopOutcome::NotRunning) => report.row(
                format!("{name} is not running"),
                json!({ "name": name, "outcome": "not-running" }),
            ),
            Ok(StopOutcome::SignalFailed { pid, reason }) => {
                failed = true;
                report.error_row(
                    format!("{name}: signal to pid {pid} failed: {reason}"),
                    json!({ "name": name, "outcome": "signal-failed", "pid": pid, "error": reason }),
                );
            }
            Err(e) => {
                failed = true;
                report.error_row(
                    e.to_string(),
                    json!({ "name": name, "outcome": "error", "error": e.to_string() }),
                );
            }
        }
    }
    report.finish()?;
    Ok(i32::from(failed))
}

pub async fn restart(
    sup: &mut Supervisor,
    name: Option<&str>,
    detach: bool,
    format: OutputFormat,
) -> Result<i32> {
    let spawn_mode = mode(detach);
    let results: Outcomes<(StopOutcome, StartOutcome)> = match name {
        Some(name) => vec![(name.to_string(), sup.restart(name, spawn_mode))],
        None => sup.restart_all(spawn_mode),
    };

    let mut report = Report::new(format);
    let mut failed = false;
    for (name, result) in results {
        match result {
            Ok((_, StartOutcome::Started(pid))) => report.row(
                format!("restarted {name} (pid {pid})"),
                json!({ "name": name, "outcome": "restarted", "pid": pid }),
            ),
            Ok((_, StartOutcome::AlreadyRunning(pid))) => report.row(
                format!("{name} is already running (pid {pid})"),
                json!({ "name": name, "outcome": "already-running", "pid": pid }),
            ),
            Err(e) => {
                failed = true;
                report.error_row(
                    e.to_string(),
                    json!({ "name": name, "outcome": "error", "error": e.to_string() }),
                );
            }
        }
    }
    report.finish()?;

    if spawn_mode == SpawnMode::Attached {
        sup.supervise().await?;
    }
    Ok(i32::from(failed))
}

pub fn status(sup: &mut Supervisor, name: Option<&str>, format: OutputFormat) -> Result<i32> {
    let results: Outcomes<Status> = match name {
        Some(name) => vec![(name.to_string(), sup.status(name))],
        None => sup.list(),
    };

    let mut report = Report::new(format);
    let mut failed = false;
    for (name, result) in results {
        match result {
            Ok(Status::Running(pid)) => report.row(
                format!("{name}: running (pid {pid})"),
                json!({ "name": name, "status": status_json(Status::Running(pid)) }),
            ),
            Ok(Status::Stopped) => report.row(
                format!("{name}: stopped"),
                json!({ "name": name, "status": status_json(Status::Stopped) }),
            ),
            Err(e) => {
                failed = true;
                report.error_row(
                    e.to_string(),
                    json!({ "name": name, "outcome": "error", "error": e.to_string() }),
                );
            }
        }
    }
    report.finish()?;
    Ok(i32::from(failed))
}

pub fn inspect(sup: &mut Supervisor, name: &str, format: OutputFormat) -> Result<i32> {
    let snapshot = sup.inspect(name)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Text => {
            println!("name: {}", snapshot.name);
            match snapshot.status {
                Status::Running(pid) => println!("status: running (pid {pid})"),
                Status::Stopped => println!("status: stopped"),
            }
            let def = &snapshot.definition;
            println!("command: {} {}", def.command, def.args.join(" "));
            if let Some(cwd) = &def.cwd {
                println!("cwd: {}", cwd.display());
            }
            if let Some(log) = &def.log {
                println!("log: {}", log.display());
            }
            println!("restart_on_fail: {}", def.restart_on_fail);
            println!("global env:");
            for (key, value) in &snapshot.global_env {
                println!("  {key}={value}");
            }
            println!("merged env:");
            for (key, value) in &snapshot.merged_env {
                println!("  {key}={value}");
            }
        }
    }
    Ok(0)
}

pub async fn logs(sup: &Supervisor, name: &str, lines: usize, follow: bool) -> Result<i32> {
    let path = sup.log_path(name)?;

    let tail = logs::tail(&path, lines)
        .with_context(|| format!("no log for {name} at {}", path.display()))?;
    for line in tail {
        println!("{line}");
    }

    if follow {
        logs::follow(&path).await?;
    }
    Ok(0)
}
