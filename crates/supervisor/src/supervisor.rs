// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! The per-name lifecycle state machine
//!
//! One [`Supervisor`] is constructed per invocation and owns the
//! definition table, the global environment, the pid store, and the
//! runtime handles of children this invocation spawned attached. There
//! is no ambient mutable state: two invocations coordinate only through
//! the pid store on disk.

use crate::error::SupervisorError;
use crate::spawn;
use crate::{SpawnMode, StartOutcome, Status, StopOutcome};
use herd_core::{merge_env, EnvMap, ProcessDefinition, RestartBackoff};
use herd_store::{KillProbe, LivenessProbe, PidStore};
use indexmap::IndexMap;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Instant;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

/// In-memory handle to a child this invocation spawned attached.
///
/// Never persisted; the pid record on disk is the durable twin. The
/// generation distinguishes a fresh spawn from a predecessor whose exit
/// event is still in flight.
struct RuntimeHandle {
    pid: u32,
    generation: u64,
}

/// Exit notification from a watcher task.
struct ExitEvent {
    name: String,
    generation: u64,
    status: Option<ExitStatus>,
}

/// What the supervise loop reacts to. Restart deadlines arrive as
/// events so a pending backoff never blocks the loop.
enum Event {
    Exited(ExitEvent),
    RestartDue { name: String },
}

/// Restart bookkeeping for one name within the current window.
struct RestartTracker {
    window_start: Instant,
    in_window: u32,
}

/// Snapshot returned by `inspect`.
#[derive(Debug, Serialize)]
pub struct Inspection {
    pub name: String,
    pub status: Status,
    pub definition: ProcessDefinition,
    pub global_env: EnvMap,
    pub merged_env: EnvMap,
}

/// The process lifecycle supervisor.
pub struct Supervisor<P: LivenessProbe = KillProbe> {
    definitions: IndexMap<String, ProcessDefinition>,
    global_env: EnvMap,
    state_dir: PathBuf,
    store: PidStore<P>,
    system_env: Option<EnvMap>,
    handles: HashMap<String, RuntimeHandle>,
    restarts: HashMap<String, RestartTracker>,
    pending_restarts: HashSet<String>,
    exit_tx: mpsc::UnboundedSender<Event>,
    exit_rx: Option<mpsc::UnboundedReceiver<Event>>,
    generation: u64,
}

impl Supervisor<KillProbe> {
    /// Supervisor over `state_dir` with the platform liveness probe.
    /// Pid records and default log files live in `state_dir`.
    pub fn new(
        definitions: IndexMap<String, ProcessDefinition>,
        global_env: EnvMap,
        state_dir: PathBuf,
    ) -> Self {
        Self::with_probe(definitions, global_env, state_dir, KillProbe)
    }
}

impl<P: LivenessProbe> Supervisor<P> {
    pub fn with_probe(
        definitions: IndexMap<String, ProcessDefinition>,
        global_env: EnvMap,
        state_dir: PathBuf,
        probe: P,
    ) -> Self {
        let (exit_tx, exit_rx) = mpsc::unbounded_channel();
        Self {
            store: PidStore::new(state_dir.clone(), probe),
            definitions,
            global_env,
            state_dir,
            system_env: None,
            handles: HashMap::new(),
            restarts: HashMap::new(),
            pending_restarts: HashSet::new(),
            exit_tx,
            exit_rx: Some(exit_rx),
            generation: 0,
        }
    }

    /// Pin the system environment layer instead of reading the live
    /// process environment on each start.
    pub fn with_system_env(mut self, env: EnvMap) -> Self {
        self.system_env = Some(env);
        self
    }

    /// Defined process names, in definition order.
    pub fn names(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }

    pub fn definition(&self, name: &str) -> Option<&ProcessDefinition> {
        self.definitions.get(name)
    }

    /// Default log path for a name: `<state_dir>/<name>.log`, unless
    /// the definition configures its own.
    pub fn log_path(&self, name: &str) -> Result<PathBuf, SupervisorError> {
        let def = self.lookup(name)?;
        Ok(match &def.log {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.state_dir.join(path),
            None => self.state_dir.join(format!("{name}.log")),
        })
    }

    fn lookup(&self, name: &str) -> Result<&ProcessDefinition, SupervisorError> {
        self.definitions
            .get(name)
            .ok_or_else(|| SupervisorError::UnknownProcess(name.to_string()))
    }

    fn system_env(&self) -> EnvMap {
        match &self.system_env {
            Some(env) => env.clone(),
            None => std::env::vars().collect(),
        }
    }

    /// Start `name` unless a live record or runtime handle already
    /// claims it. On success the pid record is written; spawn failure
    /// writes no record.
    pub fn start(&mut self, name: &str, mode: SpawnMode) -> Result<StartOutcome, SupervisorError> {
        let def = self.lookup(name)?.clone();

        if let Some(handle) = self.handles.get(name) {
            return Ok(StartOutcome::AlreadyRunning(handle.pid));
        }
        if let Some(pid) = self.store.check_and_heal(name)? {
            return Ok(StartOutcome::AlreadyRunning(pid));
        }

        let (env, args) = herd_core::resolve(&def, &self.global_env, &self.system_env());
        let log_path = self.log_path(name)?;
        let spawned = spawn::spawn(&def, name, &env, &args, &log_path, mode)?;
        self.store.write(name, spawned.pid)?;

        if let Some(child) = spawned.child {
            self.generation += 1;
            self.handles.insert(
                name.to_string(),
                RuntimeHandle {
                    pid: spawned.pid,
                    generation: self.generation,
                },
            );
            self.watch_exit(name.to_string(), self.generation, child);
        }

        tracing::info!(name, pid = spawned.pid, ?mode, "started process");
        Ok(StartOutcome::Started(spawned.pid))
    }

    /// Watcher task: reap the child and report its exit. The handle map
    /// stays with the supervisor; stop acts by signal, never by
    /// retracting an in-flight wait.
    fn watch_exit(&self, name: String, generation: u64, mut child: tokio::process::Child) {
        let tx = self.exit_tx.clone();
        tokio::spawn(async move {
            let status = child.wait().await.ok();
            let _ = tx.send(Event::Exited(ExitEvent {
                name,
                generation,
                status,
            }));
        });
    }

    /// Stop `name` by SIGTERM to its recorded pid. Liveness is not
    /// re-verified; a failed signal is reported but the record is
    /// removed either way.
    pub fn stop(&mut self, name: &str) -> Result<StopOutcome, SupervisorError> {
        self.lookup(name)?;

        let handle_pid = self.handles.remove(name).map(|h| h.pid);
        let Some(pid) = handle_pid.or_else(|| self.store.read(name)) else {
            return Ok(StopOutcome::NotRunning);
        };

        // Operator-initiated stop also clears restart bookkeeping and
        // cancels any restart still waiting out its backoff.
        self.restarts.remove(name);
        self.pending_restarts.remove(name);

        let signalled = send_term(pid);
        self.store.remove(name)?;

        match signalled {
            Ok(()) => {
                tracing::info!(name, pid, "stopped process");
                Ok(StopOutcome::Stopped(pid))
            }
            Err(reason) => {
                tracing::warn!(name, pid, %reason, "signal delivery failed on stop");
                Ok(StopOutcome::SignalFailed { pid, reason })
            }
        }
    }

    /// Stop followed immediately by start. Deliberately not atomic: a
    /// crash between the steps leaves the process stopped.
    pub fn restart(
        &mut self,
        name: &str,
        mode: SpawnMode,
    ) -> Result<(StopOutcome, StartOutcome), SupervisorError> {
        let stopped = self.stop(name)?;
        let started = self.start(name, mode)?;
        Ok((stopped, started))
    }

    /// Status of `name`, healing any stale record as a side effect.
    pub fn status(&mut self, name: &str) -> Result<Status, SupervisorError> {
        self.lookup(name)?;
        if let Some(handle) = self.handles.get(name) {
            return Ok(Status::Running(handle.pid));
        }
        Ok(match self.store.check_and_heal(name)? {
            Some(pid) => Status::Running(pid),
            None => Status::Stopped,
        })
    }

    /// Status of every defined name, in definition order.
    pub fn list(&mut self) -> Vec<(String, Result<Status, SupervisorError>)> {
        self.for_each_name(|sup, name| sup.status(name))
    }

    /// Full snapshot of one name: status, definition, and the
    /// environment layers as they would merge on the next start.
    pub fn inspect(&mut self, name: &str) -> Result<Inspection, SupervisorError> {
        let def = self.lookup(name)?.clone();
        let status = self.status(name)?;
        let merged_env = merge_env(&self.system_env(), &self.global_env, &def.env);
        Ok(Inspection {
            name: name.to_string(),
            status,
            definition: def,
            global_env: self.global_env.clone(),
            merged_env,
        })
    }

    /// Apply start to every defined name; one name's failure never
    /// prevents the rest from being attempted.
    pub fn start_all(
        &mut self,
        mode: SpawnMode,
    ) -> Vec<(String, Result<StartOutcome, SupervisorError>)> {
        self.for_each_name(|sup, name| sup.start(name, mode))
    }

    pub fn stop_all(&mut self) -> Vec<(String, Result<StopOutcome, SupervisorError>)> {
        self.for_each_name(|sup, name| sup.stop(name))
    }

    pub fn restart_all(
        &mut self,
        mode: SpawnMode,
    ) -> Vec<(String, Result<(StopOutcome, StartOutcome), SupervisorError>)> {
        self.for_each_name(|sup, name| sup.restart(name, mode))
    }

    fn for_each_name<T>(
        &mut self,
        mut op: impl FnMut(&mut Self, &str) -> Result<T, SupervisorError>,
    ) -> Vec<(String, Result<T, SupervisorError>)> {
        self.names()
            .into_iter()
            .map(|name| {
                let result = op(self, &name);
                (name, result)
            })
            .collect()
    }

    /// Whether this invocation currently holds any runtime handles.
    pub fn is_attached(&self) -> bool {
        !self.handles.is_empty()
    }

    /// Attached-mode supervision: park until every attached child has
    /// exited with no restart pending, or an interrupt arrives.
    ///
    /// On SIGINT/SIGTERM every name held as a runtime handle (and only
    /// those) is stopped before returning.
    pub async fn supervise(&mut self) -> Result<(), SupervisorError> {
        if self.handles.is_empty() && self.pending_restarts.is_empty() {
            return Ok(());
        }
        let Some(mut rx) = self.exit_rx.take() else {
            return Ok(());
        };
        let result = self.supervise_loop(&mut rx).await;
        self.exit_rx = Some(rx);
        result
    }

    async fn supervise_loop(
        &mut self,
        rx: &mut mpsc::UnboundedReceiver<Event>,
    ) -> Result<(), SupervisorError> {
        let mut sigint = signal(SignalKind::interrupt()).map_err(SupervisorError::Signal)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(SupervisorError::Signal)?;

        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    match event {
                        Event::Exited(exit) => self.handle_exit(exit),
                        Event::RestartDue { name } => self.handle_restart_due(&name),
                    }
                    if self.handles.is_empty() && self.pending_restarts.is_empty() {
                        break;
                    }
                }
                _ = sigint.recv() => {
                    self.stop_attached("SIGINT");
                    break;
                }
                _ = sigterm.recv() => {
                    self.stop_attached("SIGTERM");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Shutdown handler: stop everything this invocation is attached
    /// to, independently per name.
    fn stop_attached(&mut self, interrupt: &str) {
        tracing::info!(interrupt, "interrupt received, stopping attached processes");
        let names: Vec<String> = self.handles.keys().cloned().collect();
        for name in names {
            if let Err(e) = self.stop(&name) {
                tracing::error!(name, error = %e, "failed to stop process during shutdown");
            }
        }
    }

    /// React to an observed exit: clear state, then schedule a restart
    /// if the definition asks for it and the backoff budget allows.
    fn handle_exit(&mut self, event: ExitEvent) {
        let current = self
            .handles
            .get(&event.name)
            .is_some_and(|h| h.generation == event.generation);
        if !current {
            // Stopped by the operator, or superseded by a fresh spawn;
            // the stop path already cleaned up.
            return;
        }

        self.handles.remove(&event.name);
        // One name's record trouble must not abort supervision of the
        // rest; the record stays stale and heals on the next touch.
        if let Err(e) = self.store.remove(&event.name) {
            tracing::error!(name = %event.name, error = %e, "failed to remove pid record after exit");
        }
        tracing::info!(
            name = %event.name,
            exit = %describe_exit(event.status),
            "process exited"
        );

        let Some(def) = self.definitions.get(&event.name) else {
            return;
        };
        if !def.restart_on_fail {
            return;
        }

        let backoff = def.backoff;
        match self.next_restart_delay(&event.name, &backoff) {
            Some(delay) => self.schedule_restart(&event.name, delay),
            None => {
                tracing::warn!(
                    name = %event.name,
                    max_restarts = backoff.max_restarts,
                    window_secs = backoff.window_secs,
                    "restart budget exhausted, leaving process stopped"
                );
            }
        }
    }

    /// Arrange for `name` to restart after `delay` without blocking the
    /// supervise loop: the deadline comes back as an [`Event::RestartDue`].
    fn schedule_restart(&mut self, name: &str, delay: std::time::Duration) {
        tracing::info!(name, delay_ms = delay.as_millis() as u64, "restart scheduled");
        self.pending_restarts.insert(name.to_string());
        let tx = self.exit_tx.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let _ = tx.send(Event::RestartDue { name });
        });
    }

    fn handle_restart_due(&mut self, name: &str) {
        if !self.pending_restarts.remove(name) {
            // Cancelled by an operator stop while the delay ran.
            return;
        }
        match self.start(name, SpawnMode::Attached) {
            Ok(StartOutcome::Started(pid)) => {
                tracing::info!(name, pid, "restarted after exit");
            }
            Ok(StartOutcome::AlreadyRunning(pid)) => {
                // Another invocation claimed the name in between.
                tracing::info!(name, pid, "already restarted elsewhere");
            }
            Err(e) => {
                tracing::error!(name, error = %e, "restart failed");
            }
        }
    }

    /// Backoff decision for the next restart of `name`: the delay to
    /// wait, or `None` when the window's budget is spent.
    fn next_restart_delay(
        &mut self,
        name: &str,
        backoff: &RestartBackoff,
    ) -> Option<std::time::Duration> {
        let now = Instant::now();
        let tracker = self
            .restarts
            .entry(name.to_string())
            .or_insert(RestartTracker {
                window_start: now,
                in_window: 0,
            });

        if now.duration_since(tracker.window_start) > backoff.window() {
            tracker.window_start = now;
            tracker.in_window = 0;
        }
        if tracker.in_window >= backoff.max_restarts {
            return None;
        }
        let delay = backoff.delay_for(tracker.in_window);
        tracker.in_window += 1;
        Some(delay)
    }
}

fn send_term(pid: u32) -> Result<(), String> {
    let raw = i32::try_from(pid).map_err(|_| format!("pid {pid} out of range"))?;
    kill(Pid::from_raw(raw), Signal::SIGTERM).map_err(|e| e.to_string())
}

fn describe_exit(status: Option<ExitStatus>) -> String {
    match status {
        Some(status) => match (status.code(), status.signal()) {
            (Some(code), _) => format!("code {code}"),
            (None, Some(sig)) => format!("signal {sig}"),
            (None, None) => "unknown".to_string(),
        },
        None => "unobserved".to_string(),
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
