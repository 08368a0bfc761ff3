// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! herd - lightweight multi-process supervisor CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod config;
mod logs;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use herd_supervisor::Supervisor;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "herd",
    version,
    about = "herd - lightweight multi-process supervisor"
)]
struct Cli {
    /// Process definition file
    #[arg(
        short = 'c',
        long = "config",
        default_value = "herd.toml",
        global = true
    )]
    config: PathBuf,

    /// State directory for pid records and logs (default: working directory)
    #[arg(long = "dir", global = true)]
    dir: Option<PathBuf>,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start one process, or every defined process
    Start {
        name: Option<String>,
        /// Spawn and return instead of staying attached
        #[arg(long)]
        detach: bool,
    },
    /// Stop one process, or every defined process
    Stop { name: Option<String> },
    /// Stop and start one process, or every defined process
    Restart {
        name: Option<String>,
        /// Spawn and return instead of staying attached
        #[arg(long)]
        detach: bool,
    },
    /// Report running/stopped for one process, or every defined process
    Status { name: Option<String> },
    /// List every defined process with its status
    List,
    /// Show a full snapshot of one process
    Inspect { name: String },
    /// Print the tail of a process log
    Logs {
        name: String,
        /// Number of lines from the end
        #[arg(short = 'n', long = "lines", default_value_t = 20)]
        lines: usize,
        /// Keep following the log as it grows
        #[arg(short = 'f', long)]
        follow: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", format_error(&e));
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("HERD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, the
/// "Caused by" chain is skipped to avoid noisy duplicate output (common
/// when thiserror variants use `#[error("... {source}")]` with `#[from]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // No subcommand: print help and exit 0
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(0);
    };

    // Configuration load failure is fatal before any supervision runs
    let config = config::Config::load(&cli.config)?;
    let state_dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut supervisor = Supervisor::new(config.processes, config.env, state_dir);
    let format = cli.output;

    match command {
        Commands::Start { name, detach } => {
            commands::start(&mut supervisor, name.as_deref(), detach, format).await
        }
        Commands::Stop { name } => commands::stop(&mut supervisor, name.as_deref(), format),
        Commands::Restart { name, detach } => {
            commands::restart(&mut supervisor, name.as_deref(), detach, format).await
        }
        Commands::Status { name } => commands::status(&mut supervisor, name.as_deref(), format),
        Commands::List => commands::status(&mut supervisor, None, format),
        Commands::Inspect { name } => commands::inspect(&mut supervisor, &name, format),
        Commands::Logs {
            name,
            lines,
            follow,
        } => commands::logs(&supervisor, &name, lines, follow).await,
    }
}
