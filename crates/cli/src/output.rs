// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Output formatting for command results

use anyhow::Result;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON array of per-name outcomes
    Json,
}

/// Per-name outcome reporting.
///
/// Text mode prints each row as it happens (errors to stderr); JSON
/// mode collects rows and emits one array at the end.
pub struct Report {
    format: OutputFormat,
    rows: Vec<serde_json::Value>,
}

impl Report {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, text: String, json: serde_json::Value) {
        match self.format {
            OutputFormat::Text => println!("{text}"),
            OutputFormat::Json => self.rows.push(json),
        }
    }

    pub fn error_row(&mut self, text: String, json: serde_json::Value) {
        match self.format {
            OutputFormat::Text => eprintln!("error: {text}"),
            OutputFormat::Json => self.rows.push(json),
        }
    }

    pub fn finish(self) -> Result<()> {
        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&self.rows)?);
        }
        Ok(())
    }
}
