// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

//! Read-only log retrieval: tail and poll-follow
//!
//! Deliberately thin: log files are append-only merged stdout/stderr
//! written by the supervisor; this module only reads them.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Duration;

const FOLLOW_INTERVAL: Duration = Duration::from_millis(500);

/// Last `count` lines of the file.
pub fn tail(path: &Path, count: usize) -> io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let all: Vec<&str> = content.lines().collect();
    let skip = all.len().saturating_sub(count);
    Ok(all[skip..].iter().map(|s| (*s).to_string()).collect())
}

/// Follow the file from its current end, printing new content as it
/// appears. Runs until the invoking process is interrupted.
pub async fn follow(path: &Path) -> io::Result<()> {
    let mut offset = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    loop {
        tokio::time::sleep(FOLLOW_INTERVAL).await;

        let len = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            // Rotated away or not yet recreated
            Err(_) => continue,
        };
        if len < offset {
            // Truncated: start over from the top
            offset = 0;
        }
        if len > offset {
            let mut file = File::open(path)?;
            file.seek(SeekFrom::Start(offset))?;
            let mut buf = String::new();
            file.read_to_string(&mut buf)?;
            offset += buf.len() as u64;

            print!("{buf}");
            io::stdout().flush()?;
        }
    }
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
