// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation metadata recorded around every external-tool call,
//! stored by the flight recorder (`lvmd-adapters::flight_recorder`).

use std::time::Duration;

/// Sentinel exit code meaning "interrupted by shutdown" (§4.1).
pub const SHUTDOWN_EXIT_CODE: i32 = -1;

/// `ExecutionMeta`: created before each external invocation, finalized on
/// completion (§3's lifecycle note). `argv` is kept as `Vec<String>`
/// rather than a shell string so it can be rendered without re-escaping.
#[derive(Debug, Clone)]
pub struct ExecutionMeta {
    pub argv: Vec<String>,
    pub started_at: std::time::Instant,
    pub finished: Option<FinishedExecution>,
}

#[derive(Debug, Clone)]
pub struct FinishedExecution {
    pub duration: Duration,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionMeta {
    pub fn started(argv: Vec<String>, now: std::time::Instant) -> Self {
        Self { argv, started_at: now, finished: None }
    }

    pub fn finish(&mut self, now: std::time::Instant, exit_code: i32, stdout: String, stderr: String) {
        self.finished = Some(FinishedExecution {
            duration: now.saturating_duration_since(self.started_at),
            exit_code,
            stdout,
            stderr,
        });
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    pub fn argv_display(&self) -> String {
        self.argv.join(" ")
    }
}
