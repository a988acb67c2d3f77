// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Executor (C1): invokes the external tool in fork-exec or
//! persistent-shell mode, parses structured output, and records every
//! invocation in the flight recorder.

use crate::flight_recorder::{EntryHandle, FlightRecorder};
use crate::shell::ShellSession;
use crate::{forkexec, shell};
use lvmd_core::{Clock, ExecutionMeta, LvmError, LvmResult, SystemClock};
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    ForkExec,
    Shell,
}

/// Errors specific to the Executor's own plumbing, folded into
/// [`lvmd_core::LvmError`] at the public `call`/`set_mode` boundary.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("spawn failed: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("structured output corrupt for {argv:?}: {raw}")]
    StructuredOutputCorrupt { argv: Vec<String>, raw: String },
    #[error("shell desynchronized: expected {expected}, got {got}")]
    ShellDesync { expected: String, got: String },
    #[error("executor is shutting down")]
    Shutdown,
}

impl From<ExecutorError> for LvmError {
    fn from(e: ExecutorError) -> Self {
        LvmError::tool_bug(e.to_string())
    }
}

/// Result of one `call`, after structured-output parsing (§4.1's
/// contract): `exit_code`, the tagged object tree if parsing succeeded
/// (falling back to raw text otherwise), and stderr (with any embedded
/// error message from the structured output appended).
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub structured: Option<serde_json::Value>,
    pub raw_stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn is_success(&self, acceptable_codes: &[i32]) -> bool {
        self.exit_code == 0 || acceptable_codes.contains(&self.exit_code)
    }
}

enum Session {
    ForkExec,
    Shell(ShellSession),
}

/// The generic mutation surface the caller touches; fork-exec mode has no
/// persistent state beyond the Mutex that serializes mode switches, shell
/// mode owns one live child (§5: "one mutex guaranteeing only one shell
/// command in flight").
pub struct Executor<C: Clock = SystemClock> {
    tool_path: String,
    forced_env: Vec<(String, String)>,
    session: AsyncMutex<Session>,
    flight_recorder: Arc<SyncMutex<FlightRecorder>>,
    shutdown: CancellationToken,
    clock: C,
}

impl<C: Clock> Executor<C> {
    pub fn new(tool_path: impl Into<String>, forced_env: Vec<(String, String)>, clock: C, flight_recorder_capacity: usize) -> Self {
        Self {
            tool_path: tool_path.into(),
            forced_env,
            session: AsyncMutex::new(Session::ForkExec),
            flight_recorder: Arc::new(SyncMutex::new(FlightRecorder::new(flight_recorder_capacity))),
            shutdown: CancellationToken::new(),
            clock,
        }
    }

    pub fn flight_recorder(&self) -> Arc<SyncMutex<FlightRecorder>> {
        self.flight_recorder.clone()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Switch execution mode. Tearing shell down to go to fork-exec always
    /// succeeds; constructing a shell only succeeds if structured output
    /// is available from it, and failure silently falls back to fork-exec
    /// rather than raising (§4.1).
    pub async fn set_mode(&self, mode: ExecMode) {
        let mut session = self.session.lock().await;
        match (mode, &mut *session) {
            (ExecMode::ForkExec, Session::Shell(_)) => {
                if let Session::Shell(old) = std::mem::replace(&mut *session, Session::ForkExec) {
                    old.shutdown().await;
                }
            }
            (ExecMode::Shell, Session::ForkExec) => {
                match ShellSession::spawn(&self.tool_path, &self.forced_env).await {
                    Ok(new_session) => *session = Session::Shell(new_session),
                    Err(e) => {
                        tracing::warn!(error = %e, "falling back to fork-exec: shell construction failed");
                    }
                }
            }
            _ => {}
        }
    }

    pub async fn mode(&self) -> ExecMode {
        match &*self.session.lock().await {
            Session::ForkExec => ExecMode::ForkExec,
            Session::Shell(_) => ExecMode::Shell,
        }
    }

    /// Invoke the tool with `argv`. Non-zero exit is not itself a failure
    /// — it is returned as data. Spawn failure and shell desync surface as
    /// `LvmError::ToolBug`.
    pub async fn call(&self, argv: Vec<String>) -> LvmResult<ExecOutput> {
        self.call_with_progress(argv, |_| {}).await
    }

    /// Like [`Self::call`] but invokes `on_stdout_line` for every stdout
    /// line as it streams in (used by background operations to parse
    /// progress percentages). Only meaningful in fork-exec mode; shell
    /// mode's report is read as a whole once the prompt reappears.
    pub async fn call_with_progress(
        &self,
        argv: Vec<String>,
        on_stdout_line: impl FnMut(&str) + Send,
    ) -> LvmResult<ExecOutput> {
        if self.shutdown.is_cancelled() {
            return Err(LvmError::Shutdown);
        }

        let entry = self.start_entry(argv.clone());
        let result = self.dispatch(&argv, on_stdout_line).await;
        self.finish_entry(&entry, &result);
        result
    }

    fn start_entry(&self, argv: Vec<String>) -> EntryHandle {
        let meta = ExecutionMeta::started(argv, self.clock.now());
        self.flight_recorder.lock().record_started(meta)
    }

    fn finish_entry(&self, entry: &EntryHandle, result: &LvmResult<ExecOutput>) {
        let now = self.clock.now();
        let mut meta = entry.lock();
        match result {
            Ok(out) => meta.finish(now, out.exit_code, out.raw_stdout.clone(), out.stderr.clone()),
            Err(e) => meta.finish(now, -1, String::new(), e.to_string()),
        }
    }

    async fn dispatch(
        &self,
        argv: &[String],
        mut on_stdout_line: impl FnMut(&str) + Send,
    ) -> LvmResult<ExecOutput> {
        let mut session = self.session.lock().await;
        match &mut *session {
            Session::ForkExec => {
                let raw = forkexec::run(&self.tool_path, argv, &self.forced_env, &self.shutdown, &mut on_stdout_line)
                    .await?;
                Ok(parse_output(argv, raw.exit_code, raw.stdout, raw.stderr))
            }
            Session::Shell(shell_session) => {
                let (exit_code, report) = shell_session.call(argv).await?;
                Ok(parse_output(argv, exit_code, report, String::new()))
            }
        }
    }
}

/// Structured-output parsing contract: try JSON first; fall back to raw
/// text when parsing fails, leaving the caller to treat it as
/// non-structured (§4.1). An embedded `"error"` field in the structured
/// tree is appended to stderr.
fn parse_output(_argv: &[String], exit_code: i32, stdout: String, mut stderr: String) -> ExecOutput {
    let structured = serde_json::from_str::<serde_json::Value>(&stdout).ok();
    if let Some(value) = &structured {
        if let Some(msg) = value.get("error").and_then(|e| e.as_str()) {
            if !stderr.is_empty() {
                stderr.push('\n');
            }
            stderr.push_str(msg);
        }
    }
    ExecOutput { exit_code, structured, raw_stdout: stdout, stderr }
}

pub use shell::PROMPT_TIMEOUT;

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
