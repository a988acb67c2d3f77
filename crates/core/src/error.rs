// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one error taxonomy shared by every crate in this workspace.

use thiserror::Error;

/// Errors surfaced anywhere along the RPC → Worker → Executor path.
///
/// Construction of [`LvmError::ToolBug`] is expected to be paired with a
/// flight-recorder dump by the caller (the recorder lives in `lvmd-adapters`
/// and cannot be referenced from here without an upward dependency, so the
/// pairing is a convention rather than something this type enforces).
#[derive(Debug, Error, Clone)]
pub enum LvmError {
    /// Bad input from the RPC caller: disallowed characters, invalid tags,
    /// a referenced path that does not resolve. No refresh is triggered.
    #[error("{0}")]
    Client(String),

    /// The external tool exited non-zero. Partial state may have changed,
    /// so callers still trigger a refresh after observing this.
    #[error("tool exited {exit_code}: {stderr}")]
    ToolFailure { exit_code: i32, stderr: String },

    /// Structured output could not be parsed, a required column was
    /// missing, or the persistent shell's prompt framing desynchronized.
    /// Counts toward the Coordinator's consecutive-failure threshold.
    #[error("tool bug: {detail}")]
    ToolBug { detail: String },

    /// I/O error reading from the subprocess. Retried only by a later
    /// request re-invoking the tool; never silently swallowed.
    #[error("transient I/O error: {detail}")]
    Transient { detail: String },

    /// Sentinel used to unblock every waiter on daemon shutdown. Cannot be
    /// caught and suppressed internally.
    #[error("daemon is shutting down")]
    Shutdown,
}

impl LvmError {
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    pub fn tool_bug(detail: impl Into<String>) -> Self {
        Self::ToolBug { detail: detail.into() }
    }

    pub fn transient(detail: impl Into<String>) -> Self {
        Self::Transient { detail: detail.into() }
    }

    /// `(exit_code, stderr)` as surfaced through `Job.GetError`, matching
    /// the on-wire fault shape used for both `ToolFailure` and `ToolBug`.
    pub fn as_job_error(&self) -> Option<(i32, String)> {
        match self {
            Self::ToolFailure { exit_code, stderr } => Some((*exit_code, stderr.clone())),
            Self::ToolBug { detail } => Some((-1, detail.clone())),
            _ => None,
        }
    }

    /// Whether this error counts toward the Coordinator's consecutive
    /// tool-bug failure threshold (see `lvmd-engine::coordinator`).
    pub fn is_tool_bug(&self) -> bool {
        matches!(self, Self::ToolBug { .. })
    }
}

pub type LvmResult<T> = Result<T, LvmError>;
