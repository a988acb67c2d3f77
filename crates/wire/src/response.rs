// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one response shape the local transport sends back (§6A): either
//! `{"ok": <json>}` or `{"error": {...}}`.

use lvmd_core::{LvmError, LvmResult, ResponseValue};
use serde::{Deserialize, Serialize};

/// The fault taxonomy as it appears on the wire, one-to-one with
/// [`LvmError`]'s variants minus `Transient` (never reaches an RPC caller:
/// it is retried internally by a later request, not surfaced as a reply).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Client,
    ToolFailure,
    ToolBug,
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl From<&LvmError> for WireError {
    fn from(err: &LvmError) -> Self {
        match err {
            LvmError::Client(msg) => Self { kind: ErrorKind::Client, message: msg.clone(), exit_code: None },
            LvmError::ToolFailure { exit_code, stderr } => {
                Self { kind: ErrorKind::ToolFailure, message: stderr.clone(), exit_code: Some(*exit_code) }
            }
            LvmError::ToolBug { detail } => Self { kind: ErrorKind::ToolBug, message: detail.clone(), exit_code: None },
            LvmError::Transient { detail } => Self { kind: ErrorKind::ToolBug, message: detail.clone(), exit_code: None },
            LvmError::Shutdown => Self { kind: ErrorKind::Shutdown, message: err.to_string(), exit_code: None },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireResponse {
    Ok { ok: serde_json::Value },
    Error { error: WireError },
}

impl WireResponse {
    pub fn ok(value: serde_json::Value) -> Self {
        Self::Ok { ok: value }
    }

    pub fn from_error(err: &LvmError) -> Self {
        Self::Error { error: err.into() }
    }

    /// Converts a handler's outcome into the on-wire reply, applying §6's
    /// return convention: a mutating call with a spawned job replies with
    /// `[object_path, job_path]`, a lone job replies with just the job
    /// path, and a query replies with its scalar value.
    pub fn from_result(result: &LvmResult<ResponseValue>) -> Self {
        match result {
            Ok(ResponseValue::ObjectAndJob(object, job)) => {
                Self::ok(serde_json::json!([object.as_str(), job.as_str()]))
            }
            Ok(ResponseValue::Job(job)) => Self::ok(serde_json::json!(job.as_str())),
            Ok(ResponseValue::Value(value)) => Self::ok(value.clone()),
            Ok(ResponseValue::Unit) => Self::ok(serde_json::Value::Null),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
