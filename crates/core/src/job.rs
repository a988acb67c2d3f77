// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job entity: the data shapes for an addressable in-progress operation.
//!
//! The live, mutated-under-atomics handle (`JobHandle`) lives in
//! `lvmd-engine::job_registry` since it needs `tokio::sync::Notify`; this
//! module only defines the identity and the immutable result/snapshot
//! shapes shared across crate boundaries.

use crate::path::ObjectPath;

crate::define_id! {
    /// Identity of a Job entity (§3: "uuid" — realized as an opaque id
    /// rather than a re-derived lvm uuid, since jobs are a daemon-side
    /// concept with no on-disk counterpart).
    pub struct JobId("job-");
}

/// Sentinel returned by `GetError` before a Job completes (§4.7).
pub const NOT_COMPLETE_ERROR: (i32, &str) = (-1, "Job is not complete");

/// The terminal outcome of a Job once `set_result` has been called.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    /// The opaque result path, or [`ObjectPath::none`] if the operation
    /// produced no addressable object.
    pub path: ObjectPath,
    pub exit_code: i32,
    pub error_text: String,
}

impl JobResult {
    pub fn success(path: ObjectPath) -> Self {
        Self { path, exit_code: 0, error_text: String::new() }
    }

    pub fn failure(exit_code: i32, error_text: impl Into<String>) -> Self {
        Self { path: ObjectPath::none(), exit_code, error_text: error_text.into() }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// The three states a Job moves through (§4.9's state machine): running,
/// complete, detached. Transitions are one-way; `Remove` is only valid
/// from `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Complete,
    Detached,
}

/// A read-only snapshot of a Job's fields, as surfaced by RPC property
/// reads (`Percent`, `Complete`, `Result`, `GetError`).
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub id: JobId,
    pub percent: u8,
    pub complete: bool,
    pub result: Option<JobResult>,
}

impl JobSnapshot {
    /// `GetError`: valid only when complete, otherwise the documented
    /// sentinel (§4.7).
    pub fn get_error(&self) -> (i32, String) {
        match (&self.result, self.complete) {
            (Some(result), true) => (result.exit_code, result.error_text.clone()),
            _ => (NOT_COMPLETE_ERROR.0, NOT_COMPLETE_ERROR.1.to_string()),
        }
    }
}
