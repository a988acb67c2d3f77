// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker's request-queue entry shape and the `tmo` timeout/job
//! protocol (§4.6).

use crate::error::LvmResult;
use crate::job::JobId;
use crate::path::ObjectPath;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// The timeout/job contract a `RequestEntry` is admitted with (§4.6):
/// - `Blocking` (source `tmo == -1`): run synchronously, deliver the value.
/// - `Immediate` (source `tmo == 0`): run synchronously but the handler may
///   pre-allocate and return a Job immediately if it expects to be slow.
/// - `Budget(d)` (source `tmo > 0`): run with a time budget; if it doesn't
///   finish in time, a Job is created and returned instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tmo {
    Blocking,
    Immediate,
    Budget(Duration),
}

impl Tmo {
    /// Decode the wire integer convention from §6 (`-1`, `0`, `>0` ms).
    pub fn from_millis(tmo: i64) -> Self {
        match tmo {
            i64::MIN..=-1 => Self::Blocking,
            0 => Self::Immediate,
            ms => Self::Budget(Duration::from_millis(ms as u64)),
        }
    }
}

/// The value an RPC handler resolves to, matching §6's on-wire return
/// convention: `(object_path, job_path)`, a lone `job_path`, or an
/// arbitrary JSON scalar for property/query-style calls.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    ObjectAndJob(ObjectPath, ObjectPath),
    Job(ObjectPath),
    Value(serde_json::Value),
    Unit,
}

impl ResponseValue {
    pub fn object_and_job(object: ObjectPath, job: ObjectPath) -> Self {
        Self::ObjectAndJob(object, job)
    }

    pub fn job_only(job: ObjectPath) -> Self {
        Self::Job(job)
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = LvmResult<ResponseValue>> + Send>>;

/// One pending mutating request, queued FIFO for the single Worker (§4.6).
///
/// Generic over the execution context `Ctx` (the concrete type lives in
/// `lvmd-engine`, which bundles DataStore/ObjectManager/Executor access)
/// so this shape has no upward dependency on the engine or daemon crates.
pub struct RequestEntry<Ctx> {
    pub handler: Box<dyn FnOnce(Ctx) -> HandlerFuture + Send>,
    pub tmo: Tmo,
    /// A Job pre-allocated at admission time when `tmo` implies one might
    /// be needed, so its path can be returned even if the handler itself
    /// decides synchronously.
    pub preallocated_job: Option<JobId>,
}

impl<Ctx> RequestEntry<Ctx> {
    pub fn new(
        tmo: Tmo,
        handler: impl FnOnce(Ctx) -> HandlerFuture + Send + 'static,
    ) -> Self {
        Self { handler: Box::new(handler), tmo, preallocated_job: None }
    }

    pub fn with_preallocated_job(mut self, job: JobId) -> Self {
        self.preallocated_job = Some(job);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmo_from_millis_decodes_the_wire_convention() {
        assert_eq!(Tmo::from_millis(-1), Tmo::Blocking);
        assert_eq!(Tmo::from_millis(0), Tmo::Immediate);
        assert_eq!(Tmo::from_millis(250), Tmo::Budget(Duration::from_millis(250)));
    }
}
