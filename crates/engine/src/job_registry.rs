// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Registry (C7): addressable handles for in-progress async
//! operations, tracked by percent/complete/result and woken by a
//! `tokio::sync::Notify` (§4.7).

use lvmd_core::{JobId, JobResult, JobSnapshot, LvmError, LvmResult, ObjectPath};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// The live handle for one Job (§3 lifecycle, §4.9's state machine:
/// running -> complete -> detached).
pub struct JobHandle {
    id: JobId,
    percent: AtomicU8,
    complete: AtomicBool,
    result: Mutex<Option<JobResult>>,
    notify: Notify,
}

impl JobHandle {
    fn new(id: JobId) -> Self {
        Self { id, percent: AtomicU8::new(0), complete: AtomicBool::new(false), result: Mutex::new(None), notify: Notify::new() }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// Percent is non-decreasing (invariant 7); `fetch_max` enforces this
    /// even if callers race or report out of order.
    pub fn set_percent(&self, percent: u8) {
        self.percent.fetch_max(percent.min(100), Ordering::SeqCst);
    }

    /// Sets the terminal fields atomically and wakes every waiter
    /// (§4.7's `set_result`). Percent becomes 100 only on success,
    /// matching invariant 7's "becomes 100 on successful completion".
    pub fn set_result(&self, result: JobResult) {
        if result.is_success() {
            self.percent.store(100, Ordering::SeqCst);
        }
        *self.result.lock() = Some(result);
        self.complete.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id,
            percent: self.percent.load(Ordering::SeqCst),
            complete: self.complete.load(Ordering::SeqCst),
            result: self.result.lock().clone(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::SeqCst)
    }

    pub fn get_error(&self) -> (i32, String) {
        self.snapshot().get_error()
    }

    /// `Wait(timeout)` (§4.7): bounded or infinite, returns whether the
    /// Job was complete by the time the wait ended.
    pub async fn wait(&self, timeout: Option<Duration>) -> bool {
        match timeout {
            Some(budget) => tokio::time::timeout(budget, self.wait_forever()).await.is_ok(),
            None => {
                self.wait_forever().await;
                true
            }
        }
    }

    async fn wait_forever(&self) {
        loop {
            // Register interest before checking, so a `set_result` that
            // races between the check and the await is never missed.
            let notified = self.notify.notified();
            if self.is_complete() {
                return;
            }
            notified.await;
        }
    }
}

/// Owns every live Job by id. Jobs are created at request admission time
/// and remain addressable until explicitly removed (§3 lifecycle).
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<JobHandle>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> Arc<JobHandle> {
        self.create_with_id(JobId::new())
    }

    /// Admits a Job under a pre-allocated id (the `tmo` protocol of §4.6
    /// lets a handler hand back a Job path before its eventual result is
    /// attached).
    pub fn create_with_id(&self, id: JobId) -> Arc<JobHandle> {
        let handle = Arc::new(JobHandle::new(id));
        self.jobs.write().insert(id, handle.clone());
        handle
    }

    pub fn get(&self, id: &JobId) -> Option<Arc<JobHandle>> {
        self.jobs.read().get(id).cloned()
    }

    /// `Remove` (§4.7): only valid once complete; detaches the Job and
    /// releases the registry's reference.
    pub fn remove(&self, id: &JobId) -> LvmResult<()> {
        let handle = self.get(id).ok_or_else(|| LvmError::client(format!("no such job: {id}")))?;
        if !handle.is_complete() {
            return Err(LvmError::client("job is not complete"));
        }
        self.jobs.write().remove(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The RPC-addressable path for a Job (§6: `job_path`). Jobs are never
/// registered in the Object Manager — their id alone is stable and unique,
/// so the wire path is derived directly rather than counter-allocated.
pub fn job_path(id: JobId) -> ObjectPath {
    ObjectPath::new(format!("/org/lvmd/Job/{}", id.suffix()))
}

#[cfg(test)]
#[path = "job_registry_tests.rs"]
mod tests;
