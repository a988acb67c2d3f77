// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DaemonContext`: everything the RPC handler table touches, wiring the
//! engine's `EngineContext` together with the Worker handle, the Reaper,
//! and process-wide bookkeeping (§9 Design Notes).

use lvmd_adapters::Executor;
use lvmd_core::{JobId, LvmError, LvmResult, ResponseValue, SystemClock, Tmo};
use lvmd_datastore::DataStore;
use lvmd_engine::{job_path, CoordinatorHandle, EngineContext, JobRegistry, ObjectManager, Reaper, WorkerHandle};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct DaemonContext {
    pub datastore: Arc<DataStore<SystemClock>>,
    pub object_manager: Arc<ObjectManager>,
    pub executor: Arc<Executor<SystemClock>>,
    pub jobs: Arc<JobRegistry>,
    pub coordinator: CoordinatorHandle,
    pub worker: WorkerHandle<EngineContext<SystemClock>>,
    pub reaper: Arc<Reaper>,
    pub shutdown: CancellationToken,
    pub start_time: Instant,
    pub background_tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl DaemonContext {
    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Submits `handler` to the Worker under `tmo`'s protocol and resolves
    /// to whatever an RPC caller over the wire should see: the handler's
    /// real outcome for `Blocking`/`Immediate`, or a Job path if `Budget`
    /// elapses before the handler finishes (§4.6).
    ///
    /// The handler's own result is always delivered to its Job by the
    /// Worker (see `lvmd-engine::worker::run_budgeted`); this just races
    /// an independent reply channel against the same budget so a slow
    /// handler can't stall the caller past its requested timeout.
    pub async fn submit(
        &self,
        tmo: Tmo,
        handler: impl FnOnce(EngineContext<SystemClock>) -> lvmd_core::HandlerFuture + Send + 'static,
    ) -> LvmResult<ResponseValue> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let preallocated: Option<JobId> = match tmo {
            Tmo::Budget(_) => Some(self.jobs.create().id()),
            _ => None,
        };
        let wrapped = move |ctx: EngineContext<SystemClock>| {
            Box::pin(async move {
                let result = handler(ctx).await;
                let _ = reply_tx.send(result.clone());
                result
            }) as lvmd_core::HandlerFuture
        };
        let mut entry = lvmd_core::RequestEntry::new(tmo, wrapped);
        if let Some(id) = preallocated {
            entry = entry.with_preallocated_job(id);
        }
        self.worker.enqueue(entry)?;

        match tmo {
            Tmo::Blocking | Tmo::Immediate => reply_rx.await.map_err(|_| LvmError::Shutdown)?,
            Tmo::Budget(budget) => {
                let id = preallocated.expect("Budget always preallocates a job");
                tokio::select! {
                    result = reply_rx => result.map_err(|_| LvmError::Shutdown)?,
                    _ = tokio::time::sleep(budget) => Ok(ResponseValue::job_only(job_path(id))),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
