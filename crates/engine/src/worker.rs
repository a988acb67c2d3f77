// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request Queue & Worker (C6): the single task that drains pending
//! mutating requests FIFO and runs each handler under the `tmo`
//! timeout/job protocol (§4.6).

use crate::coordinator::CoordinatorHandle;
use crate::job_registry::{job_path, JobRegistry};
use crate::object_manager::ObjectManager;
use lvmd_adapters::Executor;
use lvmd_core::{Clock, JobResult, LvmError, LvmResult, ObjectPath, RequestEntry, ResponseValue, SystemClock, Tmo};
use lvmd_datastore::DataStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Everything a request handler needs: cached state, the mutation
/// surface, job bookkeeping, and a way to ask for a refresh. Cheap to
/// clone (every field is an `Arc` or an already-cloneable handle), which
/// is required since `RequestEntry`'s handler is `FnOnce(Ctx)`.
pub struct EngineContext<C: Clock = SystemClock> {
    pub datastore: Arc<DataStore<C>>,
    pub object_manager: Arc<ObjectManager>,
    pub executor: Arc<Executor<C>>,
    pub jobs: Arc<JobRegistry>,
    pub coordinator: CoordinatorHandle,
}

impl<C: Clock> Clone for EngineContext<C> {
    fn clone(&self) -> Self {
        Self {
            datastore: self.datastore.clone(),
            object_manager: self.object_manager.clone(),
            executor: self.executor.clone(),
            jobs: self.jobs.clone(),
            coordinator: self.coordinator.clone(),
        }
    }
}

pub struct WorkerHandle<Ctx> {
    tx: mpsc::UnboundedSender<RequestEntry<Ctx>>,
}

impl<Ctx> Clone for WorkerHandle<Ctx> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<Ctx> WorkerHandle<Ctx> {
    /// Enqueues a request. The Worker never drops a request silently
    /// (invariant 6); if the Worker has already shut down, that guarantee
    /// is upheld by returning `LvmError::Shutdown` to the caller directly
    /// rather than queueing into a dead worker.
    pub fn enqueue(&self, entry: RequestEntry<Ctx>) -> LvmResult<()> {
        self.tx.send(entry).map_err(|_| LvmError::Shutdown)
    }
}

pub struct Worker<C: Clock = SystemClock> {
    rx: mpsc::UnboundedReceiver<RequestEntry<EngineContext<C>>>,
    context: EngineContext<C>,
    shutdown: CancellationToken,
}

impl<C: Clock + 'static> Worker<C> {
    pub fn spawn(
        context: EngineContext<C>,
        shutdown: CancellationToken,
    ) -> (WorkerHandle<EngineContext<C>>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Worker { rx, context, shutdown };
        let join = tokio::spawn(worker.run());
        (WorkerHandle { tx }, join)
    }

    async fn run(mut self) {
        loop {
            let entry = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                maybe = self.rx.recv() => match maybe {
                    Some(entry) => entry,
                    None => break,
                },
            };
            self.dispatch(entry).await;
        }
        // Any request still queued when the daemon is shutting down must
        // still be answered, never silently dropped (invariant 6).
        while let Ok(entry) = self.rx.try_recv() {
            if let Some(id) = entry.preallocated_job {
                if let Some(job) = self.context.jobs.get(&id) {
                    job.set_result(JobResult::failure(-1, "daemon is shutting down"));
                }
            }
        }
    }

    async fn dispatch(&self, entry: RequestEntry<EngineContext<C>>) {
        let before = self.context.datastore.num_refreshes();
        let _ = execute(entry, self.context.clone()).await;
        let after = self.context.datastore.num_refreshes();
        if after.saturating_sub(before) > 1 {
            tracing::debug!(refreshes = after - before, "handler observed more than one refresh");
        }
    }
}

/// Runs one request's handler under its `tmo` protocol (§4.6):
/// - `Blocking`/`Immediate`: await the handler directly, the handler
///   itself decides whether to pre-allocate and return a Job for
///   `Immediate`.
/// - `Budget(d)`: race the handler against the budget; on timeout, detach
///   it into the background and deliver its eventual result to the
///   Job, returning the Job's path immediately.
async fn execute<C: Clock + 'static>(entry: RequestEntry<EngineContext<C>>, context: EngineContext<C>) -> LvmResult<ResponseValue> {
    let RequestEntry { handler, tmo, preallocated_job } = entry;
    match tmo {
        Tmo::Blocking | Tmo::Immediate => handler(context).await,
        Tmo::Budget(budget) => {
            let jobs = context.jobs.clone();
            run_budgeted(handler(context), budget, preallocated_job, &jobs).await
        }
    }
}

/// Races `handler_fut` against `budget`. A Job is always stood up first
/// (reusing `preallocated_job` if the caller supplied one) so the
/// spawned task can deliver into it unconditionally; if the handler
/// wins the race its direct result is returned and the Job's result is
/// set anyway so any client that already observed the Job path still
/// sees a consistent terminal state.
async fn run_budgeted(
    handler_fut: lvmd_core::HandlerFuture,
    budget: Duration,
    preallocated_job: Option<lvmd_core::JobId>,
    jobs: &JobRegistry,
) -> LvmResult<ResponseValue> {
    let job = match preallocated_job {
        Some(id) => jobs.get(&id).unwrap_or_else(|| jobs.create_with_id(id)),
        None => jobs.create(),
    };
    let job_for_task = job.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let result = handler_fut.await;
        job_for_task.set_result(response_to_job_result(&result));
        let _ = tx.send(result);
    });

    tokio::select! {
        result = rx => result.unwrap_or(Err(LvmError::tool_bug("handler task dropped its result"))),
        _ = tokio::time::sleep(budget) => Ok(ResponseValue::job_only(job_path(job.id()))),
    }
}

fn response_to_job_result(result: &LvmResult<ResponseValue>) -> JobResult {
    match result {
        Ok(ResponseValue::ObjectAndJob(obj, _)) => JobResult::success(obj.clone()),
        Ok(ResponseValue::Job(path)) => JobResult::success(path.clone()),
        Ok(ResponseValue::Value(_)) | Ok(ResponseValue::Unit) => JobResult::success(ObjectPath::none()),
        Err(err) => match err.as_job_error() {
            Some((code, text)) => JobResult::failure(code, text),
            None => JobResult::failure(-1, err.to_string()),
        },
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
