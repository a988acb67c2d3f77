// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background Operations (C8): long-running relocations and snapshot
//! merges, tracked through a Job and rejoined through the Worker queue
//! for result delivery (§4.8).

use crate::job_registry::{job_path, JobRegistry};
use crate::worker::{EngineContext, WorkerHandle};
use lvmd_adapters::Executor;
use lvmd_core::{Clock, JobResult, LvmError, LvmResult, ObjectPath, RequestEntry, ResponseValue, Tmo};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

/// `device:ignored:NN.N%` progress lines emitted by relocation/merge
/// commands when run with a periodic-report flag (§4.8).
fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?P<dev>\S+):\S+:(?P<pct>\d+(\.\d+)?)%").expect("static progress-percent regex"))
}

/// Joins finished background-op task handles on a long period so they
/// don't accumulate forever (§4.8, §5's reaper thread).
#[derive(Default)]
pub struct Reaper {
    handles: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl Reaper {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn track(&self, handle: JoinHandle<()>) {
        self.handles.lock().await.push(handle);
    }

    /// Drops every handle whose task has already finished. Cheap enough
    /// to call from a periodic `tokio::time::interval` tick.
    pub async fn reap(&self) {
        let mut handles = self.handles.lock().await;
        handles.retain(|h| !h.is_finished());
    }

    pub async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }
}

/// Runs the Reaper's periodic join loop until `shutdown` fires.
pub async fn run_reaper(reaper: Arc<Reaper>, period: Duration, shutdown: tokio_util::sync::CancellationToken) {
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => reaper.reap().await,
        }
    }
}

/// The generic caller contract for relocation and snapshot-merge (§4.8):
/// spawns `argv` through the Executor, parses progress lines into the
/// Job, and delivers the eventual completion through the Worker queue so
/// the final refresh and `set_result` happen on the single Worker task.
pub async fn relocate_or_merge<C: Clock + 'static>(
    executor: Arc<Executor<C>>,
    jobs: Arc<JobRegistry>,
    worker: WorkerHandle<EngineContext<C>>,
    reaper: Arc<Reaper>,
    argv: Vec<String>,
    tmo: Tmo,
) -> LvmResult<ResponseValue> {
    let job = jobs.create();
    let job_for_task = job.clone();
    let worker_for_task = worker.clone();

    let handle = tokio::spawn(async move {
        let pattern = percent_pattern();
        let job_for_progress = job_for_task.clone();
        let result = executor
            .call_with_progress(argv, move |line| {
                if let Some(caps) = pattern.captures(line) {
                    if let Some(pct) = caps.name("pct").and_then(|m| m.as_str().parse::<f64>().ok()) {
                        job_for_progress.set_percent(pct.min(100.0) as u8);
                    }
                }
            })
            .await;

        let job_result = match result {
            Ok(out) if out.is_success(&[]) => JobResult::success(ObjectPath::none()),
            Ok(out) => JobResult::failure(out.exit_code, out.stderr),
            Err(e) => match e.as_job_error() {
                Some((code, text)) => JobResult::failure(code, text),
                None => JobResult::failure(-1, e.to_string()),
            },
        };

        // Deliver through the Worker so the refresh and the Job's
        // set_result both happen on the single Worker task (ordering
        // guarantee 2 of the concurrency model).
        let job_to_complete = job_for_task;
        let entry = RequestEntry::new(Tmo::Blocking, move |ctx: EngineContext<C>| {
            Box::pin(async move {
                let _ = ctx.coordinator.refresh(false).await;
                job_to_complete.set_result(job_result);
                Ok(ResponseValue::Unit)
            }) as lvmd_core::HandlerFuture
        });
        let _ = worker_for_task.enqueue(entry);
    });
    reaper.track(handle).await;

    match tmo {
        Tmo::Immediate => Ok(ResponseValue::job_only(job_path(job.id()))),
        Tmo::Blocking => {
            job.wait(None).await;
            finish_blocking(&job)
        }
        Tmo::Budget(budget) => {
            if job.wait(Some(budget)).await {
                finish_blocking(&job)
            } else {
                Ok(ResponseValue::job_only(job_path(job.id())))
            }
        }
    }
}

fn finish_blocking(job: &crate::job_registry::JobHandle) -> LvmResult<ResponseValue> {
    let snapshot = job.snapshot();
    match snapshot.result {
        Some(result) if result.is_success() => Ok(ResponseValue::job_only(job_path(job.id()))),
        Some(result) => Err(LvmError::ToolFailure { exit_code: result.exit_code, stderr: result.error_text }),
        None => Err(LvmError::tool_bug("job wait returned without a result")),
    }
}

#[cfg(test)]
#[path = "background_ops_tests.rs"]
mod tests;
