// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-Update Coordinator (C5): a single-owner task that coalesces
//! refresh requests, invokes the Loader, and publishes one shared result
//! to every batched waiter (§4.5).

use crate::loader::Reconciler;
use crate::object_manager::ObjectManager;
use lvmd_adapters::FlightRecorder;
use lvmd_core::{Clock, LvmError, LvmResult, SystemClock};
use lvmd_datastore::DataStore;
use parking_lot::Mutex as SyncMutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Consecutive tool-bug failures before the Coordinator dumps the flight
/// recorder and signals a fatal shutdown (§4.5 step 6).
const FAILURE_THRESHOLD: u32 = 5;
const FAILURE_BACKOFF: Duration = Duration::from_millis(200);

/// One batched refresh request (§4.5). `refresh`, `emit_signal`,
/// `cache_refresh`, and `log` are OR-merged across a batch: if any waiter
/// asked for it, the whole batch gets it. `cache_refresh` gates the
/// DataStore re-scan itself; `refresh` gates whether the reconciler is
/// run against the resulting snapshot at all. `need_main_thread` has no
/// Rust-side effect: it exists for wire-shape parity, but the Coordinator
/// is already the single task that owns every mutation, so there is no
/// separate main-thread dispatch for it to select between.
pub struct UpdateRequest {
    pub refresh: bool,
    pub emit_signal: bool,
    pub cache_refresh: bool,
    pub log: bool,
    pub need_main_thread: bool,
    pub reply: oneshot::Sender<LvmResult<u64>>,
}

impl UpdateRequest {
    pub fn new(reply: oneshot::Sender<LvmResult<u64>>) -> Self {
        Self { refresh: true, emit_signal: true, cache_refresh: true, log: false, need_main_thread: false, reply }
    }
}

#[derive(Default)]
struct MergedOptions {
    refresh: bool,
    cache_refresh: bool,
    log: bool,
    emit_signal: bool,
}

fn merge(batch: &[UpdateRequest]) -> MergedOptions {
    MergedOptions {
        refresh: batch.iter().any(|r| r.refresh),
        cache_refresh: batch.iter().any(|r| r.cache_refresh),
        log: batch.iter().any(|r| r.log),
        emit_signal: batch.iter().any(|r| r.emit_signal),
    }
}

/// Handle used by callers (RPC handlers, the External Event Source) to
/// ask for a refresh and await its outcome.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<UpdateRequest>,
    deferred: Arc<AtomicBool>,
}

impl CoordinatorHandle {
    /// Enqueue a refresh request and wait for this batch's shared result
    /// (the total reconciliation change count).
    pub async fn refresh(&self, log: bool) -> LvmResult<u64> {
        let (reply, rx) = oneshot::channel();
        let req = UpdateRequest { log, ..UpdateRequest::new(reply) };
        if self.tx.send(req).is_err() {
            return Err(LvmError::Shutdown);
        }
        rx.await.unwrap_or(Err(LvmError::Shutdown))
    }

    /// Nudges the coordinator to skip its next blocking wait and re-check
    /// the queue immediately, used by the External Event Source so a
    /// just-arrived event doesn't wait out a stale bounded-wait window.
    pub fn nudge(&self) {
        self.deferred.store(true, Ordering::SeqCst);
    }
}

pub struct Coordinator<C: Clock = SystemClock> {
    datastore: Arc<DataStore<C>>,
    object_manager: Arc<ObjectManager>,
    reconciler: Reconciler,
    flight_recorder: Arc<SyncMutex<FlightRecorder>>,
    rx: mpsc::UnboundedReceiver<UpdateRequest>,
    deferred: Arc<AtomicBool>,
    shutdown: CancellationToken,
    consecutive_failures: AtomicU32,
}

impl<C: Clock + 'static> Coordinator<C> {
    pub fn spawn(
        datastore: Arc<DataStore<C>>,
        object_manager: Arc<ObjectManager>,
        flight_recorder: Arc<SyncMutex<FlightRecorder>>,
        shutdown: CancellationToken,
    ) -> (CoordinatorHandle, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let deferred = Arc::new(AtomicBool::new(false));
        let coordinator = Coordinator {
            datastore,
            object_manager,
            reconciler: Reconciler::new(),
            flight_recorder,
            rx,
            deferred: deferred.clone(),
            shutdown,
            consecutive_failures: AtomicU32::new(0),
        };
        let handle = CoordinatorHandle { tx, deferred };
        let join = tokio::spawn(coordinator.run());
        (handle, join)
    }

    async fn run(mut self) {
        loop {
            let Some(first) = self.next_request().await else { break };
            let mut batch = vec![first];
            while let Ok(req) = self.rx.try_recv() {
                batch.push(req);
            }
            let merged = merge(&batch);

            match self.run_pass(merged.refresh, merged.cache_refresh, merged.log, merged.emit_signal).await {
                Ok(count) => {
                    self.consecutive_failures.store(0, Ordering::SeqCst);
                    if merged.emit_signal && count > 0 {
                        tracing::info!(changes = count, "reconciliation published");
                    }
                    for req in batch {
                        let _ = req.reply.send(Ok(count));
                    }
                }
                Err(e) => {
                    let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                    for req in batch {
                        let _ = req.reply.send(Err(e.clone()));
                    }
                    if failures >= FAILURE_THRESHOLD {
                        tracing::error!(recorder = %self.flight_recorder.lock().dump(), "coordinator exceeded failure threshold, shutting down");
                        self.shutdown.cancel();
                        break;
                    }
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = tokio::time::sleep(FAILURE_BACKOFF) => {}
                    }
                }
            }
        }
        self.drain_with_shutdown();
    }

    /// Waits for the next request, responsive to shutdown. When `deferred`
    /// was set by an external nudge, a non-blocking poll runs first so a
    /// request already sitting in the channel is picked up immediately
    /// rather than going through another `select!` turn.
    async fn next_request(&mut self) -> Option<UpdateRequest> {
        if self.deferred.swap(false, Ordering::SeqCst) {
            if let Ok(req) = self.rx.try_recv() {
                return Some(req);
            }
        }
        tokio::select! {
            _ = self.shutdown.cancelled() => None,
            maybe = self.rx.recv() => maybe,
        }
    }

    async fn run_pass(&self, refresh: bool, cache_refresh: bool, log: bool, emit_signal: bool) -> LvmResult<u64> {
        let previous = self.datastore.current();
        if cache_refresh {
            self.datastore.refresh(log).await?;
        }
        if !refresh {
            return Ok(0);
        }
        let fresh = self.datastore.current();
        let report = self.reconciler.reconcile(&self.object_manager, &previous, &fresh, emit_signal);
        Ok(report.total_changes() as u64)
    }

    /// On daemon shutdown, publish the shutdown error to any requests that
    /// arrived after the loop decided to stop, so no caller hangs.
    fn drain_with_shutdown(&mut self) {
        while let Ok(req) = self.rx.try_recv() {
            let _ = req.reply.send(Err(LvmError::Shutdown));
        }
        self.rx.close();
        while let Ok(req) = self.rx.try_recv() {
            let _ = req.reply.send(Err(LvmError::Shutdown));
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
