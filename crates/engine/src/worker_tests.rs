// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::coordinator::Coordinator;
use lvmd_adapters::{Executor, FlightRecorder};
use lvmd_core::FakeClock;
use parking_lot::Mutex as SyncMutex;
use std::time::Duration;

async fn fake_tool(json: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake-lvm");
    tokio::fs::write(&path, format!("#!/bin/sh\nprintf '%s' '{json}'\n")).await.unwrap();
    let mut perms = tokio::fs::metadata(&path).await.unwrap().permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    tokio::fs::set_permissions(&path, perms).await.unwrap();
    (dir, path.to_str().unwrap().to_string())
}

async fn build_context() -> (tempfile::TempDir, EngineContext<FakeClock>, CancellationToken) {
    let (dir, tool_path) = fake_tool(&serde_json::json!({"report": []}).to_string()).await;
    let executor = Arc::new(Executor::new(tool_path, vec![], FakeClock::new(), 10));
    let datastore = Arc::new(DataStore::new(executor.clone(), false));
    let object_manager = Arc::new(ObjectManager::new());
    let recorder = Arc::new(SyncMutex::new(FlightRecorder::new(10)));
    let shutdown = CancellationToken::new();
    let (coordinator, _join) = Coordinator::spawn(datastore.clone(), object_manager.clone(), recorder, shutdown.clone());

    let context = EngineContext {
        datastore,
        object_manager,
        executor,
        jobs: Arc::new(JobRegistry::new()),
        coordinator,
    };
    (dir, context, shutdown)
}

fn immediate_handler(value: ResponseValue) -> impl FnOnce(EngineContext<FakeClock>) -> lvmd_core::HandlerFuture + Send + 'static {
    move |_ctx| Box::pin(async move { Ok(value) })
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_request_runs_inline_and_returns_its_value() {
    let (_dir, context, shutdown) = build_context().await;
    let (worker, _join) = Worker::spawn(context, shutdown);

    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let entry = RequestEntry::new(Tmo::Blocking, move |_ctx: EngineContext<FakeClock>| {
        Box::pin(async move {
            let _ = reply_tx.send(());
            Ok(ResponseValue::Unit)
        }) as lvmd_core::HandlerFuture
    });
    worker.enqueue(entry).unwrap();
    reply_rx.await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn fast_budgeted_handler_returns_directly_without_a_job() {
    let (_dir, context, _shutdown) = build_context().await;
    let jobs = context.jobs.clone();
    let path = ObjectPath::new("/org/lvmd/Lv0");
    let result = run_budgeted(
        immediate_handler(ResponseValue::ObjectAndJob(path.clone(), ObjectPath::none()))(context.clone()),
        Duration::from_millis(200),
        None,
        &jobs,
    )
    .await
    .unwrap();

    assert_eq!(result, ResponseValue::ObjectAndJob(path, ObjectPath::none()));
}

#[tokio::test(flavor = "multi_thread", start_paused = true)]
async fn slow_budgeted_handler_returns_a_job_path_then_completes_it() {
    let (_dir, context, _shutdown) = build_context().await;
    let jobs = context.jobs.clone();
    let handler_fut: lvmd_core::HandlerFuture = Box::pin(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(ResponseValue::ObjectAndJob(ObjectPath::new("/org/lvmd/Lv0"), ObjectPath::none()))
    });

    let result = run_budgeted(handler_fut, Duration::from_millis(50), None, &jobs).await.unwrap();
    let ResponseValue::Job(path) = result else { panic!("expected a job path on timeout") };

    let suffix = path.as_str().rsplit('/').next().unwrap();
    let id = lvmd_core::JobId::from_string(format!("{}{suffix}", lvmd_core::JobId::PREFIX));
    let job = jobs.get(&id).expect("job was registered before the timeout fired");
    assert!(!job.is_complete());

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(job.is_complete());
    assert_eq!(job.snapshot().percent, 100);
}
