// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lvmd_adapters::FlightRecorder;
use lvmd_engine::Coordinator;
use parking_lot::Mutex as SyncMutex;
use std::time::Duration;

async fn fake_tool(json: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fake-lvm");
    tokio::fs::write(&path, format!("#!/bin/sh\nprintf '%s' '{json}'\n")).await.expect("write script");
    let mut perms = tokio::fs::metadata(&path).await.expect("metadata").permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    tokio::fs::set_permissions(&path, perms).await.expect("chmod");
    (dir, path.to_str().expect("utf8 path").to_string())
}

async fn build() -> (tempfile::TempDir, DaemonContext) {
    let (dir, tool_path) = fake_tool(&serde_json::json!({"report": []}).to_string()).await;
    let executor = Arc::new(Executor::new(tool_path, vec![], SystemClock, 10));
    let datastore = Arc::new(DataStore::new(executor.clone(), false));
    let object_manager = Arc::new(ObjectManager::new());
    let recorder = Arc::new(SyncMutex::new(FlightRecorder::new(10)));
    let shutdown = CancellationToken::new();
    let (coordinator, coordinator_join) = Coordinator::spawn(datastore.clone(), object_manager.clone(), recorder, shutdown.clone());
    let jobs = Arc::new(JobRegistry::new());

    let engine_context =
        EngineContext { datastore: datastore.clone(), object_manager: object_manager.clone(), executor: executor.clone(), jobs: jobs.clone(), coordinator: coordinator.clone() };
    let (worker, worker_join) = lvmd_engine::Worker::spawn(engine_context, shutdown.clone());

    let reaper = Arc::new(lvmd_engine::Reaper::new());
    let context = DaemonContext {
        datastore,
        object_manager,
        executor,
        jobs,
        coordinator,
        worker,
        reaper,
        shutdown,
        start_time: Instant::now(),
        background_tasks: parking_lot::Mutex::new(vec![coordinator_join, worker_join]),
    };
    (dir, context)
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_submit_runs_inline_and_returns_the_value() {
    let (_dir, ctx) = build().await;
    let result = ctx
        .submit(Tmo::Blocking, |_ctx| Box::pin(async move { Ok(ResponseValue::Value(serde_json::json!("hi"))) }) as lvmd_core::HandlerFuture)
        .await
        .expect("submit");
    assert_eq!(result, ResponseValue::Value(serde_json::json!("hi")));
}

#[tokio::test(flavor = "multi_thread")]
async fn immediate_submit_propagates_handler_errors() {
    let (_dir, ctx) = build().await;
    let err = ctx
        .submit(Tmo::Immediate, |_ctx| Box::pin(async move { Err(LvmError::client("bad tag")) }) as lvmd_core::HandlerFuture)
        .await
        .unwrap_err();
    assert!(matches!(err, LvmError::Client(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn budgeted_submit_returns_a_job_path_on_timeout_and_later_completes() {
    let (_dir, ctx) = build().await;
    let result = ctx
        .submit(Tmo::Budget(Duration::from_millis(30)), |_ctx| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(ResponseValue::Unit)
            }) as lvmd_core::HandlerFuture
        })
        .await
        .expect("submit");

    let ResponseValue::Job(path) = result else { panic!("expected a job path on timeout") };
    let suffix = path.as_str().rsplit('/').next().expect("path has a suffix");
    let id = lvmd_core::JobId::from_string(format!("{}{suffix}", lvmd_core::JobId::PREFIX));
    let job = ctx.jobs.get(&id).expect("job registered before timeout");
    assert!(!job.is_complete());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(job.is_complete());
}
