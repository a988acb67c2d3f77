// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::coordinator::Coordinator;
use crate::object_manager::ObjectManager;
use lvmd_adapters::FlightRecorder;
use lvmd_core::FakeClock;
use lvmd_datastore::DataStore;
use parking_lot::Mutex as SyncMutex;
use tokio_util::sync::CancellationToken;

async fn fake_tool(script: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake-lvm");
    tokio::fs::write(&path, script).await.unwrap();
    let mut perms = tokio::fs::metadata(&path).await.unwrap().permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    tokio::fs::set_permissions(&path, perms).await.unwrap();
    (dir, path.to_str().unwrap().to_string())
}

async fn build() -> (tempfile::TempDir, Arc<Executor<FakeClock>>, WorkerHandle<EngineContext<FakeClock>>, Arc<JobRegistry>, Arc<Reaper>) {
    let script = "#!/bin/sh\necho 'dev0:ignored:10.0%'\necho 'dev0:ignored:55.0%'\nprintf '%s' '{\"report\": []}'\n";
    let (dir, tool_path) = fake_tool(script).await;
    let executor = Arc::new(Executor::new(tool_path, vec![], FakeClock::new(), 10));
    let datastore = Arc::new(DataStore::new(executor.clone(), false));
    let object_manager = Arc::new(ObjectManager::new());
    let recorder = Arc::new(SyncMutex::new(FlightRecorder::new(10)));
    let shutdown = CancellationToken::new();
    let (coordinator, _join) = Coordinator::spawn(datastore.clone(), object_manager.clone(), recorder, shutdown.clone());
    let jobs = Arc::new(JobRegistry::new());

    let context = EngineContext { datastore, object_manager, executor: executor.clone(), jobs: jobs.clone(), coordinator };
    let (worker, _join) = crate::worker::Worker::spawn(context, shutdown);
    (dir, executor, worker, jobs, Arc::new(Reaper::new()))
}

#[tokio::test(flavor = "multi_thread")]
async fn immediate_tmo_returns_a_job_path_without_waiting() {
    let (_dir, executor, worker, jobs, reaper) = build().await;
    let result = relocate_or_merge(executor, jobs, worker, reaper, vec!["pvmove".into()], Tmo::Immediate).await.unwrap();
    assert!(matches!(result, ResponseValue::Job(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_tmo_waits_for_completion_and_reports_success() {
    let (_dir, executor, worker, jobs, reaper) = build().await;
    let result = relocate_or_merge(executor, jobs.clone(), worker, reaper, vec!["pvmove".into()], Tmo::Blocking).await.unwrap();
    let ResponseValue::Job(path) = result else { panic!("expected a job path") };
    assert!(!path.is_none());
    assert_eq!(jobs.len(), 1);
}
