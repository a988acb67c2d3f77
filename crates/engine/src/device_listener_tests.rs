// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::coordinator::Coordinator;
use crate::object_manager::ObjectManager;
use lvmd_adapters::device_events::{DeviceEvent, FakeDeviceEventSource};
use lvmd_adapters::{Executor, FlightRecorder};
use lvmd_core::FakeClock;
use lvmd_datastore::DataStore;
use parking_lot::Mutex as SyncMutex;

async fn fake_tool() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake-lvm");
    let json = serde_json::json!({"report": []}).to_string();
    tokio::fs::write(&path, format!("#!/bin/sh\nprintf '%s' '{json}'\n")).await.unwrap();
    let mut perms = tokio::fs::metadata(&path).await.unwrap().permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    tokio::fs::set_permissions(&path, perms).await.unwrap();
    (dir, path.to_str().unwrap().to_string())
}

async fn build() -> (tempfile::TempDir, CoordinatorHandle, Arc<DataStore<FakeClock>>, CancellationToken) {
    let (dir, tool_path) = fake_tool().await;
    let executor = Arc::new(Executor::new(tool_path, vec![], FakeClock::new(), 10));
    let datastore = Arc::new(DataStore::new(executor, false));
    let om = Arc::new(ObjectManager::new());
    let recorder = Arc::new(SyncMutex::new(FlightRecorder::new(10)));
    let shutdown = CancellationToken::new();
    let (coordinator, _join) = Coordinator::spawn(datastore.clone(), om, recorder, shutdown.clone());
    (dir, coordinator, datastore, shutdown)
}

#[tokio::test(flavor = "multi_thread")]
async fn irrelevant_events_never_trigger_a_refresh() {
    let (_dir, coordinator, datastore, shutdown) = build().await;
    let (source, tx) = FakeDeviceEventSource::new();
    let handle = tokio::spawn(run(Arc::new(source), coordinator, shutdown.clone()));

    tx.send(DeviceEvent { action: "add".to_string(), ..Default::default() }).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(datastore.num_refreshes(), 0);

    shutdown.cancel();
    let _ = handle.await;
}

#[tokio::test(flavor = "multi_thread")]
async fn a_relevant_event_triggers_exactly_one_refresh() {
    let (_dir, coordinator, datastore, shutdown) = build().await;
    let (source, tx) = FakeDeviceEventSource::new();
    let handle = tokio::spawn(run(Arc::new(source), coordinator, shutdown.clone()));

    tx.send(DeviceEvent { dm_name: Some("vg-lv".to_string()), ..Default::default() }).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(datastore.num_refreshes(), 1);

    shutdown.cancel();
    let _ = handle.await;
}

#[tokio::test(flavor = "multi_thread")]
async fn a_burst_of_relevant_events_collapses_to_few_refreshes() {
    let (_dir, coordinator, datastore, shutdown) = build().await;
    let (source, tx) = FakeDeviceEventSource::new();
    let handle = tokio::spawn(run(Arc::new(source), coordinator, shutdown.clone()));

    for _ in 0..10 {
        tx.send(DeviceEvent { dm_name: Some("vg-lv".to_string()), ..Default::default() }).await.unwrap();
    }
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    // Ten events collapse into a handful of refreshes, certainly fewer
    // than one per event.
    assert!(datastore.num_refreshes() >= 1);
    assert!(datastore.num_refreshes() < 10);

    shutdown.cancel();
    let _ = handle.await;
}
