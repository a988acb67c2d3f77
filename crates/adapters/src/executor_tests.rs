// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lvmd_core::FakeClock;

#[tokio::test]
async fn forkexec_call_reports_non_zero_exit_as_data_not_error() {
    let executor = Executor::new("/bin/sh", vec![], FakeClock::new(), 10);
    let out = executor.call(vec!["-c".to_string(), "exit 3".to_string()]).await.unwrap();
    assert_eq!(out.exit_code, 3);
}

#[tokio::test]
async fn forkexec_call_parses_json_stdout_as_structured() {
    let executor = Executor::new("/bin/sh", vec![], FakeClock::new(), 10);
    let out = executor
        .call(vec!["-c".to_string(), r#"printf '{"report":[]}'"#.to_string()])
        .await
        .unwrap();
    assert!(out.structured.is_some());
}

#[tokio::test]
async fn forkexec_call_falls_back_to_raw_text_on_parse_failure() {
    let executor = Executor::new("/bin/sh", vec![], FakeClock::new(), 10);
    let out = executor.call(vec!["-c".to_string(), "echo not-json".to_string()]).await.unwrap();
    assert!(out.structured.is_none());
    assert!(out.raw_stdout.contains("not-json"));
}

#[tokio::test]
async fn every_call_is_recorded_in_the_flight_recorder() {
    let executor = Executor::new("/bin/true", vec![], FakeClock::new(), 10);
    executor.call(vec![]).await.unwrap();
    executor.call(vec![]).await.unwrap();
    assert_eq!(executor.flight_recorder().lock().len(), 2);
}

#[tokio::test]
async fn call_after_shutdown_returns_shutdown_error() {
    let executor = Executor::new("/bin/true", vec![], FakeClock::new(), 10);
    executor.trigger_shutdown();
    let result = executor.call(vec![]).await;
    assert!(matches!(result, Err(lvmd_core::LvmError::Shutdown)));
}

#[tokio::test]
async fn mode_switch_to_shell_falls_back_silently_on_bad_tool_path() {
    let executor = Executor::new("/no/such/binary", vec![], FakeClock::new(), 10);
    executor.set_mode(ExecMode::Shell).await;
    assert_eq!(executor.mode().await, ExecMode::ForkExec);
}

#[tokio::test]
async fn mode_switch_round_trips_through_shell_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let script_path = dir.path().join("fake-lvm");
    tokio::fs::write(&script_path, "#!/bin/sh\nhead -n 1 >/dev/null\nprintf '[0] lvm> \\n'\n")
        .await
        .unwrap();
    let mut perms = tokio::fs::metadata(&script_path).await.unwrap().permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    tokio::fs::set_permissions(&script_path, perms).await.unwrap();

    let executor = Executor::new(script_path.to_str().unwrap(), vec![], FakeClock::new(), 10);
    executor.set_mode(ExecMode::Shell).await;
    assert_eq!(executor.mode().await, ExecMode::Shell);
    executor.set_mode(ExecMode::ForkExec).await;
    assert_eq!(executor.mode().await, ExecMode::ForkExec);
}
