// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lvmd_core::ObjectPath;

#[tokio::test]
async fn wait_returns_immediately_once_already_complete() {
    let registry = JobRegistry::new();
    let job = registry.create();
    job.set_result(JobResult::success(ObjectPath::new("/org/lvmd/Lv0")));

    assert!(job.wait(None).await);
    assert_eq!(job.snapshot().percent, 100);
}

#[tokio::test]
async fn wait_wakes_on_set_result_from_another_task() {
    let registry = JobRegistry::new();
    let job = registry.create();
    let waiter = job.clone();
    let wait_handle = tokio::spawn(async move { waiter.wait(None).await });

    tokio::task::yield_now().await;
    job.set_result(JobResult::success(ObjectPath::none()));
    assert!(wait_handle.await.unwrap());
}

#[tokio::test]
async fn wait_times_out_while_job_is_still_running() {
    let registry = JobRegistry::new();
    let job = registry.create();
    let done = job.wait(Some(std::time::Duration::from_millis(10))).await;
    assert!(!done);
}

#[test]
fn percent_is_monotonic_non_decreasing() {
    let registry = JobRegistry::new();
    let job = registry.create();
    job.set_percent(40);
    job.set_percent(20);
    assert_eq!(job.snapshot().percent, 40);
    job.set_percent(90);
    assert_eq!(job.snapshot().percent, 90);
}

#[test]
fn get_error_before_completion_is_the_sentinel() {
    let registry = JobRegistry::new();
    let job = registry.create();
    assert_eq!(job.get_error(), (-1, "Job is not complete".to_string()));
}

#[test]
fn remove_fails_until_job_is_complete() {
    let registry = JobRegistry::new();
    let job = registry.create();
    let id = job.id();
    assert!(registry.remove(&id).is_err());

    job.set_result(JobResult::success(ObjectPath::none()));
    assert!(registry.remove(&id).is_ok());
    assert!(registry.get(&id).is_none());
}
