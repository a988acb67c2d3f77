// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lvmd_core::ObjectPath;

#[test]
fn object_and_job_serializes_as_a_pair() {
    let result = Ok(ResponseValue::object_and_job(ObjectPath::new("/org/lvmd/Lv3"), ObjectPath::new("/org/lvmd/Job7")));
    let wire = WireResponse::from_result(&result);
    let value = serde_json::to_value(&wire).expect("serialize");
    assert_eq!(value["ok"], serde_json::json!(["/org/lvmd/Lv3", "/org/lvmd/Job7"]));
}

#[test]
fn job_only_serializes_as_a_bare_path() {
    let result = Ok(ResponseValue::job_only(ObjectPath::new("/org/lvmd/Job1")));
    let wire = WireResponse::from_result(&result);
    let value = serde_json::to_value(&wire).expect("serialize");
    assert_eq!(value["ok"], serde_json::json!("/org/lvmd/Job1"));
}

#[test]
fn client_errors_carry_no_exit_code() {
    let result: LvmResult<ResponseValue> = Err(LvmError::client("tag contains a disallowed character"));
    let wire = WireResponse::from_result(&result);
    let value = serde_json::to_value(&wire).expect("serialize");
    assert_eq!(value["error"]["kind"], "client");
    assert!(value["error"]["exit_code"].is_null());
}

#[test]
fn tool_failure_errors_carry_the_exit_code() {
    let result: LvmResult<ResponseValue> = Err(LvmError::ToolFailure { exit_code: 5, stderr: "vg not found".to_string() });
    let wire = WireResponse::from_result(&result);
    let value = serde_json::to_value(&wire).expect("serialize");
    assert_eq!(value["error"]["kind"], "tool_failure");
    assert_eq!(value["error"]["exit_code"], 5);
    assert_eq!(value["error"]["message"], "vg not found");
}

#[test]
fn shutdown_errors_use_the_shutdown_kind() {
    let result: LvmResult<ResponseValue> = Err(LvmError::Shutdown);
    let wire = WireResponse::from_result(&result);
    assert!(!wire.is_ok());
    let value = serde_json::to_value(&wire).expect("serialize");
    assert_eq!(value["error"]["kind"], "shutdown");
}

#[test]
fn unit_serializes_to_null_ok() {
    let result = Ok(ResponseValue::Unit);
    let wire = WireResponse::from_result(&result);
    let value = serde_json::to_value(&wire).expect("serialize");
    assert!(value["ok"].is_null());
    assert!(wire.is_ok());
}
