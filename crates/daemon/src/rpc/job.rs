// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Job` interface dispatch (§4.7, §6): properties read straight off the
//! `JobHandle`'s atomics, `Wait`/`Remove` the only methods.

use crate::context::DaemonContext;
use lvmd_core::{JobId, LvmError, LvmResult, ObjectPath, ResponseValue};
use serde_json::{json, Value};
use std::time::Duration;

fn job_id_from_path(path: &ObjectPath) -> LvmResult<JobId> {
    let suffix = path.as_str().rsplit('/').next().filter(|s| !s.is_empty()).ok_or_else(|| LvmError::client(format!("malformed job path: {path}")))?;
    Ok(JobId::from_string(format!("{}{suffix}", JobId::PREFIX)))
}

pub async fn dispatch(path: &ObjectPath, method: &str, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let id = job_id_from_path(path)?;
    let job = ctx.jobs.get(&id).ok_or_else(|| LvmError::client(format!("no such job: {path}")))?;

    match method {
        "GetProperties" => {
            let snapshot = job.snapshot();
            let (error_code, error_text) = snapshot.get_error();
            Ok(ResponseValue::Value(json!({
                "Percent": snapshot.percent,
                "Complete": snapshot.complete,
                "Result": snapshot.result.as_ref().map(|r| r.path.as_str()).unwrap_or(lvmd_core::NO_OBJECT),
                "GetError": [error_code, error_text],
            })))
        }
        "Wait" => {
            let timeout_ms = args.get("timeout_ms").and_then(Value::as_u64);
            let completed = job.wait(timeout_ms.map(Duration::from_millis)).await;
            Ok(ResponseValue::Value(json!(completed)))
        }
        "Remove" => {
            ctx.jobs.remove(&id)?;
            Ok(ResponseValue::Unit)
        }
        other => Err(LvmError::client(format!("Job has no method {other}"))),
    }
}
