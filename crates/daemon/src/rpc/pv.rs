// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PhysicalVolume` interface dispatch (§6).

use crate::context::DaemonContext;
use crate::rpc::support::{bool_arg, opts_arg, opt_u64_arg, pv_by_path, run_and_refresh, tmo_arg};
use lvmd_core::{HandlerFuture, LvmError, LvmResult, ObjectPath, PhysicalVolume, ResponseValue, NO_OBJECT};
use serde_json::{json, Value};

fn pv_json(pv: &PhysicalVolume) -> Value {
    json!({
        "Name": pv.device,
        "Uuid": pv.uuid.as_str(),
        "Vg": pv.vg.as_ref().map(ObjectPath::as_str).unwrap_or(NO_OBJECT),
        "SizeBytes": pv.size_bytes,
        "FreeBytes": pv.free_bytes,
        "Tags": pv.tags,
        "Allocatable": pv.allocatable,
        "PeCount": pv.pe_count,
        "PeAllocCount": pv.pe_alloc_count,
    })
}

pub async fn dispatch(path: &ObjectPath, method: &str, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    match method {
        "GetProperties" => {
            let pv = pv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
            Ok(ResponseValue::Value(pv_json(&pv)))
        }
        "Remove" => remove(path, args, ctx).await,
        "ReSize" => resize(path, args, ctx).await,
        "AllocationEnabled" => allocation_enabled(path, args, ctx).await,
        other => Err(LvmError::client(format!("PhysicalVolume has no method {other}"))),
    }
}

async fn remove(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let device = pv_by_path(&ctx.datastore, &ctx.object_manager, path)?.device;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["pvremove".to_string()];
            argv.extend(opts);
            argv.push(device);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn resize(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let device = pv_by_path(&ctx.datastore, &ctx.object_manager, path)?.device;
    let new_size_bytes = opt_u64_arg(args, "new_size_bytes");
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["pvresize".to_string()];
            if let Some(size) = new_size_bytes {
                argv.push("--setphysicalvolumesize".to_string());
                argv.push(format!("{size}b"));
            }
            argv.extend(opts);
            argv.push(device);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn allocation_enabled(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let device = pv_by_path(&ctx.datastore, &ctx.object_manager, path)?.device;
    let enabled = bool_arg(args, "enabled", true);
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["pvchange".to_string(), "-x".to_string(), if enabled { "y" } else { "n" }.to_string()];
            argv.extend(opts);
            argv.push(device);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}
