// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Manager` interface dispatch (§6): the one path-less interface, reached
//! at connection level without an object path.

use crate::context::DaemonContext;
use crate::rpc::support::{bool_arg, major_minor_pairs_arg, opts_arg, resolve_pv_devices, run_and_refresh, str_arg, str_vec_arg, tmo_arg};
use lvmd_adapters::ExecMode;
use lvmd_core::{HandlerFuture, LvmError, LvmResult, ObjectPath, ResponseValue, Uuid};
use serde_json::{json, Value};

pub async fn dispatch(method: &str, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    match method {
        "Version" => Ok(ResponseValue::Value(json!(env!("CARGO_PKG_VERSION")))),
        "Refresh" => {
            let count = ctx.coordinator.refresh(false).await?;
            Ok(ResponseValue::Value(json!(count)))
        }
        "LookUpByLvmId" => look_up_by_lvm_id(args, ctx),
        "PvCreate" => pv_create(args, ctx).await,
        "VgCreate" => vg_create(args, ctx).await,
        "PvScan" => pv_scan(args, ctx).await,
        "UseLvmShell" => use_lvm_shell(args, ctx).await,
        "ExternalEvent" => external_event(args, ctx).await,
        other => Err(LvmError::client(format!("Manager has no method {other}"))),
    }
}

fn look_up_by_lvm_id(args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let lvm_id = str_arg(args, "lvm_id")?;
    let path = ctx
        .object_manager
        .lookup_by_domain_id(&lvm_id)
        .or_else(|| ctx.object_manager.lookup_by_uuid(&Uuid::new(lvm_id)))
        .unwrap_or_else(ObjectPath::none);
    Ok(ResponseValue::Value(json!(path.as_str())))
}

async fn pv_create(args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let device = str_arg(args, "device")?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["pvcreate".to_string()];
            argv.extend(opts);
            argv.push(device.clone());
            run_and_refresh(engine_ctx, argv, move |ec| {
                let pv = ec.datastore.fetch_pvs(|pv| pv.device == device).into_iter().next();
                let uuid = pv.map(|pv| pv.uuid).ok_or_else(|| LvmError::tool_bug("pvcreate succeeded but pv not found after refresh"))?;
                let path = crate::rpc::support::registered_path(&ec.object_manager, &uuid)?;
                Ok(ResponseValue::object_and_job(path, ObjectPath::none()))
            })
            .await
        }) as HandlerFuture
    })
    .await
}

async fn vg_create(args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let name = str_arg(args, "name")?;
    let pv_paths = str_vec_arg(args, "pvs");
    let devices = resolve_pv_devices(ctx, &pv_paths)?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgcreate".to_string()];
            argv.extend(opts);
            argv.push(name.clone());
            argv.extend(devices);
            run_and_refresh(engine_ctx, argv, move |ec| {
                let vg = ec.datastore.fetch_vgs(|vg| vg.name == name).into_iter().next();
                let uuid = vg.map(|vg| vg.uuid).ok_or_else(|| LvmError::tool_bug("vgcreate succeeded but vg not found after refresh"))?;
                let path = crate::rpc::support::registered_path(&ec.object_manager, &uuid)?;
                Ok(ResponseValue::object_and_job(path, ObjectPath::none()))
            })
            .await
        }) as HandlerFuture
    })
    .await
}

async fn pv_scan(args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let activate = bool_arg(args, "activate", false);
    let cache = bool_arg(args, "cache", false);
    let devices = str_vec_arg(args, "devices");
    let major_minors = major_minor_pairs_arg(args, "major_minors");
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["pvscan".to_string()];
            argv.extend(opts);
            if activate {
                argv.push("--activate".to_string());
                argv.push("ay".to_string());
            }
            // device_paths/major_minors are only meaningful to pvscan
            // alongside --cache.
            if cache {
                argv.push("--cache".to_string());
                argv.extend(devices);
                argv.extend(major_minors);
            }
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn use_lvm_shell(args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let enabled = bool_arg(args, "enabled", false);
    ctx.executor.set_mode(if enabled { ExecMode::Shell } else { ExecMode::ForkExec }).await;
    Ok(ResponseValue::Unit)
}

async fn external_event(args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let _event = str_arg(args, "event")?;
    ctx.coordinator.nudge();
    let count = ctx.coordinator.refresh(false).await?;
    Ok(ResponseValue::Value(json!(count as i64)))
}
