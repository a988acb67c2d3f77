// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LogicalVolume` interface dispatch (§6): the common properties/methods
//! plus every polymorphic variant method (ThinPool, CachePool, CachedLv,
//! Snapshot, VdoPool), all reached through the one `Lv` wire interface and
//! gated on the resolved LV's [`LvCapabilities`] rather than a separate
//! per-variant wire interface.

use crate::context::DaemonContext;
use crate::rpc::support::{bool_arg, lv_by_path, opt_str_arg, opts_arg, opt_u64_arg, registered_path, resolve_pv_devices, run_and_refresh, str_arg, str_vec_arg, tags_argv, tmo_arg};
use lvmd_core::{ActivationFlags, HandlerFuture, LogicalVolume, LvmError, LvmResult, ObjectPath, ResponseValue};
use serde_json::{json, Value};

fn lv_json(lv: &LogicalVolume) -> Value {
    let devices: Vec<Value> = lv
        .devices
        .iter()
        .map(|seg| json!([seg.pv.as_str(), [seg.start_extent, seg.end_extent, seg.segtype]]))
        .collect();
    json!({
        "Uuid": lv.uuid.as_str(),
        "Name": lv.name,
        "Path": lv.path.as_str(),
        "SizeBytes": lv.size_bytes,
        "DataPercent": lv.data_percent,
        "SegType": lv.seg_types,
        "Vg": lv.vg.as_str(),
        "OriginLv": lv.origin_lv.as_ref().map(ObjectPath::as_str).unwrap_or(lvmd_core::NO_OBJECT),
        "PoolLv": lv.pool_lv.as_ref().map(ObjectPath::as_str).unwrap_or(lvmd_core::NO_OBJECT),
        "Devices": devices,
        "HiddenLvs": lv.hidden_lvs.iter().map(ObjectPath::as_str).collect::<Vec<_>>(),
        "Tags": lv.tags,
        "Permissions": lv.permissions,
        "AllocationPolicy": lv.allocation_policy,
        "State": lv.state,
        "TargetType": lv.target_type,
        "Health": lv.health,
        "FixedMinor": lv.fixed_minor,
        "ZeroBlocks": lv.zero_blocks,
        "SkipActivation": lv.skip_activation,
        "Active": lv.active,
        "IsThinVolume": lv.is_thin_volume(),
        "IsThinPool": lv.is_thin_pool(),
    })
}

pub async fn dispatch(path: &ObjectPath, method: &str, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    match method {
        "GetProperties" => {
            let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
            Ok(ResponseValue::Value(lv_json(&lv)))
        }
        "Remove" => remove(path, args, ctx).await,
        "Rename" => rename(path, args, ctx).await,
        "Resize" => resize(path, args, ctx).await,
        "Activate" => activate(path, args, ctx, true).await,
        "Deactivate" => activate(path, args, ctx, false).await,
        "Snapshot" => snapshot(path, args, ctx).await,
        "Move" => mv(path, args, ctx).await,
        "TagsAdd" => tags(path, args, ctx, "--addtag").await,
        "TagsDel" => tags(path, args, ctx, "--deltag").await,
        "LvCreate" => thin_create(path, args, ctx).await,
        "CacheLv" => cache_lv(path, args, ctx).await,
        "DetachCachePool" => detach_cache_pool(path, args, ctx).await,
        "Merge" => merge(path, args, ctx).await,
        "EnableCompression" => vdo_toggle(path, ctx, args, "--compression", true).await,
        "DisableCompression" => vdo_toggle(path, ctx, args, "--compression", false).await,
        "EnableDeduplication" => vdo_toggle(path, ctx, args, "--deduplication", true).await,
        "DisableDeduplication" => vdo_toggle(path, ctx, args, "--deduplication", false).await,
        other => Err(LvmError::client(format!("LogicalVolume has no method {other}"))),
    }
}

async fn remove(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    let id = lv_id(&lv);
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvremove".to_string(), "-f".to_string()];
            argv.extend(opts);
            argv.push(id);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn rename(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if !lv.capabilities().renamable {
        return Err(LvmError::client("this logical volume cannot be renamed"));
    }
    let id = lv_id(&lv);
    let new_name = str_arg(args, "new_name")?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvrename".to_string()];
            argv.extend(opts);
            argv.push(id);
            argv.push(new_name);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn resize(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if !lv.capabilities().resizable {
        return Err(LvmError::client("this logical volume cannot be resized"));
    }
    let id = lv_id(&lv);
    let new_size_bytes = opt_u64_arg(args, "new_size_bytes");
    let pv_paths = str_vec_arg(args, "pvs");
    let devices = resolve_pv_devices(ctx, &pv_paths)?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvresize".to_string()];
            if let Some(size) = new_size_bytes {
                argv.push("-L".to_string());
                argv.push(format!("{size}b"));
            }
            argv.extend(opts);
            argv.push(id);
            argv.extend(devices);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn activate(path: &ObjectPath, args: &Value, ctx: &DaemonContext, activating: bool) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if !lv.capabilities().activatable {
        return Err(LvmError::client("this logical volume cannot be activated"));
    }
    let id = lv_id(&lv);
    let flags = ActivationFlags::new(args.get("flags").and_then(Value::as_i64).unwrap_or(0) as i32);
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvchange".to_string(), "-a".to_string(), crate::rpc::vg::activation_arg(activating, flags).to_string()];
            if let Some(mode) = flags.activation_mode_arg() {
                argv.push("--activationmode".to_string());
                argv.push(mode.to_string());
            }
            if flags.ignore_activation_skip() {
                argv.push("-K".to_string());
            }
            argv.extend(opts);
            argv.push(id);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn snapshot(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if !lv.capabilities().snapshotable {
        return Err(LvmError::client("this logical volume cannot be snapshotted"));
    }
    let origin_id = lv_id(&lv);
    let vg_name = lv.vg.as_str().to_string();
    let name = str_arg(args, "name")?;
    let size_bytes = opt_u64_arg(args, "size_bytes");
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvcreate".to_string(), "-s".to_string(), "-n".to_string(), name.clone()];
            if let Some(size) = size_bytes {
                argv.push("-L".to_string());
                argv.push(format!("{size}b"));
            }
            argv.extend(opts);
            argv.push(origin_id);
            run_and_refresh(engine_ctx, argv, move |ec| {
                let created = ec.datastore.fetch_lvs(|lv| lv.vg.as_str() == vg_name && lv.name == name).into_iter().next();
                let uuid = created.map(|lv| lv.uuid).ok_or_else(|| LvmError::tool_bug("snapshot created but not found after refresh"))?;
                let path = registered_path(&ec.object_manager, &uuid)?;
                Ok(ResponseValue::object_and_job(path, ObjectPath::none()))
            })
            .await
        }) as HandlerFuture
    })
    .await
}

async fn mv(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    let id = lv_id(&lv);
    let src_pv = str_arg(args, "src_pv")?;
    let src_device = crate::rpc::support::pv_by_path(&ctx.datastore, &ctx.object_manager, &ObjectPath::new(src_pv))?.device;
    let src_start = opt_u64_arg(args, "src_start");
    let src_end = opt_u64_arg(args, "src_end");
    let dest_pv = opt_str_arg(args, "dest_pv");
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    let mut argv = vec!["pvmove".to_string(), "--interval".to_string(), "1".to_string()];
    argv.extend(opts);
    argv.push("-n".to_string());
    argv.push(id);
    let mut src = src_device;
    if let (Some(s), Some(e)) = (src_start, src_end) {
        src = format!("{src}:{s}-{e}");
    }
    argv.push(src);
    if let Some(dest) = dest_pv {
        let dest_device = crate::rpc::support::pv_by_path(&ctx.datastore, &ctx.object_manager, &ObjectPath::new(dest))?.device;
        argv.push(dest_device);
    }

    lvmd_engine::relocate_or_merge(ctx.executor.clone(), ctx.jobs.clone(), ctx.worker.clone(), ctx.reaper.clone(), argv, tmo).await
}

async fn tags(path: &ObjectPath, args: &Value, ctx: &DaemonContext, flag: &'static str) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if !lv.capabilities().taggable {
        return Err(LvmError::client("this logical volume does not support tags"));
    }
    let id = lv_id(&lv);
    let tags = str_vec_arg(args, "tags");
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvchange".to_string()];
            argv.extend(tags_argv(flag, &tags));
            argv.extend(opts);
            argv.push(id);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

/// `ThinPool.LvCreate`: creates a new thin volume carved out of this pool.
async fn thin_create(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let pool = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if !pool.capabilities().has_thin_create {
        return Err(LvmError::client("this logical volume is not a thin pool"));
    }
    let pool_id = lv_id(&pool);
    let vg_name = pool.vg.as_str().to_string();
    let name = str_arg(args, "name")?;
    let size_bytes = opt_u64_arg(args, "size_bytes");
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvcreate".to_string(), "--thinpool".to_string(), pool_id, "-n".to_string(), name.clone()];
            if let Some(size) = size_bytes {
                argv.push("-V".to_string());
                argv.push(format!("{size}b"));
            }
            argv.extend(opts);
            argv.push(vg_name.clone());
            run_and_refresh(engine_ctx, argv, move |ec| {
                let created = ec.datastore.fetch_lvs(|lv| lv.vg.as_str() == vg_name && lv.name == name).into_iter().next();
                let uuid = created.map(|lv| lv.uuid).ok_or_else(|| LvmError::tool_bug("thin lv created but not found after refresh"))?;
                let path = registered_path(&ec.object_manager, &uuid)?;
                Ok(ResponseValue::object_and_job(path, ObjectPath::none()))
            })
            .await
        }) as HandlerFuture
    })
    .await
}

/// `CachePool.CacheLv`: attaches this cache pool to an existing origin Lv.
async fn cache_lv(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let pool = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if !pool.capabilities().has_cache_attach {
        return Err(LvmError::client("this logical volume is not a cache pool"));
    }
    let pool_id = lv_id(&pool);
    let origin_path = str_arg(args, "origin_lv")?;
    let origin = lv_by_path(&ctx.datastore, &ctx.object_manager, &ObjectPath::new(origin_path))?;
    let origin_id = lv_id(&origin);
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvconvert".to_string(), "--type".to_string(), "cache".to_string(), "--cachepool".to_string(), pool_id];
            argv.extend(opts);
            argv.push(origin_id);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

/// `CachedLv.DetachCachePool(destroy_cache,…)`: splits the cache pool back
/// off, optionally destroying the cached data rather than writing it back.
async fn detach_cache_pool(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if lv.kind != lvmd_core::LvKind::CachedLv {
        return Err(LvmError::client("this logical volume has no attached cache pool"));
    }
    let id = lv_id(&lv);
    let destroy_cache = bool_arg(args, "destroy_cache", false);
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvconvert".to_string()];
            argv.push(if destroy_cache { "--uncache".to_string() } else { "--splitcache".to_string() });
            argv.extend(opts);
            argv.push(id);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

/// `Snapshot.Merge`: merges this snapshot back into its origin.
async fn merge(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if lv.kind != lvmd_core::LvKind::Snapshot {
        return Err(LvmError::client("this logical volume is not a snapshot"));
    }
    let id = lv_id(&lv);
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvconvert".to_string(), "--merge".to_string()];
            argv.extend(opts);
            argv.push(id);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn vdo_toggle(path: &ObjectPath, ctx: &DaemonContext, args: &Value, flag: &'static str, enable: bool) -> LvmResult<ResponseValue> {
    let lv = lv_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    if !lv.capabilities().has_vdo_ops {
        return Err(LvmError::client("this logical volume is not a VDO pool"));
    }
    let id = lv_id(&lv);
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvchange".to_string(), flag.to_string(), if enable { "y" } else { "n" }.to_string()];
            argv.extend(opts);
            argv.push(id);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

/// The `vg/lv` identifier `lvm` itself expects on its command line.
fn lv_id(lv: &LogicalVolume) -> String {
    format!("{}/{}", lv.vg.as_str(), lv.name)
}
