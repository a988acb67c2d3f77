// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `VolumeGroup` interface dispatch (§6), including the thin/cache/VDO
//! pool-creation and PV-membership methods that live on this interface
//! rather than on the created Lv.

use crate::context::DaemonContext;
use crate::rpc::support::{
    bool_arg, opt_str_arg, opts_arg, opt_u64_arg, registered_path, resolve_pv_devices, run_and_refresh, str_arg, str_vec_arg, tags_argv,
    tmo_arg, u64_arg, vg_by_path,
};
use lvmd_core::{ActivationFlags, HandlerFuture, LvmError, LvmResult, ObjectPath, ResponseValue, VolumeGroup};
use serde_json::{json, Value};

fn vg_json(vg: &VolumeGroup) -> Value {
    json!({
        "Name": vg.name,
        "Uuid": vg.uuid.as_str(),
        "Pvs": vg.pvs.iter().map(ObjectPath::as_str).collect::<Vec<_>>(),
        "Lvs": vg.lvs.iter().map(ObjectPath::as_str).collect::<Vec<_>>(),
        "SizeBytes": vg.size_bytes,
        "FreeBytes": vg.free_bytes,
        "ExtentSizeBytes": vg.extent_size_bytes,
        "ExtentCount": vg.extent_count,
        "FreeExtentCount": vg.free_extent_count,
        "Tags": vg.tags,
        "MaxPv": vg.max_pv,
        "MaxLv": vg.max_lv,
        "AllocationPolicy": vg.allocation_policy,
        "Exported": vg.exported,
    })
}

pub async fn dispatch(path: &ObjectPath, method: &str, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    match method {
        "GetProperties" => {
            let vg = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?;
            Ok(ResponseValue::Value(vg_json(&vg)))
        }
        "Rename" => rename(path, args, ctx).await,
        "Remove" => remove(path, args, ctx).await,
        "Change" => change(path, args, ctx).await,
        "Reduce" => reduce(path, args, ctx).await,
        "Extend" => extend(path, args, ctx).await,
        "Move" => mv(path, args, ctx).await,
        "LvCreate" => lv_create_extra(path, args, ctx, Vec::new()).await,
        "LvCreateLinear" => lv_create_extra(path, args, ctx, vec!["--type".to_string(), "linear".to_string()]).await,
        "LvCreateStriped" => {
            let stripes = u64_arg(args, "stripes")?;
            let stripe_size = opt_u64_arg(args, "stripe_size_bytes");
            let mut extra = vec!["--stripes".to_string(), stripes.to_string()];
            if let Some(sz) = stripe_size {
                extra.push("--stripesize".to_string());
                extra.push((sz / 1024).to_string());
            }
            lv_create_extra(path, args, ctx, extra).await
        }
        "LvCreateMirror" => {
            let mirrors = u64_arg(args, "mirrors")?;
            lv_create_extra(path, args, ctx, vec!["--type".to_string(), "mirror".to_string(), "-m".to_string(), mirrors.to_string()]).await
        }
        "LvCreateRaid" => {
            let raid_type = str_arg(args, "raid_type")?;
            let stripes = opt_u64_arg(args, "stripes");
            let mirrors = opt_u64_arg(args, "mirrors");
            let mut extra = vec!["--type".to_string(), raid_type];
            if let Some(n) = stripes {
                extra.push("--stripes".to_string());
                extra.push(n.to_string());
            }
            if let Some(n) = mirrors {
                extra.push("-m".to_string());
                extra.push(n.to_string());
            }
            lv_create_extra(path, args, ctx, extra).await
        }
        "CreateCachePool" => lv_create_extra(path, args, ctx, vec!["--type".to_string(), "cache-pool".to_string()]).await,
        "CreateThinPool" => lv_create_extra(path, args, ctx, vec!["--type".to_string(), "thin-pool".to_string()]).await,
        "CreateVdoPool" => lv_create_extra(path, args, ctx, vec!["--type".to_string(), "vdo-pool".to_string()]).await,
        "CreateVdoPoolandLv" => lv_create_extra(path, args, ctx, vec!["--type".to_string(), "vdo".to_string()]).await,
        "PvTagsAdd" => pv_tags(path, args, ctx, "--addtag").await,
        "PvTagsDel" => pv_tags(path, args, ctx, "--deltag").await,
        "TagsAdd" => tags(path, args, ctx, "--addtag").await,
        "TagsDel" => tags(path, args, ctx, "--deltag").await,
        "AllocationPolicySet" => allocation_policy_set(path, args, ctx).await,
        "MaxPvSet" => max_set(path, args, ctx, "--maxphysicalvolumes").await,
        "MaxLvSet" => max_set(path, args, ctx, "--maxlogicalvolumes").await,
        "UuidGenerate" => uuid_generate(path, args, ctx).await,
        "Activate" => activate(path, args, ctx, true).await,
        "Deactivate" => activate(path, args, ctx, false).await,
        other => Err(LvmError::client(format!("VolumeGroup has no method {other}"))),
    }
}

async fn rename(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let new_name = str_arg(args, "new_name")?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgrename".to_string()];
            argv.extend(opts);
            argv.push(name);
            argv.push(new_name);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn remove(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgremove".to_string(), "-f".to_string()];
            argv.extend(opts);
            argv.push(name);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

/// Generic `vgchange` passthrough (§6: `Change`), for options not covered
/// by their own dedicated method (e.g. `--clustered`, `--alloc`).
async fn change(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgchange".to_string()];
            argv.extend(opts);
            argv.push(name);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn reduce(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let missing = bool_arg(args, "missing", false);
    let pv_paths = str_vec_arg(args, "pvs");
    let devices = resolve_pv_devices(ctx, &pv_paths)?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgreduce".to_string()];
            if missing {
                argv.push("--removemissing".to_string());
            }
            argv.extend(opts);
            argv.push(name);
            argv.extend(devices);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn extend(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let pv_paths = str_vec_arg(args, "pvs");
    let devices = resolve_pv_devices(ctx, &pv_paths)?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgextend".to_string()];
            argv.extend(opts);
            argv.push(name);
            argv.extend(devices);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

/// `Move(src-pv, (s,e), [(dst-pv,s,e)], tmo, opts)`: a `pvmove` relocation,
/// tracked as a background operation (§4.8) rather than a plain Worker
/// handler since it can run far longer than any reasonable `tmo`.
async fn mv(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let _vg = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?;
    let src_pv = str_arg(args, "src_pv")?;
    let src_device = crate::rpc::support::pv_by_path(&ctx.datastore, &ctx.object_manager, &ObjectPath::new(src_pv))?.device;
    let src_start = opt_u64_arg(args, "src_start");
    let src_end = opt_u64_arg(args, "src_end");
    let dest_pv = opt_str_arg(args, "dest_pv");
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    let mut argv = vec!["pvmove".to_string(), "--interval".to_string(), "1".to_string()];
    argv.extend(opts);
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

/// The common `lvcreate` invocation: VG name, size, caller-supplied
/// `extra` argv (the variant-specific `--type`/`--stripes`/etc. flags),
/// and a post-refresh lookup of the new Lv by `(vg, name)`.
async fn lv_create_extra(path: &ObjectPath, args: &Value, ctx: &DaemonContext, extra: Vec<String>) -> LvmResult<ResponseValue> {
    let vg_name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let lv_name = str_arg(args, "name")?;
    let size_bytes = opt_u64_arg(args, "size_bytes");
    let thin_pool = opt_str_arg(args, "thin_pool");
    let pv_paths = str_vec_arg(args, "pvs");
    let devices = resolve_pv_devices(ctx, &pv_paths)?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["lvcreate".to_string()];
            argv.extend(extra);
            if let Some(size) = size_bytes {
                argv.push("-L".to_string());
                argv.push(format!("{size}b"));
            }
            if let Some(pool) = &thin_pool {
                argv.push("--thinpool".to_string());
                argv.push(pool.clone());
            }
            argv.push("-n".to_string());
            argv.push(lv_name.clone());
            argv.extend(opts);
            argv.push(vg_name.clone());
            argv.extend(devices);
            run_and_refresh(engine_ctx, argv, move |ec| {
                let lv = ec.datastore.fetch_lvs(|lv| lv.vg.as_str() == vg_name && lv.name == lv_name).into_iter().next();
                let uuid = lv.map(|lv| lv.uuid).ok_or_else(|| LvmError::tool_bug("lvcreate succeeded but lv not found after refresh"))?;
                let path = registered_path(&ec.object_manager, &uuid)?;
                Ok(ResponseValue::object_and_job(path, ObjectPath::none()))
            })
            .await
        }) as HandlerFuture
    })
    .await
}

async fn pv_tags(_path: &ObjectPath, args: &Value, ctx: &DaemonContext, flag: &'static str) -> LvmResult<ResponseValue> {
    let pv_paths = str_vec_arg(args, "pvs");
    let devices = resolve_pv_devices(ctx, &pv_paths)?;
    let tags = str_vec_arg(args, "tags");
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["pvchange".to_string()];
            argv.extend(tags_argv(flag, &tags));
            argv.extend(opts);
            argv.extend(devices);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn tags(path: &ObjectPath, args: &Value, ctx: &DaemonContext, flag: &'static str) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let tags = str_vec_arg(args, "tags");
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgchange".to_string()];
            argv.extend(tags_argv(flag, &tags));
            argv.extend(opts);
            argv.push(name);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn allocation_policy_set(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let policy = str_arg(args, "policy")?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgchange".to_string(), "--alloc".to_string(), policy];
            argv.extend(opts);
            argv.push(name);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn max_set(path: &ObjectPath, args: &Value, ctx: &DaemonContext, flag: &'static str) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let max = u64_arg(args, "max")?;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgchange".to_string(), flag.to_string(), max.to_string()];
            argv.extend(opts);
            argv.push(name);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn uuid_generate(path: &ObjectPath, args: &Value, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgchange".to_string(), "-u".to_string()];
            argv.extend(opts);
            argv.push(name);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

async fn activate(path: &ObjectPath, args: &Value, ctx: &DaemonContext, activating: bool) -> LvmResult<ResponseValue> {
    let name = vg_by_path(&ctx.datastore, &ctx.object_manager, path)?.name;
    let flags = ActivationFlags::new(args.get("flags").and_then(Value::as_i64).unwrap_or(0) as i32);
    let opts = opts_arg(args);
    let tmo = tmo_arg(args);

    ctx.submit(tmo, move |engine_ctx| {
        Box::pin(async move {
            let mut argv = vec!["vgchange".to_string(), "-a".to_string(), activation_arg(activating, flags).to_string()];
            if let Some(mode) = flags.activation_mode_arg() {
                argv.push("--activationmode".to_string());
                argv.push(mode.to_string());
            }
            if flags.ignore_activation_skip() {
                argv.push("-K".to_string());
            }
            argv.extend(opts);
            argv.push(name);
            run_and_refresh(engine_ctx, argv, |_ec| Ok(ResponseValue::job_only(ObjectPath::none()))).await
        }) as HandlerFuture
    })
    .await
}

pub(crate) fn activation_arg(activating: bool, flags: ActivationFlags) -> &'static str {
    if !activating {
        return "n";
    }
    if flags.shared() {
        "sy"
    } else if flags.exclusive() {
        "ey"
    } else if flags.local() {
        "ly"
    } else {
        "y"
    }
}
