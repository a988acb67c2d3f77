// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument-parsing and object-resolution helpers for the RPC
//! dispatch tables (§6).

use crate::context::DaemonContext;
use lvmd_core::{LvmError, LvmResult, ObjectPath, PhysicalVolume, SystemClock, Tmo, Uuid, VolumeGroup, LogicalVolume};
use lvmd_datastore::DataStore;
use lvmd_engine::{EngineContext, ObjectManager};
use serde_json::Value;

/// Decodes the wire `tmo` field under §4.6/§6's convention; absent means
/// the caller wants the default blocking behavior.
pub fn tmo_arg(args: &Value) -> Tmo {
    Tmo::from_millis(args.get("tmo").and_then(Value::as_i64).unwrap_or(-1))
}

pub fn str_arg(args: &Value, key: &str) -> LvmResult<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string).ok_or_else(|| LvmError::client(format!("missing argument: {key}")))
}

pub fn opt_str_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn bool_arg(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub fn u64_arg(args: &Value, key: &str) -> LvmResult<u64> {
    args.get(key).and_then(Value::as_u64).ok_or_else(|| LvmError::client(format!("missing argument: {key}")))
}

pub fn opt_u64_arg(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}

pub fn str_vec_arg(args: &Value, key: &str) -> Vec<String> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

/// Decodes a `[(major, minor), ...]` wire argument into `major:minor`
/// tokens, as `Manager.PvScan`'s `major_minors` parameter carries them.
/// Each pair is a 2-element array of non-negative integers; malformed
/// entries are dropped rather than failing the whole call.
pub fn major_minor_pairs_arg(args: &Value, key: &str) -> Vec<String> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| {
                    let pair = v.as_array()?;
                    let major = pair.first()?.as_u64()?;
                    let minor = pair.get(1)?.as_u64()?;
                    Some(format!("{major}:{minor}"))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Extra raw argv tokens a caller appends verbatim after the daemon's own
/// flags (§6: every mutating method accepts `opts`). Safe to pass through
/// untouched since the Executor always invokes the tool via argv, never a
/// shell string.
pub fn opts_arg(args: &Value) -> Vec<String> {
    str_vec_arg(args, "opts")
}

pub fn tags_argv(flag: &str, tags: &[String]) -> Vec<String> {
    tags.iter().flat_map(|t| [flag.to_string(), t.clone()]).collect()
}

pub fn object_path_arg(args: &Value, key: &str) -> LvmResult<ObjectPath> {
    Ok(ObjectPath::new(str_arg(args, key)?))
}

fn not_found(path: &ObjectPath) -> LvmError {
    LvmError::client(format!("no such object: {path}"))
}

pub fn pv_by_path(datastore: &DataStore<SystemClock>, object_manager: &ObjectManager, path: &ObjectPath) -> LvmResult<PhysicalVolume> {
    let uuid = object_manager.uuid_at(path).ok_or_else(|| not_found(path))?;
    datastore.fetch_pvs(|pv| pv.uuid == uuid).into_iter().next().ok_or_else(|| not_found(path))
}

pub fn vg_by_path(datastore: &DataStore<SystemClock>, object_manager: &ObjectManager, path: &ObjectPath) -> LvmResult<VolumeGroup> {
    let uuid = object_manager.uuid_at(path).ok_or_else(|| not_found(path))?;
    datastore.fetch_vgs(|vg| vg.uuid == uuid).into_iter().next().ok_or_else(|| not_found(path))
}

pub fn lv_by_path(datastore: &DataStore<SystemClock>, object_manager: &ObjectManager, path: &ObjectPath) -> LvmResult<LogicalVolume> {
    let uuid = object_manager.uuid_at(path).ok_or_else(|| not_found(path))?;
    datastore.fetch_lvs(|lv| lv.uuid == uuid).into_iter().next().ok_or_else(|| not_found(path))
}

/// Resolves a list of Pv object paths (as carried on the wire) down to the
/// device strings `lvm` itself expects on its command line. Done against
/// the daemon's own cached handles before a request is queued, so the
/// Worker's eventual handler only ever deals in plain strings.
pub fn resolve_pv_devices(ctx: &DaemonContext, paths: &[String]) -> LvmResult<Vec<String>> {
    paths.iter().map(|p| pv_by_path(&ctx.datastore, &ctx.object_manager, &ObjectPath::new(p.clone())).map(|pv| pv.device)).collect()
}

/// Runs `argv` through the Executor, treats a non-zero exit as a
/// `ToolFailure`, refreshes the DataStore, then hands the post-refresh
/// context to `after` to resolve whatever object the operation produced.
pub async fn run_and_refresh(
    engine_ctx: EngineContext<SystemClock>,
    argv: Vec<String>,
    after: impl FnOnce(&EngineContext<SystemClock>) -> LvmResult<lvmd_core::ResponseValue>,
) -> LvmResult<lvmd_core::ResponseValue> {
    let out = engine_ctx.executor.call(argv).await?;
    if !out.is_success(&[]) {
        return Err(LvmError::ToolFailure { exit_code: out.exit_code, stderr: out.stderr });
    }
    engine_ctx.coordinator.refresh(false).await?;
    after(&engine_ctx)
}

/// Looks a just-mutated entity back up by uuid once the post-mutation
/// refresh has run; the Loader/Reconciler (C4) is what actually keeps the
/// Object Manager's registration current, so this is a pure lookup.
pub fn registered_path(object_manager: &ObjectManager, uuid: &Uuid) -> LvmResult<ObjectPath> {
    object_manager.lookup_by_uuid(uuid).ok_or_else(|| LvmError::tool_bug("entity mutated but not registered by reconciler"))
}

#[cfg(test)]
#[path = "support_tests.rs"]
mod tests;
