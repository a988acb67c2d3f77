// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DataStore (C2): holds the latest structured snapshot of all entities,
//! refreshed by invoking the Executor with a full-report command.

use crate::report_parse::{parse_lvs, parse_pvs, parse_vgs, LV_COLUMNS, PV_COLUMNS, VG_COLUMNS};
use crate::snapshot::DataStoreSnapshot;
use lvmd_adapters::Executor;
use lvmd_core::{Clock, LogicalVolume, LvmError, LvmResult, PhysicalVolume, SystemClock, VolumeGroup};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Exit code 5 on a full-report command is success: exported VGs are
/// valid state, not an error (§4.2).
const ACCEPTABLE_EXIT_CODES: &[i32] = &[5];

pub struct DataStore<C: Clock = SystemClock> {
    executor: Arc<Executor<C>>,
    snapshot: RwLock<Arc<DataStoreSnapshot>>,
    num_refreshes: AtomicU64,
    vdo_supported: bool,
}

impl<C: Clock> DataStore<C> {
    pub fn new(executor: Arc<Executor<C>>, vdo_supported: bool) -> Self {
        Self {
            executor,
            snapshot: RwLock::new(Arc::new(DataStoreSnapshot::default())),
            num_refreshes: AtomicU64::new(0),
            vdo_supported,
        }
    }

    pub fn num_refreshes(&self) -> u64 {
        self.num_refreshes.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Arc<DataStoreSnapshot> {
        self.snapshot.read().clone()
    }

    /// Issue one full-report command, parse it, and atomically swap in
    /// the new snapshot. `log` requests a diagnostic log line around the
    /// refresh (propagated from the Coordinator's OR-merged options).
    pub async fn refresh(&self, log: bool) -> LvmResult<()> {
        if log {
            tracing::debug!("refreshing DataStore snapshot");
        }
        let report = self.run_full_report().await?;
        let pvs = parse_pvs(&report)?;
        let mut vgs = parse_vgs(&report)?;
        let lvs = parse_lvs(&report, self.vdo_supported)?;
        link_children(&mut vgs, &pvs, &lvs);

        *self.snapshot.write() = Arc::new(DataStoreSnapshot { pvs, vgs, lvs });
        self.num_refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn run_full_report(&self) -> LvmResult<serde_json::Value> {
        let argv = full_report_argv(self.vdo_supported);
        let out = self.executor.call(argv).await?;
        if !out.is_success(ACCEPTABLE_EXIT_CODES) {
            return Err(LvmError::ToolFailure { exit_code: out.exit_code, stderr: out.stderr });
        }
        out.structured
            .ok_or_else(|| LvmError::tool_bug(format!("full report produced no structured output: {:?}", out.raw_stdout)))
    }

    pub fn fetch_pvs(&self, filter: impl Fn(&PhysicalVolume) -> bool) -> Vec<PhysicalVolume> {
        self.current().pvs.iter().filter(|pv| filter(pv)).cloned().collect()
    }

    pub fn fetch_vgs(&self, filter: impl Fn(&VolumeGroup) -> bool) -> Vec<VolumeGroup> {
        self.current().vgs.iter().filter(|vg| filter(vg)).cloned().collect()
    }

    pub fn fetch_lvs(&self, filter: impl Fn(&LogicalVolume) -> bool) -> Vec<LogicalVolume> {
        self.current().lvs.iter().filter(|lv| filter(lv)).cloned().collect()
    }

    pub fn lvs_in_vg(&self, vg_uuid: &lvmd_core::Uuid) -> Vec<LogicalVolume> {
        self.current().lvs_in_vg(vg_uuid).into_iter().cloned().collect()
    }

    pub fn pvs_in_vg(&self, vg_uuid: &lvmd_core::Uuid) -> Vec<PhysicalVolume> {
        self.current().pvs_in_vg(vg_uuid).into_iter().cloned().collect()
    }

    pub fn hidden_lvs(&self, vg_uuid: &lvmd_core::Uuid) -> Vec<LogicalVolume> {
        self.current().hidden_lvs(vg_uuid).into_iter().cloned().collect()
    }

    pub fn lv_contained_pv(&self, lv_uuid: &lvmd_core::Uuid) -> Option<PhysicalVolume> {
        self.current().lv_contained_pv(lv_uuid).cloned()
    }
}

/// The fixed argv template for a full-report command (§4.2); the exact
/// flag catalog beyond "json, all three kinds, fixed columns" is out of
/// scope per §1.
pub fn full_report_argv(vdo_supported: bool) -> Vec<String> {
    let mut columns = Vec::new();
    columns.extend(PV_COLUMNS.iter().map(|c| c.to_string()));
    columns.extend(VG_COLUMNS.iter().map(|c| c.to_string()));
    columns.extend(LV_COLUMNS.iter().map(|c| c.to_string()));
    if vdo_supported {
        columns.push("vdo_operating_mode".to_string());
    }
    vec![
        "fullreport".to_string(),
        "--reportformat".to_string(),
        "json".to_string(),
        "-o".to_string(),
        columns.join(","),
    ]
}

/// Populates each VG's `pvs`/`lvs` path lists from the flat PV/LV rows
/// just parsed, since the report itself doesn't nest them.
fn link_children(vgs: &mut [VolumeGroup], pvs: &[PhysicalVolume], lvs: &[LogicalVolume]) {
    for vg in vgs.iter_mut() {
        vg.pvs = pvs.iter().filter(|pv| pv.vg.as_ref().is_some_and(|v| v.as_str() == vg.name)).map(|pv| pv.path.clone()).collect();
        vg.lvs = lvs.iter().filter(|lv| lv.vg.as_str() == vg.name).map(|lv| lv.path.clone()).collect();
    }
}

#[cfg(test)]
#[path = "datastore_tests.rs"]
mod tests;
