// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The immutable snapshot a refresh produces (§4.2).

use lvmd_core::{LogicalVolume, PhysicalVolume, VolumeGroup};

#[derive(Debug, Clone, Default)]
pub struct DataStoreSnapshot {
    pub pvs: Vec<PhysicalVolume>,
    pub vgs: Vec<VolumeGroup>,
    pub lvs: Vec<LogicalVolume>,
}

impl DataStoreSnapshot {
    pub fn pvs_in_vg(&self, vg_uuid: &lvmd_core::Uuid) -> Vec<&PhysicalVolume> {
        self.pvs.iter().filter(|pv| self.vg_with_uuid(vg_uuid).map(|vg| &vg.path) == pv.vg.as_ref()).collect()
    }

    pub fn lvs_in_vg(&self, vg_uuid: &lvmd_core::Uuid) -> Vec<&LogicalVolume> {
        match self.vg_with_uuid(vg_uuid) {
            Some(vg) => self.lvs.iter().filter(|lv| lv.vg == vg.path).collect(),
            None => Vec::new(),
        }
    }

    pub fn hidden_lvs(&self, vg_uuid: &lvmd_core::Uuid) -> Vec<&LogicalVolume> {
        self.lvs_in_vg(vg_uuid).into_iter().filter(|lv| lv.kind == lvmd_core::LvKind::Hidden).collect()
    }

    /// The PV backing an LV's data, if this LV has exactly one device
    /// segment (used by `Lv.Move` style callers to resolve the source PV).
    pub fn lv_contained_pv(&self, lv_uuid: &lvmd_core::Uuid) -> Option<&PhysicalVolume> {
        let lv = self.lvs.iter().find(|lv| &lv.uuid == lv_uuid)?;
        let segment = lv.devices.first()?;
        self.pvs.iter().find(|pv| pv.path == segment.pv)
    }

    fn vg_with_uuid(&self, uuid: &lvmd_core::Uuid) -> Option<&VolumeGroup> {
        self.vgs.iter().find(|vg| &vg.uuid == uuid)
    }
}
