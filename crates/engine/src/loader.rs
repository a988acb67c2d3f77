// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loader / Reconciler (C4): diffs a fresh DataStore snapshot against the
//! Object Manager and produces the minimal add/update/remove operations
//! for each entity kind (§4.4).

use crate::object_manager::{EntityType, ObjectManager};
use lvmd_core::{LogicalVolume, PhysicalVolume, Uuid, VolumeGroup};
use lvmd_datastore::DataStoreSnapshot;

/// Per-kind add/update/remove outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub added: Vec<Uuid>,
    pub updated: Vec<Uuid>,
    pub removed: Vec<Uuid>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub pv: Diff,
    pub vg: Diff,
    pub lv: Diff,
}

impl ReconcileReport {
    pub fn total_changes(&self) -> usize {
        self.pv.len() + self.vg.len() + self.lv.len()
    }
}

#[derive(Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// Reconcile `fresh` against the Object Manager's current contents,
    /// using `previous` (the last published snapshot, possibly the
    /// default empty one on first refresh) to decide whether a still-known
    /// uuid actually changed any externally visible property.
    ///
    /// Entities absent from `fresh` are removed only after PVs, VGs, and
    /// LVs have all been processed for add/update, so references stay
    /// valid while dependent entities are reconciled (§4.4). VG-level
    /// effects of an LV transition (membership, free-extent accounting)
    /// are already visible in `fresh.vgs` itself, since `fresh` is one
    /// point-in-time snapshot taken after the whole refresh — a single
    /// `reconcile_vgs` pass against `previous` already sees them.
    ///
    /// `emit_signal` is the batch's OR-merged option (§9 Open Questions):
    /// when true, every add/remove broadcasts an Object Manager
    /// notification in addition to being reflected in the returned report.
    pub fn reconcile(
        &self,
        om: &ObjectManager,
        previous: &DataStoreSnapshot,
        fresh: &DataStoreSnapshot,
        emit_signal: bool,
    ) -> ReconcileReport {
        let pv = reconcile_pvs(om, previous, fresh, emit_signal);
        let vg = reconcile_vgs(om, previous, fresh, emit_signal);
        let lv = reconcile_lvs(om, previous, fresh, emit_signal);

        let pv_removed = remove_missing(om, EntityType::Pv, fresh.pvs.iter().map(|e| e.uuid.clone()), emit_signal);
        let vg_removed = remove_missing(om, EntityType::Vg, fresh.vgs.iter().map(|e| e.uuid.clone()), emit_signal);
        let lv_removed = remove_missing(om, EntityType::Lv, fresh.lvs.iter().map(|e| e.uuid.clone()), emit_signal);

        ReconcileReport {
            pv: Diff { removed: pv_removed, ..pv },
            vg: Diff { removed: vg_removed, ..vg },
            lv: Diff { removed: lv_removed, ..lv },
        }
    }
}

fn remove_missing(om: &ObjectManager, kind: EntityType, present: impl Iterator<Item = Uuid>, emit_signal: bool) -> Vec<Uuid> {
    let present: std::collections::HashSet<Uuid> = present.collect();
    let mut removed = Vec::new();
    for path in om.object_paths_by_type(kind) {
        let Some(uuid) = om.uuid_at(&path) else { continue };
        if !present.contains(&uuid) {
            om.remove(&path, emit_signal);
            removed.push(uuid);
        }
    }
    removed
}

fn reconcile_pvs(om: &ObjectManager, previous: &DataStoreSnapshot, fresh: &DataStoreSnapshot, emit_signal: bool) -> Diff {
    let mut diff = Diff::default();
    let previous_by_uuid: std::collections::HashMap<&Uuid, &PhysicalVolume> = previous.pvs.iter().map(|p| (&p.uuid, p)).collect();
    for pv in &fresh.pvs {
        let was_known = om.lookup_by_uuid(&pv.uuid).is_some();
        om.path_for(EntityType::Pv, &pv.uuid, &pv.device, true, emit_signal);
        if was_known {
            if previous_by_uuid.get(&pv.uuid).map_or(true, |prev| prev.differs_from(pv)) {
                diff.updated.push(pv.uuid.clone());
            }
        } else {
            diff.added.push(pv.uuid.clone());
        }
    }
    diff
}

fn reconcile_vgs(om: &ObjectManager, previous: &DataStoreSnapshot, fresh: &DataStoreSnapshot, emit_signal: bool) -> Diff {
    let mut diff = Diff::default();
    let previous_by_uuid: std::collections::HashMap<&Uuid, &VolumeGroup> = previous.vgs.iter().map(|v| (&v.uuid, v)).collect();
    for vg in &fresh.vgs {
        let was_known = om.lookup_by_uuid(&vg.uuid).is_some();
        om.path_for(EntityType::Vg, &vg.uuid, vg.domain_id(), true, emit_signal);
        if was_known {
            if previous_by_uuid.get(&vg.uuid).map_or(true, |prev| prev.differs_from(vg)) {
                diff.updated.push(vg.uuid.clone());
            }
        } else {
            diff.added.push(vg.uuid.clone());
        }
    }
    diff
}

fn reconcile_lvs(om: &ObjectManager, previous: &DataStoreSnapshot, fresh: &DataStoreSnapshot, emit_signal: bool) -> Diff {
    let mut diff = Diff::default();
    let previous_by_uuid: std::collections::HashMap<&Uuid, &LogicalVolume> = previous.lvs.iter().map(|l| (&l.uuid, l)).collect();
    for lv in &fresh.lvs {
        // `lv.vg` holds the raw vg name (DataStore assigns no real path to
        // the vg backref until the Object Manager registers it).
        let domain_id = lv.domain_id(lv.vg.as_str());
        let was_known = om.lookup_by_uuid(&lv.uuid).is_some();
        om.path_for(EntityType::Lv, &lv.uuid, &domain_id, true, emit_signal);
        if was_known {
            if previous_by_uuid.get(&lv.uuid).map_or(true, |prev| prev.differs_from(lv)) {
                diff.updated.push(lv.uuid.clone());
            }
        } else {
            diff.added.push(lv.uuid.clone());
        }
    }
    diff
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
