// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lvmd_core::ObjectPath;

fn snapshot_with(pvs: Vec<PhysicalVolume>, vgs: Vec<VolumeGroup>, lvs: Vec<LogicalVolume>) -> DataStoreSnapshot {
    DataStoreSnapshot { pvs, vgs, lvs }
}

#[test]
fn first_reconcile_reports_everything_as_added() {
    let om = ObjectManager::new();
    let vg = VolumeGroup::fixture("vg-u", "vg0");
    let lv = LogicalVolume::fixture("lv-u", "lv0", ObjectPath::new("vg0"));
    let fresh = snapshot_with(vec![], vec![vg], vec![lv]);
    let previous = DataStoreSnapshot::default();

    let report = Reconciler::new().reconcile(&om, &previous, &fresh, true);
    assert_eq!(report.vg.added.len(), 1);
    assert_eq!(report.lv.added.len(), 1);
    assert!(report.vg.updated.is_empty());
}

#[test]
fn unchanged_entity_produces_no_diff_entry() {
    let om = ObjectManager::new();
    let vg = VolumeGroup::fixture("vg-u", "vg0");
    let previous = snapshot_with(vec![], vec![vg.clone()], vec![]);
    Reconciler::new().reconcile(&om, &DataStoreSnapshot::default(), &previous, true);

    let fresh = snapshot_with(vec![], vec![vg], vec![]);
    let report = Reconciler::new().reconcile(&om, &previous, &fresh, true);
    assert!(report.vg.is_empty());
}

#[test]
fn changed_property_is_reported_as_updated_not_added() {
    let om = ObjectManager::new();
    let mut vg = VolumeGroup::fixture("vg-u", "vg0");
    let previous = snapshot_with(vec![], vec![vg.clone()], vec![]);
    Reconciler::new().reconcile(&om, &DataStoreSnapshot::default(), &previous, true);

    vg.free_bytes = 0;
    let fresh = snapshot_with(vec![], vec![vg], vec![]);
    let report = Reconciler::new().reconcile(&om, &previous, &fresh, true);
    assert_eq!(report.vg.updated.len(), 1);
    assert!(report.vg.added.is_empty());
}

#[test]
fn changed_extent_size_is_reported_as_updated() {
    let om = ObjectManager::new();
    let mut vg = VolumeGroup::fixture("vg-u", "vg0");
    let previous = snapshot_with(vec![], vec![vg.clone()], vec![]);
    Reconciler::new().reconcile(&om, &DataStoreSnapshot::default(), &previous, true);

    vg.extent_size_bytes *= 2;
    let fresh = snapshot_with(vec![], vec![vg], vec![]);
    let report = Reconciler::new().reconcile(&om, &previous, &fresh, true);
    assert_eq!(report.vg.updated.len(), 1);
    assert!(report.vg.added.is_empty());
}

#[test]
fn absent_entity_is_removed_after_all_kinds_processed() {
    let om = ObjectManager::new();
    let vg = VolumeGroup::fixture("vg-u", "vg0");
    let previous = snapshot_with(vec![], vec![vg], vec![]);
    Reconciler::new().reconcile(&om, &DataStoreSnapshot::default(), &previous, true);
    assert_eq!(om.object_paths_by_type(EntityType::Vg).len(), 1);

    let fresh = DataStoreSnapshot::default();
    let report = Reconciler::new().reconcile(&om, &previous, &fresh, true);
    assert_eq!(report.vg.removed.len(), 1);
    assert!(om.object_paths_by_type(EntityType::Vg).is_empty());
}

#[test]
fn hidden_lv_domain_id_resolves_bracketed_and_unbracketed() {
    let om = ObjectManager::new();
    let mut lv = LogicalVolume::fixture("lv-hidden", "[snap0]", ObjectPath::new("vg0"));
    lv.kind = lvmd_core::LvKind::Hidden;
    let fresh = snapshot_with(vec![], vec![], vec![lv]);
    Reconciler::new().reconcile(&om, &DataStoreSnapshot::default(), &fresh, true);

    assert_eq!(
        om.lookup_by_domain_id("vg0/snap0"),
        om.lookup_by_domain_id("vg0/[snap0]")
    );
}
