// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn register_resolves_by_path_domain_id_and_uuid() {
    let om = ObjectManager::new();
    let uuid = Uuid::new("u-1");
    om.register(EntityType::Vg, "vg0", uuid.clone(), ObjectPath::new("/org/lvmd/Vg0"), false);

    assert!(om.lookup_by_path(&ObjectPath::new("/org/lvmd/Vg0")));
    assert_eq!(om.lookup_by_domain_id("vg0"), Some(ObjectPath::new("/org/lvmd/Vg0")));
    assert_eq!(om.lookup_by_uuid(&uuid), Some(ObjectPath::new("/org/lvmd/Vg0")));
}

#[test]
fn remove_clears_all_three_indexes() {
    let om = ObjectManager::new();
    let uuid = Uuid::new("u-1");
    let path = ObjectPath::new("/org/lvmd/Vg0");
    om.register(EntityType::Vg, "vg0", uuid.clone(), path.clone(), false);
    assert_eq!(om.remove(&path, false), Some(EntityType::Vg));

    assert!(!om.lookup_by_path(&path));
    assert_eq!(om.lookup_by_domain_id("vg0"), None);
    assert_eq!(om.lookup_by_uuid(&uuid), None);
}

#[test]
fn hidden_leaf_resolves_both_bracketed_and_unbracketed_forms() {
    let om = ObjectManager::new();
    let uuid = Uuid::new("u-hidden");
    om.register(EntityType::Lv, "vg0/[snap0]", uuid, ObjectPath::new("/org/lvmd/Lv0"), false);

    assert_eq!(om.lookup_by_domain_id("vg0/snap0"), Some(ObjectPath::new("/org/lvmd/Lv0")));
    assert_eq!(om.lookup_by_domain_id("vg0/[snap0]"), Some(ObjectPath::new("/org/lvmd/Lv0")));
}

#[test]
fn path_for_allocates_on_first_resolution_only_when_requested() {
    let om = ObjectManager::new();
    let uuid = Uuid::new("u-2");

    assert_eq!(om.path_for(EntityType::Pv, &uuid, "/dev/loop0", false, false), None);

    let allocated = om.path_for(EntityType::Pv, &uuid, "/dev/loop0", true, false).unwrap();
    assert_eq!(om.path_for(EntityType::Pv, &uuid, "/dev/loop0", false, false), Some(allocated));
}

#[test]
fn path_for_reconciles_index_after_rename() {
    let om = ObjectManager::new();
    let uuid = Uuid::new("u-3");
    let path = om.path_for(EntityType::Vg, &uuid, "vg0", true, false).unwrap();

    let resolved = om.path_for(EntityType::Vg, &uuid, "renamed_vg", true, false).unwrap();
    assert_eq!(resolved, path);
    assert_eq!(om.lookup_by_domain_id("vg0"), None);
    assert_eq!(om.lookup_by_domain_id("renamed_vg"), Some(path));
}

#[test]
fn object_paths_by_type_filters_to_the_requested_kind() {
    let om = ObjectManager::new();
    om.register(EntityType::Pv, "/dev/loop0", Uuid::new("u-pv"), ObjectPath::new("/org/lvmd/Pv0"), false);
    om.register(EntityType::Vg, "vg0", Uuid::new("u-vg"), ObjectPath::new("/org/lvmd/Vg0"), false);

    let pvs = om.object_paths_by_type(EntityType::Pv);
    assert_eq!(pvs, vec![ObjectPath::new("/org/lvmd/Pv0")]);
}

#[test]
fn lookup_by_uuid_and_domain_id_falls_back_to_domain_id() {
    let om = ObjectManager::new();
    let uuid = Uuid::new("u-4");
    om.register(EntityType::Pv, "/dev/loop1", uuid.clone(), ObjectPath::new("/org/lvmd/Pv1"), false);

    let other_uuid = Uuid::new("does-not-exist");
    assert_eq!(
        om.lookup_by_uuid_and_domain_id(&other_uuid, "/dev/loop1"),
        Some(ObjectPath::new("/org/lvmd/Pv1"))
    );
    let _ = uuid;
}

#[test]
fn register_emits_interfaces_added_only_when_requested() {
    let om = ObjectManager::new();
    let mut rx = om.subscribe();
    om.register(EntityType::Pv, "/dev/loop2", Uuid::new("u-5"), ObjectPath::new("/org/lvmd/Pv2"), false);
    assert!(rx.try_recv().is_err());

    om.register(EntityType::Pv, "/dev/loop3", Uuid::new("u-6"), ObjectPath::new("/org/lvmd/Pv3"), true);
    match rx.try_recv().expect("an InterfacesAdded event") {
        ObjectEvent::InterfacesAdded { kind, path } => {
            assert_eq!(kind, EntityType::Pv);
            assert_eq!(path, ObjectPath::new("/org/lvmd/Pv3"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn remove_emits_interfaces_removed_only_when_requested() {
    let om = ObjectManager::new();
    let path = ObjectPath::new("/org/lvmd/Vg1");
    om.register(EntityType::Vg, "vg1", Uuid::new("u-7"), path.clone(), false);
    let mut rx = om.subscribe();

    om.remove(&path, true);
    match rx.try_recv().expect("an InterfacesRemoved event") {
        ObjectEvent::InterfacesRemoved { kind, path: removed_path } => {
            assert_eq!(kind, EntityType::Vg);
            assert_eq!(removed_path, path);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
