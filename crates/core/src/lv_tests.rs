// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn hidden_name_pre_empts_everything_else() {
    assert_eq!(classify_lv("[vg_ss1]", "t", "pool", true, true, "vdo-pool"), LvKind::Hidden);
}

#[test]
fn thin_pool_by_attr_char() {
    assert_eq!(classify_lv("pool0", "twi-a-tz--", "", false, false, ""), LvKind::ThinPool);
}

#[test]
fn cache_pool_when_layout_mentions_pool() {
    assert_eq!(classify_lv("cpool", "Cwi---C---", "cache,pool", false, false, ""), LvKind::CachePool);
}

#[test]
fn cached_lv_when_layout_omits_pool() {
    assert_eq!(classify_lv("clv", "Cwi-a-C---", "cache", false, false, ""), LvKind::CachedLv);
}

#[test]
fn snapshot_when_origin_present() {
    assert_eq!(classify_lv("ss0", "swi-a-s---", "", true, false, ""), LvKind::Snapshot);
}

#[test]
fn plain_is_the_fallback() {
    assert_eq!(classify_lv("lv0", "-wi-a-----", "", false, false, ""), LvKind::Plain);
}

#[test]
fn thin_volume_by_attr_char() {
    assert_eq!(classify_lv("thinlv", "Vwi-a-tz--", "", false, false, ""), LvKind::ThinVolume);
}

#[test]
fn thin_volume_with_origin_is_a_snapshot_instead() {
    assert_eq!(classify_lv("thinss", "Vwi-a-tz--", "", true, false, ""), LvKind::Snapshot);
}

#[test]
fn vdo_pool_pre_empts_cache_classification_when_supported() {
    assert_eq!(classify_lv("vpool", "Cwi---C---", "cache,pool", false, true, "vdo-pool"), LvKind::VdoPool);
}

#[test]
fn vdo_lv_when_segtype_is_plain_vdo() {
    assert_eq!(classify_lv("vlv", "-wi-a-----", "", false, true, "vdo"), LvKind::VdoLv);
}

#[test]
fn vdo_classification_inactive_when_not_supported() {
    assert_eq!(classify_lv("vlv", "-wi-a-----", "", false, false, "vdo"), LvKind::Plain);
}

#[test]
fn origin_pre_empts_vdo_classification_too() {
    assert_eq!(classify_lv("vss", "swi-a-s---", "", true, true, "vdo"), LvKind::Snapshot);
    assert_eq!(classify_lv("vssp", "swi-a-s---", "", true, true, "vdo-pool"), LvKind::Snapshot);
}

#[test]
fn hidden_capability_set_is_minimal() {
    let caps = LvKind::Hidden.capabilities();
    assert!(!caps.renamable);
    assert!(!caps.resizable);
}

#[test]
fn thin_pool_can_create_thin_volumes() {
    assert!(LvKind::ThinPool.capabilities().has_thin_create);
}

#[test]
fn cache_pool_can_attach() {
    assert!(LvKind::CachePool.capabilities().has_cache_attach);
}

#[test]
fn vdo_pool_has_vdo_ops() {
    assert!(LvKind::VdoPool.capabilities().has_vdo_ops);
}

#[test]
fn every_non_hidden_kind_is_snapshotable() {
    for kind in [
        LvKind::Plain,
        LvKind::ThinPool,
        LvKind::ThinVolume,
        LvKind::CachePool,
        LvKind::CachedLv,
        LvKind::VdoPool,
        LvKind::VdoLv,
        LvKind::Snapshot,
    ] {
        assert!(kind.capabilities().snapshotable, "{kind:?} should be snapshotable");
    }
    assert!(!LvKind::Hidden.capabilities().snapshotable);
}
