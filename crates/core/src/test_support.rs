// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::lv::LogicalVolume;
use crate::path::ObjectPath;
use crate::pv::PhysicalVolume;
use crate::vg::VolumeGroup;

/// Proptest strategies for the core data-model types, used by P1-P3/P5
/// property tests in `lvmd-engine`.
#[cfg(feature = "proptest")]
pub mod strategies {
    use proptest::prelude::*;

    /// Arbitrary `vg/lv`-shaped domain id, optionally hidden.
    pub fn arb_domain_id() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9_]{0,8}", "[a-z][a-z0-9_]{0,8}", any::<bool>()).prop_map(
            |(vg, lv, hidden)| if hidden { format!("{vg}/[{lv}]") } else { format!("{vg}/{lv}") },
        )
    }

    pub fn arb_percent() -> impl Strategy<Value = u8> {
        0u8..=100
    }
}

pub fn fixture_pv(n: u32) -> PhysicalVolume {
    let mut pv = PhysicalVolume::fixture(&format!("pv-uuid-{n}"), &format!("/dev/loop{n}"));
    pv.path = ObjectPath::new(format!("/org/lvmd/Pv{n}"));
    pv
}

pub fn fixture_vg(n: u32, name: &str) -> VolumeGroup {
    let mut vg = VolumeGroup::fixture(&format!("vg-uuid-{n}"), name);
    vg.path = ObjectPath::new(format!("/org/lvmd/Vg{n}"));
    vg
}

pub fn fixture_lv(n: u32, name: &str, vg: ObjectPath) -> LogicalVolume {
    let mut lv = LogicalVolume::fixture(&format!("lv-uuid-{n}"), name, vg);
    lv.path = ObjectPath::new(format!("/org/lvmd/Lv{n}"));
    lv
}
