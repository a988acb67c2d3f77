// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Volume group entity.

use crate::path::{ObjectPath, Uuid};

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeGroup {
    pub path: ObjectPath,
    pub uuid: Uuid,
    pub name: String,
    pub pvs: Vec<ObjectPath>,
    pub lvs: Vec<ObjectPath>,
    pub size_bytes: u64,
    pub free_bytes: u64,
    pub extent_size_bytes: u64,
    pub extent_count: u64,
    pub free_extent_count: u64,
    /// Raw `vg_attr` bit string as reported, kept verbatim for properties
    /// that surface it (e.g. `Clustered`, `PartialMode`) without the
    /// daemon re-deriving meanings the tool itself doesn't contractually
    /// document beyond §1's "semantics of volume operations" exclusion.
    pub attr_bits: String,
    pub tags: Vec<String>,
    pub max_pv: u64,
    pub max_lv: u64,
    pub allocation_policy: String,
    /// Exported VGs (`vg_attr` `x` flag, report exit code 5) are valid
    /// state per §4.2, not an error.
    pub exported: bool,
}

impl VolumeGroup {
    pub fn differs_from(&self, other: &Self) -> bool {
        self.name != other.name
            || self.pvs != other.pvs
            || self.lvs != other.lvs
            || self.size_bytes != other.size_bytes
            || self.free_bytes != other.free_bytes
            || self.extent_size_bytes != other.extent_size_bytes
            || self.extent_count != other.extent_count
            || self.free_extent_count != other.free_extent_count
            || self.attr_bits != other.attr_bits
            || self.tags != other.tags
            || self.max_pv != other.max_pv
            || self.max_lv != other.max_lv
            || self.allocation_policy != other.allocation_policy
            || self.exported != other.exported
    }

    /// The domain id the Object Manager indexes this VG under. VGs are
    /// looked up by bare name; there is no `vg/leaf` shape at this level.
    pub fn domain_id(&self) -> &str {
        &self.name
    }
}

#[cfg(any(test, feature = "test-support"))]
impl VolumeGroup {
    pub fn fixture(uuid: &str, name: &str) -> Self {
        Self {
            path: ObjectPath::none(),
            uuid: Uuid::new(uuid),
            name: name.to_string(),
            pvs: Vec::new(),
            lvs: Vec::new(),
            size_bytes: 1 << 30,
            free_bytes: 1 << 30,
            extent_size_bytes: 4 << 20,
            extent_count: 255,
            free_extent_count: 255,
            attr_bits: "wz--n-".to_string(),
            tags: Vec::new(),
            max_pv: 0,
            max_lv: 0,
            allocation_policy: "normal".to_string(),
            exported: false,
        }
    }
}
