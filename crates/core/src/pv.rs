// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Physical volume entity.

use crate::path::{ObjectPath, Uuid};

/// A physical volume as reconciled from the DataStore's `pvs` report.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalVolume {
    pub path: ObjectPath,
    pub uuid: Uuid,
    pub device: String,
    /// Path of the owning VG, if any (an unattached PV has none).
    pub vg: Option<ObjectPath>,
    pub size_bytes: u64,
    pub free_bytes: u64,
    pub tags: Vec<String>,
    pub allocatable: bool,
    pub pe_count: u64,
    pub pe_alloc_count: u64,
}

impl PhysicalVolume {
    /// Whether two snapshots of the same uuid differ in any externally
    /// visible property — used by the Loader to decide whether an
    /// interface-changed notification is warranted.
    pub fn differs_from(&self, other: &Self) -> bool {
        self.device != other.device
            || self.vg != other.vg
            || self.size_bytes != other.size_bytes
            || self.free_bytes != other.free_bytes
            || self.tags != other.tags
            || self.allocatable != other.allocatable
            || self.pe_count != other.pe_count
            || self.pe_alloc_count != other.pe_alloc_count
    }
}

#[cfg(any(test, feature = "test-support"))]
impl PhysicalVolume {
    pub fn fixture(uuid: &str, device: &str) -> Self {
        Self {
            path: ObjectPath::none(),
            uuid: Uuid::new(uuid),
            device: device.to_string(),
            vg: None,
            size_bytes: 1 << 30,
            free_bytes: 1 << 30,
            tags: Vec::new(),
            allocatable: true,
            pe_count: 255,
            pe_alloc_count: 0,
        }
    }
}
