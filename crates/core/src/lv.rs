// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logical volume entity: the polymorphic variant set and the deterministic
//! type-selection rule (§4.4) that classifies a raw report row into one.

use crate::path::{ObjectPath, Uuid};

/// The capability set a given [`LvKind`] exposes, per §3's "polymorphic
/// over the capability set" description. The common properties live on
/// [`LogicalVolume`] itself; variant-only methods are gated on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LvCapabilities {
    pub renamable: bool,
    pub resizable: bool,
    pub activatable: bool,
    pub taggable: bool,
    pub snapshotable: bool,
    pub has_cache_attach: bool,
    pub has_thin_create: bool,
    pub has_vdo_ops: bool,
}

/// The LV variant, selected deterministically from report attributes by
/// [`classify_lv`]. Hidden LVs carry only the common capability set,
/// matching §4.4's "hidden/internal (tracked via the common capability
/// only)".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LvKind {
    Plain,
    ThinPool,
    ThinVolume,
    CachePool,
    CachedLv,
    VdoPool,
    VdoLv,
    Snapshot,
    Hidden,
}

impl LvKind {
    pub fn capabilities(self) -> LvCapabilities {
        let base = LvCapabilities {
            renamable: true,
            resizable: true,
            activatable: true,
            taggable: true,
            snapshotable: true,
            ..Default::default()
        };
        match self {
            // Hidden/internal LVs carry no `LV_INTERFACE`, so no `Snapshot` either.
            Self::Hidden => LvCapabilities::default(),
            Self::Plain => base,
            Self::ThinPool => LvCapabilities { has_thin_create: true, ..base },
            Self::ThinVolume => base,
            Self::CachePool => LvCapabilities { has_cache_attach: true, ..base },
            Self::CachedLv => base,
            Self::VdoPool => LvCapabilities { has_vdo_ops: true, ..base },
            Self::VdoLv => base,
            Self::Snapshot => base,
        }
    }

    pub fn is_thin_pool(self) -> bool {
        matches!(self, Self::ThinPool)
    }

    pub fn is_thin_volume(self) -> bool {
        matches!(self, Self::ThinVolume)
    }
}

/// Deterministic LV type-selection rule from §4.4, evaluated in order:
///
/// 1. a bracketed display name is hidden/internal,
/// 2. an LV with a recorded origin is a snapshot, regardless of its
///    volume-type char or segment type — a thin volume or a VDO lv
///    snapshotted still classifies as a snapshot, not as either of those,
/// 3. if VDO is supported and the segment type indicates vdo, the vdo
///    pool/lv variants pre-empt the volume-type-char dispatch below
///    (vdo is a segment-type signal, not a volume-type character, so it
///    is evaluated independently of steps 4-6),
/// 4. a `t` lv_attr volume-type char is a thin pool,
/// 5. a `C` volume-type char is a cache pool if the layout mentions
///    "pool", otherwise a cached lv,
/// 6. a `V` volume-type char is a thin volume,
/// 7. otherwise it is a plain lv.
pub fn classify_lv(
    display_name: &str,
    lv_attr: &str,
    layout: &str,
    has_origin: bool,
    vdo_supported: bool,
    segtype: &str,
) -> LvKind {
    if crate::path::is_hidden_display_name(display_name) {
        return LvKind::Hidden;
    }
    if has_origin {
        return LvKind::Snapshot;
    }
    if vdo_supported && segtype.contains("vdo") {
        return if segtype == "vdo-pool" { LvKind::VdoPool } else { LvKind::VdoLv };
    }
    let volume_type = lv_attr.chars().next().unwrap_or('-');
    match volume_type {
        't' => LvKind::ThinPool,
        'C' => {
            if layout.contains("pool") {
                LvKind::CachePool
            } else {
                LvKind::CachedLv
            }
        }
        'V' => LvKind::ThinVolume,
        _ => LvKind::Plain,
    }
}

/// One `(pv_path, (start_extent, end_extent, segtype))` device mapping
/// entry, as reported per-segment for an LV.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSegment {
    pub pv: ObjectPath,
    pub start_extent: u64,
    pub end_extent: u64,
    pub segtype: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalVolume {
    pub path: ObjectPath,
    pub uuid: Uuid,
    pub kind: LvKind,
    pub name: String,
    pub vg: ObjectPath,
    pub size_bytes: u64,
    pub data_percent: f64,
    pub seg_types: Vec<String>,
    pub origin_lv: Option<ObjectPath>,
    pub pool_lv: Option<ObjectPath>,
    pub devices: Vec<DeviceSegment>,
    pub hidden_lvs: Vec<ObjectPath>,
    pub tags: Vec<String>,
    pub permissions: String,
    pub allocation_policy: String,
    pub state: String,
    pub target_type: String,
    pub health: String,
    pub fixed_minor: bool,
    pub zero_blocks: bool,
    pub skip_activation: bool,
    pub active: bool,
}

impl LogicalVolume {
    pub fn capabilities(&self) -> LvCapabilities {
        self.kind.capabilities()
    }

    pub fn is_thin_volume(&self) -> bool {
        self.kind.is_thin_volume()
    }

    pub fn is_thin_pool(&self) -> bool {
        self.kind.is_thin_pool()
    }

    /// The domain id this LV is looked up by: `vg/leaf`, bracketed when
    /// the leaf is hidden (§4.4's "leading '[': hidden").
    pub fn domain_id(&self, vg_name: &str) -> String {
        format!("{vg_name}/{}", self.name)
    }

    pub fn differs_from(&self, other: &Self) -> bool {
        self.kind != other.kind
            || self.name != other.name
            || self.vg != other.vg
            || self.size_bytes != other.size_bytes
            || self.data_percent != other.data_percent
            || self.seg_types != other.seg_types
            || self.origin_lv != other.origin_lv
            || self.pool_lv != other.pool_lv
            || self.devices != other.devices
            || self.hidden_lvs != other.hidden_lvs
            || self.tags != other.tags
            || self.permissions != other.permissions
            || self.allocation_policy != other.allocation_policy
            || self.state != other.state
            || self.target_type != other.target_type
            || self.health != other.health
            || self.fixed_minor != other.fixed_minor
            || self.zero_blocks != other.zero_blocks
            || self.skip_activation != other.skip_activation
            || self.active != other.active
    }
}

#[cfg(any(test, feature = "test-support"))]
impl LogicalVolume {
    pub fn fixture(uuid: &str, name: &str, vg: ObjectPath) -> Self {
        Self {
            path: ObjectPath::none(),
            uuid: Uuid::new(uuid),
            kind: LvKind::Plain,
            name: name.to_string(),
            vg,
            size_bytes: 4 << 20,
            data_percent: 0.0,
            seg_types: vec!["linear".to_string()],
            origin_lv: None,
            pool_lv: None,
            devices: Vec::new(),
            hidden_lvs: Vec::new(),
            tags: Vec::new(),
            permissions: "rw".to_string(),
            allocation_policy: "inherit".to_string(),
            state: "active".to_string(),
            target_type: "linear".to_string(),
            health: String::new(),
            fixed_minor: false,
            zero_blocks: false,
            skip_activation: false,
            active: true,
        }
    }
}

#[cfg(test)]
#[path = "lv_tests.rs"]
mod tests;
