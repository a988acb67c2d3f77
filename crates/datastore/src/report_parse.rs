// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses the external tool's `--reportformat json` output into the core
//! entity types. A missing expected column is a `ToolBug` (§4.2); the
//! structured tree is `serde_json::Value`, already in the dependency
//! graph rather than a bespoke parser.
//!
//! Entities parsed here carry [`lvmd_core::ObjectPath::none`] — path
//! assignment is the Object Manager's responsibility (§4.3), applied by
//! the Loader/Reconciler during reconciliation.

use lvmd_core::{classify_lv, DeviceSegment, LogicalVolume, LvmError, LvmResult, ObjectPath, PhysicalVolume, Uuid, VolumeGroup};
use serde_json::Value;

pub const PV_COLUMNS: &[&str] = &[
    "pv_uuid", "pv_name", "vg_name", "pv_size", "pv_free", "pv_tags", "pv_allocatable", "pv_pe_count", "pv_pe_alloc_count",
];
pub const VG_COLUMNS: &[&str] = &[
    "vg_uuid", "vg_name", "vg_size", "vg_free", "vg_extent_size", "vg_extent_count", "vg_free_count", "vg_attr",
    "vg_tags", "max_pv", "max_lv", "vg_allocation_policy", "pv_name", "lv_name",
];
pub const LV_COLUMNS: &[&str] = &[
    "lv_uuid", "lv_name", "vg_name", "lv_size", "data_percent", "segtype", "layout", "origin", "pool_lv", "lv_tags",
    "lv_permissions", "lv_allocation_policy", "lv_active", "lv_health_status", "lv_attr", "devices",
];

fn rows<'a>(report: &'a Value, key: &str) -> Vec<&'a Value> {
    report
        .get("report")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get(key))
                .filter_map(Value::as_array)
                .flatten()
                .collect()
        })
        .unwrap_or_default()
}

fn column<'a>(row: &'a Value, name: &str) -> LvmResult<&'a Value> {
    row.get(name).ok_or_else(|| LvmError::tool_bug(format!("missing expected column {name:?}")))
}

fn str_col(row: &Value, name: &str) -> LvmResult<String> {
    Ok(column(row, name)?.as_str().unwrap_or_default().to_string())
}

fn u64_col(row: &Value, name: &str) -> LvmResult<u64> {
    let raw = str_col(row, name)?;
    parse_lvm_number(&raw)
        .ok_or_else(|| LvmError::tool_bug(format!("column {name:?} is not a number: {raw:?}")))
}

fn f64_col(row: &Value, name: &str) -> LvmResult<f64> {
    let raw = str_col(row, name)?;
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.')
        .parse()
        .map_err(|_| LvmError::tool_bug(format!("column {name:?} is not a float: {raw:?}")))
}

fn bool_col(row: &Value, name: &str) -> LvmResult<bool> {
    Ok(str_col(row, name)? == "1")
}

fn tags_col(row: &Value, name: &str) -> LvmResult<Vec<String>> {
    Ok(str_col(row, name)?.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
}

/// Numeric report columns often carry a trailing unit (e.g. `"1073741824B"`);
/// this strips any non-numeric suffix.
fn parse_lvm_number(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

pub fn parse_pvs(report: &Value) -> LvmResult<Vec<PhysicalVolume>> {
    rows(report, "pv")
        .into_iter()
        .map(|row| {
            let vg_name = str_col(row, "vg_name")?;
            Ok(PhysicalVolume {
                path: ObjectPath::none(),
                uuid: Uuid::new(str_col(row, "pv_uuid")?),
                device: str_col(row, "pv_name")?,
                vg: if vg_name.is_empty() { None } else { Some(ObjectPath::new(vg_name)) },
                size_bytes: u64_col(row, "pv_size")?,
                free_bytes: u64_col(row, "pv_free")?,
                tags: tags_col(row, "pv_tags")?,
                allocatable: bool_col(row, "pv_allocatable")?,
                pe_count: u64_col(row, "pv_pe_count")?,
                pe_alloc_count: u64_col(row, "pv_pe_alloc_count")?,
            })
        })
        .collect()
}

pub fn parse_vgs(report: &Value) -> LvmResult<Vec<VolumeGroup>> {
    rows(report, "vg")
        .into_iter()
        .map(|row| {
            let attr_bits = str_col(row, "vg_attr")?;
            Ok(VolumeGroup {
                path: ObjectPath::none(),
                uuid: Uuid::new(str_col(row, "vg_uuid")?),
                name: str_col(row, "vg_name")?,
                pvs: Vec::new(),
                lvs: Vec::new(),
                size_bytes: u64_col(row, "vg_size")?,
                free_bytes: u64_col(row, "vg_free")?,
                extent_size_bytes: u64_col(row, "vg_extent_size")?,
                extent_count: u64_col(row, "vg_extent_count")?,
                free_extent_count: u64_col(row, "vg_free_count")?,
                exported: attr_bits.chars().nth(5) == Some('x'),
                attr_bits,
                tags: tags_col(row, "vg_tags")?,
                max_pv: u64_col(row, "max_pv")?,
                max_lv: u64_col(row, "max_lv")?,
                allocation_policy: str_col(row, "vg_allocation_policy")?,
            })
        })
        .collect()
}

/// VDO columns are appended to the LV column set only when the tool
/// reports VDO support (§4.2); `vdo_supported` gates whether `classify_lv`
/// is allowed to select a vdo variant.
pub fn parse_lvs(report: &Value, vdo_supported: bool) -> LvmResult<Vec<LogicalVolume>> {
    rows(report, "lv")
        .into_iter()
        .map(|row| {
            let name = str_col(row, "lv_name")?;
            let lv_attr = str_col(row, "lv_attr")?;
            let layout = str_col(row, "layout")?;
            let origin = str_col(row, "origin")?;
            let segtype = str_col(row, "segtype")?;
            let pool_lv = str_col(row, "pool_lv")?;
            let kind = classify_lv(&name, &lv_attr, &layout, !origin.is_empty(), vdo_supported, &segtype);
            Ok(LogicalVolume {
                path: ObjectPath::none(),
                uuid: Uuid::new(str_col(row, "lv_uuid")?),
                kind,
                name,
                vg: ObjectPath::new(str_col(row, "vg_name")?),
                size_bytes: u64_col(row, "lv_size")?,
                data_percent: f64_col(row, "data_percent")?,
                seg_types: vec![segtype],
                origin_lv: (!origin.is_empty()).then(|| ObjectPath::new(origin)),
                pool_lv: (!pool_lv.is_empty()).then(|| ObjectPath::new(pool_lv)),
                devices: parse_devices(row)?,
                hidden_lvs: Vec::new(),
                tags: tags_col(row, "lv_tags")?,
                permissions: str_col(row, "lv_permissions")?,
                allocation_policy: str_col(row, "lv_allocation_policy")?,
                state: String::new(),
                target_type: String::new(),
                health: str_col(row, "lv_health_status")?,
                fixed_minor: false,
                zero_blocks: false,
                skip_activation: false,
                active: bool_col(row, "lv_active")?,
            })
        })
        .collect()
}

fn parse_devices(row: &Value) -> LvmResult<Vec<DeviceSegment>> {
    let raw = str_col(row, "devices")?;
    // `devices` is reported as `pv(start-end),pv2(start2-end2)`.
    Ok(raw
        .split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|entry| {
            let (pv, range) = entry.split_once('(')?;
            let range = range.trim_end_matches(')');
            let (start, end) = range.split_once('-')?;
            Some(DeviceSegment {
                pv: ObjectPath::new(pv),
                start_extent: start.parse().ok()?,
                end_extent: end.parse().ok()?,
                segtype: String::new(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_pvs_reads_the_expected_columns() {
        let report = json!({"report": [{"pv": [{
            "pv_uuid": "uuid-1", "pv_name": "/dev/loop0", "vg_name": "vg0",
            "pv_size": "1073741824B", "pv_free": "536870912B", "pv_tags": "a,b",
            "pv_allocatable": "1", "pv_pe_count": "255", "pv_pe_alloc_count": "100",
        }]}]});
        let pvs = parse_pvs(&report).unwrap();
        assert_eq!(pvs.len(), 1);
        assert_eq!(pvs[0].device, "/dev/loop0");
        assert_eq!(pvs[0].size_bytes, 1073741824);
        assert_eq!(pvs[0].tags, vec!["a", "b"]);
        assert!(pvs[0].allocatable);
    }

    #[test]
    fn parse_pvs_missing_column_is_tool_bug() {
        let report = json!({"report": [{"pv": [{"pv_name": "/dev/loop0"}]}]});
        let err = parse_pvs(&report).unwrap_err();
        assert!(matches!(err, LvmError::ToolBug { .. }));
    }

    #[test]
    fn parse_vgs_detects_exported_flag() {
        let report = json!({"report": [{"vg": [{
            "vg_uuid": "u", "vg_name": "vg0", "vg_size": "0B", "vg_free": "0B",
            "vg_extent_size": "4194304B", "vg_extent_count": "0", "vg_free_count": "0",
            "vg_attr": "wz---x", "vg_tags": "", "max_pv": "0", "max_lv": "0",
            "vg_allocation_policy": "normal",
        }]}]});
        let vgs = parse_vgs(&report).unwrap();
        assert!(vgs[0].exported);
    }

    #[test]
    fn parse_lvs_classifies_thin_pool_by_attr() {
        let report = json!({"report": [{"lv": [{
            "lv_uuid": "u", "lv_name": "pool0", "vg_name": "vg0", "lv_size": "0B",
            "data_percent": "", "segtype": "thin-pool", "layout": "", "origin": "",
            "pool_lv": "", "lv_tags": "", "lv_permissions": "rw",
            "lv_allocation_policy": "inherit", "lv_active": "1",
            "lv_health_status": "", "lv_attr": "twi-a-tz--", "devices": "",
        }]}]});
        let lvs = parse_lvs(&report, false).unwrap();
        assert_eq!(lvs[0].kind, lvmd_core::LvKind::ThinPool);
    }

    #[test]
    fn parse_devices_reads_pv_extent_ranges() {
        let report = json!({"report": [{"lv": [{
            "lv_uuid": "u", "lv_name": "lv0", "vg_name": "vg0", "lv_size": "0B",
            "data_percent": "", "segtype": "linear", "layout": "", "origin": "",
            "pool_lv": "", "lv_tags": "", "lv_permissions": "rw",
            "lv_allocation_policy": "inherit", "lv_active": "1",
            "lv_health_status": "", "lv_attr": "-wi-a-----", "devices": "/dev/loop0(0-99)",
        }]}]});
        let lvs = parse_lvs(&report, false).unwrap();
        assert_eq!(lvs[0].devices.len(), 1);
        assert_eq!(lvs[0].devices[0].start_extent, 0);
        assert_eq!(lvs[0].devices[0].end_extent, 99);
    }
}
