// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable RPC object paths and the hidden-leaf bracketing convention shared
//! by the Object Manager and the Loader (invariant 2 of the data model).

use std::fmt;

/// A stable, opaque RPC path such as `/org/lvmd/Pv0` or `/org/lvmd/Vg3/Lv1`.
///
/// Allocated by a per-type monotonic counter kept in the daemon context;
/// never parsed for meaning once allocated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ObjectPath(String);

/// Sentinel path meaning "no object" on the wire (§6: `'/'`).
pub const NO_OBJECT: &str = "/";

impl ObjectPath {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The `/` sentinel meaning "no object / no job".
    pub fn none() -> Self {
        Self(NO_OBJECT.to_string())
    }

    pub fn is_none(&self) -> bool {
        self.0 == NO_OBJECT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ObjectPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ObjectPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An opaque uuid as reported by the external tool. Never generated by the
/// daemon, only observed and re-stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Uuid(String);

impl Uuid {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Uuid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Uuid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Returns the bracketed hidden-leaf form of a `vg/lv`-shaped domain id
/// (`vg/lv` → `vg/[lv]`). Ids without a `/` separator are returned
/// unbracketed (there is no leaf to hide).
pub fn bracketed_form(domain_id: &str) -> String {
    match domain_id.rsplit_once('/') {
        Some((vg, lv)) if !lv.starts_with('[') => format!("{vg}/[{lv}]"),
        _ => domain_id.to_string(),
    }
}

/// Returns the unbracketed form of a `vg/[lv]`-shaped domain id
/// (`vg/[lv]` → `vg/lv`).
pub fn unbracketed_form(domain_id: &str) -> String {
    match domain_id.rsplit_once('/') {
        Some((vg, lv)) if lv.starts_with('[') && lv.ends_with(']') => {
            format!("{vg}/{}", &lv[1..lv.len() - 1])
        }
        _ => domain_id.to_string(),
    }
}

/// The lookup order for a domain id, per invariant 2: literal form first,
/// then the bracketed hidden-leaf form. Returns both candidates so a caller
/// can try each against its domain-id index in turn.
pub fn lookup_candidates(domain_id: &str) -> [String; 2] {
    [domain_id.to_string(), bracketed_form(domain_id)]
}

/// Whether `name` is the bracketed hidden-leaf form, i.e. `[x]`.
pub fn is_hidden_display_name(name: &str) -> bool {
    name.starts_with('[') && name.ends_with(']') && name.len() >= 2
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
