// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one request shape the local transport accepts (§6A).

use lvmd_core::ObjectPath;
use serde::{Deserialize, Serialize};

/// The RPC-surface object groups named in §6: every method call targets
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interface {
    Manager,
    Pv,
    Vg,
    Lv,
    Job,
}

/// One request over the local transport: `{interface, path, method, args}`.
/// `path` is `None` for `Manager` calls, which are not addressed to a
/// specific object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    pub interface: Interface,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<ObjectPath>,
    pub method: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl WireRequest {
    pub fn manager(method: impl Into<String>, args: serde_json::Value) -> Self {
        Self { interface: Interface::Manager, path: None, method: method.into(), args }
    }

    pub fn addressed(interface: Interface, path: ObjectPath, method: impl Into<String>, args: serde_json::Value) -> Self {
        Self { interface, path: Some(path), method: method.into(), args }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
