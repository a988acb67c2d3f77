// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate (§6).

use std::path::PathBuf;
use std::time::Duration;

/// `LVM_BINARY` overrides the tool path; defaults to `lvm` looked up on `PATH`.
pub fn lvm_binary() -> String {
    std::env::var("LVM_BINARY").unwrap_or_else(|_| "lvm".to_string())
}

/// When set, use the caller's existing D-Bus session bus rather than the
/// system bus — a local-transport daemon has no bus to join, so this only
/// affects which state directory owns the Unix socket (keeps the env var
/// name and meaning from the source tool rather than inventing a new one).
pub fn use_session() -> bool {
    std::env::var("LVMDBUSD_USE_SESSION").map(|v| v != "0" && !v.is_empty()).unwrap_or(false)
}

/// Env vars forced on every invocation of the external tool regardless of
/// the caller's own environment (§6): locale-stable parsing, and a command
/// profile that disables interactive prompts and color.
pub fn forced_env() -> Vec<(String, String)> {
    vec![
        ("LC_ALL".to_string(), "C".to_string()),
        ("LVM_COMMAND_PROFILE".to_string(), "lvmdbusd".to_string()),
    ]
}

/// Resolve the state directory: `LVMDBUSD_STATE_DIR` > `XDG_STATE_HOME/lvmdbusd` > `~/.local/state/lvmdbusd`.
pub fn state_dir() -> Result<PathBuf, StateDirError> {
    if let Ok(dir) = std::env::var("LVMDBUSD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("lvmdbusd"));
    }
    let home = std::env::var("HOME").map_err(|_| StateDirError::NoHome)?;
    Ok(PathBuf::from(home).join(".local/state/lvmdbusd"))
}

pub fn socket_path() -> Result<PathBuf, StateDirError> {
    Ok(state_dir()?.join("lvmdbusd.sock"))
}

pub fn lock_path() -> Result<PathBuf, StateDirError> {
    Ok(state_dir()?.join("lvmdbusd.lock"))
}

/// Timeout a single RPC connection's read/write waits on (not the same as
/// a request's own `tmo` budget, which is a wire-level field).
pub fn ipc_timeout() -> Duration {
    std::env::var("LVMDBUSD_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

#[derive(Debug, thiserror::Error)]
pub enum StateDirError {
    #[error("could not determine a state directory: $HOME is not set")]
    NoHome,
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
