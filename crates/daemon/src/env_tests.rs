// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn lvm_binary_defaults_to_lvm() {
    std::env::remove_var("LVM_BINARY");
    assert_eq!(lvm_binary(), "lvm");
}

#[test]
#[serial]
fn lvm_binary_honors_override() {
    std::env::set_var("LVM_BINARY", "/opt/lvm2/bin/lvm");
    assert_eq!(lvm_binary(), "/opt/lvm2/bin/lvm");
    std::env::remove_var("LVM_BINARY");
}

#[test]
#[serial]
fn forced_env_always_pins_locale_and_profile() {
    let forced = forced_env();
    assert!(forced.contains(&("LC_ALL".to_string(), "C".to_string())));
    assert!(forced.iter().any(|(k, _)| k == "LVM_COMMAND_PROFILE"));
}

#[test]
#[serial]
fn state_dir_prefers_the_explicit_override() {
    std::env::set_var("LVMDBUSD_STATE_DIR", "/tmp/lvmdbusd-test-state");
    std::env::remove_var("XDG_STATE_HOME");
    let dir = state_dir().expect("state dir");
    assert_eq!(dir, std::path::PathBuf::from("/tmp/lvmdbusd-test-state"));
    std::env::remove_var("LVMDBUSD_STATE_DIR");
}

#[test]
#[serial]
fn socket_and_lock_paths_live_under_the_state_dir() {
    std::env::set_var("LVMDBUSD_STATE_DIR", "/tmp/lvmdbusd-test-state2");
    assert_eq!(socket_path().expect("socket path"), std::path::PathBuf::from("/tmp/lvmdbusd-test-state2/lvmdbusd.sock"));
    assert_eq!(lock_path().expect("lock path"), std::path::PathBuf::from("/tmp/lvmdbusd-test-state2/lvmdbusd.lock"));
    std::env::remove_var("LVMDBUSD_STATE_DIR");
}
