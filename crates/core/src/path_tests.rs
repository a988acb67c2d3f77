// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn bracketed_form_wraps_the_leaf() {
    assert_eq!(bracketed_form("vg/lv"), "vg/[lv]");
}

#[test]
fn bracketed_form_is_idempotent_on_already_hidden_names() {
    assert_eq!(bracketed_form("vg/[lv]"), "vg/[lv]");
}

#[test]
fn bracketed_form_leaves_unscoped_ids_alone() {
    assert_eq!(bracketed_form("/dev/loop0"), "/dev/loop0");
}

#[test]
fn unbracketed_form_strips_the_brackets() {
    assert_eq!(unbracketed_form("vg/[lv]"), "vg/lv");
}

#[test]
fn lookup_candidates_try_literal_then_bracketed() {
    let [literal, hidden] = lookup_candidates("vg/lv");
    assert_eq!(literal, "vg/lv");
    assert_eq!(hidden, "vg/[lv]");
}

#[test]
fn is_hidden_display_name_detects_brackets() {
    assert!(is_hidden_display_name("[lv]"));
    assert!(!is_hidden_display_name("lv"));
    assert!(!is_hidden_display_name("["));
}

#[test]
fn object_path_none_is_the_wire_sentinel() {
    assert_eq!(ObjectPath::none().as_str(), "/");
    assert!(ObjectPath::none().is_none());
    assert!(!ObjectPath::new("/org/lvmd/Pv0").is_none());
}
