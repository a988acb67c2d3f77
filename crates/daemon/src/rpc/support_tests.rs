// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn tmo_arg_defaults_to_blocking() {
    assert_eq!(tmo_arg(&json!({})), Tmo::Blocking);
    assert_eq!(tmo_arg(&json!({"tmo": 0})), Tmo::Immediate);
    assert_eq!(tmo_arg(&json!({"tmo": 250})), Tmo::Budget(std::time::Duration::from_millis(250)));
}

#[test]
fn str_arg_rejects_missing_and_non_string_values() {
    assert_eq!(str_arg(&json!({"name": "vg0"}), "name").unwrap(), "vg0");
    assert!(str_arg(&json!({}), "name").is_err());
    assert!(str_arg(&json!({"name": 1}), "name").is_err());
}

#[test]
fn bool_arg_falls_back_to_the_given_default() {
    assert!(bool_arg(&json!({}), "activate", true));
    assert!(!bool_arg(&json!({"activate": false}), "activate", true));
}

#[test]
fn str_vec_arg_skips_non_string_entries_rather_than_erroring() {
    let tags = str_vec_arg(&json!({"tags": ["a", 1, "b"]}), "tags");
    assert_eq!(tags, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn str_vec_arg_defaults_to_empty_when_absent() {
    assert!(str_vec_arg(&json!({}), "pvs").is_empty());
}

#[test]
fn tags_argv_interleaves_the_flag_before_each_tag() {
    let argv = tags_argv("--addtag", &["fast".to_string(), "ssd".to_string()]);
    assert_eq!(argv, vec!["--addtag".to_string(), "fast".to_string(), "--addtag".to_string(), "ssd".to_string()]);
}

#[test]
fn object_path_arg_wraps_the_string_argument_verbatim() {
    let path = object_path_arg(&json!({"path": "/org/lvmd/Pv0"}), "path").unwrap();
    assert_eq!(path.as_str(), "/org/lvmd/Pv0");
}
