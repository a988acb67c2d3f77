// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lvmd_core::ObjectPath;
use lvmd_wire::{read_request, write_response, ErrorKind};
use serde_json::json;
use std::time::Duration;

/// Accepts exactly one connection, reads one request, writes `response`.
async fn serve_once(socket_path: std::path::PathBuf, response: WireResponse) {
    let listener = tokio::net::UnixListener::bind(&socket_path).expect("bind");
    let (mut stream, _addr) = listener.accept().await.expect("accept");
    let (mut reader, mut writer) = stream.split();
    let _request = read_request(&mut reader, Duration::from_secs(5)).await.expect("read request");
    write_response(&mut writer, &response, Duration::from_secs(5)).await.expect("write response");
}

#[tokio::test(flavor = "multi_thread")]
async fn manager_call_round_trips_the_ok_payload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let socket_path = dir.path().join("lvmdbusd.sock");

    let server = tokio::spawn(serve_once(socket_path.clone(), WireResponse::ok(json!("1.2.3"))));
    let client = DaemonClient::new(socket_path, Duration::from_secs(5));
    let value = client.manager("Version", json!({})).await.expect("call");

    assert_eq!(value, json!("1.2.3"));
    server.await.expect("server task");
}

#[tokio::test(flavor = "multi_thread")]
async fn addressed_call_carries_the_interface_and_path_through() {
    let dir = tempfile::tempdir().expect("tempdir");
    let socket_path = dir.path().join("lvmdbusd.sock");

    let server = tokio::spawn(serve_once(socket_path.clone(), WireResponse::ok(json!({"Name": "/dev/loop0"}))));
    let client = DaemonClient::new(socket_path, Duration::from_secs(5));
    let value = client.addressed(Interface::Pv, ObjectPath::new("/org/lvmd/Pv0"), "GetProperties", json!({})).await.expect("call");

    assert_eq!(value["Name"], json!("/dev/loop0"));
    server.await.expect("server task");
}

#[tokio::test(flavor = "multi_thread")]
async fn a_wire_error_response_surfaces_as_clienterror_wire() {
    let dir = tempfile::tempdir().expect("tempdir");
    let socket_path = dir.path().join("lvmdbusd.sock");

    let error = WireError { kind: ErrorKind::Client, message: "missing argument: device".to_string(), exit_code: None };
    let server = tokio::spawn(serve_once(socket_path.clone(), WireResponse::Error { error }));
    let client = DaemonClient::new(socket_path, Duration::from_secs(5));
    let err = client.manager("PvCreate", json!({})).await.unwrap_err();

    match err {
        ClientError::Wire(wire_err) => assert_eq!(wire_err.kind, ErrorKind::Client),
        other => panic!("expected ClientError::Wire, got {other:?}"),
    }
    server.await.expect("server task");
}

#[tokio::test(flavor = "multi_thread")]
async fn connecting_to_a_socket_nobody_is_listening_on_fails_fast() {
    let dir = tempfile::tempdir().expect("tempdir");
    let socket_path = dir.path().join("no-such-daemon.sock");

    let client = DaemonClient::new(socket_path, Duration::from_secs(5));
    let err = client.manager("Version", json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::Connect { .. }));
}
