// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: length-prefix framing and JSON encoding.

use super::*;
use crate::request::{Interface, WireRequest};
use crate::response::WireResponse;

#[test]
fn encode_returns_json_without_length_prefix() {
    let response = WireResponse::ok(serde_json::json!("/"));
    let encoded = encode(&response).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(json_str.starts_with('{'), "should be JSON object: {json_str}");
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");

    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;

    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn reading_from_an_empty_stream_reports_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn a_length_prefix_over_the_cap_is_rejected_before_allocating() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(MAX_MESSAGE_BYTES + 1).to_be_bytes());
    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge(_)));
}

#[tokio::test]
async fn read_request_roundtrips_through_write_response() {
    let request = WireRequest::addressed(Interface::Pv, lvmd_core::ObjectPath::new("/org/lvmd/Pv0"), "Remove", serde_json::json!({}));
    let bytes = encode(&request).expect("encode failed");
    let mut buffer = Vec::new();
    write_message(&mut buffer, &bytes).await.expect("write failed");

    let mut cursor = std::io::Cursor::new(buffer);
    let decoded = read_request(&mut cursor, Duration::from_secs(1)).await.expect("read_request failed");
    assert_eq!(decoded.method, "Remove");
    assert_eq!(decoded.interface, Interface::Pv);
}

#[tokio::test]
async fn read_request_times_out_on_a_silent_peer() {
    let (client, _server) = tokio::io::duplex(64);
    let mut reader = client;
    let err = read_request(&mut reader, Duration::from_millis(10)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout));
}
