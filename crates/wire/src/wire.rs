// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire framing for the local transport (§6A).
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload. One
//! connection carries exactly one request/response pair.

use crate::request::WireRequest;
use crate::response::WireResponse;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// The longest message this transport accepts, a guard against a
/// corrupted or hostile length prefix causing an unbounded allocation.
const MAX_MESSAGE_BYTES: u32 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    ConnectionClosed,

    #[error("timed out waiting for the peer")]
    Timeout,

    #[error("message of {0} bytes exceeds the {MAX_MESSAGE_BYTES} byte limit")]
    MessageTooLarge(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes `value` to JSON. Returns raw bytes with no length prefix;
/// callers that need framing use [`write_message`].
pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Writes `payload` prefixed with its 4-byte big-endian length.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError> {
    let len: u32 = payload
        .len()
        .try_into()
        .map_err(|_| ProtocolError::MessageTooLarge(u32::MAX))?;
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::MessageTooLarge(len));
    }
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one length-prefixed message. An EOF on the length prefix itself
/// (the peer closed before sending anything) is reported as
/// [`ProtocolError::ConnectionClosed`] rather than an I/O error, so
/// callers can tell a clean disconnect from a real fault.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(ProtocolError::ConnectionClosed),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::MessageTooLarge(len));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Reads one [`WireRequest`], bounding the wait so a stalled client can't
/// pin a connection handler forever.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R, timeout: Duration) -> Result<WireRequest, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &WireResponse,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let bytes = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &bytes))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    Ok(())
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
