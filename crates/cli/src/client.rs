// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin client over the local transport (§6A): one connection, one
//! request, one response.

use lvmd_wire::{read_message, write_message, Interface, ProtocolError, WireError, WireRequest, WireResponse};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to the daemon at {path}: {source}")]
    Connect { path: PathBuf, #[source] source: std::io::Error },

    #[error("transport error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("the daemon returned an unexpected reply shape")]
    UnexpectedReply,

    #[error("{0:?}")]
    Wire(WireError),
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(socket_path: PathBuf, timeout: Duration) -> Self {
        Self { socket_path, timeout }
    }

    /// Sends one request and returns the decoded `ok` payload, or an error
    /// if the daemon replied with one.
    pub async fn call(&self, request: WireRequest) -> Result<serde_json::Value, ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ClientError::Connect { path: self.socket_path.clone(), source })?;

        let payload = lvmd_wire::encode(&request)?;
        write_message(&mut stream, &payload).await?;

        let bytes = tokio::time::timeout(self.timeout, read_message(&mut stream)).await.map_err(|_| ProtocolError::Timeout)??;
        let response: WireResponse = lvmd_wire::decode(&bytes)?;

        match response {
            WireResponse::Ok { ok } => Ok(ok),
            WireResponse::Error { error } => Err(ClientError::Wire(error)),
        }
    }

    pub async fn manager(&self, method: &str, args: serde_json::Value) -> Result<serde_json::Value, ClientError> {
        self.call(WireRequest::manager(method, args)).await
    }

    pub async fn addressed(
        &self,
        interface: Interface,
        path: lvmd_core::ObjectPath,
        method: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        self.call(WireRequest::addressed(interface, path, method, args)).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
