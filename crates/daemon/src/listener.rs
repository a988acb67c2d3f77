// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accept loop for the local transport (§6A). One connection carries
//! exactly one request/response pair; the handler races against client
//! disconnect so a dropped client never pins a task indefinitely.

use crate::context::DaemonContext;
use crate::env;
use lvmd_wire::{read_request, write_response, ProtocolError, WireResponse};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub async fn run(listener: UnixListener, ctx: Arc<DaemonContext>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("listener shutting down");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let ctx = ctx.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, &ctx).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "failed to accept a connection"),
                }
            }
        }
    }
}

async fn handle_connection(mut stream: tokio::net::UnixStream, ctx: &DaemonContext) {
    let timeout = env::ipc_timeout();
    let (mut reader, mut writer) = stream.split();

    let request = match read_request(&mut reader, timeout).await {
        Ok(request) => request,
        Err(ProtocolError::ConnectionClosed) => return,
        Err(e) => {
            debug!(error = %e, "failed to read request");
            return;
        }
    };

    debug!(interface = ?request.interface, method = %request.method, "dispatching request");

    // Race the handler against the client disconnecting early (e.g. a CLI
    // invocation that gave up after its own timeout); a dead peer is not
    // worth waiting on a write that will never be read.
    let result = tokio::select! {
        result = crate::rpc::dispatch(request, ctx) => result,
        _ = detect_client_disconnect(&mut reader) => {
            debug!("client disconnected before the response was ready");
            return;
        }
    };

    let response = WireResponse::from_result(&result);
    if let Err(e) = write_response(&mut writer, &response, timeout).await {
        debug!(error = %e, "failed to write response");
    }
}

/// Resolves once the peer closes its write half, since the protocol never
/// sends a second message on a connection that already sent its request.
async fn detect_client_disconnect<R: AsyncReadExt + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
