// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External Event Source integration (C9): drives a
//! [`DeviceEventSource`] through the debounce counter described in §4.9,
//! collapsing bursts of matching events into a single Coordinator
//! refresh per burst without dropping the last one.

use crate::coordinator::CoordinatorHandle;
use lvmd_adapters::device_events::DeviceEventSource;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The domain signature a device's filesystem-type attribute must
/// contain for an event to be considered relevant (§4.9's filter).
pub const DOMAIN_SIGNATURE: &str = "LVM2";

/// Subscribes to `source` and forwards every relevant event into the
/// Coordinator, debounced by a guarded counter: a 0→1 transition
/// enqueues one refresh; the refresh's completion decrements the
/// counter regardless of any events that arrived while it was running,
/// so a fresh burst during a refresh still triggers exactly one more.
pub async fn run(source: Arc<dyn DeviceEventSource>, coordinator: CoordinatorHandle, shutdown: CancellationToken) {
    let mut rx = source.subscribe().await;
    let counter = Arc::new(AtomicU32::new(0));

    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            maybe = rx.recv() => match maybe {
                Some(event) => event,
                None => break,
            },
        };

        if !event.is_relevant(DOMAIN_SIGNATURE) {
            continue;
        }

        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            let counter = counter.clone();
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                loop {
                    let _ = coordinator.refresh(false).await;
                    // Events that arrived while the refresh was in flight
                    // aren't necessarily covered by it; collapse whatever
                    // backlog built up into exactly one more pass rather
                    // than dropping it.
                    if counter.fetch_sub(1, Ordering::SeqCst) == 1 {
                        break;
                    }
                    counter.store(1, Ordering::SeqCst);
                }
            });
        }
    }
}

#[cfg(test)]
#[path = "device_listener_tests.rs"]
mod tests;
