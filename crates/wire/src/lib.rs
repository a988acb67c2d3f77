// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lvmd-wire: the local transport's on-wire shapes and framing (§6A).
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload. A
//! request addresses one of `Manager`/`Pv`/`Vg`/`Lv`/`Job` and names a
//! method; a response is either `{"ok": <json>}` or `{"error": {...}}`.

mod request;
mod response;
mod wire;

pub use request::{Interface, WireRequest};
pub use response::{ErrorKind, WireError, WireResponse};
pub use wire::{decode, encode, read_message, read_request, write_message, write_response, ProtocolError};
