// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The RPC dispatch table: one `dispatch` function per wire `Interface`
//! (§6), fanning out from the connection handler in `listener.rs`.

mod job;
mod lv;
mod manager;
mod pv;
mod support;
mod vg;

use crate::context::DaemonContext;
use lvmd_core::{LvmError, LvmResult, ResponseValue};
use lvmd_wire::{Interface, WireRequest};

pub async fn dispatch(request: WireRequest, ctx: &DaemonContext) -> LvmResult<ResponseValue> {
    match request.interface {
        Interface::Manager => manager::dispatch(&request.method, &request.args, ctx).await,
        Interface::Pv => pv::dispatch(&path_of(&request)?, &request.method, &request.args, ctx).await,
        Interface::Vg => vg::dispatch(&path_of(&request)?, &request.method, &request.args, ctx).await,
        Interface::Lv => lv::dispatch(&path_of(&request)?, &request.method, &request.args, ctx).await,
        Interface::Job => job::dispatch(&path_of(&request)?, &request.method, &request.args, ctx).await,
    }
}

fn path_of(request: &WireRequest) -> LvmResult<lvmd_core::ObjectPath> {
    request.path.clone().ok_or_else(|| LvmError::client(format!("{:?} calls require a path", request.interface)))
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
