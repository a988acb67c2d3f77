// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lvmd-core: entity types, identifiers, error taxonomy, and the request
//! protocol shapes shared by every other crate in this workspace.

pub mod activation;
pub mod clock;
pub mod error;
pub mod execution;
pub mod id;
pub mod job;
pub mod lv;
pub mod macros;
pub mod path;
pub mod pv;
pub mod request;
pub mod vg;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use activation::ActivationFlags;
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{LvmError, LvmResult};
pub use execution::{ExecutionMeta, FinishedExecution, SHUTDOWN_EXIT_CODE};
pub use id::short;
pub use job::{JobId, JobResult, JobSnapshot, JobState, NOT_COMPLETE_ERROR};
pub use lv::{classify_lv, DeviceSegment, LogicalVolume, LvCapabilities, LvKind};
pub use path::{bracketed_form, is_hidden_display_name, lookup_candidates, unbracketed_form, ObjectPath, Uuid, NO_OBJECT};
pub use pv::PhysicalVolume;
pub use request::{HandlerFuture, RequestEntry, ResponseValue, Tmo};
pub use vg::VolumeGroup;
