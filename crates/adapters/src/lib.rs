// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lvmd-adapters: the external-tool Executor (fork-exec and persistent-shell
//! modes), the bounded flight recorder, and the block-device change-event
//! source (C1 and C9).

pub mod device_events;
pub mod executor;
pub mod flight_recorder;
pub mod forkexec;
pub mod shell;

pub use device_events::{translate_dm_path, DeviceEvent, DeviceEventSource, FakeDeviceEventSource, UdevMonitorSource};
pub use executor::{ExecOutput, ExecMode, Executor, ExecutorError};
pub use flight_recorder::FlightRecorder;
