// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lvmd-engine: the daemon's stateful core (C3-C9) — the Object Manager,
//! Loader/Reconciler, State-Update Coordinator, Request Queue & Worker,
//! Job Registry, Background Operations, and the External Event Source
//! integration. Everything here is transport-agnostic: it is driven by
//! `RequestEntry`s and produces `ResponseValue`s, with no knowledge of
//! how either side of the wire is encoded.

pub mod background_ops;
pub mod coordinator;
pub mod device_listener;
pub mod job_registry;
pub mod loader;
pub mod object_manager;
pub mod worker;

pub use background_ops::{relocate_or_merge, run_reaper, Reaper};
pub use coordinator::{Coordinator, CoordinatorHandle, UpdateRequest};
pub use device_listener::{run as run_device_listener, DOMAIN_SIGNATURE};
pub use job_registry::{job_path, JobHandle, JobRegistry};
pub use loader::{Diff, ReconcileReport, Reconciler};
pub use object_manager::{EntityType, ObjectEvent, ObjectManager};
pub use worker::{EngineContext, Worker, WorkerHandle};
