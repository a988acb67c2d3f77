// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: lock file, socket bind, context wiring (§9: "Persisted
//! state: none, other than a process-wide exclusive-lock file").

use crate::context::DaemonContext;
use crate::env;
use fs2::FileExt;
use lvmd_adapters::{Executor, UdevMonitorSource};
use lvmd_core::SystemClock;
use lvmd_datastore::DataStore;
use lvmd_engine::{Coordinator, ObjectManager, Reaper, Worker};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine a state directory")]
    NoStateDir(#[from] env::StateDirError),

    #[error("failed to acquire lock: another instance is already running")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LifecycleError {
    /// Whether this failure is the one case `main` reports with the
    /// dedicated exit code 114 rather than a generic failure (§6).
    pub fn is_lock_conflict(&self) -> bool {
        matches!(self, Self::LockFailed(_))
    }
}

pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub flight_recorder_capacity: usize,
    pub use_shell: bool,
    pub vdo_supported: bool,
}

impl Config {
    pub fn load(lvmshell: bool, frsize: usize) -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        Ok(Self {
            socket_path: env::socket_path()?,
            lock_path: env::lock_path()?,
            flight_recorder_capacity: frsize,
            use_shell: lvmshell,
            vdo_supported: true,
            state_dir,
        })
    }
}

pub struct Startup {
    pub context: Arc<DaemonContext>,
    pub listener: UnixListener,
    /// Held for the process lifetime to keep the exclusive lock; never read.
    #[allow(dead_code)]
    lock_file: File,
}

pub async fn startup(config: &Config) -> Result<Startup, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // The lock-holder's files belong to the already-running daemon;
            // never clean those up.
            if !e.is_lock_conflict() {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<Startup, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    let lock_file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let executor = Arc::new(Executor::new(env::lvm_binary(), env::forced_env(), SystemClock, config.flight_recorder_capacity));
    if config.use_shell {
        executor.set_mode(lvmd_adapters::ExecMode::Shell).await;
    }

    let datastore = Arc::new(DataStore::new(executor.clone(), config.vdo_supported));
    let object_manager = Arc::new(ObjectManager::new());
    let jobs = Arc::new(lvmd_engine::JobRegistry::new());
    let shutdown = CancellationToken::new();

    let (coordinator, coordinator_join) =
        Coordinator::spawn(datastore.clone(), object_manager.clone(), executor.flight_recorder(), shutdown.clone());

    let engine_context = lvmd_engine::EngineContext {
        datastore: datastore.clone(),
        object_manager: object_manager.clone(),
        executor: executor.clone(),
        jobs: jobs.clone(),
        coordinator: coordinator.clone(),
    };
    let (worker, worker_join) = Worker::spawn(engine_context, shutdown.clone());

    let reaper = Arc::new(Reaper::new());
    let reaper_join = tokio::spawn(lvmd_engine::background_ops::run_reaper(reaper.clone(), Duration::from_secs(30), shutdown.clone()));

    let device_source: Arc<dyn lvmd_adapters::DeviceEventSource> = Arc::new(UdevMonitorSource::new());
    let device_listener_join = tokio::spawn(lvmd_engine::run_device_listener(device_source, coordinator.clone(), shutdown.clone()));

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path).map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let context = Arc::new(DaemonContext {
        datastore,
        object_manager,
        executor,
        jobs,
        coordinator,
        worker,
        reaper,
        shutdown,
        start_time: std::time::Instant::now(),
        background_tasks: parking_lot::Mutex::new(vec![coordinator_join, worker_join, reaper_join, device_listener_join]),
    });

    Ok(Startup { context, listener, lock_file })
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
