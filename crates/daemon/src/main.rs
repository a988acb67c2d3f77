// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `lvmdbusd`: process entry point. Parses the operator-facing flags
//! (§6), brings the daemon up, and runs until a shutdown signal arrives.

use clap::Parser;
use lvmd_daemon::lifecycle;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Daemon for mediating RPC clients and the external volume-management tool.
#[derive(Parser, Debug)]
#[command(name = "lvmdbusd")]
struct Args {
    /// Subscribe to udev device events and trigger refreshes on change.
    #[arg(long)]
    udev: bool,

    /// Verbose logging (`debug` level instead of `info`).
    #[arg(long)]
    debug: bool,

    /// Accepted for command-line compatibility; reports are always
    /// requested in JSON form, there is no non-JSON fallback to disable.
    #[arg(long)]
    nojson: bool,

    /// Run the external tool as a persistent shell instead of fork/exec
    /// per invocation.
    #[arg(long)]
    lvmshell: bool,

    /// Flight recorder ring size, in retained command records.
    #[arg(long, default_value_t = 256)]
    frsize: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.debug { EnvFilter::new("debug") } else { EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")) };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(args))
}

async fn run(args: Args) -> ExitCode {
    let config = match lifecycle::Config::load(args.lvmshell, args.frsize) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to resolve daemon configuration");
            return ExitCode::FAILURE;
        }
    };

    let startup = match lifecycle::startup(&config).await {
        Ok(startup) => startup,
        Err(e) => {
            if e.is_lock_conflict() {
                tracing::error!("another lvmdbusd instance is already running");
                return ExitCode::from(114);
            }
            tracing::error!(error = %e, "daemon startup failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(udev = args.udev, socket = %config.socket_path.display(), "lvmdbusd started");

    if args.udev {
        tracing::debug!("udev device watching enabled");
    }

    let shutdown = startup.context.shutdown.clone();
    let listener_task = tokio::spawn(lvmd_daemon::listener::run(startup.listener, startup.context.clone(), shutdown.clone()));

    wait_for_shutdown_signal(&shutdown).await;
    tracing::info!("shutdown signal received, draining connections");

    let _ = listener_task.await;
    ExitCode::SUCCESS
}

#[cfg(unix)]
async fn wait_for_shutdown_signal(shutdown: &tokio_util::sync::CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGTERM handler, watching SIGINT only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
    shutdown.cancel();
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal(shutdown: &tokio_util::sync::CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    shutdown.cancel();
}
