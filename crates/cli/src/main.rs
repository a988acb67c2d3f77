// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `lvmdbus-cli`: a thin client driving the local transport (§6A) from
//! the command line. Output is the raw `ok` JSON payload; this binary
//! does no domain validation of its own (that's the daemon's job, and
//! argument validation is explicitly out of scope, §2 Non-goals).

mod client;
mod exit_error;

use clap::{Parser, Subcommand};
use client::DaemonClient;
use exit_error::ExitError;
use lvmd_core::ObjectPath;
use lvmd_wire::Interface;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "lvmdbus-cli")]
struct Args {
    /// Socket path; defaults to the same resolution the daemon uses
    /// (`LVMDBUSD_STATE_DIR`/`XDG_STATE_HOME`/`~/.local/state/lvmdbusd`).
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Seconds to wait for the daemon's reply.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the daemon's version (`Manager.Version`).
    Version,
    /// Force an immediate cache refresh (`Manager.Refresh`).
    Refresh,
    /// Resolve an lvm name or uuid to its object path (`Manager.LookUpByLvmId`).
    Lookup { lvm_id: String },
    /// Create a physical volume (`Manager.PvCreate`).
    PvCreate { device: String, #[arg(long, default_value_t = -1)] tmo: i64 },
    /// Create a volume group (`Manager.VgCreate`).
    VgCreate { name: String, pvs: Vec<String>, #[arg(long, default_value_t = -1)] tmo: i64 },
    /// Scan for physical volumes (`Manager.PvScan`).
    PvScan {
        #[arg(long)]
        activate: bool,
        #[arg(long)]
        cache: bool,
        devices: Vec<String>,
        #[arg(long, default_value_t = -1)]
        tmo: i64,
    },
    /// Read every property of an object in one call (`GetProperties`).
    GetProperties { interface: InterfaceArg, path: String },
    /// Block until a job completes, or until `--timeout-ms` elapses.
    JobWait { path: String, #[arg(long)] timeout_ms: Option<u64> },
    /// Remove a completed job's record from the registry.
    JobRemove { path: String },
    /// Send an arbitrary request; escape hatch for calls this CLI has no
    /// dedicated subcommand for yet.
    Call { interface: InterfaceArg, method: String, path: Option<String>, #[arg(long, default_value = "{}")] args: String },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum InterfaceArg {
    Manager,
    Pv,
    Vg,
    Lv,
    Job,
}

impl From<InterfaceArg> for Interface {
    fn from(value: InterfaceArg) -> Self {
        match value {
            InterfaceArg::Manager => Interface::Manager,
            InterfaceArg::Pv => Interface::Pv,
            InterfaceArg::Vg => Interface::Vg,
            InterfaceArg::Lv => Interface::Lv,
            InterfaceArg::Job => Interface::Job,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.code.clamp(1, 255) as u8)
        }
    }
}

async fn run(args: Args) -> Result<(), ExitError> {
    let socket_path = match args.socket {
        Some(path) => path,
        None => lvmd_daemon::env::socket_path().map_err(|e| ExitError::new(1, e.to_string()))?,
    };
    let client = DaemonClient::new(socket_path, Duration::from_secs(args.timeout_secs));

    let value = match args.command {
        Command::Version => client.manager("Version", json!({})).await?,
        Command::Refresh => client.manager("Refresh", json!({})).await?,
        Command::Lookup { lvm_id } => client.manager("LookUpByLvmId", json!({ "lvm_id": lvm_id })).await?,
        Command::PvCreate { device, tmo } => client.manager("PvCreate", json!({ "device": device, "tmo": tmo })).await?,
        Command::VgCreate { name, pvs, tmo } => client.manager("VgCreate", json!({ "name": name, "pvs": pvs, "tmo": tmo })).await?,
        Command::PvScan { activate, cache, devices, tmo } => {
            client.manager("PvScan", json!({ "activate": activate, "cache": cache, "devices": devices, "tmo": tmo })).await?
        }
        Command::GetProperties { interface, path } => {
            client.addressed(interface.into(), ObjectPath::from(path.as_str()), "GetProperties", json!({})).await?
        }
        Command::JobWait { path, timeout_ms } => {
            client.addressed(Interface::Job, ObjectPath::from(path.as_str()), "Wait", json!({ "timeout_ms": timeout_ms })).await?
        }
        Command::JobRemove { path } => client.addressed(Interface::Job, ObjectPath::from(path.as_str()), "Remove", json!({})).await?,
        Command::Call { interface, method, path, args } => {
            let args: serde_json::Value = serde_json::from_str(&args).map_err(|e| ExitError::new(1, format!("invalid --args JSON: {e}")))?;
            match path {
                Some(path) => client.addressed(interface.into(), ObjectPath::from(path.as_str()), &method, args).await?,
                None => client.manager(&method, args).await?,
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()));
    Ok(())
}
