// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fork-exec execution mode: one spawned child per call, stdout read
//! line-by-line with an optional per-line callback for progress parsing,
//! raced against a shutdown signal (§4.1).

use lvmd_core::{LvmError, LvmResult, SHUTDOWN_EXIT_CODE};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Raw result of one fork-exec invocation, before structured-output
/// parsing (that step lives in `lvmd_datastore::report_parse` /
/// `executor`, which decide what "structured" means for a given command).
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Spawn `tool_path` with `argv`, optionally forcing `LC_ALL=C` and
/// `LVM_COMMAND_PROFILE` (the daemon always does; tests may opt out by
/// passing an empty `env`), and wait for completion or `shutdown`.
///
/// `on_stdout_line` is invoked for every line of stdout as it streams in,
/// used by background operations to parse progress percentages without
/// buffering the whole output.
pub async fn run(
    tool_path: &str,
    argv: &[String],
    env: &[(String, String)],
    shutdown: &CancellationToken,
    mut on_stdout_line: impl FnMut(&str) + Send,
) -> LvmResult<RawOutput> {
    let mut command = Command::new(tool_path);
    command.args(argv).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    for (key, value) in env {
        command.env(key, value);
    }

    let mut child = command.spawn().map_err(|e| LvmError::tool_bug(format!("spawn failed: {e}")))?;
    let mut stdout = BufReader::new(child.stdout.take().expect("piped stdout")).lines();
    let mut stderr = BufReader::new(child.stderr.take().expect("piped stderr")).lines();

    let mut stdout_buf = String::new();
    let mut stderr_buf = String::new();

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                let _ = child.start_kill();
                return Ok(RawOutput { exit_code: SHUTDOWN_EXIT_CODE, stdout: stdout_buf, stderr: stderr_buf });
            }
            line = stdout.next_line() => {
                match line.map_err(|e| LvmError::transient(e.to_string()))? {
                    Some(line) => {
                        on_stdout_line(&line);
                        stdout_buf.push_str(&line);
                        stdout_buf.push('\n');
                    }
                    None => break,
                }
            }
            line = stderr.next_line() => {
                if let Some(line) = line.map_err(|e| LvmError::transient(e.to_string()))? {
                    stderr_buf.push_str(&line);
                    stderr_buf.push('\n');
                }
            }
        }
    }

    // Drain any remaining stderr now that stdout is exhausted.
    while let Some(line) = stderr.next_line().await.map_err(|e| LvmError::transient(e.to_string()))? {
        stderr_buf.push_str(&line);
        stderr_buf.push('\n');
    }

    let status = child.wait().await.map_err(|e| LvmError::transient(e.to_string()))?;
    let exit_code = status.code().unwrap_or(SHUTDOWN_EXIT_CODE);
    Ok(RawOutput { exit_code, stdout: stdout_buf, stderr: stderr_buf })
}

/// Write a single command to a persistent child's stdin, used by
/// `shell::ShellSession` to send the next `argv` line.
pub async fn write_line(stdin: &mut (impl AsyncWriteExt + Unpin), line: &str) -> LvmResult<()> {
    stdin.write_all(line.as_bytes()).await.map_err(|e| LvmError::transient(e.to_string()))?;
    stdin.write_all(b"\n").await.map_err(|e| LvmError::transient(e.to_string()))
}
