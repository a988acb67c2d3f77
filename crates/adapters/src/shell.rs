// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent-shell execution mode: one long-lived child, commands written
//! to stdin, responses framed by a prompt pattern that embeds the exit
//! code (§4.1: `[<ec>] lvm> `).

use crate::forkexec::write_line;
use lvmd_core::{LvmError, LvmResult};
use regex::Regex;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};

fn prompt_regex() -> &'static Regex {
    static PROMPT: OnceLock<Regex> = OnceLock::new();
    PROMPT.get_or_init(|| Regex::new(r"^\[(-?\d+)\] lvm> $").expect("static prompt regex"))
}

/// How long to wait for the prompt to reappear before declaring the shell
/// desynchronized (§7: "shell prompt desynchronized" is a `ToolBug`).
pub const PROMPT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub struct ShellSession {
    child: Child,
    stdin: ChildStdin,
    stdout: tokio::io::Lines<BufReader<ChildStdout>>,
}

impl ShellSession {
    pub async fn spawn(tool_path: &str, env: &[(String, String)]) -> LvmResult<Self> {
        let mut command = tokio::process::Command::new(tool_path);
        command.arg("lvm").stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::null());
        for (key, value) in env {
            command.env(key, value);
        }
        let mut child = command.spawn().map_err(|e| LvmError::tool_bug(format!("shell spawn failed: {e}")))?;
        let stdin = child.stdin.take().expect("piped stdin");
        let stdout = BufReader::new(child.stdout.take().expect("piped stdout")).lines();
        Ok(Self { child, stdin, stdout })
    }

    /// Send one command and read back its report text, framed by the
    /// prompt regex which carries the embedded exit code.
    pub async fn call(&mut self, argv: &[String]) -> LvmResult<(i32, String)> {
        write_line(&mut self.stdin, &argv.join(" ")).await?;

        let mut report = String::new();
        let deadline = tokio::time::Instant::now() + PROMPT_TIMEOUT;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let line = tokio::time::timeout(remaining, self.stdout.next_line())
                .await
                .map_err(|_| LvmError::tool_bug("shell prompt desynchronized: timed out waiting for prompt"))?
                .map_err(|e| LvmError::transient(e.to_string()))?;
            let Some(line) = line else {
                return Err(LvmError::tool_bug("shell prompt desynchronized: stdout closed"));
            };
            if let Some(captures) = prompt_regex().captures(&line) {
                let exit_code: i32 = captures[1]
                    .parse()
                    .map_err(|_| LvmError::tool_bug("shell prompt carried a non-numeric exit code"))?;
                return Ok((exit_code, report));
            }
            report.push_str(&line);
            report.push('\n');
        }
    }

    pub async fn shutdown(mut self) {
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
    }
}
