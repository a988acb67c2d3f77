// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Carries a process exit code alongside an error message, so `main`
//! can report one without commands calling `std::process::exit` directly.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<crate::client::ClientError> for ExitError {
    fn from(err: crate::client::ClientError) -> Self {
        use crate::client::ClientError;
        match err {
            ClientError::Wire(wire_err) => Self::new(wire_err.exit_code.unwrap_or(1), wire_err.message),
            other => Self::new(1, other.to_string()),
        }
    }
}
