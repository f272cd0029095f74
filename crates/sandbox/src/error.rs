// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for sandbox execution.

/// Errors raised by the sandbox itself.
///
/// A command that runs and exits non-zero is *not* an error: its exit
/// status is reported in [`ExecOutput`](crate::ExecOutput). These variants
/// cover failing to run the command at all.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The process could not be spawned (missing binary, permissions).
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A container management command failed.
    #[error("docker {action} failed (exit {exit_code}): {detail}")]
    Docker {
        action: &'static str,
        exit_code: i32,
        detail: String,
    },

    /// The sandbox was already stopped.
    #[error("sandbox '{0}' is stopped")]
    Stopped(String),
}
