// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Outcome of a single external command.

use std::fmt;

use sandbox::ExecOutput;

/// Whether an external command exited cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Succeeded,
    Failed { exit_code: i32 },
}

impl CommandOutcome {
    pub fn of(output: &ExecOutput) -> Self {
        if output.success() {
            Self::Succeeded
        } else {
            Self::Failed {
                exit_code: output.exit_code,
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "ok"),
            Self::Failed { exit_code } => write!(f, "exit {exit_code}"),
        }
    }
}
