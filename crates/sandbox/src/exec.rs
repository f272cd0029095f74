// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`Sandbox`] trait and its execution types.

use crate::{CommandLine, SandboxError};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Per-invocation execution options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Working directory inside the sandbox.
    pub workdir: Option<PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl ExecOptions {
    pub fn in_dir(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(workdir.into()),
            env: Vec::new(),
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }
}

/// Exit status and combined stdout/stderr of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Process exit code; `-1` when the process was killed by a signal.
    pub exit_code: i32,
    pub output: Vec<u8>,
}

impl ExecOutput {
    pub fn new(exit_code: i32, output: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Output decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }
}

/// An isolated environment that runs commands to completion.
///
/// Every call blocks until the process exits; there is no timeout.
/// The pipeline depends only on this trait, never on how the sandbox is
/// realised.
pub trait Sandbox {
    /// Short identifier used in logs (container id, `"host"`).
    fn id(&self) -> &str;

    /// Runs `cmd` and returns its exit status and output.
    ///
    /// Returns `Err` only if the command could not be run at all.
    fn execute(&mut self, cmd: &CommandLine, opts: &ExecOptions)
        -> Result<ExecOutput, SandboxError>;

    /// Releases the sandbox. Further `execute` calls fail.
    fn stop(&mut self) -> Result<(), SandboxError>;

    /// [`execute`](Sandbox::execute) with the command and its result logged.
    fn run(&mut self, cmd: &CommandLine, opts: &ExecOptions) -> Result<ExecOutput, SandboxError> {
        tracing::info!(
            target: "sandbox::exec",
            "[{}] start cmd={} workdir={:?}",
            self.id(),
            cmd,
            opts.workdir(),
        );
        let out = self.execute(cmd, opts)?;
        if out.success() {
            tracing::info!(target: "sandbox::exec", "[{}] exit_code=0", self.id());
            tracing::debug!(target: "sandbox::exec", "output:\n{}", out.text());
        } else {
            tracing::warn!(
                target: "sandbox::exec",
                "[{}] exit_code={} output:\n{}",
                self.id(),
                out.exit_code,
                out.text(),
            );
        }
        Ok(out)
    }
}

impl<S: Sandbox + ?Sized> Sandbox for Box<S> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn execute(
        &mut self,
        cmd: &CommandLine,
        opts: &ExecOptions,
    ) -> Result<ExecOutput, SandboxError> {
        (**self).execute(cmd, opts)
    }

    fn stop(&mut self) -> Result<(), SandboxError> {
        (**self).stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_output_text() {
        let out = ExecOutput::new(0, b"hello\n".to_vec());
        assert!(out.success());
        assert_eq!(out.text(), "hello\n");

        let bad = ExecOutput::new(2, vec![0xff, b'a']);
        assert!(!bad.success());
        assert!(bad.text().ends_with('a'));
    }

    #[test]
    fn test_exec_options() {
        let opts = ExecOptions::in_dir("/app/env/llama").env("CUDA_VISIBLE_DEVICES", "0");
        assert_eq!(opts.workdir(), Some(Path::new("/app/env/llama")));
        assert_eq!(opts.env.len(), 1);
        assert_eq!(ExecOptions::default().workdir(), None);
    }
}
