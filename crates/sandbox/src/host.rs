// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runs commands directly on the host.

use crate::{CommandLine, ExecOptions, ExecOutput, Sandbox, SandboxError};
use std::process::{Command, Stdio};

/// A sandbox that runs commands as child processes of the pipeline.
///
/// Used when the toolkit is installed natively, and as the transport
/// for the `docker` CLI in [`DockerSandbox`](crate::DockerSandbox).
#[derive(Debug)]
pub struct HostSandbox {
    stopped: bool,
}

impl HostSandbox {
    pub fn new() -> Self {
        Self { stopped: false }
    }
}

impl Default for HostSandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox for HostSandbox {
    fn id(&self) -> &str {
        "host"
    }

    fn execute(
        &mut self,
        cmd: &CommandLine,
        opts: &ExecOptions,
    ) -> Result<ExecOutput, SandboxError> {
        if self.stopped {
            return Err(SandboxError::Stopped(self.id().to_string()));
        }
        run_process(cmd, opts)
    }

    fn stop(&mut self) -> Result<(), SandboxError> {
        self.stopped = true;
        Ok(())
    }
}

/// Spawns `cmd`, waits for it, and returns stdout followed by stderr.
///
/// The two streams are captured separately, so lines keep their order
/// within a stream but not across them: everything written to stderr
/// comes after all of stdout. Record lines must be printed to a single
/// stream to stay in order.
pub(crate) fn run_process(cmd: &CommandLine, opts: &ExecOptions) -> Result<ExecOutput, SandboxError> {
    let mut command = Command::new(cmd.program());
    command
        .args(cmd.get_args())
        .stdin(Stdio::null())
        .envs(opts.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if let Some(dir) = opts.workdir() {
        command.current_dir(dir);
    }

    let out = command.output().map_err(|e| SandboxError::Spawn {
        program: cmd.program().to_string(),
        source: e,
    })?;

    let mut output = out.stdout;
    output.extend_from_slice(&out.stderr);
    Ok(ExecOutput {
        exit_code: out.status.code().unwrap_or(-1),
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_command() {
        let mut sb = HostSandbox::new();
        let out = sb
            .execute(&CommandLine::new("echo").arg("[BENCHMARK] a 1"), &ExecOptions::default())
            .unwrap();
        assert!(out.success());
        assert_eq!(out.text().trim(), "[BENCHMARK] a 1");
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let mut sb = HostSandbox::new();
        let out = sb
            .run(
                &CommandLine::new("sh").arg("-c").arg("echo partial; exit 3"),
                &ExecOptions::default(),
            )
            .unwrap();
        assert_eq!(out.exit_code, 3);
        assert!(out.text().contains("partial"));
    }

    #[test]
    fn test_stderr_follows_stdout() {
        let mut sb = HostSandbox::new();
        let script = "echo '[BENCHMARK] run 1'; echo warn >&2; echo '[BENCHMARK] run 2'";
        let out = sb
            .execute(&CommandLine::new("sh").arg("-c").arg(script), &ExecOptions::default())
            .unwrap();
        let text = out.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["[BENCHMARK] run 1", "[BENCHMARK] run 2", "warn"]);
    }

    #[test]
    fn test_workdir_and_env() {
        let dir = std::env::temp_dir();
        let mut sb = HostSandbox::new();
        let out = sb
            .execute(
                &CommandLine::new("sh").arg("-c").arg("pwd; echo $BENCH_VAR"),
                &ExecOptions::in_dir(&dir).env("BENCH_VAR", "42"),
            )
            .unwrap();
        assert!(out.text().contains("42"));
    }

    #[test]
    fn test_missing_program() {
        let mut sb = HostSandbox::new();
        let err = sb
            .execute(&CommandLine::new("definitely-not-a-binary-xyz"), &ExecOptions::default())
            .unwrap_err();
        assert!(matches!(err, SandboxError::Spawn { .. }));
    }

    #[test]
    fn test_stopped_rejects() {
        let mut sb = HostSandbox::new();
        sb.stop().unwrap();
        let err = sb
            .execute(&CommandLine::new("true"), &ExecOptions::default())
            .unwrap_err();
        assert!(matches!(err, SandboxError::Stopped(_)));
    }
}
