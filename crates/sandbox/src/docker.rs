// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A sandbox backed by a long-lived Docker container.
//!
//! The container is started once with a shell entrypoint and kept alive
//! with a TTY; every command is a `docker exec` into it. Container
//! management goes through the `docker` CLI.

use crate::host::run_process;
use crate::{CommandLine, ExecOptions, ExecOutput, Sandbox, SandboxError};
use std::path::PathBuf;

/// How to start the benchmark container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerSpec {
    pub image: String,
    pub name: String,
    /// Container runtime (`nvidia` for GPU access).
    pub runtime: Option<String>,
    /// Read-write bind mounts as `(host, container)` pairs.
    pub volumes: Vec<(PathBuf, PathBuf)>,
    pub entrypoint: String,
    /// Path or name of the docker CLI.
    pub docker_bin: String,
}

impl DockerSpec {
    /// A GPU container with `base_dir` mounted at the same path inside.
    pub fn gpu(image: impl Into<String>, name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            image: image.into(),
            name: name.into(),
            runtime: Some("nvidia".to_string()),
            volumes: vec![(base_dir.clone(), base_dir)],
            entrypoint: "/bin/bash".to_string(),
            docker_bin: "docker".to_string(),
        }
    }

    /// The `docker run` invocation that starts the container detached.
    pub fn run_command(&self) -> CommandLine {
        let mut cmd = CommandLine::new(&self.docker_bin)
            .args(["run", "--detach", "--tty", "--rm"])
            .flag("name", &self.name);
        if let Some(runtime) = &self.runtime {
            cmd = cmd.flag("runtime", runtime);
        }
        for (host, container) in &self.volumes {
            cmd = cmd.flag(
                "volume",
                format!("{}:{}:rw", host.display(), container.display()),
            );
        }
        cmd.flag("entrypoint", &self.entrypoint).arg(&self.image)
    }
}

/// A running container that commands are executed in.
#[derive(Debug)]
pub struct DockerSandbox {
    docker_bin: String,
    container_id: String,
    stopped: bool,
}

impl DockerSandbox {
    /// Starts the container and returns a handle to it.
    pub fn start(spec: &DockerSpec) -> Result<Self, SandboxError> {
        let cmd = spec.run_command();
        tracing::info!("starting container: {cmd}");
        let out = run_process(&cmd, &ExecOptions::default())?;
        if !out.success() {
            return Err(SandboxError::Docker {
                action: "run",
                exit_code: out.exit_code,
                detail: out.text().trim().to_string(),
            });
        }

        let container_id = out
            .text()
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string();
        if container_id.is_empty() {
            return Err(SandboxError::Docker {
                action: "run",
                exit_code: out.exit_code,
                detail: "docker printed no container id".to_string(),
            });
        }

        tracing::info!("docker container id: {container_id}");
        Ok(Self {
            docker_bin: spec.docker_bin.clone(),
            container_id,
            stopped: false,
        })
    }

    /// Attaches to an already running container.
    pub fn attach(docker_bin: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            docker_bin: docker_bin.into(),
            container_id: container_id.into(),
            stopped: false,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// The `docker exec` invocation that runs `cmd` in the container.
    pub fn exec_command(&self, cmd: &CommandLine, opts: &ExecOptions) -> CommandLine {
        let mut exec = CommandLine::new(&self.docker_bin).arg("exec");
        if let Some(dir) = opts.workdir() {
            exec = exec.flag("workdir", dir.display());
        }
        for (key, value) in &opts.env {
            exec = exec.flag("env", format!("{key}={value}"));
        }
        cmd.clone().wrapped_in(&exec.arg(&self.container_id).argv())
    }
}

impl Sandbox for DockerSandbox {
    fn id(&self) -> &str {
        &self.container_id
    }

    fn execute(
        &mut self,
        cmd: &CommandLine,
        opts: &ExecOptions,
    ) -> Result<ExecOutput, SandboxError> {
        if self.stopped {
            return Err(SandboxError::Stopped(self.container_id.clone()));
        }
        run_process(&self.exec_command(cmd, opts), &ExecOptions::default())
    }

    fn stop(&mut self) -> Result<(), SandboxError> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        let cmd = CommandLine::new(&self.docker_bin)
            .arg("stop")
            .arg(&self.container_id);
        let out = run_process(&cmd, &ExecOptions::default())?;
        if !out.success() {
            return Err(SandboxError::Docker {
                action: "stop",
                exit_code: out.exit_code,
                detail: out.text().trim().to_string(),
            });
        }
        tracing::info!("stopped container {}", self.container_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let spec = DockerSpec::gpu("trtllm:latest", "llm-benchmark", "/data/bench");
        let cmd = spec.run_command();
        assert_eq!(cmd.program(), "docker");
        assert_eq!(cmd.flag_value("name"), Some("llm-benchmark"));
        assert_eq!(cmd.flag_value("runtime"), Some("nvidia"));
        assert_eq!(cmd.flag_value("volume"), Some("/data/bench:/data/bench:rw"));
        assert_eq!(cmd.flag_value("entrypoint"), Some("/bin/bash"));
        assert_eq!(cmd.get_args().last().map(String::as_str), Some("trtllm:latest"));
        assert!(cmd.has_arg("--detach"));
    }

    #[test]
    fn test_exec_command() {
        let sb = DockerSandbox::attach("docker", "abc123");
        let inner = CommandLine::new("python3").arg("-c").arg("import torch");
        let exec = sb.exec_command(&inner, &ExecOptions::in_dir("/app/env/llama").env("A", "1"));
        assert_eq!(
            exec.argv(),
            vec![
                "docker", "exec", "--workdir", "/app/env/llama", "--env", "A=1", "abc123",
                "python3", "-c", "import torch",
            ]
        );
    }

    #[test]
    fn test_start_failure_reports_docker_error() {
        let spec = DockerSpec {
            docker_bin: "false".to_string(),
            ..DockerSpec::gpu("img", "name", "/tmp")
        };
        let err = DockerSandbox::start(&spec).unwrap_err();
        assert!(matches!(err, SandboxError::Docker { action: "run", .. }));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut sb = DockerSandbox::attach("true", "abc123");
        sb.stop().unwrap();
        sb.stop().unwrap();
        assert!(matches!(
            sb.execute(&CommandLine::new("ls"), &ExecOptions::default()),
            Err(SandboxError::Stopped(_))
        ));
    }
}
