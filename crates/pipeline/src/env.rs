// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-family toolkit environments.
//!
//! Each model family has its own environment directory under `env_root`.
//! A model-bound command runs there, prefixed by the environment runner and
//! the activation script:
//!
//! ```text
//! workdir: {env_root}/{family}
//! argv:    pipenv run bash_env <cmd...>
//! ```

use std::path::PathBuf;

use bench_config::{ModelFamily, PipelineSettings};
use sandbox::{CommandLine, ExecOptions, ExecOutput, Sandbox, SandboxError};

/// Runs commands inside a model family's environment.
#[derive(Debug, Clone, Copy)]
pub struct ModelEnv<'a> {
    settings: &'a PipelineSettings,
}

impl<'a> ModelEnv<'a> {
    pub fn new(settings: &'a PipelineSettings) -> Self {
        Self { settings }
    }

    pub fn workdir(&self, family: ModelFamily) -> PathBuf {
        self.settings.env_root.join(family.as_str())
    }

    /// Prefixes `cmd` with the activation script only.
    ///
    /// Used for the rank command under a process launcher, which starts
    /// outside the activated environment.
    pub fn activated(&self, cmd: CommandLine) -> CommandLine {
        cmd.wrapped_in(&self.settings.activate)
    }

    /// Prefixes `cmd` with the runner and the activation script.
    pub fn wrap(&self, cmd: CommandLine) -> CommandLine {
        self.activated(cmd).wrapped_in(&self.settings.runner)
    }

    pub fn options(&self, family: ModelFamily) -> ExecOptions {
        ExecOptions::in_dir(self.workdir(family))
    }

    /// Runs `cmd` in the environment of `family`.
    pub fn run(
        &self,
        sandbox: &mut dyn Sandbox,
        family: ModelFamily,
        cmd: CommandLine,
    ) -> Result<ExecOutput, SandboxError> {
        sandbox.run(&self.wrap(cmd), &self.options(family))
    }
}
