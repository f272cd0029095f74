// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Builders for every external command the pipeline runs.
//!
//! Commands are structured argument vectors, never shell strings. Which
//! conversion program runs is decided by [`ConvertRecipe`] from the
//! model's family and precision; engine capacity flags come from the
//! build profile table. Model-bound commands are returned bare and are
//! wrapped into their environment by [`ModelEnv`](crate::ModelEnv).

use artifacts::{ArtifactKey, ArtifactLayout};
use bench_config::{BenchConfig, ConfigError, ModelSpec, Quantization};
use sandbox::{CommandLine, ExecOptions};

use crate::env::ModelEnv;
use crate::sweep::BenchmarkRun;

/// How a model's source weights become a toolkit checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertRecipe {
    /// Quantize through the toolkit's quantization script.
    Quantize(Quantization),
    /// Convert with the family's own converter script.
    Convert { converter_dir: &'static str },
}

impl ConvertRecipe {
    pub fn select(model: &ModelSpec) -> Self {
        match model.precision.quantization() {
            Some(q) => Self::Quantize(q),
            None => Self::Convert {
                converter_dir: model.family.converter_dir(),
            },
        }
    }
}

/// Builds the commands of every stage from one configuration.
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    config: &'a BenchConfig,
    layout: &'a ArtifactLayout,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(config: &'a BenchConfig, layout: &'a ArtifactLayout) -> Self {
        Self { config, layout }
    }

    pub fn env(&self) -> ModelEnv<'a> {
        ModelEnv::new(&self.config.pipeline)
    }

    fn toolkit_script(&self, relative: &str) -> String {
        self.config
            .pipeline
            .toolkit_root
            .join(relative)
            .display()
            .to_string()
    }

    /// Checkpoint conversion for `model` at tensor-parallel size `tp_size`.
    ///
    /// `--dtype` is always the base numeric type. With `tp_size > 1` the
    /// sharding flags are added and scale with the size.
    pub fn convert_command(&self, model: &ModelSpec, tp_size: u32) -> CommandLine {
        let key = ArtifactKey::new(&model.name, tp_size, model.precision);
        let python = CommandLine::new(&self.config.pipeline.python);
        let model_dir = self.layout.model_dir(&model.name);
        let output_dir = self.layout.checkpoint_dir(&key);
        let dtype = model.precision.base_dtype();

        match ConvertRecipe::select(model) {
            ConvertRecipe::Quantize(q) => {
                let cmd = python
                    .arg(self.toolkit_script("examples/quantization/quantize.py"))
                    .flag("model_dir", model_dir.display())
                    .flag("qformat", q.qformat)
                    .flag("kv_cache_dtype", q.kv_cache_dtype)
                    .flag("output_dir", output_dir.display())
                    .flag("dtype", dtype);
                if tp_size > 1 {
                    cmd.flag("tp_size", tp_size)
                } else {
                    cmd
                }
            }
            ConvertRecipe::Convert { converter_dir } => {
                let cmd = python
                    .arg(self.toolkit_script(&format!(
                        "examples/{converter_dir}/convert_checkpoint.py"
                    )))
                    .flag("model_dir", model_dir.display())
                    .flag("output_dir", output_dir.display())
                    .flag("dtype", dtype);
                if tp_size > 1 {
                    cmd.arg("--load_by_shard")
                        .flag("workers", tp_size)
                        .flag("tp_size", tp_size)
                        .flag("pp_size", 1)
                } else {
                    cmd
                }
            }
        }
    }

    /// Engine build for `model` at `tp_size`, with the capacity flags of
    /// the model's build profile.
    pub fn build_command(&self, model: &ModelSpec, tp_size: u32) -> Result<CommandLine, ConfigError> {
        let key = ArtifactKey::new(&model.name, tp_size, model.precision);
        let (_, profile) = self.config.build_profiles.resolve(model)?;

        let mut cmd = CommandLine::new("trtllm-build")
            .flag("checkpoint_dir", self.layout.checkpoint_dir(&key).display())
            .flag("output_dir", self.layout.engine_dir(&key).display())
            .flag("workers", profile.workers_for(tp_size))
            .flag("max_batch_size", profile.max_batch_size)
            .flag("max_num_tokens", profile.max_num_tokens)
            .flag("max_input_len", profile.max_input_len)
            .flag("max_seq_len", profile.max_seq_len);
        if let Some(gemm) = &profile.gemm_plugin {
            cmd = cmd.flag("gemm_plugin", gemm);
        }
        if profile.paged_context_fmha {
            cmd = cmd.flag("use_paged_context_fmha", "enable");
        }
        Ok(cmd)
    }

    /// One benchmark invocation.
    ///
    /// With `tp_size > 1` the program runs under `mpirun` with one rank per
    /// shard; each rank re-enters the activated environment.
    pub fn benchmark_command(&self, model: &ModelSpec, run: &BenchmarkRun) -> CommandLine {
        let key = ArtifactKey::new(&model.name, run.tp_size, model.precision);

        let bench = CommandLine::new(&self.config.pipeline.python)
            .arg(self.toolkit_script("benchmarks/python/benchmark.py"))
            .flag("batch_size", run.batch_size)
            .flag("dtype", model.precision.base_dtype())
            .flag("input_output_len", run.lengths)
            .flag("warm_up", model.warmup)
            .flag("num_runs", model.num_runs)
            .flag("engine_dir", self.layout.engine_dir(&key).display())
            .arg("-m")
            .arg("dec");

        if run.tp_size > 1 {
            let ranks = run.tp_size.to_string();
            self.env().activated(bench).wrapped_in(&[
                "mpirun",
                "-n",
                ranks.as_str(),
                "--bind-to",
                "none",
                "-display-map",
                "--allow-run-as-root",
            ])
        } else {
            bench
        }
    }

    /// Clones the model's source repository into the models directory.
    ///
    /// Credentials, when configured, are injected into an HTTPS URL and
    /// the password is masked in every rendering of the command.
    pub fn clone_command(&self, model: &ModelSpec) -> (CommandLine, ExecOptions) {
        let mut cmd = CommandLine::new("git").arg("clone");
        let url = match (&self.config.credentials, model.source_url.strip_prefix("https://")) {
            (Some(creds), Some(rest)) => {
                cmd = cmd.secret(&creds.hf_password);
                format!("https://{}:{}@{rest}", creds.hf_username, creds.hf_password)
            }
            _ => model.source_url.clone(),
        };
        cmd = cmd.arg(url).arg(&model.name);
        (cmd, ExecOptions::in_dir(self.layout.models_dir()))
    }
}
