// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `llm-bench plan` command: show the work a run would do.
//!
//! Nothing is executed. The compile plan reflects the current cache state
//! of the engine tree.

use std::path::Path;

use anyhow::Context;
use artifacts::ArtifactLayout;
use bench_config::Overrides;
use pipeline::{enumerate_sweep, plan_compile, CommandBuilder};

pub fn execute(config_path: &Path, overrides: Overrides) -> anyhow::Result<()> {
    super::banner("llm-bench · Plan");

    let config = super::load_config(config_path, overrides)?;
    config.validate().context("invalid configuration")?;
    let layout = ArtifactLayout::new(config.pipeline.base_dir()?);
    let builder = CommandBuilder::new(&config, &layout);
    let env = builder.env();

    println!("  Acquire");
    for model in config.enabled_models() {
        let state = if layout.source_exists(&model.name) {
            "present"
        } else {
            "clone"
        };
        println!("   {:<40} {state}", model.name);
    }
    println!();

    let tasks = plan_compile(&config, &layout);
    println!("  Compile ({} engines)", tasks.len());
    for task in &tasks {
        let (profile, _) = config.build_profiles.resolve(task.model)?;
        let state = if task.cached { "cached" } else { "build" };
        println!("   {:<40} {state:<7} profile={profile}", task.key.to_string());
    }
    println!();

    let runs = enumerate_sweep(&config);
    println!("  Sweep ({} runs)", runs.len());
    for run in &runs {
        let model = config
            .models
            .get(&run.model_name)
            .with_context(|| format!("model {} vanished from the configuration", run.model_name))?;
        let cmd = env.wrap(builder.benchmark_command(model, run));
        println!("   {run}");
        println!("     {}", cmd);
    }
    Ok(())
}
