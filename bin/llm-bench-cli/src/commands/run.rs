// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `llm-bench run` command: all five pipeline stages.
//!
//! ```text
//! Pipeline<Provisioned> → acquire → <Acquired> → compile → <Compiled>
//!     → run_sweep → <Measured> → report
//! ```

use std::path::Path;

use anyhow::Context;
use bench_config::Overrides;
use pipeline::{Pipeline, SweepOutcome, SweepPoint};
use sandbox::{DockerSandbox, DockerSpec, HostSandbox, Sandbox, SandboxGuard};

pub fn execute(
    config_path: &Path,
    overrides: Overrides,
    host: bool,
    container: Option<&str>,
) -> anyhow::Result<()> {
    super::banner("llm-bench · Pipeline Run");

    // Configuration problems surface before any container is started.
    let config = super::load_config(config_path, overrides)?;
    config.validate().context("invalid configuration")?;
    let settings = &config.pipeline;
    let base_dir = settings.base_dir()?;

    println!("  Config:");
    println!("   Base dir: {}", base_dir.display());
    println!("   Machine:  {}", settings.machine()?);
    println!(
        "   Models:   {} enabled, {} sweep points",
        config.enabled_models().count(),
        config.sweep_size()
    );
    println!();

    let sandbox: Box<dyn Sandbox> = if host {
        println!("  Sandbox:  host");
        Box::new(HostSandbox::new())
    } else {
        let spec = DockerSpec::gpu(&settings.image, &settings.container_name, base_dir);
        let docker = match container {
            Some(id) => DockerSandbox::attach(&spec.docker_bin, id),
            None => DockerSandbox::start(&spec)
                .with_context(|| format!("failed to start container from {}", settings.image))?,
        };
        println!("  Sandbox:  container {}", docker.container_id());
        Box::new(docker)
    };
    println!();

    // Stops the sandbox on every exit path below.
    let mut sandbox = SandboxGuard::new(sandbox);

    println!("  [1/5] Provisioning...");
    let provisioned = Pipeline::new(&config, &mut *sandbox)?;
    println!("  [2/5] Acquiring model sources...");
    let acquired = provisioned.acquire()?;
    println!("  [3/5] Compiling engines...");
    let compiled = acquired.compile()?;
    let compile = &compiled.progress().compile;
    println!(
        "        {} built, {} cached, {} failed",
        compile.built(),
        compile.skipped(),
        compile.failed()
    );
    println!("  [4/5] Benchmarking...");
    let measured = compiled.run_sweep(print_point)?;
    println!("  [5/5] Reporting...");
    let report = measured.report();

    sandbox.release().context("failed to stop the sandbox")?;

    println!();
    println!("{report}");
    Ok(())
}

fn print_point(point: &SweepPoint) {
    println!();
    println!("   {}", point.run);
    match &point.outcome {
        SweepOutcome::Recorded {
            summary: Some(summary),
            ..
        } => {
            for line in summary.to_string().lines() {
                println!("     {line}");
            }
        }
        SweepOutcome::Recorded { command, .. } => {
            println!("     no results ({command})");
        }
        SweepOutcome::ParseFailed { error, .. } => {
            println!("     DISCARDED: {error}");
        }
    }
}
