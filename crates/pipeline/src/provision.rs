// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Provision stage: directory tree and environment probe.

use artifacts::ArtifactLayout;
use bench_config::{BenchConfig, ModelFamily};
use sandbox::{CommandLine, Sandbox};
use tracing::{info, warn};

use crate::env::ModelEnv;
use crate::{CommandOutcome, PipelineError};

/// Python snippets run in every family environment before any real work.
pub const ENVIRONMENT_PROBES: [(&str, &str); 2] = [
    ("torch", "import torch; print(torch.__version__)"),
    ("tensorrt_llm", "import tensorrt_llm"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub family: ModelFamily,
    pub check: &'static str,
    pub outcome: CommandOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub probes: Vec<ProbeResult>,
}

impl ProvisionReport {
    pub fn failed_probes(&self) -> impl Iterator<Item = &ProbeResult> {
        self.probes.iter().filter(|p| !p.outcome.is_success())
    }
}

/// Families of the enabled models, in first-appearance order.
fn enabled_families(config: &BenchConfig) -> Vec<ModelFamily> {
    let mut families = Vec::new();
    for model in config.enabled_models() {
        if !families.contains(&model.family) {
            families.push(model.family);
        }
    }
    families
}

/// Creates the artifact directories and checks that every family
/// environment can import the toolkit.
///
/// A failing probe is logged and reported; it does not stop the pipeline.
pub fn provision(
    config: &BenchConfig,
    layout: &ArtifactLayout,
    sandbox: &mut dyn Sandbox,
) -> Result<ProvisionReport, PipelineError> {
    layout.ensure_dirs()?;
    info!("artifact tree ready under {}", layout.base().display());

    let env = ModelEnv::new(&config.pipeline);
    let mut report = ProvisionReport::default();
    for family in enabled_families(config) {
        for (check, snippet) in ENVIRONMENT_PROBES {
            let cmd = CommandLine::new(&config.pipeline.python).arg("-c").arg(snippet);
            let out = env.run(sandbox, family, cmd)?;
            let outcome = CommandOutcome::of(&out);
            if !outcome.is_success() {
                warn!("{family} environment cannot import {check} ({outcome})");
            }
            report.probes.push(ProbeResult {
                family,
                check,
                outcome,
            });
        }
    }
    Ok(report)
}
