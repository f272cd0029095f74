// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Acquire stage: clone missing model sources.

use artifacts::ArtifactLayout;
use bench_config::BenchConfig;
use sandbox::Sandbox;
use tracing::{info, warn};

use crate::commands::CommandBuilder;
use crate::{CommandOutcome, PipelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The source directory already existed.
    Present,
    Cloned,
    Failed { exit_code: i32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquireReport {
    pub models: Vec<(String, AcquireOutcome)>,
}

impl AcquireReport {
    pub fn cloned(&self) -> usize {
        self.count(|o| *o == AcquireOutcome::Cloned)
    }

    pub fn present(&self) -> usize {
        self.count(|o| *o == AcquireOutcome::Present)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, AcquireOutcome::Failed { .. }))
    }

    fn count(&self, wanted: impl Fn(&AcquireOutcome) -> bool) -> usize {
        self.models.iter().filter(|(_, o)| wanted(o)).count()
    }
}

/// Clones every enabled model whose source directory is absent.
///
/// A failed clone is logged and reported; compiling that model will fail
/// later and be reported there.
pub fn acquire_models(
    config: &BenchConfig,
    layout: &ArtifactLayout,
    sandbox: &mut dyn Sandbox,
) -> Result<AcquireReport, PipelineError> {
    let builder = CommandBuilder::new(config, layout);
    let mut report = AcquireReport::default();

    for model in config.enabled_models() {
        if layout.source_exists(&model.name) {
            info!("{} already present, skipping clone", model.name);
            report.models.push((model.name.clone(), AcquireOutcome::Present));
            continue;
        }

        info!("cloning {}", model.name);
        let (cmd, opts) = builder.clone_command(model);
        let out = sandbox.run(&cmd, &opts)?;
        let outcome = match CommandOutcome::of(&out) {
            CommandOutcome::Succeeded => AcquireOutcome::Cloned,
            CommandOutcome::Failed { exit_code } => {
                warn!("clone of {} failed with exit code {exit_code}", model.name);
                AcquireOutcome::Failed { exit_code }
            }
        };
        report.models.push((model.name.clone(), outcome));
    }
    Ok(report)
}
