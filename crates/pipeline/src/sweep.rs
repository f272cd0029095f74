// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The benchmark sweep.
//!
//! Every enabled model is measured over the cross product of its
//! tensor-parallel sizes, batch sizes and length pairs, nested in that
//! order. The nesting is observable: it is the row order of the result
//! store.

use std::fmt;

use artifacts::{ArtifactKey, ArtifactLayout, ArtifactStage};
use bench_config::{BenchConfig, LengthPair, ModelSpec};
use results::{ResultAggregator, ResultsError, RunSummary};
use sandbox::Sandbox;
use tracing::{info, warn};

use crate::commands::CommandBuilder;
use crate::{CommandOutcome, PipelineError};

/// One point of the sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRun {
    pub model_name: String,
    pub tp_size: u32,
    pub batch_size: u32,
    pub lengths: LengthPair,
}

impl fmt::Display for BenchmarkRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tp={} batch={} in,out={}",
            self.model_name, self.tp_size, self.batch_size, self.lengths
        )
    }
}

/// The runs of one model, TP-major.
pub fn model_runs(model: &ModelSpec) -> impl Iterator<Item = BenchmarkRun> + '_ {
    model.tp_sizes.iter().flat_map(move |&tp_size| {
        model.batch_sizes.iter().flat_map(move |&batch_size| {
            model.length_pairs.iter().map(move |&lengths| BenchmarkRun {
                model_name: model.name.clone(),
                tp_size,
                batch_size,
                lengths,
            })
        })
    })
}

/// Every run of every enabled model, in execution order.
pub fn enumerate_sweep(config: &BenchConfig) -> Vec<BenchmarkRun> {
    config.enabled_models().flat_map(model_runs).collect()
}

/// What happened at one sweep point.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    /// The output was parsed and its records appended.
    Recorded {
        command: CommandOutcome,
        rows: usize,
        summary: Option<RunSummary>,
    },
    /// The output held a malformed record; nothing was appended.
    ParseFailed {
        command: CommandOutcome,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub run: BenchmarkRun,
    pub outcome: SweepOutcome,
}

impl SweepPoint {
    pub fn rows(&self) -> usize {
        match &self.outcome {
            SweepOutcome::Recorded { rows, .. } => *rows,
            SweepOutcome::ParseFailed { .. } => 0,
        }
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        match &self.outcome {
            SweepOutcome::Recorded { summary, .. } => summary.as_ref(),
            SweepOutcome::ParseFailed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    pub fn rows_appended(&self) -> usize {
        self.points.iter().map(SweepPoint::rows).sum()
    }

    /// Points whose output could not be recorded.
    pub fn parse_failures(&self) -> usize {
        self.points
            .iter()
            .filter(|p| matches!(p.outcome, SweepOutcome::ParseFailed { .. }))
            .count()
    }

    /// Points whose benchmark process exited non-zero.
    pub fn command_failures(&self) -> usize {
        self.points
            .iter()
            .filter(|p| {
                let command = match &p.outcome {
                    SweepOutcome::Recorded { command, .. } => command,
                    SweepOutcome::ParseFailed { command, .. } => command,
                };
                !command.is_success()
            })
            .count()
    }
}

/// Runs every sweep point and feeds the output to `aggregator`.
///
/// `on_point` is called after each point, for progress reporting. Only
/// a sandbox that cannot run commands or a failing result store abort the
/// sweep.
pub fn run_sweep(
    config: &BenchConfig,
    layout: &ArtifactLayout,
    aggregator: &mut ResultAggregator,
    sandbox: &mut dyn Sandbox,
    mut on_point: impl FnMut(&SweepPoint),
) -> Result<SweepReport, PipelineError> {
    let builder = CommandBuilder::new(config, layout);
    let env = builder.env();
    let mut report = SweepReport::default();
    info!("starting sweep of {} runs", config.sweep_size());

    for model in config.enabled_models() {
        for run in model_runs(model) {
            let key = ArtifactKey::new(&model.name, run.tp_size, model.precision);
            if !layout.exists(&key, ArtifactStage::Engine) {
                warn!("engine {key} is missing; benchmarking {run} anyway");
            }

            info!("benchmark {run}");
            let out = env.run(sandbox, model.family, builder.benchmark_command(model, &run))?;
            let command = CommandOutcome::of(&out);

            let outcome = match aggregator.ingest(&out.text(), &model.name) {
                Ok(ingest) => SweepOutcome::Recorded {
                    command,
                    rows: ingest.rows_appended,
                    summary: ingest.summary,
                },
                Err(e @ ResultsError::MalformedRecord { .. }) => {
                    warn!("discarding output of {run}: {e}");
                    SweepOutcome::ParseFailed {
                        command,
                        error: e.to_string(),
                    }
                }
                Err(e) => return Err(e.into()),
            };
            if let SweepOutcome::Recorded { rows: 0, .. } = outcome {
                warn!("{run} produced no [BENCHMARK] records");
            }

            let point = SweepPoint { run, outcome };
            on_point(&point);
            report.points.push(point);
        }
    }

    info!(
        "sweep done: {} points, {} rows, {} parse failures",
        report.points.len(),
        report.rows_appended(),
        report.parse_failures(),
    );
    Ok(report)
}
