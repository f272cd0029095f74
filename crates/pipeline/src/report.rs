// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! End-of-run report.

use std::fmt;
use std::path::PathBuf;

use artifacts::ArtifactLayout;
use bench_config::BenchConfig;
use results::TelemetrySummary;
use tracing::{debug, warn};

use crate::{AcquireReport, CompileOutcome, CompileReport, ProvisionReport, SweepOutcome, SweepReport};

/// Everything a pipeline run did, stage by stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub provision: ProvisionReport,
    pub acquire: AcquireReport,
    pub compile: CompileReport,
    pub sweep: SweepReport,
    /// Telemetry summaries of the models that have a telemetry log.
    pub telemetry: Vec<(String, TelemetrySummary)>,
    pub results_path: PathBuf,
    /// Rows in the result store after the run, including earlier runs.
    pub total_rows: usize,
}

/// Summarizes the telemetry log of every enabled model that has one.
///
/// A log that cannot be decoded is logged and left out.
pub fn collect_telemetry(config: &BenchConfig, layout: &ArtifactLayout) -> Vec<(String, TelemetrySummary)> {
    let mut summaries = Vec::new();
    for model in config.enabled_models() {
        let path = layout.telemetry_file(&model.name);
        if !path.is_file() {
            debug!("no telemetry log for {}", model.name);
            continue;
        }
        match TelemetrySummary::from_file(&path) {
            Ok(summary) => summaries.push((model.name.clone(), summary)),
            Err(e) => warn!("skipping telemetry for {}: {e}", model.name),
        }
    }
    summaries
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Provision ==")?;
        let failed: Vec<_> = self.provision.failed_probes().collect();
        if failed.is_empty() {
            writeln!(f, "  {} environment probes passed", self.provision.probes.len())?;
        }
        for probe in failed {
            writeln!(f, "  {} cannot import {} ({})", probe.family, probe.check, probe.outcome)?;
        }

        writeln!(f, "== Acquire ==")?;
        writeln!(
            f,
            "  {} cloned, {} present, {} failed",
            self.acquire.cloned(),
            self.acquire.present(),
            self.acquire.failed()
        )?;

        writeln!(f, "== Compile ==")?;
        for (key, outcome) in &self.compile.entries {
            let key = key.to_string();
            match outcome {
                CompileOutcome::Skipped => writeln!(f, "  {key:<40} cached")?,
                CompileOutcome::Built => writeln!(f, "  {key:<40} built")?,
                CompileOutcome::Failed { convert, build } => {
                    writeln!(f, "  {key:<40} FAILED (convert {convert}, build {build})")?
                }
            }
        }
        if !self.compile.checkpoints_removed {
            writeln!(f, "  checkpoint cleanup did not complete")?;
        }

        writeln!(f, "== Sweep ==")?;
        for point in &self.sweep.points {
            match &point.outcome {
                SweepOutcome::Recorded { command, rows, .. } => {
                    writeln!(f, "  {:<48} {rows} rows ({command})", point.run.to_string())?
                }
                SweepOutcome::ParseFailed { error, .. } => {
                    writeln!(f, "  {:<48} DISCARDED: {error}", point.run.to_string())?
                }
            }
        }
        writeln!(
            f,
            "  {} rows appended, {} total in {}",
            self.sweep.rows_appended(),
            self.total_rows,
            self.results_path.display()
        )?;

        if !self.telemetry.is_empty() {
            writeln!(f, "== Telemetry ==")?;
            for (model, summary) in &self.telemetry {
                writeln!(f, "  {model}: {}", summary.summary())?;
            }
        }
        Ok(())
    }
}
