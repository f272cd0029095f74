// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `llm-bench telemetry` command: summarize a model's GPU telemetry log.

use std::path::Path;

use anyhow::Context;
use artifacts::ArtifactLayout;
use bench_config::Overrides;
use results::TelemetrySummary;

pub fn execute(config_path: &Path, overrides: Overrides, model: &str) -> anyhow::Result<()> {
    let config = super::load_config(config_path, overrides)?;
    let layout = ArtifactLayout::new(config.pipeline.base_dir()?);
    if config.models.get(model).is_none() {
        tracing::warn!("model '{model}' is not in the configuration");
    }

    let path = layout.telemetry_file(model);
    let summary = TelemetrySummary::from_file(&path)
        .with_context(|| format!("failed to summarize telemetry for {model}"))?;

    super::banner("llm-bench · GPU Telemetry");
    println!("  Model:   {model}");
    println!("  Log:     {}", path.display());
    println!(
        "  Samples: {} ({} idle, excluded)",
        summary.samples, summary.idle_samples
    );
    println!();
    println!("  Memory");
    println!("   Max:          {:.1} MiB", summary.max_memory_mib);
    println!("   Avg:          {:.1} MiB", summary.avg_memory_mib);
    println!("   Total:        {:.1} MiB", summary.total_memory_mib);
    println!();
    println!("  SM clock");
    println!("   Max:          {:.1} MHz", summary.max_sm_clock_mhz);
    println!("   Avg:          {:.1} MHz", summary.avg_sm_clock_mhz);
    println!();
    println!("  Power");
    println!("   Max:          {:.1} W", summary.max_power_w);
    println!("   Avg:          {:.1} W", summary.avg_power_w);
    println!("   Limit:        {:.1} W", summary.power_limit_w);
    Ok(())
}
