// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CLI subcommand implementations.

pub mod plan;
pub mod report;
pub mod run;
pub mod telemetry;

use std::path::Path;

use anyhow::Context;
use bench_config::{BenchConfig, Overrides};
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows `-v` repetitions
/// (0 = warn, 1 = info, 2 = debug, 3+ = trace).
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Loads the configuration file and applies command-line overrides.
pub fn load_config(path: &Path, overrides: Overrides) -> anyhow::Result<BenchConfig> {
    let config = BenchConfig::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    Ok(config.with_overrides(overrides))
}

pub fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║  {title:<52}║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}
