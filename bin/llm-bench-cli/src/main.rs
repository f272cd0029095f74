// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # llm-bench
//!
//! Command-line interface for the LLM inference benchmark pipeline.
//!
//! ## Usage
//! ```bash
//! # Provision, acquire, compile, benchmark and report
//! llm-bench -c config.json run --base-dir /data/bench --machine nd-h100
//!
//! # Show what would be built and benchmarked
//! llm-bench -c config.json plan
//!
//! # Print the accumulated results of one machine
//! llm-bench -c config.json report --machine nd-h100
//!
//! # Summarize a model's GPU telemetry log
//! llm-bench -c config.json telemetry --model Meta-Llama-3-8B
//! ```

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "llm-bench",
    about = "Benchmark pipeline for compiled LLM inference engines",
    version,
    author
)]
struct Cli {
    /// Path to the JSON or TOML configuration file.
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Settings that may override the configuration file.
#[derive(Args, Clone, Default)]
struct Location {
    /// Base directory holding models, engines and outputs.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Machine identifier used to name the result store.
    #[arg(long)]
    machine: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all five pipeline stages.
    Run {
        #[command(flatten)]
        location: Location,

        /// Container image with the toolkit installed.
        #[arg(long)]
        image: Option<String>,

        /// Run commands directly on the host instead of in a container.
        #[arg(long)]
        host: bool,

        /// Reuse a running container instead of starting one. It is
        /// stopped when the run ends.
        #[arg(long, value_name = "ID", conflicts_with = "host")]
        container: Option<String>,
    },

    /// Print the compile plan and every sweep point without running anything.
    Plan {
        #[command(flatten)]
        location: Location,
    },

    /// Print the stored result table.
    Report {
        #[command(flatten)]
        location: Location,
    },

    /// Summarize the GPU telemetry log of one model.
    Telemetry {
        /// Model name as it appears in the configuration.
        #[arg(short, long)]
        model: String,

        /// Base directory holding the Outputs folder.
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            location,
            image,
            host,
            container,
        } => commands::run::execute(
            &cli.config,
            location.into_overrides(image),
            host,
            container.as_deref(),
        ),
        Commands::Plan { location } => commands::plan::execute(&cli.config, location.into_overrides(None)),
        Commands::Report { location } => {
            commands::report::execute(&cli.config, location.into_overrides(None))
        }
        Commands::Telemetry { model, base_dir } => {
            let location = Location {
                base_dir,
                machine: None,
            };
            commands::telemetry::execute(&cli.config, location.into_overrides(None), &model)
        }
    }
}

impl Location {
    fn into_overrides(self, image: Option<String>) -> bench_config::Overrides {
        bench_config::Overrides {
            base_dir: self.base_dir,
            machine: self.machine,
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_reuses_container() {
        let cli = Cli::try_parse_from(["llm-bench", "run", "--container", "abc123"]).unwrap();
        match cli.command {
            Commands::Run { container, host, .. } => {
                assert_eq!(container.as_deref(), Some("abc123"));
                assert!(!host);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_container_conflicts_with_host() {
        assert!(Cli::try_parse_from(["llm-bench", "run", "--host", "--container", "abc123"]).is_err());
    }
}
