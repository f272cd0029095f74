// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pipeline
//!
//! The five-stage benchmark pipeline:
//!
//! 1. **Provision**: create the artifact tree, probe the toolkit
//!    environments ([`provision`]).
//! 2. **Acquire**: clone model sources that are not on disk yet
//!    ([`acquire_models`]).
//! 3. **Compile**: convert checkpoints and build engines that are not
//!    cached ([`compile_engines`]).
//! 4. **Run**: benchmark every sweep point and record the results
//!    ([`run_sweep`]).
//! 5. **Report**: collect stage outcomes and telemetry
//!    ([`PipelineReport`]).
//!
//! [`Pipeline`] strings the stages together in a type-state machine.
//! Failing external commands never abort a run; they are logged and
//! recorded in the stage reports. Only configuration errors, a sandbox
//! that cannot run commands, and result store I/O errors do.

mod acquire;
mod commands;
mod compile;
mod driver;
mod env;
mod error;
mod outcome;
mod provision;
mod report;
mod sweep;

#[cfg(test)]
mod testutil;

pub use acquire::{acquire_models, AcquireOutcome, AcquireReport};
pub use commands::{CommandBuilder, ConvertRecipe};
pub use compile::{compile_engines, plan_compile, CompileOutcome, CompileReport, CompileTask};
pub use driver::{Acquired, Compiled, Measured, Pipeline, PipelineState, Provisioned};
pub use env::ModelEnv;
pub use error::PipelineError;
pub use outcome::CommandOutcome;
pub use provision::{provision, ProbeResult, ProvisionReport, ENVIRONMENT_PROBES};
pub use report::{collect_telemetry, PipelineReport};
pub use sweep::{enumerate_sweep, model_runs, run_sweep, BenchmarkRun, SweepOutcome, SweepPoint, SweepReport};
