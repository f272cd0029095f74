// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The pipeline driver with type-state enforced stage order.
//!
//! ```text
//! Pipeline<Provisioned>   Pipeline::new()
//!     │  .acquire()
//!     ▼
//! Pipeline<Acquired>
//!     │  .compile()
//!     ▼
//! Pipeline<Compiled>
//!     │  .run_sweep()
//!     ▼
//! Pipeline<Measured>
//!     │  .report()
//!     ▼
//!   PipelineReport
//! ```
//!
//! Each transition consumes the pipeline and returns it in the next state,
//! so stages cannot be skipped or reordered. The sandbox is borrowed for
//! the whole run; stopping it is the caller's job (see
//! [`sandbox::SandboxGuard`]).

use std::marker::PhantomData;

use artifacts::ArtifactLayout;
use bench_config::BenchConfig;
use results::{ResultAggregator, ResultStore};
use sandbox::Sandbox;

use crate::report::collect_telemetry;
use crate::{
    acquire_models, compile_engines, provision, run_sweep, PipelineError, PipelineReport,
    SweepPoint,
};

// ── Type-state markers ─────────────────────────────────────────

/// Directories exist and the environments were probed.
#[derive(Debug)]
pub struct Provisioned;

/// Model sources are cloned.
#[derive(Debug)]
pub struct Acquired;

/// Engines are built.
#[derive(Debug)]
pub struct Compiled;

/// The sweep ran and its results are stored.
#[derive(Debug)]
pub struct Measured;

/// Sealed trait for pipeline states.
pub trait PipelineState: std::fmt::Debug {}
impl PipelineState for Provisioned {}
impl PipelineState for Acquired {}
impl PipelineState for Compiled {}
impl PipelineState for Measured {}

// ── Pipeline ───────────────────────────────────────────────────

/// One run of the benchmark pipeline against one sandbox.
///
/// # Example
/// ```no_run
/// use bench_config::BenchConfig;
/// use pipeline::Pipeline;
/// use sandbox::{HostSandbox, SandboxGuard};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BenchConfig::load("bench.json".as_ref())?;
/// let mut sandbox = SandboxGuard::new(HostSandbox::new());
/// let report = Pipeline::new(&config, &mut *sandbox)?
///     .acquire()?
///     .compile()?
///     .run_sweep(|point| println!("{}", point.run))?
///     .report();
/// println!("{report}");
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<'a, S: PipelineState = Provisioned> {
    config: &'a BenchConfig,
    sandbox: &'a mut dyn Sandbox,
    layout: ArtifactLayout,
    machine: String,
    report: PipelineReport,
    _state: PhantomData<S>,
}

impl<'a, S: PipelineState> Pipeline<'a, S> {
    fn into_state<T: PipelineState>(self) -> Pipeline<'a, T> {
        Pipeline {
            config: self.config,
            sandbox: self.sandbox,
            layout: self.layout,
            machine: self.machine,
            report: self.report,
            _state: PhantomData,
        }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// The report accumulated so far.
    pub fn progress(&self) -> &PipelineReport {
        &self.report
    }
}

// ── Provisioned ────────────────────────────────────────────────

impl<'a> Pipeline<'a, Provisioned> {
    /// Validates the configuration and runs the provision stage.
    pub fn new(config: &'a BenchConfig, sandbox: &'a mut dyn Sandbox) -> Result<Self, PipelineError> {
        config.validate()?;
        let layout = ArtifactLayout::new(config.pipeline.base_dir()?);
        let machine = config.pipeline.machine()?.to_string();
        tracing::info!(
            "pipeline for machine '{machine}' in {} using sandbox {}",
            layout.base().display(),
            sandbox.id()
        );

        let provision = provision(config, &layout, sandbox)?;
        Ok(Self {
            config,
            sandbox,
            layout,
            machine,
            report: PipelineReport {
                provision,
                ..PipelineReport::default()
            },
            _state: PhantomData,
        })
    }

    pub fn acquire(mut self) -> Result<Pipeline<'a, Acquired>, PipelineError> {
        self.report.acquire = acquire_models(self.config, &self.layout, &mut *self.sandbox)?;
        Ok(self.into_state())
    }
}

// ── Acquired ───────────────────────────────────────────────────

impl<'a> Pipeline<'a, Acquired> {
    pub fn compile(mut self) -> Result<Pipeline<'a, Compiled>, PipelineError> {
        self.report.compile = compile_engines(self.config, &self.layout, &mut *self.sandbox)?;
        Ok(self.into_state())
    }
}

// ── Compiled ───────────────────────────────────────────────────

impl<'a> Pipeline<'a, Compiled> {
    /// Runs every sweep point, appending to this machine's result store.
    ///
    /// `on_point` observes each finished point.
    pub fn run_sweep(
        mut self,
        on_point: impl FnMut(&SweepPoint),
    ) -> Result<Pipeline<'a, Measured>, PipelineError> {
        let store = ResultStore::new(self.layout.results_file(&self.machine));
        let mut aggregator = ResultAggregator::open(store, self.machine.as_str())?;
        self.report.sweep = run_sweep(
            self.config,
            &self.layout,
            &mut aggregator,
            &mut *self.sandbox,
            on_point,
        )?;
        self.report.results_path = aggregator.store().path().to_path_buf();
        self.report.total_rows = aggregator.table().row_count();
        Ok(self.into_state())
    }
}

// ── Measured ───────────────────────────────────────────────────

impl<'a> Pipeline<'a, Measured> {
    /// Adds telemetry summaries and returns the final report.
    pub fn report(mut self) -> PipelineReport {
        self.report.telemetry = collect_telemetry(self.config, &self.layout);
        self.report
    }
}
