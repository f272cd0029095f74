// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the pipeline driver.

/// Errors that abort a pipeline run.
///
/// Failing external commands are not errors; they are recorded as
/// [`CommandOutcome::Failed`](crate::CommandOutcome::Failed) in the stage
/// reports.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The configuration is invalid or incomplete.
    #[error("configuration error: {0}")]
    Config(#[from] bench_config::ConfigError),

    /// The sandbox could not run a command at all.
    #[error("sandbox error: {0}")]
    Sandbox(#[from] sandbox::SandboxError),

    /// The artifact tree could not be prepared.
    #[error("artifact error: {0}")]
    Artifact(#[from] artifacts::ArtifactError),

    /// The result store could not be read or written.
    #[error("results error: {0}")]
    Results(#[from] results::ResultsError),
}
