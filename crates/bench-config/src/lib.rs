// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # bench-config
//!
//! The configuration model of the benchmark pipeline: which models to
//! test and with what parameter grid.
//!
//! - [`BenchConfig`]: the validated, immutable configuration value passed
//!   to every stage.
//! - [`ModelSpec`]: one model under test and its sweep grid.
//! - [`Precision`]: engine precision, including quantized formats.
//! - [`BuildProfileTable`]: table-driven engine capacity flags.
//! - [`PipelineSettings`]: artifact root, machine identifier and
//!   sandbox/environment settings.
//!
//! # Example
//! ```no_run
//! use bench_config::BenchConfig;
//! use std::path::Path;
//!
//! let config = BenchConfig::load(Path::new("config.json")).unwrap();
//! config.validate().unwrap();
//! for model in config.enabled_models() {
//!     println!("{}: {} runs", model.name, model.sweep_size());
//! }
//! ```

mod config;
mod error;
mod model;
mod precision;
mod profile;
mod settings;

pub use config::{BenchConfig, Overrides, CONFIG_SECTION};
pub use error::ConfigError;
pub use model::{LengthPair, ModelFamily, ModelSet, ModelSpec};
pub use precision::{Precision, Quantization};
pub use profile::{BuildProfile, BuildProfileTable, ProfileRule, DEFAULT_PROFILE};
pub use settings::{Credentials, PipelineSettings};
