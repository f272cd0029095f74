// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # artifacts
//!
//! The artifact cache gate: deterministic paths for every artifact the
//! pipeline produces, and existence checks that let the acquire and
//! compile stages skip work that is already done.
//!
//! - [`ArtifactLayout`]: the directory layout under a base directory and
//!   the gate query [`ArtifactLayout::exists`].
//! - [`ArtifactKey`]: `(model, tensor-parallel size, precision)`.
//! - [`CheckpointScope`]: scoped ownership of the intermediate checkpoint
//!   tree, deleted once when the compile stage ends.
//!
//! Re-running the pipeline after a partial failure is cheap: engines that
//! exist are never rebuilt, and anything missing is attempted again.
//!
//! # Example
//! ```no_run
//! use artifacts::{ArtifactKey, ArtifactLayout, ArtifactStage};
//! use bench_config::Precision;
//!
//! let layout = ArtifactLayout::new("/data/bench");
//! let key = ArtifactKey::new("Meta-Llama-3-8B", 2, Precision::Float16);
//! if !layout.exists(&key, ArtifactStage::Engine) {
//!     println!("engine {key} needs building");
//! }
//! ```

mod error;
mod layout;
mod scope;

pub use error::ArtifactError;
pub use layout::{ArtifactKey, ArtifactLayout, ArtifactStage, ENGINE_MARKER};
pub use scope::CheckpointScope;
