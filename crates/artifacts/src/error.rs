// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for artifact directory management.

/// Errors that can occur while preparing the artifact tree.
///
/// Existence checks never produce errors; only directory creation does.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// A directory of the artifact tree could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
