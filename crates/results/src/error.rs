// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for result parsing, storage and telemetry.

/// Errors raised while parsing benchmark output or touching the stores.
#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    /// A tagged record line has an odd number of tokens after the tag.
    #[error(
        "malformed [BENCHMARK] record on output line {line}: {tokens} tokens after the tag, \
         '{dangling}' has no value"
    )]
    MalformedRecord {
        line: usize,
        tokens: usize,
        dangling: String,
    },

    /// The result store could not be read or written.
    #[error("result store {path}: {source}")]
    Store {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Filesystem error on the result store (temp file, rename, sync).
    #[error("result store {path}: {source}")]
    StoreIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Columns of a loaded table have different lengths.
    #[error("inconsistent result table: column '{column}' has {found} rows, expected {expected}")]
    InconsistentTable {
        column: String,
        expected: usize,
        found: usize,
    },

    /// The telemetry log could not be opened or its header decoded.
    #[error("telemetry log {path}: {detail}")]
    Telemetry { path: String, detail: String },
}
