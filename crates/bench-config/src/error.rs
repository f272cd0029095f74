// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for configuration loading and validation.

/// Errors that can occur while loading or validating a benchmark configuration.
///
/// All of these are fatal: they are raised before any sandbox is created.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The JSON document is malformed or does not match the schema.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The TOML document is malformed or does not match the schema.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The required top-level section is absent.
    #[error("configuration has no '{0}' section")]
    MissingSection(String),

    /// A model entry violates a configuration invariant.
    #[error("invalid model '{model}': {detail}")]
    InvalidModel { model: String, detail: String },

    /// An input/output length pair is not of the form `"input,output"`.
    #[error("invalid length pair '{0}': expected \"input,output\"")]
    InvalidLengthPair(String),

    /// A precision label is not recognised.
    #[error("unknown precision '{0}'")]
    UnknownPrecision(String),

    /// A model or rule references a build profile that is not defined.
    #[error("unknown build profile '{0}'")]
    UnknownProfile(String),

    /// A pipeline setting required for execution is not set.
    #[error("missing setting '{0}' (set it in the config or on the command line)")]
    MissingSetting(&'static str),
}
