// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Numeric precision of a compiled engine.

use crate::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Precision a model is converted and built at.
///
/// `Fp8` is a quantized format: conversion goes through the quantization
/// toolkit and the benchmark program is told the base type instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[serde(alias = "fp16")]
    Float16,
    #[serde(alias = "bf16")]
    Bfloat16,
    #[serde(alias = "fp32")]
    Float32,
    Fp8,
}

/// Flags passed to the quantization toolkit for a quantized precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantization {
    /// Value of `--qformat`.
    pub qformat: &'static str,
    /// Value of `--kv_cache_dtype`.
    pub kv_cache_dtype: &'static str,
}

impl Precision {
    /// Returns the label used in artifact paths and command flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float16 => "float16",
            Self::Bfloat16 => "bfloat16",
            Self::Float32 => "float32",
            Self::Fp8 => "fp8",
        }
    }

    /// Returns `true` for reduced/quantized formats.
    pub fn is_quantized(&self) -> bool {
        self.quantization().is_some()
    }

    /// Returns the unquantized numeric type this precision computes in.
    pub fn base_dtype(&self) -> Precision {
        match self {
            Self::Fp8 => Self::Float16,
            other => *other,
        }
    }

    /// Returns quantization flags, or `None` for plain floating-point types.
    pub fn quantization(&self) -> Option<Quantization> {
        match self {
            Self::Fp8 => Some(Quantization {
                qformat: "fp8",
                kv_cache_dtype: "fp8",
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "float16" | "fp16" => Ok(Self::Float16),
            "bfloat16" | "bf16" => Ok(Self::Bfloat16),
            "float32" | "fp32" => Ok(Self::Float32),
            "fp8" => Ok(Self::Fp8),
            other => Err(ConfigError::UnknownPrecision(other.to_string())),
        }
    }
}
