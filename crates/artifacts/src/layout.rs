// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Deterministic artifact paths and the cache gate.
//!
//! # Layout
//! ```text
//! {base}/models/{model}/                                  source weights
//! {base}/checkpoints/{model}/tp_{n}/{precision}/          converted checkpoint
//! {base}/engines/{model}/tp_{n}/{precision}/rank0.engine  compiled engine
//! {base}/Outputs/LLMBenchmark_{machine}.csv               result store
//! {base}/Outputs/{model}_power.csv                        telemetry log
//! ```
//! Presence of `rank0.engine` is the sole readiness signal for a compiled
//! engine.

use crate::ArtifactError;
use bench_config::Precision;
use std::fmt;
use std::path::{Path, PathBuf};

/// File whose presence marks an engine as built.
pub const ENGINE_MARKER: &str = "rank0.engine";

/// Identity of a compiled engine or intermediate checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub model_name: String,
    pub tp_size: u32,
    pub precision: Precision,
}

impl ArtifactKey {
    pub fn new(model_name: impl Into<String>, tp_size: u32, precision: Precision) -> Self {
        Self {
            model_name: model_name.into(),
            tp_size,
            precision,
        }
    }

    /// Relative path `{model}/tp_{n}/{precision}` shared by both stages.
    fn relative(&self) -> PathBuf {
        PathBuf::from(&self.model_name)
            .join(format!("tp_{}", self.tp_size))
            .join(self.precision.as_str())
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/tp_{}/{}", self.model_name, self.tp_size, self.precision)
    }
}

/// Which stage's artifact a gate query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStage {
    Checkpoint,
    Engine,
}

/// The artifact tree rooted at a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    base: PathBuf,
}

impl ArtifactLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn models_dir(&self) -> PathBuf {
        self.base.join("models")
    }

    pub fn model_dir(&self, model_name: &str) -> PathBuf {
        self.models_dir().join(model_name)
    }

    pub fn checkpoints_root(&self) -> PathBuf {
        self.base.join("checkpoints")
    }

    pub fn checkpoint_dir(&self, key: &ArtifactKey) -> PathBuf {
        self.checkpoints_root().join(key.relative())
    }

    pub fn engines_root(&self) -> PathBuf {
        self.base.join("engines")
    }

    pub fn engine_dir(&self, key: &ArtifactKey) -> PathBuf {
        self.engines_root().join(key.relative())
    }

    pub fn engine_file(&self, key: &ArtifactKey) -> PathBuf {
        self.engine_dir(key).join(ENGINE_MARKER)
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.base.join("Outputs")
    }

    /// Result store for one machine identifier.
    pub fn results_file(&self, machine: &str) -> PathBuf {
        self.outputs_dir().join(format!("LLMBenchmark_{machine}.csv"))
    }

    /// Telemetry log written by the external sampler for one model.
    pub fn telemetry_file(&self, model_name: &str) -> PathBuf {
        self.outputs_dir().join(format!("{model_name}_power.csv"))
    }

    /// The cache gate: `true` if the artifact for `key` at `stage` exists.
    ///
    /// Unreadable paths count as absent.
    pub fn exists(&self, key: &ArtifactKey, stage: ArtifactStage) -> bool {
        match stage {
            ArtifactStage::Checkpoint => is_dir(&self.checkpoint_dir(key)),
            ArtifactStage::Engine => is_file(&self.engine_file(key)),
        }
    }

    /// `true` if the source weights of `model_name` have been acquired.
    pub fn source_exists(&self, model_name: &str) -> bool {
        is_dir(&self.model_dir(model_name))
    }

    /// Creates the models, checkpoints and outputs directories.
    pub fn ensure_dirs(&self) -> Result<(), ArtifactError> {
        for dir in [self.models_dir(), self.checkpoints_root(), self.outputs_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| ArtifactError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }
}

fn is_dir(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

fn is_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ArtifactKey {
        ArtifactKey::new("Meta-Llama-3-8B", 2, Precision::Float16)
    }

    #[test]
    fn test_paths() {
        let layout = ArtifactLayout::new("/data/bench");
        assert_eq!(
            layout.engine_file(&key()),
            PathBuf::from("/data/bench/engines/Meta-Llama-3-8B/tp_2/float16/rank0.engine")
        );
        assert_eq!(
            layout.checkpoint_dir(&key()),
            PathBuf::from("/data/bench/checkpoints/Meta-Llama-3-8B/tp_2/float16")
        );
        assert_eq!(
            layout.results_file("nd-h100"),
            PathBuf::from("/data/bench/Outputs/LLMBenchmark_nd-h100.csv")
        );
        assert_eq!(
            layout.telemetry_file("m"),
            PathBuf::from("/data/bench/Outputs/m_power.csv")
        );
    }

    #[test]
    fn test_key_display() {
        assert_eq!(key().to_string(), "Meta-Llama-3-8B/tp_2/float16");
    }

    #[test]
    fn test_gate_absent_then_present() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let k = key();

        assert!(!layout.exists(&k, ArtifactStage::Engine));
        assert!(!layout.exists(&k, ArtifactStage::Checkpoint));

        std::fs::create_dir_all(layout.engine_dir(&k)).unwrap();
        // Directory alone is not a built engine.
        assert!(!layout.exists(&k, ArtifactStage::Engine));

        std::fs::write(layout.engine_file(&k), b"engine").unwrap();
        assert!(layout.exists(&k, ArtifactStage::Engine));

        std::fs::create_dir_all(layout.checkpoint_dir(&k)).unwrap();
        assert!(layout.exists(&k, ArtifactStage::Checkpoint));
    }

    #[test]
    fn test_gate_distinguishes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let k = key();
        std::fs::create_dir_all(layout.engine_dir(&k)).unwrap();
        std::fs::write(layout.engine_file(&k), b"engine").unwrap();

        let other_tp = ArtifactKey::new("Meta-Llama-3-8B", 4, Precision::Float16);
        let other_precision = ArtifactKey::new("Meta-Llama-3-8B", 2, Precision::Fp8);
        assert!(!layout.exists(&other_tp, ArtifactStage::Engine));
        assert!(!layout.exists(&other_precision, ArtifactStage::Engine));
    }

    #[test]
    fn test_missing_base_is_absent_not_error() {
        let layout = ArtifactLayout::new("/nonexistent/llm-bench/base");
        assert!(!layout.exists(&key(), ArtifactStage::Engine));
        assert!(!layout.source_exists("Meta-Llama-3-8B"));
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path().join("base"));
        layout.ensure_dirs().unwrap();
        assert!(layout.models_dir().is_dir());
        assert!(layout.checkpoints_root().is_dir());
        assert!(layout.outputs_dir().is_dir());
        // Idempotent.
        layout.ensure_dirs().unwrap();
    }
}
