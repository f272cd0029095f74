// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pipeline-wide settings: where artifacts live and how commands are run.

use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Hugging Face credentials used when cloning gated model repositories.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Credentials {
    pub hf_username: String,
    pub hf_password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("hf_username", &self.hf_username)
            .field("hf_password", &"***")
            .finish()
    }
}

/// Settings shared by every stage of the pipeline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Root of the artifact tree (models, checkpoints, engines, outputs).
    pub base_dir: Option<PathBuf>,
    /// Identifier of the machine under test; names the result store.
    pub machine: Option<String>,
    /// Container image holding the inference toolkit.
    pub image: String,
    /// Name given to the benchmark container.
    pub container_name: String,
    /// Toolkit installation root inside the sandbox.
    pub toolkit_root: PathBuf,
    /// Directory holding one Python environment per model family.
    pub env_root: PathBuf,
    /// Command prefix that enters a family environment (e.g. `pipenv run`).
    pub runner: Vec<String>,
    /// Command prefix that sets up the toolkit shell environment.
    pub activate: Vec<String>,
    /// Python interpreter name.
    pub python: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            base_dir: None,
            machine: None,
            image: "tensorrt_llm_benchmark_v2:latest".to_string(),
            container_name: "llm-benchmark".to_string(),
            toolkit_root: PathBuf::from("/app/tensorrt_llm"),
            env_root: PathBuf::from("/app/tensorrt_llm/env"),
            runner: vec!["pipenv".to_string(), "run".to_string()],
            activate: vec!["bash_env".to_string()],
            python: "python3".to_string(),
        }
    }
}

impl PipelineSettings {
    /// Returns the artifact root, which must be set before execution.
    pub fn base_dir(&self) -> Result<&Path, ConfigError> {
        self.base_dir
            .as_deref()
            .ok_or(ConfigError::MissingSetting("base_dir"))
    }

    /// Returns the machine identifier, which must be set before execution.
    pub fn machine(&self) -> Result<&str, ConfigError> {
        self.machine
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or(ConfigError::MissingSetting("machine"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = PipelineSettings::default();
        assert_eq!(s.runner, vec!["pipenv", "run"]);
        assert_eq!(s.activate, vec!["bash_env"]);
        assert!(s.base_dir().is_err());
        assert!(s.machine().is_err());
    }

    #[test]
    fn test_blank_machine_is_missing() {
        let s = PipelineSettings {
            machine: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(s.machine(), Err(ConfigError::MissingSetting("machine"))));
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let c = Credentials {
            hf_username: "user".into(),
            hf_password: "hunter2".into(),
        };
        let dbg = format!("{c:?}");
        assert!(dbg.contains("user"));
        assert!(!dbg.contains("hunter2"));
    }
}
