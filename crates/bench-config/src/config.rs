// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Top-level benchmark configuration, loaded from JSON or TOML.
//!
//! The document holds one `LLMBenchmark` section:
//! ```json
//! {
//!   "LLMBenchmark": {
//!     "credentials": { "hf_username": "user", "hf_password": "token" },
//!     "pipeline": { "base_dir": "/data/bench", "machine": "nd-h100-v5" },
//!     "models": { "Meta-Llama-3-8B": { "type": "llama", ... } }
//!   }
//! }
//! ```
//! Files ending in `.toml` are parsed as TOML with the same structure
//! (`[LLMBenchmark]`, `[LLMBenchmark.models.<name>]`).

use crate::{BuildProfileTable, ConfigError, Credentials, ModelSet, ModelSpec, PipelineSettings};
use std::path::{Path, PathBuf};

/// Name of the configuration section read by the pipeline.
pub const CONFIG_SECTION: &str = "LLMBenchmark";

/// The immutable configuration handed to every pipeline stage.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub build_profiles: BuildProfileTable,
    pub models: ModelSet,
}

/// Command-line overrides applied on top of the file's pipeline settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_dir: Option<PathBuf>,
    pub machine: Option<String>,
    pub image: Option<String>,
}

impl BenchConfig {
    /// Loads a configuration file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let config = if is_toml {
            Self::from_toml(&content)?
        } else {
            Self::from_json(&content)?
        };
        tracing::info!(
            "loaded config '{}': {} models ({} enabled)",
            path.display(),
            config.models.len(),
            config.enabled_models().count(),
        );
        Ok(config)
    }

    /// Parses the `LLMBenchmark` section of a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut root: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let section = root
            .remove(CONFIG_SECTION)
            .ok_or_else(|| ConfigError::MissingSection(CONFIG_SECTION.to_string()))?;
        Ok(serde_json::from_value(section)?)
    }

    /// Parses the `LLMBenchmark` table of a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut root: toml::Table = toml::from_str(toml_str)?;
        let section = root
            .remove(CONFIG_SECTION)
            .ok_or_else(|| ConfigError::MissingSection(CONFIG_SECTION.to_string()))?;
        Ok(section.try_into()?)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(base_dir) = overrides.base_dir {
            self.pipeline.base_dir = Some(base_dir);
        }
        if let Some(machine) = overrides.machine {
            self.pipeline.machine = Some(machine);
        }
        if let Some(image) = overrides.image {
            self.pipeline.image = image;
        }
        self
    }

    /// Validates every model, the profile table and the required settings.
    ///
    /// Checks:
    /// - Model names are unique.
    /// - Every enabled model has a non-empty grid of positive sizes.
    /// - Every referenced build profile exists.
    /// - `base_dir` and `machine` are set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for model in &self.models {
            if !seen.insert(model.name.as_str()) {
                return Err(ConfigError::InvalidModel {
                    model: model.name.clone(),
                    detail: "duplicate model name".into(),
                });
            }
            model.validate()?;
            if model.enabled {
                self.build_profiles.resolve(model)?;
            }
        }
        self.build_profiles.validate()?;
        self.pipeline.base_dir()?;
        self.pipeline.machine()?;

        if self.enabled_models().next().is_none() {
            tracing::warn!("no model has use_model=true; the sweep is empty");
        }
        Ok(())
    }

    /// Iterates enabled models in configuration order.
    pub fn enabled_models(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter().filter(|m| m.enabled)
    }

    /// Total number of benchmark invocations across all enabled models.
    pub fn sweep_size(&self) -> usize {
        self.enabled_models().map(ModelSpec::sweep_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LengthPair, ModelFamily, Precision};

    fn sample_json() -> &'static str {
        r#"{
            "LLMBenchmark": {
                "credentials": { "hf_username": "user", "hf_password": "secret" },
                "pipeline": { "base_dir": "/data/bench", "machine": "nd-h100" },
                "models": {
                    "Meta-Llama-3-8B": {
                        "type": "llama",
                        "hf_url": "https://huggingface.co/meta-llama/Meta-Llama-3-8B",
                        "use_model": true,
                        "precision": "fp8",
                        "tp_sizes": [1, 2],
                        "batch_sizes": [1, 8, 64],
                        "input_output_sizes": ["128,128", "1024,128"],
                        "warmup": 1,
                        "number_of_runs": 3
                    },
                    "Mixtral-8x7B": {
                        "type": "mixtral",
                        "hf_url": "https://huggingface.co/mistralai/Mixtral-8x7B-v0.1",
                        "use_model": false,
                        "tp_sizes": [],
                        "batch_sizes": [],
                        "input_output_sizes": []
                    }
                }
            }
        }"#
    }

    #[test]
    fn test_from_json() {
        let c = BenchConfig::from_json(sample_json()).unwrap();
        assert_eq!(c.models.len(), 2);
        let llama = c.models.get("Meta-Llama-3-8B").unwrap();
        assert_eq!(llama.precision, Precision::Fp8);
        assert_eq!(llama.family, ModelFamily::Llama);
        assert_eq!(llama.length_pairs[1], LengthPair::new(1024, 128));
        assert_eq!(llama.warmup, 1);
        assert_eq!(c.credentials.as_ref().unwrap().hf_username, "user");
        assert_eq!(c.pipeline.machine().unwrap(), "nd-h100");
        // Defaults fill in the unspecified settings.
        assert_eq!(c.pipeline.python, "python3");
        assert!(c.build_profiles.profiles.contains_key("large"));
        c.validate().unwrap();
    }

    #[test]
    fn test_missing_section() {
        let err = BenchConfig::from_json(r#"{"Other": {}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection(s) if s == CONFIG_SECTION));
    }

    #[test]
    fn test_enabled_and_sweep_size() {
        let c = BenchConfig::from_json(sample_json()).unwrap();
        let enabled: Vec<_> = c.enabled_models().map(|m| m.name.as_str()).collect();
        assert_eq!(enabled, vec!["Meta-Llama-3-8B"]);
        assert_eq!(c.sweep_size(), 2 * 3 * 2);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
[LLMBenchmark.pipeline]
base_dir = "/tmp/bench"
machine = "dev"

[LLMBenchmark.models.Qwen2-7B]
type = "qwen"
hf_url = "https://huggingface.co/Qwen/Qwen2-7B"
tp_sizes = [1]
batch_sizes = [4]
input_output_sizes = ["512,64"]

[LLMBenchmark.models.Llama-2-70B]
type = "llama"
hf_url = "https://huggingface.co/meta-llama/Llama-2-70b-hf"
tp_sizes = [4, 8]
batch_sizes = [1]
input_output_sizes = ["128,128"]
"#;
        let c = BenchConfig::from_toml(toml).unwrap();
        let names: Vec<_> = c.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Qwen2-7B", "Llama-2-70B"]);
        assert_eq!(c.pipeline.base_dir().unwrap(), Path::new("/tmp/bench"));
        c.validate().unwrap();
    }

    #[test]
    fn test_validate_requires_settings() {
        let json = sample_json().replace(
            r#""pipeline": { "base_dir": "/data/bench", "machine": "nd-h100" },"#,
            "",
        );
        let c = BenchConfig::from_json(&json).unwrap();
        assert!(matches!(c.validate(), Err(ConfigError::MissingSetting("base_dir"))));

        let c = c.with_overrides(Overrides {
            base_dir: Some("/scratch".into()),
            machine: Some("m1".into()),
            image: Some("custom:latest".into()),
        });
        c.validate().unwrap();
        assert_eq!(c.pipeline.image, "custom:latest");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, sample_json()).unwrap();
        let c = BenchConfig::load(&path).unwrap();
        assert_eq!(c.models.len(), 2);

        let missing = BenchConfig::load(&dir.path().join("absent.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_json_roundtrip_keeps_names() {
        let c = BenchConfig::from_json(sample_json()).unwrap();
        let body = serde_json::to_value(&c).unwrap();
        let wrapped = serde_json::json!({ CONFIG_SECTION: body }).to_string();
        let back = BenchConfig::from_json(&wrapped).unwrap();
        assert!(back.models.get("Mixtral-8x7B").is_some());
        assert_eq!(back.models.get("Meta-Llama-3-8B").unwrap().tp_sizes, vec![1, 2]);
    }
}
