// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model entries and their benchmark parameter grid.
//!
//! # Format
//! Models are keyed by name; map order is preserved and is the order in
//! which models are compiled and benchmarked.
//! ```json
//! "models": {
//!   "Meta-Llama-3-8B": {
//!     "type": "llama",
//!     "hf_url": "https://huggingface.co/meta-llama/Meta-Llama-3-8B",
//!     "use_model": true,
//!     "precision": "float16",
//!     "tp_sizes": [1, 2],
//!     "batch_sizes": [1, 8, 64],
//!     "input_output_sizes": ["128,128", "1024,128"],
//!     "warmup": 2,
//!     "number_of_runs": 5
//!   }
//! }
//! ```

use crate::{ConfigError, Precision};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use std::fmt;

/// Model architecture family.
///
/// Selects the conversion script directory and the per-family Python
/// environment the model's commands run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    Llama,
    Mistral,
    Mixtral,
    Qwen,
    Gemma,
    Phi,
    Falcon,
    Gpt,
}

impl ModelFamily {
    /// Returns the family label (also the environment directory name).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llama => "llama",
            Self::Mistral => "mistral",
            Self::Mixtral => "mixtral",
            Self::Qwen => "qwen",
            Self::Gemma => "gemma",
            Self::Phi => "phi",
            Self::Falcon => "falcon",
            Self::Gpt => "gpt",
        }
    }

    /// Returns the toolkit example directory holding this family's
    /// `convert_checkpoint.py`. Mistral-derived models share the llama converter.
    pub fn converter_dir(&self) -> &'static str {
        match self {
            Self::Mistral | Self::Mixtral => "llama",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(input_length, output_length)` point of the sweep.
///
/// Serialised as the string `"input,output"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LengthPair {
    pub input_len: u32,
    pub output_len: u32,
}

impl LengthPair {
    pub fn new(input_len: u32, output_len: u32) -> Self {
        Self {
            input_len,
            output_len,
        }
    }

    /// Parses `"1024,128"` (whitespace around either number is allowed).
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidLengthPair(s.to_string());
        let (input, output) = s.split_once(',').ok_or_else(invalid)?;
        let input_len = input.trim().parse().map_err(|_| invalid())?;
        let output_len = output.trim().parse().map_err(|_| invalid())?;
        if input_len == 0 || output_len == 0 {
            return Err(invalid());
        }
        Ok(Self::new(input_len, output_len))
    }
}

impl fmt::Display for LengthPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.input_len, self.output_len)
    }
}

impl TryFrom<String> for LengthPair {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<LengthPair> for String {
    fn from(p: LengthPair) -> Self {
        p.to_string()
    }
}

fn default_true() -> bool {
    true
}

fn default_precision() -> Precision {
    Precision::Float16
}

fn default_warmup() -> u32 {
    2
}

fn default_runs() -> u32 {
    5
}

/// One configured model under test.
///
/// The name is the key of the entry in the `models` map.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelSpec {
    #[serde(skip)]
    pub name: String,
    /// Architecture family.
    #[serde(rename = "type")]
    pub family: ModelFamily,
    /// Git URL of the source weights.
    #[serde(rename = "hf_url")]
    pub source_url: String,
    /// Disabled models are ignored by every stage.
    #[serde(rename = "use_model", default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_precision")]
    pub precision: Precision,
    pub tp_sizes: Vec<u32>,
    pub batch_sizes: Vec<u32>,
    #[serde(rename = "input_output_sizes")]
    pub length_pairs: Vec<LengthPair>,
    #[serde(default = "default_warmup")]
    pub warmup: u32,
    #[serde(rename = "number_of_runs", default = "default_runs")]
    pub num_runs: u32,
    /// Explicit engine build profile; overrides the parameter-count rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_profile: Option<String>,
}

impl ModelSpec {
    /// Number of benchmark invocations this model contributes to the sweep.
    pub fn sweep_size(&self) -> usize {
        self.tp_sizes.len() * self.batch_sizes.len() * self.length_pairs.len()
    }

    /// Parameter count in billions, read from a marker in the model name.
    ///
    /// Recognises name segments such as `405B`, `1.5b` and `8x7B`
    /// (mixture-of-experts, counted as the product).
    pub fn parameter_count_b(&self) -> Option<f64> {
        self.name
            .split(['-', '_', '/', ' '])
            .filter_map(parse_param_marker)
            .reduce(f64::max)
    }

    /// Checks the invariants of an enabled model's parameter grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |detail: &str| ConfigError::InvalidModel {
            model: self.name.clone(),
            detail: detail.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("model name is empty"));
        }
        if !self.enabled {
            return Ok(());
        }
        if self.tp_sizes.is_empty() {
            return Err(invalid("tp_sizes is empty"));
        }
        if self.batch_sizes.is_empty() {
            return Err(invalid("batch_sizes is empty"));
        }
        if self.length_pairs.is_empty() {
            return Err(invalid("input_output_sizes is empty"));
        }
        if self.tp_sizes.contains(&0) {
            return Err(invalid("tp_sizes must be >= 1"));
        }
        if self.batch_sizes.contains(&0) {
            return Err(invalid("batch_sizes must be >= 1"));
        }
        if self.num_runs == 0 {
            return Err(invalid("number_of_runs must be >= 1"));
        }
        Ok(())
    }
}

fn parse_param_marker(segment: &str) -> Option<f64> {
    let lower = segment.to_ascii_lowercase();
    let body = lower.strip_suffix('b')?;
    match body.split_once('x') {
        Some((experts, size)) => {
            let experts: f64 = experts.parse().ok()?;
            let size: f64 = size.parse().ok()?;
            Some(experts * size)
        }
        None => body.parse().ok(),
    }
}

/// Ordered collection of models, deserialised from a name-keyed map.
#[derive(Debug, Clone, Default)]
pub struct ModelSet(Vec<ModelSpec>);

impl ModelSet {
    pub fn new(models: Vec<ModelSpec>) -> Self {
        Self(models)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.0.iter().find(|m| m.name == name)
    }
}

impl<'a> IntoIterator for &'a ModelSet {
    type Item = &'a ModelSpec;
    type IntoIter = std::slice::Iter<'a, ModelSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl serde::Serialize for ModelSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for model in &self.0 {
            map.serialize_entry(&model.name, model)?;
        }
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for ModelSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ModelSetVisitor;

        impl<'de> Visitor<'de> for ModelSetVisitor {
            type Value = ModelSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of model name to model entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ModelSet, A::Error> {
                let mut models = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, mut spec)) = access.next_entry::<String, ModelSpec>()? {
                    spec.name = name;
                    models.push(spec);
                }
                Ok(ModelSet(models))
            }
        }

        deserializer.deserialize_map(ModelSetVisitor)
    }
}

#[cfg(test)]
pub(crate) fn sample_model(name: &str) -> ModelSpec {
    ModelSpec {
        name: name.to_string(),
        family: ModelFamily::Llama,
        source_url: format!("https://huggingface.co/meta-llama/{name}"),
        enabled: true,
        precision: Precision::Float16,
        tp_sizes: vec![1, 2],
        batch_sizes: vec![1, 8],
        length_pairs: vec![LengthPair::new(128, 128), LengthPair::new(1024, 128)],
        warmup: 2,
        num_runs: 5,
        build_profile: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_pair_parse() {
        let p = LengthPair::parse("1024,128").unwrap();
        assert_eq!(p, LengthPair::new(1024, 128));
        assert_eq!(LengthPair::parse(" 64 , 32 ").unwrap(), LengthPair::new(64, 32));
        assert_eq!(p.to_string(), "1024,128");
    }

    #[test]
    fn test_length_pair_invalid() {
        assert!(LengthPair::parse("1024").is_err());
        assert!(LengthPair::parse("a,b").is_err());
        assert!(LengthPair::parse("0,128").is_err());
        assert!(LengthPair::parse("128,-1").is_err());
    }

    #[test]
    fn test_parameter_count() {
        assert_eq!(sample_model("Meta-Llama-3.1-405B-Instruct").parameter_count_b(), Some(405.0));
        assert_eq!(sample_model("Meta-Llama-3-8B").parameter_count_b(), Some(8.0));
        assert_eq!(sample_model("Mixtral-8x7B-v0.1").parameter_count_b(), Some(56.0));
        assert_eq!(sample_model("Qwen2_1.5b").parameter_count_b(), Some(1.5));
        assert_eq!(sample_model("gpt2-medium").parameter_count_b(), None);
    }

    #[test]
    fn test_sweep_size() {
        let m = sample_model("Meta-Llama-3-8B");
        assert_eq!(m.sweep_size(), 2 * 2 * 2);
    }

    #[test]
    fn test_validate_rejects_empty_grid() {
        let mut m = sample_model("m");
        m.tp_sizes.clear();
        assert!(matches!(m.validate(), Err(ConfigError::InvalidModel { .. })));

        let mut m = sample_model("m");
        m.batch_sizes.clear();
        assert!(m.validate().is_err());

        let mut m = sample_model("m");
        m.tp_sizes = vec![0];
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_validate_ignores_disabled_grid() {
        let mut m = sample_model("m");
        m.enabled = false;
        m.tp_sizes.clear();
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_model_set_preserves_order() {
        let json = r#"{
            "zeta": {"type": "llama", "hf_url": "u", "tp_sizes": [1], "batch_sizes": [1], "input_output_sizes": ["1,1"]},
            "alpha": {"type": "qwen", "hf_url": "u", "tp_sizes": [1], "batch_sizes": [1], "input_output_sizes": ["1,1"]}
        }"#;
        let set: ModelSet = serde_json::from_str(json).unwrap();
        let names: Vec<_> = set.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(set.get("alpha").unwrap().family, ModelFamily::Qwen);
        assert!(set.get("zeta").unwrap().enabled);
        assert_eq!(set.get("zeta").unwrap().num_runs, 5);
    }

    #[test]
    fn test_converter_dir() {
        assert_eq!(ModelFamily::Mixtral.converter_dir(), "llama");
        assert_eq!(ModelFamily::Qwen.converter_dir(), "qwen");
    }
}
