// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine build capacity profiles.
//!
//! The engine builder needs capacity flags sized for the model. Most models
//! share one flag set; very large models need a smaller batch ceiling and
//! paged context attention to fit. Rather than matching model names in the
//! command builder, the choice is a lookup in this table:
//!
//! 1. A model's explicit `build_profile` wins.
//! 2. Otherwise the rule with the highest `min_params_b` not exceeding the
//!    model's parameter-count marker selects the profile.
//! 3. Otherwise the `default` profile applies.
//!
//! # TOML Format
//! ```toml
//! [LLMBenchmark.build_profiles.profiles.default]
//! max_batch_size = 1024
//! max_num_tokens = 1048576
//! max_input_len = 1048576
//! max_seq_len = 1152
//! gemm_plugin = "auto"
//!
//! [[LLMBenchmark.build_profiles.rules]]
//! min_params_b = 400.0
//! profile = "large"
//! ```

use crate::{ConfigError, ModelSpec};
use std::collections::BTreeMap;

/// Name of the profile used when no rule matches.
pub const DEFAULT_PROFILE: &str = "default";

/// Capacity flags for one engine build.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BuildProfile {
    pub max_batch_size: u32,
    pub max_num_tokens: u64,
    pub max_input_len: u64,
    pub max_seq_len: u64,
    /// Value of `--gemm_plugin`, omitted when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemm_plugin: Option<String>,
    /// Emits `--use_paged_context_fmha enable`.
    #[serde(default)]
    pub paged_context_fmha: bool,
    /// Fixed builder worker count; `None` uses the tensor-parallel size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<u32>,
}

impl BuildProfile {
    /// Resolves the `--workers` value for a tensor-parallel size.
    pub fn workers_for(&self, tp_size: u32) -> u32 {
        self.workers.unwrap_or(tp_size)
    }
}

/// Maps a parameter-count threshold to a profile name.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfileRule {
    /// Minimum parameter count, in billions, for this rule to apply.
    pub min_params_b: f64,
    pub profile: String,
}

/// The named profiles and the rules selecting between them.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BuildProfileTable {
    pub profiles: BTreeMap<String, BuildProfile>,
    pub rules: Vec<ProfileRule>,
}

impl Default for BuildProfileTable {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        // --max_seq_len covers the longest sweep point (1024 in + 128 out);
        // --max_num_tokens is max_batch_size * max_input_len.
        profiles.insert(
            DEFAULT_PROFILE.to_string(),
            BuildProfile {
                max_batch_size: 1024,
                max_num_tokens: 1_048_576,
                max_input_len: 1_048_576,
                max_seq_len: 1152,
                gemm_plugin: Some("auto".to_string()),
                paged_context_fmha: false,
                workers: None,
            },
        );
        profiles.insert(
            "large".to_string(),
            BuildProfile {
                max_batch_size: 256,
                max_num_tokens: 262_144,
                max_input_len: 262_144,
                max_seq_len: 1152,
                gemm_plugin: None,
                paged_context_fmha: true,
                workers: Some(8),
            },
        );

        Self {
            profiles,
            rules: vec![ProfileRule {
                min_params_b: 400.0,
                profile: "large".to_string(),
            }],
        }
    }
}

impl BuildProfileTable {
    /// Selects the profile for a model. Returns the profile name and flags.
    pub fn resolve(&self, model: &ModelSpec) -> Result<(&str, &BuildProfile), ConfigError> {
        let name = match &model.build_profile {
            Some(explicit) => explicit.as_str(),
            None => self.rule_for(model.parameter_count_b()),
        };
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    fn rule_for(&self, params_b: Option<f64>) -> &str {
        let Some(params_b) = params_b else {
            return DEFAULT_PROFILE;
        };
        self.rules
            .iter()
            .filter(|r| params_b >= r.min_params_b)
            .max_by(|a, b| a.min_params_b.total_cmp(&b.min_params_b))
            .map(|r| r.profile.as_str())
            .unwrap_or(DEFAULT_PROFILE)
    }

    /// Checks that every referenced profile exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.profiles.contains_key(DEFAULT_PROFILE) {
            return Err(ConfigError::UnknownProfile(DEFAULT_PROFILE.to_string()));
        }
        for rule in &self.rules {
            if !self.profiles.contains_key(&rule.profile) {
                return Err(ConfigError::UnknownProfile(rule.profile.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_model;

    #[test]
    fn test_default_profile_for_small_model() {
        let table = BuildProfileTable::default();
        let (name, profile) = table.resolve(&sample_model("Meta-Llama-3-8B")).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.max_batch_size, 1024);
        assert_eq!(profile.workers_for(4), 4);
        assert!(!profile.paged_context_fmha);
    }

    #[test]
    fn test_large_profile_for_405b() {
        let table = BuildProfileTable::default();
        let (name, profile) = table
            .resolve(&sample_model("Meta-Llama-3.1-405B-Instruct"))
            .unwrap();
        assert_eq!(name, "large");
        assert_eq!(profile.max_batch_size, 256);
        assert!(profile.paged_context_fmha);
        assert_eq!(profile.workers_for(2), 8);
    }

    #[test]
    fn test_unmarked_name_uses_default() {
        let table = BuildProfileTable::default();
        let (name, _) = table.resolve(&sample_model("gpt2-medium")).unwrap();
        assert_eq!(name, "default");
    }

    #[test]
    fn test_explicit_profile_wins() {
        let table = BuildProfileTable::default();
        let mut m = sample_model("Meta-Llama-3-8B");
        m.build_profile = Some("large".into());
        assert_eq!(table.resolve(&m).unwrap().0, "large");

        m.build_profile = Some("missing".into());
        assert!(matches!(table.resolve(&m), Err(ConfigError::UnknownProfile(_))));
    }

    #[test]
    fn test_highest_matching_rule() {
        let mut table = BuildProfileTable::default();
        table.profiles.insert("medium".into(), table.profiles["default"].clone());
        table.rules.push(ProfileRule {
            min_params_b: 60.0,
            profile: "medium".into(),
        });
        assert_eq!(table.resolve(&sample_model("Llama-2-70B")).unwrap().0, "medium");
        assert_eq!(table.resolve(&sample_model("Llama-3.1-405B")).unwrap().0, "large");
    }

    #[test]
    fn test_validate_rule_target() {
        let mut table = BuildProfileTable::default();
        assert!(table.validate().is_ok());
        table.rules.push(ProfileRule {
            min_params_b: 1.0,
            profile: "nope".into(),
        });
        assert!(table.validate().is_err());
    }
}
