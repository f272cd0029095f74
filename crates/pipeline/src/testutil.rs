// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared fixtures for unit tests.

use bench_config::BenchConfig;

/// Three enabled models and one disabled one, rooted at `base`.
pub(crate) fn sample_config(base: &str) -> BenchConfig {
    let json = format!(
        r#"{{
            "LLMBenchmark": {{
                "credentials": {{ "hf_username": "user", "hf_password": "hunter2" }},
                "pipeline": {{ "base_dir": "{base}", "machine": "nd-h100" }},
                "models": {{
                    "llama-7b": {{
                        "type": "llama",
                        "hf_url": "https://huggingface.co/meta-llama/Llama-2-7b-hf",
                        "tp_sizes": [1, 2],
                        "batch_sizes": [1, 8],
                        "input_output_sizes": ["128,128", "1024,128"]
                    }},
                    "mistral-fp8": {{
                        "type": "mistral",
                        "hf_url": "https://huggingface.co/mistralai/Mistral-7B-v0.1",
                        "precision": "fp8",
                        "tp_sizes": [2],
                        "batch_sizes": [4],
                        "input_output_sizes": ["512,64"]
                    }},
                    "llama-405B": {{
                        "type": "llama",
                        "hf_url": "https://huggingface.co/meta-llama/Llama-3.1-405B",
                        "tp_sizes": [8],
                        "batch_sizes": [1],
                        "input_output_sizes": ["128,128"]
                    }},
                    "gemma-2b": {{
                        "type": "gemma",
                        "hf_url": "https://huggingface.co/google/gemma-2b",
                        "use_model": false,
                        "tp_sizes": [1],
                        "batch_sizes": [1],
                        "input_output_sizes": ["128,128"]
                    }}
                }}
            }}
        }}"#
    );
    BenchConfig::from_json(&json).unwrap()
}
