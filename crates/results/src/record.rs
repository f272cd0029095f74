// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The tagged record protocol printed by the benchmark program.
//!
//! # Format
//! ```text
//! [BENCHMARK] model_name llama engine_dir /e world_size 2 batch_size 4 tokens_per_sec 123.4
//! ```
//! A record is a line beginning with the exact prefix `[BENCHMARK] `,
//! followed by whitespace-separated tokens read as alternating keys and
//! values. Every other line of the output is ignored.

use crate::ResultsError;

/// Prefix identifying a tagged record line (the trailing space is part of it).
pub const RECORD_TAG: &str = "[BENCHMARK] ";

/// Canonical column holding the orchestrator's model name.
pub const MODEL_NAME_KEY: &str = "model_name";

/// Key reported by the benchmark that is folded into [`MODEL_NAME_KEY`].
pub const ENGINE_DIR_KEY: &str = "engine_dir";

/// Implicit column holding the machine identifier.
pub const MACHINE_KEY: &str = "machine";

/// One parsed record: ordered `(key, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRecord {
    fields: Vec<(String, String)>,
}

impl BenchmarkRecord {
    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut record = Self { fields: Vec::new() };
        for (k, v) in pairs {
            record.upsert(k.into(), v.into());
        }
        record
    }

    /// Parses one output line. Returns `Ok(None)` for untagged lines.
    ///
    /// `line_no` is 1-based and used only for error reporting.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Self>, ResultsError> {
        let Some(rest) = line.strip_prefix(RECORD_TAG) else {
            return Ok(None);
        };

        let tokens: Vec<&str> = rest.split_whitespace().collect();
        if tokens.len() % 2 != 0 {
            return Err(ResultsError::MalformedRecord {
                line: line_no,
                tokens: tokens.len(),
                dangling: tokens.last().copied().unwrap_or_default().to_string(),
            });
        }

        Ok(Some(Self::from_pairs(
            tokens.chunks_exact(2).map(|pair| (pair[0], pair[1])),
        )))
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Replaces self-reported identity with the orchestrator's.
    ///
    /// - `model_name` and `engine_dir` become a single `model_name` column
    ///   holding `model_name` (engine paths are machine-local). A record
    ///   that reports neither gets `model_name` appended.
    /// - `machine` is set on every record.
    pub fn normalize(self, model_name: &str, machine: &str) -> Self {
        let mut normalized = Self { fields: Vec::with_capacity(self.fields.len() + 2) };
        for (key, value) in self.fields {
            if key == MODEL_NAME_KEY || key == ENGINE_DIR_KEY {
                normalized.upsert(MODEL_NAME_KEY.to_string(), model_name.to_string());
            } else {
                normalized.upsert(key, value);
            }
        }
        normalized.upsert(MODEL_NAME_KEY.to_string(), model_name.to_string());
        normalized.upsert(MACHINE_KEY.to_string(), machine.to_string());
        normalized
    }

    /// Sets `key`, keeping the position of its first occurrence.
    fn upsert(&mut self, key: String, value: String) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }
}

/// Extracts every tagged record from a program's output, in order.
///
/// Fails on the first malformed record; no partial result is returned, so
/// a bad run never contributes rows.
pub fn parse_records(output: &str) -> Result<Vec<BenchmarkRecord>, ResultsError> {
    let mut records = Vec::new();
    for (idx, line) in output.lines().enumerate() {
        if let Some(record) = BenchmarkRecord::parse_line(line, idx + 1)? {
            tracing::debug!("parsed record with {} fields from line {}", record.len(), idx + 1);
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_record() {
        let out = "[BENCHMARK] world_size 2 batch_size 4 tokens_per_sec 123.4 latency(ms) 56.7";
        let records = parse_records(out).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.get("world_size"), Some("2"));
        assert_eq!(r.get("batch_size"), Some("4"));
        assert_eq!(r.get("tokens_per_sec"), Some("123.4"));
        assert_eq!(r.get("latency(ms)"), Some("56.7"));
    }

    #[test]
    fn test_ignores_untagged_lines() {
        let out = "\
Loading engine...
 [BENCHMARK] indented 1
[BENCHMARK]
[BENCHMARK]x 1
[benchmark] lower 1
[BENCHMARK] kept 1
done";
        let records = parse_records(out).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("kept"), Some("1"));
    }

    #[test]
    fn test_multiple_records_in_order() {
        let out = "[BENCHMARK] batch_size 1 x a\nnoise\r\n[BENCHMARK] batch_size 8\r\n";
        let records = parse_records(out).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("batch_size"), Some("1"));
        assert_eq!(records[1].get("batch_size"), Some("8"));
    }

    #[test]
    fn test_odd_token_count_is_an_error() {
        let out = "ok\n[BENCHMARK] world_size 2 batch_size 4 tokens_per_sec\n";
        let err = parse_records(out).unwrap_err();
        match err {
            ResultsError::MalformedRecord { line, tokens, dangling } => {
                assert_eq!(line, 2);
                assert_eq!(tokens, 5);
                assert_eq!(dangling, "tokens_per_sec");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tag_with_no_pairs() {
        let records = parse_records("[BENCHMARK] ").unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_empty());
    }

    #[test]
    fn test_normalize_replaces_identity() {
        let r = BenchmarkRecord::from_pairs([
            ("engine_dir", "/data/engines/llama/tp_2/float16"),
            ("world_size", "2"),
        ])
        .normalize("Meta-Llama-3-8B", "nd-h100");
        assert_eq!(
            r.fields(),
            &[
                ("model_name".to_string(), "Meta-Llama-3-8B".to_string()),
                ("world_size".to_string(), "2".to_string()),
                ("machine".to_string(), "nd-h100".to_string()),
            ]
        );
    }

    #[test]
    fn test_normalize_merges_model_name_and_engine_dir() {
        let r = BenchmarkRecord::from_pairs([
            ("model_name", "llama"),
            ("engine_dir", "/e"),
            ("machine", "reported"),
        ])
        .normalize("M", "host-a");
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("model_name"), Some("M"));
        assert_eq!(r.get("machine"), Some("host-a"));
    }

    #[test]
    fn test_normalize_adds_missing_model_name() {
        let out = "[BENCHMARK] world_size 2 batch_size 4 tokens_per_sec 123.4 latency(ms) 56.7";
        let record = parse_records(out).unwrap().remove(0).normalize("llama-7b", "nd-h100");
        let keys: Vec<&str> = record.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["world_size", "batch_size", "tokens_per_sec", "latency(ms)", "model_name", "machine"]
        );
        assert_eq!(record.get("model_name"), Some("llama-7b"));
    }

    #[test]
    fn test_normalize_empty_record_gets_identity() {
        let record = parse_records("[BENCHMARK] ").unwrap().remove(0).normalize("m", "host-a");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("model_name"), Some("m"));
        assert_eq!(record.get("machine"), Some("host-a"));
    }
}
