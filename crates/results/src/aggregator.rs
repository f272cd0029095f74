// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Merges parsed benchmark output into the durable result table.

use std::fmt;

use tracing::{debug, info};

use crate::record::parse_records;
use crate::store::ResultStore;
use crate::table::ResultTable;
use crate::ResultsError;

/// Single writer of one machine's result store.
///
/// The table is loaded once when the aggregator is opened and every
/// appended record is persisted before the next one is applied.
#[derive(Debug)]
pub struct ResultAggregator {
    store: ResultStore,
    machine: String,
    table: ResultTable,
}

/// Outcome of ingesting one benchmark output.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub rows_appended: usize,
    /// Summary of the last appended row, if any row was appended.
    pub summary: Option<RunSummary>,
}

impl ResultAggregator {
    /// Opens the store, loading whatever it already holds.
    pub fn open(store: ResultStore, machine: impl Into<String>) -> Result<Self, ResultsError> {
        let table = store.load()?;
        let machine = machine.into();
        info!(
            path = %store.path().display(),
            machine = %machine,
            existing_rows = table.row_count(),
            "opened result store"
        );
        Ok(Self {
            store,
            machine,
            table,
        })
    }

    /// Parses `output` and appends one row per tagged record.
    ///
    /// The whole output is parsed before anything is appended: a malformed
    /// record leaves both the in-memory and the stored table untouched.
    pub fn ingest(&mut self, output: &str, model_name: &str) -> Result<IngestReport, ResultsError> {
        let records = parse_records(output)?;
        debug!(model = model_name, records = records.len(), "parsed benchmark output");

        let rows_appended = records.len();
        for record in records {
            let record = record.normalize(model_name, &self.machine);
            self.table.append_record(record.fields());
            self.store.persist(&self.table)?;
        }

        let summary = (rows_appended > 0).then(|| RunSummary::from_latest(&self.table));
        Ok(IngestReport {
            rows_appended,
            summary,
        })
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn machine(&self) -> &str {
        &self.machine
    }
}

/// The headline numbers of the most recent benchmark row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub model_name: Option<String>,
    pub input_length: Option<String>,
    pub output_length: Option<String>,
    pub world_size: Option<String>,
    pub batch_size: Option<String>,
    pub tokens_per_sec: Option<String>,
    pub latency_ms: Option<String>,
}

impl RunSummary {
    pub fn from_latest(table: &ResultTable) -> Self {
        let latest = |name: &str| table.latest(name).map(str::to_string);
        Self {
            model_name: latest("model_name"),
            input_length: latest("input_length"),
            output_length: latest("output_length"),
            world_size: latest("world_size"),
            batch_size: latest("batch_size"),
            tokens_per_sec: latest("tokens_per_sec"),
            latency_ms: latest("latency(ms)"),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        let lengths = format!("{}; {}", show(&self.input_length), show(&self.output_length));
        let rows = [
            ("Model", show(&self.model_name)),
            ("Input/Output lengths", lengths),
            ("World size (TP)", show(&self.world_size)),
            ("Batch size", show(&self.batch_size)),
            ("Throughput (tokens/sec)", show(&self.tokens_per_sec)),
            ("Latency (ms)", show(&self.latency_ms)),
        ];
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (i, (label, value)) in rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{label:<width$}  {value}")?;
        }
        Ok(())
    }
}
