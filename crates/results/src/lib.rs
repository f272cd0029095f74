// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # results
//!
//! Turns benchmark program output into durable, column-oriented results.
//!
//! - [`parse_records`] extracts `[BENCHMARK] k v k v ...` lines.
//! - [`ResultTable`] grows columns on demand and back-fills
//!   [`Cell::Absent`], keeping every column the same length.
//! - [`ResultStore`] persists the table as CSV with atomic replacement.
//! - [`ResultAggregator`] is the single writer of one machine's store.
//! - [`TelemetrySummary`] aggregates a per-model GPU telemetry log.
//!
//! # Example
//! ```no_run
//! use results::{ResultAggregator, ResultStore};
//!
//! let store = ResultStore::new("/data/Outputs/LLMBenchmark_h100.csv");
//! let mut agg = ResultAggregator::open(store, "h100")?;
//! let report = agg.ingest("[BENCHMARK] batch_size 4 tokens_per_sec 99.0", "llama-7b")?;
//! if let Some(summary) = report.summary {
//!     println!("{summary}");
//! }
//! # Ok::<(), results::ResultsError>(())
//! ```

mod aggregator;
mod error;
mod record;
mod store;
mod table;
mod telemetry;

pub use aggregator::{IngestReport, ResultAggregator, RunSummary};
pub use error::ResultsError;
pub use record::{parse_records, BenchmarkRecord, ENGINE_DIR_KEY, MACHINE_KEY, MODEL_NAME_KEY, RECORD_TAG};
pub use store::ResultStore;
pub use table::{Cell, ResultTable};
pub use telemetry::{
    TelemetrySummary, MEMORY_TOTAL_COLUMN, MEMORY_USED_COLUMN, POWER_DRAW_COLUMN,
    POWER_LIMIT_COLUMN, SM_CLOCK_COLUMN, UTILIZATION_COLUMN,
};
