// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! GPU telemetry summaries.
//!
//! The telemetry log is the CSV written by an external sampler
//! (`nvidia-smi --query-gpu=... --format=csv`), one file per model. Values
//! carry unit suffixes (`"34567 MiB"`, `"250.12 W"`); only the leading
//! numeric token of each value is used. Samples whose GPU utilization is
//! zero are treated as idle and excluded from every aggregate.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::ResultsError;

pub const UTILIZATION_COLUMN: &str = "utilization.gpu [%]";
pub const MEMORY_USED_COLUMN: &str = "memory.used [MiB]";
pub const MEMORY_TOTAL_COLUMN: &str = "memory.total [MiB]";
pub const SM_CLOCK_COLUMN: &str = "clocks.current.sm [MHz]";
pub const POWER_DRAW_COLUMN: &str = "power.draw [W]";
pub const POWER_LIMIT_COLUMN: &str = "enforced.power.limit [W]";

/// Aggregates over the non-idle samples of one telemetry log.
///
/// Every field is `0.0` when no sample contributed a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySummary {
    /// Well-formed rows read from the log.
    pub samples: usize,
    /// Rows excluded because utilization was zero.
    pub idle_samples: usize,
    pub max_memory_mib: f64,
    pub avg_memory_mib: f64,
    pub total_memory_mib: f64,
    pub max_sm_clock_mhz: f64,
    pub avg_sm_clock_mhz: f64,
    pub max_power_w: f64,
    pub avg_power_w: f64,
    pub power_limit_w: f64,
}

#[derive(Default)]
struct Series(Vec<f64>);

impl Series {
    fn push(&mut self, raw: Option<&str>) {
        match raw.and_then(leading_number) {
            Some(v) => self.0.push(v),
            None => debug!(value = ?raw, "skipping unparsable telemetry value"),
        }
    }

    fn max(&self) -> f64 {
        self.0.iter().copied().reduce(f64::max).unwrap_or(0.0)
    }

    fn mean(&self) -> f64 {
        if self.0.is_empty() {
            0.0
        } else {
            self.0.iter().sum::<f64>() / self.0.len() as f64
        }
    }
}

fn leading_number(value: &str) -> Option<f64> {
    value.split_whitespace().next()?.parse::<f64>().ok()
}

impl TelemetrySummary {
    /// Reads and summarizes the log at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ResultsError> {
        let file = File::open(path).map_err(|e| ResultsError::Telemetry {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Summarizes a log from any reader. `origin` names it in errors.
    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self, ResultsError> {
        let telemetry_err = |detail: String| ResultsError::Telemetry {
            path: origin.to_string(),
            detail,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(|e| telemetry_err(e.to_string()))?.clone();
        let index = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| telemetry_err(format!("missing column '{name}'")))
        };
        let util = index(UTILIZATION_COLUMN)?;
        let mem_used = index(MEMORY_USED_COLUMN)?;
        let mem_total = index(MEMORY_TOTAL_COLUMN)?;
        let clock = index(SM_CLOCK_COLUMN)?;
        let power = index(POWER_DRAW_COLUMN)?;
        let limit = index(POWER_LIMIT_COLUMN)?;

        let mut summary = Self::default();
        let mut used = Series::default();
        let mut total = Series::default();
        let mut clocks = Series::default();
        let mut draw = Series::default();
        let mut limits = Series::default();

        for row in reader.records() {
            let row = match row {
                Ok(row) if row.len() == headers.len() => row,
                Ok(row) => {
                    debug!(fields = row.len(), "skipping malformed telemetry row");
                    continue;
                }
                Err(e) => {
                    debug!(error = %e, "skipping unreadable telemetry row");
                    continue;
                }
            };
            summary.samples += 1;

            if row.get(util).and_then(leading_number) == Some(0.0) {
                summary.idle_samples += 1;
                continue;
            }
            used.push(row.get(mem_used));
            total.push(row.get(mem_total));
            clocks.push(row.get(clock));
            draw.push(row.get(power));
            limits.push(row.get(limit));
        }

        summary.max_memory_mib = used.max();
        summary.avg_memory_mib = used.mean();
        summary.total_memory_mib = total.max();
        summary.max_sm_clock_mhz = clocks.max();
        summary.avg_sm_clock_mhz = clocks.mean();
        summary.max_power_w = draw.max();
        summary.avg_power_w = draw.mean();
        summary.power_limit_w = limits.max();
        Ok(summary)
    }

    /// Number of samples that contributed to the aggregates.
    pub fn active_samples(&self) -> usize {
        self.samples - self.idle_samples
    }

    /// One-line summary for logs and CLI output.
    ///
    /// # Example output
    /// ```text
    /// Memory 61234.0/81559.0 MiB (avg 58000.5), SM clock 1980.0 MHz (avg 1850.2), Power 690.3/700.0 W (avg 512.7), 118/120 active samples
    /// ```
    pub fn summary(&self) -> String {
        format!(
            "Memory {:.1}/{:.1} MiB (avg {:.1}), SM clock {:.1} MHz (avg {:.1}), \
             Power {:.1}/{:.1} W (avg {:.1}), {}/{} active samples",
            self.max_memory_mib,
            self.total_memory_mib,
            self.avg_memory_mib,
            self.max_sm_clock_mhz,
            self.avg_sm_clock_mhz,
            self.max_power_w,
            self.power_limit_w,
            self.avg_power_w,
            self.active_samples(),
            self.samples,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "timestamp, utilization.gpu [%], memory.used [MiB], memory.total [MiB], \
                          clocks.current.sm [MHz], power.draw [W], enforced.power.limit [W]";

    fn summarize(rows: &[&str]) -> TelemetrySummary {
        let text = std::iter::once(HEADER)
            .chain(rows.iter().copied())
            .collect::<Vec<_>>()
            .join("\n");
        TelemetrySummary::from_reader(text.as_bytes(), "test").unwrap()
    }

    #[test]
    fn test_summary_filters_idle() {
        let s = summarize(&[
            "t0, 0 %, 500 MiB, 81559 MiB, 210 MHz, 60.00 W, 700.00 W",
            "t1, 95 %, 60000 MiB, 81559 MiB, 1980 MHz, 650.00 W, 700.00 W",
            "t2, 80 %, 40000 MiB, 81559 MiB, 1800 MHz, 450.00 W, 700.00 W",
        ]);
        assert_eq!(s.samples, 3);
        assert_eq!(s.idle_samples, 1);
        assert_eq!(s.active_samples(), 2);
        assert_eq!(s.max_memory_mib, 60000.0);
        assert_eq!(s.avg_memory_mib, 50000.0);
        assert_eq!(s.total_memory_mib, 81559.0);
        assert_eq!(s.max_sm_clock_mhz, 1980.0);
        assert_eq!(s.avg_sm_clock_mhz, 1890.0);
        assert_eq!(s.max_power_w, 650.0);
        assert_eq!(s.avg_power_w, 550.0);
        assert_eq!(s.power_limit_w, 700.0);
    }

    #[test]
    fn test_all_idle_yields_zero() {
        let s = summarize(&[
            "t0, 0 %, 500 MiB, 81559 MiB, 210 MHz, 60.00 W, 700.00 W",
            "t1, 0 %, 500 MiB, 81559 MiB, 210 MHz, 60.00 W, 700.00 W",
        ]);
        assert_eq!(s.idle_samples, 2);
        assert_eq!(s.avg_memory_mib, 0.0);
        assert_eq!(s.avg_power_w, 0.0);
        assert_eq!(s.max_sm_clock_mhz, 0.0);
        assert!(s.summary().contains("0/2 active samples"));
    }

    #[test]
    fn test_empty_log() {
        let s = summarize(&[]);
        assert_eq!(s, TelemetrySummary::default());
    }

    #[test]
    fn test_unparsable_values_skipped() {
        let s = summarize(&[
            "t0, 90 %, [N/A], 81559 MiB, 1000 MHz, [N/A], 700.00 W",
            "t1, 90 %, 100 MiB, 81559 MiB, 2000 MHz, 300.00 W, 700.00 W",
        ]);
        assert_eq!(s.avg_memory_mib, 100.0);
        assert_eq!(s.avg_power_w, 300.0);
        assert_eq!(s.avg_sm_clock_mhz, 1500.0);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let s = summarize(&[
            "t0, 90 %, 100 MiB",
            "t1, 90 %, 100 MiB, 81559 MiB, 2000 MHz, 300.00 W, 700.00 W",
        ]);
        assert_eq!(s.samples, 1);
        assert_eq!(s.max_memory_mib, 100.0);
    }

    #[test]
    fn test_missing_column_is_error() {
        let err = TelemetrySummary::from_reader("a, b\n1, 2\n".as_bytes(), "x").unwrap_err();
        assert!(matches!(err, ResultsError::Telemetry { .. }));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TelemetrySummary::from_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, ResultsError::Telemetry { .. }));
    }
}
