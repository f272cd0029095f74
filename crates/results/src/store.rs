// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Durable CSV storage for the [`ResultTable`].
//!
//! The first line holds the column names, each following line one row.
//! Absent cells are written as empty fields. Writes go to a temporary
//! file in the same directory which is synced and then renamed over the
//! store, so an interrupted write leaves the previous table intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::table::{Cell, ResultTable};
use crate::ResultsError;

/// A result table persisted at a fixed path.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored table. A missing or empty file is an empty table.
    pub fn load(&self) -> Result<ResultTable, ResultsError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no result store yet");
                return Ok(ResultTable::new());
            }
            Err(e) => return Err(self.io_err(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ResultTable::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes.as_slice());

        let names: Vec<String> = reader
            .headers()
            .map_err(|e| self.csv_err(e))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];

        for row in reader.records() {
            let row = row.map_err(|e| self.csv_err(e))?;
            for (column, field) in columns.iter_mut().zip(row.iter()) {
                column.push(if field.is_empty() {
                    Cell::Absent
                } else {
                    Cell::Value(field.to_string())
                });
            }
        }

        let table = ResultTable::from_columns(names.into_iter().zip(columns).collect())?;
        debug!(
            path = %self.path.display(),
            rows = table.row_count(),
            columns = table.column_names().len(),
            "loaded result store"
        );
        Ok(table)
    }

    /// Atomically replaces the stored table with `table`.
    pub fn persist(&self, table: &ResultTable) -> Result<(), ResultsError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| self.io_err(e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| self.io_err(e))?;
        if !table.column_names().is_empty() {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            writer
                .write_record(table.column_names())
                .map_err(|e| self.csv_err(e))?;
            for i in 0..table.row_count() {
                let cells = table.row(i).unwrap_or_default();
                writer
                    .write_record(cells.iter().map(|c| c.as_str().unwrap_or("")))
                    .map_err(|e| self.csv_err(e))?;
            }
            writer.flush().map_err(|e| self.io_err(e))?;
        }
        tmp.as_file_mut().flush().map_err(|e| self.io_err(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;

        debug!(
            path = %self.path.display(),
            rows = table.row_count(),
            "persisted result store"
        );
        Ok(())
    }

    fn io_err(&self, source: std::io::Error) -> ResultsError {
        ResultsError::StoreIo {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn csv_err(&self, source: csv::Error) -> ResultsError {
        ResultsError::Store {
            path: self.path.display().to_string(),
            source,
        }
    }
}
