// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The column-oriented result table.
//!
//! Columns are the union of every key any record has ever carried. A key
//! seen for the first time creates a column back-filled with
//! [`Cell::Absent`] for earlier rows; a row that lacks an existing column
//! gets `Absent` there. Every column therefore always has exactly
//! `row_count()` cells. Rows are identified only by append order.

use crate::ResultsError;

/// One cell of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// The row's record did not carry this column.
    Absent,
    Value(String),
}

impl Cell {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::Value(v) => Some(v),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Accumulated benchmark results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    names: Vec<String>,
    columns: Vec<Vec<Cell>>,
    rows: usize,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from named columns, which must all have equal length.
    pub fn from_columns(columns: Vec<(String, Vec<Cell>)>) -> Result<Self, ResultsError> {
        let rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut table = Self {
            rows,
            ..Self::default()
        };
        for (name, cells) in columns {
            if cells.len() != rows {
                return Err(ResultsError::InconsistentTable {
                    column: name,
                    expected: rows,
                    found: cells.len(),
                });
            }
            table.names.push(name);
            table.columns.push(cells);
        }
        Ok(table)
    }

    /// Appends one row. Keys not yet in the table become new columns.
    ///
    /// If a key repeats within `fields`, the last value wins.
    pub fn append_record<K: AsRef<str>, V: AsRef<str>>(&mut self, fields: &[(K, V)]) {
        let mut row: Vec<Cell> = vec![Cell::Absent; self.names.len()];
        for (key, value) in fields {
            let idx = match self.column_index(key.as_ref()) {
                Some(idx) => idx,
                None => {
                    self.names.push(key.as_ref().to_string());
                    self.columns.push(vec![Cell::Absent; self.rows]);
                    row.push(Cell::Absent);
                    self.names.len() - 1
                }
            };
            row[idx] = Cell::Value(value.as_ref().to_string());
        }

        for (column, cell) in self.columns.iter_mut().zip(row) {
            column.push(cell);
        }
        self.rows += 1;
        debug_assert!(self.columns.iter().all(|c| c.len() == self.rows));
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in creation order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.column_index(name).map(|i| self.columns[i].as_slice())
    }

    /// Value of `name` in `row`, or `None` if absent or out of range.
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        self.column(name)?.get(row)?.as_str()
    }

    /// Value of `name` in the most recently appended row.
    pub fn latest(&self, name: &str) -> Option<&str> {
        self.get(self.rows.checked_sub(1)?, name)
    }

    /// Cells of one row, in column order.
    pub fn row(&self, row: usize) -> Option<Vec<&Cell>> {
        if row >= self.rows {
            return None;
        }
        Some(self.columns.iter().map(|c| &c[row]).collect())
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
