// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `llm-bench report` command: print one machine's result table.

use std::path::Path;

use artifacts::ArtifactLayout;
use bench_config::Overrides;
use results::{ResultStore, ResultTable};

pub fn execute(config_path: &Path, overrides: Overrides) -> anyhow::Result<()> {
    let config = super::load_config(config_path, overrides)?;
    let layout = ArtifactLayout::new(config.pipeline.base_dir()?);
    let store = ResultStore::new(layout.results_file(config.pipeline.machine()?));

    super::banner("llm-bench · Results");
    let table = store.load()?;
    if table.is_empty() {
        println!("  No results in {}", store.path().display());
        return Ok(());
    }

    println!("  {} rows in {}", table.row_count(), store.path().display());
    println!();
    print_table(&table);
    Ok(())
}

/// Prints the table with columns padded to their widest cell.
fn print_table(table: &ResultTable) {
    let names = table.column_names();
    let rows: Vec<Vec<&str>> = (0..table.row_count())
        .filter_map(|i| table.row(i))
        .map(|cells| cells.into_iter().map(|c| c.as_str().unwrap_or("-")).collect())
        .collect();
    let widths: Vec<usize> = names
        .iter()
        .enumerate()
        .map(|(col, name)| {
            rows.iter()
                .map(|r| r[col].len())
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    print_line(names.iter().map(String::as_str), &widths);
    println!("  {}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in &rows {
        print_line(row.iter().copied(), &widths);
    }
}

fn print_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    println!("  {}", padded.join("  ").trim_end());
}
