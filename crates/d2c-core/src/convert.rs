//! Re-projecting one table version onto another version's layout
//!
//! This module provides:
//! - Row merge strategies for combining source and target row sets
//! - Cell resolution that follows detected column and row renames
//! - Tab-delimited export of converted tables

use crate::compare::{compare_tables, CompareResult};
use crate::diff::first_indices;
use crate::discovery::matched_pairs;
use crate::error::{Error, Result};
use crate::parser::parse_table;
use crate::table::{row_header_column, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How source and target rows are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowConversionMode {
    /// Keep the source rows as they are
    #[default]
    None,
    /// Target rows, then source-only rows
    AppendOriginalAtEnd,
    /// Source rows, then target-only rows
    AppendTargetAtEnd,
}

impl fmt::Display for RowConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowConversionMode::None => "none",
            RowConversionMode::AppendOriginalAtEnd => "append_original_at_end",
            RowConversionMode::AppendTargetAtEnd => "append_target_at_end",
        };
        f.write_str(name)
    }
}

impl FromStr for RowConversionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(RowConversionMode::None),
            "append_original_at_end" => Ok(RowConversionMode::AppendOriginalAtEnd),
            "append_target_at_end" => Ok(RowConversionMode::AppendTargetAtEnd),
            other => Err(format!("unknown row mode '{}'", other)),
        }
    }
}

/// Files produced by a folder conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertReport {
    /// Files that were written
    pub files_written: Vec<PathBuf>,
    /// Matched files skipped because the pair shares no column
    pub skipped: Vec<String>,
}

/// Convert every `*.txt` file present in both folders and write the results
///
/// `convert_columns` selects the target's columns instead of the source's.
/// The output folder is created if needed. Files without a counterpart are
/// ignored; the first I/O failure aborts the batch.
pub fn convert_folder<F>(
    source_dir: &Path,
    target_dir: &Path,
    output_dir: &Path,
    convert_columns: bool,
    row_mode: RowConversionMode,
    mut on_progress: F,
) -> Result<ConvertReport>
where
    F: FnMut(&str),
{
    fs::create_dir_all(output_dir).map_err(|e| Error::FileWrite {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = ConvertReport::default();
    for pair in matched_pairs(source_dir, target_dir)? {
        on_progress(&pair.file_name);

        let source = parse_table(&pair.source)?;
        let target = parse_table(&pair.target)?;
        let comparison = compare_tables(&source, &target, true);

        let Some(converted) =
            convert_tables(&source, &target, &comparison, convert_columns, row_mode)
        else {
            log::debug!("{}: no common column, skipped", pair.file_name);
            report.skipped.push(pair.file_name);
            continue;
        };

        let output_path = output_dir.join(&pair.file_name);
        write_table(&converted, &output_path)?;
        report.files_written.push(output_path);
    }

    log::info!(
        "converted {} file(s) into {}",
        report.files_written.len(),
        output_dir.display()
    );
    Ok(report)
}

/// Build the converted table for one pair
///
/// Returns None when the tables share no column to align rows on.
pub fn convert_tables(
    source: &Table,
    target: &Table,
    comparison: &CompareResult,
    convert_columns: bool,
    row_mode: RowConversionMode,
) -> Option<Table> {
    let key_column = row_header_column(source, target)?;
    let source_keys = source.column(key_column)?;
    let target_keys = target.column(key_column)?;

    let column_renames = comparison.column_renames();
    let row_renames = comparison.row_renames();
    let columns = RenameMap::new(&column_renames);
    let rows = RenameMap::new(&row_renames);

    let source_rows = first_indices(source_keys);
    let target_rows = first_indices(target_keys);

    let mut output_rows = output_row_keys(row_mode, source_keys, target_keys, &rows);
    if row_mode != RowConversionMode::None {
        output_rows = order_by_version_tier(output_rows, source, target, &source_rows, &target_rows);
    }

    let layout = if convert_columns { target } else { source };
    let mut output = Table::new(PathBuf::from(source.file_name()));

    // Output column -> (source column, target column)
    let resolved: Vec<(&str, Option<&[String]>, Option<&[String]>)> = layout
        .column_names()
        .map(|name| {
            let from_source = resolve(name, source, columns.new_to_old.get(name).copied());
            let from_target = resolve(name, target, columns.old_to_new.get(name).copied());
            (
                name,
                from_source.and_then(|c| source.column(c)),
                from_target.and_then(|c| target.column(c)),
            )
        })
        .collect();

    for (name, _, _) in &resolved {
        output
            .columns
            .insert(name.to_string(), Vec::with_capacity(output_rows.len()));
    }

    for key in &output_rows {
        let source_row = resolve_row(key, &source_rows, rows.new_to_old.get(key).copied());
        let target_row = resolve_row(key, &target_rows, rows.old_to_new.get(key).copied());

        for (name, source_values, target_values) in &resolved {
            let mut value = cell_at(*source_values, source_row);
            if value.is_empty() {
                value = cell_at(*target_values, target_row);
            }

            if let Some(values) = output.columns.get_mut(*name) {
                values.push(value.to_string());
            }
        }
    }

    Some(output)
}

/// Write a table as tab-delimited text: header line, then one line per row
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let write_err = |e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    let header: Vec<&str> = table.column_names().collect();
    writeln!(writer, "{}", header.join("\t")).map_err(write_err)?;

    for row in 0..table.row_count() {
        let cells: Vec<&str> = table
            .columns
            .values()
            .map(|values| values.get(row).map_or("", String::as_str))
            .collect();
        writeln!(writer, "{}", cells.join("\t")).map_err(write_err)?;
    }

    writer.flush().map_err(write_err)
}

/// Renames in both directions; the first pair for a name wins
struct RenameMap<'a> {
    old_to_new: HashMap<&'a str, &'a str>,
    new_to_old: HashMap<&'a str, &'a str>,
}

impl<'a> RenameMap<'a> {
    fn new(pairs: &'a [(String, String)]) -> Self {
        let mut old_to_new = HashMap::new();
        let mut new_to_old = HashMap::new();
        for (old, new) in pairs {
            old_to_new.entry(old.as_str()).or_insert(new.as_str());
            new_to_old.entry(new.as_str()).or_insert(old.as_str());
        }
        Self {
            old_to_new,
            new_to_old,
        }
    }
}

/// Column of `table` holding `name`, directly or under its renamed name
fn resolve<'t>(name: &'t str, table: &Table, renamed: Option<&'t str>) -> Option<&'t str> {
    if table.has_column(name) {
        return Some(name);
    }
    renamed.filter(|r| table.has_column(r))
}

fn cell_at(values: Option<&[String]>, row: Option<usize>) -> &str {
    match (values, row) {
        (Some(values), Some(row)) => values.get(row).map_or("", String::as_str),
        _ => "",
    }
}

fn resolve_row(key: &str, index: &HashMap<&str, usize>, renamed: Option<&str>) -> Option<usize> {
    index
        .get(key)
        .or_else(|| renamed.and_then(|r| index.get(r)))
        .copied()
}

fn output_row_keys<'a>(
    row_mode: RowConversionMode,
    source_keys: &'a [String],
    target_keys: &'a [String],
    rows: &RenameMap<'_>,
) -> Vec<&'a str> {
    let as_str = |keys: &'a [String]| keys.iter().map(String::as_str);

    match row_mode {
        RowConversionMode::None => as_str(source_keys).collect(),
        RowConversionMode::AppendOriginalAtEnd => {
            let in_target: std::collections::HashSet<&str> = as_str(target_keys).collect();
            let source_only = as_str(source_keys)
                .filter(|key| !in_target.contains(key) && !rows.old_to_new.contains_key(key));
            as_str(target_keys).chain(source_only).collect()
        }
        RowConversionMode::AppendTargetAtEnd => {
            let in_source: std::collections::HashSet<&str> = as_str(source_keys).collect();
            let target_only = as_str(target_keys)
                .filter(|key| !in_source.contains(key) && !rows.new_to_old.contains_key(key));
            as_str(source_keys).chain(target_only).collect()
        }
    }
}

/// Stable reorder into tiers: version "0", the "Expansion" row, version "100", the rest
///
/// The version column name is found in the source first, then the target,
/// ignoring case, and that exact name is read from both. Without one the
/// order is left alone.
fn order_by_version_tier<'a>(
    mut keys: Vec<&'a str>,
    source: &Table,
    target: &Table,
    source_rows: &HashMap<&str, usize>,
    target_rows: &HashMap<&str, usize>,
) -> Vec<&'a str> {
    let Some(version_column) = source
        .find_column_ci("version")
        .or_else(|| target.find_column_ci("version"))
    else {
        return keys;
    };
    let source_version = source.column(version_column);
    let target_version = target.column(version_column);

    let tier = |key: &str| -> u8 {
        if key.eq_ignore_ascii_case("Expansion") {
            return 1;
        }
        let version = version_at(source_version, source_rows, key)
            .or_else(|| version_at(target_version, target_rows, key))
            .unwrap_or("");
        match version {
            "0" => 0,
            "100" => 2,
            _ => 3,
        }
    };

    keys.sort_by_key(|key| tier(*key));
    keys
}

fn version_at<'t>(
    values: Option<&'t [String]>,
    rows: &HashMap<&str, usize>,
    key: &str,
) -> Option<&'t str> {
    let row = *rows.get(key)?;
    values?.get(row).map(|v| v.trim())
}
