//! Core table type for representing tab-delimited data tables

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A parsed table from a single tab-delimited file
///
/// Column-oriented: each column name maps to its cell values, one per row.
/// Column order is the header order of the source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column name -> cell values
    pub columns: IndexMap<String, Vec<String>>,
    /// Source file path
    pub source_path: PathBuf,
}

impl Table {
    /// Create a new empty table
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            columns: IndexMap::new(),
            source_path,
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map_or(0, Vec::len)
    }

    /// Check whether a column exists (exact name match)
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get the values of a column by name
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Column names in header order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// 0-based position of a column in header order
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// Find a column name ignoring ASCII case
    pub fn find_column_ci(&self, name: &str) -> Option<&str> {
        self.column_names().find(|c| c.eq_ignore_ascii_case(name))
    }

    /// First row whose value in `key_column` equals `key`
    pub fn row_index(&self, key_column: &str, key: &str) -> Option<usize> {
        self.column(key_column)?.iter().position(|v| v == key)
    }

    /// Get a single cell
    pub fn cell(&self, column: &str, row: usize) -> Option<&str> {
        self.column(column)?.get(row).map(String::as_str)
    }

    /// File name of the source path, used to label results
    pub fn file_name(&self) -> String {
        file_name_of(&self.source_path)
    }
}

/// Column whose values identify rows across two tables
///
/// This is the first name of the ordered header union (source columns, then
/// target-only columns) that both tables have. Target-only columns can never
/// qualify, so the scan reduces to the source header.
pub fn row_header_column<'a>(source: &'a Table, target: &Table) -> Option<&'a str> {
    source.column_names().find(|name| target.has_column(name))
}

/// Ordered union of both headers: source columns, then target-only columns
pub fn header_union<'a>(source: &'a Table, target: &'a Table) -> Vec<&'a str> {
    let mut headers: Vec<&str> = source.column_names().collect();
    headers.extend(target.column_names().filter(|name| !source.has_column(name)));
    headers
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn test_row_and_column_counts() {
        let table = parse_str("Id\tName\n1\ta\n2\tb\n3\tc\n", "t.txt").unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(Table::default().row_count(), 0);
    }

    #[test]
    fn test_row_index_first_match() {
        let table = parse_str("Id\tName\n1\ta\n2\tb\n3\ta\n", "t.txt").unwrap();
        assert_eq!(table.row_index("Name", "a"), Some(0));
        assert_eq!(table.row_index("Name", "b"), Some(1));
        assert_eq!(table.row_index("Name", "z"), None);
        assert_eq!(table.row_index("Missing", "a"), None);
    }

    #[test]
    fn test_find_column_ci() {
        let table = parse_str("Name\tVersion\n", "t.txt").unwrap();
        assert_eq!(table.find_column_ci("version"), Some("Version"));
        assert_eq!(table.find_column_ci("VERSION"), Some("Version"));
        assert_eq!(table.find_column_ci("ver"), None);
    }

    #[test]
    fn test_row_header_column_first_common() {
        let source = parse_str("*comment\tName\tA\n", "s.txt").unwrap();
        let target = parse_str("B\tA\tName\n", "t.txt").unwrap();
        assert_eq!(row_header_column(&source, &target), Some("Name"));

        let unrelated = parse_str("X\tY\n", "u.txt").unwrap();
        assert_eq!(row_header_column(&source, &unrelated), None);
    }

    #[test]
    fn test_header_union_order() {
        let source = parse_str("Id\tVal\tOld\n", "s.txt").unwrap();
        let target = parse_str("New\tId\tVal\tExtra\n", "t.txt").unwrap();
        assert_eq!(
            header_union(&source, &target),
            vec!["Id", "Val", "Old", "New", "Extra"]
        );
    }
}
