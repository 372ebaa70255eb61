//! Schema-aware comparison of two table versions

use crate::diff::{expand_counts, grouped_differences, removed_rows, DiffGroup};
use crate::discovery::matched_pairs;
use crate::error::Result;
use crate::parser::parse_table;
use crate::schema_fix::is_known_rename;
use crate::table::{row_header_column, Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Whether a schema entry refers to a column or a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Column,
    Row,
}

impl ElementKind {
    fn tag(self) -> &'static str {
        match self {
            ElementKind::Column => "Col",
            ElementKind::Row => "Row",
        }
    }
}

/// An added or removed column or row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub kind: ElementKind,
    /// Column name or row key
    pub name: String,
    /// 1-based position in the table that owns the entry
    pub position: usize,
}

impl fmt::Display for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {}) {}", self.kind.tag(), self.position, self.name)
    }
}

/// A removed element paired with an added one as the same element renamed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub kind: ElementKind,
    /// Name in the source table
    pub old: String,
    /// Name in the target table
    pub new: String,
    /// 1-based position of the new name in the target table
    pub position: usize,
}

impl fmt::Display for Rename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.old, self.new)
    }
}

/// Structured comparison of one source/target file pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareResult {
    /// File name of the source table
    pub file_name: String,
    /// Column used as row identity, None when the tables share no column
    pub row_header: Option<String>,
    pub added_columns: Vec<SchemaEntry>,
    pub removed_columns: Vec<SchemaEntry>,
    pub changed_columns: Vec<Rename>,
    pub added_rows: Vec<SchemaEntry>,
    pub removed_rows: Vec<SchemaEntry>,
    pub changed_rows: Vec<Rename>,
    /// Value differences, one group per differing row
    pub groups: Vec<DiffGroup>,
}

impl CompareResult {
    /// Result for a pair with nothing comparable
    pub fn empty(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn has_column_changes(&self) -> bool {
        !(self.added_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.changed_columns.is_empty())
    }

    pub fn has_row_changes(&self) -> bool {
        !(self.added_rows.is_empty() && self.removed_rows.is_empty() && self.changed_rows.is_empty())
    }

    pub fn has_value_changes(&self) -> bool {
        !self.groups.is_empty()
    }

    /// No differences of any kind
    pub fn is_empty(&self) -> bool {
        !(self.has_column_changes() || self.has_row_changes() || self.has_value_changes())
    }

    /// Column renames as (old, new) pairs
    pub fn column_renames(&self) -> Vec<(String, String)> {
        self.changed_columns
            .iter()
            .map(|r| (r.old.clone(), r.new.clone()))
            .collect()
    }

    /// Row renames as (old, new) pairs
    pub fn row_renames(&self) -> Vec<(String, String)> {
        self.changed_rows
            .iter()
            .map(|r| (r.old.clone(), r.new.clone()))
            .collect()
    }
}

/// Compare two table files
pub fn compare_file<P: AsRef<Path>, Q: AsRef<Path>>(
    source_path: P,
    target_path: Q,
    include_new_rows: bool,
) -> Result<CompareResult> {
    let source = parse_table(source_path)?;
    let target = parse_table(target_path)?;
    Ok(compare_tables(&source, &target, include_new_rows))
}

/// Compare two parsed tables
///
/// Columns and rows that only exist on one side are first explained as
/// known renames. Whatever remains is paired up by position when both sides
/// have the same number left over.
pub fn compare_tables(source: &Table, target: &Table, include_new_rows: bool) -> CompareResult {
    let file_name = source.file_name();
    let Some(row_header) = row_header_column(source, target) else {
        log::debug!("{}: no common column, nothing to compare", file_name);
        return CompareResult::empty(file_name);
    };

    // Columns
    let added_columns = column_entries(target, source);
    let removed_columns = column_entries(source, target);
    let columns = pair_renames(added_columns, removed_columns, &file_name);

    // Rows
    let added_rows = row_entries(target, source, row_header);
    let removed_rows = row_entries(source, target, row_header);
    let rows = pair_renames(added_rows, removed_rows, &file_name);

    let column_renames: Vec<(String, String)> = columns
        .renamed
        .iter()
        .map(|(old, new)| (old.name.clone(), new.name.clone()))
        .collect();

    let groups = grouped_differences(source, target, row_header, &column_renames, include_new_rows);

    log::debug!(
        "{}: {} column rename(s), {} row rename(s), {} value group(s)",
        file_name,
        columns.renamed.len(),
        rows.renamed.len(),
        groups.len()
    );

    CompareResult {
        file_name,
        row_header: Some(row_header.to_string()),
        added_columns: columns.added.into_iter().map(|e| e.entry(ElementKind::Column)).collect(),
        removed_columns: columns.removed.into_iter().map(|e| e.entry(ElementKind::Column)).collect(),
        changed_columns: columns
            .renamed
            .into_iter()
            .map(|(old, new)| new.rename_from(old, ElementKind::Column))
            .collect(),
        added_rows: rows.added.into_iter().map(|e| e.entry(ElementKind::Row)).collect(),
        removed_rows: rows.removed.into_iter().map(|e| e.entry(ElementKind::Row)).collect(),
        changed_rows: rows
            .renamed
            .into_iter()
            .map(|(old, new)| new.rename_from(old, ElementKind::Row))
            .collect(),
        groups,
    }
}

/// Compare every `*.txt` file present in both directories
///
/// `on_progress` receives each file name before it is compared. Files without
/// a counterpart are skipped; the first I/O failure aborts the batch.
pub fn compare_folder<P, Q, F>(
    source_dir: P,
    target_dir: Q,
    include_new_rows: bool,
    mut on_progress: F,
) -> Result<Vec<CompareResult>>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnMut(&str),
{
    let pairs = matched_pairs(source_dir, target_dir)?;
    let mut results = Vec::with_capacity(pairs.len());

    for pair in &pairs {
        on_progress(&pair.file_name);
        results.push(compare_file(&pair.source, &pair.target, include_new_rows)?);
    }

    Ok(results)
}

/// A name with its 1-based position, before it is known to be a rename
#[derive(Debug, Clone)]
struct Element {
    name: String,
    position: usize,
}

impl Element {
    fn entry(self, kind: ElementKind) -> SchemaEntry {
        SchemaEntry {
            kind,
            name: self.name,
            position: self.position,
        }
    }

    fn rename_from(self, old: Element, kind: ElementKind) -> Rename {
        Rename {
            kind,
            old: old.name,
            new: self.name,
            position: self.position,
        }
    }
}

/// Outcome of pairing added against removed elements
struct Pairing {
    added: Vec<Element>,
    removed: Vec<Element>,
    /// (removed, added)
    renamed: Vec<(Element, Element)>,
}

fn pair_renames(added: Vec<Element>, mut removed: Vec<Element>, file: &str) -> Pairing {
    let mut renamed = Vec::new();
    let mut remaining_added = Vec::new();

    for candidate in added {
        let matched = removed
            .iter()
            .position(|old| is_known_rename(&candidate.name, &old.name, file));
        match matched {
            Some(idx) => {
                let old = removed.remove(idx);
                renamed.push((old, candidate));
            }
            None => remaining_added.push(candidate),
        }
    }

    // Same count left on both sides: assume they line up in order
    if !remaining_added.is_empty() && remaining_added.len() == removed.len() {
        log::debug!(
            "{}: pairing {} leftover name(s) by position",
            file,
            remaining_added.len()
        );
        renamed.extend(removed.drain(..).zip(remaining_added.drain(..)));
    }

    Pairing {
        added: remaining_added,
        removed,
        renamed,
    }
}

/// Columns of `table` missing from `other`, with their positions in `table`
fn column_entries(table: &Table, other: &Table) -> Vec<Element> {
    table
        .column_names()
        .enumerate()
        .filter(|(_, name)| !other.has_column(name))
        .map(|(i, name)| Element {
            name: name.to_string(),
            position: i + 1,
        })
        .collect()
}

/// Surplus row keys of `table` over `other`, with their positions in `table`
///
/// When a key is duplicated, the surplus copies are taken to be the last ones.
fn row_entries(table: &Table, other: &Table, key_column: &str) -> Vec<Element> {
    let surplus: IndexMap<String, usize> = removed_rows(table, other, key_column);

    let mut occurrences: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, key) in table.column(key_column).unwrap_or_default().iter().enumerate() {
        occurrences.entry(key.as_str()).or_default().push(i);
    }

    let mut positions: HashMap<&str, std::slice::Iter<'_, usize>> = surplus
        .iter()
        .filter_map(|(key, &count)| {
            let found = occurrences.get(key.as_str())?;
            let start = found.len().saturating_sub(count);
            Some((key.as_str(), found[start..].iter()))
        })
        .collect();

    expand_counts(&surplus)
        .into_iter()
        .map(|name| {
            let position = positions
                .get_mut(name.as_str())
                .and_then(Iterator::next)
                .map_or(0, |i| i + 1);
            Element { name, position }
        })
        .collect()
}
