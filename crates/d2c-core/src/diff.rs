//! Row-count and value-level differences between two aligned tables

use crate::table::{header_union, Table};
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field-level changes found for one row key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffGroup {
    /// 1-based display row (lower of the two row positions)
    pub row: usize,
    /// Row key from the row-header column
    pub key: String,
    /// Changes in combined header order, `header: 'old' -> 'new'` or `header: 'value'`
    pub changes: Vec<String>,
    /// The row exists only in the target table
    pub is_new: bool,
}

impl DiffGroup {
    /// Display label, e.g. `(Row 42) Amazon`
    pub fn label(&self) -> String {
        format!("(Row {}) {}", self.row, self.key)
    }
}

/// Row keys of `first` not balanced out by `second`, with their surplus counts
///
/// Bag difference: a key seen twice in `first` and once in `second` is
/// reported once. Keys keep the order in which `first` first lists them.
pub fn removed_rows(first: &Table, second: &Table, key_column: &str) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for key in first.column(key_column).unwrap_or_default() {
        *counts.entry(key.clone()).or_insert(0) += 1;
    }

    for key in second.column(key_column).unwrap_or_default() {
        if let Some(count) = counts.get_mut(key) {
            *count = count.saturating_sub(1);
        }
    }

    counts.retain(|_, count| *count > 0);
    counts
}

/// Flatten a key -> count bag into `count` copies of each key
pub fn expand_counts(counts: &IndexMap<String, usize>) -> Vec<String> {
    counts
        .iter()
        .flat_map(|(key, &count)| std::iter::repeat(key.clone()).take(count))
        .collect()
}

/// A column compared between the two tables
struct ComparedColumn<'a> {
    label: &'a str,
    source: &'a [String],
    target: &'a [String],
}

/// Value differences for every row key found in either table
///
/// Rows present in both tables are compared on every column both tables
/// share, plus each `(old, new)` pair in `column_renames` (reported under the
/// new name). Target-only rows are listed in full when `include_new_rows` is
/// set; source-only rows never produce a group.
///
/// Rows are diffed in parallel. The result is sorted by display row, then
/// key, so it does not depend on scheduling.
pub fn grouped_differences(
    source: &Table,
    target: &Table,
    key_column: &str,
    column_renames: &[(String, String)],
    include_new_rows: bool,
) -> Vec<DiffGroup> {
    let (Some(source_keys), Some(target_keys)) =
        (source.column(key_column), target.column(key_column))
    else {
        return Vec::new();
    };

    let renamed_from: HashMap<&str, &str> = column_renames
        .iter()
        .map(|(old, new)| (new.as_str(), old.as_str()))
        .collect();

    let headers = header_union(source, target);

    let compared: Vec<ComparedColumn> = headers
        .iter()
        .filter_map(|&label| {
            let target_values = target.column(label)?;
            let source_values = source
                .column(label)
                .or_else(|| renamed_from.get(label).and_then(|old| source.column(old)))?;
            Some(ComparedColumn {
                label,
                source: source_values,
                target: target_values,
            })
        })
        .collect();

    let target_columns: Vec<(&str, &[String])> = headers
        .iter()
        .filter_map(|&label| target.column(label).map(|values| (label, values)))
        .collect();

    let source_index = first_indices(source_keys);
    let target_index = first_indices(target_keys);

    let all_keys: IndexSet<&str> = source_keys
        .iter()
        .chain(target_keys.iter())
        .map(String::as_str)
        .collect();
    let all_keys: Vec<&str> = all_keys.into_iter().collect();

    let mut groups: Vec<DiffGroup> = all_keys
        .par_iter()
        .filter_map(|&key| {
            match (source_index.get(key), target_index.get(key)) {
                (Some(&src), Some(&tgt)) => {
                    let changes: Vec<String> = compared
                        .iter()
                        .filter_map(|col| {
                            let before = col.source.get(src).map_or("", String::as_str);
                            let after = col.target.get(tgt).map_or("", String::as_str);
                            (before != after)
                                .then(|| format!("{}: '{}' -> '{}'", col.label, before, after))
                        })
                        .collect();

                    (!changes.is_empty()).then(|| DiffGroup {
                        row: src.min(tgt) + 1,
                        key: key.to_string(),
                        changes,
                        is_new: false,
                    })
                }
                (None, Some(&tgt)) if include_new_rows => {
                    let changes: Vec<String> = target_columns
                        .iter()
                        .map(|(label, values)| {
                            let value = values.get(tgt).map_or("", String::as_str);
                            format!("{}: '{}'", label, value)
                        })
                        .collect();

                    Some(DiffGroup {
                        row: tgt + 1,
                        key: key.to_string(),
                        changes,
                        is_new: true,
                    })
                }
                _ => None,
            }
        })
        .collect();

    groups.sort_by(|a, b| a.row.cmp(&b.row).then_with(|| a.key.cmp(&b.key)));
    log::trace!(
        "{} value group(s) between {} and {}",
        groups.len(),
        source.source_path.display(),
        target.source_path.display()
    );
    groups
}

/// Key -> first row index holding it
pub(crate) fn first_indices(keys: &[String]) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        index.entry(key.as_str()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn table(content: &str) -> Table {
        parse_str(content, "test.txt").unwrap()
    }

    #[test]
    fn test_removed_rows_counts_duplicates() {
        let source = table("Name\nX\nX\nY\n");
        let target = table("Name\nX\nY\n");

        let removed = removed_rows(&source, &target, "Name");
        assert_eq!(removed.get("X"), Some(&1));
        assert_eq!(removed.get("Y"), None);
        assert_eq!(removed.len(), 1);
    }

    #[test]
    fn test_removed_rows_balanced_duplicates() {
        let source = table("Name\nX\nX\n");
        let target = table("Name\nX\nX\n");
        assert!(removed_rows(&source, &target, "Name").is_empty());
    }

    #[test]
    fn test_removed_rows_extra_in_second_ignored() {
        let source = table("Name\nX\n");
        let target = table("Name\nX\nX\nX\nZ\n");
        assert!(removed_rows(&source, &target, "Name").is_empty());
    }

    #[test]
    fn test_expand_counts_keeps_first_encounter_order() {
        let source = table("Name\nB\nA\nB\nC\nB\n");
        let target = table("Name\nC\n");

        let removed = removed_rows(&source, &target, "Name");
        assert_eq!(expand_counts(&removed), vec!["B", "B", "B", "A"]);
    }

    #[test]
    fn test_grouped_differences_changed_value() {
        let source = table("Name\tLevel\tSpeed\na\t1\t5\nb\t2\t6\n");
        let target = table("Name\tLevel\tSpeed\na\t1\t5\nb\t3\t7\n");

        let groups = grouped_differences(&source, &target, "Name", &[], false);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label(), "(Row 2) b");
        assert_eq!(
            groups[0].changes,
            vec!["Level: '2' -> '3'", "Speed: '6' -> '7'"]
        );
        assert!(!groups[0].is_new);
    }

    #[test]
    fn test_grouped_differences_sorted_by_row() {
        let source = table("Name\tV\na\t1\nb\t1\nc\t1\nd\t1\n");
        let target = table("Name\tV\na\t1\nb\t2\nc\t1\nd\t2\n");

        let groups = grouped_differences(&source, &target, "Name", &[], false);
        let rows: Vec<usize> = groups.iter().map(|g| g.row).collect();
        assert_eq!(rows, vec![2, 4]);
    }

    #[test]
    fn test_grouped_differences_uses_lower_row() {
        let source = table("Name\tV\nx\t0\ny\t0\nz\t1\n");
        let target = table("Name\tV\nz\t2\n");

        let groups = grouped_differences(&source, &target, "Name", &[], false);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].row, 1);
        assert_eq!(groups[0].key, "z");
    }

    #[test]
    fn test_grouped_differences_new_rows() {
        let source = table("Name\tV\na\t1\n");
        let target = table("Name\tV\tW\na\t1\t\nb\t2\t9\n");

        let without = grouped_differences(&source, &target, "Name", &[], false);
        assert!(without.is_empty());

        let with = grouped_differences(&source, &target, "Name", &[], true);
        assert_eq!(with.len(), 1);
        assert!(with[0].is_new);
        assert_eq!(with[0].label(), "(Row 2) b");
        assert_eq!(with[0].changes, vec!["Name: 'b'", "V: '2'", "W: '9'"]);
    }

    #[test]
    fn test_grouped_differences_ignores_source_only_rows() {
        let source = table("Name\tV\na\t1\ngone\t5\n");
        let target = table("Name\tV\na\t1\n");
        assert!(grouped_differences(&source, &target, "Name", &[], true).is_empty());
    }

    #[test]
    fn test_grouped_differences_follow_column_renames() {
        let source = table("Id\tName\tVal\n1\tA\t10\n2\tB\t20\n");
        let target = table("Id\tName\tVal2\n1\tA\t10\n2\tB\t99\n");

        let plain = grouped_differences(&source, &target, "Id", &[], false);
        assert!(plain.is_empty());

        let renames = vec![("Val".to_string(), "Val2".to_string())];
        let groups = grouped_differences(&source, &target, "Id", &renames, false);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label(), "(Row 2) 2");
        assert_eq!(groups[0].changes, vec!["Val2: '20' -> '99'"]);
    }

    #[test]
    fn test_grouped_differences_column_order_follows_header_union() {
        let source = table("Name\tB\tA\nr\t1\t1\n");
        let target = table("Name\tA\tB\nr\t2\t2\n");

        let groups = grouped_differences(&source, &target, "Name", &[], false);
        assert_eq!(groups[0].changes, vec!["B: '1' -> '2'", "A: '1' -> '2'"]);
    }

    #[test]
    fn test_grouped_differences_deterministic() {
        let mut source = String::from("Name\tV\n");
        let mut target = String::from("Name\tV\n");
        for i in 0..500 {
            source.push_str(&format!("row{i}\t{i}\n"));
            target.push_str(&format!("row{i}\t{}\n", i + i % 3));
        }
        let source = table(&source);
        let target = table(&target);

        let first = grouped_differences(&source, &target, "Name", &[], true);
        let second = grouped_differences(&source, &target, "Name", &[], true);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].row < w[1].row));
    }
}
