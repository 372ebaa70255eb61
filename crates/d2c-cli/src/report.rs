//! Plain-text rendering of comparison results

use d2c_core::{CompareResult, FileListResult};
use std::fmt::Display;

/// Column changes: renames first, then additions, then removals
pub fn column_lines(result: &CompareResult, batch: bool) -> Vec<String> {
    if batch && !result.has_column_changes() {
        return Vec::new();
    }
    change_lines(
        result,
        batch,
        &result.changed_columns,
        &result.added_columns,
        &result.removed_columns,
    )
}

/// Row changes: renames first, then additions, then removals
pub fn row_lines(result: &CompareResult, batch: bool) -> Vec<String> {
    if batch && !result.has_row_changes() {
        return Vec::new();
    }
    change_lines(
        result,
        batch,
        &result.changed_rows,
        &result.added_rows,
        &result.removed_rows,
    )
}

/// Value changes grouped by row, a blank line after each group
pub fn value_lines(result: &CompareResult, batch: bool) -> Vec<String> {
    if batch && !result.has_value_changes() {
        return Vec::new();
    }

    let pad = if batch { " " } else { "" };
    let mut lines = Vec::new();
    if batch {
        lines.push(result.file_name.clone());
    }

    for group in &result.groups {
        let marker = if group.is_new { " [new]" } else { "" };
        lines.push(format!("{}{}{}", pad, group.label(), marker));
        for change in &group.changes {
            lines.push(format!("{}- {}", pad, change));
        }
        lines.push(String::new());
    }
    lines
}

/// Files that exist in only one of the folders
pub fn file_list_lines(files: &FileListResult) -> Vec<String> {
    let removed = files.source_only.iter().map(|f| format!("Removed: {}", f));
    let added = files.target_only.iter().map(|f| format!("Added: {}", f));
    removed.chain(added).collect()
}

/// Full report over one or more results, one section per kind of change
pub fn render(results: &[CompareResult]) -> String {
    let batch = results.len() > 1;
    let mut out = String::new();

    let sections: [(&str, fn(&CompareResult, bool) -> Vec<String>); 3] = [
        ("Columns", column_lines),
        ("Rows", row_lines),
        ("Values", value_lines),
    ];

    for (title, lines_of) in sections {
        out.push_str(&format!("== {} ==\n", title));
        for result in results {
            for line in lines_of(result, batch) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out
}

fn change_lines<R: Display, E: Display>(
    result: &CompareResult,
    batch: bool,
    changed: &[R],
    added: &[E],
    removed: &[E],
) -> Vec<String> {
    let pad = if batch { " " } else { "" };
    let mut lines = Vec::new();
    if batch {
        lines.push(result.file_name.clone());
    }

    lines.extend(changed.iter().map(|c| format!("{}Changed: {}", pad, c)));
    lines.extend(added.iter().map(|a| format!("{}Added: {}", pad, a)));
    lines.extend(removed.iter().map(|r| format!("{}Removed: {}", pad, r)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use d2c_core::{compare_tables, parse_str};

    fn sample() -> CompareResult {
        let source = parse_str("Id\tName\tVal\tGone\n1\tA\t10\tx\n2\tB\t20\ty\n", "data.txt").unwrap();
        let target = parse_str("Id\tName\tVal\n1\tA\t10\n2\tB\t99\n3\tC\t5\n", "data.txt").unwrap();
        compare_tables(&source, &target, true)
    }

    #[test]
    fn test_column_lines_single() {
        let lines = column_lines(&sample(), false);
        assert_eq!(lines, vec!["Removed: (Col 4) Gone"]);
    }

    #[test]
    fn test_row_lines_batch_has_file_header() {
        let lines = row_lines(&sample(), true);
        assert_eq!(lines, vec!["data.txt", " Added: (Row 3) 3"]);
    }

    #[test]
    fn test_value_lines() {
        let lines = value_lines(&sample(), false);
        assert_eq!(
            lines,
            vec![
                "(Row 2) 2",
                "- Val: '20' -> '99'",
                "",
                "(Row 3) 3 [new]",
                "- Id: '3'",
                "- Name: 'C'",
                "- Val: '5'",
                "",
            ]
        );
    }

    #[test]
    fn test_batch_skips_unchanged_files() {
        let t = parse_str("Id\n1\n", "same.txt").unwrap();
        let result = compare_tables(&t, &t, false);
        assert!(column_lines(&result, true).is_empty());
        assert!(value_lines(&result, true).is_empty());
    }

    #[test]
    fn test_file_list_lines() {
        let files = FileListResult {
            common: vec!["a.txt".into()],
            source_only: vec!["old.txt".into()],
            target_only: vec!["new.txt".into()],
        };
        assert_eq!(file_list_lines(&files), vec!["Removed: old.txt", "Added: new.txt"]);
    }

    #[test]
    fn test_render_sections() {
        let text = render(&[sample()]);
        assert!(text.starts_with("== Columns ==\nRemoved: (Col 4) Gone\n"));
        assert!(text.contains("== Rows ==\nAdded: (Row 3) 3\n"));
        assert!(text.contains("== Values ==\n(Row 2) 2\n"));
    }
}
