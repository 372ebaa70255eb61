//! Tab-delimited parser for data table files

use crate::error::{Error, Result};
use crate::table::Table;
use csv::ByteRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse a tab-delimited file into a Table
///
/// The first line is the header. Every later line is a row, blank lines
/// included; rows shorter than the header are padded with empty strings.
/// An empty file yields an empty table.
pub fn parse_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let content = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    read_table(&content, path.to_path_buf())
}

/// Parse tab-delimited text from a string (useful for testing)
pub fn parse_str(content: &str, source_name: &str) -> Result<Table> {
    read_table(content.as_bytes(), PathBuf::from(source_name))
}

/// Lines of `content` split on `\n`; a final terminator does not start a new line
fn line_is_blank(content: &[u8]) -> Vec<bool> {
    let mut lines: Vec<bool> = content.split(|b| *b == b'\n').map(<[u8]>::is_empty).collect();
    if content.is_empty() || content.ends_with(b"\n") {
        lines.pop();
    }
    lines
}

fn read_table(content: &[u8], path: PathBuf) -> Result<Table> {
    // No quoting: tab is the only delimiter and quotes are literal text.
    // The reader skips empty lines, so each record lines up with the next
    // non-blank line and blank lines are filled back in from `line_is_blank`.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::Any(b'\n'))
        .quoting(false)
        .has_headers(false)
        .flexible(true) // Allow varying number of fields
        .from_reader(content);

    let mut table = Table::new(path);
    let lines = line_is_blank(content);
    let Some((&header_blank, data_lines)) = lines.split_first() else {
        return Ok(table);
    };

    let mut records = reader.byte_records();
    let mut next_record = |table: &Table| -> Result<ByteRecord> {
        match records.next() {
            Some(Ok(record)) => Ok(record),
            Some(Err(e)) => Err(Error::Csv {
                path: table.source_path.clone(),
                source: e,
            }),
            None => Ok(ByteRecord::new()),
        }
    };

    let headers: Vec<String> = if header_blank {
        vec![String::new()]
    } else {
        let record = next_record(&table)?;
        (0..record.len()).map(|pos| field(&record, pos)).collect()
    };

    // Header position -> owning column, or None for a repeated name
    let mut slots: Vec<Option<usize>> = Vec::with_capacity(headers.len());
    for name in &headers {
        if table.columns.contains_key(name) {
            log::warn!(
                "duplicate column '{}' in {}, keeping the first one",
                name,
                table.source_path.display()
            );
            slots.push(None);
        } else {
            slots.push(Some(table.columns.len()));
            table.columns.insert(name.clone(), Vec::new());
        }
    }

    let mut padded = 0usize;
    for (row_idx, &blank) in data_lines.iter().enumerate() {
        let record = if blank {
            ByteRecord::new()
        } else {
            next_record(&table)?
        };

        if record.len() < headers.len() {
            padded += 1;
        } else if record.len() > headers.len() {
            log::warn!(
                "row {} in {} has more cells than columns, truncating",
                row_idx + 1,
                table.source_path.display()
            );
        }

        for (pos, slot) in slots.iter().enumerate() {
            let Some(col) = *slot else { continue };
            let value = field(&record, pos);
            if let Some((_, values)) = table.columns.get_index_mut(col) {
                values.push(value);
            }
        }
    }

    if padded > 0 {
        log::warn!(
            "padded {} short row(s) in {}",
            padded,
            table.source_path.display()
        );
    }

    Ok(table)
}

/// Cell `pos` of `record`, empty when missing, without a trailing `\r`
fn field(record: &ByteRecord, pos: usize) -> String {
    let Some(mut value) = record.get(pos) else {
        return String::new();
    };
    if pos + 1 == record.len() {
        value = value.strip_suffix(b"\r").unwrap_or(value);
    }
    String::from_utf8_lossy(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let table = parse_str("Id\tName\tValue\n1\tfoo\t100\n2\tbar\t200\n", "test.txt").unwrap();

        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["Id", "Name", "Value"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell("Name", 1), Some("bar"));
        assert_eq!(table.cell("Value", 0), Some("100"));
    }

    #[test]
    fn test_parse_pads_short_rows() {
        let table = parse_str("Id\tName\tValue\n1\tfoo\n2\n", "test.txt").unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell("Value", 0), Some(""));
        assert_eq!(table.cell("Name", 1), Some(""));
        assert_eq!(table.cell("Value", 1), Some(""));
    }

    #[test]
    fn test_parse_truncates_long_rows() {
        let table = parse_str("Id\tName\n1\tfoo\textra\n", "test.txt").unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell("Name", 0), Some("foo"));
    }

    #[test]
    fn test_parse_empty_input() {
        let table = parse_str("", "empty.txt").unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_parse_keeps_quotes_and_commas() {
        let table = parse_str("Name\tText\n\"a\"\tx, y\n", "test.txt").unwrap();
        assert_eq!(table.cell("Name", 0), Some("\"a\""));
        assert_eq!(table.cell("Text", 0), Some("x, y"));
    }

    #[test]
    fn test_parse_crlf_lines() {
        let table = parse_str("Id\tName\r\n1\tfoo\r\n2\tbar\r\n", "test.txt").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell("Name", 0), Some("foo"));
        assert!(table.has_column("Name"));
    }

    #[test]
    fn test_parse_empty_cells_preserved() {
        let table = parse_str("Id\tName\tValue\n1\t\t100\n", "test.txt").unwrap();
        assert_eq!(table.cell("Name", 0), Some(""));
        assert_eq!(table.cell("Value", 0), Some("100"));
    }

    #[test]
    fn test_parse_duplicate_header_keeps_first() {
        let table = parse_str("Id\tName\tName\n1\tfirst\tsecond\n", "test.txt").unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell("Name", 0), Some("first"));
    }

    #[test]
    fn test_parse_blank_line_is_empty_row() {
        let table = parse_str("Id\tV\n1\ta\n\n2\tb\n", "test.txt").unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column("Id").unwrap(), ["1", "", "2"]);
        assert_eq!(table.cell("V", 1), Some(""));
        assert_eq!(table.row_index("Id", "2"), Some(2));
    }

    #[test]
    fn test_parse_trailing_blank_lines() {
        let table = parse_str("Id\r\n1\r\n\r\n\n", "test.txt").unwrap();
        assert_eq!(table.column("Id").unwrap(), ["1", "", ""]);
    }

    #[test]
    fn test_parse_blank_first_line_is_header() {
        let table = parse_str("\nId\tV\n1\t2\n", "test.txt").unwrap();

        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec![""]);
        assert_eq!(table.column("").unwrap(), ["Id", "1"]);
    }

    #[test]
    fn test_parse_no_final_newline() {
        let table = parse_str("Id\tV\n1\ta", "test.txt").unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell("V", 0), Some("a"));
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_table("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
