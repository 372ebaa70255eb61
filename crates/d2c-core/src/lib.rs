//! d2c-core: Core library for comparing and converting Diablo II data tables
//!
//! This library provides functionality to:
//! - Parse tab-delimited `.txt` tables into column-oriented tables
//! - Detect added, removed and renamed columns and rows between two versions
//! - Report per-row value differences
//! - Convert one version's data into another version's column/row layout
//! - Pair up table files across two version folders

pub mod compare;
pub mod convert;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod job;
pub mod parser;
pub mod schema_fix;
pub mod table;
pub mod versions;

pub use compare::{compare_file, compare_folder, compare_tables, CompareResult, ElementKind, Rename, SchemaEntry};
pub use convert::{convert_folder, convert_tables, write_table, ConvertReport, RowConversionMode};
pub use diff::{expand_counts, grouped_differences, removed_rows, DiffGroup};
pub use discovery::{discover_files, matched_pairs, FileListResult, FilePair};
pub use error::{Error, Result};
pub use job::JobFile;
pub use parser::{parse_str, parse_table};
pub use schema_fix::is_known_rename;
pub use table::{header_union, row_header_column, Table};
pub use versions::{find_version, resolve_data_dir, VersionInfo, BUILT_IN_VERSIONS};
