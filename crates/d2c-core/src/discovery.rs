//! Discovering and matching table files across two version folders

use crate::error::Result;
use crate::table::file_name_of;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file present in both folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePair {
    /// File name as it appears in the source folder
    pub file_name: String,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// File names split by which folder has them, sorted case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListResult {
    pub common: Vec<String>,
    pub source_only: Vec<String>,
    pub target_only: Vec<String>,
}

/// Split the files of two folders into common, source-only and target-only
///
/// Names are matched ignoring case. If either folder does not exist, every
/// list is empty.
pub fn discover_files<P: AsRef<Path>, Q: AsRef<Path>>(
    source_dir: P,
    target_dir: Q,
) -> Result<FileListResult> {
    let (source_dir, target_dir) = (source_dir.as_ref(), target_dir.as_ref());
    if !source_dir.is_dir() || !target_dir.is_dir() {
        return Ok(FileListResult::default());
    }

    let source = by_lowercase_name(list_files(source_dir, |_| true)?);
    let target = by_lowercase_name(list_files(target_dir, |_| true)?);

    let mut result = FileListResult::default();
    for (key, path) in &source {
        if target.contains_key(key) {
            result.common.push(file_name_of(path));
        } else {
            result.source_only.push(file_name_of(path));
        }
    }
    result.target_only = target
        .iter()
        .filter(|(key, _)| !source.contains_key(*key))
        .map(|(_, path)| file_name_of(path))
        .collect();

    for list in [&mut result.common, &mut result.source_only, &mut result.target_only] {
        list.sort_by_key(|name| name.to_lowercase());
    }
    Ok(result)
}

/// `*.txt` files of `source_dir` paired with the same-named file of `target_dir`
///
/// Files without a counterpart are left out. Pairs are ordered by source file name.
pub fn matched_pairs<P: AsRef<Path>, Q: AsRef<Path>>(
    source_dir: P,
    target_dir: Q,
) -> Result<Vec<FilePair>> {
    let sources = list_files(source_dir.as_ref(), is_txt)?;
    let targets = by_lowercase_name(list_files(target_dir.as_ref(), is_txt)?);

    let pairs: Vec<FilePair> = sources
        .into_iter()
        .filter_map(|source| {
            let file_name = file_name_of(&source);
            let target = targets.get(&file_name.to_lowercase())?.clone();
            Some(FilePair {
                file_name,
                source,
                target,
            })
        })
        .collect();

    log::debug!(
        "matched {} file pair(s) between {} and {}",
        pairs.len(),
        source_dir.as_ref().display(),
        target_dir.as_ref().display()
    );
    Ok(pairs)
}

fn is_txt(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Regular files directly inside `dir`, sorted by name
fn list_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && keep(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Index files by lower-cased file name; the first spelling wins
fn by_lowercase_name(files: Vec<PathBuf>) -> HashMap<String, PathBuf> {
    let mut map = HashMap::with_capacity(files.len());
    for path in files {
        map.entry(file_name_of(&path).to_lowercase()).or_insert(path);
    }
    map
}
