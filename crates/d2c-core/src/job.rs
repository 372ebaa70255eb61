//! JSON job files describing a compare/convert run

use crate::convert::RowConversionMode;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A saved compare (and optionally convert) run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFile {
    /// Source folder, or a built-in version name
    pub source: String,
    /// Target folder, or a built-in version name
    pub target: String,
    /// Output folder; conversion only runs when this is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Base folder for built-in version names
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    #[serde(default)]
    pub include_new_rows: bool,
    /// Use the target's columns for converted files
    #[serde(default)]
    pub convert_columns: bool,
    #[serde(default)]
    pub row_mode: RowConversionMode,
}

fn default_data_root() -> PathBuf {
    PathBuf::from(".")
}

impl JobFile {
    /// Create a compare-only job
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            output: None,
            data_root: default_data_root(),
            include_new_rows: false,
            convert_columns: false,
            row_mode: RowConversionMode::None,
        }
    }

    /// Load a job file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the job file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).map_err(|e| Error::FileWrite {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_file_defaults() {
        let job: JobFile =
            serde_json::from_str(r#"{ "source": "113c", "target": "91636" }"#).unwrap();

        assert_eq!(job, JobFile::new("113c", "91636"));
        assert_eq!(job.data_root, PathBuf::from("."));
        assert_eq!(job.row_mode, RowConversionMode::None);
    }

    #[test]
    fn test_job_file_row_mode_names() {
        let job: JobFile = serde_json::from_str(
            r#"{ "source": "a", "target": "b", "output": "out",
                 "convert_columns": true, "row_mode": "append_target_at_end" }"#,
        )
        .unwrap();

        assert_eq!(job.output, Some(PathBuf::from("out")));
        assert!(job.convert_columns);
        assert_eq!(job.row_mode, RowConversionMode::AppendTargetAtEnd);
    }

    #[test]
    fn test_job_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");

        let mut job = JobFile::new("old", "new");
        job.output = Some(dir.path().join("converted"));
        job.row_mode = RowConversionMode::AppendOriginalAtEnd;
        job.save(&path).unwrap();

        assert_eq!(JobFile::load(&path).unwrap(), job);
    }

    #[test]
    fn test_job_file_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JobFile::load(&path), Err(Error::Json(_))));
    }
}
