//! Built-in catalogue of game releases and their data folders

use crate::error::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A known release whose tables live under `TXT/<folder_name>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub display_name: &'static str,
    pub folder_name: &'static str,
}

impl VersionInfo {
    const fn new(display_name: &'static str, folder_name: &'static str) -> Self {
        Self {
            display_name,
            folder_name,
        }
    }

    /// Data folder relative to the data root
    pub fn path(&self) -> PathBuf {
        Path::new("TXT").join(self.folder_name)
    }
}

pub const BUILT_IN_VERSIONS: &[VersionInfo] = &[
    VersionInfo::new("Legacy (1.13c+)", "113c"),
    VersionInfo::new("1.0.0.0 (62115)", "62115"),
    VersionInfo::new("1.4.0.0 (64954)", "64954"),
    VersionInfo::new("2.2.0.0 (65890)", "65890"),
    VersionInfo::new("2.3.0.0 (67314)", "67314"),
    VersionInfo::new("2.3.0.1 (67358)", "67358"),
    VersionInfo::new("2.3.1.0 (67554)", "67554"),
    VersionInfo::new("2.4.1.1 (68992)", "68992"),
    VersionInfo::new("2.4.1.2 (69270)", "69270"),
    VersionInfo::new("2.4.3.0 (70161)", "70161"),
    VersionInfo::new("2.5.0.0 (71336)", "71336"),
    VersionInfo::new("2.5.1.0 (71510)", "71510"),
    VersionInfo::new("2.5.2.0 (71776)", "71776"),
    VersionInfo::new("2.6.0.0 (73090)", "73090"),
    VersionInfo::new("2.7.2.0 (77312)", "77312"),
    VersionInfo::new("2.7.3.0 (80273)", "80273"),
    VersionInfo::new("2.7.4.0 (81914)", "81914"),
    VersionInfo::new("2.8.0.0 (83721)", "83721"),
    VersionInfo::new("2.9.0.0 (90471)", "90471"),
    VersionInfo::new("3.0.0.0 (91636)", "91636"),
];

/// Find a built-in version by folder name or display name, ignoring case
pub fn find_version(name: &str) -> Option<&'static VersionInfo> {
    BUILT_IN_VERSIONS.iter().find(|v| {
        v.folder_name.eq_ignore_ascii_case(name) || v.display_name.eq_ignore_ascii_case(name)
    })
}

/// Turn a folder argument into a directory
///
/// An existing directory is used as is. Otherwise the argument must name a
/// built-in version, which resolves to `<data_root>/TXT/<folder>`.
pub fn resolve_data_dir(arg: &str, data_root: &Path) -> Result<PathBuf> {
    let direct = PathBuf::from(arg);
    if direct.is_dir() {
        return Ok(direct);
    }

    let version = find_version(arg).ok_or_else(|| Error::UnknownVersion(arg.to_string()))?;
    Ok(data_root.join(version.path()))
}
