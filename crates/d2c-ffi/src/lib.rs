//! C FFI bindings for d2c-core
//!
//! Results cross the boundary as JSON strings owned by Rust. Every string
//! returned here must be released with `d2c_free_string`. When a call fails
//! it returns null (or -1) and the message is available from `d2c_last_error`.

use d2c_core::RowConversionMode;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::ptr;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(message: impl Into<String>) {
    let message = message.into();
    log::error!("{}", message);
    let c_message = CString::new(message.replace('\0', " ")).ok();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = c_message);
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Read a required path argument
///
/// # Safety
/// `ptr` must be null or a valid NUL-terminated C string.
unsafe fn path_arg(ptr: *const c_char, name: &str) -> Option<PathBuf> {
    if ptr.is_null() {
        set_last_error(format!("{} is null", name));
        return None;
    }
    match CStr::from_ptr(ptr).to_str() {
        Ok(s) => Some(PathBuf::from(s)),
        Err(_) => {
            set_last_error(format!("{} is not valid UTF-8", name));
            None
        }
    }
}

fn json_out<T: serde::Serialize>(value: d2c_core::Result<T>) -> *mut c_char {
    let json = value.and_then(|v| serde_json::to_string(&v).map_err(d2c_core::Error::from));
    match json {
        Ok(text) => match CString::new(text) {
            Ok(s) => s.into_raw(),
            Err(e) => {
                set_last_error(e.to_string());
                ptr::null_mut()
            }
        },
        Err(e) => {
            set_last_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Compare two table files
///
/// Returns the comparison as a JSON object.
///
/// # Safety
/// - `source` and `target` must be valid C strings
/// - Returns null on error
/// - Caller must free the returned string with `d2c_free_string`
#[no_mangle]
pub unsafe extern "C" fn d2c_compare_file(
    source: *const c_char,
    target: *const c_char,
    include_new_rows: bool,
) -> *mut c_char {
    clear_last_error();
    let (Some(source), Some(target)) = (path_arg(source, "source"), path_arg(target, "target"))
    else {
        return ptr::null_mut();
    };
    json_out(d2c_core::compare_file(&source, &target, include_new_rows))
}

/// Compare every table present in both folders
///
/// Returns a JSON array with one comparison per matched file.
///
/// # Safety
/// - `source_dir` and `target_dir` must be valid C strings
/// - Returns null on error
/// - Caller must free the returned string with `d2c_free_string`
#[no_mangle]
pub unsafe extern "C" fn d2c_compare_folder(
    source_dir: *const c_char,
    target_dir: *const c_char,
    include_new_rows: bool,
) -> *mut c_char {
    clear_last_error();
    let (Some(source), Some(target)) = (
        path_arg(source_dir, "source_dir"),
        path_arg(target_dir, "target_dir"),
    ) else {
        return ptr::null_mut();
    };
    json_out(d2c_core::compare_folder(&source, &target, include_new_rows, |name| {
        log::debug!("comparing {}", name)
    }))
}

/// List the files common to both folders and those unique to each
///
/// # Safety
/// - `source_dir` and `target_dir` must be valid C strings
/// - Returns null on error
/// - Caller must free the returned string with `d2c_free_string`
#[no_mangle]
pub unsafe extern "C" fn d2c_discover_files(
    source_dir: *const c_char,
    target_dir: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let (Some(source), Some(target)) = (
        path_arg(source_dir, "source_dir"),
        path_arg(target_dir, "target_dir"),
    ) else {
        return ptr::null_mut();
    };
    json_out(d2c_core::discover_files(&source, &target))
}

/// Convert source tables toward the target's layout and write them to `output_dir`
///
/// `row_mode` is one of `none`, `append_original_at_end` or
/// `append_target_at_end`; null means `none`.
///
/// # Safety
/// - `source_dir`, `target_dir` and `output_dir` must be valid C strings
/// - `row_mode` must be null or a valid C string
/// - Returns the number of files written, or -1 on error
#[no_mangle]
pub unsafe extern "C" fn d2c_convert_folder(
    source_dir: *const c_char,
    target_dir: *const c_char,
    output_dir: *const c_char,
    convert_columns: bool,
    row_mode: *const c_char,
) -> i32 {
    clear_last_error();
    let (Some(source), Some(target), Some(output)) = (
        path_arg(source_dir, "source_dir"),
        path_arg(target_dir, "target_dir"),
        path_arg(output_dir, "output_dir"),
    ) else {
        return -1;
    };

    let mode = if row_mode.is_null() {
        RowConversionMode::None
    } else {
        let parsed = CStr::from_ptr(row_mode)
            .to_str()
            .map_err(|e| e.to_string())
            .and_then(|s| s.parse::<RowConversionMode>());
        match parsed {
            Ok(mode) => mode,
            Err(e) => {
                set_last_error(e);
                return -1;
            }
        }
    };

    convert(&source, &target, &output, convert_columns, mode)
}

fn convert(
    source: &Path,
    target: &Path,
    output: &Path,
    convert_columns: bool,
    mode: RowConversionMode,
) -> i32 {
    match d2c_core::convert_folder(source, target, output, convert_columns, mode, |name| {
        log::debug!("converting {}", name)
    }) {
        Ok(report) => i32::try_from(report.files_written.len()).unwrap_or(i32::MAX),
        Err(e) => {
            set_last_error(e.to_string());
            -1
        }
    }
}

/// Get the message of the last failed call on this thread
///
/// # Safety
/// - Returns null when the last call succeeded
/// - Caller must free the returned string with `d2c_free_string`
#[no_mangle]
pub unsafe extern "C" fn d2c_last_error() -> *mut c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|s| s.clone().into_raw())
            .unwrap_or(ptr::null_mut())
    })
}

/// Free a string returned by this library
///
/// # Safety
/// - `s` must be a valid pointer returned by a `d2c_*` function or null
#[no_mangle]
pub unsafe extern "C" fn d2c_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    unsafe fn take(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let text = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        d2c_free_string(ptr);
        text
    }

    fn folders() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("old")).unwrap();
        fs::create_dir(dir.path().join("new")).unwrap();
        fs::write(dir.path().join("old/data.txt"), "Id\tVal\n1\t10\n").unwrap();
        fs::write(dir.path().join("new/data.txt"), "Id\tVal\n1\t20\n2\t5\n").unwrap();
        fs::write(dir.path().join("old/gone.txt"), "Id\n1\n").unwrap();
        dir
    }

    #[test]
    fn test_compare_file_json() {
        let dir = folders();
        let source = c(dir.path().join("old/data.txt").to_str().unwrap());
        let target = c(dir.path().join("new/data.txt").to_str().unwrap());

        let json = unsafe { take(d2c_compare_file(source.as_ptr(), target.as_ptr(), false)) };
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["file_name"], "data.txt");
        assert_eq!(value["groups"][0]["changes"][0], "Val: '10' -> '20'");
    }

    #[test]
    fn test_discover_files_json() {
        let dir = folders();
        let source = c(dir.path().join("old").to_str().unwrap());
        let target = c(dir.path().join("new").to_str().unwrap());

        let json = unsafe { take(d2c_discover_files(source.as_ptr(), target.as_ptr())) };
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["common"][0], "data.txt");
        assert_eq!(value["source_only"][0], "gone.txt");
    }

    #[test]
    fn test_convert_folder_counts_files() {
        let dir = folders();
        let source = c(dir.path().join("old").to_str().unwrap());
        let target = c(dir.path().join("new").to_str().unwrap());
        let output = c(dir.path().join("out").to_str().unwrap());
        let mode = c("append-target-at-end");

        let written = unsafe {
            d2c_convert_folder(
                source.as_ptr(),
                target.as_ptr(),
                output.as_ptr(),
                false,
                mode.as_ptr(),
            )
        };

        assert_eq!(written, 1);
        let text = fs::read_to_string(dir.path().join("out/data.txt")).unwrap();
        assert_eq!(text, "Id\tVal\n1\t10\n2\t5\n");
    }

    #[test]
    fn test_null_argument_sets_last_error() {
        let target = c("anything");
        let result = unsafe { d2c_compare_file(ptr::null(), target.as_ptr(), false) };
        assert!(result.is_null());

        let message = unsafe { take(d2c_last_error()) };
        assert_eq!(message, "source is null");
    }

    #[test]
    fn test_bad_row_mode_is_rejected() {
        let dir = folders();
        let path = c(dir.path().to_str().unwrap());
        let mode = c("sideways");

        let written = unsafe {
            d2c_convert_folder(path.as_ptr(), path.as_ptr(), path.as_ptr(), false, mode.as_ptr())
        };

        assert_eq!(written, -1);
        let message = unsafe { take(d2c_last_error()) };
        assert!(message.contains("sideways"));
    }

    #[test]
    fn test_free_null_is_noop() {
        unsafe { d2c_free_string(ptr::null_mut()) };
    }
}
