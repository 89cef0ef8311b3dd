//! Classification file format
//!
//! Files are JSON: either one classification object or an array of them.
//! Export writes the same shapes, so anything exported can be imported.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

use crate::client::models::Classification;
use crate::error::{Error, Result};

/// A record read from a file; malformed records are kept as errors so the
/// caller can decide whether to continue.
pub type RecordResult = Result<Classification>;

/// Read a classification file.
///
/// The outer error means the file as a whole is unusable (missing, not JSON,
/// wrong top-level shape). Inner errors are per-record problems.
pub fn read_classification_file(path: &Path) -> Result<Vec<RecordResult>> {
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )
        .into());
    }
    let contents = std::fs::read_to_string(path)?;
    parse_records(path, &contents)
}

/// Parse file contents into records.
pub fn parse_records(path: &Path, contents: &str) -> Result<Vec<RecordResult>> {
    let value: Value = serde_json::from_str(contents).map_err(|e| Error::FileFormat {
        path: path.to_path_buf(),
        reason: format!("invalid JSON: {}", e),
    })?;

    match value {
        Value::Object(_) => Ok(vec![validate_record(path, None, value)]),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| validate_record(path, Some(idx + 1), item))
            .collect()),
        _ => Err(Error::FileFormat {
            path: path.to_path_buf(),
            reason: "expected a classification object or an array of them".to_string(),
        }),
    }
}

fn validate_record(path: &Path, position: Option<usize>, value: Value) -> RecordResult {
    let malformed = |reason: &str| Error::FileFormat {
        path: path.to_path_buf(),
        reason: match position {
            Some(n) => format!("record {}: {}", n, reason),
            None => reason.to_string(),
        },
    };

    let Value::Object(map) = value else {
        return Err(malformed("not a JSON object"));
    };
    match map.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => Ok(Classification(map)),
        Some(_) => Err(malformed("'name' must be a non-empty string")),
        None => Err(malformed("missing 'name' field")),
    }
}

/// List `*.json` files in a directory, sorted by file name.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Not a directory: {}", dir.display()),
        )
        .into());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Replace anything other than alphanumerics, `-` and `_` with `_`.
pub fn safe_file_name(base: &str) -> String {
    base.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<safe name>_classification_<YYYYmmdd_HHMMSS>.json`
pub fn export_file_name(name: &str, now: DateTime<Local>) -> String {
    format!(
        "{}_classification_{}.json",
        safe_file_name(name),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Path for `file_name` in `dir` that is neither in `taken` nor on disk.
///
/// Distinct names can sanitize to the same file name, so a `_2`, `_3`, ...
/// suffix is added before the extension until the path is free. The chosen
/// path is recorded in `taken`.
pub fn unique_path(dir: &Path, file_name: &str, taken: &mut HashSet<PathBuf>) -> PathBuf {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    let mut path = dir.join(file_name);
    let mut n = 2;
    while taken.contains(&path) || path.exists() {
        let candidate = match ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        path = dir.join(candidate);
        n += 1;
    }
    taken.insert(path.clone());
    path
}

/// Write pretty-printed JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(path, contents)?;
    Ok(())
}
