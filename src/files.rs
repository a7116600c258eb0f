//! Capability-scoped file access for logs, exports, and filter files.
//!
//! Paths are resolved against an ambient directory handle opened once per
//! operation; parent directories are created on demand for writes.

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, File, OpenOptions};

use crate::api::ExplorerError;

/// How a file should be opened for writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate or create.
    Create,
    /// Append, creating the file when missing.
    Append,
}

/// Opens the directory containing `path` and returns it with the file name.
fn open_parent(
    path: &Utf8Path,
    purpose: &str,
    create_parents: bool,
) -> Result<(Dir, String), ExplorerError> {
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| ExplorerError::Io {
        message: format!("invalid {purpose} path '{path}': no file name"),
    })?;

    let (dir, rel_parent) = if parent.is_absolute() {
        let root = Dir::open_ambient_dir("/", ambient_authority())
            .map_err(|error| ExplorerError::io("failed to open root directory", &error))?;
        let rel = parent.strip_prefix("/").map_err(|_| ExplorerError::Io {
            message: format!("failed to normalise {purpose} directory '{parent}'"),
        })?;
        (root, rel)
    } else {
        let current = Dir::open_ambient_dir(".", ambient_authority())
            .map_err(|error| ExplorerError::io("failed to open current directory", &error))?;
        (current, parent)
    };

    if rel_parent.as_str().is_empty() || rel_parent == Utf8Path::new(".") {
        return Ok((dir, file_name.to_owned()));
    }

    if create_parents {
        dir.create_dir_all(rel_parent).map_err(|error| ExplorerError::Io {
            message: format!("failed to create {purpose} directory '{parent}': {error}"),
        })?;
    }
    let target = dir.open_dir(rel_parent).map_err(|error| ExplorerError::Io {
        message: format!("failed to open {purpose} directory '{parent}': {error}"),
    })?;
    Ok((target, file_name.to_owned()))
}

/// Opens `path` for writing, creating parent directories first.
///
/// # Errors
///
/// Returns [`ExplorerError::Io`] when a directory or the file cannot be
/// opened.
pub fn open_for_write(
    path: &Utf8Path,
    purpose: &str,
    mode: WriteMode,
) -> Result<File, ExplorerError> {
    let (dir, file_name) = open_parent(path, purpose, true)?;
    let mut options = OpenOptions::new();
    match mode {
        WriteMode::Create => options.write(true).create(true).truncate(true),
        WriteMode::Append => options.append(true).create(true),
    };
    dir.open_with(&file_name, &options)
        .map_err(|error| ExplorerError::Io {
            message: format!("failed to open {purpose} file '{path}': {error}"),
        })
}

/// Reads `path` into a string; `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns [`ExplorerError::Io`] for any failure other than a missing file.
pub fn read_optional(path: &Utf8Path, purpose: &str) -> Result<Option<String>, ExplorerError> {
    let (dir, file_name) = match open_parent(path, purpose, false) {
        Ok(opened) => opened,
        Err(error) if !path_exists(path) => {
            tracing::trace!("{purpose} directory missing: {error}");
            return Ok(None);
        }
        Err(error) => return Err(error),
    };
    if !dir.exists(&file_name) {
        return Ok(None);
    }
    let mut file = dir.open(&file_name).map_err(|error| ExplorerError::Io {
        message: format!("failed to open {purpose} file '{path}': {error}"),
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|error| ExplorerError::Io {
            message: format!("failed to read {purpose} file '{path}': {error}"),
        })?;
    Ok(Some(contents))
}

/// Reads `path` into a string, failing when it does not exist.
///
/// # Errors
///
/// Returns [`ExplorerError::Io`] when the file is missing or unreadable.
pub fn read_required(path: &Utf8Path, purpose: &str) -> Result<String, ExplorerError> {
    read_optional(path, purpose)?.ok_or_else(|| ExplorerError::Io {
        message: format!("{purpose} file '{path}' does not exist"),
    })
}

fn path_exists(path: &Utf8Path) -> bool {
    path.parent()
        .filter(|parent| !parent.as_str().is_empty())
        .is_none_or(Utf8Path::exists)
}

/// Converts a configured path string into a UTF-8 path.
#[must_use]
pub fn utf8_path(value: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn temp_path(dir: &TempDir, relative: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(relative)).expect("temp path should be UTF-8")
    }

    #[rstest]
    fn write_creates_parents_and_append_extends() {
        let dir = TempDir::new().expect("temp dir");
        let path = temp_path(&dir, "nested/deeper/log.csv");

        let mut first = open_for_write(&path, "log", WriteMode::Create).expect("create");
        write!(first, "a").expect("write");
        drop(first);
        let mut second = open_for_write(&path, "log", WriteMode::Append).expect("append");
        write!(second, "b").expect("write");
        drop(second);

        assert_eq!(
            read_required(&path, "log").expect("read back"),
            "ab".to_owned()
        );
    }

    #[rstest]
    fn missing_files_read_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let path = temp_path(&dir, "absent.csv");
        assert_eq!(read_optional(&path, "log").expect("read"), None);

        let nested = temp_path(&dir, "no/such/dir/absent.csv");
        assert_eq!(read_optional(&nested, "log").expect("read"), None);
    }

    #[rstest]
    fn read_required_reports_missing_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = temp_path(&dir, "filters.json");
        assert!(matches!(
            read_required(&path, "filter"),
            Err(ExplorerError::Io { .. })
        ));
    }
}
