//! Collection of newline-delimited JSON records from a directory tree.

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Errors that abort a collection run.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Data directory does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record at {path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Lists the data files below `root`, sorted by file name at each level.
pub fn collect_data_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, CollectError> {
    if !root.is_dir() {
        return Err(CollectError::MissingRoot(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| CollectError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Parses one record per non-blank line of `path`.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CollectError> {
    let file = File::open(path).map_err(|source| CollectError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| CollectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| CollectError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Reads every matching file under `root` and concatenates their records.
///
/// Any file that fails to parse aborts the whole collection.
pub fn collect_records<T: DeserializeOwned>(
    root: &Path,
    extension: &str,
) -> Result<Vec<T>, CollectError> {
    let mut all_records = Vec::new();
    for path in collect_data_files(root, extension)? {
        let records: Vec<T> = read_records(&path)?;
        debug!("{} records in {}", records.len(), path.display());
        all_records.extend(records);
    }
    info!("{} records found in {}", all_records.len(), root.display());
    Ok(all_records)
}
