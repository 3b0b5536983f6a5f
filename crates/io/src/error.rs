//! Error types for qmap-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the qmap-io crate.
///
/// Covers file-system failures, JSON and Parquet format errors, lookups of
/// named histograms, curves and table columns, and invalid model data found
/// while decoding a container.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps a file-system failure other than a missing file.
    #[error("i/o error on {}: {reason}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Wraps an error originating from JSON (de)serialisation.
    #[error("json error: {reason}")]
    Json {
        /// Description of the underlying serde_json failure.
        reason: String,
    },

    /// Wraps an error originating from the Parquet or Arrow libraries.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a named histogram or curve is not in a container.
    #[error("{kind} '{name}' not found (available: {available})")]
    MissingEntry {
        /// Entry kind, `"histogram"` or `"curve"`.
        kind: &'static str,
        /// Requested name.
        name: String,
        /// Comma-separated names that do exist.
        available: String,
    },

    /// Returned when a name is inserted into a write-once container twice.
    #[error("{kind} '{name}' already exists")]
    DuplicateEntry {
        /// Entry kind, `"histogram"` or `"curve"`.
        kind: &'static str,
        /// Duplicated name.
        name: String,
    },

    /// Returned when a required column is not present in a table.
    #[error("column '{name}' not found in {}", path.display())]
    MissingColumn {
        /// Name of the missing column.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when appending a column whose name is already taken.
    #[error("column '{name}' already exists in {}", path.display())]
    DuplicateColumn {
        /// Name of the existing column.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a column cannot be read as floating point.
    #[error("column '{name}' has non-numeric type {data_type}")]
    UnsupportedColumnType {
        /// Column name.
        name: String,
        /// Arrow data type of the column.
        data_type: String,
    },

    /// Returned when an appended column does not match the table length.
    #[error("length mismatch: table has {expected} rows, got {got} values")]
    LengthMismatch {
        /// Number of rows in the table.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Returned when a stored histogram or curve is not valid model data.
    #[error("invalid {kind} '{name}': {reason}")]
    InvalidEntry {
        /// Entry kind, `"histogram"` or `"curve"`.
        kind: &'static str,
        /// Entry name.
        name: String,
        /// Description of the problem.
        reason: String,
    },
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json {
            reason: e.to_string(),
        }
    }
}

impl From<parquet::errors::ParquetError> for IoError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for IoError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

/// Maps an `std::io::Error` on `path` to [`IoError`].
pub(crate) fn io_error(path: &std::path::Path, e: std::io::Error) -> IoError {
    if e.kind() == std::io::ErrorKind::NotFound {
        IoError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IoError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}
