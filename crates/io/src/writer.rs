//! Parquet output settings and atomic table replacement.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use parquet::arrow::ArrowWriter;
use parquet::basic::ZstdLevel;
use parquet::file::properties::WriterProperties;

use crate::error::{IoError, io_error};

/// Default maximum rows per row group.
pub const DEFAULT_ROW_GROUP_SIZE: usize = 1_000_000;

/// Default Zstd level.
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Column compression codec for rewritten tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// Uncompressed pages.
    None,
    /// Snappy.
    #[default]
    Snappy,
    /// Zstd at [`WriterConfig::zstd_level`].
    Zstd,
}

/// Settings used when a table is written back to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    compression: Compression,
    zstd_level: i32,
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Snappy,
            zstd_level: DEFAULT_ZSTD_LEVEL,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }
}

impl WriterConfig {
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Level used when compression is [`Compression::Zstd`] (1 to 22).
    pub fn with_zstd_level(mut self, level: i32) -> Self {
        self.zstd_level = level;
        self
    }

    pub fn with_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = rows;
        self
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn zstd_level(&self) -> i32 {
        self.zstd_level
    }

    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Checks every setting and reports all failures at once.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if the row-group size is zero or the
    /// Zstd level is out of range.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut problems = Vec::new();
        if self.row_group_size == 0 {
            problems.push("row_group_size must be greater than 0".to_string());
        }
        if ZstdLevel::try_new(self.zstd_level).is_err() {
            problems.push(format!(
                "zstd_level must be between 1 and 22, got {}",
                self.zstd_level
            ));
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            })
        }
    }

    fn codec(&self) -> Result<parquet::basic::Compression, IoError> {
        use parquet::basic::Compression as Codec;
        Ok(match self.compression {
            Compression::None => Codec::UNCOMPRESSED,
            Compression::Snappy => Codec::SNAPPY,
            Compression::Zstd => Codec::ZSTD(ZstdLevel::try_new(self.zstd_level)?),
        })
    }

    fn properties(&self) -> Result<WriterProperties, IoError> {
        Ok(WriterProperties::builder()
            .set_compression(self.codec()?)
            .set_max_row_group_size(self.row_group_size)
            .build())
    }
}

/// Writes `batches` to `path`, replacing any existing file.
///
/// Output goes to a sibling temporary file that is renamed over `path` once
/// complete, so `path` may also be the file the batches were read from.
/// The temporary file is removed if any step fails.
pub(crate) fn write_batches(
    path: &Path,
    schema: Arc<Schema>,
    batches: &[RecordBatch],
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;
    let props = config.properties()?;

    let tmp = temporary_path(path);
    let result = write_file(&tmp, schema, batches, props)
        .and_then(|()| std::fs::rename(&tmp, path).map_err(|e| io_error(path, e)));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn write_file(
    path: &Path,
    schema: Arc<Schema>,
    batches: &[RecordBatch],
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()?;
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
