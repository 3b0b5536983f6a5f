//! # qmap-io
//!
//! File formats around the quantile-mapping engine: JSON containers for
//! named histograms and fitted CDF curves, and Parquet tables whose numeric
//! columns are read and corrected.

mod curves;
mod error;
mod histograms;
mod table;
mod writer;

pub use curves::CurveStore;
pub use error::IoError;
pub use histograms::{HistogramSet, read_histograms};
pub use table::{append_column, read_column};
pub use writer::{Compression, DEFAULT_ROW_GROUP_SIZE, DEFAULT_ZSTD_LEVEL, WriterConfig};
