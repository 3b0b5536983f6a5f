//! Named histogram containers stored as JSON.
//!
//! ```json
//! { "histograms": { "mc_pt": { "edges": [0, 1, 2], "counts": [4, 7] } } }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use qmap_quantile_map::Histogram;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IoError, io_error};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct HistogramRecord {
    edges: Vec<f64>,
    counts: Vec<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct HistogramFile {
    histograms: BTreeMap<String, HistogramRecord>,
}

/// A write-once collection of named histograms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramSet {
    histograms: BTreeMap<String, Histogram>,
}

impl HistogramSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a histogram under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DuplicateEntry`] if `name` is already present.
    pub fn insert(&mut self, name: impl Into<String>, histogram: Histogram) -> Result<(), IoError> {
        let name = name.into();
        if self.histograms.contains_key(&name) {
            return Err(IoError::DuplicateEntry {
                kind: "histogram",
                name,
            });
        }
        self.histograms.insert(name, histogram);
        Ok(())
    }

    /// Looks up a histogram by name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::MissingEntry`] if no histogram has that name.
    pub fn get(&self, name: &str) -> Result<&Histogram, IoError> {
        self.histograms
            .get(name)
            .ok_or_else(|| IoError::MissingEntry {
                kind: "histogram",
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    /// Histogram names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.histograms.keys().map(String::as_str)
    }

    /// Number of histograms.
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    /// Returns `true` if the set holds no histograms.
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    /// Writes the set to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if the file cannot be created, or
    /// [`IoError::Json`] if serialisation fails.
    pub fn write(&self, path: &Path) -> Result<(), IoError> {
        let file = HistogramFile {
            histograms: self
                .histograms
                .iter()
                .map(|(name, h)| {
                    let record = HistogramRecord {
                        edges: h.edges().to_vec(),
                        counts: h.counts().to_vec(),
                    };
                    (name.clone(), record)
                })
                .collect(),
        };
        let mut writer = BufWriter::new(File::create(path).map_err(|e| io_error(path, e))?);
        serde_json::to_writer_pretty(&mut writer, &file)?;
        writer.flush().map_err(|e| io_error(path, e))
    }
}

/// Reads a histogram container from `path`.
///
/// Every entry is validated as a [`Histogram`].
///
/// # Errors
///
/// - [`IoError::FileNotFound`] if the file does not exist.
/// - [`IoError::Json`] if the file is not a valid container.
/// - [`IoError::InvalidEntry`] if an entry is not a valid histogram.
pub fn read_histograms(path: &Path) -> Result<HistogramSet, IoError> {
    let reader = BufReader::new(File::open(path).map_err(|e| io_error(path, e))?);
    let file: HistogramFile = serde_json::from_reader(reader)?;

    let mut set = HistogramSet::new();
    for (name, record) in file.histograms {
        let histogram =
            Histogram::new(record.edges, record.counts).map_err(|e| IoError::InvalidEntry {
                kind: "histogram",
                name: name.clone(),
                reason: e.to_string(),
            })?;
        set.histograms.insert(name, histogram);
    }
    debug!(path = %path.display(), n = set.len(), "read histograms");
    Ok(set)
}
