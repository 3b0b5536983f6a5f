//! Persisted CDF curves.
//!
//! Curves are stored with their fitted moments so that a reload reproduces
//! the exact same spline without refitting:
//!
//! ```json
//! { "curves": { "mc_pt": { "x": [..], "y": [..], "moments": [..],
//!                          "start_slope": 0.0, "end_slope": 0.0 } } }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use qmap_quantile_map::{CdfCurve, ClampedCubicSpline};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IoError, io_error};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CurveRecord {
    x: Vec<f64>,
    y: Vec<f64>,
    moments: Vec<f64>,
    start_slope: f64,
    end_slope: f64,
}

impl From<&CdfCurve> for CurveRecord {
    fn from(curve: &CdfCurve) -> Self {
        let spline = curve.spline();
        Self {
            x: spline.knots().iter().map(|k| k.x).collect(),
            y: spline.knots().iter().map(|k| k.y).collect(),
            moments: spline.moments().to_vec(),
            start_slope: spline.start_slope(),
            end_slope: spline.end_slope(),
        }
    }
}

impl CurveRecord {
    fn into_curve(self, name: String) -> Result<CdfCurve, IoError> {
        match ClampedCubicSpline::from_parts(
            &self.x,
            &self.y,
            self.moments,
            self.start_slope,
            self.end_slope,
        ) {
            Ok(spline) => Ok(CdfCurve::from_spline(name, spline)),
            Err(e) => Err(IoError::InvalidEntry {
                kind: "curve",
                name,
                reason: e.to_string(),
            }),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CurveFile {
    curves: BTreeMap<String, CurveRecord>,
}

/// A write-once store of named CDF curves.
///
/// Curves are handed out as `Arc`s so that several shifters can share one
/// curve without copying it.
#[derive(Debug, Clone, Default)]
pub struct CurveStore {
    curves: BTreeMap<String, Arc<CdfCurve>>,
}

impl CurveStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a store from `path`.
    ///
    /// # Errors
    ///
    /// - [`IoError::FileNotFound`] if the file does not exist.
    /// - [`IoError::Json`] if the file is not a valid curve container.
    /// - [`IoError::InvalidEntry`] if a stored curve is inconsistent.
    pub fn read(path: &Path) -> Result<Self, IoError> {
        let reader = BufReader::new(File::open(path).map_err(|e| io_error(path, e))?);
        let file: CurveFile = serde_json::from_reader(reader)?;

        let mut store = Self::new();
        for (name, record) in file.curves {
            let curve = record.into_curve(name.clone())?;
            store.curves.insert(name, Arc::new(curve));
        }
        debug!(path = %path.display(), n = store.len(), "read curves");
        Ok(store)
    }

    /// Writes the store to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if the file cannot be created, or
    /// [`IoError::Json`] if serialisation fails.
    pub fn write(&self, path: &Path) -> Result<(), IoError> {
        let file = CurveFile {
            curves: self
                .curves
                .iter()
                .map(|(name, curve)| (name.clone(), CurveRecord::from(curve.as_ref())))
                .collect(),
        };
        let mut writer = BufWriter::new(File::create(path).map_err(|e| io_error(path, e))?);
        serde_json::to_writer_pretty(&mut writer, &file)?;
        writer.flush().map_err(|e| io_error(path, e))?;
        debug!(path = %path.display(), n = self.len(), "wrote curves");
        Ok(())
    }

    /// Adds `curve` under its own name and returns the shared handle.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DuplicateEntry`] if a curve with that name exists.
    pub fn insert(&mut self, curve: CdfCurve) -> Result<Arc<CdfCurve>, IoError> {
        if self.curves.contains_key(curve.name()) {
            return Err(IoError::DuplicateEntry {
                kind: "curve",
                name: curve.name().to_string(),
            });
        }
        let curve = Arc::new(curve);
        self.curves
            .insert(curve.name().to_string(), Arc::clone(&curve));
        Ok(curve)
    }

    /// Looks up a curve by name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::MissingEntry`] if no curve has that name.
    pub fn get(&self, name: &str) -> Result<Arc<CdfCurve>, IoError> {
        self.curves
            .get(name)
            .cloned()
            .ok_or_else(|| IoError::MissingEntry {
                kind: "curve",
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    /// Curve names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.curves.keys().map(String::as_str)
    }

    /// Number of curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Returns `true` if the store holds no curves.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
