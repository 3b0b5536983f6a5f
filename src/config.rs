use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level qmap configuration.
///
/// Every section and field is optional; command-line flags take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QmapConfig {
    /// Shifter settings.
    #[serde(default)]
    pub shift: ShiftToml,

    /// Parquet output settings.
    #[serde(default)]
    pub output: OutputToml,

    /// Transformation scan settings.
    #[serde(default)]
    pub scan: ScanToml,
}

impl QmapConfig {
    /// Reads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShiftToml {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub tail_threshold: f64,
}

impl Default for ShiftToml {
    fn default() -> Self {
        Self {
            method: default_method(),
            tail_threshold: 0.0,
        }
    }
}

fn default_method() -> String {
    "newton".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_zstd_level")]
    pub zstd_level: i32,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            compression: default_compression(),
            zstd_level: default_zstd_level(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_compression() -> String {
    "snappy".to_string()
}
fn default_zstd_level() -> i32 {
    qmap_io::DEFAULT_ZSTD_LEVEL
}
fn default_row_group_size() -> usize {
    qmap_io::DEFAULT_ROW_GROUP_SIZE
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanToml {
    #[serde(default = "default_n_points")]
    pub n_points: usize,
    #[serde(default = "default_density_bins")]
    pub density_bins: usize,
}

impl Default for ScanToml {
    fn default() -> Self {
        Self {
            n_points: default_n_points(),
            density_bins: default_density_bins(),
        }
    }
}

fn default_n_points() -> usize {
    qmap_quantile_map::DEFAULT_SCAN_POINTS
}
fn default_density_bins() -> usize {
    qmap_quantile_map::DEFAULT_DENSITY_BINS
}
