//! Pure conversion functions: TOML config structs and CLI flags -> crate API
//! config types. Command-line values win over the file.

use anyhow::{Context, Result, bail};

use qmap_io::{Compression, WriterConfig};
use qmap_quantile_map::{InversionMethod, ShifterConfig};

use crate::config::{OutputToml, ShiftToml};

/// Parses an inversion method name into the corresponding enum variant.
pub fn parse_method(s: &str) -> Result<InversionMethod> {
    match s.to_lowercase().as_str() {
        "newton" => Ok(InversionMethod::Newton),
        "bisection" | "bisect" => Ok(InversionMethod::Bisection),
        other => bail!("unknown inversion method: {other:?}"),
    }
}

/// Parses a compression algorithm name into the corresponding enum variant.
pub fn parse_compression(s: &str) -> Result<Compression> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Compression::None),
        "snappy" => Ok(Compression::Snappy),
        "zstd" => Ok(Compression::Zstd),
        other => bail!("unknown compression: {other:?}"),
    }
}

/// Builds a validated [`ShifterConfig`].
///
/// `method` and `tail_threshold`, when given, replace the configured values.
pub fn build_shifter_config(
    shift: &ShiftToml,
    method: Option<InversionMethod>,
    tail_threshold: Option<f64>,
) -> Result<ShifterConfig> {
    let method = match method {
        Some(method) => method,
        None => parse_method(&shift.method)?,
    };
    let cfg = ShifterConfig::new()
        .with_method(method)
        .with_tail_threshold(tail_threshold.unwrap_or(shift.tail_threshold));
    cfg.validate().context("invalid shifter configuration")?;
    Ok(cfg)
}

/// Builds a validated [`WriterConfig`] from the TOML output configuration.
pub fn build_writer_config(output: &OutputToml) -> Result<WriterConfig> {
    let compression = parse_compression(&output.compression)?;
    let cfg = WriterConfig::default()
        .with_compression(compression)
        .with_zstd_level(output.zstd_level)
        .with_row_group_size(output.row_group_size);
    cfg.validate().context("invalid output configuration")?;
    Ok(cfg)
}
