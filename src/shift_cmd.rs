//! Shift command: append a quantile-mapped column to a Parquet table.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use qmap_io::{CurveStore, append_column, read_column};
use qmap_quantile_map::{InversionMethod, QuantileShifter};

use crate::cli::ShiftArgs;
use crate::config::QmapConfig;
use crate::convert;

/// Run the correction pipeline.
pub fn run(args: ShiftArgs) -> Result<()> {
    let _cmd = info_span!("shift", variable = %args.variable).entered();

    let config = QmapConfig::load(args.config.as_deref())?;
    let method = args.bisect.then_some(InversionMethod::Bisection);
    let shifter_cfg = convert::build_shifter_config(&config.shift, method, args.tail_threshold)?;
    let writer_cfg = convert::build_writer_config(&config.output)?;

    let store = CurveStore::read(&args.curves)
        .with_context(|| format!("failed to read curves: {}", args.curves.display()))?;
    let shifter = QuantileShifter::new(store.get(&args.source)?, store.get(&args.target)?, shifter_cfg)?;
    info!(
        source = %args.source,
        target = %args.target,
        method = ?shifter.config().method(),
        tail_threshold = shifter.config().tail_threshold(),
        "shifter ready"
    );

    let values = read_column(&args.input, &args.variable)
        .with_context(|| format!("failed to read column from {}", args.input.display()))?;
    let corrected = shifter.shift_all(&values);
    info!(n = corrected.len(), "values shifted");

    let output = args.output.as_deref().unwrap_or(&args.input);
    append_column(&args.input, output, &args.new_name, &corrected, &writer_cfg)
        .with_context(|| format!("failed to write table: {}", output.display()))?;
    Ok(())
}
