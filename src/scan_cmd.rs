//! Scan command: sample `shift(x) - x` for several source/target pairs.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info, info_span};

use qmap_io::CurveStore;
use qmap_quantile_map::{
    InversionMethod, QuantileShifter, event_density, scan_range, scan_transformation,
};

use crate::cli::ScanArgs;
use crate::config::{QmapConfig, ScanToml};
use crate::convert;

/// One source/target pair with its resolved settings.
#[derive(Debug, PartialEq)]
struct PairPlan {
    source: String,
    target: String,
    label: String,
    /// Method chosen on the command line; `None` leaves the configured one.
    method: Option<InversionMethod>,
    tail_threshold: f64,
}

#[derive(Debug, Serialize)]
struct ScanOutput {
    density: Vec<DensityRecord>,
    scans: Vec<ScanRecord>,
}

#[derive(Debug, Serialize)]
struct DensityRecord {
    center: f64,
    density: f64,
}

#[derive(Debug, Serialize)]
struct ScanRecord {
    label: String,
    source: String,
    target: String,
    method: &'static str,
    tail_threshold: f64,
    x_min: f64,
    x_max: f64,
    points: Vec<PointRecord>,
}

#[derive(Debug, Serialize)]
struct PointRecord {
    input: f64,
    output: f64,
    delta: f64,
}

fn method_name(method: InversionMethod) -> &'static str {
    match method {
        InversionMethod::Newton => "newton",
        InversionMethod::Bisection => "bisection",
    }
}

/// Label used when none is given: `S -> T`, tagged with `b` for forced
/// bisection and `l=..` for tail linearization.
fn default_label(source: &str, target: &str, bisect: bool, t: f64) -> String {
    let mut label = format!("{source} -> {target}");
    match (bisect, t > 0.0) {
        (true, true) => label.push_str(&format!(" (b, l={t:.2})")),
        (false, true) => label.push_str(&format!(" (l={t:.2})")),
        (true, false) => label.push_str(" (b)"),
        (false, false) => {}
    }
    label
}

/// Checks list lengths and expands per-pair settings.
///
/// `--tail-threshold` takes one value for all pairs or one per pair and
/// falls back to `default_threshold`. `--bisect-individual` overrides
/// `--bisect` and the configured method pair by pair, with 0 selecting
/// Newton. Labels may embed `{default}`.
fn plan_pairs(args: &ScanArgs, default_threshold: f64) -> Result<Vec<PairPlan>> {
    let n = args.sources.len();
    if args.targets.len() != n {
        bail!(
            "number of sources and targets must be equal, got {} and {}",
            n,
            args.targets.len()
        );
    }
    if !args.labels.is_empty() && args.labels.len() != n {
        bail!(
            "number of labels must equal the number of source/target pairs ({n}), got {}",
            args.labels.len()
        );
    }
    let thresholds = match args.tail_threshold.len() {
        0 => vec![default_threshold; n],
        1 => vec![args.tail_threshold[0]; n],
        len if len == n => args.tail_threshold.clone(),
        len => bail!("--tail-threshold takes 1 or {n} values, got {len}"),
    };
    let methods = match args.bisect_individual.len() {
        0 => vec![args.bisect.then_some(InversionMethod::Bisection); n],
        len if len == n => args
            .bisect_individual
            .iter()
            .map(|&b| {
                Some(if b == 1 {
                    InversionMethod::Bisection
                } else {
                    InversionMethod::Newton
                })
            })
            .collect(),
        len => bail!("--bisect-individual takes {n} values, got {len}"),
    };

    Ok((0..n)
        .map(|i| {
            let source = args.sources[i].clone();
            let target = args.targets[i].clone();
            let bisect = methods[i] == Some(InversionMethod::Bisection);
            let default = default_label(&source, &target, bisect, thresholds[i]);
            let label = match args.labels.get(i) {
                Some(custom) => custom.replace("{default}", &default),
                None => default,
            };
            PairPlan {
                source,
                target,
                label,
                method: methods[i],
                tail_threshold: thresholds[i],
            }
        })
        .collect())
}

fn validate_scan(scan: &ScanToml) -> Result<()> {
    if scan.n_points < 2 {
        bail!("[scan].n_points must be at least 2, got {}", scan.n_points);
    }
    if scan.density_bins == 0 {
        bail!("[scan].density_bins must be greater than 0");
    }
    Ok(())
}

/// Run the transformation scan.
pub fn run(args: ScanArgs) -> Result<()> {
    let _cmd = info_span!("scan").entered();

    let config = QmapConfig::load(args.config.as_deref())?;
    validate_scan(&config.scan)?;
    let plans = plan_pairs(&args, config.shift.tail_threshold)?;

    let store = CurveStore::read(&args.curves)
        .with_context(|| format!("failed to read curves: {}", args.curves.display()))?;

    let mut density = Vec::new();
    let mut scans = Vec::with_capacity(plans.len());
    for (i, plan) in plans.into_iter().enumerate() {
        let cfg = convert::build_shifter_config(&config.shift, plan.method, Some(plan.tail_threshold))
            .with_context(|| format!("invalid settings for {:?}", plan.label))?;
        let shifter = QuantileShifter::new(store.get(&plan.source)?, store.get(&plan.target)?, cfg)?;
        let range = scan_range(shifter.source(), args.x_min, args.x_max)
            .with_context(|| format!("no scan range for {:?}", plan.label))?;

        // The event distribution follows the first source.
        if i == 0 {
            density = event_density(shifter.source(), range, config.scan.density_bins)
                .into_iter()
                .map(|b| DensityRecord {
                    center: b.center,
                    density: b.density,
                })
                .collect();
        }

        let points = scan_transformation(&shifter, range, config.scan.n_points)
            .into_iter()
            .map(|p| PointRecord {
                input: p.input,
                output: p.output,
                delta: p.delta(),
            })
            .collect();
        debug!(label = %plan.label, x_min = range.0, x_max = range.1, "pair scanned");

        scans.push(ScanRecord {
            label: plan.label,
            source: plan.source,
            target: plan.target,
            method: method_name(shifter.config().method()),
            tail_threshold: shifter.config().tail_threshold(),
            x_min: range.0,
            x_max: range.1,
            points,
        });
    }

    write_output(&args.output, &ScanOutput { density, scans })
}

fn write_output(path: &Path, output: &ScanOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("failed to serialise scan")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write scan: {}", path.display()))?;
    info!(path = %path.display(), n = output.scans.len(), "scan written");
    Ok(())
}
