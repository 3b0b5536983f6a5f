//! Build command: derive CDF curves from histograms and store them.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, info_span};

use qmap_io::{CurveStore, read_histograms};
use qmap_quantile_map::{RegularityReport, TracingSink, build_cdf_with_report};

use crate::cli::BuildArgs;

/// Regularity summary of one curve, as written to `--report`.
#[derive(Debug, Serialize)]
struct ReportEntry {
    shape: String,
    n_samples: usize,
    out_of_range_permille: f64,
    negative_derivative_permille: f64,
    regular: bool,
}

impl ReportEntry {
    fn new(shape: &str, report: &RegularityReport) -> Self {
        Self {
            shape: shape.to_string(),
            n_samples: report.n_samples,
            out_of_range_permille: report.out_of_range_permille(),
            negative_derivative_permille: report.negative_derivative_permille(),
            regular: report.is_regular(),
        }
    }
}

/// Pairs each shape with its output curve name.
fn curve_names<'a>(shapes: &'a [String], names: &'a [String]) -> Result<Vec<(&'a str, &'a str)>> {
    if names.is_empty() {
        return Ok(shapes.iter().map(|s| (s.as_str(), s.as_str())).collect());
    }
    if names.len() != shapes.len() {
        bail!(
            "--shapes and --names must have the same length, got {} and {}",
            shapes.len(),
            names.len()
        );
    }
    Ok(shapes
        .iter()
        .zip(names)
        .map(|(s, n)| (s.as_str(), n.as_str()))
        .collect())
}

/// Run the curve-building pipeline.
pub fn run(args: BuildArgs) -> Result<()> {
    let _cmd = info_span!("build").entered();
    let pairs = curve_names(&args.shapes, &args.names)?;

    info!(path = %args.input.display(), "reading histograms");
    let histograms = read_histograms(&args.input)
        .with_context(|| format!("failed to read histograms: {}", args.input.display()))?;

    let mut store = CurveStore::new();
    let mut report = BTreeMap::new();
    for (shape, name) in pairs {
        let histogram = histograms.get(shape)?;
        let (curve, regularity) = build_cdf_with_report(histogram, name, &TracingSink)
            .with_context(|| format!("failed to build curve {name:?} from {shape:?}"))?;
        report.insert(name.to_string(), ReportEntry::new(shape, &regularity));
        store.insert(curve)?;
        info!(shape, curve = name, "curve built");
    }

    store
        .write(&args.output)
        .with_context(|| format!("failed to write curves: {}", args.output.display()))?;
    info!(path = %args.output.display(), n = store.len(), "curves written");

    if let Some(ref path) = args.report {
        write_report(path, &report)?;
    }
    Ok(())
}

fn write_report(path: &Path, report: &BTreeMap<String, ReportEntry>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialise report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report: {}", path.display()))?;
    info!(path = %path.display(), "regularity report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmap_io::HistogramSet;
    use qmap_quantile_map::Histogram;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn names_default_to_shapes() {
        let shapes = strings(&["a", "b"]);
        assert_eq!(curve_names(&shapes, &[]).unwrap(), [("a", "a"), ("b", "b")]);
    }

    #[test]
    fn names_must_match_shapes() {
        let shapes = strings(&["a", "b"]);
        assert!(curve_names(&shapes, &strings(&["x"])).is_err());
        assert_eq!(
            curve_names(&shapes, &strings(&["x", "y"])).unwrap(),
            [("a", "x"), ("b", "y")]
        );
    }

    #[test]
    fn builds_store_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hists.json");
        let output = dir.path().join("curves.json");
        let report = dir.path().join("report.json");

        let mut set = HistogramSet::new();
        set.insert("pt", Histogram::uniform(0.0, 4.0, vec![10.0, 20.0, 20.0, 10.0]).unwrap())
            .unwrap();
        set.write(&input).unwrap();

        run(BuildArgs {
            input,
            shapes: strings(&["pt"]),
            names: strings(&["mc_pt"]),
            output: output.clone(),
            report: Some(report.clone()),
        })
        .unwrap();

        let store = CurveStore::read(&output).unwrap();
        assert_eq!(store.names().collect::<Vec<_>>(), ["mc_pt"]);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(json["mc_pt"]["shape"], "pt");
        assert_eq!(json["mc_pt"]["n_samples"], 1000);
    }

    #[test]
    fn missing_shape_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hists.json");
        HistogramSet::new().write(&input).unwrap();

        let err = run(BuildArgs {
            input,
            shapes: strings(&["pt"]),
            names: Vec::new(),
            output: dir.path().join("curves.json"),
            report: None,
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("pt"));
    }
}
