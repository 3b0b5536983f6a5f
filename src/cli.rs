use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Histogram-based quantile mapping.
#[derive(Parser)]
#[command(
    name = "qmap",
    version,
    about = "Build CDF splines from histograms and quantile-map tabular data"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Derive CDF curves from named histograms.
    Build(BuildArgs),
    /// Append a quantile-mapped column to a Parquet table.
    Shift(ShiftArgs),
    /// Sample `shift(x) - x` for one or more source/target pairs.
    Scan(ScanArgs),
}

/// Arguments for the `build` subcommand.
#[derive(clap::Args)]
pub struct BuildArgs {
    /// Path to the JSON histogram container.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Histogram names to convert.
    #[arg(short, long, num_args = 1.., required = true)]
    pub shapes: Vec<String>,

    /// Alternative curve names, one per shape.
    #[arg(short, long, num_args = 1..)]
    pub names: Vec<String>,

    /// Path for the JSON curve store.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Optional path for a JSON regularity report.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the `shift` subcommand.
#[derive(clap::Args)]
pub struct ShiftArgs {
    /// Parquet table holding the values to correct.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Column to correct.
    #[arg(long)]
    pub variable: String,

    /// Name of the appended column.
    #[arg(short, long = "new-name")]
    pub new_name: String,

    /// Path to the JSON curve store.
    #[arg(short, long)]
    pub curves: PathBuf,

    /// Name of the source curve.
    #[arg(long)]
    pub source: String,

    /// Name of the target curve.
    #[arg(long)]
    pub target: String,

    /// Always invert the target curve by bisection.
    #[arg(short, long)]
    pub bisect: bool,

    /// Tail-linearization threshold in [0, 0.5].
    #[arg(short = 'l', long = "tail-threshold")]
    pub tail_threshold: Option<f64>,

    /// Output table; the input is rewritten in place when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Optional TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `scan` subcommand.
#[derive(clap::Args)]
pub struct ScanArgs {
    /// Path to the JSON curve store.
    #[arg(short, long)]
    pub curves: PathBuf,

    /// Source curve names.
    #[arg(short, long, num_args = 1.., required = true)]
    pub sources: Vec<String>,

    /// Target curve names, one per source.
    #[arg(short, long, num_args = 1.., required = true)]
    pub targets: Vec<String>,

    /// Custom labels, one per pair. `{default}` expands to the generated label.
    #[arg(long, num_args = 1..)]
    pub labels: Vec<String>,

    /// Always invert the target curves by bisection.
    #[arg(short, long)]
    pub bisect: bool,

    /// Per-pair bisection flags (0 or 1); overrides `--bisect`.
    #[arg(long = "bisect-individual", num_args = 1.., value_parser = clap::value_parser!(u8).range(0..=1))]
    pub bisect_individual: Vec<u8>,

    /// Tail-linearization thresholds: one for all pairs, or one per pair.
    #[arg(short = 'l', long = "tail-threshold", num_args = 1..)]
    pub tail_threshold: Vec<f64>,

    /// Lower bound of the scanned input range.
    #[arg(long = "x-min", allow_hyphen_values = true)]
    pub x_min: Option<f64>,

    /// Upper bound of the scanned input range.
    #[arg(long = "x-max", allow_hyphen_values = true)]
    pub x_max: Option<f64>,

    /// Path for the JSON scan output.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Optional TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scan_lists() {
        let cli = Cli::try_parse_from([
            "qmap", "scan", "-c", "curves.json", "-s", "mc_a", "mc_b", "-t", "data_a", "data_b",
            "--bisect-individual", "0", "1", "-l", "0.05", "--x-min", "-2.5", "-o", "scan.json",
        ])
        .unwrap();
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.sources, ["mc_a", "mc_b"]);
        assert_eq!(args.targets, ["data_a", "data_b"]);
        assert_eq!(args.bisect_individual, [0, 1]);
        assert_eq!(args.tail_threshold, [0.05]);
        assert_eq!(args.x_min, Some(-2.5));
        assert!(args.labels.is_empty());
    }

    #[test]
    fn bisect_flags_must_be_binary() {
        let parsed = Cli::try_parse_from([
            "qmap", "scan", "-c", "c.json", "-s", "a", "-t", "b", "--bisect-individual", "2",
            "-o", "s.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn verbosity_is_global() {
        let cli = Cli::try_parse_from([
            "qmap", "build", "-i", "h.json", "-s", "pt", "-o", "c.json", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
