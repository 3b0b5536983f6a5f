use tracing_subscriber::EnvFilter;

/// Workspace crate targets that receive log output.
const CRATE_TARGETS: &[&str] = &["qmap", "qmap_io", "qmap_quantile_map", "qmap_spline"];

/// Maps a `-v` count to a level name.
///
/// - 0 (none) -> warn, so that curve and inversion diagnostics are visible
/// - 1 (-v)   -> info
/// - 2 (-vv)  -> debug
/// - 3+ (-vvv)-> trace
fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn default_filter(verbosity: u8) -> String {
    let level = level(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing based on CLI verbosity level.
///
/// `RUST_LOG` overrides the CLI flag if set. Output goes to stderr.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_covers_every_crate() {
        let filter = default_filter(1);
        assert_eq!(
            filter,
            "qmap=info,qmap_io=info,qmap_quantile_map=info,qmap_spline=info"
        );
    }

    #[test]
    fn verbosity_saturates_at_trace() {
        assert_eq!(level(0), "warn");
        assert_eq!(level(3), "trace");
        assert_eq!(level(9), "trace");
    }
}
