//! Worked examples on small hand-made histograms.

use std::sync::Arc;

use approx::assert_relative_eq;
use qmap_quantile_map::{
    CollectingSink, Diagnostic, Histogram, InversionMethod, MonotoneCurve, QuantileMapError,
    QuantileShifter, ShifterConfig, build_cdf, invert,
};

#[test]
fn symmetric_histogram_knots_and_median() {
    let hist = Histogram::uniform(0.0, 4.0, vec![10.0, 20.0, 20.0, 10.0]).unwrap();
    let sink = CollectingSink::new();
    let cdf = build_cdf(&hist, "sym", &sink).unwrap();

    let ys: Vec<f64> = (0..cdf.knot_count()).map(|i| cdf.knot(i).y).collect();
    let expected = [0.0, 1.0 / 6.0, 0.5, 5.0 / 6.0, 1.0];
    for (y, e) in ys.iter().zip(expected) {
        assert_relative_eq!(*y, e, epsilon = 1e-15);
    }
    assert!(ys.windows(2).all(|w| w[0] <= w[1]));

    assert_eq!(cdf.evaluate(0.0), 0.0);
    assert_eq!(cdf.evaluate(4.0), 1.0);

    for method in [InversionMethod::Newton, InversionMethod::Bisection] {
        assert_eq!(invert(&cdf, 0.5, method, &sink), 2.0);
    }
    assert!(sink.is_empty());
}

#[test]
fn all_zero_histogram_is_degenerate() {
    let hist = Histogram::uniform(0.0, 4.0, vec![0.0; 4]).unwrap();
    let err = build_cdf(&hist, "zeros", &CollectingSink::new()).unwrap_err();
    assert!(matches!(
        err,
        QuantileMapError::DegenerateDistribution { ref name } if name == "zeros"
    ));
}

#[test]
fn upper_edge_with_tail_threshold_returns_target_upper_edge() {
    let source_hist = Histogram::uniform(0.0, 4.0, vec![10.0, 20.0, 20.0, 10.0]).unwrap();
    let target_hist = Histogram::new(vec![-2.0, 1.0, 3.25, 9.125], vec![4.0, 7.0, 1.0]).unwrap();
    let sink = CollectingSink::new();
    let source = Arc::new(build_cdf(&source_hist, "src", &sink).unwrap());
    let target = Arc::new(build_cdf(&target_hist, "tgt", &sink).unwrap());

    let shifter = QuantileShifter::new(
        source,
        target,
        ShifterConfig::new().with_tail_threshold(0.1),
    )
    .unwrap();
    assert_eq!(shifter.shift(4.0), 9.125);
}

#[test]
fn leading_empty_bins_map_zero_probability_to_support_start() {
    let hist = Histogram::uniform(0.0, 4.0, vec![0.0, 0.0, 5.0, 5.0]).unwrap();
    let cdf = build_cdf(&hist, "late", &CollectingSink::new()).unwrap();
    let sink = CollectingSink::new();
    assert_eq!(invert(&cdf, 0.0, InversionMethod::Bisection, &sink), 2.0);
}

#[test]
fn spiky_histogram_still_builds_with_warnings() {
    let hist = Histogram::uniform(0.0, 5.0, vec![0.0, 0.0, 100.0, 0.0, 0.0]).unwrap();
    let sink = CollectingSink::new();
    let cdf = build_cdf(&hist, "spike", &sink).unwrap();

    assert_eq!(cdf.evaluate(0.0), 0.0);
    assert_eq!(cdf.evaluate(5.0), 1.0);
    assert!(!cdf.regularity().is_regular());

    let events = sink.events();
    assert!(
        events
            .iter()
            .any(|d| matches!(d, Diagnostic::CurveOutOfRange { curve, permille } if curve == "spike" && *permille > 0.0))
    );
    assert!(
        events
            .iter()
            .any(|d| matches!(d, Diagnostic::NegativeDerivative { curve, .. } if curve == "spike"))
    );
}

#[test]
fn explicit_bins_and_edges_agree() {
    use qmap_quantile_map::Bin;

    let bins = [
        Bin {
            left: -1.0,
            width: 0.5,
            count: 3.0,
        },
        Bin {
            left: -0.5,
            width: 1.5,
            count: 9.0,
        },
        Bin {
            left: 1.0,
            width: 2.0,
            count: 4.0,
        },
    ];
    let from_bins = Histogram::from_bins(&bins).unwrap();
    let from_edges = Histogram::new(vec![-1.0, -0.5, 1.0, 3.0], vec![3.0, 9.0, 4.0]).unwrap();
    assert_eq!(from_bins, from_edges);

    let sink = CollectingSink::new();
    let a = build_cdf(&from_bins, "a", &sink).unwrap();
    let b = build_cdf(&from_edges, "a", &sink).unwrap();
    assert_eq!(a, b);
}

#[test]
fn shifting_towards_a_narrower_distribution_contracts_values() {
    let wide = Histogram::uniform(-3.0, 3.0, vec![1.0, 4.0, 10.0, 10.0, 4.0, 1.0]).unwrap();
    let narrow = Histogram::uniform(-1.5, 1.5, vec![1.0, 4.0, 10.0, 10.0, 4.0, 1.0]).unwrap();
    let sink = CollectingSink::new();
    let source = Arc::new(build_cdf(&wide, "wide", &sink).unwrap());
    let target = Arc::new(build_cdf(&narrow, "narrow", &sink).unwrap());

    let shifter = QuantileShifter::new(
        source,
        target,
        ShifterConfig::new().with_method(InversionMethod::Bisection),
    )
    .unwrap();

    // Same shape at half the width: x maps to about x / 2.
    for &v in &[-2.0, -1.0, 0.0, 1.0, 2.0] {
        assert_relative_eq!(shifter.shift(v), 0.5 * v, epsilon = 1e-2);
    }
}
