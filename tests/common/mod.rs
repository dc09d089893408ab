use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use camino::Utf8Path;
use tidegen::analysis::{Sample, TimeSeries};
use tidegen::constituent::Constituent;

pub const M2_SPEED: f64 = 28.9841042;

pub fn read_fixture(name: &str) -> String {
    let path = Utf8Path::new("tests/data").join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {path}: {e}"))
}

/// Hourly samples from `start` of `datum + Σ amplitude·cos(speed·t − phase)`, t in hours.
pub fn synthetic_series(
    start: i64,
    hours: i64,
    datum: f64,
    waves: &[(f64, f64, f64)],
) -> TimeSeries {
    let samples = (0..hours)
        .map(|h| {
            let timestamp = start + h * 3600;
            let t = timestamp as f64 / 3600.;
            let height = datum
                + waves
                    .iter()
                    .map(|(speed, amplitude, phase)| {
                        amplitude * ((speed * t - phase) * PI / 180.).cos()
                    })
                    .sum::<f64>();
            Sample { timestamp, height }
        })
        .collect();
    TimeSeries::new(samples).unwrap()
}

/// Constituent with unit node factors and zero equilibrium arguments.
pub fn idealized(name: &str, speed: f64, first_year: u16, years: usize) -> Constituent {
    Constituent {
        name: name.into(),
        speed,
        first_year,
        equilibrium_argument: vec![0.; years],
        node_factor: vec![1.; years],
    }
}

pub fn assert_tables_close(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(a, e, epsilon = epsilon);
    }
}
