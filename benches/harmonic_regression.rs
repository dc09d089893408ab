use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tidegen::analysis::{HarmonicAnalyzer, Sample, TimeSeries};
use tidegen::constituent::Constituent;

/// Speeds of O1, K1, N2, M2, S2, M4 (degrees per hour)
const SPEEDS: [(&str, f64); 6] = [
    ("O1", 13.9430356),
    ("K1", 15.0410686),
    ("N2", 28.4397295),
    ("M2", 28.9841042),
    ("S2", 30.0),
    ("M4", 57.9682084),
];

fn constituents() -> Vec<Constituent> {
    SPEEDS
        .iter()
        .map(|(name, speed)| Constituent {
            name: name.to_string(),
            speed: *speed,
            first_year: 1970,
            equilibrium_argument: vec![0.],
            node_factor: vec![1.],
        })
        .collect()
}

/// One year of hourly heights with random constants and a little noise.
fn noisy_year(rng: &mut StdRng) -> TimeSeries {
    let constants: Vec<(f64, f64, f64)> = SPEEDS
        .iter()
        .map(|(_, speed)| (*speed, rng.random_range(0.05..1.5), rng.random_range(0.0..360.0)))
        .collect();
    let samples = (0..8760)
        .map(|h| {
            let t = h as f64;
            let tide: f64 = constants
                .iter()
                .map(|(speed, amplitude, phase)| amplitude * (speed * t - phase).to_radians().cos())
                .sum();
            Sample {
                timestamp: h * 3600,
                height: tide + rng.random_range(-0.02..0.02),
            }
        })
        .collect();
    TimeSeries::new(samples).unwrap()
}

fn bench_one_year_hourly(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x7_1DE5);
    let series = noisy_year(&mut rng);
    let constituents = constituents();
    let analyzer = HarmonicAnalyzer::default();

    c.bench_function("harmonic_regression/one_year_hourly_6", |b| {
        b.iter(|| {
            black_box(
                analyzer
                    .analyze(black_box(&constituents), black_box(&series))
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_one_year_hourly);
criterion_main!(benches);
