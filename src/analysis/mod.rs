//! # Harmonic analysis
//!
//! Derive the amplitude and phase of each constituent from an observed
//! water-level [`TimeSeries`] by least-squares harmonic regression.
//!
//! ## Pipeline
//!
//! 1. **Span**: the calendar years of the first and last observation define the
//!    years over which the constituents must be generated.
//! 2. **Resolvability** ([`check_resolvability`]): the record must be long enough
//!    for every constituent to turn at least [`MIN_ROTATIONS`] times relative to
//!    its nearest neighbour in speed (Rayleigh criterion), and the slowest one at
//!    least that many times on its own.
//! 3. **Regression**: each observation contributes a row
//!    `[1, f₁cos z₁, …, f_k cos z_k, f₁ sin z₁, …, f_k sin z_k]` where
//!    `z = speed·t/3600 + arg′` and `arg′` is the yearly equilibrium argument
//!    re-referenced to the timestamp origin. The system is solved by SVD.
//! 4. **Conversion**: `amplitude = √(c² + s²)`, `phase = atan2(s, c)` reduced to
//!    [0, 360) and rounded to 0.01°.
//! 5. **Pruning** ([`pruning::prune`]).
//!
//! ## Example
//!
//! ```rust,no_run
//! use camino::Utf8Path;
//! use tidegen::analysis::{AnalysisParams, TimeSeries};
//! use tidegen::legacy_input::parse_legacy_input;
//! use tidegen::tidegen::Tidegen;
//!
//! let series = TimeSeries::read(Utf8Path::new("station.txt")).unwrap();
//! let params = AnalysisParams::builder().min_amplitude(0.005).build().unwrap();
//! let text = std::fs::read_to_string("congen_input.txt").unwrap();
//! let definitions = parse_legacy_input(&text).unwrap();
//!
//! let mut tidegen = Tidegen::default();
//! let report = tidegen.analyze(&definitions, &series, &params).unwrap();
//! println!("{}", report.summary());
//! ```
pub mod pruning;

use std::cmp::Ordering::{Equal, Greater};

use camino::Utf8Path;
use itertools::{Itertools, MinMaxResult};
use nalgebra::{DMatrix, DVector};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::constants::{
    Degree, Timestamp, Year, AVG_SECONDS_PER_YEAR, MIN_ROTATIONS, ROTATION_FACTOR,
    ROTATION_TOLERANCE,
};
use crate::constituent::{Constituent, GenerationSpan, SpeedEpoch};
use crate::tables::{normalize_degrees, round_half_even};
use crate::tidegen_errors::{TidegenError, UnresolvedPair};
use crate::time::{format_date, start_of_year, year_of_timestamp};
use crate::tokens::{long, real};
use pruning::{prune, DroppedStats};

/// Singular values below this are treated as zero by the solver
const SVD_EPSILON: f64 = 1e-10;

/// One water-level observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub height: f64,
}

/// A non-empty set of observations, in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Wrap observations; heights must be finite.
    pub fn new(samples: Vec<Sample>) -> Result<Self, TidegenError> {
        if samples.is_empty() {
            return Err(TidegenError::EmptyTimeSeries);
        }
        if let Some(index) = samples.iter().position(|s| !s.height.is_finite()) {
            return Err(TidegenError::TimeSeriesFormat {
                line: index + 1,
                reason: format!("sample {} has a non-finite height", index + 1),
            });
        }
        Ok(TimeSeries { samples })
    }

    /// Parse `timestamp height` pairs, one per line. Blank lines are skipped and
    /// heights such as `nan` or `inf` are rejected with their line number.
    pub fn parse(text: &str) -> Result<Self, TidegenError> {
        let samples = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                let line_error = |reason: String| TidegenError::TimeSeriesFormat {
                    line: index + 1,
                    reason,
                };
                match line.split_whitespace().collect::<Vec<_>>().as_slice() {
                    [t, h] => Ok(Sample {
                        timestamp: long(t).map_err(line_error)?,
                        height: real(h).map_err(line_error)?,
                    }),
                    fields => Err(line_error(format!(
                        "expected 'timestamp height', found {} fields",
                        fields.len()
                    ))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(samples)
    }

    pub fn read(path: &Utf8Path) -> Result<Self, TidegenError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Earliest and latest timestamps.
    pub fn bounds(&self) -> (Timestamp, Timestamp) {
        match self.samples.iter().map(|s| s.timestamp).minmax() {
            MinMaxResult::MinMax(first, last) => (first, last),
            MinMaxResult::OneElement(t) => (t, t),
            // construction rejects empty series
            MinMaxResult::NoElements => (0, 0),
        }
    }

    /// Length of the record in average Gregorian years.
    pub fn record_years(&self) -> f64 {
        let (first, last) = self.bounds();
        last.abs_diff(first) as f64 / AVG_SECONDS_PER_YEAR as f64
    }

    /// Years covered by the record, with the given speed epoch.
    pub fn span(&self, speed_epoch: SpeedEpoch) -> Result<GenerationSpan, TidegenError> {
        let (first, last) = self.bounds();
        GenerationSpan::new(
            year_of_timestamp(first)? as i64,
            year_of_timestamp(last)? as i64,
            speed_epoch,
        )
    }
}

/// Parameters of a harmonic analysis run.
///
/// Build with [`AnalysisParams::builder`] to get validation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    /// Report unresolvable pairs as warnings instead of failing
    pub force: bool,
    /// Keep at most this many constituents
    pub max_constituents: Option<usize>,
    /// Drop constituents weaker than this, in the units of the time series
    pub min_amplitude: f64,
    /// Replace the fitted mean level
    pub datum_override: Option<f64>,
    /// Epoch of the constituent speeds
    pub speed_epoch: SpeedEpoch,
}

impl AnalysisParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AnalysisParamsBuilder {
        AnalysisParamsBuilder::new()
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            force: false,
            max_constituents: None,
            min_amplitude: 0.,
            datum_override: None,
            speed_epoch: SpeedEpoch::default(),
        }
    }
}

/// Builder for [`AnalysisParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct AnalysisParamsBuilder {
    params: AnalysisParams,
}

impl AnalysisParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: AnalysisParams::default(),
        }
    }

    pub fn force(mut self, v: bool) -> Self {
        self.params.force = v;
        self
    }
    pub fn max_constituents(mut self, v: usize) -> Self {
        self.params.max_constituents = Some(v);
        self
    }
    pub fn min_amplitude(mut self, v: f64) -> Self {
        self.params.min_amplitude = v;
        self
    }
    pub fn datum_override(mut self, v: f64) -> Self {
        self.params.datum_override = Some(v);
        self
    }
    pub fn speed_epoch(mut self, v: SpeedEpoch) -> Self {
        self.params.speed_epoch = v;
        self
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `min_amplitude ≥ 0` and not NaN
    /// * `max_constituents ≥ 1` when set
    /// * `datum_override` finite when set
    /// * a fixed speed epoch lies in [1, 4000]
    pub fn build(self) -> Result<AnalysisParams, TidegenError> {
        let p = &self.params;

        if !Self::ge0(p.min_amplitude) || p.min_amplitude.is_infinite() {
            return Err(TidegenError::InvalidAnalysisParameter(format!(
                "min_amplitude must be a finite value >= 0, got {}",
                p.min_amplitude
            )));
        }
        if p.max_constituents == Some(0) {
            return Err(TidegenError::InvalidAnalysisParameter(
                "max_constituents must be >= 1".into(),
            ));
        }
        if let Some(datum) = p.datum_override {
            if !datum.is_finite() {
                return Err(TidegenError::InvalidAnalysisParameter(format!(
                    "datum_override must be finite, got {datum}"
                )));
            }
        }
        if let SpeedEpoch::Fixed(year) = p.speed_epoch {
            crate::time::checked_year(year as i64)?;
        }

        Ok(self.params)
    }
}

/// Check that the record can tell the constituents apart.
///
/// Arguments
/// ---------
/// * `constituents`: any order
/// * `record_years`: record length in average Gregorian years
/// * `force`: downgrade unresolvable pairs to warnings
///
/// Return
/// ------
/// * the unresolvable adjacent pairs (empty unless `force`)
/// * [`TidegenError::RecordTooShort`] when the slowest constituent does not
///   complete [`MIN_ROTATIONS`] over the record, forced or not
/// * [`TidegenError::UnresolvableConstituents`] listing every flagged pair
///   when `force` is not set
pub fn check_resolvability(
    constituents: &[Constituent],
    record_years: f64,
    force: bool,
) -> Result<Vec<UnresolvedPair>, TidegenError> {
    let threshold = MIN_ROTATIONS - ROTATION_TOLERANCE;
    let sorted = constituents
        .iter()
        .sorted_by(|a, b| a.speed.total_cmp(&b.speed))
        .collect_vec();

    let Some(slowest) = sorted.first() else {
        return Err(TidegenError::NoConstituents);
    };
    if slowest.speed * ROTATION_FACTOR * record_years < threshold {
        return Err(TidegenError::RecordTooShort {
            name: slowest.name.clone(),
            speed: slowest.speed,
            rotations_per_year: slowest.speed * ROTATION_FACTOR,
            record_years,
        });
    }

    let pairs = sorted
        .iter()
        .tuple_windows()
        .filter_map(|(slower, faster)| {
            let rotations_per_year = (faster.speed - slower.speed) * ROTATION_FACTOR;
            (rotations_per_year * record_years < threshold).then(|| UnresolvedPair {
                slower: slower.name.clone(),
                slower_speed: slower.speed,
                faster: faster.name.clone(),
                faster_speed: faster.speed,
                rotations_per_year,
            })
        })
        .collect_vec();

    if !pairs.is_empty() && !force {
        return Err(TidegenError::UnresolvableConstituents {
            record_years,
            pairs,
        });
    }
    Ok(pairs)
}

/// Fitted amplitude and phase of one constituent.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicEntry {
    pub name: String,
    /// In the units of the time series, ≥ 0
    pub amplitude: f64,
    /// Degrees in [0, 360), two decimals
    pub phase: Degree,
}

/// Outcome of a harmonic analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Mean water level, or the override
    pub datum: f64,
    /// Surviving constituents, in definition order
    pub entries: Vec<HarmonicEntry>,
    pub dropped: DroppedStats,
}

impl AnalysisResult {
    pub fn get(&self, name: &str) -> Option<&HarmonicEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// `name → {amplitude, phase}` view for serialization, amplitude at 4 decimals.
    pub fn harmonic_constants(&self) -> HarmonicConstants<'_> {
        HarmonicConstants(&self.entries)
    }
}

/// Ordered map of harmonic constants, see [`AnalysisResult::harmonic_constants`].
pub struct HarmonicConstants<'a>(&'a [HarmonicEntry]);

#[derive(Serialize)]
struct Constant {
    amplitude: f64,
    phase: Degree,
}

impl Serialize for HarmonicConstants<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(
                &entry.name,
                &Constant {
                    amplitude: round_half_even(entry.amplitude, 4),
                    phase: entry.phase,
                },
            )?;
        }
        map.end()
    }
}

/// Everything known about an analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub observations: usize,
    pub first_timestamp: Timestamp,
    pub last_timestamp: Timestamp,
    pub record_years: f64,
    pub constituents_tried: usize,
    /// Unresolvable pairs that were accepted because of `force`
    pub warnings: Vec<UnresolvedPair>,
    pub min_amplitude: f64,
    pub max_constituents: Option<usize>,
}

impl AnalysisReport {
    /// Human-readable account of the run, suitable as station comments.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Harmonic constants derived by tidegen {}", env!("CARGO_PKG_VERSION")),
            format!(
                "using {} observations from {} to {}",
                self.observations,
                format_date(self.first_timestamp),
                format_date(self.last_timestamp)
            ),
            format!("number of constituents tried = {}", self.constituents_tried),
        ];
        if !self.warnings.is_empty() {
            lines.push("warnings about time series being too short were ignored".into());
        }
        if self.min_amplitude > 0. || self.max_constituents.is_some() {
            if self.min_amplitude > 0. {
                lines.push(format!(
                    "minimum amplitude to retain constituent = {:.4}",
                    self.min_amplitude
                ));
            }
            if let Some(max) = self.max_constituents {
                lines.push(format!("maximum number of constituents to retain = {max}"));
            }
            let dropped = &self.result.dropped;
            if dropped.total_amplitude > 0. {
                lines.push(format!(
                    "max dropped amp {:.4}, total {:.4}",
                    dropped.max_amplitude, dropped.total_amplitude
                ));
            } else {
                lines.push("no loss".into());
            }
        }
        lines.join("\n")
    }
}

/// Convert the regression coefficients of one constituent.
fn amplitude_phase(c: f64, s: f64) -> (f64, Degree) {
    let phase = round_half_even(normalize_degrees(s.atan2(c).to_degrees()), 2);
    (c.hypot(s), if phase >= 360. { 0. } else { phase })
}

/// Least-squares harmonic regression.
#[derive(Debug, Clone, Default)]
pub struct HarmonicAnalyzer {
    params: AnalysisParams,
}

impl HarmonicAnalyzer {
    pub fn new(params: AnalysisParams) -> Self {
        HarmonicAnalyzer { params }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Fit the constituents to the observations.
    ///
    /// Arguments
    /// ---------
    /// * `constituents`: generated over (at least) the years of the record
    /// * `series`: observations
    ///
    /// Return
    /// ------
    /// * the pruned result with its run report
    /// * resolvability, span, solver or pruning errors, see [`TidegenError`]
    ///
    /// See also
    /// --------
    /// * [`crate::tidegen::Tidegen::analyze`] – generates the constituents for the record span.
    pub fn analyze(
        &self,
        constituents: &[Constituent],
        series: &TimeSeries,
    ) -> Result<AnalysisReport, TidegenError> {
        if constituents.is_empty() {
            return Err(TidegenError::NoConstituents);
        }
        let (first_timestamp, last_timestamp) = series.bounds();
        let record_years = series.record_years();

        let warnings = check_resolvability(constituents, record_years, self.params.force)?;
        for pair in &warnings {
            warn!("forced past unresolvable pair: {pair}");
        }

        let (datum, raw) = self.regress(constituents, series)?;
        let (entries, dropped) = prune(
            raw,
            self.params.max_constituents,
            self.params.min_amplitude,
        )?;

        let report = AnalysisReport {
            result: AnalysisResult {
                datum: self.params.datum_override.unwrap_or(datum),
                entries,
                dropped,
            },
            observations: series.len(),
            first_timestamp,
            last_timestamp,
            record_years,
            constituents_tried: constituents.len(),
            warnings,
            min_amplitude: self.params.min_amplitude,
            max_constituents: self.params.max_constituents,
        };
        info!(
            "fitted {} of {} constituents to {} observations ({:.3} years)",
            report.result.entries.len(),
            report.constituents_tried,
            report.observations,
            record_years
        );
        Ok(report)
    }

    /// Solve for the datum and the raw (unpruned) entries, in definition order.
    fn regress(
        &self,
        constituents: &[Constituent],
        series: &TimeSeries,
    ) -> Result<(f64, Vec<HarmonicEntry>), TidegenError> {
        let k = constituents.len();
        let n = series.len();
        let columns = 1 + 2 * k;
        if n < columns {
            return Err(TidegenError::LeastSquares(format!(
                "{n} observations cannot determine {columns} unknowns"
            )));
        }
        debug!("harmonic regression: {n} rows, {columns} columns");

        // arguments re-referenced to t = 0, so that z = speed·t/3600 + arg′
        let shifted = |c: &Constituent, year: Year| -> Result<Degree, TidegenError> {
            let start_hours = start_of_year(year) as f64 / 3600.;
            Ok(normalize_degrees(c.argument(year)? - c.speed * start_hours))
        };

        let mut design = DMatrix::<f64>::zeros(n, columns);
        for (row, sample) in series.samples().iter().enumerate() {
            let year = year_of_timestamp(sample.timestamp)?;
            let hours = sample.timestamp as f64 / 3600.;
            design[(row, 0)] = 1.;
            for (j, c) in constituents.iter().enumerate() {
                let z = (c.speed * hours + shifted(c, year)?).to_radians();
                let f = c.factor(year)?;
                design[(row, 1 + j)] = f * z.cos();
                design[(row, 1 + k + j)] = f * z.sin();
            }
        }
        let heights = DVector::from_iterator(n, series.samples().iter().map(|s| s.height));

        let svd = design.svd(true, true);
        let solution = svd
            .solve(&heights, SVD_EPSILON)
            .map_err(|e| TidegenError::LeastSquares(e.to_string()))?;

        let entries = constituents
            .iter()
            .enumerate()
            .map(|(j, c)| {
                let (amplitude, phase) = amplitude_phase(solution[1 + j], solution[1 + k + j]);
                HarmonicEntry {
                    name: c.name.clone(),
                    amplitude,
                    phase,
                }
            })
            .collect();
        Ok((solution[0], entries))
    }
}

#[cfg(test)]
mod analysis_test {
    use super::*;
    use crate::constants::AVG_HOURS_PER_YEAR;
    use approx::assert_abs_diff_eq;

    const M2_SPEED: f64 = 28.9841042;

    /// Constituent with unit node factor and zero argument, for years starting at 1970.
    fn plain(name: &str, speed: f64, years: usize) -> Constituent {
        Constituent {
            name: name.into(),
            speed,
            first_year: 1970,
            equilibrium_argument: vec![0.; years],
            node_factor: vec![1.; years],
        }
    }

    fn hourly(hours: i64, height: impl Fn(f64) -> f64) -> TimeSeries {
        TimeSeries::new(
            (0..hours)
                .map(|h| Sample {
                    timestamp: h * 3600,
                    height: height(h as f64),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_m2_recovery() {
        let series = hourly(8760, |h| 1.5 * (M2_SPEED * h - 45.).to_radians().cos());
        let report = HarmonicAnalyzer::default()
            .analyze(&[plain("M2", M2_SPEED, 1)], &series)
            .unwrap();
        let m2 = report.result.get("M2").unwrap();
        assert_abs_diff_eq!(m2.amplitude, 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(m2.phase, 45.0, epsilon = 0.01);
        assert_abs_diff_eq!(report.result.datum, 0.0, epsilon = 1e-6);
        assert_eq!(report.observations, 8760);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_two_constituents_with_datum() {
        let series = hourly(8760, |h| {
            2.0 + 1.2 * (M2_SPEED * h - 100.).to_radians().cos()
                + 0.4 * (30. * h - 300.).to_radians().cos()
        });
        let constituents = [plain("M2", M2_SPEED, 1), plain("S2", 30., 1)];
        let report = HarmonicAnalyzer::default()
            .analyze(&constituents, &series)
            .unwrap();
        let result = &report.result;
        assert_abs_diff_eq!(result.datum, 2.0, epsilon = 1e-6);
        assert_eq!(result.entries[0].name, "M2");
        assert_abs_diff_eq!(result.entries[0].amplitude, 1.2, epsilon = 1e-6);
        assert_abs_diff_eq!(result.entries[0].phase, 100.0, epsilon = 0.01);
        assert_abs_diff_eq!(result.entries[1].amplitude, 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(result.entries[1].phase, 300.0, epsilon = 0.01);
    }

    #[test]
    fn test_datum_override_and_pruning() {
        let series = hourly(2000, |h| 0.5 + (M2_SPEED * h).to_radians().cos());
        let params = AnalysisParams::builder()
            .datum_override(7.25)
            .min_amplitude(0.1)
            .build()
            .unwrap();
        let constituents = [plain("M2", M2_SPEED, 1), plain("S2", 30., 1)];
        let report = HarmonicAnalyzer::new(params)
            .analyze(&constituents, &series)
            .unwrap();
        assert_eq!(report.result.datum, 7.25);
        assert_eq!(report.result.entries.len(), 1);
        assert_eq!(report.result.entries[0].name, "M2");
        assert!(report.summary().contains("minimum amplitude to retain constituent = 0.1000"));
    }

    #[test]
    fn test_resolvability_boundary() {
        let step = |rotations: f64| rotations / (AVG_HOURS_PER_YEAR / 360.);
        let pair = |rotations: f64| {
            [
                plain("A", 10., 1),
                plain("B", 10. + step(rotations), 1),
            ]
        };
        assert!(check_resolvability(&pair(0.99), 1.0, false).unwrap().is_empty());

        let err = check_resolvability(&pair(0.98), 1.0, false).unwrap_err();
        match err {
            TidegenError::UnresolvableConstituents { pairs, .. } => {
                assert_eq!(pairs.len(), 1);
                assert_eq!(pairs[0].slower, "A");
                assert_eq!(pairs[0].faster, "B");
                assert_abs_diff_eq!(pairs[0].rotations_per_year, 0.98, epsilon = 1e-9);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let warnings = check_resolvability(&pair(0.98), 1.0, true).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_slowest_constituent_is_fatal_even_forced() {
        let constituents = [plain("M2", M2_SPEED, 1), plain("SA", 0.0410686, 1)];
        let err = check_resolvability(&constituents, 0.5, true).unwrap_err();
        assert!(matches!(err, TidegenError::RecordTooShort { ref name, .. } if name == "SA"));
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_speed() {
        let constituents = [
            plain("C", 30., 1),
            plain("A", 10., 1),
            plain("B", 10.001, 1),
        ];
        let err = check_resolvability(&constituents, 1.0, false).unwrap_err();
        assert_eq!(
            err,
            TidegenError::UnresolvableConstituents {
                record_years: 1.0,
                pairs: vec![UnresolvedPair {
                    slower: "A".into(),
                    slower_speed: 10.,
                    faster: "B".into(),
                    faster_speed: 10.001,
                    rotations_per_year: (10.001 - 10.) * ROTATION_FACTOR,
                }]
            }
        );
    }

    #[test]
    fn test_forced_analysis_reports_warnings() {
        let series = hourly(8760, |h| (M2_SPEED * h).to_radians().cos());
        let constituents = [plain("M2", M2_SPEED, 1), plain("M2bis", M2_SPEED + 0.001, 1)];
        assert!(HarmonicAnalyzer::default()
            .analyze(&constituents, &series)
            .is_err());

        let params = AnalysisParams::builder().force(true).build().unwrap();
        let report = HarmonicAnalyzer::new(params).analyze(&constituents, &series);
        // nearly collinear columns: the solve may or may not succeed, but never on resolvability
        if let Ok(report) = report {
            assert_eq!(report.warnings.len(), 1);
            assert!(report.summary().contains("too short were ignored"));
        }
    }

    #[test]
    fn test_constituent_span_checked() {
        // record spans 1970 and 1971, constituent only 1970
        let series = hourly(9000, |h| (M2_SPEED * h).to_radians().cos());
        let err = HarmonicAnalyzer::default()
            .analyze(&[plain("M2", M2_SPEED, 1)], &series)
            .unwrap_err();
        assert!(matches!(err, TidegenError::ConstituentSpan { year: 1971, .. }));
    }

    #[test]
    fn test_too_few_observations() {
        // long enough to resolve M2, too few rows for 3 unknowns
        let series = TimeSeries::new(vec![
            Sample {
                timestamp: 0,
                height: 1.,
            },
            Sample {
                timestamp: 300 * 86_400,
                height: 1.,
            },
        ])
        .unwrap();
        let err = HarmonicAnalyzer::default()
            .analyze(&[plain("M2", M2_SPEED, 1)], &series)
            .unwrap_err();
        assert!(matches!(err, TidegenError::LeastSquares(_)));
    }

    #[test]
    fn test_amplitude_phase() {
        let (a, p) = amplitude_phase(0., -2.);
        assert_abs_diff_eq!(a, 2.);
        assert_eq!(p, 270.);
        // -0.001 degrees rounds to 360.00, reported as 0
        let (_, p) = amplitude_phase(1., (-0.001f64).to_radians().tan());
        assert_eq!(p, 0.);
    }

    #[test]
    fn test_params_validation() {
        assert!(AnalysisParams::builder().min_amplitude(-0.1).build().is_err());
        assert!(AnalysisParams::builder().min_amplitude(f64::NAN).build().is_err());
        assert!(AnalysisParams::builder().max_constituents(0).build().is_err());
        assert!(AnalysisParams::builder()
            .datum_override(f64::INFINITY)
            .build()
            .is_err());
        assert_eq!(
            AnalysisParams::builder()
                .speed_epoch(SpeedEpoch::Fixed(0))
                .build(),
            Err(TidegenError::YearOutOfRange(0))
        );
        let p = AnalysisParams::builder()
            .force(true)
            .max_constituents(30)
            .min_amplitude(0.01)
            .build()
            .unwrap();
        assert!(p.force);
        assert_eq!(p.max_constituents, Some(30));
        assert_eq!(AnalysisParams::new(), AnalysisParams::default());
    }

    #[test]
    fn test_time_series_parse() {
        let series = TimeSeries::parse("0 1.5\n\n3600 -0.25\n7200   2\n").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.bounds(), (0, 7200));
        assert_eq!(series.samples()[1].height, -0.25);

        let err = TimeSeries::parse("0 1.5\n3600\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        let err = TimeSeries::parse("0 1.5\n\n1.5 3600\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert_eq!(
            TimeSeries::parse("\n  \n").unwrap_err(),
            TidegenError::EmptyTimeSeries
        );
    }

    #[test]
    fn test_non_finite_heights() {
        for token in ["nan", "inf", "-infinity"] {
            let text = format!("0 1.5\n\n3600 {token}\n7200 2.0\n");
            let err = TimeSeries::parse(&text).unwrap_err();
            assert!(
                matches!(err, TidegenError::TimeSeriesFormat { line: 3, .. }),
                "{token}: {err:?}"
            );
        }
        let err = TimeSeries::new(vec![
            Sample {
                timestamp: 0,
                height: 1.,
            },
            Sample {
                timestamp: 3600,
                height: f64::NAN,
            },
        ])
        .unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_extreme_timestamps() {
        let series = TimeSeries::new(vec![
            Sample {
                timestamp: i64::MIN,
                height: 0.,
            },
            Sample {
                timestamp: 0,
                height: 0.,
            },
            Sample {
                timestamp: i64::MAX,
                height: 0.,
            },
        ])
        .unwrap();
        assert!(series.record_years().is_finite());
        assert!(matches!(
            series.span(SpeedEpoch::default()),
            Err(TidegenError::YearOutOfRange(_))
        ));
        assert!(matches!(
            HarmonicAnalyzer::default().analyze(&[plain("M2", M2_SPEED, 1)], &series),
            Err(TidegenError::YearOutOfRange(_))
        ));
    }

    #[test]
    fn test_time_series_span() {
        let series = TimeSeries::new(vec![
            Sample {
                timestamp: 946_684_800,
                height: 0.,
            },
            Sample {
                timestamp: -1,
                height: 0.,
            },
        ])
        .unwrap();
        let span = series.span(SpeedEpoch::default()).unwrap();
        assert_eq!(span.first_year(), 1969);
        assert_eq!(span.last_year(), 2000);
        assert_eq!(span.speed_epoch(), 1900);
    }

    #[test]
    fn test_harmonic_constants_serialization() {
        let result = AnalysisResult {
            datum: 1.0,
            entries: vec![
                HarmonicEntry {
                    name: "M2".into(),
                    amplitude: 1.234567,
                    phase: 45.5,
                },
                HarmonicEntry {
                    name: "K1".into(),
                    amplitude: 0.5,
                    phase: 0.,
                },
            ],
            dropped: DroppedStats::default(),
        };
        let json = serde_json::to_string(&result.harmonic_constants()).unwrap();
        assert_eq!(
            json,
            r#"{"M2":{"amplitude":1.2346,"phase":45.5},"K1":{"amplitude":0.5,"phase":0.0}}"#
        );
    }
}
