use thiserror::Error;

use crate::constants::{DegreePerHour, Year};

/// Two adjacent constituents (sorted by speed) that the record cannot separate.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedPair {
    pub slower: String,
    pub slower_speed: DegreePerHour,
    pub faster: String,
    pub faster_speed: DegreePerHour,
    /// Relative rotations per average Gregorian year
    pub rotations_per_year: f64,
}

impl std::fmt::Display for UnresolvedPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.7} deg/hr) and {} ({:.7} deg/hr), delta = {:.6} rotations/year",
            self.slower, self.slower_speed, self.faster, self.faster_speed, self.rotations_per_year
        )
    }
}

fn list_pairs(pairs: &[UnresolvedPair]) -> String {
    pairs
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum TidegenError {
    #[error("Year out of range [1, 4000]: {0}")]
    YearOutOfRange(i64),

    #[error("End year {last} is before start year {first}")]
    InvalidYearRange { first: Year, last: Year },

    #[error("{kind} definition expects {expected} coefficients, got {found}")]
    CoefficientCount {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Unknown node factor formula: {0}")]
    UnknownNodeFactorFormula(u32),

    #[error("Invalid analysis parameter: {0}")]
    InvalidAnalysisParameter(String),

    #[error("Error on input line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("Error at line {line} of time series: {reason}")]
    TimeSeriesFormat { line: usize, reason: String },

    #[error("Malformed constituent table: {0}")]
    TableFormat(String),

    #[error("Constituent tables cannot be compared: {0}")]
    IncompatibleTables(String),

    #[error("No data found in time series")]
    EmptyTimeSeries,

    #[error("No constituents found")]
    NoConstituents,

    #[error(
        "The time series of length {record_years:.6} average Gregorian years is too short to resolve {name} ({speed:.7} deg/hr, {rotations_per_year:.6} rotations/year)"
    )]
    RecordTooShort {
        name: String,
        speed: DegreePerHour,
        rotations_per_year: f64,
        record_years: f64,
    },

    #[error(
        "The time series of length {record_years:.6} average Gregorian years is too short to separate: {}",
        list_pairs(pairs)
    )]
    UnresolvableConstituents {
        record_years: f64,
        pairs: Vec<UnresolvedPair>,
    },

    #[error("Constituent {name} covers years {first}..={last}, which does not include {year}")]
    ConstituentSpan {
        name: String,
        first: Year,
        last: Year,
        year: Year,
    },

    #[error("Least-squares solve failed: {0}")]
    LeastSquares(String),

    #[error("All constituents were eliminated")]
    AllConstituentsEliminated,

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl TidegenError {
    /// Line number carried by a legacy-format parse failure.
    pub fn line(&self) -> Option<usize> {
        match self {
            TidegenError::Format { line, .. } | TidegenError::TimeSeriesFormat { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}

impl PartialEq for TidegenError {
    fn eq(&self, other: &Self) -> bool {
        use TidegenError::*;
        match (self, other) {
            (YearOutOfRange(a), YearOutOfRange(b)) => a == b,
            (
                InvalidYearRange {
                    first: f1,
                    last: l1,
                },
                InvalidYearRange {
                    first: f2,
                    last: l2,
                },
            ) => f1 == f2 && l1 == l2,
            (
                CoefficientCount {
                    kind: k1,
                    expected: e1,
                    found: f1,
                },
                CoefficientCount {
                    kind: k2,
                    expected: e2,
                    found: f2,
                },
            ) => k1 == k2 && e1 == e2 && f1 == f2,
            (UnknownNodeFactorFormula(a), UnknownNodeFactorFormula(b)) => a == b,
            (InvalidAnalysisParameter(a), InvalidAnalysisParameter(b)) => a == b,
            (Format { line: a, .. }, Format { line: b, .. }) => a == b,
            (TimeSeriesFormat { line: a, .. }, TimeSeriesFormat { line: b, .. }) => a == b,
            (TableFormat(a), TableFormat(b)) => a == b,
            (IncompatibleTables(a), IncompatibleTables(b)) => a == b,
            (RecordTooShort { name: a, .. }, RecordTooShort { name: b, .. }) => a == b,
            (
                UnresolvableConstituents { pairs: a, .. },
                UnresolvableConstituents { pairs: b, .. },
            ) => a == b,
            (
                ConstituentSpan {
                    name: a, year: y1, ..
                },
                ConstituentSpan {
                    name: b, year: y2, ..
                },
            ) => a == b && y1 == y2,
            (LeastSquares(a), LeastSquares(b)) => a == b,

            // io::Error is not comparable: same variant means equal
            (IoError(_), IoError(_)) => true,

            (EmptyTimeSeries, EmptyTimeSeries) => true,
            (NoConstituents, NoConstituents) => true,
            (AllConstituentsEliminated, AllConstituentsEliminated) => true,

            _ => false,
        }
    }
}
