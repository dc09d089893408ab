//! # Constituent tables
//!
//! Text rendering of generated constituents, in the layout consumed by harmonic
//! tide predictors:
//!
//! ```text
//! # comment lines
//! 2                                   <- number of constituents
//! M2                           28.9841042
//! S2                           30.0000000
//! 1970                                <- first year
//! 68                                  <- number of years
//! M2                                  <- equilibrium arguments, 10 per line
//! 207.41 106.46  11.29 ...
//! S2
//!   0.00   0.00   0.00 ...
//! *END*
//! 68                                  <- number of years, again
//! M2                                  <- node factors, 10 per line
//! 1.0378 1.0356 ...
//! S2
//! 1.0000 1.0000 ...
//! *END*
//! ```
//!
//! Angles are normalized with [`normalize`], node factors are printed with four
//! decimals. [`TideTables::parse`] reads the format back, and
//! [`TideTables::differences`] compares two tables with the tolerances implied by
//! that precision.
use std::io::Write;

use camino::Utf8Path;
use itertools::Itertools;

use crate::constants::{Degree, DegreePerHour, Year};
use crate::constituent::{Constituent, GenerationSpan};
use crate::tidegen_errors::TidegenError;
use crate::tokens::{count, real};

/// Values per line in the yearly tables
const VALUES_PER_LINE: usize = 10;
const END_MARKER: &str = "*END*";

/// Largest argument difference explained by two-decimal rounding
pub const ARGUMENT_TOLERANCE: Degree = 0.01001;
/// Largest node factor difference explained by four-decimal rounding
pub const NODE_FACTOR_TOLERANCE: f64 = 0.0001001;

/// Reduce an angle to [0, 360].
///
/// `360` itself only comes out of the addition for tiny negative inputs; callers
/// that format the result deal with it (see [`normalize`]).
pub fn normalize_degrees(degrees: Degree) -> Degree {
    let mut reduced = degrees % 360.;
    if reduced < 0. {
        reduced += 360.;
    }
    // -0 from reducing -360
    reduced.abs()
}

/// Round to `decimals` places, ties to even, as the formatter does.
pub fn round_half_even(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// Format an angle reduced to [0, 360) with `decimals` places, right-aligned on
/// `4 + decimals` characters. A value that rounds up to 360 is printed as 0.
///
/// ```rust
/// use tidegen::tables::normalize;
///
/// assert_eq!(normalize(-90., 2), "270.00");
/// assert_eq!(normalize(725.5, 2), "  5.50");
/// assert_eq!(normalize(359.999, 2), "  0.00");
/// ```
pub fn normalize(degrees: Degree, decimals: usize) -> String {
    let width = 4 + decimals;
    let text = format!("{:>width$.decimals$}", normalize_degrees(degrees));
    match text.strip_prefix("36") {
        Some(rest) => format!("  {rest}"),
        None => text,
    }
}

/// Generated constituents over a common span of years.
#[derive(Debug, Clone, PartialEq)]
pub struct TideTables {
    pub first_year: Year,
    pub num_years: usize,
    pub constituents: Vec<Constituent>,
}

/// A difference between two tables that exceeds the printing precision.
#[derive(Debug, Clone, PartialEq)]
pub enum TableMismatch {
    Speed { name: String, delta: DegreePerHour },
    Argument { name: String, max_delta: Degree },
    NodeFactor { name: String, max_delta: f64 },
}

impl std::fmt::Display for TableMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableMismatch::Speed { name, delta } => {
                write!(f, "Speed of {name} mismatch (delta {delta})")
            }
            TableMismatch::Argument { name, max_delta } => {
                write!(f, "Argument of {name} mismatch (max delta {max_delta})")
            }
            TableMismatch::NodeFactor { name, max_delta } => {
                write!(f, "Node factor of {name} mismatch (max delta {max_delta})")
            }
        }
    }
}

fn max_abs_delta(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0., f64::max)
}

fn write_rows<W: Write>(
    out: &mut W,
    constituent: &Constituent,
    values: &[f64],
    render: impl Fn(f64) -> String,
) -> std::io::Result<()> {
    writeln!(out, "{}", constituent.name)?;
    for row in &values.iter().chunks(VALUES_PER_LINE) {
        writeln!(out, "{}", row.map(|v| render(*v)).join(" "))?;
    }
    Ok(())
}

const SPEED_HEADER: &str = "\
#
# Constituent speeds
# Format:  identifier [whitespace] speed [CR]
# Speed is in degrees per solar hour.
# Identifiers are for readability only; constituents are listed in the
# same order throughout this file.";

const ARGUMENT_HEADER: &str = "\
#
# Equilibrium arguments in degrees for the meridian of Greenwich, at the
# beginning of each year.
#
# First line:  how many years in this table [CR]
# Remainder of table:  identifier [whitespace] arg [whitespace] arg...
# Line breaks inside the table are ignored.
#
# DO NOT PUT COMMENT LINES INSIDE THE FOLLOWING TABLE.
# DO NOT REMOVE THE \"*END*\" AT THE END.";

const NODE_FACTOR_HEADER: &str = "\
#
# Node factors for the middle of each year.
#
# First line:  how many years in this table [CR]
# Remainder of table:  identifier [whitespace] factor [whitespace] factor...
# Line breaks inside the table are ignored.
#
# DO NOT PUT COMMENT LINES INSIDE THE FOLLOWING TABLE.
# DO NOT REMOVE THE \"*END*\" AT THE END.";

/// Sequential reader over the non-comment tokens of a table.
struct Tokens<'a> {
    inner: Box<dyn Iterator<Item = &'a str> + 'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Tokens {
            inner: Box::new(
                text.lines()
                    .filter(|line| !line.trim_start().starts_with('#'))
                    .flat_map(str::split_whitespace),
            ),
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str, TidegenError> {
        self.inner
            .next()
            .ok_or_else(|| {
                TidegenError::TableFormat(format!("unexpected end of table, expected {what}"))
            })
    }

    fn count(&mut self, what: &str) -> Result<usize, TidegenError> {
        let token = self.next(what)?;
        count(token)
            .map(|n| n as usize)
            .map_err(|reason| TidegenError::TableFormat(format!("{what}: {reason}")))
    }

    fn real(&mut self, what: &str) -> Result<f64, TidegenError> {
        let token = self.next(what)?;
        real(token).map_err(|reason| TidegenError::TableFormat(format!("{what}: {reason}")))
    }

    fn expect(&mut self, expected: &str, what: &str) -> Result<(), TidegenError> {
        let token = self.next(what)?;
        if token != expected {
            return Err(TidegenError::TableFormat(format!(
                "{what}: expected '{expected}', found '{token}'"
            )));
        }
        Ok(())
    }

    /// Name line followed by `n` values, checked against the name given in the speed table.
    fn yearly(&mut self, name: &str, n: usize, what: &str) -> Result<Vec<f64>, TidegenError> {
        self.expect(name, what)?;
        let mut values = Vec::new();
        for _ in 0..n {
            values.push(self.real(what)?);
        }
        Ok(values)
    }
}

impl TideTables {
    pub fn new(span: &GenerationSpan, constituents: Vec<Constituent>) -> Self {
        TideTables {
            first_year: span.first_year(),
            num_years: span.num_years(),
            constituents,
        }
    }

    /// Write the tables in text form.
    ///
    /// Arguments
    /// ---------
    /// * `out`: destination, written line by line
    ///
    /// Return
    /// ------
    /// * [`TidegenError::IoError`] if the destination fails
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), TidegenError> {
        writeln!(out, "# ------------- Begin congen output -------------")?;
        writeln!(out, "#\n# Number of constituents")?;
        writeln!(out, "{}", self.constituents.len())?;
        writeln!(out, "{SPEED_HEADER}")?;
        for c in &self.constituents {
            writeln!(out, "{:<27} {:11.7}", c.name, c.speed)?;
        }
        writeln!(out, "#\n# Starting year for equilibrium arguments and node factors")?;
        writeln!(out, "{}", self.first_year)?;

        writeln!(out, "{ARGUMENT_HEADER}")?;
        writeln!(out, "{}", self.num_years)?;
        for c in &self.constituents {
            write_rows(out, c, &c.equilibrium_argument, |a| normalize(a, 2))?;
        }
        writeln!(out, "{END_MARKER}")?;

        writeln!(out, "{NODE_FACTOR_HEADER}")?;
        writeln!(out, "{}", self.num_years)?;
        for c in &self.constituents {
            write_rows(out, c, &c.node_factor, |f| format!("{f:6.4}"))?;
        }
        writeln!(out, "{END_MARKER}")?;
        writeln!(out, "#\n# ------------- End congen output -------------")?;
        Ok(())
    }

    pub fn to_text(&self) -> Result<String, TidegenError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| TidegenError::TableFormat(e.to_string()))
    }

    /// Read tables written by [`TideTables::write_to`].
    ///
    /// Lines starting with `#` are skipped and yearly values may wrap freely.
    pub fn parse(text: &str) -> Result<Self, TidegenError> {
        let mut tokens = Tokens::new(text);

        let num_constituents = tokens.count("number of constituents")?;
        // counts come from the file: grow with the values actually read
        let mut speeds = Vec::new();
        for _ in 0..num_constituents {
            let name = tokens.next("constituent name")?;
            speeds.push((name, tokens.real("constituent speed")?));
        }

        let first_year = tokens.count("first year")?;
        let first_year = Year::try_from(first_year).map_err(|_| {
            TidegenError::TableFormat(format!("first year {first_year} out of range"))
        })?;

        let num_years = tokens.count("number of years")?;
        let arguments = speeds
            .iter()
            .map(|(name, _)| tokens.yearly(name, num_years, "equilibrium arguments"))
            .collect::<Result<Vec<_>, _>>()?;
        tokens.expect(END_MARKER, "end of equilibrium arguments")?;

        let repeated = tokens.count("number of years")?;
        if repeated != num_years {
            return Err(TidegenError::TableFormat(format!(
                "node factor table covers {repeated} years, arguments cover {num_years}"
            )));
        }
        let factors = speeds
            .iter()
            .map(|(name, _)| tokens.yearly(name, num_years, "node factors"))
            .collect::<Result<Vec<_>, _>>()?;
        tokens.expect(END_MARKER, "end of node factors")?;

        let constituents = speeds
            .into_iter()
            .zip(arguments)
            .zip(factors)
            .map(|(((name, speed), equilibrium_argument), node_factor)| Constituent {
                name: name.to_string(),
                speed,
                first_year,
                equilibrium_argument,
                node_factor,
            })
            .collect();

        Ok(TideTables {
            first_year,
            num_years,
            constituents,
        })
    }

    pub fn read(path: &Utf8Path) -> Result<Self, TidegenError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Compare with another table, constituent by constituent.
    ///
    /// Speeds must match exactly. Arguments and node factors may differ by the
    /// rounding of their printed form ([`ARGUMENT_TOLERANCE`],
    /// [`NODE_FACTOR_TOLERANCE`]). Arguments are compared as printed, without
    /// wrapping around 360.
    ///
    /// Return
    /// ------
    /// * the mismatches found, empty when the tables agree
    /// * [`TidegenError::IncompatibleTables`] when the tables do not list the same
    ///   constituents over the same years
    pub fn differences(&self, other: &TideTables) -> Result<Vec<TableMismatch>, TidegenError> {
        if self.constituents.len() != other.constituents.len() {
            return Err(TidegenError::IncompatibleTables(format!(
                "different number of constituents ({} vs. {})",
                self.constituents.len(),
                other.constituents.len()
            )));
        }
        if self.first_year != other.first_year {
            return Err(TidegenError::IncompatibleTables(format!(
                "different start year ({} vs. {})",
                self.first_year, other.first_year
            )));
        }
        if self.num_years != other.num_years {
            return Err(TidegenError::IncompatibleTables(format!(
                "different number of years ({} vs. {})",
                self.num_years, other.num_years
            )));
        }

        let mut mismatches = Vec::new();
        for (a, b) in self.constituents.iter().zip(&other.constituents) {
            if a.name != b.name {
                return Err(TidegenError::IncompatibleTables(format!(
                    "constituent name mismatch ({} vs. {})",
                    a.name, b.name
                )));
            }
            let delta = (a.speed - b.speed).abs();
            if delta > 0. {
                mismatches.push(TableMismatch::Speed {
                    name: a.name.clone(),
                    delta,
                });
            }
            let max_delta = max_abs_delta(&a.equilibrium_argument, &b.equilibrium_argument);
            if max_delta > ARGUMENT_TOLERANCE {
                mismatches.push(TableMismatch::Argument {
                    name: a.name.clone(),
                    max_delta,
                });
            }
            let max_delta = max_abs_delta(&a.node_factor, &b.node_factor);
            if max_delta > NODE_FACTOR_TOLERANCE {
                mismatches.push(TableMismatch::NodeFactor {
                    name: a.name.clone(),
                    max_delta,
                });
            }
        }
        Ok(mismatches)
    }
}

#[cfg(test)]
mod tables_test {
    use super::*;

    fn sample() -> TideTables {
        let yearly = |start: f64| (0..12).map(|k| start + 97.3 * k as f64).collect::<Vec<_>>();
        TideTables {
            first_year: 2000,
            num_years: 12,
            constituents: vec![
                Constituent {
                    name: "M2".into(),
                    speed: 28.9841042,
                    first_year: 2000,
                    equilibrium_argument: yearly(-1234.567),
                    node_factor: (0..12).map(|k| 0.963 + 0.006 * k as f64).collect(),
                },
                Constituent {
                    name: "S2".into(),
                    speed: 30.,
                    first_year: 2000,
                    equilibrium_argument: vec![0.; 12],
                    node_factor: vec![1.; 12],
                },
            ],
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(0., 2), "  0.00");
        assert_eq!(normalize(-360., 2), "  0.00");
        assert_eq!(normalize(360., 2), "  0.00");
        assert_eq!(normalize(-0.004, 2), "  0.00");
        assert_eq!(normalize(123.456, 2), "123.46");
        assert_eq!(normalize(-1., 2), "359.00");
        assert_eq!(normalize(36.5, 2), " 36.50");
        assert_eq!(normalize(10.1234, 3), " 10.123");
    }

    #[test]
    fn test_normalize_idempotent_and_periodic() {
        for x in [-7203.3, -12.7, 0.1, 44.4, 181.9, 359.2, 1e6 + 0.3] {
            let once = normalize(x, 2);
            let value: f64 = once.trim().parse().unwrap();
            assert_eq!(normalize(value, 2), once);
            for k in [-3., -1., 1., 5.] {
                assert_eq!(normalize(x + 360. * k, 2), once, "x = {x}, k = {k}");
            }
        }
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-360.), 0.);
        assert!(normalize_degrees(-360.).is_sign_positive());
        assert_eq!(normalize_degrees(450.), 90.);
        assert_eq!(normalize_degrees(-90.), 270.);
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(1.234567, 2), 1.23);
        assert_eq!(round_half_even(359.996, 2), 360.);
        assert_eq!(round_half_even(-0.001, 2), -0.);
    }

    #[test]
    fn test_layout() {
        let text = sample().to_text().unwrap();
        let lines: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(lines[0], "2");
        assert_eq!(lines[1], format!("{:<27} {:>11}", "M2", "28.9841042"));
        assert_eq!(lines[2], format!("{:<27} {:>11}", "S2", "30.0000000"));
        assert_eq!(lines[3], "2000");
        assert_eq!(lines[4], "12");
        assert_eq!(lines[5], "M2");
        // 10 values then 2 on the next line
        assert_eq!(lines[6].split_whitespace().count(), 10);
        assert_eq!(lines[6].len(), 10 * 6 + 9);
        assert_eq!(lines[7].split_whitespace().count(), 2);
        assert_eq!(lines[8], "S2");
        assert!(lines[9].starts_with("  0.00   0.00"));
        assert_eq!(lines[11], "*END*");
        assert_eq!(lines[12], "12");
        assert_eq!(lines[13], "M2");
        assert!(lines[14].starts_with("0.9630 0.9690"));
        assert_eq!(*lines.last().unwrap(), "*END*");
    }

    #[test]
    fn test_round_trip() {
        let original = sample();
        let read = TideTables::parse(&original.to_text().unwrap()).unwrap();
        assert_eq!(read.first_year, 2000);
        assert_eq!(read.num_years, 12);
        assert_eq!(read.constituents.len(), 2);
        for (a, b) in original.constituents.iter().zip(&read.constituents) {
            assert_eq!(a.name, b.name);
            assert!((a.speed - b.speed).abs() < 1e-7);
            for (x, y) in a.equilibrium_argument.iter().zip(&b.equilibrium_argument) {
                let d = (normalize_degrees(*x) - y).abs();
                assert!(d <= 0.005 + 1e-9 || (360. - d) <= 0.005 + 1e-9);
            }
            for (x, y) in a.node_factor.iter().zip(&b.node_factor) {
                assert!((x - y).abs() <= 0.00005 + 1e-12);
            }
        }
    }

    #[test]
    fn test_parse_errors() {
        let text = sample().to_text().unwrap();
        let truncated: String = text.lines().take(20).join("\n");
        assert!(matches!(
            TideTables::parse(&truncated),
            Err(TidegenError::TableFormat(_))
        ));

        let renamed = text.replacen("\nS2\n", "\nK2\n", 1);
        assert!(matches!(
            TideTables::parse(&renamed),
            Err(TidegenError::TableFormat(_))
        ));

        assert!(TideTables::parse("x").is_err());
    }

    #[test]
    fn test_huge_counts_in_header() {
        assert!(matches!(
            TideTables::parse("4294967295\nM2 28.98\n"),
            Err(TidegenError::TableFormat(_))
        ));
        assert!(matches!(
            TideTables::parse("1\nM2 28.98\n1970\n4294967295\nM2 1.0 2.0\n"),
            Err(TidegenError::TableFormat(_))
        ));
        assert!(matches!(
            TideTables::parse("1\nM2 nan\n"),
            Err(TidegenError::TableFormat(_))
        ));
    }

    #[test]
    fn test_differences() {
        let a = TideTables::parse(&sample().to_text().unwrap()).unwrap();
        assert!(a.differences(&a).unwrap().is_empty());

        let mut b = a.clone();
        b.constituents[0].speed += 1e-7;
        b.constituents[0].equilibrium_argument[3] += 0.02;
        b.constituents[1].node_factor[11] -= 0.0002;
        let found = a.differences(&b).unwrap();
        assert_eq!(found.len(), 3);
        assert!(matches!(&found[0], TableMismatch::Speed { name, .. } if name == "M2"));
        assert!(matches!(&found[1], TableMismatch::Argument { name, .. } if name == "M2"));
        assert!(matches!(&found[2], TableMismatch::NodeFactor { name, .. } if name == "S2"));

        let mut c = a.clone();
        c.first_year = 2001;
        assert!(matches!(
            a.differences(&c),
            Err(TidegenError::IncompatibleTables(_))
        ));
    }
}
