//! # Legacy constituent definition format
//!
//! Reader for the whitespace-separated definition files used by tide
//! constituent generators since the 1990s. One record per line:
//!
//! ```text
//! # name     kind     fields...
//! M2         Basic    2 -2  2  0  0  0    2 -2  0  0  0  0  0   78
//! K1         Doodson  1  0  1  0  0 -90   2
//!                     0 -1  0  0.00 0.1356   0 -2 0 0.50 0.0029
//! MS4        Compound 0  0  0  1  1
//! ```
//!
//! * `Basic`: 6 V coefficients, 7 u coefficients `(ξ, ν, ν′, 2ν″, Q, R, Qᵤ)` and
//!   a node factor formula number. Files written before `Qᵤ` existed carry only
//!   6 u coefficients; they must be read with [`BasicLayout::WithoutQu`], which
//!   sets `Qᵤ = 0`. The layout applies to the whole file: a record with one
//!   field too few is a missing formula, never an older record.
//! * `Doodson`: 6 V coefficients, a satellite count, then that many
//!   `dp dn dp1 alpha ratio` groups. The groups may continue on the following
//!   lines but a group never spans two lines. A ratio suffixed with `R` marks a
//!   reference satellite.
//! * `Compound`: up to 13 coefficients over the bases of
//!   [`crate::constituent::compound`], missing ones are zero.
//!
//! Blank lines and lines starting with `#` are ignored. The first malformed field
//! stops the parse with [`TidegenError::Format`] carrying the 1-based line number.
use tracing::debug;

use crate::astro::node_factor::NodeFactorFormula;
use crate::astro::{NUM_U_TERMS, NUM_V_TERMS};
use crate::constituent::compound::NUM_COMPOUND_BASES;
use crate::constituent::{ConstituentDefinition, NamedDefinition, Satellite};
use crate::tidegen_errors::TidegenError;
use crate::tokens::{count, integer, ratio, real};

/// Fields of one Doodson satellite group
const SATELLITE_FIELDS: usize = 5;

/// Field layout of the `Basic` records of a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BasicLayout {
    /// 6 V coefficients, 7 u coefficients, formula
    #[default]
    WithQu,
    /// 6 V coefficients, 6 u coefficients (no `Qᵤ`), formula
    WithoutQu,
}

impl BasicLayout {
    /// u coefficients present on a record
    fn u_fields(self) -> usize {
        match self {
            BasicLayout::WithQu => NUM_U_TERMS,
            BasicLayout::WithoutQu => NUM_U_TERMS - 1,
        }
    }

    /// Fields after the kind: V, u, formula
    fn fields(self) -> usize {
        NUM_V_TERMS + self.u_fields() + 1
    }
}

fn format_error(line: usize, reason: impl Into<String>) -> TidegenError {
    TidegenError::Format {
        line,
        reason: reason.into(),
    }
}

fn reals(tokens: &[&str]) -> Result<Vec<f64>, String> {
    tokens.iter().map(|t| real(t)).collect()
}

fn is_skipped(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Physical lines with a cursor, so that Doodson records can pull continuation lines.
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    next: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        LineCursor {
            lines: text.lines().collect(),
            next: 0,
        }
    }

    /// Next physical line and its 1-based number.
    fn advance(&mut self) -> Option<(usize, &'a str)> {
        let line = self.lines.get(self.next).copied()?;
        self.next += 1;
        Some((self.next, line))
    }
}

/// Parse every record of a definition file in the current [`BasicLayout::WithQu`] layout.
pub fn parse_legacy_input(text: &str) -> Result<Vec<NamedDefinition>, TidegenError> {
    parse_legacy_input_with(text, BasicLayout::default())
}

/// Parse every record of a definition file.
///
/// Arguments
/// ---------
/// * `text`: full content of the definition file
/// * `layout`: field layout of the `Basic` records
///
/// Return
/// ------
/// * the definitions in file order, or the first [`TidegenError::Format`] met
///
/// See also
/// --------
/// * [`crate::tidegen::Tidegen::load_definitions`] – parse and build in one step.
pub fn parse_legacy_input_with(
    text: &str,
    layout: BasicLayout,
) -> Result<Vec<NamedDefinition>, TidegenError> {
    let mut cursor = LineCursor::new(text);
    let mut definitions = Vec::new();

    while let Some((line_no, line)) = cursor.advance() {
        if is_skipped(line) {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (name, kind, fields) = match tokens.as_slice() {
            [name, kind, fields @ ..] => (*name, *kind, fields),
            _ => return Err(format_error(line_no, "expected a name and a kind")),
        };

        let definition = match kind {
            "Basic" => parse_basic(fields, layout).map_err(|reason| format_error(line_no, reason))?,
            "Doodson" => parse_doodson(line_no, fields, &mut cursor)?,
            "Compound" => {
                parse_compound(fields).map_err(|reason| format_error(line_no, reason))?
            }
            other => return Err(format_error(line_no, format!("unknown kind '{other}'"))),
        };
        debug!("line {line_no}: {kind} definition for {name}");

        definitions.push(NamedDefinition {
            name: name.to_string(),
            definition,
        });
    }

    Ok(definitions)
}

fn parse_basic(fields: &[&str], layout: BasicLayout) -> Result<ConstituentDefinition, String> {
    if fields.len() != layout.fields() {
        return Err(format!(
            "Basic record expects {} V, {} u coefficients and a formula, found {} fields",
            NUM_V_TERMS,
            layout.u_fields(),
            fields.len()
        ));
    }
    let (coefficients, formula) = fields.split_at(fields.len() - 1);
    let mut coefficients = reals(coefficients)?;
    // Qᵤ
    coefficients.resize(NUM_V_TERMS + NUM_U_TERMS, 0.);
    let formula = NodeFactorFormula::try_from(count(formula[0])?).map_err(|e| e.to_string())?;
    let (v, u) = coefficients.split_at(NUM_V_TERMS);
    ConstituentDefinition::basic(v, u, formula).map_err(|e| e.to_string())
}

fn parse_doodson(
    line_no: usize,
    fields: &[&str],
    cursor: &mut LineCursor<'_>,
) -> Result<ConstituentDefinition, TidegenError> {
    if fields.len() < NUM_V_TERMS + 1 {
        return Err(format_error(
            line_no,
            "Doodson record expects 6 V coefficients and a satellite count",
        ));
    }
    let v = reals(&fields[..NUM_V_TERMS]).map_err(|r| format_error(line_no, r))?;
    let expected = count(fields[NUM_V_TERMS]).map_err(|r| format_error(line_no, r))? as usize;

    let mut satellites = Vec::new();
    let mut current_line = line_no;
    let mut pending: Vec<&str> = fields[NUM_V_TERMS + 1..].to_vec();
    let mut pos = 0;

    while satellites.len() < expected {
        if pos == pending.len() {
            let Some((next_no, next)) = cursor.advance() else {
                return Err(format_error(
                    current_line,
                    format!(
                        "input ended after {} of {expected} satellites",
                        satellites.len()
                    ),
                ));
            };
            current_line = next_no;
            pending = next.split_whitespace().collect();
            pos = 0;
            continue;
        }
        let Some(group) = pending.get(pos..pos + SATELLITE_FIELDS) else {
            return Err(format_error(current_line, "incomplete satellite record"));
        };
        satellites.push(parse_satellite(group).map_err(|r| format_error(current_line, r))?);
        pos += SATELLITE_FIELDS;
    }

    if pos < pending.len() {
        return Err(format_error(
            current_line,
            format!("unexpected field '{}' after {expected} satellites", pending[pos]),
        ));
    }

    ConstituentDefinition::doodson(&v, satellites).map_err(|e| format_error(line_no, e.to_string()))
}

fn parse_satellite(group: &[&str]) -> Result<Satellite, String> {
    let (ratio, reference) = ratio(group[4])?;
    Ok(Satellite::from_table(
        integer(group[0])?,
        integer(group[1])?,
        integer(group[2])?,
        real(group[3])?,
        ratio,
        reference,
    ))
}

fn parse_compound(fields: &[&str]) -> Result<ConstituentDefinition, String> {
    if fields.len() > NUM_COMPOUND_BASES {
        return Err(format!(
            "Compound record takes at most {NUM_COMPOUND_BASES} coefficients, found {}",
            fields.len()
        ));
    }
    ConstituentDefinition::compound(&reals(fields)?).map_err(|e| e.to_string())
}
