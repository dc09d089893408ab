//! # Tidal constituents
//!
//! A [`Constituent`] is one harmonic term of the tide: an angular **speed** plus,
//! for every year of a [`GenerationSpan`], the **equilibrium argument** `(V₀+u)`
//! at the start of the year and the **node factor** `f` at the middle of the year.
//!
//! Constituents are produced by a [`ConstituentBuilder`] from one of three
//! [`ConstituentDefinition`] kinds:
//!
//! | Kind       | Input                                                | Node factor          |
//! |------------|------------------------------------------------------|----------------------|
//! | `Basic`    | V and u coefficient vectors plus an SP 98 formula    | [`NodeFactorFormula`]|
//! | `Doodson`  | V coefficients plus a list of [`Satellite`]s         | satellite vector sum |
//! | `Compound` | 13 coefficients over the base constituents            | product of powers    |
//!
//! ## Compound constituents
//!
//! A compound constituent is the fold `Σ cᵢ·baseᵢ` over the bases of
//! [`compound`], starting from [`Constituent::zero`]. Scaling a constituent by `x`
//! multiplies its speed and arguments by `x` and raises its node factors to `|x|`;
//! accumulation adds speeds and arguments and multiplies node factors.
//!
//! The bases depend on the span only, so the builder computes them once per span
//! and keeps them until [`ConstituentBuilder::set_span`] changes the span.
//!
//! ## Example
//!
//! ```rust
//! use tidegen::astro::node_factor::NodeFactorFormula;
//! use tidegen::constituent::{
//!     ConstituentBuilder, ConstituentDefinition, GenerationSpan, SpeedEpoch,
//! };
//!
//! let span = GenerationSpan::new(1970, 1979, SpeedEpoch::default()).unwrap();
//! let builder = ConstituentBuilder::new(span);
//! let m2 = ConstituentDefinition::basic(
//!     &[2., -2., 2., 0., 0., 0.],
//!     &[2., -2., 0., 0., 0., 0., 0.],
//!     NodeFactorFormula::F78,
//! )
//! .unwrap();
//! let m2 = builder.build("M2", &m2);
//! assert!((m2.speed - 28.9841042).abs() < 1e-4);
//! assert_eq!(m2.equilibrium_argument.len(), 10);
//! ```
pub mod compound;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::astro::node_factor::NodeFactorFormula;
use crate::astro::{
    atan2_deg, cos_deg, midyear_terms, sin_deg, v_terms, Derivative, NodeTerms, NUM_U_TERMS,
    NUM_V_TERMS, P_INDEX, Q_INDEX,
};
use crate::constants::{
    Degree, DegreePerHour, Year, DEFAULT_FIRST_YEAR, DEFAULT_LAST_YEAR, DEFAULT_SPEED_EPOCH,
    HOURS_PER_JULIAN_CENTURY,
};
use crate::tidegen_errors::TidegenError;
use crate::time::{checked_year, mid_of_year, start_of_year};
use compound::{COMPOUND_BASES, NUM_COMPOUND_BASES};

/// One generated tidal constituent over a span of years.
#[derive(Debug, Clone, PartialEq)]
pub struct Constituent {
    pub name: String,
    /// Angular speed, degrees per solar hour
    pub speed: DegreePerHour,
    /// Year of index 0 in the yearly vectors
    pub first_year: Year,
    /// `(V₀+u)` at the start of each year, degrees, not normalized
    pub equilibrium_argument: Vec<Degree>,
    /// Node factor at the middle of each year
    pub node_factor: Vec<f64>,
}

impl Constituent {
    /// Neutral element of compound accumulation: speed 0, arguments 0, node factors 1.
    pub fn zero(name: &str, first_year: Year, num_years: usize) -> Self {
        Constituent {
            name: name.to_string(),
            speed: 0.,
            first_year,
            equilibrium_argument: vec![0.; num_years],
            node_factor: vec![1.; num_years],
        }
    }

    /// Copy of `self` scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Constituent {
            name: self.name.clone(),
            speed: self.speed * factor,
            first_year: self.first_year,
            equilibrium_argument: self.equilibrium_argument.iter().map(|a| a * factor).collect(),
            node_factor: self
                .node_factor
                .iter()
                .map(|f| f.powf(factor.abs()))
                .collect(),
        }
    }

    /// Add `other` into `self`. Both must cover the same years.
    pub fn accumulate(mut self, other: &Constituent) -> Self {
        debug_assert_eq!(self.first_year, other.first_year);
        debug_assert_eq!(self.num_years(), other.num_years());
        self.speed += other.speed;
        for (a, b) in self
            .equilibrium_argument
            .iter_mut()
            .zip(&other.equilibrium_argument)
        {
            *a += b;
        }
        for (f, g) in self.node_factor.iter_mut().zip(&other.node_factor) {
            *f *= g;
        }
        self
    }

    pub fn num_years(&self) -> usize {
        self.equilibrium_argument.len()
    }

    pub fn last_year(&self) -> Year {
        self.first_year + self.num_years() as Year - 1
    }

    /// Offset of `year` in the yearly vectors.
    ///
    /// Return
    /// ------
    /// * the index, or [`TidegenError::ConstituentSpan`] when the constituent was
    ///   generated for a span that does not include `year`
    pub fn year_index(&self, year: Year) -> Result<usize, TidegenError> {
        if year < self.first_year || year > self.last_year() {
            return Err(TidegenError::ConstituentSpan {
                name: self.name.clone(),
                first: self.first_year,
                last: self.last_year(),
                year,
            });
        }
        Ok((year - self.first_year) as usize)
    }

    pub fn argument(&self, year: Year) -> Result<Degree, TidegenError> {
        Ok(self.equilibrium_argument[self.year_index(year)?])
    }

    pub fn factor(&self, year: Year) -> Result<f64, TidegenError> {
        Ok(self.node_factor[self.year_index(year)?])
    }
}

/// A satellite of a Doodson-style definition.
///
/// `dn` and `alpha` are stored as they enter the angle sum
/// `dp·p + dn·N + dp1·p₁ + alpha`: the text format gives them with the opposite
/// sign and in cycles respectively, see [`Satellite::from_table`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Satellite {
    pub dp: i32,
    pub dn: i32,
    pub dp1: i32,
    /// Phase correction, degrees
    pub alpha: Degree,
    /// Amplitude ratio relative to the main term
    pub ratio: f64,
    /// Reference satellites are carried for bookkeeping and ignored by the builder
    pub reference: bool,
}

impl Satellite {
    /// Build a satellite from the values of a Doodson table row.
    ///
    /// Non-reference rows get `dn` negated and `alpha` converted from cycles to
    /// degrees. Reference rows are kept verbatim.
    pub fn from_table(dp: i32, dn: i32, dp1: i32, alpha: f64, ratio: f64, reference: bool) -> Self {
        if reference {
            Satellite {
                dp,
                dn,
                dp1,
                alpha,
                ratio,
                reference,
            }
        } else {
            Satellite {
                dp,
                dn: -dn,
                dp1,
                alpha: alpha * 360.,
                ratio,
                reference,
            }
        }
    }
}

/// How a constituent is defined.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstituentDefinition {
    Basic {
        v: [f64; NUM_V_TERMS],
        u: [f64; NUM_U_TERMS],
        formula: NodeFactorFormula,
    },
    Doodson {
        v: [f64; NUM_V_TERMS],
        satellites: Vec<Satellite>,
    },
    Compound {
        coefficients: [f64; NUM_COMPOUND_BASES],
    },
}

fn fixed<const K: usize>(kind: &'static str, values: &[f64]) -> Result<[f64; K], TidegenError> {
    values
        .try_into()
        .map_err(|_| TidegenError::CoefficientCount {
            kind,
            expected: K,
            found: values.len(),
        })
}

impl ConstituentDefinition {
    /// Basic definition: 6 V coefficients, 7 u coefficients, a node factor formula.
    pub fn basic(v: &[f64], u: &[f64], formula: NodeFactorFormula) -> Result<Self, TidegenError> {
        Ok(ConstituentDefinition::Basic {
            v: fixed("Basic V", v)?,
            u: fixed("Basic u", u)?,
            formula,
        })
    }

    /// Doodson definition: 6 V coefficients and the satellite list.
    pub fn doodson(v: &[f64], satellites: Vec<Satellite>) -> Result<Self, TidegenError> {
        Ok(ConstituentDefinition::Doodson {
            v: fixed("Doodson V", v)?,
            satellites,
        })
    }

    /// Compound definition: up to 13 coefficients, missing trailing ones are zero.
    pub fn compound(coefficients: &[f64]) -> Result<Self, TidegenError> {
        if coefficients.len() > NUM_COMPOUND_BASES {
            return Err(TidegenError::CoefficientCount {
                kind: "Compound",
                expected: NUM_COMPOUND_BASES,
                found: coefficients.len(),
            });
        }
        let mut padded = [0.; NUM_COMPOUND_BASES];
        padded[..coefficients.len()].copy_from_slice(coefficients);
        Ok(ConstituentDefinition::Compound {
            coefficients: padded,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConstituentDefinition::Basic { .. } => "Basic",
            ConstituentDefinition::Doodson { .. } => "Doodson",
            ConstituentDefinition::Compound { .. } => "Compound",
        }
    }
}

/// A definition together with the name of the constituent it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedDefinition {
    pub name: String,
    pub definition: ConstituentDefinition,
}

/// Year used to evaluate constituent speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedEpoch {
    /// Start of the given year
    Fixed(Year),
    /// Start of the middle year of the span, `(first + last) / 2`
    RangeMidpoint,
}

impl Default for SpeedEpoch {
    fn default() -> Self {
        SpeedEpoch::Fixed(DEFAULT_SPEED_EPOCH)
    }
}

/// Validated range of years for which constituents are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationSpan {
    first_year: Year,
    last_year: Year,
    speed_epoch: Year,
}

impl GenerationSpan {
    /// Validate a year range and resolve its speed epoch.
    ///
    /// Arguments
    /// ---------
    /// * `first_year`, `last_year`: inclusive bounds, both in [1, 4000]
    /// * `speed_epoch`: policy for the year at which speeds are evaluated
    ///
    /// Return
    /// ------
    /// * the span, or a [`TidegenError::YearOutOfRange`] /
    ///   [`TidegenError::InvalidYearRange`] configuration error
    pub fn new(
        first_year: i64,
        last_year: i64,
        speed_epoch: SpeedEpoch,
    ) -> Result<Self, TidegenError> {
        let first = checked_year(first_year)?;
        let last = checked_year(last_year)?;
        if last < first {
            return Err(TidegenError::InvalidYearRange { first, last });
        }
        let epoch = match speed_epoch {
            SpeedEpoch::Fixed(year) => checked_year(year as i64)?,
            SpeedEpoch::RangeMidpoint => ((first as u32 + last as u32) / 2) as Year,
        };
        Ok(GenerationSpan {
            first_year: first,
            last_year: last,
            speed_epoch: epoch,
        })
    }

    pub fn first_year(&self) -> Year {
        self.first_year
    }

    pub fn last_year(&self) -> Year {
        self.last_year
    }

    pub fn speed_epoch(&self) -> Year {
        self.speed_epoch
    }

    pub fn num_years(&self) -> usize {
        (self.last_year - self.first_year) as usize + 1
    }

    pub fn years(&self) -> impl Iterator<Item = Year> {
        self.first_year..=self.last_year
    }
}

impl Default for GenerationSpan {
    /// 1970 through 2037, speeds at 1900.
    fn default() -> Self {
        GenerationSpan {
            first_year: DEFAULT_FIRST_YEAR,
            last_year: DEFAULT_LAST_YEAR,
            speed_epoch: DEFAULT_SPEED_EPOCH,
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Builds constituents for one [`GenerationSpan`].
///
/// Owns the compound base constituents for its span. The builder is `Send + Sync`;
/// runs that need different spans should use different builders or call
/// [`ConstituentBuilder::set_span`].
#[derive(Debug)]
pub struct ConstituentBuilder {
    span: GenerationSpan,
    compound_bases: OnceCell<Vec<Constituent>>,
}

impl ConstituentBuilder {
    pub fn new(span: GenerationSpan) -> Self {
        ConstituentBuilder {
            span,
            compound_bases: OnceCell::new(),
        }
    }

    pub fn span(&self) -> GenerationSpan {
        self.span
    }

    /// Switch to another span. The compound bases are dropped if the span changes.
    pub fn set_span(&mut self, span: GenerationSpan) {
        if span != self.span {
            debug!(
                "generation span changed to {}..={} (speed epoch {}), dropping compound bases",
                span.first_year, span.last_year, span.speed_epoch
            );
            self.span = span;
            self.compound_bases = OnceCell::new();
        }
    }

    /// Generate the constituent `name` from its definition over the builder's span.
    pub fn build(&self, name: &str, definition: &ConstituentDefinition) -> Constituent {
        match definition {
            ConstituentDefinition::Basic { v, u, formula } => {
                self.build_basic(name, v, u, *formula)
            }
            ConstituentDefinition::Doodson { v, satellites } => {
                self.build_doodson(name, v, satellites)
            }
            ConstituentDefinition::Compound { coefficients } => {
                self.build_compound(name, coefficients)
            }
        }
    }

    /// Generate every definition in order.
    pub fn build_all(&self, definitions: &[NamedDefinition]) -> Vec<Constituent> {
        definitions
            .iter()
            .map(|d| self.build(&d.name, &d.definition))
            .collect()
    }

    fn speed_rates(&self) -> [f64; NUM_V_TERMS] {
        v_terms(start_of_year(self.span.speed_epoch), Derivative::Rate)
    }

    fn build_basic(
        &self,
        name: &str,
        v: &[f64; NUM_V_TERMS],
        u: &[f64; NUM_U_TERMS],
        formula: NodeFactorFormula,
    ) -> Constituent {
        let rates = self.speed_rates();
        // M1 special case, SP 98 paragraph 124
        let speed = (dot(&rates, v) + rates[P_INDEX] * u[Q_INDEX]) / HOURS_PER_JULIAN_CENTURY;

        let (equilibrium_argument, node_factor) = self
            .span
            .years()
            .map(|year| {
                let node = NodeTerms::at(mid_of_year(year));
                let arg = dot(&v_terms(start_of_year(year), Derivative::Value), v)
                    + dot(&node.u_terms(), u);
                (arg, formula.evaluate(&node))
            })
            .unzip();

        Constituent {
            name: name.to_string(),
            speed,
            first_year: self.span.first_year,
            equilibrium_argument,
            node_factor,
        }
    }

    fn build_doodson(
        &self,
        name: &str,
        v: &[f64; NUM_V_TERMS],
        satellites: &[Satellite],
    ) -> Constituent {
        let speed = dot(&self.speed_rates(), v) / HOURS_PER_JULIAN_CENTURY;

        let (equilibrium_argument, node_factor) = self
            .span
            .years()
            .map(|year| {
                let mid = midyear_terms(mid_of_year(year));
                let (cos_sum, sin_sum) = satellites
                    .iter()
                    .filter(|s| !s.reference)
                    .fold((1., 0.), |(c, s), sat| {
                        let angle = sat.dp as f64 * mid.p
                            + sat.dn as f64 * mid.n
                            + sat.dp1 as f64 * mid.p1
                            + sat.alpha;
                        (c + sat.ratio * cos_deg(angle), s + sat.ratio * sin_deg(angle))
                    });
                let arg = dot(&v_terms(start_of_year(year), Derivative::Value), v)
                    + atan2_deg(sin_sum, cos_sum);
                (arg, sin_sum.hypot(cos_sum))
            })
            .unzip();

        Constituent {
            name: name.to_string(),
            speed,
            first_year: self.span.first_year,
            equilibrium_argument,
            node_factor,
        }
    }

    fn compound_bases(&self) -> &[Constituent] {
        self.compound_bases.get_or_init(|| {
            debug!(
                "building compound bases for {}..={}",
                self.span.first_year, self.span.last_year
            );
            COMPOUND_BASES
                .iter()
                .map(|b| self.build_basic(b.name, &b.v, &b.u, b.formula))
                .collect()
        })
    }

    fn build_compound(
        &self,
        name: &str,
        coefficients: &[f64; NUM_COMPOUND_BASES],
    ) -> Constituent {
        let zero = Constituent::zero(name, self.span.first_year, self.span.num_years());
        let mut compound = self
            .compound_bases()
            .iter()
            .zip(coefficients)
            .fold(zero, |acc, (base, &c)| acc.accumulate(&base.scaled(c)));
        compound.name = name.to_string();
        compound
    }
}
