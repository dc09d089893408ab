//! # Tidegen: constituent generation and analysis context
//!
//! [`Tidegen`] is the entry point tying the pieces together:
//!
//! 1. **Definitions**: legacy text records ([`crate::legacy_input`]) into
//!    [`NamedDefinition`]s.
//! 2. **Generation**: a [`ConstituentBuilder`] owning the [`GenerationSpan`] and the
//!    lazily generated compound bases for that span.
//! 3. **Tables**: the yearly speed, argument and node factor tables
//!    ([`TideTables`]).
//! 4. **Analysis**: harmonic regression of a [`TimeSeries`]; the span is switched to
//!    the years of the record before generating.
//!
//! ## Typical usage
//!
//! ```rust,no_run
//! use tidegen::constituent::{GenerationSpan, SpeedEpoch};
//! use tidegen::tidegen::Tidegen;
//!
//! let text = std::fs::read_to_string("congen_input.txt").unwrap();
//! let span = GenerationSpan::new(2000, 2010, SpeedEpoch::RangeMidpoint).unwrap();
//! let tables = Tidegen::new(span).generate_tables(&text).unwrap();
//! print!("{}", tables.to_text().unwrap());
//! ```
//!
//! ## See also
//! ------------
//! * [`ConstituentBuilder`] – Generation of a single constituent.
//! * [`HarmonicAnalyzer`] – Regression over already generated constituents.
use tracing::info;

use crate::analysis::{AnalysisParams, AnalysisReport, HarmonicAnalyzer, TimeSeries};
use crate::constituent::{Constituent, ConstituentBuilder, GenerationSpan, NamedDefinition};
use crate::legacy_input::{parse_legacy_input_with, BasicLayout};
use crate::tables::TideTables;
use crate::tidegen_errors::TidegenError;

#[derive(Debug)]
pub struct Tidegen {
    builder: ConstituentBuilder,
    layout: BasicLayout,
}

impl Tidegen {
    pub fn new(span: GenerationSpan) -> Self {
        Tidegen {
            builder: ConstituentBuilder::new(span),
            layout: BasicLayout::default(),
        }
    }

    /// Read Basic records of every definition file with `layout`.
    pub fn with_layout(mut self, layout: BasicLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> BasicLayout {
        self.layout
    }

    pub fn span(&self) -> GenerationSpan {
        self.builder.span()
    }

    pub fn builder(&self) -> &ConstituentBuilder {
        &self.builder
    }

    /// Parse legacy definitions and generate them over the current span.
    pub fn load_definitions(&self, text: &str) -> Result<Vec<Constituent>, TidegenError> {
        let definitions = parse_legacy_input_with(text, self.layout)?;
        Ok(self.builder.build_all(&definitions))
    }

    /// Parse legacy definitions and produce the yearly tables for the current span.
    ///
    /// Arguments
    /// ---------
    /// * `text`: definition file contents
    ///
    /// Return
    /// ------
    /// * the tables, constituents in input order
    /// * [`TidegenError::Format`] on the first malformed record
    pub fn generate_tables(&self, text: &str) -> Result<TideTables, TidegenError> {
        let constituents = self.load_definitions(text)?;
        let span = self.span();
        info!(
            "generated {} constituents for {}..={} (speeds at {})",
            constituents.len(),
            span.first_year(),
            span.last_year(),
            span.speed_epoch()
        );
        Ok(TideTables::new(&span, constituents))
    }

    /// Generate `definitions` over the years of `series` and fit them.
    ///
    /// The context keeps the record span afterwards, so repeated analyses of the
    /// same record reuse the compound bases.
    ///
    /// See also
    /// --------
    /// * [`HarmonicAnalyzer::analyze`] – Resolvability checks, regression and pruning.
    pub fn analyze(
        &mut self,
        definitions: &[NamedDefinition],
        series: &TimeSeries,
        params: &AnalysisParams,
    ) -> Result<AnalysisReport, TidegenError> {
        if definitions.is_empty() {
            return Err(TidegenError::NoConstituents);
        }
        self.builder.set_span(series.span(params.speed_epoch)?);
        let constituents = self.builder.build_all(definitions);
        HarmonicAnalyzer::new(params.clone()).analyze(&constituents, series)
    }
}

impl Default for Tidegen {
    /// 1970 through 2037, speeds at 1900.
    fn default() -> Self {
        Tidegen::new(GenerationSpan::default())
    }
}
