use std::io::{self, Write};

use camino::Utf8PathBuf;
use clap::Parser;
use tidegen::analysis::{AnalysisParams, TimeSeries};
use tidegen::constituent::SpeedEpoch;
use tidegen::legacy_input::{parse_legacy_input_with, BasicLayout};
use tidegen::logger;
use tidegen::{Tidegen, TidegenError};

#[derive(Parser)]
#[command(name = "harmgen")]
#[command(about = "Derive harmonic constants from a water-level time series")]
struct Args {
    /// Constituent definition file
    definitions: Utf8PathBuf,

    /// Time series, one `timestamp height` pair per line
    series: Utf8PathBuf,

    /// Output file for the JSON constants, stdout when absent
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,

    /// Proceed when constituent pairs cannot be resolved by the record
    #[arg(short, long)]
    force: bool,

    /// Keep at most this many constituents, 0 for no cap
    #[arg(short = 'n', long)]
    max_constituents: Option<usize>,

    /// Drop constituents below this amplitude
    #[arg(short = 'm', long, default_value_t = 0.0)]
    min_amplitude: f64,

    /// Report this datum instead of the fitted mean level
    #[arg(short, long, allow_negative_numbers = true)]
    datum_override: Option<f64>,

    /// Basic records carry six u coefficients (files written before Qu)
    #[arg(long)]
    without_qu: bool,

    /// Evaluate speeds at the middle of the record years instead of 1900
    #[arg(long)]
    midpoint_speeds: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn params(args: &Args) -> Result<AnalysisParams, TidegenError> {
    let mut builder = AnalysisParams::builder()
        .force(args.force)
        .min_amplitude(args.min_amplitude);
    if let Some(max) = args.max_constituents.filter(|&max| max > 0) {
        builder = builder.max_constituents(max);
    }
    if let Some(datum) = args.datum_override {
        builder = builder.datum_override(datum);
    }
    if args.midpoint_speeds {
        builder = builder.speed_epoch(SpeedEpoch::RangeMidpoint);
    }
    builder.build()
}

fn run(args: &Args) -> Result<(), TidegenError> {
    let params = params(args)?;
    let layout = if args.without_qu {
        BasicLayout::WithoutQu
    } else {
        BasicLayout::WithQu
    };
    let definitions =
        parse_legacy_input_with(&std::fs::read_to_string(&args.definitions)?, layout)?;
    let series = TimeSeries::read(&args.series)?;

    let report = Tidegen::default().analyze(&definitions, &series, &params)?;
    for line in report.summary().lines() {
        tracing::info!("{line}");
    }
    tracing::info!("datum {:.4}", report.result.datum);

    let json = serde_json::to_string_pretty(&report.result.harmonic_constants())
        .map_err(|e| TidegenError::IoError(e.into()))?;
    match &args.output {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(&args) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
