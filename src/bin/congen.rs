use std::io::{self, Read, Write};

use camino::Utf8PathBuf;
use clap::Parser;
use tidegen::constants::{DEFAULT_FIRST_YEAR, DEFAULT_LAST_YEAR, DEFAULT_SPEED_EPOCH};
use tidegen::constituent::{GenerationSpan, SpeedEpoch};
use tidegen::legacy_input::BasicLayout;
use tidegen::logger;
use tidegen::{Tidegen, TidegenError};

#[derive(Parser)]
#[command(name = "congen")]
#[command(about = "Generate speeds, equilibrium arguments and node factors of tidal constituents")]
struct Args {
    /// First year of the tables
    #[arg(short = 'b', long, default_value_t = DEFAULT_FIRST_YEAR as i64)]
    first_year: i64,

    /// Last year of the tables
    #[arg(short = 'e', long, default_value_t = DEFAULT_LAST_YEAR as i64)]
    last_year: i64,

    /// Year at which speeds are evaluated
    #[arg(long, default_value_t = DEFAULT_SPEED_EPOCH, conflicts_with = "midpoint_speeds")]
    speed_year: u16,

    /// Evaluate speeds at the middle of the table years
    #[arg(long)]
    midpoint_speeds: bool,

    /// Basic records carry six u coefficients (files written before Qu)
    #[arg(long)]
    without_qu: bool,

    /// Definition file, stdin when absent
    input: Option<Utf8PathBuf>,

    /// Output file, stdout when absent
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<(), TidegenError> {
    let speed_epoch = if args.midpoint_speeds {
        SpeedEpoch::RangeMidpoint
    } else {
        SpeedEpoch::Fixed(args.speed_year)
    };
    let span = GenerationSpan::new(args.first_year, args.last_year, speed_epoch)?;

    let text = match &args.input {
        Some(path) => {
            tracing::info!("reading definitions from {path}");
            std::fs::read_to_string(path)?
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let layout = if args.without_qu {
        BasicLayout::WithoutQu
    } else {
        BasicLayout::WithQu
    };
    let tables = Tidegen::new(span)
        .with_layout(layout)
        .generate_tables(&text)?;

    match &args.output {
        Some(path) => {
            let mut file = io::BufWriter::new(std::fs::File::create(path)?);
            tables.write_to(&mut file)?;
            file.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            tables.write_to(&mut stdout)?;
            stdout.flush()?;
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
