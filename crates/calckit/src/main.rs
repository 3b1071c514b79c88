use std::path::PathBuf;

use calckit::{BatchInput, RenderOverrides, Session, default_data_dir, init_logging};
use calckit_core::{OutputFormat, SweepConfig};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "calckit")]
#[command(about = "Scientific and financial calculator with batch and sensitivity runs")]
struct Args {
    /// Path to the data directory (default: ~/.calckit/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Decimal places for displayed values (overrides config.yaml)
    #[arg(short, long, global = true)]
    precision: Option<u32>,

    /// decimal, scientific or fraction (overrides config.yaml)
    #[arg(short = 'f', long, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one formula, e.g. `calc loan principal=50000 annual_rate=3 term_years=5`
    Calc {
        formula: String,
        /// Parameters as key=value
        params: Vec<String>,
        /// Print the amortization schedule or enumeration table
        #[arg(long)]
        table: bool,
    },
    /// Evaluate many rows, from a file or `;` separated text
    Batch {
        formula: String,
        /// Rows given inline, e.g. "5,3;4,2"
        #[arg(conflicts_with = "file")]
        rows: Option<String>,
        /// Newline separated rows
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Vary one parameter around its base value
    Sweep {
        formula: String,
        /// Base parameters as key=value
        params: Vec<String>,
        /// Parameter to vary
        #[arg(long)]
        vary: String,
        /// Maximum variation in percent
        #[arg(long, default_value_t = 10.0)]
        percent: f64,
        #[arg(long, default_value_t = calckit_core::analysis::DEFAULT_POINTS)]
        points: usize,
        /// Output to follow instead of the formula's headline value
        #[arg(long)]
        output: Option<String>,
    },
    /// Descriptive statistics of a sample
    Stats {
        #[arg(required = true)]
        values: Vec<String>,
        /// Print the percentile table
        #[arg(long)]
        table: bool,
    },
    /// List formula ids and their parameters
    Formulas,
    /// Show, export or clear the calculation history
    History {
        /// Write history to a .csv or .json file
        #[arg(long, conflicts_with = "clear")]
        export: Option<PathBuf>,
        #[arg(long)]
        clear: bool,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    let overrides = RenderOverrides {
        precision: args.precision,
        output_format: args.format,
    };
    let session = Session::open(&data_dir, overrides)?;

    let output = match args.command {
        Command::Calc {
            formula,
            params,
            table,
        } => session.calc(&formula, &params, table)?,
        Command::Batch {
            formula,
            rows,
            file,
        } => {
            let input = match (file, rows) {
                (Some(path), _) => BatchInput::File(path),
                (None, Some(text)) => BatchInput::Text(text),
                (None, None) => color_eyre::eyre::bail!("give rows inline or with --file"),
            };
            session.batch(&formula, &input)?
        }
        Command::Sweep {
            formula,
            params,
            vary,
            percent,
            points,
            output,
        } => {
            let mut config = SweepConfig::new(percent).with_points(points);
            if let Some(key) = output {
                config = config.with_output(key);
            }
            session.sweep(&formula, &params, &vary, &config)?
        }
        Command::Stats { values, table } => session.stats(&values, table)?,
        Command::Formulas => calckit::report::render_formulas(),
        Command::History { export, clear } => match (export, clear) {
            (Some(path), _) => session.history_export(&path)?,
            (None, true) => session.history_clear()?,
            (None, false) => session.history_list()?,
        },
    };
    print!("{output}");

    tracing::info!("calckit finished");
    Ok(())
}
