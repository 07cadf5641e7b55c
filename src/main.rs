// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: Apache-2.0
//
// tendency-rs: central tendency measures for 311 complaint response times

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tendency::types::{
    AnalysisConfig, FenceMode, DEFAULT_BINS, DEFAULT_CATEGORIES, DEFAULT_INPUT,
    DEFAULT_LINE_HEIGHT, DEFAULT_OUTPUT, DEFAULT_THRESHOLD_DAYS,
};
use tendency::{display, plot, processor};

/// CLI arguments
#[derive(Parser)]
#[command(
    name = "tendency-rs",
    version = env!("CARGO_PKG_VERSION"),
    about = "Central tendency statistics for 311 plumbing complaint response times",
    long_about = "tendency-rs reads NYC 311 complaints (CSV, optionally zstd compressed), \n\
                  computes how many days each plumbing complaint took to close, prints \n\
                  quartiles, mean and sigma bands, copies abnormally slow complaints to a \n\
                  separate CSV and shows a histogram annotated with those statistics."
)]
struct Args {
    /// Input CSV of 311 complaints (can be ZSTD compressed)
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output CSV receiving complaints slower than the threshold
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Complaint type to include, matched exactly (repeat for several spellings)
    #[arg(
        short,
        long = "category",
        action = ArgAction::Append,
        default_values_t = DEFAULT_CATEGORIES.map(String::from)
    )]
    categories: Vec<String>,

    /// Complaints slower than this many days are written to the output CSV
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_DAYS)]
    threshold_days: f64,

    /// Number of histogram bins
    #[arg(long, default_value_t = DEFAULT_BINS)]
    bins: usize,

    /// Height of the reference lines, in complaints
    #[arg(long, default_value_t = DEFAULT_LINE_HEIGHT)]
    line_height: f64,

    /// Anchor the lower outlier bound at the 25th percentile instead of the 75th
    #[arg(long)]
    tukey_fences: bool,

    /// Also save the histogram to this SVG file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the statistics without opening the histogram view
    #[arg(long)]
    no_display: bool,

    /// Show debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn to_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            categories: self.categories.clone(),
            threshold_days: self.threshold_days,
            bins: self.bins,
            line_height: self.line_height,
            fence_mode: if self.tukey_fences {
                FenceMode::Tukey
            } else {
                FenceMode::UpperQuartile
            },
        }
    }
}

/// Logs go to stderr so the report on stdout stays clean.
/// RUST_LOG overrides the flags unless --quiet is given.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let default = if verbose { "tendency=debug,info" } else { "warn" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = args.to_config();
    let start = Instant::now();

    let analysis = processor::process_file(&config)
        .with_context(|| format!("Failed to analyze '{}'", config.input.display()))?;

    info!("Processed file in {:.2?}", start.elapsed());

    if let Some(path) = &args.save {
        plot::save_plot(path, &analysis.figure).context("Failed to save histogram")?;
    }

    if !args.no_display {
        display::show(&analysis.figure).context("Failed to display histogram")?;
    }

    Ok(())
}
