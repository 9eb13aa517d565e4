use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use simple_logger::SimpleLogger;

use tweetrank::{rank_csv, IngestConfig, Limit, Limits, LogLevel, RowPolicy};

#[derive(Parser, Debug)]
#[command(name = "tweetrank", version)]
#[command(about = "Prints the most frequent values of a CSV column", long_about = None)]
struct Opts {
    /// CSV file to read. Only the first file is used if more are given
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Number of entries to print, or 'all'
    #[arg(long, default_value = "10")]
    top: Limit,

    /// Print every entry (same as --top all)
    #[arg(long)]
    all: bool,

    /// Header name of the column to count
    #[arg(long, default_value = "name")]
    column: String,

    /// What to do with a malformed row: 'abort' or 'skip'
    #[arg(long, default_value = "abort")]
    on_bad_row: RowPolicy,

    /// The desired log level; one of 'off', 'error', 'warn', 'info', 'debug' or 'trace'
    #[arg(long = "log", default_value = "warn")]
    log_level: LogLevel,
}

fn main() -> ExitCode {
    let opts = Opts::parse();

    if let Err(e) = SimpleLogger::new()
        .with_level((&opts.log_level).into())
        .init()
    {
        eprintln!("Error: could not start logger: {}", e);
        return ExitCode::FAILURE;
    }

    if opts.files.len() > 1 {
        log::warn!("More than one file given -- only the first file will be run");
    }
    let path = &opts.files[0];

    let config = IngestConfig {
        key_column: opts.column,
        limits: Limits::default(),
        row_policy: opts.on_bad_row,
    };
    let limit = if opts.all { Limit::All } else { opts.top };

    let (ranking, stats) = match rank_csv(path, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if stats.skipped > 0 {
        log::warn!("{} malformed rows were skipped", stats.skipped);
    }

    for tally in ranking.select(limit) {
        println!("{}: {}", tally.key, tally.count);
    }
    ExitCode::SUCCESS
}
