use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use spectra_addressbook::logging;
use spectra_addressbook::scanner::{DirectoryScanner, DEFAULT_LOG_FILE};
use spectra_addressbook::sink::TracingSink;

/// Inventory .raw/.mgf/.mzML files and .d acquisition directories into a CSV
/// address book.
#[derive(Debug, Parser)]
#[command(name = "address-book", version, about)]
struct Cli {
    /// Root folder to search
    path: PathBuf,

    /// CSV to create or append to [default: ./address_book.csv]
    #[arg(long, env = "ADDRESS_BOOK_OUTPUT")]
    output: Option<PathBuf>,

    /// Log file to append to [default: ./output.log]
    #[arg(long, env = "ADDRESS_BOOK_LOG")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    logging::init(&log_path)?;

    // The subscriber already appends to the log file.
    let mut builder = DirectoryScanner::builder(&cli.path)
        .log_path(&log_path)
        .sink(Arc::new(TracingSink));
    if let Some(output) = &cli.output {
        builder = builder.output_path(output);
    }
    let scanner = builder
        .build()
        .with_context(|| format!("cannot scan {}", cli.path.display()))?;

    scanner.run();

    Ok(())
}
