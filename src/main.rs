//! # mzparquet Converter
//!
//! Converts a Thermo RAW file into a flat mzparquet peak table.
//!
//! ## Usage
//!
//! ```bash
//! # Writes sample.mzparquet next to the input
//! mzparquet sample.raw
//!
//! # Integer intensities, progress logging
//! mzparquet -v --precision integer sample.raw
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
