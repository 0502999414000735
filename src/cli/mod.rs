use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use mzparquet::writer::Precision;

mod config;
mod convert;
mod profile;

use convert::ConvertArgs;
pub use profile::Profile;

/// mzparquet - Thermo RAW to flat Parquet peak table converter
#[derive(Parser, Debug)]
#[command(name = "mzparquet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input Thermo RAW file path
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (defaults to the input path with a .mzparquet extension)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Conversion profile (fast, balanced, max-compression)
    #[arg(short = 'p', long, default_value = "fast", value_enum)]
    profile: ProfileArg,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Intensity and charge representation (float, integer)
    #[arg(long)]
    precision: Option<Precision>,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    // === Advanced tuning flags (hidden from --help) ===
    /// Compression level for ZSTD (1-22, default: profile-dependent)
    #[arg(short = 'c', long, hide = true)]
    compression_level: Option<i32>,

    /// Row group size (rows per row group)
    #[arg(short = 'r', long, hide = true)]
    row_group_size: Option<usize>,

    /// Rows buffered before each flush
    #[arg(long, hide = true)]
    chunk_size: Option<usize>,
}

/// Conversion profile for optimizing speed vs compression.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ProfileArg {
    /// Prioritize speed over compression
    #[default]
    Fast,
    /// Balance between speed and compression
    Balanced,
    /// Maximum compression, slower conversion
    MaxCompression,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Fast => Profile::Fast,
            ProfileArg::Balanced => Profile::Balanced,
            ProfileArg::MaxCompression => Profile::MaxCompression,
        }
    }
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    convert::run(ConvertArgs {
        input: cli.input,
        output: cli.output,
        profile: Profile::from(cli.profile),
        config: cli.config,
        compression_level: cli.compression_level,
        row_group_size: cli.row_group_size,
        chunk_size: cli.chunk_size,
        precision: cli.precision,
    })
}
