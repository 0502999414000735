use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

use super::config::Config;
use super::profile::Profile;
use mzparquet::pipeline::{Pipeline, PipelineConfig, RunStats, DEFAULT_CHUNK_SIZE};
use mzparquet::schema::MZPARQUET_EXTENSION;
use mzparquet::source::{validate_raw_path, ScanSource};
use mzparquet::writer::{
    summarize_output, CompressionType, OutputMetadata, OutputSummary, ParquetBatchWriter,
    Precision, SourceFileInfo, WriterConfig,
};

/// Settings given on the command line.
#[derive(Debug)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub profile: Profile,
    pub config: Option<PathBuf>,
    pub compression_level: Option<i32>,
    pub row_group_size: Option<usize>,
    pub chunk_size: Option<usize>,
    pub precision: Option<Precision>,
}

/// Settings after applying flag > config file > profile precedence.
#[derive(Debug)]
struct Settings {
    writer: WriterConfig,
    pipeline: PipelineConfig,
}

fn resolve_settings(args: &ConvertArgs, file_config: Option<&Config>) -> Result<Settings> {
    let file = file_config.map(|c| &c.conversion);
    let mut writer = args.profile.writer_config();

    if let Some(level) = args
        .compression_level
        .or(file.and_then(|c| c.compression_level))
    {
        writer.compression = CompressionType::zstd(level)?;
    }
    if let Some(size) = args.row_group_size.or(file.and_then(|c| c.row_group_size)) {
        writer.row_group_size = size;
    }

    let precision = args
        .precision
        .or(file.and_then(|c| c.precision))
        .unwrap_or_default();
    let chunk_size = args
        .chunk_size
        .or(file.and_then(|c| c.chunk_size))
        .unwrap_or(DEFAULT_CHUNK_SIZE);

    Ok(Settings {
        writer: writer.with_precision(precision),
        pipeline: PipelineConfig::default()
            .with_chunk_size(chunk_size)
            .with_precision(precision),
    })
}

/// Convert a Thermo RAW file to mzparquet.
pub fn run(args: ConvertArgs) -> Result<()> {
    validate_raw_path(&args.input)?;

    let file_config = match &args.config {
        Some(path) => Some(Config::from_file(path)?),
        None => None,
    };
    let settings = resolve_settings(&args, file_config.as_ref())?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension(MZPARQUET_EXTENSION));

    info!("mzparquet - Thermo RAW to mzparquet");
    info!("Input:  {}", args.input.display());
    info!("Output: {}", output.display());
    info!("Profile: {}", args.profile);
    if let Some(path) = &args.config {
        info!("Config file: {}", path.display());
    }
    info!("Compression: {:?}", settings.writer.compression);
    info!("Row group size: {}", settings.writer.row_group_size);
    info!("Chunk size: {}", settings.pipeline.chunk_size);
    info!("Precision: {}", settings.pipeline.precision);

    convert_thermo(&args.input, &output, settings)
}

#[cfg(feature = "thermo")]
fn convert_thermo(input: &Path, output: &Path, settings: Settings) -> Result<()> {
    use mzparquet::source::thermo::ThermoScanSource;

    let source = ThermoScanSource::open(input).context("Failed to open Thermo RAW file")?;
    let instrument_model = normalize_instrument_model(&source.instrument_model());
    convert_source(source, input, output, instrument_model, settings)
}

#[cfg(not(feature = "thermo"))]
fn convert_thermo(_input: &Path, _output: &Path, _settings: Settings) -> Result<()> {
    anyhow::bail!(
        "Thermo RAW support is not compiled in; rebuild with `--features thermo` \
         (requires the .NET 8 runtime)"
    )
}

#[cfg_attr(not(feature = "thermo"), allow(dead_code))]
fn convert_source<S: ScanSource>(
    source: S,
    input: &Path,
    output: &Path,
    instrument_model: Option<String>,
    settings: Settings,
) -> Result<()> {
    let metadata = build_metadata(input, instrument_model);
    let writer = ParquetBatchWriter::new(output, &metadata, settings.writer)
        .with_context(|| format!("Failed to prepare output {}", output.display()))?;

    let stats = Pipeline::new(source, settings.pipeline)
        .run(writer)
        .with_context(|| format!("Conversion of {} failed", input.display()))?;

    println!("{}", finish_report(input, output, &stats)?);
    Ok(())
}

/// Report for a finished run. The output is only read back when a chunk was flushed.
#[cfg_attr(not(feature = "thermo"), allow(dead_code))]
fn finish_report(input: &Path, output: &Path, stats: &RunStats) -> Result<String> {
    if stats.sink.flushes() == 0 {
        warn!("No rows were written; {} was not modified", output.display());
        return Ok(format!(
            "No rows were written for {} ({} scans read)",
            input.display(),
            stats.scans
        ));
    }

    let summary = summarize_output(output).context("Failed to read back the output file")?;
    let input_size = std::fs::metadata(input).map(|m| m.len()).unwrap_or(0);
    Ok(format_report(output, stats, &summary, input_size))
}

#[cfg_attr(not(feature = "thermo"), allow(dead_code))]
fn build_metadata(input: &Path, instrument_model: Option<String>) -> OutputMetadata {
    let mut source = SourceFileInfo::new(
        input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    );
    source.path = input.to_str().map(String::from);
    source.format = Some("Thermo RAW".to_string());
    source.size_bytes = std::fs::metadata(input).ok().map(|m| m.len());
    source.instrument_model = instrument_model;

    OutputMetadata::new().with_source_file(source)
}

#[cfg_attr(not(feature = "thermo"), allow(dead_code))]
fn normalize_instrument_model(model: &str) -> Option<String> {
    let trimmed = model.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg_attr(not(feature = "thermo"), allow(dead_code))]
fn format_report(
    output: &Path,
    stats: &RunStats,
    summary: &OutputSummary,
    input_size: u64,
) -> String {
    let ratio = if summary.file_size_bytes > 0 {
        input_size as f64 / summary.file_size_bytes as f64
    } else {
        0.0
    };
    let lines = [
        (
            "Scans",
            format!(
                "{} (MS1: {}, MS2: {}, MSn: {})",
                stats.scans, stats.ms1_scans, stats.ms2_scans, stats.msn_scans
            ),
        ),
        ("Rows", summary.num_rows.to_string()),
        ("Chunks", stats.sink.flushes().to_string()),
        ("Profile fallbacks", stats.fallback_scans.to_string()),
        (
            "Output size",
            format!(
                "{:.2} MB ({:.1}x smaller than input)",
                summary.file_size_bytes as f64 / 1024.0 / 1024.0,
                ratio
            ),
        ),
    ];

    #[cfg(feature = "colorized_output")]
    {
        use console::style;

        let mut report = format!(
            "{} {}\n",
            style("Converted").green().bold(),
            style(output.display()).bold()
        );
        for (label, value) in lines {
            report.push_str(&format!("  {}: {}\n", style(label).cyan(), value));
        }
        report
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        let mut report = format!("Converted {}\n", output.display());
        for (label, value) in lines {
            report.push_str(&format!("  {}: {}\n", label, value));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mzparquet::source::{MemoryScan, MemoryScanSource};

    fn args() -> ConvertArgs {
        ConvertArgs {
            input: PathBuf::from("run.raw"),
            output: None,
            profile: Profile::Fast,
            config: None,
            compression_level: None,
            row_group_size: None,
            chunk_size: None,
            precision: None,
        }
    }

    #[test]
    fn test_profile_defaults_apply() {
        let settings = resolve_settings(&args(), None).unwrap();
        assert_eq!(settings.writer.compression, CompressionType::Zstd(1));
        assert_eq!(settings.pipeline.chunk_size, 1_048_576);
        assert_eq!(settings.pipeline.precision, Precision::Float);
    }

    #[test]
    fn test_flags_override_config_file() {
        let config = Config::parse(
            "[conversion]\ncompression_level = 7\nchunk_size = 100\nprecision = \"integer\"\n",
        )
        .unwrap();
        let mut cli = args();
        cli.chunk_size = Some(50);

        let settings = resolve_settings(&cli, Some(&config)).unwrap();
        assert_eq!(settings.writer.compression, CompressionType::Zstd(7));
        assert_eq!(settings.pipeline.chunk_size, 50);
        assert_eq!(settings.pipeline.precision, Precision::Integer);
        assert_eq!(settings.writer.precision, Precision::Integer);
    }

    #[test]
    fn test_rejects_out_of_range_compression_level() {
        let mut cli = args();
        cli.compression_level = Some(0);
        assert!(resolve_settings(&cli, None).is_err());

        let config = Config::parse("[conversion]\ncompression_level = 30\n").unwrap();
        assert!(resolve_settings(&args(), Some(&config)).is_err());

        cli.compression_level = Some(22);
        assert_eq!(
            resolve_settings(&cli, Some(&config)).unwrap().writer.compression,
            CompressionType::Zstd(22)
        );
    }

    #[test]
    fn test_empty_run_leaves_stale_output_alone() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("run.mzparquet");
        std::fs::write(&output, b"left over from an earlier run").unwrap();

        let settings = resolve_settings(&args(), None).unwrap();
        let writer =
            ParquetBatchWriter::new(&output, &OutputMetadata::new(), settings.writer).unwrap();
        let stats = Pipeline::new(MemoryScanSource::new(), settings.pipeline)
            .run(writer)
            .unwrap();

        let report = finish_report(Path::new("run.raw"), &output, &stats).unwrap();
        assert!(report.starts_with("No rows were written"));
        assert_eq!(std::fs::read(&output).unwrap(), b"left over from an earlier run");
    }

    #[test]
    fn test_convert_source_writes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("run.mzparquet");
        let source = MemoryScanSource::new()
            .with_scan(MemoryScan::ms1(0.5).with_centroids(vec![100.0, 200.0], vec![1.0, 2.0]));

        let settings = resolve_settings(&args(), None).unwrap();
        convert_source(source, Path::new("run.raw"), &output, None, settings).unwrap();

        assert_eq!(summarize_output(&output).unwrap().num_rows, 2);
    }

    #[test]
    fn test_rejects_non_raw_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.mzML");
        std::fs::write(&input, "fake").unwrap();

        let mut cli = args();
        cli.input = input;
        assert!(run(cli).is_err());
    }

    #[test]
    fn test_rejects_missing_input() {
        let mut cli = args();
        cli.input = PathBuf::from("/nonexistent/run.raw");
        assert!(run(cli).is_err());
    }

    #[test]
    fn test_normalize_instrument_model() {
        assert_eq!(normalize_instrument_model("  Orbitrap Exploris 480 "), Some("Orbitrap Exploris 480".to_string()));
        assert_eq!(normalize_instrument_model("Unknown"), None);
        assert_eq!(normalize_instrument_model(""), None);
    }
}
