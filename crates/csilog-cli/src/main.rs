//! csilog - Inspect captured CSI tool notification logs
//!
//! Reads a log written by the CSI capture tool, lists every entry or prints
//! the header of each beamforming feedback notification, and exits with a
//! status that tells scripts how decoding ended.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use csilog_core::{open_file, DecodeStats, DecodedRecord, DecoderConfig, Record, MAX_ENTRY_SIZE};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Inspect captured CSI tool notification logs
#[derive(Parser, Debug)]
#[command(name = "csilog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the captured log file
    file: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, value_enum, default_value = "entries")]
    format: OutputFormat,

    /// Maximum number of records to decode (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_records: usize,

    /// Largest accepted entry size in bytes (1 to 4096)
    #[arg(
        long,
        default_value_t = MAX_ENTRY_SIZE as u16,
        value_parser = clap::value_parser!(u16).range(1..=MAX_ENTRY_SIZE as i64)
    )]
    max_entry_size: u16,
}

/// Output format for decoded records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per entry with its size and type code
    Entries,
    /// Only beamforming notifications, with rate and length
    Bfee,
}

/// Process exit statuses, one per way a run can end
mod status {
    pub(crate) const OK: u8 = 0;
    pub(crate) const USAGE: u8 = 1;
    pub(crate) const EMPTY_ENTRY: u8 = 2;
    pub(crate) const OVERSIZED_ENTRY: u8 = 3;
    pub(crate) const TRUNCATED_FRAME: u8 = 4;
    pub(crate) const TRUNCATED_PAYLOAD: u8 = 5;
    pub(crate) const SHORT_NOTIFICATION: u8 = 6;
    pub(crate) const IO: u8 = 7;
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_status(&e));
        }
    };

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = run(&cli, &mut out);

    match result {
        Ok(stats) => {
            info!(
                "Summary: {} records, {} beamforming, {} unrecognized, {} bytes",
                stats.records, stats.beamforming, stats.unrecognized, stats.bytes_consumed
            );
            ExitCode::from(status::OK)
        }
        Err(e) => {
            eprintln!("Error: {}", describe_failure(&e));
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Decode the log named on the command line, writing one line per shown record
fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<DecodeStats> {
    let config = DecoderConfig::new()
        .max_records(cli.max_records)
        .max_entry_size(usize::from(cli.max_entry_size));

    let mut decoder = open_file(&cli.file, config)
        .with_context(|| format!("Failed to open log file: {}", cli.file.display()))?;
    debug!("Decoding {}", cli.file.display());

    while let Some(decoded) = decoder
        .next_record()
        .with_context(|| format!("Failed to decode {}", cli.file.display()))?
    {
        if let Some(line) = format_record(cli.format, &decoded) {
            writeln!(out, "{}", line).context("Failed to write output")?;
        }
    }
    out.flush().context("Failed to write output")?;

    Ok(*decoder.stats())
}

/// Render one record, or `None` if the format skips it
fn format_record(format: OutputFormat, decoded: &DecodedRecord) -> Option<String> {
    match format {
        OutputFormat::Entries => Some(format!(
            "Entry size={}, code=0x{:X}",
            decoded.length,
            decoded.record.code()
        )),
        OutputFormat::Bfee => match &decoded.record {
            Record::Beamforming(bfee) => Some(bfee.to_string()),
            _ => None,
        },
    }
}

/// Exit status for a command line clap refused to parse
fn usage_status(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => status::OK,
        _ => status::USAGE,
    }
}

/// One-line diagnostic with the failing frame's offset, if any
fn describe_failure(err: &anyhow::Error) -> String {
    let Some(decode_err) = err.downcast_ref::<csilog_core::Error>() else {
        return format!("{:#}", err);
    };

    let mut message = format!("{:#}", err);
    if let Some(offset) = decode_err.offset() {
        message.push_str(&format!(" (frame at byte {})", offset));
    }
    if decode_err.is_truncation() {
        message.push_str("; the capture appears to end mid-entry");
    }
    message
}

/// Map a failure onto the exit status scripts can tell apart
fn exit_status(err: &anyhow::Error) -> u8 {
    let Some(err) = err.downcast_ref::<csilog_core::Error>() else {
        return status::IO;
    };

    match err {
        csilog_core::Error::FileRead { .. } => status::USAGE,
        csilog_core::Error::InvalidLength { .. } => status::EMPTY_ENTRY,
        csilog_core::Error::OversizedLength { .. } => status::OVERSIZED_ENTRY,
        csilog_core::Error::TruncatedFrame { .. } => status::TRUNCATED_FRAME,
        csilog_core::Error::TruncatedPayload { .. } => status::TRUNCATED_PAYLOAD,
        csilog_core::Error::ShortNotification { .. } => status::SHORT_NOTIFICATION,
        _ => status::IO,
    }
}
