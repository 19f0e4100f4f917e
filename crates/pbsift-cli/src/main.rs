//! pbsift - Dump the fields of a Protocol Buffer message without its schema
//!
//! This tool reads one encoded message from a file and prints every leaf
//! field as `pb_<n1>_<n2>... : <value>`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use pbsift_core::{
    DecodeReport, Decoder, DecoderConfig, LineWriter, StatsVisitor, MAX_FIELD_NUMBER, ROOT_LABEL,
};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, Level};
use tracing_subscriber::EnvFilter;

/// Dump the fields of a Protocol Buffer message without its .proto schema
#[derive(Parser, Debug)]
#[command(name = "pbsift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// File holding one encoded message
    file: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Highest field number accepted before the input counts as garbage
    #[arg(long, default_value_t = MAX_FIELD_NUMBER)]
    max_field_number: u32,

    /// Stop trying to read payloads as messages below this depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Label at the start of every printed path
    #[arg(long, default_value = ROOT_LABEL)]
    root_label: String,

    /// Fail if the input stops decoding before its end
    #[arg(long)]
    strict: bool,
}

impl Cli {
    fn decoder_config(&self) -> DecoderConfig {
        let config = DecoderConfig::new()
            .max_field_number(self.max_field_number)
            .root_label(self.root_label.clone());
        match self.max_depth {
            Some(depth) => config.max_depth(depth),
            None => config,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

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

    let data = read_input(&cli.file)?;

    let stdout = io::stdout();
    let report = decode_input(&cli, &data, stdout.lock())?;

    if cli.strict {
        report
            .into_result()
            .with_context(|| format!("Input did not decode completely: {}", cli.file.display()))?;
    }

    Ok(())
}

/// Read the whole input file
fn read_input(file: &Path) -> Result<Vec<u8>> {
    if file.as_os_str().is_empty() {
        bail!("Input file path is empty");
    }
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }

    trace!("Reading {}", file.display());
    let data = fs::read(file)
        .with_context(|| format!("Failed to read input file: {}", file.display()))?;
    debug!("Read {} bytes from {}", data.len(), file.display());

    Ok(data)
}

/// Decode `data` to `out` and log a summary
fn decode_input(cli: &Cli, data: &[u8], out: impl Write) -> Result<DecodeReport> {
    let decoder = Decoder::with_config(cli.decoder_config());
    let mut visitor = (StatsVisitor::default(), LineWriter::new(BufWriter::new(out)));

    let report = decoder
        .decode(data, &mut visitor)
        .context("Failed to write decoded fields")?;
    visitor
        .1
        .into_inner()
        .flush()
        .context("Failed to write decoded fields")?;

    let stats = &visitor.0;
    info!(
        "Summary: {} top-level fields, {} leaves ({} numbers, {} byte strings), {} messages, depth {}",
        report.fields,
        stats.leaf_count,
        stats.number_count,
        stats.bytes_count,
        stats.message_count,
        stats.max_depth
    );
    if stats.rejected_count > 0 {
        debug!(
            "{} length-delimited payloads did not decode as messages",
            stats.rejected_count
        );
    }
    if let Some(e) = &report.stopped {
        info!(
            "Decoding stopped at offset {} of {}: {}",
            e.offset(),
            data.len(),
            e
        );
    }

    Ok(report)
}
