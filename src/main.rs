use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};
use treealign::codec::{write_record, TreeReader};
use treealign::{AlignerConfig, TreeAligner, MIN_SEGMENT_LINKS};

#[derive(Parser, Debug)]
#[command(
    name = "treealign",
    version,
    about = "Align a pair of trees, inserting virtual nodes if necessary"
)]
struct Cli {
    /// Input stream of tree-pair records (default: stdin)
    input: Option<PathBuf>,

    /// Output stream (default: stdout)
    output: Option<PathBuf>,

    /// Exit with error if trees cannot be fully aligned
    #[arg(short, long)]
    error: bool,

    /// Only run the exact-match pass; never synthesize virtual nodes
    #[arg(long)]
    exact_only: bool,

    /// Real links a segment needs before a virtual pair is synthesized
    #[arg(long, default_value_t = MIN_SEGMENT_LINKS)]
    min_segment_links: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("could not open file {} for reading", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("could not open file {} for writing", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let config = if cli.exact_only {
        AlignerConfig::exact_only()
    } else {
        AlignerConfig::default()
    }
    .with_min_segment_links(cli.min_segment_links);
    let aligner = TreeAligner::new(config).context("invalid alignment settings")?;

    run(reader, writer, &aligner, cli.error)
}

/// Setup logging based on verbosity; stdout carries the record stream
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(
    reader: impl BufRead,
    mut writer: impl Write,
    aligner: &TreeAligner,
    fail_on_unaligned: bool,
) -> Result<()> {
    let mut records = TreeReader::new(reader);
    let mut record = 0usize;

    while let Some(mut pair) = records
        .next_pair()
        .with_context(|| format!("failed to decode record {}", record + 1))?
    {
        record += 1;
        let report = aligner
            .align(&mut pair)
            .with_context(|| format!("alignment failed for record {}", record))?;

        write_record(&mut writer, &pair)
            .with_context(|| format!("failed to write record {}", record))?;
        writer.flush()?;

        debug!(
            record,
            exact_links = report.exact_links,
            virtual_nodes = report.virtual_nodes(),
            "record written"
        );

        if fail_on_unaligned && !pair.is_fully_aligned() {
            bail!(
                "record {} could not be fully aligned; unaligned nodes: {:?}",
                record,
                report.unresolved
            );
        }
    }

    info!(records = record, "end of stream");
    Ok(())
}
