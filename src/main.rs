//! PVDIFF command-line interface.
//!
//! Compares two product values snapshots and prints the labelled field
//! changes. Exit code 0 means no changes, 1 means changes, 2 means error.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pvdiff::{
    diff_documents, filter_changes, format_changes, parse_file, parse_stdin, FilterConfig,
    FormatHint, OutputFormat, OutputOptions, ProductValues,
};
use std::path::{Path, PathBuf};
use std::process;

/// PVDIFF - audit diff for product values documents
///
/// Reports every changed field of a product values snapshot under a
/// human-readable label, e.g. "price (USD) - web/en".
#[derive(Parser)]
#[command(name = "pvdiff")]
#[command(version)]
#[command(about = "Field-level audit diff for product values documents", long_about = None)]
struct Cli {
    /// Snapshot before the edit ("-" for stdin)
    #[arg(value_name = "OLD")]
    old: PathBuf,

    /// Snapshot after the edit ("-" for stdin)
    #[arg(value_name = "NEW")]
    new: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "terminal")]
    format: OutputFormatArg,

    /// Maximum length for displayed values
    #[arg(long, default_value = "80")]
    max_value_length: usize,

    /// Drop changes whose path matches PATTERN (e.g. "common.updated_at", "**.EUR")
    #[arg(long, value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Keep only changes whose path matches PATTERN (e.g. "channel_specific.**")
    #[arg(long, value_name = "PATTERN")]
    only: Vec<String>,

    /// Treat missing or undecodable snapshots as empty documents
    #[arg(long)]
    lenient: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (only show changes, suppress summary)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatArg {
    /// Colored terminal output
    Terminal,
    /// History entry JSON
    Json,
    /// Plain text (no colors)
    Plain,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Terminal => OutputFormat::Terminal,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Plain => OutputFormat::Plain,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    }
}

/// `RUST_LOG` wins when set; logs go to stderr so stdout stays the diff.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "pvdiff=debug" } else { "pvdiff=warn" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let filter = FilterConfig::from_patterns(&cli.ignore, &cli.only)
        .context("Invalid --ignore/--only pattern")?;

    if cli.old == Path::new("-") && cli.new == Path::new("-") {
        anyhow::bail!("Only one snapshot can be read from stdin");
    }

    let old = load_snapshot(&cli.old, cli.lenient)
        .with_context(|| format!("Failed to load old snapshot: {}", cli.old.display()))?;
    let new = load_snapshot(&cli.new, cli.lenient)
        .with_context(|| format!("Failed to load new snapshot: {}", cli.new.display()))?;

    let changes = filter_changes(&diff_documents(&old, &new), &filter);

    let output_options = OutputOptions {
        max_value_length: cli.max_value_length,
    };
    let output_format: OutputFormat = cli.format.into();
    let output = format_changes(&changes, &output_format, &output_options)
        .context("Failed to format diff output")?;

    if !cli.quiet || output_format == OutputFormat::Json {
        println!("{}", output);
    } else {
        for line in output.lines() {
            if !line.starts_with("Summary:") && !line.trim().is_empty() {
                println!("{}", line);
            }
        }
    }

    if changes.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn load_snapshot(path: &Path, lenient: bool) -> Result<ProductValues> {
    let result = if path == Path::new("-") {
        parse_stdin(FormatHint::Auto)
    } else {
        parse_file(path)
    };

    match result {
        Ok(doc) => Ok(doc),
        Err(err) if lenient => {
            tracing::warn!(path = %path.display(), error = %err, "treating snapshot as empty");
            Ok(ProductValues::default())
        }
        Err(err) => Err(err.into()),
    }
}
