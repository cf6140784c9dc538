//! hdump CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use hdump_export::{ExportOptions, ExportSummary, OutputMode, Precision, export_with_options};
use hdump_root::RootFile;

#[derive(Parser)]
#[command(name = "hdump")]
#[command(about = "Dump the 1D histograms of a ROOT file to text, one file per histogram")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write `low_edge content width` per bin
    Basic(ExportArgs),

    /// Write `low_edge content width error` per bin
    Errors(ExportArgs),

    /// List top-level keys (name, class, cycle)
    List {
        /// Input ROOT file
        input: PathBuf,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// Input ROOT file
    input: PathBuf,

    /// Existing directory receiving `<name>.txt` files
    output_dir: PathBuf,

    /// Digits after the decimal point. Defaults to the shortest exact form.
    #[arg(long)]
    precision: Option<usize>,

    /// Also write a JSON summary of written and skipped entries.
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Basic(args) => cmd_export(&args, OutputMode::Basic),
        Commands::Errors(args) => cmd_export(&args, OutputMode::WithErrors),
        Commands::List { input } => cmd_list(&input),
    }
}

fn cmd_export(args: &ExportArgs, mode: OutputMode) -> Result<()> {
    let precision = args.precision.map_or(Precision::Shortest, Precision::Fixed);
    let options = ExportOptions::new(mode).with_precision(precision);

    tracing::info!(input = %args.input.display(), out = %args.output_dir.display(), ?mode, "exporting");
    let summary = export_with_options(&args.input, &args.output_dir, options)
        .with_context(|| format!("failed to export {}", args.input.display()))?;

    if let Some(path) = &args.summary {
        write_summary(&summary, path)?;
    }

    eprintln!(
        "Wrote {} histogram(s) to {} ({} skipped)",
        summary.written.len(),
        args.output_dir.display(),
        summary.skipped.len(),
    );
    Ok(())
}

fn write_summary(summary: &ExportSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("failed to write summary {}", path.display()))?;
    tracing::info!(path = %path.display(), "summary written");
    Ok(())
}

fn cmd_list(input: &Path) -> Result<()> {
    let file = RootFile::open(input)
        .with_context(|| format!("failed to open ROOT file {}", input.display()))?;
    let keys = file
        .list_keys()
        .with_context(|| format!("failed to list keys of {}", input.display()))?;
    for k in keys {
        println!("{} {} {}", k.name, k.class_name, k.cycle);
    }
    Ok(())
}
