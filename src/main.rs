mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use slidecarve::extraction::write_manifest;
use slidecarve::types::size_human;
use slidecarve::{Carver, SourceFile, extract_all};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(&cli)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    println!("Reading {}...", cli.input.display());

    let source = SourceFile::open(&cli.input)
        .with_context(|| format!("Failed to open {}", cli.input.display()))?;

    println!(
        "File size: {} ({} bytes)",
        size_human(source.len() as u64),
        source.len()
    );

    let carver = Carver::with_options(&cli.scan_options());
    let result = carver.scan(source.as_bytes());

    println!();
    print!("{}", result.summary());

    if cli.dry_run {
        println!();
        println!("{:<6} {:<6} {:>12} {:>12} END", "#", "TYPE", "OFFSET", "SIZE");
        println!("{}", "-".repeat(50));
        for (i, candidate) in result.iter().enumerate() {
            println!(
                "{:<6} {:<6} {:>12} {:>12} {:?}",
                i + 1,
                candidate.format.extension(),
                candidate.start_offset,
                candidate.len(),
                candidate.termination
            );
        }
        return Ok(());
    }

    let options = cli.extract_options();
    let report = extract_all(&result, &options).with_context(|| {
        format!(
            "Failed to write images to {}",
            options.output_dir.display()
        )
    })?;

    if let Some(manifest) = &cli.manifest {
        write_manifest(&report, manifest)
            .with_context(|| format!("Failed to write manifest {}", manifest.display()))?;
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("Extraction complete!");
    println!("  Successfully saved: {} images", report.saved_count());
    println!("  Failed: {} images", report.failed);
    println!("  Output directory: {}/", options.output_dir.display());
    println!("{}", "=".repeat(60));

    Ok(())
}
