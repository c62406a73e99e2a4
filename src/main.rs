//! rust_geoprep command-line interface

use std::path::PathBuf;

use clap::Parser;
use log::{info, LevelFilter};

use rust_geoprep::annotation::default_reference_dir;
use rust_geoprep::cli::{Cli, Commands, ReadArgs};
use rust_geoprep::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Some(Commands::ReadRaw {
            archive,
            output,
            read,
        }) => run_read_raw(&archive, &output, &read),
        Some(Commands::Normalize {
            input,
            output,
            method,
            log2,
            index_cols,
        }) => run_normalize(&input, &output, &method, log2, index_cols),
        Some(Commands::Log2 {
            input,
            output,
            index_cols,
        }) => run_log2(&input, &output, index_cols),
        Some(Commands::Annotate {
            input,
            output,
            probe_type,
            references,
            index_cols,
        }) => run_annotate(&input, &output, &probe_type, references.as_deref(), index_cols),
        Some(Commands::Run {
            archive,
            output,
            method,
            log2,
            probe_type,
            read,
        }) => run_pipeline(&archive, &output, &method, log2, probe_type.as_deref(), &read),
        None => {
            print_no_args();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_no_args() {
    println!("rust_geoprep v{}", VERSION);
    println!("Run `rust_geoprep --help` for usage.");
}

fn load_table(input_path: &str, index_cols: usize) -> Result<ExpressionTable> {
    info!("Loading expression table from: {}", input_path);
    let table = read_expression_table(input_path, index_cols)?;
    info!("  {} features, {} samples", table.n_rows(), table.n_samples());
    Ok(table)
}

fn save_table(output_path: &str, table: &ExpressionTable) -> Result<()> {
    info!("Writing table to: {}", output_path);
    write_expression_table(output_path, table)?;
    info!("Done!");
    Ok(())
}

fn run_read_raw(archive_path: &str, output_path: &str, read: &ReadArgs) -> Result<()> {
    let options = read.to_options()?;
    info!("Reading archive: {}", archive_path);
    let table = read_raw(archive_path, &options)?;
    save_table(output_path, &table)
}

fn run_normalize(
    input_path: &str,
    output_path: &str,
    method: &str,
    log2: bool,
    index_cols: usize,
) -> Result<()> {
    // Fail on a bad method before reading the input
    method.parse::<NormMethod>()?;

    let table = load_table(input_path, index_cols)?;
    info!("Normalizing with {} (extra log2: {})...", method, log2);
    let normalized = normalize(&table, method, log2)?;
    save_table(output_path, &normalized)
}

fn run_log2(input_path: &str, output_path: &str, index_cols: usize) -> Result<()> {
    let table = load_table(input_path, index_cols)?;
    info!("Applying log2(x + 1)...");
    save_table(output_path, &log2(&table))
}

fn run_annotate(
    input_path: &str,
    output_path: &str,
    probe_type: &str,
    references: Option<&str>,
    index_cols: usize,
) -> Result<()> {
    probe_type.parse::<ProbeType>()?;

    let table = load_table(input_path, index_cols)?;
    let reference_dir = references.map(PathBuf::from).unwrap_or_else(default_reference_dir);
    info!("Adding {} IDs from {}", probe_type.to_uppercase(), reference_dir.display());
    let annotated = add_probe_id_from(&table, probe_type, &reference_dir)?;
    save_table(output_path, &annotated)
}

fn run_pipeline(
    archive_path: &str,
    output_path: &str,
    method: &str,
    log2: bool,
    probe_type: Option<&str>,
    read: &ReadArgs,
) -> Result<()> {
    let options = read.to_options()?;
    info!("Running pipeline on: {}", archive_path);
    let table = rust_geoprep::preprocess(archive_path, &options, method, log2, probe_type)?;
    save_table(output_path, &table)
}
