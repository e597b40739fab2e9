use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use roi_import::{
    parse_file_list, preview, run_batch, BatchReport, CoordinateMapping, FilePair, ImportOptions,
    ImportStats,
};
use roi_model::{ImageId, RoiRecord};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "ndpa-import")]
#[command(about = "Import NDPA slide annotations as image ROIs")]
pub struct Cli {
    /// Repository directory (defaults to $NDPA_IMPORT_REPO, then the user data directory)
    #[arg(long, global = true, value_name = "DIR")]
    repo: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Register annotations for one image or for every image in a file list.
    Import {
        /// Image or annotation file of a single pair
        #[arg(short, long, value_name = "FILE", conflicts_with = "filelist")]
        file: Option<String>,
        /// Text file with one image or annotation path per line
        #[arg(short = 'l', long, value_name = "FILE", required_unless_present = "file")]
        filelist: Option<PathBuf>,
        /// Map and check duplicates without registering anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the ROIs an annotation file maps to, as JSON.
    Convert {
        #[arg(value_name = "FILE")]
        file: String,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct ConvertOutput {
    annotations: String,
    image: ImageId,
    mapping: CoordinateMapping,
    stats: ImportStats,
    rois: Vec<RoiRecord>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Import { file, filelist, dry_run } => {
            let pairs = read_pairs(file.as_deref(), filelist.as_deref())?;
            run_import(&Config::resolve(cli.repo)?, pairs, ImportOptions { dry_run })
        }
        Commands::Convert { file } => run_convert(&Config::resolve(cli.repo)?, &file),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn read_pairs(file: Option<&str>, filelist: Option<&Path>) -> Result<Vec<FilePair>> {
    match (file, filelist) {
        (Some(file), _) => Ok(vec![FilePair::from_entry(file)]),
        (None, Some(list)) => {
            let text = fs::read_to_string(list)
                .with_context(|| format!("failed to read file list {}", list.display()))?;
            Ok(parse_file_list(&text))
        }
        (None, None) => bail!("either --file or --filelist is required"),
    }
}

fn run_import(config: &Config, pairs: Vec<FilePair>, options: ImportOptions) -> Result<()> {
    let mut repo = config.open_repository()?;
    let report = run_batch(&mut repo, pairs, options);
    repo.close();

    print_summary(&report, options);

    let failed = report.failed();
    if failed > 0 {
        bail!("{failed} of {} pairs failed", report.outcomes.len());
    }

    Ok(())
}

fn print_summary(report: &BatchReport, options: ImportOptions) {
    let verb = if options.dry_run { "would import" } else { "imported" };

    for outcome in &report.outcomes {
        let Ok(pair) = &outcome.result else {
            continue;
        };

        println!(
            "{}: image {} {verb} {}, duplicates {}, skipped {} of {}",
            outcome.pair.annotations.display(),
            pair.image,
            pair.stats.imported,
            pair.stats.duplicates,
            pair.stats.skipped,
            pair.stats.total_found,
        );
    }

    println!("total: {verb} {} shapes", report.imported());
}

fn run_convert(config: &Config, file: &str) -> Result<()> {
    let pair = FilePair::from_entry(file);
    pair.ensure_exists()?;

    let repo = config.open_repository()?;
    let (image, mapping, conversion) = preview(&repo, &pair.image_name(), &pair.annotations)
        .with_context(|| format!("failed to convert {}", pair.annotations.display()))?;
    repo.close();

    let output = ConvertOutput {
        annotations: pair.annotations.display().to_string(),
        image,
        mapping,
        stats: conversion.stats,
        rois: conversion.rois,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
