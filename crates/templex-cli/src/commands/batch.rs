//! Batch command - run a template over many OCR recordings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use templex_core::config::TemplexConfig;
use templex_core::ocr::ReplayOcrEngine;
use templex_core::{DocumentImage, TemplatingEngine, TemplatingResult, TemplatingSettings};

use super::{
    describe_classification, format_result, load_config, load_document, load_mrz, load_settings,
    print_success, OutputFormat,
};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// OCR recordings, as a glob pattern
    #[arg(required = true)]
    input: String,

    /// Template file (JSON)
    #[arg(short, long)]
    template: PathBuf,

    /// Directory with an MRZ file per recording, matched by file name
    #[arg(long)]
    mrz_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of one recording.
struct ProcessResult {
    path: PathBuf,
    result: Option<TemplatingResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let settings = load_settings(&args.template)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} recordings to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let document = load_document(None)?;
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = process_single_file(&path, &settings, &document, &args, &config);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => results.push(ProcessResult {
                path,
                result: Some(result),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        result: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.result.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for processed in &successful {
            if let Some(result) = &processed.result {
                let output_name = processed
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_result(result, args.format, &config.output)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        print_success(format!("Summary written to {}", summary_path.display()));
    }

    println!();
    print_success(format!(
        "Processed {} files in {:?}",
        results.len(),
        start.elapsed()
    ));
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for processed in &failed {
            println!(
                "  - {}: {}",
                processed.path.display(),
                processed.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    settings: &TemplatingSettings,
    document: &DocumentImage,
    args: &BatchArgs,
    config: &TemplexConfig,
) -> anyhow::Result<TemplatingResult> {
    let replay = ReplayOcrEngine::from_file(path)?;

    let mrz_path = args
        .mrz_dir
        .as_ref()
        .and_then(|dir| path.file_name().map(|name| dir.join(name)))
        .filter(|p| p.exists());
    if mrz_path.is_none() && args.mrz_dir.is_some() {
        debug!("No MRZ for {}", path.display());
    }
    let mrz = load_mrz(mrz_path.as_deref())?;

    let engine = TemplatingEngine::from_config(settings.clone(), replay, &config.engine);
    Ok(engine.process(document, mrz.as_ref()))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "class",
        "matched",
        "processing_time_ms",
        "error",
    ])?;

    for processed in results {
        let filename = processed
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(result) = &processed.result {
            wtr.write_record([
                filename,
                "success",
                describe_classification(result.classification()),
                &result.matched_count().to_string(),
                &processed.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                &processed.processing_time_ms.to_string(),
                processed.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
