//! Run command - extract fields from one document, or from consecutive
//! video frames of it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use tracing::{debug, info};

use templex_core::config::EngineConfig;
use templex_core::ocr::{OcrRequest, ReplayOcrEngine};
use templex_core::{
    DocumentImage, MrtdResult, OcrEngine, OcrError, OcrResult, TemplatingEngine, TemplatingResult,
    TemplatingSettings,
};

use super::{
    describe_classification, format_result, load_config, load_document, load_mrz, load_settings,
    print_success, OutputFormat,
};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Template file (JSON)
    #[arg(short, long)]
    template: PathBuf,

    /// Recorded OCR output per region (JSON)
    #[arg(long, required_unless_present = "frames", conflicts_with = "frames")]
    ocr: Option<PathBuf>,

    /// Recorded OCR output of consecutive video frames, as a glob pattern;
    /// frames are processed in path order and the last result is printed
    #[arg(long, value_name = "GLOB")]
    frames: Option<String>,

    /// Machine readable zone read from the document (JSON)
    #[arg(long)]
    mrz: Option<PathBuf>,

    /// Document image; a blank card is used when omitted
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if let Some(ocr) = &args.ocr {
        if !ocr.exists() {
            anyhow::bail!("OCR recording not found: {}", ocr.display());
        }
    }

    let settings = load_settings(&args.template)?;
    let document = load_document(args.image.as_deref())?;
    let mrz = load_mrz(args.mrz.as_deref())?;

    let result = match (&args.ocr, &args.frames) {
        (Some(ocr), _) => process_still(settings, ocr, &document, mrz.as_ref(), &config.engine)?,
        (None, Some(pattern)) => {
            process_frames(settings, pattern, &document, mrz.as_ref(), &config.engine)?
        }
        (None, None) => anyhow::bail!("Either --ocr or --frames is required"),
    };

    let output = format_result(&result, args.format, &config.output)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        print_success(format!("Output written to {}", output_path.display()));
        println!(
            "{} Class {}, {} values",
            style("ℹ").blue(),
            describe_classification(result.classification()),
            result.matched_count()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn process_still(
    settings: TemplatingSettings,
    ocr: &Path,
    document: &DocumentImage,
    mrz: Option<&MrtdResult>,
    config: &EngineConfig,
) -> anyhow::Result<TemplatingResult> {
    let replay = ReplayOcrEngine::from_file(ocr)
        .map_err(|e| anyhow::anyhow!("Invalid OCR recording {}: {}", ocr.display(), e))?;

    info!("Processing {}", ocr.display());

    let engine = TemplatingEngine::from_config(settings, replay, config);
    Ok(engine.process(document, mrz))
}

fn process_frames(
    settings: TemplatingSettings,
    pattern: &str,
    document: &DocumentImage,
    mrz: Option<&MrtdResult>,
    config: &EngineConfig,
) -> anyhow::Result<TemplatingResult> {
    let mut frames: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    frames.sort();

    if frames.is_empty() {
        anyhow::bail!("No frames found for pattern: {}", pattern);
    }

    info!(
        "Processing {} frames with a sieve window of {}",
        frames.len(),
        config.sieve_window
    );

    let engine = TemplatingEngine::from_config(settings, FrameReplay::default(), config);
    let mut session = engine.video_session_from_config(config);

    let mut result = TemplatingResult::default();
    for frame in &frames {
        let replay = ReplayOcrEngine::from_file(frame)
            .map_err(|e| anyhow::anyhow!("Invalid OCR recording {}: {}", frame.display(), e))?;
        engine.ocr_engine().load(replay)?;

        result = session.process_frame(document, mrz);
        debug!("Frame {}: {} values", frame.display(), result.matched_count());
    }

    Ok(result)
}

/// Replays the recording of the frame currently being processed.
#[derive(Default)]
struct FrameReplay(RwLock<ReplayOcrEngine>);

impl FrameReplay {
    fn load(&self, replay: ReplayOcrEngine) -> anyhow::Result<()> {
        let mut current = self
            .0
            .write()
            .map_err(|_| anyhow::anyhow!("Frame recording is unavailable"))?;
        *current = replay;
        Ok(())
    }
}

impl OcrEngine for FrameReplay {
    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrResult, OcrError> {
        let current = self
            .0
            .read()
            .map_err(|_| OcrError::Recognition("frame recording is unavailable".to_string()))?;
        current.recognize(request)
    }
}
