//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod run;
pub mod template;

use std::path::{Path, PathBuf};

use console::style;
use tracing::{debug, warn};

use templex_core::config::OutputConfig;
use templex_core::{
    Classification, DocumentImage, MrtdResult, ParsedValue, TemplateFile, TemplatingResult,
    TemplatingSettings, TemplexConfig,
};

/// Size of the stand-in document when no image is given; ID-1 card proportions.
const BLANK_DOCUMENT: (u32, u32) = (1000, 630);

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per parser
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("templex")
        .join("config.json")
}

/// Explicit config file, else the default one when present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TemplexConfig> {
    if let Some(path) = config_path {
        return Ok(TemplexConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config {}", default_path.display());
        Ok(TemplexConfig::from_file(&default_path)?)
    } else {
        Ok(TemplexConfig::default())
    }
}

/// Load a template and build its settings, logging configuration warnings.
pub fn load_settings(path: &Path) -> anyhow::Result<TemplatingSettings> {
    let settings = TemplateFile::load(path)
        .and_then(|template| template.into_settings())
        .map_err(|e| anyhow::anyhow!("Invalid template {}: {}", path.display(), e))?;

    for warning in settings.validate() {
        warn!("{}", warning);
    }

    Ok(settings)
}

pub fn load_document(image: Option<&Path>) -> anyhow::Result<DocumentImage> {
    match image {
        Some(path) => {
            let image = image::open(path)
                .map_err(|e| anyhow::anyhow!("Failed to open image {}: {}", path.display(), e))?;
            Ok(DocumentImage::whole(image))
        }
        None => Ok(DocumentImage::blank(BLANK_DOCUMENT.0, BLANK_DOCUMENT.1)),
    }
}

pub fn load_mrz(path: Option<&Path>) -> anyhow::Result<Option<MrtdResult>> {
    path.map(|p| {
        MrtdResult::from_file(p)
            .map_err(|e| anyhow::anyhow!("Invalid MRZ file {}: {}", p.display(), e))
    })
    .transpose()
}

pub fn describe_classification(classification: &Classification) -> &str {
    match classification {
        Classification::Unclassified => "unclassified",
        Classification::Classified(class) => class,
        Classification::Unclassifiable => "unclassifiable",
    }
}

pub fn format_result(
    result: &TemplatingResult,
    format: OutputFormat,
    output: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(result, output),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_json(result: &TemplatingResult, output: &OutputConfig) -> anyhow::Result<String> {
    let result = if output.include_ocr {
        result.clone()
    } else {
        result.without_ocr()
    };

    if output.pretty {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(serde_json::to_string(&result)?)
    }
}

fn iso_date(value: &ParsedValue) -> String {
    value
        .as_date()
        .and_then(|d| d.to_naive())
        .map(|d| d.to_string())
        .unwrap_or_default()
}

fn format_csv(result: &TemplatingResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["class", "group", "parser", "status", "value", "date"])?;

    let class = describe_classification(result.classification());
    for (group, parser, value) in result.entries() {
        match value {
            Some(value) => {
                wtr.write_record([class, group, parser, "matched", value.as_str(), &iso_date(value)])?
            }
            None => wtr.write_record([class, group, parser, "no_match", "", ""])?,
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &TemplatingResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Class: {}\n",
        describe_classification(result.classification())
    ));

    let mut current_group = None;
    for (group, parser, value) in result.entries() {
        if current_group != Some(group) {
            output.push_str(&format!("\n{}:\n", group));
            current_group = Some(group);
        }

        match value {
            Some(ParsedValue::Date(date)) if !date.successfully_parsed => {
                output.push_str(&format!("  {}: {} (invalid date)\n", parser, date.original));
            }
            Some(value) => {
                output.push_str(&format!("  {}: {}\n", parser, value.as_str().replace('\n', " / ")));
            }
            None => output.push_str(&format!("  {}: -\n", parser)),
        }
    }

    output
}

pub fn print_success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use templex_core::ocr::ReplayOcrEngine;
    use templex_core::template::RegexParserSettings;
    use templex_core::{DecodingRegion, ParserSpec, Rect, TemplatingEngine};

    fn sample_result() -> TemplatingResult {
        let mut settings = TemplatingSettings::new();
        settings
            .set_default_regions(&[
                DecodingRegion::new("Name", Rect::new(0.1, 0.1, 0.5, 0.2), 100).unwrap(),
            ])
            .unwrap();
        settings
            .add_parser("Name", ParserSpec::regex("Name", RegexParserSettings::new("[A-Z]+")))
            .unwrap();
        settings
            .add_parser("Name", ParserSpec::regex("Number", RegexParserSettings::new(r"\d+")))
            .unwrap();

        let replay = ReplayOcrEngine::new().with_lines("Name", &["IVANA"]);
        TemplatingEngine::new(settings, replay).process(&DocumentImage::blank(100, 100), None)
    }

    #[test]
    fn test_csv_rows_per_parser() {
        let csv = format_csv(&sample_result()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "class,group,parser,status,value,date");
        assert_eq!(lines[1], "unclassified,Name,Name,matched,IVANA,");
        assert_eq!(lines[2], "unclassified,Name,Number,no_match,,");
    }

    #[test]
    fn test_text_marks_missing_values() {
        let text = format_text(&sample_result());
        assert!(text.starts_with("Class: unclassified\n"));
        assert!(text.contains("  Name: IVANA\n"));
        assert!(text.contains("  Number: -\n"));
    }

    #[test]
    fn test_json_drops_ocr_unless_asked() {
        let result = sample_result();

        let compact = OutputConfig {
            include_ocr: false,
            pretty: false,
        };
        let json: serde_json::Value =
            serde_json::from_str(&format_json(&result, &compact).unwrap()).unwrap();
        assert!(json.get("ocr").is_none());
        assert_eq!(json["values"]["Name"]["Name"]["value"], "IVANA");

        let full = OutputConfig {
            include_ocr: true,
            pretty: true,
        };
        let json: serde_json::Value =
            serde_json::from_str(&format_json(&result, &full).unwrap()).unwrap();
        assert!(json["ocr"]["Name"].is_object());
    }
}
