//! Configuration structures for the templating pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ocr::ResizeFilter;

/// Main configuration for templex.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplexConfig {
    /// Engine configuration.
    pub engine: EngineConfig,

    /// Result output configuration.
    pub output: OutputConfig,
}

/// Templating engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker thread hint passed to the OCR engine.
    pub num_threads: usize,

    /// Number of video frames the sieve votes over.
    pub sieve_window: usize,

    /// Filter used when scaling regions to their dewarp height.
    pub resize_filter: ResizeFilter,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_threads: 1,
            sieve_window: 5,
            resize_filter: ResizeFilter::Triangle,
        }
    }
}

/// Result output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Include per-group OCR trees in JSON output.
    pub include_ocr: bool,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_ocr: false,
            pretty: true,
        }
    }
}

impl TemplexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: TemplexConfig =
            serde_json::from_str(r#"{"engine": {"sieve_window": 9}}"#).unwrap();
        assert_eq!(config.engine.sieve_window, 9);
        assert_eq!(config.engine.num_threads, 1);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TemplexConfig::default();
        config.engine.resize_filter = ResizeFilter::Lanczos3;
        config.save(&path).unwrap();

        assert_eq!(TemplexConfig::from_file(&path).unwrap(), config);
    }
}
