//! The OCR engine seam and a replaying implementation.

use std::collections::HashMap;
use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OcrError, Result};
use crate::template::DecodingRegion;

use super::{OcrLine, OcrOptions, OcrResult};

/// One OCR pass over a dewarped region image.
#[derive(Debug, Clone, Copy)]
pub struct OcrRequest<'a> {
    /// Region the image was cut from.
    pub region: &'a DecodingRegion,
    /// Dewarped region image.
    pub image: &'a DynamicImage,
    /// Options merged over the region's parser group.
    pub options: &'a OcrOptions,
    /// Worker thread hint for the engine.
    pub num_threads: usize,
}

/// Character recognition engine.
///
/// Implementations return an empty tree when no text is found; errors are
/// reserved for engine failures. Either way the pipeline carries on.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, request: &OcrRequest<'_>) -> std::result::Result<OcrResult, OcrError>;
}

impl<E: OcrEngine + ?Sized> OcrEngine for Box<E> {
    fn recognize(&self, request: &OcrRequest<'_>) -> std::result::Result<OcrResult, OcrError> {
        (**self).recognize(request)
    }
}

impl<E: OcrEngine + ?Sized> OcrEngine for std::sync::Arc<E> {
    fn recognize(&self, request: &OcrRequest<'_>) -> std::result::Result<OcrResult, OcrError> {
        (**self).recognize(request)
    }
}

/// Recorded OCR output for a region: either plain lines or a full tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedRegion {
    Lines(Vec<String>),
    Tree(OcrResult),
}

impl From<RecordedRegion> for OcrResult {
    fn from(recorded: RecordedRegion) -> Self {
        match recorded {
            RecordedRegion::Lines(lines) => OcrResult::from_lines(&lines),
            RecordedRegion::Tree(tree) => tree,
        }
    }
}

/// Engine that plays back recorded OCR trees keyed by region name.
///
/// The recorded chars are filtered through the request's whitelist and
/// `max_chars_expected`, the two options that decide what a real engine
/// may return.
#[derive(Debug, Clone, Default)]
pub struct ReplayOcrEngine {
    regions: HashMap<String, OcrResult>,
}

impl ReplayOcrEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, name: impl Into<String>, result: OcrResult) -> Self {
        self.regions.insert(name.into(), result);
        self
    }

    pub fn with_lines<S: AsRef<str>>(self, name: impl Into<String>, lines: &[S]) -> Self {
        self.with_region(name, OcrResult::from_lines(lines))
    }

    /// Parse a JSON object mapping region names to recorded output.
    pub fn from_json(json: &str) -> Result<Self> {
        let recorded: HashMap<String, RecordedRegion> = serde_json::from_str(json)?;
        Ok(Self {
            regions: recorded
                .into_iter()
                .map(|(name, region)| (name, region.into()))
                .collect(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}

impl OcrEngine for ReplayOcrEngine {
    fn recognize(&self, request: &OcrRequest<'_>) -> std::result::Result<OcrResult, OcrError> {
        let Some(recorded) = self.regions.get(&request.region.name) else {
            debug!("No recording for region {}", request.region.name);
            return Ok(OcrResult::empty());
        };

        let mut result = recorded.clone();

        if let Some(whitelist) = &request.options.whitelist {
            for block in &mut result.blocks {
                for line in &mut block.lines {
                    // Spaces are layout, not recognized characters.
                    line.chars
                        .retain(|c| c.value.is_whitespace() || whitelist.contains(c.value));
                }
                block.lines.retain(|l: &OcrLine| !l.chars.is_empty());
            }
        }

        if let Some(limit) = request.options.max_chars_expected {
            if result.char_count() > limit {
                debug!(
                    "Region {} has {} chars, more than the {} expected",
                    request.region.name,
                    result.char_count(),
                    limit
                );
                return Ok(OcrResult::empty());
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::ocr::Whitelist;

    fn request<'a>(
        region: &'a DecodingRegion,
        image: &'a DynamicImage,
        options: &'a OcrOptions,
    ) -> OcrRequest<'a> {
        OcrRequest {
            region,
            image,
            options,
            num_threads: 1,
        }
    }

    #[test]
    fn test_replay_filters_whitelist() {
        let engine = ReplayOcrEngine::new().with_lines("Gender", &["SPOL M/F", "Ž/F"]);
        let region = DecodingRegion::new("Gender", Rect::unit(), 100).unwrap();
        let image = DynamicImage::new_luma8(10, 10);
        let options = OcrOptions::default().with_whitelist(Whitelist::from_chars("MFŽ/"));

        let result = engine.recognize(&request(&region, &image, &options)).unwrap();
        assert_eq!(result.text(), " M/F\nŽ/F");
    }

    #[test]
    fn test_replay_missing_region_is_empty() {
        let engine = ReplayOcrEngine::new();
        let region = DecodingRegion::new("Address", Rect::unit(), 100).unwrap();
        let image = DynamicImage::new_luma8(10, 10);
        let options = OcrOptions::default();

        let result = engine.recognize(&request(&region, &image, &options)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_replay_from_json_mixed() {
        let json = r#"{
            "DateOfIssue": ["18.04.2017"],
            "IssuedBy": {"blocks": []}
        }"#;
        let engine = ReplayOcrEngine::from_json(json).unwrap();
        let mut names: Vec<_> = engine.region_names().collect();
        names.sort();
        assert_eq!(names, vec!["DateOfIssue", "IssuedBy"]);
    }

    #[test]
    fn test_replay_max_chars_expected() {
        let engine = ReplayOcrEngine::new().with_lines("Number", &["123456789"]);
        let region = DecodingRegion::new("Number", Rect::unit(), 100).unwrap();
        let image = DynamicImage::new_luma8(10, 10);
        let mut options = OcrOptions::default();
        options.max_chars_expected = Some(5);

        let result = engine.recognize(&request(&region, &image, &options)).unwrap();
        assert!(result.is_empty());
    }
}
