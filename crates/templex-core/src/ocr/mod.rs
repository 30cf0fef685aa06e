//! OCR result tree and the seam to the external OCR engine.
//!
//! The engine itself is not part of this crate. It is reached through the
//! [`OcrEngine`] and [`Dewarper`] traits; everything it returns is an
//! [`OcrResult`] tree of blocks, lines and chars that parsers only read.

pub mod charsets;
mod dewarp;
mod engine;
mod options;

pub use dewarp::{CropDewarper, Dewarper, ResizeFilter};
pub use engine::{OcrEngine, OcrRequest, RecordedRegion, ReplayOcrEngine};
pub use options::{OcrDocumentType, OcrFont, OcrOptions, Whitelist, WhitelistEntry};

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

const IDENTITY: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// A single recognized character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrChar {
    /// Unicode value of the character.
    pub value: char,
    /// Height of the character in pixels.
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub uncertain: bool,
    /// Recognition quality, 0 to 100.
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default)]
    pub position: Rect,
    #[serde(default)]
    pub font: OcrFont,
    /// Alternative readings of this character, best first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<OcrChar>,
}

fn default_quality() -> u8 {
    100
}

impl OcrChar {
    pub fn new(value: char, position: Rect) -> Self {
        Self {
            value,
            height: position.height.max(0.0) as u32,
            bold: false,
            italic: false,
            uncertain: false,
            quality: default_quality(),
            position,
            font: OcrFont::Any,
            variants: Vec::new(),
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.min(100);
        self
    }

    pub fn with_variants(mut self, variants: Vec<OcrChar>) -> Self {
        self.variants = variants;
        self
    }
}

/// A line of characters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OcrLine {
    pub position: Rect,
    pub chars: Vec<OcrChar>,
}

impl OcrLine {
    /// Build a line from plain text, laying the chars out on a fixed grid.
    ///
    /// Used for recorded OCR output that only keeps the text.
    pub fn from_text(text: &str, position: Rect) -> Self {
        let count = text.chars().count().max(1) as f32;
        let char_width = position.width / count;

        let chars = text
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let rect = Rect::new(
                    position.x + i as f32 * char_width,
                    position.y,
                    char_width,
                    position.height,
                );
                OcrChar::new(c, rect)
            })
            .collect();

        Self { position, chars }
    }

    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.value).collect()
    }

    /// Mean recognition quality of the line, 0 for an empty line.
    pub fn mean_quality(&self) -> f32 {
        if self.chars.is_empty() {
            return 0.0;
        }
        let total: u32 = self.chars.iter().map(|c| c.quality as u32).sum();
        total as f32 / self.chars.len() as f32
    }
}

/// A block of lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OcrBlock {
    pub position: Rect,
    pub lines: Vec<OcrLine>,
}

/// OCR output for one region image.
///
/// Coordinates are in the system of the image OCR ran on; `transformation`
/// is the row-major 3x3 matrix mapping them back onto the input image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    #[serde(default = "identity")]
    pub transformation: [f32; 9],
    #[serde(default)]
    pub blocks: Vec<OcrBlock>,
}

fn identity() -> [f32; 9] {
    IDENTITY
}

impl Default for OcrResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl OcrResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self {
            transformation: IDENTITY,
            blocks: Vec::new(),
        }
    }

    /// Single-block result with one line per entry, stacked 40px apart.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        const LINE_HEIGHT: f32 = 40.0;

        let lines: Vec<OcrLine> = lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let text = text.as_ref();
                let width = text.chars().count() as f32 * 24.0;
                OcrLine::from_text(text, Rect::new(0.0, i as f32 * LINE_HEIGHT, width, 32.0))
            })
            .collect();

        let position = lines
            .iter()
            .map(|l| l.position)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();

        Self {
            transformation: IDENTITY,
            blocks: vec![OcrBlock { position, lines }],
        }
    }

    /// Iterate over all lines of all blocks in order.
    pub fn lines(&self) -> impl Iterator<Item = &OcrLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    /// Iterate over all chars in reading order.
    pub fn chars(&self) -> impl Iterator<Item = &OcrChar> {
        self.lines().flat_map(|l| l.chars.iter())
    }

    pub fn char_count(&self) -> usize {
        self.chars().count()
    }

    /// True when no character was recognized.
    pub fn is_empty(&self) -> bool {
        self.chars().next().is_none()
    }

    /// Plain text of the tree, lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
