//! OCR engine options attached to parsers, and their per-group merge.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Font a whitelisted character may be recognized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrFont {
    /// Any supported font.
    #[default]
    Any,
    Arial,
    Courier,
    Helvetica,
    TimesNewRoman,
    Verdana,
    OcrA,
    OcrB,
    /// MICR E-13B.
    Micr,
}

/// Character set and engine tuning the OCR engine is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrDocumentType {
    /// Latin alphabet, digits, punctuation and common national characters.
    #[default]
    Generic,
    /// Magnetic ink characters used on cheques.
    Micr,
    /// Arabic-Indic numerals used in amounts.
    Arabic,
}

/// An allowed character and font combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub value: char,
    #[serde(default)]
    pub font: OcrFont,
}

impl WhitelistEntry {
    pub fn any_font(value: char) -> Self {
        Self {
            value,
            font: OcrFont::Any,
        }
    }
}

/// Set of characters the OCR engine may return.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "WhitelistRepr", into = "WhitelistRepr")]
pub struct Whitelist {
    entries: BTreeSet<WhitelistEntry>,
}

/// Serialized form: a plain string when every entry allows any font.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WhitelistRepr {
    Chars(String),
    Entries(Vec<WhitelistEntry>),
}

impl From<WhitelistRepr> for Whitelist {
    fn from(repr: WhitelistRepr) -> Self {
        match repr {
            WhitelistRepr::Chars(chars) => Whitelist::from_chars(&chars),
            WhitelistRepr::Entries(entries) => Whitelist {
                entries: entries.into_iter().collect(),
            },
        }
    }
}

impl From<Whitelist> for WhitelistRepr {
    fn from(whitelist: Whitelist) -> Self {
        if whitelist.entries.iter().all(|e| e.font == OcrFont::Any) {
            WhitelistRepr::Chars(whitelist.entries.iter().map(|e| e.value).collect())
        } else {
            WhitelistRepr::Entries(whitelist.entries.into_iter().collect())
        }
    }
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whitelist of the given characters in any font.
    pub fn from_chars(chars: &str) -> Self {
        Self {
            entries: chars.chars().map(WhitelistEntry::any_font).collect(),
        }
    }

    pub fn insert(&mut self, value: char, font: OcrFont) {
        self.entries.insert(WhitelistEntry { value, font });
    }

    pub fn with_chars(mut self, chars: &str) -> Self {
        self.entries
            .extend(chars.chars().map(WhitelistEntry::any_font));
        self
    }

    /// Whether the character is allowed in at least one font.
    pub fn contains(&self, value: char) -> bool {
        self.entries.iter().any(|e| e.value == value)
    }

    pub fn union(&self, other: &Whitelist) -> Whitelist {
        Whitelist {
            entries: self.entries.union(&other.entries).copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WhitelistEntry> {
        self.entries.iter()
    }
}

impl FromIterator<WhitelistEntry> for Whitelist {
    fn from_iter<I: IntoIterator<Item = WhitelistEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Settings for one OCR pass over a region image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrOptions {
    /// Allowed characters. `None` allows everything the engine supports.
    pub whitelist: Option<Whitelist>,

    /// Maximum number of alternative readings produced per char.
    pub max_char_variants: u32,

    /// Lines lower than this many pixels are ignored.
    pub min_line_height: u32,

    /// Chars taller than this many pixels are ignored.
    pub max_line_height: u32,

    /// Chars lower than this many pixels are ignored.
    pub min_char_height: u32,

    /// Give up on images with more chars than this. `None` is unlimited.
    pub max_chars_expected: Option<usize>,

    /// Document type tuning the engine.
    pub document_type: OcrDocumentType,

    /// Drop coloured background before recognition.
    pub colour_dropout: bool,

    /// Run binarisation and cleanup before recognition.
    pub advanced_image_processing: bool,

    /// Classify words as numbers, upper case, lower case.
    pub word_processing: bool,

    /// Also recognize the image rotated by 180 degrees.
    pub detect_flipped_text: bool,

    /// Use char position in line to fix letter case.
    pub case_post_processing: bool,

    /// Remove short and punctuation-heavy lines.
    pub noise_post_processing: bool,

    /// Penalise chars whose aspect ratio differs from the font.
    pub ratio_post_processing: bool,

    /// Remove chars cut off by the image border.
    pub cutoff_char_filter: bool,

    /// Group chars into lines.
    pub line_grouping: bool,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            whitelist: None,
            max_char_variants: 0,
            min_line_height: 10,
            max_line_height: 200,
            min_char_height: 10,
            max_chars_expected: None,
            document_type: OcrDocumentType::Generic,
            colour_dropout: true,
            advanced_image_processing: true,
            word_processing: false,
            detect_flipped_text: false,
            case_post_processing: false,
            noise_post_processing: false,
            ratio_post_processing: false,
            cutoff_char_filter: false,
            line_grouping: true,
        }
    }
}

impl OcrOptions {
    pub fn with_whitelist(mut self, whitelist: Whitelist) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    pub fn with_min_char_height(mut self, height: u32) -> Self {
        self.min_char_height = height;
        self
    }

    pub fn with_colour_dropout(mut self, enabled: bool) -> Self {
        self.colour_dropout = enabled;
        self
    }

    /// Merge the options of every parser sharing one OCR pass.
    ///
    /// The result never rejects text any single input would accept:
    /// whitelists are unioned, lower limits take the minimum and upper limits
    /// the maximum. Post-processors that drop or rewrite characters stay on
    /// only if every input enables them; detection aids are on if any input
    /// enables them. The document type of the first input wins.
    ///
    /// Returns `None` for an empty input.
    pub fn merged<'a, I>(options: I) -> Option<OcrOptions>
    where
        I: IntoIterator<Item = &'a OcrOptions>,
    {
        let mut iter = options.into_iter();
        let mut merged = iter.next()?.clone();

        for next in iter {
            merged.whitelist = match (&merged.whitelist, &next.whitelist) {
                (Some(a), Some(b)) => Some(a.union(b)),
                _ => None,
            };

            merged.max_char_variants = merged.max_char_variants.max(next.max_char_variants);
            merged.min_line_height = merged.min_line_height.min(next.min_line_height);
            merged.max_line_height = merged.max_line_height.max(next.max_line_height);
            merged.min_char_height = merged.min_char_height.min(next.min_char_height);
            merged.max_chars_expected = match (merged.max_chars_expected, next.max_chars_expected) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            };

            if merged.document_type != next.document_type {
                warn!(
                    "Conflicting OCR document types {:?} and {:?} in one parser group, keeping {:?}",
                    merged.document_type, next.document_type, merged.document_type
                );
            }

            merged.colour_dropout &= next.colour_dropout;
            merged.word_processing &= next.word_processing;
            merged.case_post_processing &= next.case_post_processing;
            merged.noise_post_processing &= next.noise_post_processing;
            merged.ratio_post_processing &= next.ratio_post_processing;
            merged.cutoff_char_filter &= next.cutoff_char_filter;

            merged.advanced_image_processing |= next.advanced_image_processing;
            merged.detect_flipped_text |= next.detect_flipped_text;
            merged.line_grouping |= next.line_grouping;
        }

        Some(merged)
    }
}
