//! Core library for template-driven document field extraction.
//!
//! This crate provides:
//! - Region catalogs: named rectangles per document class
//! - Parser registries: regex, date, raw and IBAN parsers grouped per region
//! - Classification of documents from a machine readable zone or from
//!   dedicated classification regions
//! - The templating engine running OCR and parsers per region, with a
//!   temporal sieve for video
//!
//! Character recognition itself is external and plugged in through
//! [`OcrEngine`].

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod input;
pub mod ocr;
pub mod parsers;
pub mod result;
pub mod template;

pub use classify::{Classification, Classifier, ClassifierRule, MrtdResult, PreliminaryResult};
pub use config::TemplexConfig;
pub use engine::{TemplatingEngine, VideoSession};
pub use error::{ConfigError, ErrorStatus, OcrError, Result, TemplexError};
pub use geometry::{DocumentFrame, Rect};
pub use input::{DocumentImage, PixelFormat, RawImage};
pub use ocr::{OcrEngine, OcrOptions, OcrResult, ReplayOcrEngine};
pub use parsers::{ParsedDate, ParsedValue};
pub use result::{ParserOutcome, TemplatingResult};
pub use template::{
    DecodingRegion, ParserSpec, TemplateFile, TemplatingSettings, DEFAULT_CLASS, DEFAULT_GROUP,
};
