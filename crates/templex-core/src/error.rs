//! Error types for the templex-core library.

use std::fmt;

use thiserror::Error;

/// Main error type for the templex library.
#[derive(Error, Debug)]
pub enum TemplexError {
    /// Templating configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// OCR adapter error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image decoding or conversion error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings or recording (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while building templating settings.
///
/// None of these leave the settings half-modified: an operation either
/// applies completely or reports one of these and changes nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Empty name, empty region list and similar bad input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Region geometry outside the relative unit square or zero dewarp height.
    #[error("invalid region {name}: {reason}")]
    InvalidRegion { name: String, reason: String },

    /// No regions are configured for the class.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// No parsers are configured for the group.
    #[error("unknown parser group: {0}")]
    UnknownGroup(String),

    /// The group exists but holds no parser with this name.
    #[error("unknown parser {parser} in group {group}")]
    UnknownParser { parser: String, group: String },
}

impl ConfigError {
    /// Status code reported for this error.
    pub fn status(&self) -> ErrorStatus {
        match self {
            ConfigError::InvalidArgument(_) | ConfigError::InvalidRegion { .. } => {
                ErrorStatus::InvalidArgument
            }
            ConfigError::UnknownClass(_)
            | ConfigError::UnknownGroup(_)
            | ConfigError::UnknownParser { .. } => ErrorStatus::UnknownKey,
        }
    }
}

/// Errors related to dewarping and recognizing a region.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    /// The region could not be cut out of the document image.
    #[error("dewarp failed: {0}")]
    Dewarp(String),

    /// The OCR engine failed on the region image.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Coarse status code for configuration calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    /// Operation was successfully completed.
    Success,
    /// Operation failed.
    Fail,
    /// Unknown key was used for the operation.
    UnknownKey,
    /// Invalid argument was given to the operation.
    InvalidArgument,
    /// Index is out of range.
    IndexOutOfRange,
}

impl ErrorStatus {
    /// Status of a finished configuration call.
    pub fn of<T>(result: &std::result::Result<T, ConfigError>) -> Self {
        match result {
            Ok(_) => ErrorStatus::Success,
            Err(e) => e.status(),
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorStatus::Success => "success",
            ErrorStatus::Fail => "operation failed",
            ErrorStatus::UnknownKey => "unknown key",
            ErrorStatus::InvalidArgument => "invalid argument",
            ErrorStatus::IndexOutOfRange => "index out of range",
        };
        f.write_str(text)
    }
}

/// Result type for the templex library.
pub type Result<T> = std::result::Result<T, TemplexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ConfigError::UnknownClass("old".into()).status(),
            ErrorStatus::UnknownKey
        );
        assert_eq!(
            ConfigError::InvalidArgument("empty".into()).status(),
            ErrorStatus::InvalidArgument
        );

        let ok: std::result::Result<(), ConfigError> = Ok(());
        assert_eq!(ErrorStatus::of(&ok), ErrorStatus::Success);
        assert_eq!(ErrorStatus::UnknownKey.to_string(), "unknown key");
    }
}
