//! Document classification.
//!
//! A [`Classifier`] looks at the preliminary result of a document, either
//! the machine readable zone or the parse results of the classification
//! regions, and names the document class whose regions are extracted next.

mod mrtd;
mod rules;

pub use mrtd::{MrtdDocumentType, MrtdResult, MrzField};
pub use rules::{ClassifierRule, GroupClass};

use serde::{Deserialize, Serialize};

use crate::result::TemplatingResult;

/// What a classifier gets to see.
#[derive(Debug, Clone, Copy)]
pub enum PreliminaryResult<'a> {
    /// A successfully read machine readable zone.
    Mrtd(&'a MrtdResult),
    /// Parse results of the classification regions.
    Templating(&'a TemplatingResult),
}

impl<'a> PreliminaryResult<'a> {
    pub fn is_mrtd(&self) -> bool {
        matches!(self, PreliminaryResult::Mrtd(_))
    }

    pub fn as_mrtd(&self) -> Option<&'a MrtdResult> {
        match self {
            PreliminaryResult::Mrtd(mrtd) => Some(mrtd),
            PreliminaryResult::Templating(_) => None,
        }
    }

    pub fn as_templating(&self) -> Option<&'a TemplatingResult> {
        match self {
            PreliminaryResult::Templating(result) => Some(result),
            PreliminaryResult::Mrtd(_) => None,
        }
    }
}

/// Picks the document class from a preliminary result.
///
/// Returning `None` or an empty name marks the document unclassifiable.
pub trait Classifier: Send + Sync {
    fn classify(&self, preliminary: &PreliminaryResult<'_>) -> Option<String>;
}

impl<F> Classifier for F
where
    F: Fn(&PreliminaryResult<'_>) -> Option<String> + Send + Sync,
{
    fn classify(&self, preliminary: &PreliminaryResult<'_>) -> Option<String> {
        self(preliminary)
    }
}

/// Classification state of one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "class", rename_all = "snake_case")]
pub enum Classification {
    /// No classifier ran.
    #[default]
    Unclassified,
    Classified(String),
    /// The classifier ran and gave no class.
    Unclassifiable,
}

impl Classification {
    pub fn from_outcome(outcome: Option<String>) -> Self {
        match outcome {
            Some(name) if !name.is_empty() => Classification::Classified(name),
            _ => Classification::Unclassifiable,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Classification::Classified(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        matches!(self, Classification::Classified(_))
    }
}
