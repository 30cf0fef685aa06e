//! Queryable outcome of templating one document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::ocr::OcrResult;
use crate::parsers::{ParsedDate, ParsedValue};
use crate::template::DEFAULT_GROUP;

/// Outcome of one parser, keyed by parser and group name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParserOutcome<'a> {
    /// No parser of this name ran in this group.
    NotConfigured,
    /// The parser ran and found nothing.
    NoMatch,
    Matched(&'a ParsedValue),
}

impl<'a> ParserOutcome<'a> {
    pub fn value(&self) -> Option<&'a ParsedValue> {
        match self {
            ParserOutcome::Matched(value) => Some(value),
            _ => None,
        }
    }
}

/// Parse results, OCR trees and classification of one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplatingResult {
    classification: Classification,
    /// group -> parser -> value, `None` when the parser found nothing.
    #[serde(default)]
    values: BTreeMap<String, BTreeMap<String, Option<ParsedValue>>>,
    /// group -> OCR tree of the group's region.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    ocr: BTreeMap<String, OcrResult>,
}

impl TemplatingResult {
    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Name of the class the document was classified as.
    pub fn class_name(&self) -> Option<&str> {
        self.classification.class_name()
    }

    pub fn outcome(&self, parser: &str, group: &str) -> ParserOutcome<'_> {
        match self.values.get(group).and_then(|parsers| parsers.get(parser)) {
            None => ParserOutcome::NotConfigured,
            Some(None) => ParserOutcome::NoMatch,
            Some(Some(value)) => ParserOutcome::Matched(value),
        }
    }

    pub fn parsed_value(&self, parser: &str, group: &str) -> Option<&ParsedValue> {
        self.outcome(parser, group).value()
    }

    /// Parsed text; for date parsers the text the date was read from.
    pub fn parsed_string(&self, parser: &str, group: &str) -> Option<&str> {
        self.parsed_value(parser, group).map(ParsedValue::as_str)
    }

    pub fn parsed_date(&self, parser: &str, group: &str) -> Option<&ParsedDate> {
        self.parsed_value(parser, group).and_then(ParsedValue::as_date)
    }

    /// Copy of the OCR tree a group's parsers ran on.
    pub fn ocr_result(&self, group: &str) -> Option<OcrResult> {
        self.ocr.get(group).cloned()
    }

    pub fn ocr_result_ref(&self, group: &str) -> Option<&OcrResult> {
        self.ocr.get(group)
    }

    pub fn parsed_string_in_default_group(&self, parser: &str) -> Option<&str> {
        self.parsed_string(parser, DEFAULT_GROUP)
    }

    pub fn parsed_date_in_default_group(&self, parser: &str) -> Option<&ParsedDate> {
        self.parsed_date(parser, DEFAULT_GROUP)
    }

    pub fn ocr_result_of_default_group(&self) -> Option<OcrResult> {
        self.ocr_result(DEFAULT_GROUP)
    }

    /// Every recorded `(group, parser, value)` in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, Option<&ParsedValue>)> {
        self.values.iter().flat_map(|(group, parsers)| {
            parsers
                .iter()
                .map(move |(parser, value)| (group.as_str(), parser.as_str(), value.as_ref()))
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of parsers that produced a value.
    pub fn matched_count(&self) -> usize {
        self.entries().filter(|(_, _, value)| value.is_some()).count()
    }

    /// Copy without OCR trees.
    pub fn without_ocr(&self) -> Self {
        Self {
            classification: self.classification.clone(),
            values: self.values.clone(),
            ocr: BTreeMap::new(),
        }
    }

    pub(crate) fn record(&mut self, group: &str, parser: &str, value: Option<ParsedValue>) {
        self.values
            .entry(group.to_string())
            .or_default()
            .insert(parser.to_string(), value);
    }

    pub(crate) fn set_ocr(&mut self, group: &str, ocr: OcrResult) {
        self.ocr.insert(group.to_string(), ocr);
    }

    pub(crate) fn set_classification(&mut self, classification: Classification) {
        self.classification = classification;
    }

    pub(crate) fn value_mut(&mut self, group: &str, parser: &str) -> Option<&mut ParsedValue> {
        self.values.get_mut(group)?.get_mut(parser)?.as_mut()
    }
}
