//! Parser execution over OCR output.
//!
//! Every [`ParserSpec`] compiles into a [`CompiledParser`] once, when the
//! engine is built. Parsing then only reads the text of a region's OCR tree.

pub mod date;
pub mod iban;
pub mod pattern;
pub mod sieve;

pub use date::{DateParser, ParsedDate};
pub use iban::{validate_iban, IbanParser};
pub use pattern::RegexParser;
pub use sieve::Sieve;

use serde::{Deserialize, Serialize};

use crate::template::{ParserKind, ParserSpec};

/// A parser over the plain text of an OCR result.
pub trait FieldParser {
    /// The type of value this parser produces.
    type Output;

    /// Return the first value found in the text.
    fn parse(&self, text: &str) -> Option<Self::Output>;
}

/// Value extracted by a parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParsedValue {
    Text(String),
    Date(ParsedDate),
}

impl ParsedValue {
    /// Text form: the string itself, or the source text of a date.
    pub fn as_str(&self) -> &str {
        match self {
            ParsedValue::Text(text) => text,
            ParsedValue::Date(date) => &date.original,
        }
    }

    pub fn as_date(&self) -> Option<&ParsedDate> {
        match self {
            ParsedValue::Date(date) => Some(date),
            ParsedValue::Text(_) => None,
        }
    }
}

/// A parser ready to run.
#[derive(Debug, Clone)]
pub enum CompiledParser {
    Regex(RegexParser),
    Date(DateParser),
    Raw,
    Iban(IbanParser),
}

impl CompiledParser {
    /// Compile a specification. An invalid regex is logged and yields a
    /// parser that never matches.
    pub fn compile(spec: &ParserSpec) -> Self {
        match &spec.kind {
            ParserKind::Regex(settings) => {
                CompiledParser::Regex(RegexParser::compile_lenient(&spec.name, settings))
            }
            ParserKind::Date(settings) => CompiledParser::Date(DateParser::new(settings)),
            ParserKind::Raw(_) => CompiledParser::Raw,
            ParserKind::Iban(settings) => CompiledParser::Iban(IbanParser::new(settings)),
        }
    }

    pub fn parse(&self, text: &str) -> Option<ParsedValue> {
        match self {
            CompiledParser::Regex(parser) => parser.parse(text).map(ParsedValue::Text),
            CompiledParser::Date(parser) => parser.parse(text).map(ParsedValue::Date),
            CompiledParser::Raw => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| ParsedValue::Text(trimmed.to_string()))
            }
            CompiledParser::Iban(parser) => parser.parse(text).map(ParsedValue::Text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{
        DateParserSettings, IbanParserSettings, RawParserSettings, RegexParserSettings,
    };

    #[test]
    fn test_dispatch() {
        let raw = CompiledParser::compile(&ParserSpec::raw("raw", RawParserSettings::default()));
        assert_eq!(
            raw.parse("  PU ZAGREB \n"),
            Some(ParsedValue::Text("PU ZAGREB".to_string()))
        );
        assert_eq!(raw.parse("  \n "), None);

        let date = CompiledParser::compile(&ParserSpec::date("d", DateParserSettings::new()));
        let value = date.parse("18.04.2017").unwrap();
        assert_eq!(value.as_str(), "18.04.2017");
        assert_eq!(value.as_date().unwrap().day, 18);

        assert_eq!(date.parse("no date here"), None);

        let iban = CompiledParser::compile(&ParserSpec::iban(
            "iban",
            IbanParserSettings::for_countries(&["HR"]),
        ));
        assert_eq!(
            iban.parse("Racun: HR12 1001 0051 8630 0016 0"),
            Some(ParsedValue::Text("HR1210010051863000160".to_string()))
        );
        assert_eq!(iban.parse("GB82 WEST 1234 5698 7654 32"), None);
    }

    #[test]
    fn test_invalid_regex_never_matches() {
        let parser = CompiledParser::compile(&ParserSpec::regex(
            "broken",
            RegexParserSettings::new("([A-Z"),
        ));
        assert_eq!(parser.parse("ABC"), None);
    }
}
