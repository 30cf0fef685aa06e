//! Declarative parser specifications.

use serde::{Deserialize, Serialize};

use crate::ocr::{charsets, OcrFont, OcrOptions, Whitelist};

/// A named parser and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ParserKind,
}

/// The parser strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParserKind {
    Regex(RegexParserSettings),
    Date(DateParserSettings),
    Raw(RawParserSettings),
    Iban(IbanParserSettings),
}

impl ParserSpec {
    pub fn new(name: impl Into<String>, kind: ParserKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn regex(name: impl Into<String>, settings: RegexParserSettings) -> Self {
        Self::new(name, ParserKind::Regex(settings))
    }

    pub fn date(name: impl Into<String>, settings: DateParserSettings) -> Self {
        Self::new(name, ParserKind::Date(settings))
    }

    pub fn raw(name: impl Into<String>, settings: RawParserSettings) -> Self {
        Self::new(name, ParserKind::Raw(settings))
    }

    pub fn iban(name: impl Into<String>, settings: IbanParserSettings) -> Self {
        Self::new(name, ParserKind::Iban(settings))
    }

    /// OCR options this parser needs from its group's OCR pass.
    ///
    /// Date and IBAN parsers carry no options of their own and ask for
    /// the characters their values are written with.
    pub fn ocr_options(&self) -> OcrOptions {
        match &self.kind {
            ParserKind::Regex(settings) => settings.ocr.clone(),
            ParserKind::Raw(settings) => settings.ocr.clone(),
            ParserKind::Date(settings) => {
                let mut whitelist = charsets::digits();
                for &separator in settings.separators() {
                    whitelist.insert(separator, OcrFont::Any);
                }
                if settings.formats().iter().any(|f| f.has_month_name()) {
                    whitelist = whitelist.union(&Whitelist::from_chars(
                        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz ",
                    ));
                }
                OcrOptions::default().with_whitelist(whitelist)
            }
            ParserKind::Iban(_) => OcrOptions::default().with_whitelist(
                charsets::uppercase_latin().with_chars(charsets::DIGITS).with_chars(" "),
            ),
        }
    }

    /// Whether results of this parser are combined across video frames.
    pub fn uses_sieve(&self) -> bool {
        match &self.kind {
            ParserKind::Regex(settings) => settings.use_sieve,
            ParserKind::Raw(settings) => settings.use_sieve,
            ParserKind::Date(_) | ParserKind::Iban(_) => false,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ParserKind::Regex(_) => "regex",
            ParserKind::Date(_) => "date",
            ParserKind::Raw(_) => "raw",
            ParserKind::Iban(_) => "iban",
        }
    }
}

/// Parser returning the first match of a regular expression.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexParserSettings {
    pub pattern: String,
    pub ocr: OcrOptions,
    pub use_sieve: bool,
    /// The match must be preceded by whitespace or the start of the text.
    pub must_start_with_whitespace: bool,
    /// The match must be followed by whitespace or the end of the text.
    pub must_end_with_whitespace: bool,
}

impl RegexParserSettings {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn with_ocr(mut self, ocr: OcrOptions) -> Self {
        self.ocr = ocr;
        self
    }

    pub fn with_whitelist(mut self, whitelist: Whitelist) -> Self {
        self.ocr.whitelist = Some(whitelist);
        self
    }

    pub fn with_sieve(mut self, enabled: bool) -> Self {
        self.use_sieve = enabled;
        self
    }

    pub fn surrounded_by_whitespace(mut self) -> Self {
        self.must_start_with_whitespace = true;
        self.must_end_with_whitespace = true;
        self
    }
}

/// Layouts the date parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateFormat {
    /// 18.04.2017
    Ddmmyyyy,
    /// 18.04.17
    Ddmmyy,
    /// 04.18.2017
    Mmddyyyy,
    /// 04.18.17
    Mmddyy,
    /// 2017.04.18
    Yyyymmdd,
    /// 17.04.18
    Yymmdd,
    /// 18 April 2017
    Ddmonthyyyy,
    /// 18 April 17
    Ddmonthyy,
    /// April 18 2017
    Monthddyyyy,
    /// April 18 17
    Monthddyy,
    /// 2017 April 18
    Yyyymonthdd,
    /// 17 April 18
    Yymonthdd,
}

/// Order of the date parts in a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Day,
    Month,
    Year,
}

impl DateFormat {
    pub const ALL: [DateFormat; 12] = [
        DateFormat::Ddmmyyyy,
        DateFormat::Ddmmyy,
        DateFormat::Mmddyyyy,
        DateFormat::Mmddyy,
        DateFormat::Yyyymmdd,
        DateFormat::Yymmdd,
        DateFormat::Ddmonthyyyy,
        DateFormat::Ddmonthyy,
        DateFormat::Monthddyyyy,
        DateFormat::Monthddyy,
        DateFormat::Yyyymonthdd,
        DateFormat::Yymonthdd,
    ];

    /// Formats used when none are configured: every numeric-month format.
    pub const DEFAULTS: [DateFormat; 6] = [
        DateFormat::Ddmmyyyy,
        DateFormat::Ddmmyy,
        DateFormat::Mmddyyyy,
        DateFormat::Mmddyy,
        DateFormat::Yyyymmdd,
        DateFormat::Yymmdd,
    ];

    pub fn has_month_name(&self) -> bool {
        !Self::DEFAULTS.contains(self)
    }

    pub fn has_full_year(&self) -> bool {
        matches!(
            self,
            DateFormat::Ddmmyyyy
                | DateFormat::Mmddyyyy
                | DateFormat::Yyyymmdd
                | DateFormat::Ddmonthyyyy
                | DateFormat::Monthddyyyy
                | DateFormat::Yyyymonthdd
        )
    }

    pub fn parts(&self) -> [DatePart; 3] {
        use DatePart::*;
        match self {
            DateFormat::Ddmmyyyy | DateFormat::Ddmmyy => [Day, Month, Year],
            DateFormat::Ddmonthyyyy | DateFormat::Ddmonthyy => [Day, Month, Year],
            DateFormat::Mmddyyyy | DateFormat::Mmddyy => [Month, Day, Year],
            DateFormat::Monthddyyyy | DateFormat::Monthddyy => [Month, Day, Year],
            DateFormat::Yyyymmdd | DateFormat::Yymmdd => [Year, Month, Day],
            DateFormat::Yyyymonthdd | DateFormat::Yymonthdd => [Year, Month, Day],
        }
    }
}

/// Default separators between date parts.
pub const DEFAULT_DATE_SEPARATORS: [char; 3] = ['.', '/', '-'];

/// Parser extracting a day, month and year.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateParserSettings {
    /// Allowed formats; empty selects [`DateFormat::DEFAULTS`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<DateFormat>,
    /// Allowed separators; empty selects [`DEFAULT_DATE_SEPARATORS`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub separators: Vec<char>,
}

impl DateParserSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats(mut self, formats: &[DateFormat]) -> Self {
        self.formats = formats.to_vec();
        self
    }

    pub fn with_separators(mut self, separators: &[char]) -> Self {
        self.separators = separators.to_vec();
        self
    }

    /// Formats in effect.
    pub fn formats(&self) -> &[DateFormat] {
        if self.formats.is_empty() {
            &DateFormat::DEFAULTS
        } else {
            &self.formats
        }
    }

    /// Separators in effect.
    pub fn separators(&self) -> &[char] {
        if self.separators.is_empty() {
            &DEFAULT_DATE_SEPARATORS
        } else {
            &self.separators
        }
    }
}

/// Parser returning the OCR text of the region unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawParserSettings {
    pub ocr: OcrOptions,
    pub use_sieve: bool,
}

/// Parser extracting a check-digit verified IBAN.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IbanParserSettings {
    /// Allowed country codes; empty allows every country.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub country_whitelist: Vec<String>,
}

impl IbanParserSettings {
    pub fn for_countries<S: AsRef<str>>(countries: &[S]) -> Self {
        Self {
            country_whitelist: countries
                .iter()
                .map(|c| c.as_ref().to_ascii_uppercase())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_spec_json_shape() {
        let spec = ParserSpec::regex(
            "Gender",
            RegexParserSettings::new("[MŽ]/[MF]")
                .with_whitelist(charsets::chars("MF/Ž"))
                .surrounded_by_whitespace(),
        );

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["name"], "Gender");
        assert_eq!(json["type"], "regex");
        assert_eq!(json["pattern"], "[MŽ]/[MF]");

        let back: ParserSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_minimal_json() {
        let spec: ParserSpec =
            serde_json::from_str(r#"{"name":"DateOfIssue","type":"date"}"#).unwrap();
        let ParserKind::Date(settings) = &spec.kind else {
            panic!("expected date parser");
        };
        assert_eq!(settings.formats(), &DateFormat::DEFAULTS);
        assert_eq!(settings.separators(), &['.', '/', '-']);
    }

    #[test]
    fn test_date_whitelist() {
        let numeric = ParserSpec::date("d", DateParserSettings::new());
        let whitelist = numeric.ocr_options().whitelist.unwrap();
        assert!(whitelist.contains('7'));
        assert!(whitelist.contains('/'));
        assert!(!whitelist.contains('A'));

        let textual = ParserSpec::date(
            "d",
            DateParserSettings::new().with_formats(&[DateFormat::Ddmonthyyyy]),
        );
        assert!(textual.ocr_options().whitelist.unwrap().contains('p'));
    }

    #[test]
    fn test_default_formats_are_numeric() {
        assert!(DateFormat::DEFAULTS.iter().all(|f| !f.has_month_name()));
        assert_eq!(
            DateFormat::ALL.iter().filter(|f| f.has_month_name()).count(),
            6
        );
    }
}
