//! Regular expression parser with whitespace boundary rules.

use regex::Regex;
use tracing::warn;

use crate::template::RegexParserSettings;

use super::FieldParser;

/// Returns the first match of a pattern, optionally requiring whitespace
/// (or the text edge) right before and after it.
///
/// The boundary whitespace is never part of the returned value. Groups
/// inside the pattern, named or not, do not change what is returned.
#[derive(Debug, Clone)]
pub struct RegexParser {
    regex: Option<Regex>,
}

impl RegexParser {
    pub fn new(settings: &RegexParserSettings) -> Result<Self, regex::Error> {
        let prefix = if settings.must_start_with_whitespace {
            r"(?:\A|\s)"
        } else {
            ""
        };
        let suffix = if settings.must_end_with_whitespace {
            r"(?:\s|\z)"
        } else {
            ""
        };

        // Group 1 is always the whole user pattern; the prefix does not capture.
        let pattern = format!("{prefix}({}){suffix}", settings.pattern);
        Ok(Self {
            regex: Some(Regex::new(&pattern)?),
        })
    }

    /// Like [`RegexParser::new`], but an invalid pattern is logged and the
    /// parser never matches.
    pub fn compile_lenient(name: &str, settings: &RegexParserSettings) -> Self {
        Self::new(settings).unwrap_or_else(|e| {
            warn!("Parser {} has an invalid pattern and will never match: {}", name, e);
            Self { regex: None }
        })
    }

    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }
}

impl FieldParser for RegexParser {
    type Output = String;

    fn parse(&self, text: &str) -> Option<String> {
        let caps = self.regex.as_ref()?.captures(text)?;
        caps.get(1).map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(pattern: &str, start: bool, end: bool) -> RegexParser {
        let mut settings = RegexParserSettings::new(pattern);
        settings.must_start_with_whitespace = start;
        settings.must_end_with_whitespace = end;
        RegexParser::new(&settings).unwrap()
    }

    #[test]
    fn test_start_boundary_rejects_glued_match() {
        let parser = parser(r"\d{9}", true, false);
        assert_eq!(parser.parse("A123456789"), None);
        assert_eq!(parser.parse("A 123456789"), Some("123456789".to_string()));
        assert_eq!(parser.parse("123456789"), Some("123456789".to_string()));
    }

    #[test]
    fn test_end_boundary() {
        let parser = parser(r"\d{9}", true, true);
        assert_eq!(parser.parse("1234567890"), None);
        assert_eq!(parser.parse("BROJ 123456789\nX"), Some("123456789".to_string()));
        assert_eq!(parser.parse("12 123456789 9"), Some("123456789".to_string()));
    }

    #[test]
    fn test_no_boundaries() {
        let parser = parser("[MŽ]/[MF]", false, false);
        assert_eq!(parser.parse("SPOLŽ/FHRV"), Some("Ž/F".to_string()));
    }

    #[test]
    fn test_multiline_pattern() {
        let parser = parser(r"([A-ZŠĐŽČĆ]+,? ?)+\n([A-ZŠĐŽČĆ]+ ?)+\d+", false, false);
        assert_eq!(
            parser.parse("ZAGREB, GRAD ZAGREB\nILICA 12"),
            Some("ZAGREB, GRAD ZAGREB\nILICA 12".to_string())
        );
    }

    #[test]
    fn test_user_groups_do_not_change_value() {
        let parser = parser(r"No\. (?P<value>\d+)", false, false);
        assert_eq!(parser.parse("No. 42"), Some("No. 42".to_string()));

        let parser = self::parser(r"(\d{2})/(\d{2})", true, true);
        assert_eq!(parser.parse("od 04/17 do"), Some("04/17".to_string()));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(RegexParser::new(&RegexParserSettings::new("(")).is_err());
        let lenient = RegexParser::compile_lenient("broken", &RegexParserSettings::new("("));
        assert!(!lenient.is_valid());
        assert_eq!(lenient.parse("("), None);
    }
}
