//! Date parsing over configurable formats and separators.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::template::{DateFormat, DateParserSettings, DatePart};

use super::FieldParser;

/// A date read from text.
///
/// Parts that could not be read stay at -1. `original` holds the matched
/// text even when the values do not form a valid calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDate {
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub successfully_parsed: bool,
    pub original: String,
}

impl Default for ParsedDate {
    fn default() -> Self {
        Self {
            day: -1,
            month: -1,
            year: -1,
            successfully_parsed: false,
            original: String::new(),
        }
    }
}

impl ParsedDate {
    pub fn from_naive(date: NaiveDate, original: impl Into<String>) -> Self {
        Self {
            day: date.day() as i32,
            month: date.month() as i32,
            year: date.year(),
            successfully_parsed: true,
            original: original.into(),
        }
    }

    pub fn to_naive(&self) -> Option<NaiveDate> {
        if !self.successfully_parsed {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month.try_into().ok()?, self.day.try_into().ok()?)
    }
}

/// Tries every configured format and keeps the earliest valid date.
#[derive(Debug, Clone)]
pub struct DateParser {
    patterns: Vec<(DateFormat, Regex)>,
}

impl DateParser {
    pub fn new(settings: &DateParserSettings) -> Self {
        let separators: String = settings
            .separators()
            .iter()
            .map(|c| regex::escape(&c.to_string()))
            .collect();

        let patterns = settings
            .formats()
            .iter()
            .filter_map(|&format| {
                let pattern = format_pattern(format, &separators);
                match Regex::new(&pattern) {
                    Ok(regex) => Some((format, regex)),
                    Err(e) => {
                        warn!("Skipping date format {:?}: {}", format, e);
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    /// Parse the first date in the text.
    ///
    /// A valid date anywhere wins over a text that only looks like a date.
    /// Among valid dates the earliest one wins, ties going to the format
    /// listed first. Without any date-shaped text the default value is
    /// returned.
    pub fn parse_date(&self, text: &str) -> ParsedDate {
        let mut candidates: Vec<(usize, usize, ParsedDate)> = Vec::new();

        for (index, (format, regex)) in self.patterns.iter().enumerate() {
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let parts = [&caps[1], &caps[2], &caps[3]];
                candidates.push((whole.start(), index, read_date(*format, parts, whole.as_str())));
            }
        }

        candidates.sort_by_key(|(start, index, _)| (*start, *index));

        let first_shape = candidates.first().map(|(_, _, date)| date.original.clone());
        candidates
            .into_iter()
            .map(|(_, _, date)| date)
            .find(|date| date.successfully_parsed)
            .unwrap_or_else(|| ParsedDate {
                original: first_shape.unwrap_or_default(),
                ..ParsedDate::default()
            })
    }
}

impl FieldParser for DateParser {
    type Output = ParsedDate;

    fn parse(&self, text: &str) -> Option<ParsedDate> {
        let date = self.parse_date(text);
        (!date.original.is_empty()).then_some(date)
    }
}

fn format_pattern(format: DateFormat, separators: &str) -> String {
    let numeric_separator = format!(r"\s*[{separators}]\s*");
    let textual_separator = format!(r"(?:\s*[{separators},]\s*|\s+)");
    let separator = if format.has_month_name() {
        textual_separator
    } else {
        numeric_separator
    };

    let parts: Vec<&str> = format
        .parts()
        .iter()
        .map(|part| match part {
            DatePart::Day => r"(\d{1,2})",
            DatePart::Month if format.has_month_name() => r"([A-Za-z]{3,9})\.?",
            DatePart::Month => r"(\d{1,2})",
            DatePart::Year if format.has_full_year() => r"(\d{4})",
            DatePart::Year => r"(\d{2})",
        })
        .collect();

    format!(r"\b{}\b", parts.join(&separator))
}

fn read_date(format: DateFormat, values: [&str; 3], original: &str) -> ParsedDate {
    let mut day = None;
    let mut month = None;
    let mut year = None;

    for (part, value) in format.parts().iter().zip(values) {
        match part {
            DatePart::Day => day = value.parse::<u32>().ok(),
            DatePart::Month if format.has_month_name() => month = month_from_name(value),
            DatePart::Month => month = value.parse::<u32>().ok(),
            DatePart::Year => year = value.parse::<i32>().ok().map(|y| parse_year(y, value.len())),
        }
    }

    let date = match (year, month, day) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d),
        _ => None,
    };

    match date {
        Some(date) => ParsedDate::from_naive(date, original),
        None => ParsedDate {
            original: original.to_string(),
            ..ParsedDate::default()
        },
    }
}

/// Expand two-digit years: 00-50 are 2000-2050, 51-99 are 1951-1999.
fn parse_year(year: i32, digits: usize) -> i32 {
    if digits > 2 {
        year
    } else if year <= 50 {
        2000 + year
    } else {
        1900 + year
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}
