//! IBAN (International Bank Account Number) extraction and validation.

use lazy_static::lazy_static;
use regex::Regex;

use crate::template::IbanParserSettings;

use super::FieldParser;

lazy_static! {
    /// Country code followed by two check digits.
    static ref IBAN_START: Regex = Regex::new(r"\b[A-Z]{2}[0-9]{2}").unwrap();
}

const MIN_IBAN_LENGTH: usize = 15;
const MAX_IBAN_LENGTH: usize = 34;

/// IBAN length per country code.
const COUNTRY_LENGTHS: &[(&str, usize)] = &[
    ("AD", 24), ("AE", 23), ("AL", 28), ("AT", 20), ("AZ", 28), ("BA", 20),
    ("BE", 16), ("BG", 22), ("BH", 22), ("BR", 29), ("CH", 21), ("CR", 22),
    ("CY", 28), ("CZ", 24), ("DE", 22), ("DK", 18), ("DO", 28), ("EE", 20),
    ("ES", 24), ("FI", 18), ("FO", 18), ("FR", 27), ("GB", 22), ("GE", 22),
    ("GI", 23), ("GL", 18), ("GR", 27), ("GT", 28), ("HR", 21), ("HU", 28),
    ("IE", 22), ("IL", 23), ("IS", 26), ("IT", 27), ("JO", 30), ("KW", 30),
    ("KZ", 20), ("LB", 28), ("LI", 21), ("LT", 20), ("LU", 20), ("LV", 21),
    ("MC", 27), ("MD", 24), ("ME", 22), ("MK", 19), ("MR", 27), ("MT", 31),
    ("MU", 30), ("NL", 18), ("NO", 15), ("PK", 24), ("PL", 28), ("PS", 29),
    ("PT", 25), ("QA", 29), ("RO", 24), ("RS", 22), ("SA", 24), ("SE", 24),
    ("SI", 19), ("SK", 24), ("SM", 27), ("TN", 24), ("TR", 26), ("UA", 29),
    ("VG", 24), ("XK", 20),
];

/// Registered IBAN length of a country, if known.
pub fn country_length(country: &str) -> Option<usize> {
    COUNTRY_LENGTHS
        .iter()
        .find(|(code, _)| *code == country)
        .map(|(_, length)| *length)
}

/// Finds the first valid IBAN, written compact or in groups separated by
/// spaces or tabs. An IBAN never continues on the next line. The result is
/// compact and upper case.
#[derive(Debug, Clone, Default)]
pub struct IbanParser {
    countries: Vec<String>,
}

impl IbanParser {
    pub fn new(settings: &IbanParserSettings) -> Self {
        Self {
            countries: settings
                .country_whitelist
                .iter()
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        }
    }

    fn allows(&self, country: &str) -> bool {
        self.countries.is_empty() || self.countries.iter().any(|c| c == country)
    }
}

impl FieldParser for IbanParser {
    type Output = String;

    fn parse(&self, text: &str) -> Option<String> {
        let upper = text.to_uppercase();

        for start in IBAN_START.find_iter(&upper) {
            let country = &upper[start.start()..start.start() + 2];
            if !self.allows(country) {
                continue;
            }

            // Each char with whether whitespace separated it from the previous one.
            let mut chars: Vec<(char, bool)> = Vec::with_capacity(MAX_IBAN_LENGTH + 1);
            let mut spaced = false;
            for c in upper[start.start()..].chars() {
                if c.is_ascii_alphanumeric() {
                    chars.push((c, spaced));
                    spaced = false;
                    if chars.len() > MAX_IBAN_LENGTH {
                        break;
                    }
                } else if c.is_whitespace() && c != '\n' {
                    spaced = true;
                } else {
                    break;
                }
            }

            let lengths: Vec<usize> = match country_length(country) {
                Some(length) => vec![length],
                None => (MIN_IBAN_LENGTH..=MAX_IBAN_LENGTH).rev().collect(),
            };

            for length in lengths {
                if chars.len() < length {
                    continue;
                }
                // An IBAN must not run straight into further characters.
                if chars.get(length).is_some_and(|(_, spaced)| !spaced) {
                    continue;
                }

                let candidate: String = chars[..length].iter().map(|(c, _)| c).collect();
                if validate_iban(&candidate) {
                    return Some(candidate);
                }
            }
        }

        None
    }
}

/// Validate an IBAN using the checksum algorithm.
///
/// Algorithm:
/// 1. Move first 4 characters to the end
/// 2. Replace letters with numbers (A=10, B=11, ..., Z=35)
/// 3. The resulting number mod 97 should equal 1
pub fn validate_iban(iban: &str) -> bool {
    let iban: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if iban.len() < MIN_IBAN_LENGTH || iban.len() > MAX_IBAN_LENGTH || !iban.is_ascii() {
        return false;
    }

    let country_code = &iban[..2];
    let check_digits = &iban[2..4];

    if !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if !check_digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if country_length(country_code).is_some_and(|length| length != iban.len()) {
        return false;
    }

    let rearranged = format!("{}{}", &iban[4..], &iban[..4]);

    let mut remainder: u32 = 0;
    for c in rearranged.chars() {
        let value = match c.to_digit(36) {
            Some(value) => value,
            None => return false,
        };
        // Letters expand to two digits.
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }

    remainder == 1
}
