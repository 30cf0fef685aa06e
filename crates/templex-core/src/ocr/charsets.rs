//! Ready-made whitelists.
//!
//! Each call builds a fresh value owned by the caller, so parsers can
//! extend or narrow them independently.

use super::options::Whitelist;

pub const DIGITS: &str = "0123456789";
pub const UPPERCASE_LATIN: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const CROATIAN_UPPERCASE_EXTRA: &str = "ŠĐŽČĆ";

pub fn digits() -> Whitelist {
    Whitelist::from_chars(DIGITS)
}

pub fn uppercase_latin() -> Whitelist {
    Whitelist::from_chars(UPPERCASE_LATIN)
}

/// Uppercase latin letters plus the Croatian diacritics, optionally with digits.
pub fn croatian_uppercase(with_digits: bool) -> Whitelist {
    let whitelist = uppercase_latin().with_chars(CROATIAN_UPPERCASE_EXTRA);
    if with_digits {
        whitelist.with_chars(DIGITS)
    } else {
        whitelist
    }
}

/// Whitelist of exactly the given characters.
pub fn chars(chars: &str) -> Whitelist {
    Whitelist::from_chars(chars)
}
