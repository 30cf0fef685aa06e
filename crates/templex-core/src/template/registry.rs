//! Parser groups.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::ocr::OcrOptions;

use super::spec::ParserSpec;

/// Group used by callers that do not split parsers per region.
pub const DEFAULT_GROUP: &str = "default";

/// Ordered parser lists keyed by group name.
///
/// A group is run over the decoding region of the same name. Groups and
/// regions are matched by name only; either side may exist without the other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserRegistry {
    groups: BTreeMap<String, Vec<ParserSpec>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parser to a group, creating the group when needed.
    ///
    /// A parser with the same name already in the group is replaced in place.
    pub fn add_parser(&mut self, group: &str, parser: ParserSpec) -> Result<(), ConfigError> {
        if group.is_empty() {
            return Err(ConfigError::InvalidArgument(
                "parser group name must not be empty".to_string(),
            ));
        }
        if parser.name.is_empty() {
            return Err(ConfigError::InvalidArgument(
                "parser name must not be empty".to_string(),
            ));
        }

        let parsers = self.groups.entry(group.to_string()).or_default();
        match parsers.iter_mut().find(|p| p.name == parser.name) {
            Some(existing) => {
                warn!("Replacing parser {} in group {}", parser.name, group);
                *existing = parser;
            }
            None => {
                debug!("Added {} parser {} to group {}", parser.kind_name(), parser.name, group);
                parsers.push(parser);
            }
        }
        Ok(())
    }

    pub fn add_parser_to_default_group(&mut self, parser: ParserSpec) -> Result<(), ConfigError> {
        self.add_parser(DEFAULT_GROUP, parser)
    }

    pub fn remove_parser(&mut self, group: &str, parser: &str) -> Result<(), ConfigError> {
        let parsers = self
            .groups
            .get_mut(group)
            .ok_or_else(|| ConfigError::UnknownGroup(group.to_string()))?;

        let index = parsers
            .iter()
            .position(|p| p.name == parser)
            .ok_or_else(|| ConfigError::UnknownParser {
                parser: parser.to_string(),
                group: group.to_string(),
            })?;

        parsers.remove(index);
        if parsers.is_empty() {
            self.groups.remove(group);
        }
        Ok(())
    }

    pub fn remove_parser_from_default_group(&mut self, parser: &str) -> Result<(), ConfigError> {
        self.remove_parser(DEFAULT_GROUP, parser)
    }

    pub fn remove_group(&mut self, group: &str) -> Result<(), ConfigError> {
        self.groups
            .remove(group)
            .map(|_| ())
            .ok_or_else(|| ConfigError::UnknownGroup(group.to_string()))
    }

    pub fn remove_all_groups(&mut self) {
        self.groups.clear();
    }

    /// Parsers of a group in registration order; empty for unknown groups.
    pub fn parsers(&self, group: &str) -> &[ParserSpec] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parser(&self, group: &str, parser: &str) -> Option<&ParserSpec> {
        self.parsers(group).iter().find(|p| p.name == parser)
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ParserSpec])> {
        self.groups
            .iter()
            .map(|(name, parsers)| (name.as_str(), parsers.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Options of the single OCR pass shared by a group's parsers.
    pub fn merged_ocr_options(&self, group: &str) -> Option<OcrOptions> {
        let options: Vec<OcrOptions> = self.parsers(group).iter().map(|p| p.ocr_options()).collect();
        OcrOptions::merged(&options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::charsets;
    use crate::template::spec::{
        DateParserSettings, ParserKind, RawParserSettings, RegexParserSettings,
    };
    use pretty_assertions::assert_eq;

    fn names(registry: &ParserRegistry, group: &str) -> Vec<String> {
        registry.parsers(group).iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_registration_order() {
        let mut registry = ParserRegistry::new();
        registry
            .add_parser("GenderCitizenshipDob", ParserSpec::regex("Gender", RegexParserSettings::new("[MŽ]/[MF]")))
            .unwrap();
        registry
            .add_parser("GenderCitizenshipDob", ParserSpec::regex("Citizenship", RegexParserSettings::new("[A-Z]{3}")))
            .unwrap();
        registry
            .add_parser("GenderCitizenshipDob", ParserSpec::date("DateOfBirth", DateParserSettings::new()))
            .unwrap();

        assert_eq!(
            names(&registry, "GenderCitizenshipDob"),
            vec!["Gender", "Citizenship", "DateOfBirth"]
        );
    }

    #[test]
    fn test_replace_in_place() {
        let mut registry = ParserRegistry::new();
        registry.add_parser("g", ParserSpec::regex("a", RegexParserSettings::new("x"))).unwrap();
        registry.add_parser("g", ParserSpec::regex("b", RegexParserSettings::new("y"))).unwrap();
        registry.add_parser("g", ParserSpec::regex("a", RegexParserSettings::new("z"))).unwrap();

        assert_eq!(names(&registry, "g"), vec!["a", "b"]);
        let ParserKind::Regex(settings) = &registry.parsers("g")[0].kind else {
            panic!("expected regex parser");
        };
        assert_eq!(settings.pattern, "z");
    }

    #[test]
    fn test_remove_errors() {
        let mut registry = ParserRegistry::new();
        registry
            .add_parser_to_default_group(ParserSpec::raw("rawParser", RawParserSettings::default()))
            .unwrap();

        assert!(matches!(
            registry.remove_parser("missing", "rawParser"),
            Err(ConfigError::UnknownGroup(_))
        ));
        assert!(matches!(
            registry.remove_parser(DEFAULT_GROUP, "other"),
            Err(ConfigError::UnknownParser { .. })
        ));
        assert!(matches!(
            registry.remove_group("missing"),
            Err(ConfigError::UnknownGroup(_))
        ));

        registry.remove_parser_from_default_group("rawParser").unwrap();
        assert!(!registry.contains_group(DEFAULT_GROUP));

        registry.remove_all_groups();
        registry.remove_all_groups();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_group_whitelist_merge() {
        let mut registry = ParserRegistry::new();
        registry
            .add_parser(
                "Number",
                ParserSpec::regex("digits", RegexParserSettings::new(r"\d+").with_whitelist(charsets::digits())),
            )
            .unwrap();
        registry
            .add_parser(
                "Number",
                ParserSpec::regex("letters", RegexParserSettings::new("[A-Z]+").with_whitelist(charsets::uppercase_latin())),
            )
            .unwrap();

        let whitelist = registry.merged_ocr_options("Number").unwrap().whitelist.unwrap();
        assert!(whitelist.contains('0'));
        assert!(whitelist.contains('9'));
        assert!(whitelist.contains('A'));
        assert!(whitelist.contains('Z'));
        assert_eq!(whitelist.len(), 36);

        assert!(registry.merged_ocr_options("Unknown").is_none());
    }

    #[test]
    fn test_rejects_empty_names() {
        let mut registry = ParserRegistry::new();
        assert!(registry.add_parser("", ParserSpec::raw("r", RawParserSettings::default())).is_err());
        assert!(registry.add_parser("g", ParserSpec::raw("", RawParserSettings::default())).is_err());
        assert!(registry.is_empty());
    }
}
