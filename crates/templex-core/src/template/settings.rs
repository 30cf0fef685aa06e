//! Everything the templating engine needs to know about a document type.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::classify::{Classifier, ClassifierRule};
use crate::error::ConfigError;
use crate::parsers::RegexParser;

use super::region::{DecodingRegion, RegionCatalog, DEFAULT_CLASS};
use super::registry::{ParserRegistry, DEFAULT_GROUP};
use super::spec::{ParserKind, ParserSpec};

/// Region catalog, parser registry and classifier of one document type.
///
/// Configure once, then hand to the engine. Every mutating call either
/// applies completely or returns an error and leaves the settings as they were.
#[derive(Clone, Default)]
pub struct TemplatingSettings {
    catalog: RegionCatalog,
    registry: ParserRegistry,
    classification_regions: Vec<DecodingRegion>,
    classifier: Option<Arc<dyn Classifier>>,
    classifier_rule: Option<ClassifierRule>,
}

impl fmt::Debug for TemplatingSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplatingSettings")
            .field("catalog", &self.catalog)
            .field("registry", &self.registry)
            .field("classification_regions", &self.classification_regions)
            .field("classifier", &self.classifier.as_ref().map(|_| "<classifier>"))
            .field("classifier_rule", &self.classifier_rule)
            .finish()
    }
}

/// Non-fatal configuration problems found by [`TemplatingSettings::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The parser's pattern does not compile; it will never match.
    InvalidPattern { group: String, parser: String, message: String },
    /// No region of this name exists, so the group never runs.
    GroupWithoutRegion { group: String },
    /// No parser group of this name exists, so the region is never read.
    RegionWithoutGroup { class: String, region: String },
    /// A classifier is set but no classes are configured.
    ClassifierWithoutClasses,
    /// Classes other than the default one exist but nothing selects them.
    ClassesWithoutClassifier,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::InvalidPattern { group, parser, message } => {
                write!(f, "parser {parser} in group {group} has an invalid pattern: {message}")
            }
            ConfigWarning::GroupWithoutRegion { group } => {
                write!(f, "parser group {group} has no region of the same name")
            }
            ConfigWarning::RegionWithoutGroup { class, region } => {
                write!(f, "region {region} of class {class} has no parser group")
            }
            ConfigWarning::ClassifierWithoutClasses => {
                write!(f, "a classifier is set but no document classes are configured")
            }
            ConfigWarning::ClassesWithoutClassifier => {
                write!(f, "document classes are configured but no classifier selects them")
            }
        }
    }
}

impl TemplatingSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn set_regions(&mut self, class: &str, regions: &[DecodingRegion]) -> Result<(), ConfigError> {
        self.catalog.set_regions(class, regions)
    }

    /// Regions used when no classifier is set.
    pub fn set_default_regions(&mut self, regions: &[DecodingRegion]) -> Result<(), ConfigError> {
        self.catalog.set_regions(DEFAULT_CLASS, regions)
    }

    pub fn remove_regions(&mut self, class: &str) -> Result<(), ConfigError> {
        self.catalog.remove_regions(class)
    }

    pub fn remove_all_regions(&mut self) {
        self.catalog.remove_all_regions();
    }

    pub fn regions(&self, class: &str) -> &[DecodingRegion] {
        self.catalog.regions(class)
    }

    /// Regions read before classification. An empty list removes them.
    pub fn set_classification_regions(&mut self, regions: &[DecodingRegion]) -> Result<(), ConfigError> {
        let mut scratch = RegionCatalog::new();
        if !regions.is_empty() {
            // Same name rules as a class.
            scratch.set_regions("classification", regions)?;
        }
        self.classification_regions = scratch.regions("classification").to_vec();
        Ok(())
    }

    pub fn classification_regions(&self) -> &[DecodingRegion] {
        &self.classification_regions
    }

    pub fn add_parser(&mut self, group: &str, parser: ParserSpec) -> Result<(), ConfigError> {
        self.registry.add_parser(group, parser)
    }

    pub fn add_parser_to_default_group(&mut self, parser: ParserSpec) -> Result<(), ConfigError> {
        self.registry.add_parser_to_default_group(parser)
    }

    pub fn remove_parser(&mut self, group: &str, parser: &str) -> Result<(), ConfigError> {
        self.registry.remove_parser(group, parser)
    }

    pub fn remove_parser_from_default_group(&mut self, parser: &str) -> Result<(), ConfigError> {
        self.registry.remove_parser_from_default_group(parser)
    }

    pub fn remove_group(&mut self, group: &str) -> Result<(), ConfigError> {
        self.registry.remove_group(group)
    }

    pub fn remove_all_groups(&mut self) {
        self.registry.remove_all_groups();
    }

    pub fn set_classifier<C: Classifier + 'static>(&mut self, classifier: C) {
        self.classifier = Some(Arc::new(classifier));
        self.classifier_rule = None;
    }

    /// Use a declarative rule as classifier; the rule is kept for saving.
    pub fn set_classifier_rule(&mut self, rule: ClassifierRule) {
        self.classifier = Some(Arc::new(rule.clone()));
        self.classifier_rule = Some(rule);
    }

    pub fn clear_classifier(&mut self) {
        self.classifier = None;
        self.classifier_rule = None;
    }

    pub fn classifier(&self) -> Option<&Arc<dyn Classifier>> {
        self.classifier.as_ref()
    }

    pub fn classifier_rule(&self) -> Option<&ClassifierRule> {
        self.classifier_rule.as_ref()
    }

    /// Look for configuration that is legal but will never produce results.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (group, parsers) in self.registry.iter() {
            for parser in parsers {
                if let ParserKind::Regex(settings) = &parser.kind {
                    if let Err(e) = RegexParser::new(settings) {
                        warnings.push(ConfigWarning::InvalidPattern {
                            group: group.to_string(),
                            parser: parser.name.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        let region_names: BTreeSet<&str> = self
            .catalog
            .iter()
            .flat_map(|(_, regions)| regions.iter())
            .chain(self.classification_regions.iter())
            .map(|r| r.name.as_str())
            .collect();

        for group in self.registry.groups() {
            if !region_names.contains(group) {
                warnings.push(ConfigWarning::GroupWithoutRegion {
                    group: group.to_string(),
                });
            }
        }

        for (class, regions) in self.catalog.iter() {
            for region in regions {
                if !self.registry.contains_group(&region.name) {
                    warnings.push(ConfigWarning::RegionWithoutGroup {
                        class: class.to_string(),
                        region: region.name.clone(),
                    });
                }
            }
        }
        for region in &self.classification_regions {
            if !self.registry.contains_group(&region.name) {
                warnings.push(ConfigWarning::RegionWithoutGroup {
                    class: "classification".to_string(),
                    region: region.name.clone(),
                });
            }
        }

        match (&self.classifier, self.catalog.is_empty()) {
            (Some(_), true) => warnings.push(ConfigWarning::ClassifierWithoutClasses),
            (None, false) if self.catalog.classes().any(|c| c != DEFAULT_CLASS) => {
                warnings.push(ConfigWarning::ClassesWithoutClassifier)
            }
            _ => {}
        }

        warnings
    }

    /// Whether the default group has parsers.
    pub fn uses_default_group(&self) -> bool {
        self.registry.contains_group(DEFAULT_GROUP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::template::{RawParserSettings, RegexParserSettings};

    fn region(name: &str) -> DecodingRegion {
        DecodingRegion::new(name, Rect::new(0.1, 0.1, 0.5, 0.2), 100).unwrap()
    }

    #[test]
    fn test_validate_clean() {
        let mut settings = TemplatingSettings::new();
        settings.set_default_regions(&[region("Address")]).unwrap();
        settings
            .add_parser("Address", ParserSpec::raw("Address", RawParserSettings::default()))
            .unwrap();

        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_inert_config() {
        let mut settings = TemplatingSettings::new();
        settings.set_regions("oldCroId", &[region("Address"), region("IssuedBy")]).unwrap();
        settings
            .add_parser("Address", ParserSpec::regex("Address", RegexParserSettings::new("([A-Z")))
            .unwrap();
        settings
            .add_parser("DateOfIssue", ParserSpec::raw("DateOfIssue", RawParserSettings::default()))
            .unwrap();

        let warnings = settings.validate();
        assert!(warnings.iter().any(|w| matches!(w, ConfigWarning::InvalidPattern { parser, .. } if parser == "Address")));
        assert!(warnings.contains(&ConfigWarning::GroupWithoutRegion { group: "DateOfIssue".into() }));
        assert!(warnings.contains(&ConfigWarning::RegionWithoutGroup {
            class: "oldCroId".into(),
            region: "IssuedBy".into()
        }));
        assert!(warnings.contains(&ConfigWarning::ClassesWithoutClassifier));
    }

    #[test]
    fn test_classifier_without_classes() {
        let mut settings = TemplatingSettings::new();
        settings.set_classifier(|_: &crate::classify::PreliminaryResult<'_>| Some("A".to_string()));
        assert_eq!(settings.validate(), vec![ConfigWarning::ClassifierWithoutClasses]);

        settings.clear_classifier();
        assert!(settings.classifier().is_none());
    }

    #[test]
    fn test_classification_regions_replace() {
        let mut settings = TemplatingSettings::new();
        settings
            .set_classification_regions(&[region("DocumentNumberOld"), region("DocumentNumberNew")])
            .unwrap();
        assert_eq!(settings.classification_regions().len(), 2);

        settings.set_classification_regions(&[]).unwrap();
        assert!(settings.classification_regions().is_empty());
    }
}
