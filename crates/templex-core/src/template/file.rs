//! JSON form of templating settings.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::ClassifierRule;
use crate::error::Result;

use super::region::DecodingRegion;
use super::settings::TemplatingSettings;
use super::spec::ParserSpec;

/// Declarative template: classes, parser groups and an optional rule classifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Class name to its regions.
    pub classes: BTreeMap<String, Vec<DecodingRegion>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classification_regions: Vec<DecodingRegion>,
    /// Group name to its parsers, in execution order.
    pub groups: BTreeMap<String, Vec<ParserSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<ClassifierRule>,
}

impl TemplateFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let template = Self::from_json(&content)?;
        debug!(
            "Loaded template {} with {} classes and {} groups",
            path.display(),
            template.classes.len(),
            template.groups.len()
        );
        Ok(template)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Build settings, applying the same checks as the settings API.
    pub fn into_settings(self) -> Result<TemplatingSettings> {
        let mut settings = TemplatingSettings::new();

        for (class, regions) in &self.classes {
            settings.set_regions(class, regions)?;
        }
        settings.set_classification_regions(&self.classification_regions)?;

        for (group, parsers) in self.groups {
            for parser in parsers {
                settings.add_parser(&group, parser)?;
            }
        }

        if let Some(rule) = self.classifier {
            settings.set_classifier_rule(rule);
        }

        Ok(settings)
    }

    /// Template of existing settings. Closure classifiers cannot be written
    /// down and are left out.
    pub fn from_settings(settings: &TemplatingSettings) -> Self {
        Self {
            name: None,
            classes: settings
                .catalog()
                .iter()
                .map(|(class, regions)| (class.to_string(), regions.to_vec()))
                .collect(),
            classification_regions: settings.classification_regions().to_vec(),
            groups: settings
                .registry()
                .iter()
                .map(|(group, parsers)| (group.to_string(), parsers.to_vec()))
                .collect(),
            classifier: settings.classifier_rule().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, TemplexError};
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = r#"{
        "name": "test",
        "classes": {
            "oldCroId": [
                {"name": "Address", "position": {"x": 0.247, "y": 0.056, "width": 0.459, "height": 0.148}, "dewarp_height": 200}
            ]
        },
        "groups": {
            "Address": [
                {"name": "Address", "type": "regex", "pattern": "[A-Z]+", "ocr": {"min_char_height": 35}}
            ]
        },
        "classifier": {"rule": "mrz_field", "field": "opt1", "equals": "<<<", "then": "oldCroId", "otherwise": "newCroId"}
    }"#;

    #[test]
    fn test_into_settings() {
        let settings = TemplateFile::from_json(TEMPLATE).unwrap().into_settings().unwrap();

        assert_eq!(settings.regions("oldCroId").len(), 1);
        assert_eq!(settings.registry().parsers("Address").len(), 1);
        assert_eq!(
            settings.registry().merged_ocr_options("Address").unwrap().min_char_height,
            35
        );
        assert!(settings.classifier().is_some());
    }

    #[test]
    fn test_settings_round_trip() {
        let template = TemplateFile::from_json(TEMPLATE).unwrap();
        let settings = template.clone().into_settings().unwrap();

        let back = TemplateFile::from_settings(&settings);
        assert_eq!(back.classes, template.classes);
        assert_eq!(back.groups, template.groups);
        assert_eq!(back.classifier, template.classifier);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");

        let template = TemplateFile::from_json(TEMPLATE).unwrap();
        template.save(&path).unwrap();
        assert_eq!(TemplateFile::load(&path).unwrap(), template);
    }

    #[test]
    fn test_empty_class_rejected() {
        let json = r#"{"classes": {"broken": []}}"#;
        let err = TemplateFile::from_json(json).unwrap().into_settings().unwrap_err();
        assert!(matches!(err, TemplexError::Config(ConfigError::InvalidArgument(_))));
    }
}
