//! Classifiers that can be written down in a template file.

use serde::{Deserialize, Serialize};

use super::{Classifier, MrzField, PreliminaryResult};

/// Maps a parser group to the class it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupClass {
    pub group: String,
    pub class: String,
}

/// Declarative classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ClassifierRule {
    /// Compare one MRZ field with a literal.
    MrzField {
        field: MrzField,
        equals: String,
        then: String,
        otherwise: String,
    },
    /// The first group, in listed order, whose parser produced a value.
    FirstParsed {
        parser: String,
        groups: Vec<GroupClass>,
    },
}

impl Classifier for ClassifierRule {
    fn classify(&self, preliminary: &PreliminaryResult<'_>) -> Option<String> {
        match self {
            ClassifierRule::MrzField {
                field,
                equals,
                then,
                otherwise,
            } => {
                let mrtd = preliminary.as_mrtd()?;
                if mrtd.field(*field) == equals.as_str() {
                    Some(then.clone())
                } else {
                    Some(otherwise.clone())
                }
            }
            ClassifierRule::FirstParsed { parser, groups } => {
                let result = preliminary.as_templating()?;
                groups
                    .iter()
                    .find(|g| result.parsed_string(parser, &g.group).is_some())
                    .map(|g| g.class.clone())
            }
        }
    }
}
