//! Machine readable zone results handed over by the MRZ reader.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parsers::ParsedDate;

/// Kind of machine readable travel document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MrtdDocumentType {
    #[default]
    Unknown,
    IdentityCard,
    Passport,
    Visa,
    GreenCard,
}

impl fmt::Display for MrtdDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MrtdDocumentType::Unknown => "unknown",
            MrtdDocumentType::IdentityCard => "identity card",
            MrtdDocumentType::Passport => "passport",
            MrtdDocumentType::Visa => "visa",
            MrtdDocumentType::GreenCard => "green card",
        };
        f.write_str(text)
    }
}

/// Fields read from a machine readable zone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MrtdResult {
    pub document_code: String,
    pub issuer: String,
    pub document_number: String,
    pub opt1: String,
    pub opt2: String,
    pub date_of_birth: ParsedDate,
    pub date_of_expiry: ParsedDate,
    pub sex: String,
    pub nationality: String,
    pub primary_id: String,
    pub secondary_id: String,
    pub raw_mrz: String,
    /// All check digits matched.
    pub verified: bool,
    pub document_type: MrtdDocumentType,
}

impl MrtdResult {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn field(&self, field: MrzField) -> &str {
        match field {
            MrzField::DocumentCode => &self.document_code,
            MrzField::Issuer => &self.issuer,
            MrzField::DocumentNumber => &self.document_number,
            MrzField::Opt1 => &self.opt1,
            MrzField::Opt2 => &self.opt2,
            MrzField::Sex => &self.sex,
            MrzField::Nationality => &self.nationality,
            MrzField::PrimaryId => &self.primary_id,
            MrzField::SecondaryId => &self.secondary_id,
            MrzField::RawMrz => &self.raw_mrz,
        }
    }
}

/// Text fields of an [`MrtdResult`] a classifier rule can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MrzField {
    DocumentCode,
    Issuer,
    DocumentNumber,
    Opt1,
    Opt2,
    Sex,
    Nationality,
    PrimaryId,
    SecondaryId,
    RawMrz,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let mrtd = MrtdResult::from_json(
            r#"{"issuer":"HRV","opt1":"<<<<<<<<<<<<<<<","document_type":"identity_card"}"#,
        )
        .unwrap();

        assert_eq!(mrtd.field(MrzField::Opt1), "<<<<<<<<<<<<<<<");
        assert_eq!(mrtd.document_type.to_string(), "identity card");
        assert!(!mrtd.date_of_birth.successfully_parsed);
        assert_eq!(mrtd.date_of_birth.year, -1);
    }
}
