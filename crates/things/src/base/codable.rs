//! Coded and codable values.
//!
//! A codable value is free text optionally backed by one or more codes from
//! a controlled vocabulary (SNOMED, LOINC, RxNorm, the platform's own
//! vocabularies, ...).

use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::{
    Validate, ValidationError, require_text, validate_each, validate_optional_text,
};

/// A single code from a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodedValue {
    /// The code itself.
    pub value: String,
    /// Vocabulary family, e.g. `wc` or `HL7`.
    pub family: Option<String>,
    /// Vocabulary name, written as `<type>`.
    pub vocabulary_name: String,
    pub version: Option<String>,
}

impl CodedValue {
    pub fn new(value: impl Into<String>, vocabulary_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            family: None,
            vocabulary_name: vocabulary_name.into(),
            version: None,
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl FromXml for CodedValue {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            value: node.required_text("value")?,
            family: node.optional_text("family"),
            vocabulary_name: node.required_text("type")?,
            version: node.optional_text("version"),
        })
    }
}

impl ToXml for CodedValue {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("value", &self.value)?;
        writer.write_optional("family", &self.family)?;
        writer.write("type", &self.vocabulary_name)?;
        writer.write_optional("version", &self.version)?;
        writer.end_element()
    }
}

impl Validate for CodedValue {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("value", &self.value)?;
        validate_optional_text("family", &self.family)?;
        require_text("type", &self.vocabulary_name)?;
        validate_optional_text("version", &self.version)
    }
}

/// Display text with optional codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodableValue {
    pub text: String,
    #[serde(default)]
    pub codes: Vec<CodedValue>,
}

impl CodableValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            codes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: CodedValue) -> Self {
        self.codes.push(code);
        self
    }

    /// First code from the named vocabulary.
    pub fn code_in(&self, vocabulary_name: &str) -> Option<&CodedValue> {
        self.codes
            .iter()
            .find(|code| code.vocabulary_name == vocabulary_name)
    }
}

impl fmt::Display for CodableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for CodableValue {
    fn from(text: &str) -> Self {
        CodableValue::new(text)
    }
}

impl FromXml for CodableValue {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            text: node.required_text("text")?,
            codes: node.repeated("code")?,
        })
    }
}

impl ToXml for CodableValue {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("text", &self.text)?;
        writer.write_repeated("code", &self.codes)?;
        writer.end_element()
    }
}

impl Validate for CodableValue {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("text", &self.text)?;
        validate_each("code", &self.codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvt_serde::{from_xml_str, to_xml_string};

    const ASTHMA: &str = "<name><text>Asthma</text>\
        <code><value>195967001</value><family>Snomed</family><type>SnomedCT</type><version>2024</version></code>\
        <code><value>J45</value><type>icd10</type></code></name>";

    #[test]
    fn test_parse_codable_value() {
        let value: CodableValue = from_xml_str(ASTHMA).unwrap();
        assert_eq!(value.text, "Asthma");
        assert_eq!(value.codes.len(), 2);
        assert_eq!(value.codes[0].family.as_deref(), Some("Snomed"));
        assert_eq!(value.code_in("icd10").unwrap().value, "J45");
        assert_eq!(value.to_string(), "Asthma");
    }

    #[test]
    fn test_write_matches_schema_order() {
        let value: CodableValue = from_xml_str(ASTHMA).unwrap();
        assert_eq!(to_xml_string("name", &value).unwrap(), ASTHMA);
    }

    #[test]
    fn test_missing_text_is_a_parse_error() {
        let err = from_xml_str::<CodableValue>(
            "<name><code><value>x</value><type>t</type></code></name>",
        )
        .unwrap_err();
        assert!(err.to_string().contains("<text>"));
    }

    #[test]
    fn test_validate_blank_code() {
        let value = CodableValue::new("Asthma").with_code(CodedValue::new(" ", "SnomedCT"));
        let err = value.validate().unwrap_err();
        assert_eq!(err.field(), "code[0].value");
    }
}
