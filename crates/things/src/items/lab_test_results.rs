//! Laboratory test results.
//!
//! Results are organised in groups (a panel, a battery), and groups can nest
//! through `<sub-groups>`. Each result carries its value as a general
//! measurement with optional reference ranges and flags.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{ApproximateDateTime, CodableValue, DoubleRange, GeneralMeasurement, PersonItem};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_non_empty, validate_each, validate_field, validate_optional,
    validate_optional_text,
};

/// A reference, toxic or therapeutic range for a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultRange {
    /// Written as `<type>`.
    pub range_type: CodableValue,
    pub text: CodableValue,
    pub value: Option<DoubleRange>,
}

impl TestResultRange {
    pub fn new(range_type: impl Into<CodableValue>, text: impl Into<CodableValue>) -> Self {
        Self {
            range_type: range_type.into(),
            text: text.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: DoubleRange) -> Self {
        self.value = Some(value);
        self
    }
}

impl FromXml for TestResultRange {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            range_type: node.required("type")?,
            text: node.required("text")?,
            value: node.optional("value")?,
        })
    }
}

impl ToXml for TestResultRange {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("type", &self.range_type)?;
        writer.write("text", &self.text)?;
        writer.write_optional("value", &self.value)?;
        writer.end_element()
    }
}

impl Validate for TestResultRange {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("type", &self.range_type)?;
        validate_field("text", &self.text)?;
        validate_optional("value", &self.value)
    }
}

/// The value of one result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTestResultValue {
    pub measurement: GeneralMeasurement,
    #[serde(default)]
    pub ranges: Vec<TestResultRange>,
    #[serde(default)]
    pub flag: Vec<CodableValue>,
}

impl LabTestResultValue {
    pub fn new(measurement: GeneralMeasurement) -> Self {
        Self {
            measurement,
            ranges: Vec::new(),
            flag: Vec::new(),
        }
    }

    pub fn with_range(mut self, range: TestResultRange) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn with_flag(mut self, flag: impl Into<CodableValue>) -> Self {
        self.flag.push(flag.into());
        self
    }
}

impl FromXml for LabTestResultValue {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            measurement: node.required("measurement")?,
            ranges: node.repeated("ranges")?,
            flag: node.repeated("flag")?,
        })
    }
}

impl ToXml for LabTestResultValue {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("measurement", &self.measurement)?;
        writer.write_repeated("ranges", &self.ranges)?;
        writer.write_repeated("flag", &self.flag)?;
        writer.end_element()
    }
}

impl Validate for LabTestResultValue {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("measurement", &self.measurement)?;
        validate_each("ranges", &self.ranges)?;
        validate_each("flag", &self.flag)
    }
}

/// One test within a group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTestResultDetails {
    pub when: Option<ApproximateDateTime>,
    pub name: Option<String>,
    pub substance: Option<CodableValue>,
    pub collection_method: Option<CodableValue>,
    pub clinical_code: Option<CodableValue>,
    pub value: Option<LabTestResultValue>,
    pub status: Option<CodableValue>,
    pub note: Option<String>,
}

impl LabTestResultDetails {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: LabTestResultValue) -> Self {
        self.value = Some(value);
        self
    }
}

impl FromXml for LabTestResultDetails {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.optional("when")?,
            name: node.optional_text("name"),
            substance: node.optional("substance")?,
            collection_method: node.optional("collection-method")?,
            clinical_code: node.optional("clinical-code")?,
            value: node.optional("value")?,
            status: node.optional("status")?,
            note: node.optional_text("note"),
        })
    }
}

impl ToXml for LabTestResultDetails {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write_optional("when", &self.when)?;
        writer.write_optional("name", &self.name)?;
        writer.write_optional("substance", &self.substance)?;
        writer.write_optional("collection-method", &self.collection_method)?;
        writer.write_optional("clinical-code", &self.clinical_code)?;
        writer.write_optional("value", &self.value)?;
        writer.write_optional("status", &self.status)?;
        writer.write_optional("note", &self.note)?;
        writer.end_element()
    }
}

impl Validate for LabTestResultDetails {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_optional("when", &self.when)?;
        validate_optional_text("name", &self.name)?;
        validate_optional("substance", &self.substance)?;
        validate_optional("collection-method", &self.collection_method)?;
        validate_optional("clinical-code", &self.clinical_code)?;
        validate_optional("value", &self.value)?;
        validate_optional("status", &self.status)?;
        validate_optional_text("note", &self.note)
    }
}

/// A named group of results, possibly containing sub-groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTestResultGroup {
    pub group_name: CodableValue,
    pub laboratory_name: Option<PersonItem>,
    pub status: Option<CodableValue>,
    #[serde(default)]
    pub sub_groups: Vec<LabTestResultGroup>,
    #[serde(default)]
    pub results: Vec<LabTestResultDetails>,
}

impl LabTestResultGroup {
    pub fn new(group_name: impl Into<CodableValue>) -> Self {
        Self {
            group_name: group_name.into(),
            laboratory_name: None,
            status: None,
            sub_groups: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn with_sub_group(mut self, group: LabTestResultGroup) -> Self {
        self.sub_groups.push(group);
        self
    }

    pub fn with_result(mut self, result: LabTestResultDetails) -> Self {
        self.results.push(result);
        self
    }

    /// Every result in this group and its sub-groups, depth first.
    pub fn all_results(&self) -> Vec<&LabTestResultDetails> {
        let mut results: Vec<&LabTestResultDetails> = self.results.iter().collect();
        for group in &self.sub_groups {
            results.extend(group.all_results());
        }
        results
    }
}

impl FromXml for LabTestResultGroup {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            group_name: node.required("group-name")?,
            laboratory_name: node.optional("laboratory-name")?,
            status: node.optional("status")?,
            sub_groups: node.repeated("sub-groups")?,
            results: node.repeated("results")?,
        })
    }
}

impl ToXml for LabTestResultGroup {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("group-name", &self.group_name)?;
        writer.write_optional("laboratory-name", &self.laboratory_name)?;
        writer.write_optional("status", &self.status)?;
        writer.write_repeated("sub-groups", &self.sub_groups)?;
        writer.write_repeated("results", &self.results)?;
        writer.end_element()
    }
}

impl Validate for LabTestResultGroup {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("group-name", &self.group_name)?;
        validate_optional("laboratory-name", &self.laboratory_name)?;
        validate_optional("status", &self.status)?;
        validate_each("sub-groups", &self.sub_groups)?;
        validate_each("results", &self.results)
    }
}

/// A set of laboratory results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTestResults {
    pub when: Option<ApproximateDateTime>,
    pub lab_group: Vec<LabTestResultGroup>,
    pub ordered_by: Option<PersonItem>,
}

impl LabTestResults {
    pub fn new(group: LabTestResultGroup) -> Self {
        Self {
            when: None,
            lab_group: vec![group],
            ordered_by: None,
        }
    }
}

impl ItemType for LabTestResults {
    const TYPE_ID: Uuid = Uuid::from_u128(0x5800eab5_a8c2_482a_a4d6_f1db25ae08c3);
    const TYPE_NAME: &'static str = "Lab Test Results";
    const ROOT_ELEMENT: &'static str = "lab-test-results";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.as_ref()?.to_naive()
    }
}

impl FromXml for LabTestResults {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.optional("when")?,
            lab_group: node.repeated("lab-group")?,
            ordered_by: node.optional("ordered-by")?,
        })
    }
}

impl ToXml for LabTestResults {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write_optional("when", &self.when)?;
        writer.write_repeated("lab-group", &self.lab_group)?;
        writer.write_optional("ordered-by", &self.ordered_by)?;
        writer.end_element()
    }
}

impl Validate for LabTestResults {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_optional("when", &self.when)?;
        require_non_empty("lab-group", &self.lab_group)?;
        validate_each("lab-group", &self.lab_group)?;
        validate_optional("ordered-by", &self.ordered_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::StructuredMeasurement;

    fn glucose_result() -> LabTestResultDetails {
        LabTestResultDetails::named("Glucose").with_value(
            LabTestResultValue::new(
                GeneralMeasurement::new("95 mg/dL")
                    .with_structured(StructuredMeasurement::new(95.0, "mg/dL")),
            )
            .with_range(
                TestResultRange::new("normal", "70-99 mg/dL")
                    .with_value(DoubleRange::new(70.0, 99.0)),
            ),
        )
    }

    #[test]
    fn test_nested_groups_round_trip() {
        let panel = LabTestResultGroup::new("Metabolic panel")
            .with_result(glucose_result())
            .with_sub_group(
                LabTestResultGroup::new("Electrolytes")
                    .with_result(LabTestResultDetails::named("Sodium")),
            );
        let results = LabTestResults::new(panel);
        let xml = results.to_item_xml().unwrap();
        assert!(xml.contains("<sub-groups><group-name><text>Electrolytes</text></group-name>"));
        let parsed = LabTestResults::from_item_xml(&xml).unwrap();
        assert_eq!(parsed, results);

        let names: Vec<_> = parsed.lab_group[0]
            .all_results()
            .iter()
            .filter_map(|r| r.name.as_deref())
            .collect();
        assert_eq!(names, vec!["Glucose", "Sodium"]);
    }

    #[test]
    fn test_lab_group_required() {
        let results = LabTestResults {
            when: None,
            lab_group: Vec::new(),
            ordered_by: None,
        };
        assert_eq!(results.validate().unwrap_err().field(), "lab-group");
    }

    #[test]
    fn test_inverted_range_path() {
        let mut result = glucose_result();
        if let Some(value) = result.value.as_mut() {
            value.ranges[0].value = Some(DoubleRange::new(99.0, 70.0));
        }
        let results = LabTestResults::new(
            LabTestResultGroup::new("Panel")
                .with_sub_group(LabTestResultGroup::new("Inner").with_result(result)),
        );
        assert_eq!(
            results.validate().unwrap_err().field(),
            "lab-group[0].sub-groups[0].results[0].value.ranges[0].value.minimum-range"
        );
    }
}
