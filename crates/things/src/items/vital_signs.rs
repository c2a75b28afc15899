//! Vital signs panels.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{CodableValue, HealthServiceDateTime};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_finite_optional, validate_each, validate_field,
    validate_optional, validate_optional_text,
};

/// One vital sign within a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSignResult {
    pub title: CodableValue,
    pub value: Option<f64>,
    pub unit: Option<CodableValue>,
    pub reference_minimum: Option<f64>,
    pub reference_maximum: Option<f64>,
    pub text_value: Option<String>,
    pub flag: Option<CodableValue>,
}

impl VitalSignResult {
    pub fn new(title: impl Into<CodableValue>) -> Self {
        Self {
            title: title.into(),
            value: None,
            unit: None,
            reference_minimum: None,
            reference_maximum: None,
            text_value: None,
            flag: None,
        }
    }

    pub fn with_value(mut self, value: f64, unit: impl Into<CodableValue>) -> Self {
        self.value = Some(value);
        self.unit = Some(unit.into());
        self
    }

    pub fn with_reference(mut self, minimum: f64, maximum: f64) -> Self {
        self.reference_minimum = Some(minimum);
        self.reference_maximum = Some(maximum);
        self
    }

    /// Whether the value lies outside the reference range, when both are known.
    pub fn is_out_of_reference(&self) -> Option<bool> {
        let value = self.value?;
        let below = self.reference_minimum.map(|min| value < min);
        let above = self.reference_maximum.map(|max| value > max);
        match (below, above) {
            (None, None) => None,
            (below, above) => Some(below.unwrap_or(false) || above.unwrap_or(false)),
        }
    }
}

impl FromXml for VitalSignResult {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            title: node.required("title")?,
            value: node.optional("value")?,
            unit: node.optional("unit")?,
            reference_minimum: node.optional("reference-minimum")?,
            reference_maximum: node.optional("reference-maximum")?,
            text_value: node.optional_text("text-value"),
            flag: node.optional("flag")?,
        })
    }
}

impl ToXml for VitalSignResult {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("title", &self.title)?;
        writer.write_optional("value", &self.value)?;
        writer.write_optional("unit", &self.unit)?;
        writer.write_optional("reference-minimum", &self.reference_minimum)?;
        writer.write_optional("reference-maximum", &self.reference_maximum)?;
        writer.write_optional("text-value", &self.text_value)?;
        writer.write_optional("flag", &self.flag)?;
        writer.end_element()
    }
}

impl Validate for VitalSignResult {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("title", &self.title)?;
        require_finite_optional("value", self.value)?;
        validate_optional("unit", &self.unit)?;
        require_finite_optional("reference-minimum", self.reference_minimum)?;
        require_finite_optional("reference-maximum", self.reference_maximum)?;
        if let (Some(min), Some(max)) = (self.reference_minimum, self.reference_maximum) {
            if min > max {
                return Err(ValidationError::invalid(
                    "reference-minimum",
                    format!("minimum {} is greater than maximum {}", min, max),
                ));
            }
        }
        validate_optional_text("text-value", &self.text_value)?;
        validate_optional("flag", &self.flag)
    }
}

/// A set of vital signs taken together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub when: HealthServiceDateTime,
    #[serde(default)]
    pub results: Vec<VitalSignResult>,
    pub site: Option<String>,
    pub position: Option<String>,
}

impl VitalSigns {
    pub fn new(when: HealthServiceDateTime) -> Self {
        Self {
            when,
            results: Vec::new(),
            site: None,
            position: None,
        }
    }

    pub fn with_result(mut self, result: VitalSignResult) -> Self {
        self.results.push(result);
        self
    }
}

impl ItemType for VitalSigns {
    const TYPE_ID: Uuid = Uuid::from_u128(0x73822612_c15f_4b49_9e65_6af369e55c65);
    const TYPE_NAME: &'static str = "Vital Signs";
    const ROOT_ELEMENT: &'static str = "vital-signs";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for VitalSigns {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            results: node.repeated("vital-signs-results")?,
            site: node.optional_text("site"),
            position: node.optional_text("position"),
        })
    }
}

impl ToXml for VitalSigns {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write_repeated("vital-signs-results", &self.results)?;
        writer.write_optional("site", &self.site)?;
        writer.write_optional("position", &self.position)?;
        writer.end_element()
    }
}

impl Validate for VitalSigns {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        validate_each("vital-signs-results", &self.results)?;
        validate_optional_text("site", &self.site)?;
        validate_optional_text("position", &self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::HealthServiceDate;
    use crate::error::ThingError;

    #[test]
    fn test_vital_signs_round_trip() {
        let vitals = VitalSigns::new(HealthServiceDate::new(2024, 7, 14).into())
            .with_result(
                VitalSignResult::new("Temperature")
                    .with_value(37.2, "C")
                    .with_reference(36.1, 37.5),
            )
            .with_result(VitalSignResult::new("Respiration").with_value(16.0, "breaths/min"));
        let xml = vitals.to_item_xml().unwrap();
        assert_eq!(xml.matches("<vital-signs-results>").count(), 2);
        assert_eq!(VitalSigns::from_item_xml(&xml).unwrap(), vitals);
    }

    #[test]
    fn test_reference_range_order() {
        let result = VitalSignResult::new("Temperature").with_reference(38.0, 36.0);
        let vitals =
            VitalSigns::new(HealthServiceDate::new(2024, 7, 14).into()).with_result(result);
        assert_eq!(
            vitals.validate().unwrap_err().field(),
            "vital-signs-results[0].reference-minimum"
        );
    }

    #[test]
    fn test_non_finite_result_is_not_written() {
        let vitals = VitalSigns::new(HealthServiceDate::new(2024, 7, 14).into())
            .with_result(VitalSignResult::new("Temperature").with_value(f64::NAN, "C"));
        assert!(matches!(
            vitals.to_item_xml(),
            Err(ThingError::Validation(e)) if e.field() == "vital-signs-results[0].value"
        ));

        let open_ended = VitalSignResult::new("Temperature").with_reference(36.1, f64::INFINITY);
        assert_eq!(open_ended.validate().unwrap_err().field(), "reference-maximum");
    }

    #[test]
    fn test_out_of_reference() {
        let high = VitalSignResult::new("Temperature")
            .with_value(39.0, "C")
            .with_reference(36.1, 37.5);
        assert_eq!(high.is_out_of_reference(), Some(true));
        assert_eq!(VitalSignResult::new("Note").is_out_of_reference(), None);
    }
}
