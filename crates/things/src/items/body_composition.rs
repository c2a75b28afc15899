//! Body composition: fat, lean mass, water and similar measures.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{ApproximateDateTime, CodableValue, WeightValue};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_range, validate_field, validate_optional,
};

/// A body composition value as a mass, a fraction of body mass, or both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyCompositionValue {
    pub mass_value: Option<WeightValue>,
    /// Fraction between 0 and 1.
    pub percent_value: Option<f64>,
}

impl BodyCompositionValue {
    pub fn mass(value: WeightValue) -> Self {
        Self {
            mass_value: Some(value),
            percent_value: None,
        }
    }

    pub fn percent(value: f64) -> Self {
        Self {
            mass_value: None,
            percent_value: Some(value),
        }
    }
}

impl FromXml for BodyCompositionValue {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            mass_value: node.optional("mass-value")?,
            percent_value: node.optional("percent-value")?,
        })
    }
}

impl ToXml for BodyCompositionValue {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write_optional("mass-value", &self.mass_value)?;
        writer.write_optional("percent-value", &self.percent_value)?;
        writer.end_element()
    }
}

impl Validate for BodyCompositionValue {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.mass_value.is_none() && self.percent_value.is_none() {
            return Err(ValidationError::invalid(
                "",
                "either mass-value or percent-value is required",
            ));
        }
        validate_optional("mass-value", &self.mass_value)?;
        if let Some(percent) = self.percent_value {
            require_range("percent-value", percent, 0.0, 1.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyComposition {
    pub when: ApproximateDateTime,
    /// What was measured, e.g. body fat or lean mass.
    pub measurement_name: CodableValue,
    pub value: BodyCompositionValue,
    pub measurement_method: Option<CodableValue>,
    pub site: Option<CodableValue>,
}

impl BodyComposition {
    pub fn new(
        when: ApproximateDateTime,
        measurement_name: impl Into<CodableValue>,
        value: BodyCompositionValue,
    ) -> Self {
        Self {
            when,
            measurement_name: measurement_name.into(),
            value,
            measurement_method: None,
            site: None,
        }
    }
}

impl ItemType for BodyComposition {
    const TYPE_ID: Uuid = Uuid::from_u128(0x18adc276_5144_4e7e_bf6c_e56d8250adf8);
    const TYPE_NAME: &'static str = "Body Composition";
    const ROOT_ELEMENT: &'static str = "body-composition";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for BodyComposition {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            measurement_name: node.required("measurement-name")?,
            value: node.required("value")?,
            measurement_method: node.optional("measurement-method")?,
            site: node.optional("site")?,
        })
    }
}

impl ToXml for BodyComposition {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write("measurement-name", &self.measurement_name)?;
        writer.write("value", &self.value)?;
        writer.write_optional("measurement-method", &self.measurement_method)?;
        writer.write_optional("site", &self.site)?;
        writer.end_element()
    }
}

impl Validate for BodyComposition {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        validate_field("measurement-name", &self.measurement_name)?;
        validate_field("value", &self.value)?;
        validate_optional("measurement-method", &self.measurement_method)?;
        validate_optional("site", &self.site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ApproximateDate;

    #[test]
    fn test_body_fat_percent() {
        let xml = "<body-composition><when><structured><date><y>2024</y><m>2</m><d>1</d></date></structured></when>\
            <measurement-name><text>Body fat percentage</text></measurement-name>\
            <value><percent-value>0.22</percent-value></value></body-composition>";
        let item = BodyComposition::from_item_xml(xml).unwrap();
        assert_eq!(item.value.percent_value, Some(0.22));
        assert_eq!(item.to_item_xml().unwrap(), xml);
    }

    #[test]
    fn test_value_needs_mass_or_percent() {
        let item = BodyComposition::new(
            ApproximateDateTime::structured(ApproximateDate::ymd(2024, 2, 1)),
            "Lean mass",
            BodyCompositionValue::default(),
        );
        assert_eq!(item.validate().unwrap_err().field(), "value");
    }

    #[test]
    fn test_percent_over_one() {
        let item = BodyComposition::new(
            ApproximateDateTime::structured(ApproximateDate::ymd(2024, 2, 1)),
            "Body fat percentage",
            BodyCompositionValue::percent(22.0),
        );
        assert_eq!(item.validate().unwrap_err().field(), "value.percent-value");
    }

    #[test]
    fn test_nan_percent() {
        assert_eq!(
            BodyCompositionValue::percent(f64::NAN).validate().unwrap_err().field(),
            "percent-value"
        );
    }
}
