//! Blood glucose.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{BloodGlucoseMeasurement, CodableValue, HealthServiceDateTime};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_range, validate_field, validate_optional,
};

/// A blood glucose reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodGlucose {
    pub when: HealthServiceDateTime,
    pub value: BloodGlucoseMeasurement,
    /// Whole blood or plasma.
    pub glucose_measurement_type: CodableValue,
    pub outside_operating_temp: Option<bool>,
    pub is_control_test: Option<bool>,
    /// 1 (well below normal) to 5 (well above normal).
    pub normalcy: Option<i32>,
    /// Fasting, before meal, after meal and so on.
    pub measurement_context: Option<CodableValue>,
}

impl BloodGlucose {
    pub fn new(
        when: HealthServiceDateTime,
        value: BloodGlucoseMeasurement,
        glucose_measurement_type: CodableValue,
    ) -> Self {
        Self {
            when,
            value,
            glucose_measurement_type,
            outside_operating_temp: None,
            is_control_test: None,
            normalcy: None,
            measurement_context: None,
        }
    }
}

impl ItemType for BloodGlucose {
    const TYPE_ID: Uuid = Uuid::from_u128(0x879e7c04_4e8a_4707_9ad3_b054df467ce4);
    const TYPE_NAME: &'static str = "Blood Glucose";
    const ROOT_ELEMENT: &'static str = "blood-glucose";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for BloodGlucose {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            value: node.required("value")?,
            glucose_measurement_type: node.required("glucose-measurement-type")?,
            outside_operating_temp: node.optional("outside-operating-temp")?,
            is_control_test: node.optional("is-control-test")?,
            normalcy: node.optional("normalcy")?,
            measurement_context: node.optional("measurement-context")?,
        })
    }
}

impl ToXml for BloodGlucose {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write("value", &self.value)?;
        writer.write("glucose-measurement-type", &self.glucose_measurement_type)?;
        writer.write_optional("outside-operating-temp", &self.outside_operating_temp)?;
        writer.write_optional("is-control-test", &self.is_control_test)?;
        writer.write_optional("normalcy", &self.normalcy)?;
        writer.write_optional("measurement-context", &self.measurement_context)?;
        writer.end_element()
    }
}

impl Validate for BloodGlucose {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        validate_field("value", &self.value)?;
        validate_field("glucose-measurement-type", &self.glucose_measurement_type)?;
        if let Some(normalcy) = self.normalcy {
            require_range("normalcy", normalcy, 1, 5)?;
        }
        validate_optional("measurement-context", &self.measurement_context)
    }
}
