//! Blood pressure.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::HealthServiceDateTime;
use crate::items::ItemType;
use crate::validation::{Validate, ValidationError, require_non_negative, validate_field};

/// A blood pressure reading in mmHg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodPressure {
    pub when: HealthServiceDateTime,
    pub systolic: i32,
    pub diastolic: i32,
    /// Beats per minute taken with the reading.
    pub pulse: Option<i32>,
    pub irregular_heartbeat: Option<bool>,
}

impl BloodPressure {
    pub fn new(when: HealthServiceDateTime, systolic: i32, diastolic: i32) -> Self {
        Self {
            when,
            systolic,
            diastolic,
            pulse: None,
            irregular_heartbeat: None,
        }
    }

    pub fn with_pulse(mut self, pulse: i32) -> Self {
        self.pulse = Some(pulse);
        self
    }
}

impl ItemType for BloodPressure {
    const TYPE_ID: Uuid = Uuid::from_u128(0xca3c57f4_f4c1_4e15_be67_0a3caf5414ed);
    const TYPE_NAME: &'static str = "Blood Pressure";
    const ROOT_ELEMENT: &'static str = "blood-pressure";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for BloodPressure {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            systolic: node.required("systolic")?,
            diastolic: node.required("diastolic")?,
            pulse: node.optional("pulse")?,
            irregular_heartbeat: node.optional("irregular-heartbeat")?,
        })
    }
}

impl ToXml for BloodPressure {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write("systolic", &self.systolic)?;
        writer.write("diastolic", &self.diastolic)?;
        writer.write_optional("pulse", &self.pulse)?;
        writer.write_optional("irregular-heartbeat", &self.irregular_heartbeat)?;
        writer.end_element()
    }
}

impl Validate for BloodPressure {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        require_non_negative("systolic", self.systolic)?;
        require_non_negative("diastolic", self.diastolic)?;
        if let Some(pulse) = self.pulse {
            require_non_negative("pulse", pulse)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{HealthServiceDate, HealthServiceTime};

    #[test]
    fn test_blood_pressure_round_trip() {
        let when = HealthServiceDateTime::new(HealthServiceDate::new(2024, 3, 9))
            .with_time(HealthServiceTime::new(7, 45));
        let reading = BloodPressure::new(when, 120, 80).with_pulse(64);
        let xml = reading.to_item_xml().unwrap();
        assert!(xml.ends_with(
            "<systolic>120</systolic><diastolic>80</diastolic><pulse>64</pulse></blood-pressure>"
        ));
        assert_eq!(BloodPressure::from_item_xml(&xml).unwrap(), reading);
    }

    #[test]
    fn test_missing_diastolic() {
        let xml = "<blood-pressure><when><date><y>2024</y><m>3</m><d>9</d></date></when>\
            <systolic>120</systolic></blood-pressure>";
        let err = BloodPressure::from_item_xml(xml).unwrap_err();
        assert!(err.to_string().contains("<diastolic>"));
    }

    #[test]
    fn test_negative_pulse() {
        let reading = BloodPressure::new(HealthServiceDate::new(2024, 3, 9).into(), 120, 80)
            .with_pulse(-1);
        assert_eq!(reading.validate().unwrap_err().field(), "pulse");
    }
}
