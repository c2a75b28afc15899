//! Heart rate.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{CodableValue, HealthServiceDateTime};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_non_negative, validate_field, validate_optional,
};

/// A heart rate in beats per minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRate {
    pub when: HealthServiceDateTime,
    pub value: i32,
    pub measurement_method: Option<CodableValue>,
    pub measurement_conditions: Option<CodableValue>,
    pub measurement_flags: Option<CodableValue>,
}

impl HeartRate {
    pub fn new(when: HealthServiceDateTime, value: i32) -> Self {
        Self {
            when,
            value,
            measurement_method: None,
            measurement_conditions: None,
            measurement_flags: None,
        }
    }
}

impl ItemType for HeartRate {
    const TYPE_ID: Uuid = Uuid::from_u128(0xb81eb4a6_6eac_4292_ae93_3872d6870994);
    const TYPE_NAME: &'static str = "Heart Rate";
    const ROOT_ELEMENT: &'static str = "heart-rate";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for HeartRate {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            value: node.required("value")?,
            measurement_method: node.optional("measurement-method")?,
            measurement_conditions: node.optional("measurement-conditions")?,
            measurement_flags: node.optional("measurement-flags")?,
        })
    }
}

impl ToXml for HeartRate {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write("value", &self.value)?;
        writer.write_optional("measurement-method", &self.measurement_method)?;
        writer.write_optional("measurement-conditions", &self.measurement_conditions)?;
        writer.write_optional("measurement-flags", &self.measurement_flags)?;
        writer.end_element()
    }
}

impl Validate for HeartRate {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        require_non_negative("value", self.value)?;
        validate_optional("measurement-method", &self.measurement_method)?;
        validate_optional("measurement-conditions", &self.measurement_conditions)?;
        validate_optional("measurement-flags", &self.measurement_flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::HealthServiceDate;
    use crate::error::ThingError;

    #[test]
    fn test_heart_rate_round_trip() {
        let xml = "<heart-rate><when><date><y>2024</y><m>5</m><d>6</d></date></when><value>62</value>\
            <measurement-method><text>Pulse oximeter</text></measurement-method></heart-rate>";
        let rate = HeartRate::from_item_xml(xml).unwrap();
        assert_eq!(rate.value, 62);
        assert_eq!(rate.to_item_xml().unwrap(), xml);
    }

    #[test]
    fn test_negative_rate() {
        let rate = HeartRate::new(HealthServiceDate::new(2024, 5, 6).into(), -4);
        assert!(matches!(rate.to_item_xml(), Err(ThingError::Validation(_))));
    }
}
