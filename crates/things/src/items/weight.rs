//! Body weight.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{HealthServiceDateTime, WeightValue};
use crate::items::ItemType;
use crate::validation::{Validate, ValidationError, validate_field};

/// A body weight measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weight {
    pub when: HealthServiceDateTime,
    pub value: WeightValue,
}

impl Weight {
    pub fn new(when: HealthServiceDateTime, value: WeightValue) -> Self {
        Self { when, value }
    }
}

impl ItemType for Weight {
    const TYPE_ID: Uuid = Uuid::from_u128(0x3d34d87e_7fc1_4153_800f_f56592cb0d17);
    const TYPE_NAME: &'static str = "Weight";
    const ROOT_ELEMENT: &'static str = "weight";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for Weight {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            value: node.required("value")?,
        })
    }
}

impl ToXml for Weight {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write("value", &self.value)?;
        writer.end_element()
    }
}

impl Validate for Weight {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        validate_field("value", &self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::HealthServiceDate;
    use crate::error::ThingError;

    const WEIGHT: &str = "<weight><when><date><y>2024</y><m>1</m><d>2</d></date>\
        <time><h>8</h><m>30</m></time></when>\
        <value><kg>70</kg><display units=\"lb\" units-code=\"lb\">154.3</display></value></weight>";

    #[test]
    fn test_parse_weight() {
        let weight = Weight::from_item_xml(WEIGHT).unwrap();
        assert_eq!(weight.value.value, 70.0);
        assert_eq!(
            weight.effective_date().unwrap().to_string(),
            "2024-01-02 08:30:00"
        );
        assert_eq!(weight.to_item_xml().unwrap(), WEIGHT);
    }

    #[test]
    fn test_wrong_root_element() {
        let err = Weight::from_item_xml("<height/>").unwrap_err();
        assert!(matches!(err, ThingError::Serde(_)));
    }

    #[test]
    fn test_invalid_weight_is_not_written() {
        let weight = Weight::new(
            HealthServiceDate::new(2024, 2, 30).into(),
            WeightValue::new(70.0),
        );
        let err = weight.to_item_xml().unwrap_err();
        match err {
            ThingError::Validation(e) => assert_eq!(e.field(), "when.date.d"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
