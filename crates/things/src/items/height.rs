//! Body height.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{HealthServiceDateTime, Length};
use crate::items::ItemType;
use crate::validation::{Validate, ValidationError, validate_field};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Height {
    pub when: HealthServiceDateTime,
    pub value: Length,
}

impl Height {
    pub fn new(when: HealthServiceDateTime, value: Length) -> Self {
        Self { when, value }
    }
}

impl ItemType for Height {
    const TYPE_ID: Uuid = Uuid::from_u128(0x40750a6a_89b2_455c_bd8d_b420a4cb500b);
    const TYPE_NAME: &'static str = "Height";
    const ROOT_ELEMENT: &'static str = "height";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for Height {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            value: node.required("value")?,
        })
    }
}

impl ToXml for Height {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write("value", &self.value)?;
        writer.end_element()
    }
}

impl Validate for Height {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        validate_field("value", &self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::HealthServiceDate;

    #[test]
    fn test_height_from_inches() {
        let height = Height::new(
            HealthServiceDate::new(2023, 6, 1).into(),
            Length::from_display(70.0, "in").unwrap(),
        );
        let xml = height.to_item_xml().unwrap();
        assert!((height.value.value - 1.778).abs() < 1e-9);
        assert!(xml.contains(r#"<display units="in" units-code="in">70</display>"#));
        let parsed = Height::from_item_xml(&xml).unwrap();
        assert_eq!(parsed, height);
    }
}
