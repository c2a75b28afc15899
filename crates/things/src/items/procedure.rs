//! Procedures and surgeries.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{ApproximateDateTime, CodableValue, PersonItem};
use crate::items::ItemType;
use crate::validation::{Validate, ValidationError, validate_field, validate_optional};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub name: CodableValue,
    pub when: Option<ApproximateDateTime>,
    pub anatomic_location: Option<CodableValue>,
    pub primary_provider: Option<PersonItem>,
    pub secondary_provider: Option<PersonItem>,
}

impl Procedure {
    pub fn new(name: impl Into<CodableValue>) -> Self {
        Self {
            name: name.into(),
            when: None,
            anatomic_location: None,
            primary_provider: None,
            secondary_provider: None,
        }
    }
}

impl ItemType for Procedure {
    const TYPE_ID: Uuid = Uuid::from_u128(0xdf4db479_a1ba_42a2_8714_2b083b88150f);
    const TYPE_NAME: &'static str = "Procedure";
    const ROOT_ELEMENT: &'static str = "procedure";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.as_ref()?.to_naive()
    }
}

impl FromXml for Procedure {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            name: node.required("name")?,
            when: node.optional("when")?,
            anatomic_location: node.optional("anatomic-location")?,
            primary_provider: node.optional("primary-provider")?,
            secondary_provider: node.optional("secondary-provider")?,
        })
    }
}

impl ToXml for Procedure {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("name", &self.name)?;
        writer.write_optional("when", &self.when)?;
        writer.write_optional("anatomic-location", &self.anatomic_location)?;
        writer.write_optional("primary-provider", &self.primary_provider)?;
        writer.write_optional("secondary-provider", &self.secondary_provider)?;
        writer.end_element()
    }
}

impl Validate for Procedure {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("name", &self.name)?;
        validate_optional("when", &self.when)?;
        validate_optional("anatomic-location", &self.anatomic_location)?;
        validate_optional("primary-provider", &self.primary_provider)?;
        validate_optional("secondary-provider", &self.secondary_provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Name;

    #[test]
    fn test_procedure_with_providers() {
        let xml = "<procedure><name><text>Appendectomy</text></name>\
            <when><structured><date><y>2010</y><m>8</m><d>3</d></date><time><h>14</h><m>0</m></time></structured></when>\
            <primary-provider><name><full>Dr. Lee</full></name></primary-provider></procedure>";
        let procedure = Procedure::from_item_xml(xml).unwrap();
        assert_eq!(
            procedure.primary_provider.as_ref().map(|p| p.name.full.as_str()),
            Some("Dr. Lee")
        );
        assert_eq!(procedure.effective_date().unwrap().to_string(), "2010-08-03 14:00:00");
        assert_eq!(procedure.to_item_xml().unwrap(), xml);
    }

    #[test]
    fn test_blank_provider_name() {
        let mut procedure = Procedure::new("Appendectomy");
        procedure.secondary_provider = Some(PersonItem::new(Name::new("")));
        assert_eq!(procedure.validate().unwrap_err().field(), "secondary-provider.name.full");
    }
}
