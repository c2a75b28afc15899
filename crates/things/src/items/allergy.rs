//! Allergies and intolerances.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{ApproximateDateTime, CodableValue, PersonItem};
use crate::items::ItemType;
use crate::validation::{Validate, ValidationError, validate_field, validate_optional};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allergy {
    pub name: CodableValue,
    pub reaction: Option<CodableValue>,
    pub first_observed: Option<ApproximateDateTime>,
    /// Food, drug, environmental and so on.
    pub allergen_type: Option<CodableValue>,
    pub allergen_code: Option<CodableValue>,
    pub treatment_provider: Option<PersonItem>,
    pub treatment: Option<CodableValue>,
    /// True when recording that the person is *not* allergic.
    pub is_negated: Option<bool>,
}

impl Allergy {
    pub fn new(name: impl Into<CodableValue>) -> Self {
        Self {
            name: name.into(),
            reaction: None,
            first_observed: None,
            allergen_type: None,
            allergen_code: None,
            treatment_provider: None,
            treatment: None,
            is_negated: None,
        }
    }

    pub fn with_reaction(mut self, reaction: impl Into<CodableValue>) -> Self {
        self.reaction = Some(reaction.into());
        self
    }
}

impl ItemType for Allergy {
    const TYPE_ID: Uuid = Uuid::from_u128(0x52bf9104_2c5e_4f1f_a66d_552ebcc53df7);
    const TYPE_NAME: &'static str = "Allergy";
    const ROOT_ELEMENT: &'static str = "allergy";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.first_observed.as_ref()?.to_naive()
    }
}

impl FromXml for Allergy {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            name: node.required("name")?,
            reaction: node.optional("reaction")?,
            first_observed: node.optional("first-observed")?,
            allergen_type: node.optional("allergen-type")?,
            allergen_code: node.optional("allergen-code")?,
            treatment_provider: node.optional("treatment-provider")?,
            treatment: node.optional("treatment")?,
            is_negated: node.optional("is-negated")?,
        })
    }
}

impl ToXml for Allergy {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("name", &self.name)?;
        writer.write_optional("reaction", &self.reaction)?;
        writer.write_optional("first-observed", &self.first_observed)?;
        writer.write_optional("allergen-type", &self.allergen_type)?;
        writer.write_optional("allergen-code", &self.allergen_code)?;
        writer.write_optional("treatment-provider", &self.treatment_provider)?;
        writer.write_optional("treatment", &self.treatment)?;
        writer.write_optional("is-negated", &self.is_negated)?;
        writer.end_element()
    }
}

impl Validate for Allergy {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("name", &self.name)?;
        validate_optional("reaction", &self.reaction)?;
        validate_optional("first-observed", &self.first_observed)?;
        validate_optional("allergen-type", &self.allergen_type)?;
        validate_optional("allergen-code", &self.allergen_code)?;
        validate_optional("treatment-provider", &self.treatment_provider)?;
        validate_optional("treatment", &self.treatment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negated_allergy() {
        let xml = "<allergy><name><text>Penicillin</text></name>\
            <first-observed><descriptive>childhood</descriptive></first-observed>\
            <is-negated>1</is-negated></allergy>";
        let allergy = Allergy::from_item_xml(xml).unwrap();
        assert_eq!(allergy.is_negated, Some(true));
        assert_eq!(allergy.effective_date(), None);
        assert!(
            allergy
                .to_item_xml()
                .unwrap()
                .ends_with("<is-negated>true</is-negated></allergy>")
        );
    }

    #[test]
    fn test_blank_reaction() {
        let allergy = Allergy::new("Peanuts").with_reaction(" ");
        assert_eq!(allergy.validate().unwrap_err().field(), "reaction.text");
    }
}
