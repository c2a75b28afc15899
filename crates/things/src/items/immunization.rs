//! Immunizations.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{ApproximateDate, ApproximateDateTime, CodableValue, PersonItem};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, validate_field, validate_optional, validate_optional_text,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Immunization {
    pub name: CodableValue,
    pub administration_date: Option<ApproximateDateTime>,
    pub administrator: Option<PersonItem>,
    pub manufacturer: Option<CodableValue>,
    pub lot: Option<String>,
    pub route: Option<CodableValue>,
    pub expiration_date: Option<ApproximateDate>,
    /// Dose in a series, e.g. "2 of 3".
    pub sequence: Option<String>,
    pub anatomic_surface: Option<CodableValue>,
    pub adverse_event: Option<String>,
    pub consent: Option<String>,
}

impl Immunization {
    pub fn new(name: impl Into<CodableValue>) -> Self {
        Self {
            name: name.into(),
            administration_date: None,
            administrator: None,
            manufacturer: None,
            lot: None,
            route: None,
            expiration_date: None,
            sequence: None,
            anatomic_surface: None,
            adverse_event: None,
            consent: None,
        }
    }

    pub fn administered(mut self, date: ApproximateDateTime) -> Self {
        self.administration_date = Some(date);
        self
    }
}

impl ItemType for Immunization {
    const TYPE_ID: Uuid = Uuid::from_u128(0xcd3587b5_b6e1_4565_ab3b_1c3ad45eb04f);
    const TYPE_NAME: &'static str = "Immunization";
    const ROOT_ELEMENT: &'static str = "immunization";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.administration_date.as_ref()?.to_naive()
    }
}

impl FromXml for Immunization {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            name: node.required("name")?,
            administration_date: node.optional("administration-date")?,
            administrator: node.optional("administrator")?,
            manufacturer: node.optional("manufacturer")?,
            lot: node.optional_text("lot"),
            route: node.optional("route")?,
            expiration_date: node.optional("expiration-date")?,
            sequence: node.optional_text("sequence"),
            anatomic_surface: node.optional("anatomic-surface")?,
            adverse_event: node.optional_text("adverse-event"),
            consent: node.optional_text("consent"),
        })
    }
}

impl ToXml for Immunization {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("name", &self.name)?;
        writer.write_optional("administration-date", &self.administration_date)?;
        writer.write_optional("administrator", &self.administrator)?;
        writer.write_optional("manufacturer", &self.manufacturer)?;
        writer.write_optional("lot", &self.lot)?;
        writer.write_optional("route", &self.route)?;
        writer.write_optional("expiration-date", &self.expiration_date)?;
        writer.write_optional("sequence", &self.sequence)?;
        writer.write_optional("anatomic-surface", &self.anatomic_surface)?;
        writer.write_optional("adverse-event", &self.adverse_event)?;
        writer.write_optional("consent", &self.consent)?;
        writer.end_element()
    }
}

impl Validate for Immunization {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("name", &self.name)?;
        validate_optional("administration-date", &self.administration_date)?;
        validate_optional("administrator", &self.administrator)?;
        validate_optional("manufacturer", &self.manufacturer)?;
        validate_optional_text("lot", &self.lot)?;
        validate_optional("route", &self.route)?;
        validate_optional("expiration-date", &self.expiration_date)?;
        validate_optional_text("sequence", &self.sequence)?;
        validate_optional("anatomic-surface", &self.anatomic_surface)?;
        validate_optional_text("adverse-event", &self.adverse_event)?;
        validate_optional_text("consent", &self.consent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immunization_round_trip() {
        let mut shot = Immunization::new("Influenza vaccine")
            .administered(ApproximateDateTime::structured(ApproximateDate::ymd(2023, 10, 12)));
        shot.lot = Some("FL-2231".to_string());
        shot.expiration_date = Some(ApproximateDate::year_month(2024, 6));
        let xml = shot.to_item_xml().unwrap();
        assert!(
            xml.contains("<lot>FL-2231</lot><expiration-date><y>2024</y><m>6</m></expiration-date>")
        );
        let parsed = Immunization::from_item_xml(&xml).unwrap();
        assert_eq!(parsed, shot);
        assert_eq!(parsed.effective_date().unwrap().to_string(), "2023-10-12 00:00:00");
    }

    #[test]
    fn test_bad_expiration_month() {
        let mut shot = Immunization::new("Tetanus");
        shot.expiration_date = Some(ApproximateDate::year_month(2024, 0));
        assert_eq!(shot.validate().unwrap_err().field(), "expiration-date.m");
    }
}
