//! Medications and prescriptions.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::dates::require_ordered;
use crate::base::{
    ApproximateDateTime, CodableValue, GeneralMeasurement, HealthServiceDate, PersonItem,
};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_non_negative, require_positive, validate_field,
    validate_optional,
};

/// The prescription a medication was dispensed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub prescribed_by: PersonItem,
    pub date_prescribed: Option<ApproximateDateTime>,
    pub amount_prescribed: Option<GeneralMeasurement>,
    /// Whether a generic may be substituted.
    pub substitution: Option<CodableValue>,
    pub refills: Option<i32>,
    pub days_supply: Option<i32>,
    pub prescription_expiration: Option<HealthServiceDate>,
    pub instructions: Option<CodableValue>,
}

impl Prescription {
    pub fn new(prescribed_by: PersonItem) -> Self {
        Self {
            prescribed_by,
            date_prescribed: None,
            amount_prescribed: None,
            substitution: None,
            refills: None,
            days_supply: None,
            prescription_expiration: None,
            instructions: None,
        }
    }
}

impl FromXml for Prescription {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            prescribed_by: node.required("prescribed-by")?,
            date_prescribed: node.optional("date-prescribed")?,
            amount_prescribed: node.optional("amount-prescribed")?,
            substitution: node.optional("substitution")?,
            refills: node.optional("refills")?,
            days_supply: node.optional("days-supply")?,
            prescription_expiration: node.optional("prescription-expiration")?,
            instructions: node.optional("instructions")?,
        })
    }
}

impl ToXml for Prescription {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("prescribed-by", &self.prescribed_by)?;
        writer.write_optional("date-prescribed", &self.date_prescribed)?;
        writer.write_optional("amount-prescribed", &self.amount_prescribed)?;
        writer.write_optional("substitution", &self.substitution)?;
        writer.write_optional("refills", &self.refills)?;
        writer.write_optional("days-supply", &self.days_supply)?;
        writer.write_optional("prescription-expiration", &self.prescription_expiration)?;
        writer.write_optional("instructions", &self.instructions)?;
        writer.end_element()
    }
}

impl Validate for Prescription {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("prescribed-by", &self.prescribed_by)?;
        validate_optional("date-prescribed", &self.date_prescribed)?;
        validate_optional("amount-prescribed", &self.amount_prescribed)?;
        validate_optional("substitution", &self.substitution)?;
        if let Some(refills) = self.refills {
            require_non_negative("refills", refills)?;
        }
        if let Some(days) = self.days_supply {
            require_positive("days-supply", days)?;
        }
        validate_optional("prescription-expiration", &self.prescription_expiration)?;
        validate_optional("instructions", &self.instructions)
    }
}

/// A medication the person takes or has taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub name: CodableValue,
    pub generic_name: Option<CodableValue>,
    pub dose: Option<GeneralMeasurement>,
    pub strength: Option<GeneralMeasurement>,
    pub frequency: Option<GeneralMeasurement>,
    pub route: Option<CodableValue>,
    pub indication: Option<CodableValue>,
    pub date_started: Option<ApproximateDateTime>,
    pub date_discontinued: Option<ApproximateDateTime>,
    /// Who prescribed it, e.g. a physician or self.
    pub prescribed: Option<CodableValue>,
    pub prescription: Option<Prescription>,
}

impl Medication {
    pub fn new(name: impl Into<CodableValue>) -> Self {
        Self {
            name: name.into(),
            generic_name: None,
            dose: None,
            strength: None,
            frequency: None,
            route: None,
            indication: None,
            date_started: None,
            date_discontinued: None,
            prescribed: None,
            prescription: None,
        }
    }

    pub fn with_dose(mut self, dose: GeneralMeasurement) -> Self {
        self.dose = Some(dose);
        self
    }

    pub fn with_strength(mut self, strength: GeneralMeasurement) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn with_prescription(mut self, prescription: Prescription) -> Self {
        self.prescription = Some(prescription);
        self
    }
}

impl ItemType for Medication {
    const TYPE_ID: Uuid = Uuid::from_u128(0x30cafccc_047d_4288_94ef_643571f7919d);
    const TYPE_NAME: &'static str = "Medication";
    const ROOT_ELEMENT: &'static str = "medication";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.date_started.as_ref()?.to_naive()
    }
}

impl FromXml for Medication {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            name: node.required("name")?,
            generic_name: node.optional("generic-name")?,
            dose: node.optional("dose")?,
            strength: node.optional("strength")?,
            frequency: node.optional("frequency")?,
            route: node.optional("route")?,
            indication: node.optional("indication")?,
            date_started: node.optional("date-started")?,
            date_discontinued: node.optional("date-discontinued")?,
            prescribed: node.optional("prescribed")?,
            prescription: node.optional("prescription")?,
        })
    }
}

impl ToXml for Medication {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("name", &self.name)?;
        writer.write_optional("generic-name", &self.generic_name)?;
        writer.write_optional("dose", &self.dose)?;
        writer.write_optional("strength", &self.strength)?;
        writer.write_optional("frequency", &self.frequency)?;
        writer.write_optional("route", &self.route)?;
        writer.write_optional("indication", &self.indication)?;
        writer.write_optional("date-started", &self.date_started)?;
        writer.write_optional("date-discontinued", &self.date_discontinued)?;
        writer.write_optional("prescribed", &self.prescribed)?;
        writer.write_optional("prescription", &self.prescription)?;
        writer.end_element()
    }
}

impl Validate for Medication {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("name", &self.name)?;
        validate_optional("generic-name", &self.generic_name)?;
        validate_optional("dose", &self.dose)?;
        validate_optional("strength", &self.strength)?;
        validate_optional("frequency", &self.frequency)?;
        validate_optional("route", &self.route)?;
        validate_optional("indication", &self.indication)?;
        validate_optional("date-started", &self.date_started)?;
        validate_optional("date-discontinued", &self.date_discontinued)?;
        require_ordered("date-discontinued", &self.date_started, &self.date_discontinued)?;
        validate_optional("prescribed", &self.prescribed)?;
        validate_optional("prescription", &self.prescription)
    }
}
