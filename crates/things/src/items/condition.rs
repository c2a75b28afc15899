//! Conditions and diagnoses.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::dates::require_ordered;
use crate::base::{ApproximateDateTime, CodableValue};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, validate_field, validate_optional, validate_optional_text,
};

/// A medical condition, problem or diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub name: CodableValue,
    pub onset_date: Option<ApproximateDateTime>,
    pub status: Option<CodableValue>,
    pub stop_date: Option<ApproximateDateTime>,
    pub stop_reason: Option<String>,
}

impl Condition {
    pub fn new(name: impl Into<CodableValue>) -> Self {
        Self {
            name: name.into(),
            onset_date: None,
            status: None,
            stop_date: None,
            stop_reason: None,
        }
    }

    pub fn with_onset(mut self, onset: ApproximateDateTime) -> Self {
        self.onset_date = Some(onset);
        self
    }

    pub fn with_status(mut self, status: impl Into<CodableValue>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn resolved(mut self, stop_date: ApproximateDateTime, reason: impl Into<String>) -> Self {
        self.stop_date = Some(stop_date);
        self.stop_reason = Some(reason.into());
        self
    }
}

impl ItemType for Condition {
    const TYPE_ID: Uuid = Uuid::from_u128(0x7ea7a1f9_880b_4bd4_b593_f5660f20eda8);
    const TYPE_NAME: &'static str = "Condition";
    const ROOT_ELEMENT: &'static str = "condition";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.onset_date.as_ref()?.to_naive()
    }
}

impl FromXml for Condition {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            name: node.required("name")?,
            onset_date: node.optional("onset-date")?,
            status: node.optional("status")?,
            stop_date: node.optional("stop-date")?,
            stop_reason: node.optional_text("stop-reason"),
        })
    }
}

impl ToXml for Condition {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("name", &self.name)?;
        writer.write_optional("onset-date", &self.onset_date)?;
        writer.write_optional("status", &self.status)?;
        writer.write_optional("stop-date", &self.stop_date)?;
        writer.write_optional("stop-reason", &self.stop_reason)?;
        writer.end_element()
    }
}

impl Validate for Condition {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("name", &self.name)?;
        validate_optional("onset-date", &self.onset_date)?;
        validate_optional("status", &self.status)?;
        validate_optional("stop-date", &self.stop_date)?;
        require_ordered("stop-date", &self.onset_date, &self.stop_date)?;
        validate_optional_text("stop-reason", &self.stop_reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ApproximateDate, CodedValue};

    #[test]
    fn test_condition_round_trip() {
        let condition = Condition::new(
            CodableValue::new("Asthma").with_code(CodedValue::new("195967001", "SnomedCT")),
        )
        .with_onset(ApproximateDateTime::structured(ApproximateDate::year(1998)))
        .with_status("active");
        let xml = condition.to_item_xml().unwrap();
        assert_eq!(
            xml,
            "<condition><name><text>Asthma</text><code><value>195967001</value><type>SnomedCT</type></code></name>\
             <onset-date><structured><date><y>1998</y></date></structured></onset-date>\
             <status><text>active</text></status></condition>"
        );
        let parsed = Condition::from_item_xml(&xml).unwrap();
        assert_eq!(parsed, condition);
        assert_eq!(parsed.effective_date().unwrap().to_string(), "1998-01-01 00:00:00");
    }

    #[test]
    fn test_stop_before_onset() {
        let condition = Condition::new("Sprain")
            .with_onset(ApproximateDateTime::structured(ApproximateDate::ymd(2024, 3, 2)))
            .resolved(
                ApproximateDateTime::structured(ApproximateDate::ymd(2024, 3, 1)),
                "healed",
            );
        assert_eq!(condition.validate().unwrap_err().field(), "stop-date");
    }

    #[test]
    fn test_name_is_required() {
        let err =
            Condition::from_item_xml("<condition><status><text>active</text></status></condition>")
                .unwrap_err();
        assert!(err.to_string().contains("<name>"));
    }
}
