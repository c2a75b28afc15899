//! Peak flow and spirometry.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{ApproximateDateTime, CodableValue, FlowValue, VolumeValue};
use crate::items::ItemType;
use crate::validation::{Validate, ValidationError, validate_field, validate_optional};

/// A peak expiratory flow reading with optional forced expiratory volumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakFlow {
    pub when: ApproximateDateTime,
    pub pef: Option<FlowValue>,
    /// Volume exhaled in the first second.
    pub fev1: Option<VolumeValue>,
    /// Volume exhaled in the first six seconds.
    pub fev6: Option<VolumeValue>,
    pub measurement_flags: Option<CodableValue>,
}

impl PeakFlow {
    pub fn new(when: ApproximateDateTime) -> Self {
        Self {
            when,
            pef: None,
            fev1: None,
            fev6: None,
            measurement_flags: None,
        }
    }

    pub fn with_pef(mut self, pef: FlowValue) -> Self {
        self.pef = Some(pef);
        self
    }
}

impl ItemType for PeakFlow {
    const TYPE_ID: Uuid = Uuid::from_u128(0x5d8419af_90f0_4875_a370_0f881c18f6b3);
    const TYPE_NAME: &'static str = "Peak Flow Measurement";
    const ROOT_ELEMENT: &'static str = "peak-flow";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for PeakFlow {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            pef: node.optional("pef")?,
            fev1: node.optional("fev1")?,
            fev6: node.optional("fev6")?,
            measurement_flags: node.optional("measurement-flags")?,
        })
    }
}

impl ToXml for PeakFlow {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write_optional("pef", &self.pef)?;
        writer.write_optional("fev1", &self.fev1)?;
        writer.write_optional("fev6", &self.fev6)?;
        writer.write_optional("measurement-flags", &self.measurement_flags)?;
        writer.end_element()
    }
}

impl Validate for PeakFlow {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        validate_optional("pef", &self.pef)?;
        validate_optional("fev1", &self.fev1)?;
        validate_optional("fev6", &self.fev6)?;
        validate_optional("measurement-flags", &self.measurement_flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ApproximateDate, HealthServiceTime};

    #[test]
    fn test_peak_flow_in_liters_per_minute() {
        let when =
            ApproximateDateTime::at(ApproximateDate::ymd(2024, 1, 5), HealthServiceTime::new(9, 0));
        let flow = PeakFlow::new(when).with_pef(FlowValue::from_display(450.0, "L/min").unwrap());
        assert!((flow.pef.as_ref().unwrap().value - 7.5).abs() < 1e-9);
        let xml = flow.to_item_xml().unwrap();
        assert!(xml.contains("<liters-per-second>"));
        assert_eq!(PeakFlow::from_item_xml(&xml).unwrap(), flow);
        assert_eq!(flow.effective_date().unwrap().to_string(), "2024-01-05 09:00:00");
    }

    #[test]
    fn test_descriptive_when_has_no_effective_date() {
        let flow = PeakFlow::new(ApproximateDateTime::descriptive("this morning"));
        assert!(flow.validate().is_ok());
        assert_eq!(flow.effective_date(), None);
    }
}
