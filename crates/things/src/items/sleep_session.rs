//! Sleep journal entries.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{ApproximateTime, CodableValue, HealthServiceDateTime};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_non_negative, require_range, validate_each, validate_field,
    validate_optional,
};

/// A period awake during the night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Awakening {
    pub when: ApproximateTime,
    pub minutes: i32,
}

impl FromXml for Awakening {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            minutes: node.required("minutes")?,
        })
    }
}

impl ToXml for Awakening {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write("minutes", &self.minutes)?;
        writer.end_element()
    }
}

impl Validate for Awakening {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        require_non_negative("minutes", self.minutes)
    }
}

/// One night's sleep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSession {
    pub when: HealthServiceDateTime,
    pub bed_time: ApproximateTime,
    pub wake_time: ApproximateTime,
    pub sleep_minutes: i32,
    pub settling_minutes: i32,
    #[serde(default)]
    pub awakening: Vec<Awakening>,
    pub medications: Option<CodableValue>,
    /// 1 wide awake, 2 tired, 3 sleepy.
    pub wake_state: Option<i32>,
}

impl SleepSession {
    pub fn new(
        when: HealthServiceDateTime,
        bed_time: ApproximateTime,
        wake_time: ApproximateTime,
        sleep_minutes: i32,
        settling_minutes: i32,
    ) -> Self {
        Self {
            when,
            bed_time,
            wake_time,
            sleep_minutes,
            settling_minutes,
            awakening: Vec::new(),
            medications: None,
            wake_state: None,
        }
    }

    pub fn with_awakening(mut self, when: ApproximateTime, minutes: i32) -> Self {
        self.awakening.push(Awakening { when, minutes });
        self
    }

    /// Minutes spent awake after first falling asleep.
    pub fn minutes_awake(&self) -> i32 {
        self.awakening.iter().map(|a| a.minutes).sum()
    }
}

impl ItemType for SleepSession {
    const TYPE_ID: Uuid = Uuid::from_u128(0x11c52484_7f1a_11db_aeac_87d355d89593);
    const TYPE_NAME: &'static str = "Sleep Session";
    const ROOT_ELEMENT: &'static str = "sleep-session";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for SleepSession {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            bed_time: node.required("bed-time")?,
            wake_time: node.required("wake-time")?,
            sleep_minutes: node.required("sleep-minutes")?,
            settling_minutes: node.required("settling-minutes")?,
            awakening: node.repeated("awakening")?,
            medications: node.optional("medications")?,
            wake_state: node.optional("wake-state")?,
        })
    }
}

impl ToXml for SleepSession {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write("bed-time", &self.bed_time)?;
        writer.write("wake-time", &self.wake_time)?;
        writer.write("sleep-minutes", &self.sleep_minutes)?;
        writer.write("settling-minutes", &self.settling_minutes)?;
        writer.write_repeated("awakening", &self.awakening)?;
        writer.write_optional("medications", &self.medications)?;
        writer.write_optional("wake-state", &self.wake_state)?;
        writer.end_element()
    }
}

impl Validate for SleepSession {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        validate_field("bed-time", &self.bed_time)?;
        validate_field("wake-time", &self.wake_time)?;
        require_non_negative("sleep-minutes", self.sleep_minutes)?;
        require_non_negative("settling-minutes", self.settling_minutes)?;
        validate_each("awakening", &self.awakening)?;
        validate_optional("medications", &self.medications)?;
        if let Some(state) = self.wake_state {
            require_range("wake-state", state, 1, 3)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{HealthServiceDate, HealthServiceTime};

    fn night() -> SleepSession {
        SleepSession::new(
            HealthServiceDate::new(2024, 4, 20).into(),
            HealthServiceTime::new(22, 45),
            HealthServiceTime::new(6, 30),
            430,
            15,
        )
    }

    #[test]
    fn test_sleep_session_round_trip() {
        let mut session = night()
            .with_awakening(HealthServiceTime::new(2, 10), 12)
            .with_awakening(HealthServiceTime::new(4, 0), 5);
        session.wake_state = Some(2);
        let xml = session.to_item_xml().unwrap();
        assert!(xml.contains("<bed-time><h>22</h><m>45</m></bed-time>"));
        let parsed = SleepSession::from_item_xml(&xml).unwrap();
        assert_eq!(parsed.minutes_awake(), 17);
        assert_eq!(parsed, session);
    }

    #[test]
    fn test_wake_state_range() {
        let mut session = night();
        session.wake_state = Some(4);
        assert_eq!(session.validate().unwrap_err().field(), "wake-state");
    }

    #[test]
    fn test_negative_awakening() {
        let session = night().with_awakening(HealthServiceTime::new(3, 0), -1);
        assert_eq!(session.validate().unwrap_err().field(), "awakening[0].minutes");
    }
}
