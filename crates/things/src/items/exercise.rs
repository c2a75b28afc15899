//! Exercise sessions.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{ApproximateDateTime, CodableValue, CodedValue, Length, StructuredMeasurement};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_non_negative, validate_each, validate_field,
    validate_optional, validate_optional_text,
};

/// An extra measured value, such as steps or average heart rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDetail {
    pub name: CodedValue,
    pub value: StructuredMeasurement,
}

impl ExerciseDetail {
    pub fn new(name: CodedValue, value: StructuredMeasurement) -> Self {
        Self { name, value }
    }
}

impl FromXml for ExerciseDetail {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            name: node.required("name")?,
            value: node.required("value")?,
        })
    }
}

impl ToXml for ExerciseDetail {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("name", &self.name)?;
        writer.write("value", &self.value)?;
        writer.end_element()
    }
}

impl Validate for ExerciseDetail {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("name", &self.name)?;
        validate_field("value", &self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub when: ApproximateDateTime,
    pub activity: CodableValue,
    pub title: Option<String>,
    pub distance: Option<Length>,
    /// Minutes.
    pub duration: Option<f64>,
    #[serde(default)]
    pub detail: Vec<ExerciseDetail>,
}

impl Exercise {
    pub fn new(when: ApproximateDateTime, activity: impl Into<CodableValue>) -> Self {
        Self {
            when,
            activity: activity.into(),
            title: None,
            distance: None,
            duration: None,
            detail: Vec::new(),
        }
    }

    pub fn with_distance(mut self, distance: Length) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_duration(mut self, minutes: f64) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn with_detail(mut self, detail: ExerciseDetail) -> Self {
        self.detail.push(detail);
        self
    }

    /// First detail whose name has the given code.
    pub fn detail(&self, code: &str) -> Option<&ExerciseDetail> {
        self.detail.iter().find(|d| d.name.value == code)
    }
}

impl ItemType for Exercise {
    const TYPE_ID: Uuid = Uuid::from_u128(0x85a21ddb_db20_4c65_8d30_33c899ccf612);
    const TYPE_NAME: &'static str = "Exercise";
    const ROOT_ELEMENT: &'static str = "exercise";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.to_naive()
    }
}

impl FromXml for Exercise {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            when: node.required("when")?,
            activity: node.required("activity")?,
            title: node.optional_text("title"),
            distance: node.optional("distance")?,
            duration: node.optional("duration")?,
            detail: node.repeated("detail")?,
        })
    }
}

impl ToXml for Exercise {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("when", &self.when)?;
        writer.write("activity", &self.activity)?;
        writer.write_optional("title", &self.title)?;
        writer.write_optional("distance", &self.distance)?;
        writer.write_optional("duration", &self.duration)?;
        writer.write_repeated("detail", &self.detail)?;
        writer.end_element()
    }
}

impl Validate for Exercise {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("when", &self.when)?;
        validate_field("activity", &self.activity)?;
        validate_optional_text("title", &self.title)?;
        validate_optional("distance", &self.distance)?;
        if let Some(minutes) = self.duration {
            require_non_negative("duration", minutes)?;
        }
        validate_each("detail", &self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ApproximateDate;

    #[test]
    fn test_exercise_round_trip() {
        let run = Exercise::new(
            ApproximateDateTime::structured(ApproximateDate::ymd(2024, 9, 1)),
            "Running",
        )
        .with_distance(Length::from_display(5.0, "km").unwrap())
        .with_duration(27.5)
        .with_detail(ExerciseDetail::new(
            CodedValue::new("Steps_count", "exercise-detail-names").with_family("wc"),
            StructuredMeasurement::new(6100.0, "Count"),
        ));
        let xml = run.to_item_xml().unwrap();
        assert!(xml.contains("<distance><m>5000</m>"));
        let parsed = Exercise::from_item_xml(&xml).unwrap();
        assert_eq!(parsed, run);
        assert_eq!(parsed.detail("Steps_count").map(|d| d.value.value), Some(6100.0));
    }

    #[test]
    fn test_negative_duration() {
        let walk = Exercise::new(ApproximateDateTime::descriptive("yesterday"), "Walking")
            .with_duration(-5.0);
        assert_eq!(walk.validate().unwrap_err().field(), "duration");
    }

    #[test]
    fn test_infinite_duration() {
        let walk = Exercise::new(ApproximateDateTime::descriptive("yesterday"), "Walking")
            .with_duration(f64::INFINITY);
        assert_eq!(walk.validate().unwrap_err().field(), "duration");
        assert!(walk.to_item_xml().is_err());
    }
}
