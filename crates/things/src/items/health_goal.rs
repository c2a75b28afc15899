//! Health goals.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::dates::require_ordered;
use crate::base::{ApproximateDateTime, CodableValue, GeneralMeasurement};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_positive, validate_each, validate_field, validate_optional,
    validate_optional_text,
};

/// A named target band, e.g. "in range" or "excellent".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRange {
    pub name: CodableValue,
    pub description: Option<String>,
    pub minimum: Option<GeneralMeasurement>,
    pub maximum: Option<GeneralMeasurement>,
}

impl GoalRange {
    pub fn new(name: impl Into<CodableValue>) -> Self {
        Self {
            name: name.into(),
            description: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn between(mut self, minimum: GeneralMeasurement, maximum: GeneralMeasurement) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }
}

impl FromXml for GoalRange {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            name: node.required("name")?,
            description: node.optional_text("description"),
            minimum: node.optional("minimum")?,
            maximum: node.optional("maximum")?,
        })
    }
}

impl ToXml for GoalRange {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("name", &self.name)?;
        writer.write_optional("description", &self.description)?;
        writer.write_optional("minimum", &self.minimum)?;
        writer.write_optional("maximum", &self.maximum)?;
        writer.end_element()
    }
}

impl Validate for GoalRange {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("name", &self.name)?;
        validate_optional_text("description", &self.description)?;
        validate_optional("minimum", &self.minimum)?;
        validate_optional("maximum", &self.maximum)
    }
}

/// How often the goal should be met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecurrence {
    /// Day, week, month and so on.
    pub interval: CodableValue,
    pub times_in_interval: i32,
}

impl FromXml for GoalRecurrence {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            interval: node.required("interval")?,
            times_in_interval: node.required("times-in-interval")?,
        })
    }
}

impl ToXml for GoalRecurrence {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("interval", &self.interval)?;
        writer.write("times-in-interval", &self.times_in_interval)?;
        writer.end_element()
    }
}

impl Validate for GoalRecurrence {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("interval", &self.interval)?;
        require_positive("times-in-interval", self.times_in_interval)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthGoal {
    pub name: CodableValue,
    pub description: Option<String>,
    pub start_date: Option<ApproximateDateTime>,
    pub end_date: Option<ApproximateDateTime>,
    pub target_range: Option<GoalRange>,
    #[serde(default)]
    pub goal_additional_ranges: Vec<GoalRange>,
    pub recurrence: Option<GoalRecurrence>,
}

impl HealthGoal {
    pub fn new(name: impl Into<CodableValue>) -> Self {
        Self {
            name: name.into(),
            description: None,
            start_date: None,
            end_date: None,
            target_range: None,
            goal_additional_ranges: Vec::new(),
            recurrence: None,
        }
    }

    pub fn between_dates(mut self, start: ApproximateDateTime, end: ApproximateDateTime) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_target(mut self, range: GoalRange) -> Self {
        self.target_range = Some(range);
        self
    }

    pub fn recurring(mut self, interval: impl Into<CodableValue>, times_in_interval: i32) -> Self {
        self.recurrence = Some(GoalRecurrence {
            interval: interval.into(),
            times_in_interval,
        });
        self
    }
}

impl ItemType for HealthGoal {
    const TYPE_ID: Uuid = Uuid::from_u128(0xdad8bb47_9ad0_4f09_92bc_7b2fd4034ec4);
    const TYPE_NAME: &'static str = "Health Goal";
    const ROOT_ELEMENT: &'static str = "health-goal";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.start_date.as_ref()?.to_naive()
    }
}

impl FromXml for HealthGoal {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            name: node.required("name")?,
            description: node.optional_text("description"),
            start_date: node.optional("start-date")?,
            end_date: node.optional("end-date")?,
            target_range: node.optional("target-range")?,
            goal_additional_ranges: node.repeated("goal-additional-ranges")?,
            recurrence: node.optional("recurrence")?,
        })
    }
}

impl ToXml for HealthGoal {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("name", &self.name)?;
        writer.write_optional("description", &self.description)?;
        writer.write_optional("start-date", &self.start_date)?;
        writer.write_optional("end-date", &self.end_date)?;
        writer.write_optional("target-range", &self.target_range)?;
        writer.write_repeated("goal-additional-ranges", &self.goal_additional_ranges)?;
        writer.write_optional("recurrence", &self.recurrence)?;
        writer.end_element()
    }
}

impl Validate for HealthGoal {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("name", &self.name)?;
        validate_optional_text("description", &self.description)?;
        validate_optional("start-date", &self.start_date)?;
        validate_optional("end-date", &self.end_date)?;
        require_ordered("end-date", &self.start_date, &self.end_date)?;
        validate_optional("target-range", &self.target_range)?;
        validate_each("goal-additional-ranges", &self.goal_additional_ranges)?;
        validate_optional("recurrence", &self.recurrence)
    }
}
