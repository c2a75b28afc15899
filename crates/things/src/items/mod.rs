//! Item types.
//!
//! Each item type maps one element of the platform's item schema. Required
//! children are plain fields and optional ones are `Option` or `Vec`. The
//! [`ItemType`] trait ties a type to its registered type id and root element
//! and provides the parse-then-validate / validate-then-write entry points.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, SerdeError, ToXml, XmlNode, XmlWriter};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::validation::Validate;

pub mod allergy;
pub mod blood_glucose;
pub mod blood_pressure;
pub mod body_composition;
pub mod condition;
pub mod dietary_intake;
pub mod exercise;
pub mod health_goal;
pub mod heart_rate;
pub mod height;
pub mod immunization;
pub mod lab_test_results;
pub mod medication;
pub mod peak_flow;
pub mod procedure;
pub mod sleep_session;
pub mod vital_signs;
pub mod weight;

pub use allergy::Allergy;
pub use blood_glucose::BloodGlucose;
pub use blood_pressure::BloodPressure;
pub use body_composition::{BodyComposition, BodyCompositionValue};
pub use condition::Condition;
pub use dietary_intake::DietaryIntake;
pub use exercise::{Exercise, ExerciseDetail};
pub use health_goal::{GoalRange, GoalRecurrence, HealthGoal};
pub use heart_rate::HeartRate;
pub use height::Height;
pub use immunization::Immunization;
pub use lab_test_results::{
    LabTestResultDetails, LabTestResultGroup, LabTestResultValue, LabTestResults,
    TestResultRange,
};
pub use medication::{Medication, Prescription};
pub use peak_flow::PeakFlow;
pub use procedure::Procedure;
pub use sleep_session::{Awakening, SleepSession};
pub use vital_signs::{VitalSignResult, VitalSigns};
pub use weight::Weight;

/// A registered item type.
pub trait ItemType: FromXml + ToXml + Validate + Sized {
    /// Type id the platform registers the item under.
    const TYPE_ID: Uuid;
    /// Type name written in `<type-id name="...">`.
    const TYPE_NAME: &'static str;
    /// Root element of the item's XML.
    const ROOT_ELEMENT: &'static str;

    /// Date the item is effective from, taken from its primary timestamp.
    fn effective_date(&self) -> Option<NaiveDateTime> {
        None
    }

    /// Parses and validates an item from its root element.
    fn from_item_node(node: &XmlNode) -> Result<Self> {
        if node.local_name() != Self::ROOT_ELEMENT {
            return Err(SerdeError::UnexpectedElement {
                expected: Self::ROOT_ELEMENT.to_string(),
                found: node.name().to_string(),
            }
            .into());
        }
        let item = Self::from_xml(node)?;
        item.validate()?;
        debug!(type_name = Self::TYPE_NAME, "parsed item");
        Ok(item)
    }

    /// Parses and validates an item from an XML fragment.
    fn from_item_xml(xml: &str) -> Result<Self> {
        Self::from_item_node(&XmlNode::parse_str(xml)?)
    }

    /// Validates the item and writes it under its root element.
    fn write_item(&self, writer: &mut XmlWriter) -> Result<()> {
        self.validate()?;
        self.write_xml(Self::ROOT_ELEMENT, writer)?;
        debug!(type_name = Self::TYPE_NAME, "wrote item");
        Ok(())
    }

    /// Validates the item and returns its XML fragment.
    fn to_item_xml(&self) -> Result<String> {
        let mut writer = XmlWriter::new();
        self.write_item(&mut writer)?;
        Ok(writer.finish()?)
    }
}
