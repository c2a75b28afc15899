//! The registry of item types.
//!
//! [`ThingData`] holds the item of a thing as one variant per registered
//! type. Items of types that are not registered are kept as raw XML so they
//! survive a read/write cycle unchanged.

use chrono::NaiveDateTime;
use hvt_serde::{SerdeError, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{Result, ThingError};
use crate::items::*;
use crate::validation::{Validate, ValidationError};

/// A registered item type, as listed by [`registered_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredType {
    pub type_id: Uuid,
    pub name: &'static str,
    pub root_element: &'static str,
}

macro_rules! thing_registry {
    ($($variant:ident),* $(,)?) => {
        /// The item carried by a thing.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", content = "data", rename_all = "camelCase")]
        pub enum ThingData {
            $($variant($variant),)*
            /// An item of a type with no registered model, kept verbatim.
            Unknown {
                type_id: Uuid,
                /// Name from the envelope's `<type-id name="...">`, if any.
                #[serde(default)]
                type_name: Option<String>,
                xml: XmlNode,
            },
        }

        impl ThingData {
            pub fn type_id(&self) -> Uuid {
                match self {
                    $(ThingData::$variant(_) => $variant::TYPE_ID,)*
                    ThingData::Unknown { type_id, .. } => *type_id,
                }
            }

            /// Registered type name, or the name an unknown type was read with.
            pub fn type_name(&self) -> Option<&str> {
                match self {
                    $(ThingData::$variant(_) => Some($variant::TYPE_NAME),)*
                    ThingData::Unknown { type_name, .. } => type_name.as_deref(),
                }
            }

            pub fn root_element(&self) -> &str {
                match self {
                    $(ThingData::$variant(_) => $variant::ROOT_ELEMENT,)*
                    ThingData::Unknown { xml, .. } => xml.name(),
                }
            }

            pub fn effective_date(&self) -> Option<NaiveDateTime> {
                match self {
                    $(ThingData::$variant(item) => item.effective_date(),)*
                    ThingData::Unknown { .. } => None,
                }
            }

            /// Reads the item registered under `type_id` from its root element.
            ///
            /// Unregistered type ids are preserved as [`ThingData::Unknown`].
            pub fn parse(type_id: Uuid, node: &XmlNode) -> Result<Self> {
                $(
                    if type_id == $variant::TYPE_ID {
                        return Ok(ThingData::$variant($variant::from_item_node(node)?));
                    }
                )*
                warn!(
                    %type_id,
                    element = node.name(),
                    "keeping item of unregistered type as raw XML"
                );
                Ok(ThingData::Unknown {
                    type_id,
                    type_name: None,
                    xml: node.clone(),
                })
            }

            /// Reads an item whose type is identified by its root element.
            pub fn parse_by_element(node: &XmlNode) -> Result<Self> {
                let element = node.local_name();
                $(
                    if element == $variant::ROOT_ELEMENT {
                        return Ok(ThingData::$variant($variant::from_item_node(node)?));
                    }
                )*
                Err(ThingError::UnknownElement(node.name().to_string()))
            }

            /// Validates and writes the item under its root element.
            pub fn write_xml(&self, writer: &mut XmlWriter) -> Result<()> {
                match self {
                    $(ThingData::$variant(item) => item.write_item(writer),)*
                    ThingData::Unknown { xml, .. } => Ok(writer.write_node(xml)?),
                }
            }
        }

        impl Validate for ThingData {
            fn validate(&self) -> std::result::Result<(), ValidationError> {
                match self {
                    $(ThingData::$variant(item) => item.validate(),)*
                    ThingData::Unknown { .. } => Ok(()),
                }
            }
        }

        $(
            impl From<$variant> for ThingData {
                fn from(item: $variant) -> Self {
                    ThingData::$variant(item)
                }
            }
        )*

        /// Every registered item type.
        pub fn registered_types() -> Vec<RegisteredType> {
            vec![
                $(RegisteredType {
                    type_id: $variant::TYPE_ID,
                    name: $variant::TYPE_NAME,
                    root_element: $variant::ROOT_ELEMENT,
                },)*
            ]
        }
    };
}

thing_registry!(
    Allergy,
    BloodGlucose,
    BloodPressure,
    BodyComposition,
    Condition,
    DietaryIntake,
    Exercise,
    HealthGoal,
    HeartRate,
    Height,
    Immunization,
    LabTestResults,
    Medication,
    PeakFlow,
    Procedure,
    SleepSession,
    VitalSigns,
    Weight,
);

/// Finds a registered type by name, root element or type id.
///
/// Names match ignoring ASCII case, with or without spaces, so `"Blood
/// Pressure"`, `"bloodpressure"` and `"blood-pressure"` are the same type.
pub fn find_type(name: &str) -> Option<RegisteredType> {
    let wanted = name.trim();
    let squash = |s: &str| {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase()
    };
    let id = Uuid::parse_str(wanted).ok();
    registered_types().into_iter().find(|t| {
        Some(t.type_id) == id
            || t.root_element == wanted
            || squash(t.name) == squash(wanted)
    })
}

/// Looks up a type id, failing with [`ThingError::UnknownType`] when no
/// item type is registered under it.
pub fn registered_type(type_id: Uuid) -> Result<RegisteredType> {
    registered_types()
        .into_iter()
        .find(|t| t.type_id == type_id)
        .ok_or(ThingError::UnknownType(type_id))
}

/// Reads a bare item fragment as the given registered type.
pub fn parse_as(registered: &RegisteredType, node: &XmlNode) -> Result<ThingData> {
    if node.local_name() != registered.root_element {
        return Err(SerdeError::UnexpectedElement {
            expected: registered.root_element.to_string(),
            found: node.name().to_string(),
        }
        .into());
    }
    ThingData::parse(registered.type_id, node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registered_types_are_unique() {
        let types = registered_types();
        assert_eq!(types.len(), 18);
        let ids: HashSet<_> = types.iter().map(|t| t.type_id).collect();
        let roots: HashSet<_> = types.iter().map(|t| t.root_element).collect();
        assert_eq!(ids.len(), types.len());
        assert_eq!(roots.len(), types.len());
    }

    #[test]
    fn test_parse_by_type_id() {
        let node =
            XmlNode::parse_str("<condition><name><text>Asthma</text></name></condition>").unwrap();
        let data = ThingData::parse(Condition::TYPE_ID, &node).unwrap();
        assert_eq!(data.type_name(), Some("Condition"));
        assert_eq!(data.root_element(), "condition");
    }

    #[test]
    fn test_type_id_and_element_mismatch() {
        let node =
            XmlNode::parse_str("<condition><name><text>Asthma</text></name></condition>").unwrap();
        let err = ThingData::parse(Weight::TYPE_ID, &node).unwrap_err();
        assert!(matches!(
            err,
            ThingError::Serde(SerdeError::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let type_id = Uuid::from_u128(0x1234);
        let node = XmlNode::parse_str(r#"<custom-item v="1"><x>1</x></custom-item>"#).unwrap();
        let data = ThingData::parse(type_id, &node).unwrap();
        assert_eq!(data.type_id(), type_id);
        assert_eq!(data.type_name(), None);
        let mut writer = XmlWriter::new();
        data.write_xml(&mut writer).unwrap();
        assert_eq!(writer.finish().unwrap(), r#"<custom-item v="1"><x>1</x></custom-item>"#);
    }

    #[test]
    fn test_parse_by_element() {
        let node =
            XmlNode::parse_str("<allergy><name><text>Pollen</text></name></allergy>").unwrap();
        assert!(matches!(ThingData::parse_by_element(&node).unwrap(), ThingData::Allergy(_)));

        let node = XmlNode::parse_str("<mystery/>").unwrap();
        assert!(matches!(
            ThingData::parse_by_element(&node),
            Err(ThingError::UnknownElement(name)) if name == "mystery"
        ));
    }

    #[test]
    fn test_find_type() {
        assert_eq!(find_type("Blood Pressure").unwrap().root_element, "blood-pressure");
        assert_eq!(find_type("bloodpressure").unwrap().name, "Blood Pressure");
        assert_eq!(find_type("lab-test-results").unwrap().name, "Lab Test Results");
        assert_eq!(
            find_type("3d34d87e-7fc1-4153-800f-f56592cb0d17").unwrap().name,
            "Weight"
        );
        assert!(find_type("teleportation").is_none());
    }

    #[test]
    fn test_registered_type_lookup() {
        assert_eq!(registered_type(Height::TYPE_ID).unwrap().name, "Height");
        let missing = Uuid::from_u128(7);
        assert!(matches!(
            registered_type(missing),
            Err(ThingError::UnknownType(id)) if id == missing
        ));
    }

    #[test]
    fn test_parse_as_checks_root() {
        let weight = find_type("weight").unwrap();
        let node = XmlNode::parse_str("<height/>").unwrap();
        assert!(parse_as(&weight, &node).is_err());
    }

    #[test]
    fn test_from_item() {
        let data: ThingData = Condition::new("Asthma").into();
        assert_eq!(data.type_id(), Condition::TYPE_ID);
    }
}
