//! The thing envelope.
//!
//! A thing wraps one item with its key, type id, state, effective date and
//! the data common to every item (source, note, tags, related things).

use chrono::{DateTime, NaiveDateTime};
use hvt_serde::{FromXml, SerdeError, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::registry::ThingData;
use crate::validation::{
    Validate, ValidationError, require_text, validate_each, validate_field, validate_optional_text,
};

const THING: &str = "thing";
const EFF_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Identifies one version of a thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThingKey {
    pub id: Uuid,
    pub version_stamp: Option<Uuid>,
}

impl ThingKey {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version_stamp: None,
        }
    }

    pub fn with_version(mut self, version_stamp: Uuid) -> Self {
        self.version_stamp = Some(version_stamp);
        self
    }
}

impl FromXml for ThingKey {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        let version_stamp = match node.attribute("version-stamp") {
            Some(stamp) => Some(
                Uuid::parse_str(stamp.trim()).map_err(|e| node.invalid(stamp, e))?,
            ),
            None => None,
        };
        Ok(Self {
            id: node.parse_text()?,
            version_stamp,
        })
    }
}

impl ToXml for ThingKey {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        if let Some(stamp) = &self.version_stamp {
            writer.write_attribute("version-stamp", &stamp.to_string())?;
        }
        writer.write_string(&self.id.to_string())?;
        writer.end_element()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThingState {
    #[default]
    Active,
    Deleted,
}

impl fmt::Display for ThingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThingState::Active => f.write_str("Active"),
            ThingState::Deleted => f.write_str("Deleted"),
        }
    }
}

impl FromStr for ThingState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Active" => Ok(ThingState::Active),
            "Deleted" => Ok(ThingState::Deleted),
            other => Err(format!("unknown thing state '{}'", other)),
        }
    }
}

/// A link from one thing to another, by thing id or client id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThingRelationship {
    pub thing_id: Option<Uuid>,
    pub version_stamp: Option<Uuid>,
    pub client_id: Option<String>,
    pub relationship_type: Option<String>,
}

impl ThingRelationship {
    pub fn to_thing(thing_id: Uuid) -> Self {
        Self {
            thing_id: Some(thing_id),
            ..Self::default()
        }
    }

    pub fn to_client_id(client_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_type = Some(relationship_type.into());
        self
    }
}

fn optional_uuid(node: &XmlNode, name: &str) -> hvt_serde::Result<Option<Uuid>> {
    node.child(name).map(XmlNode::parse_text::<Uuid>).transpose()
}

impl FromXml for ThingRelationship {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            thing_id: optional_uuid(node, "thing-id")?,
            version_stamp: optional_uuid(node, "version-stamp")?,
            client_id: node.optional_text("client-thing-id"),
            relationship_type: node.optional_text("relationship-type"),
        })
    }
}

impl ToXml for ThingRelationship {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        if let Some(id) = &self.thing_id {
            writer.write_element_string("thing-id", &id.to_string())?;
        }
        if let Some(stamp) = &self.version_stamp {
            writer.write_element_string("version-stamp", &stamp.to_string())?;
        }
        writer.write_optional("client-thing-id", &self.client_id)?;
        writer.write_optional("relationship-type", &self.relationship_type)?;
        writer.end_element()
    }
}

impl Validate for ThingRelationship {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.thing_id.is_none() && self.client_id.is_none() {
            return Err(ValidationError::invalid(
                "",
                "either thing-id or client-thing-id is required",
            ));
        }
        if self.version_stamp.is_some() && self.thing_id.is_none() {
            return Err(ValidationError::invalid(
                "version-stamp",
                "a version stamp requires a thing-id",
            ));
        }
        validate_optional_text("client-thing-id", &self.client_id)?;
        validate_optional_text("relationship-type", &self.relationship_type)
    }
}

/// Data every item may carry, written as `<common>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonItemData {
    pub source: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub related_items: Vec<ThingRelationship>,
    pub client_id: Option<String>,
}

impl CommonItemData {
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.note.is_none()
            && self.tags.is_empty()
            && self.related_items.is_empty()
            && self.client_id.is_none()
    }
}

impl FromXml for CommonItemData {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        let tags: Vec<String> = node
            .optional_text("tags")
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            source: node.optional_text("source"),
            note: node.optional_text("note"),
            tags,
            related_items: node.repeated("related-thing")?,
            client_id: node.optional_text("client-thing-id"),
        })
    }
}

impl ToXml for CommonItemData {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write_optional("source", &self.source)?;
        writer.write_optional("note", &self.note)?;
        if !self.tags.is_empty() {
            writer.write_element_string("tags", &self.tags.join(","))?;
        }
        writer.write_repeated("related-thing", &self.related_items)?;
        writer.write_optional("client-thing-id", &self.client_id)?;
        writer.end_element()
    }
}

impl Validate for CommonItemData {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_optional_text("source", &self.source)?;
        validate_optional_text("note", &self.note)?;
        for (index, tag) in self.tags.iter().enumerate() {
            let field = format!("tags[{}]", index);
            require_text(&field, tag)?;
            if tag.contains(',') {
                return Err(ValidationError::invalid(&field, "tags must not contain commas"));
            }
        }
        validate_each("related-thing", &self.related_items)?;
        validate_optional_text("client-thing-id", &self.client_id)
    }
}

/// One item with its envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    pub key: Option<ThingKey>,
    #[serde(default)]
    pub state: ThingState,
    pub eff_date: Option<NaiveDateTime>,
    pub data: ThingData,
    #[serde(default)]
    pub common: CommonItemData,
}

impl Thing {
    pub fn new(data: impl Into<ThingData>) -> Self {
        Self {
            key: None,
            state: ThingState::Active,
            eff_date: None,
            data: data.into(),
            common: CommonItemData::default(),
        }
    }

    pub fn with_key(mut self, key: ThingKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_common(mut self, common: CommonItemData) -> Self {
        self.common = common;
        self
    }

    /// The item's own effective date, else the one stored on the envelope.
    pub fn effective_date(&self) -> Option<NaiveDateTime> {
        self.data.effective_date().or(self.eff_date)
    }

    pub fn from_xml_str(xml: &str) -> Result<Self> {
        Self::parse_xml(&XmlNode::parse_str(xml)?)
    }

    /// Reads a `<thing>` element, parsing and validating its item.
    pub fn parse_xml(node: &XmlNode) -> Result<Self> {
        if node.local_name() != THING {
            return Err(unexpected(THING, node).into());
        }
        let key: Option<ThingKey> = node.optional("thing-id")?;
        let type_id: Option<Uuid> = optional_uuid(node, "type-id")?;
        let state = match node.child("thing-state") {
            Some(state) => state.parse_text::<ThingState>()?,
            None => ThingState::Active,
        };
        let eff_date = node.child("eff-date").map(parse_eff_date).transpose()?;

        let data_xml = node.child("data-xml").ok_or_else(|| SerdeError::MissingElement {
            parent: node.name().to_string(),
            element: "data-xml".to_string(),
        })?;
        let item = data_xml
            .elements()
            .find(|element| element.local_name() != "common")
            .ok_or_else(|| SerdeError::MissingElement {
                parent: data_xml.name().to_string(),
                element: "item".to_string(),
            })?;
        let mut data = match type_id {
            Some(type_id) => ThingData::parse(type_id, item)?,
            None => ThingData::parse_by_element(item)?,
        };
        if let ThingData::Unknown { type_name, .. } = &mut data {
            *type_name = node
                .child("type-id")
                .and_then(|type_id| type_id.attribute("name"))
                .map(str::to_string);
        }
        let common: CommonItemData = data_xml.optional("common")?.unwrap_or_default();
        common.validate().map_err(|e| e.within("common"))?;
        debug!(type_id = %data.type_id(), element = item.name(), "parsed thing");

        Ok(Self {
            key,
            state,
            eff_date,
            data,
            common,
        })
    }

    /// Validates the thing and writes it as a `<thing>` element.
    pub fn write_xml(&self, writer: &mut XmlWriter) -> Result<()> {
        self.common.validate().map_err(|e| e.within("common"))?;
        writer.start_element(THING)?;
        writer.write_optional("thing-id", &self.key)?;

        writer.start_element("type-id")?;
        if let Some(name) = self.data.type_name() {
            writer.write_attribute("name", name)?;
        }
        writer.write_string(&self.data.type_id().to_string())?;
        writer.end_element()?;

        writer.write_element_string("thing-state", &self.state.to_string())?;
        if let Some(eff_date) = self.effective_date() {
            let eff_date = eff_date.format(EFF_DATE_FORMAT).to_string();
            writer.write_element_string("eff-date", &eff_date)?;
        }

        writer.start_element("data-xml")?;
        self.data.write_xml(writer)?;
        if !self.common.is_empty() {
            writer.write("common", &self.common)?;
        }
        writer.end_element()?;
        writer.end_element()?;
        debug!(type_id = %self.data.type_id(), element = self.data.root_element(), "wrote thing");
        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = XmlWriter::new();
        self.write_xml(&mut writer)?;
        Ok(writer.finish()?)
    }

    pub fn to_xml_string_pretty(&self) -> Result<String> {
        let mut writer = XmlWriter::pretty();
        self.write_xml(&mut writer)?;
        Ok(writer.finish()?)
    }
}

impl Validate for Thing {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_field("data-xml", &self.data)?;
        validate_field("common", &self.common)
    }
}

fn unexpected(expected: &str, node: &XmlNode) -> SerdeError {
    SerdeError::UnexpectedElement {
        expected: expected.to_string(),
        found: node.name().to_string(),
    }
}

fn parse_eff_date(node: &XmlNode) -> hvt_serde::Result<NaiveDateTime> {
    let text = node.text();
    NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| DateTime::parse_from_rfc3339(&text).map(|dt| dt.naive_local()))
        .map_err(|e| node.invalid(&text, e))
}

/// Reads a single `<thing>` or every `<thing>` child of a container element.
pub fn parse_things(xml: &str) -> Result<Vec<Thing>> {
    let root = XmlNode::parse_str(xml)?;
    if root.local_name() == THING {
        return Ok(vec![Thing::parse_xml(&root)?]);
    }
    let things = root
        .children(THING)
        .map(Thing::parse_xml)
        .collect::<Result<Vec<_>>>()?;
    debug!(count = things.len(), container = root.name(), "parsed things");
    Ok(things)
}
