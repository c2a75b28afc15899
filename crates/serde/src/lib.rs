//! # HVT serialization
//!
//! XML and JSON plumbing for health-record item types.
//!
//! - **XML reading**: [`xml::XmlNode`] is a navigable element tree built with
//!   quick-xml. Item types implement [`xml::FromXml`] on top of it.
//! - **XML writing**: [`xml::XmlWriter`] is a forward-only writer. Item types
//!   implement [`xml::ToXml`] against it.
//! - **JSON**: thin wrappers around `serde_json` for the serde derives every
//!   model type carries.
//!
//! ## Example
//!
//! ```
//! use hvt_serde::xml::{XmlNode, XmlWriter};
//!
//! let node = XmlNode::parse_str("<height><value><m>1.8</m></value></height>").unwrap();
//! let meters: f64 = node.select("value/m").unwrap().parse_text().unwrap();
//!
//! let mut writer = XmlWriter::new();
//! writer.start_element("height").unwrap();
//! writer.start_element("value").unwrap();
//! writer.write("m", &meters).unwrap();
//! writer.end_element().unwrap();
//! writer.end_element().unwrap();
//! assert_eq!(writer.finish().unwrap(), "<height><value><m>1.8</m></value></height>");
//! ```

pub mod error;
pub mod json;
pub mod xml;

pub use error::{Result, SerdeError};

pub use json::{
    from_json_str, from_json_value, to_json_string, to_json_string_pretty, to_json_value,
};

pub use xml::{FromXml, ToXml, XmlNode, XmlWriter, from_xml_str, to_xml_string};
