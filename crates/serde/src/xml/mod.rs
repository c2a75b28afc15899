//! XML reading and writing for item types.
//!
//! Item XML is element-centric: each field is a child element, leaves carry
//! their value as text, and a few value types (display values, thing ids)
//! add attributes:
//!
//! ```xml
//! <weight>
//!   <when>
//!     <date><y>2024</y><m>1</m><d>2</d></date>
//!   </when>
//!   <value>
//!     <kg>70</kg>
//!     <display units="lb" units-code="lb">154.3</display>
//!   </value>
//! </weight>
//! ```
//!
//! ## Reading
//!
//! [`XmlNode::parse_str`] builds an owned element tree. Types implement
//! [`FromXml`] and pull their fields with `required`, `optional` and
//! `repeated`, or walk paths with [`XmlNode::select`].
//!
//! ## Writing
//!
//! [`XmlWriter`] is forward-only: `start_element`, `write_attribute`,
//! `write_string`, `end_element`. Types implement [`ToXml`], which receives
//! the element name from the caller so the same value type can appear under
//! different field names.

pub mod navigator;
pub mod writer;
mod utils;

pub use navigator::{FromXml, XmlContent, XmlNode};
pub use writer::{ToXml, XmlWriter};

/// Parses a document and converts its root element.
pub fn from_xml_str<T: FromXml>(xml: &str) -> crate::Result<T> {
    T::from_xml(&XmlNode::parse_str(xml)?)
}

/// Writes a value as the root element `name` of a compact document.
pub fn to_xml_string<T: ToXml + ?Sized>(name: &str, value: &T) -> crate::Result<String> {
    let mut writer = XmlWriter::new();
    value.write_xml(name, &mut writer)?;
    writer.finish()
}
