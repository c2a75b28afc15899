//! Forward-only XML writer.
//!
//! [`XmlWriter`] wraps a quick-xml `Writer` with the element/attribute/text
//! call sequence item types use to emit their schema fragments. A start tag
//! is held back until the first content arrives, so attributes can still be
//! added and elements that end up empty are written as `<name/>`.

use crate::error::{Result, SerdeError};
use crate::xml::navigator::{XmlContent, XmlNode};
use crate::xml::utils;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Conversion of a typed value into an XML element.
pub trait ToXml {
    /// Writes the value as an element called `name`.
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> Result<()>;
}

/// Forward-only XML writer over an in-memory buffer.
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
    /// Names of the elements opened and not yet closed
    open: Vec<String>,
    /// Start tag that has not been written yet
    pending: Option<BytesStart<'static>>,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    /// Creates a writer producing compact output.
    pub fn new() -> Self {
        Self::from_writer(Writer::new(Vec::new()))
    }

    /// Creates a writer producing output indented by two spaces.
    pub fn pretty() -> Self {
        Self::from_writer(Writer::new_with_indent(Vec::new(), b' ', 2))
    }

    fn from_writer(writer: Writer<Vec<u8>>) -> Self {
        Self {
            writer,
            open: Vec::new(),
            pending: None,
        }
    }

    /// Writes the `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    pub fn write_declaration(&mut self) -> Result<()> {
        if !self.open.is_empty() {
            return Err(SerdeError::Custom(
                "XML declaration must precede the root element".to_string(),
            ));
        }
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    /// Opens an element.
    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.flush_pending()?;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
        Ok(())
    }

    /// Adds an attribute to the element just opened.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(SerdeError::Custom(format!(
                "attribute '{}' written outside a start tag",
                name
            ))),
        }
    }

    /// Writes escaped text content. Empty text leaves the element empty.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        if self.open.is_empty() {
            return Err(SerdeError::Custom(
                "text written outside the root element".to_string(),
            ));
        }
        if text.is_empty() {
            return Ok(());
        }
        self.flush_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Closes the innermost open element.
    pub fn end_element(&mut self) -> Result<()> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| SerdeError::Custom("no open element to end".to_string()))?;
        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self.writer.write_event(Event::End(BytesEnd::new(name)))?,
        }
        Ok(())
    }

    /// Writes `<name>text</name>`.
    pub fn write_element_string(&mut self, name: &str, text: &str) -> Result<()> {
        self.start_element(name)?;
        self.write_string(text)?;
        self.end_element()
    }

    /// Writes a value as element `name`.
    pub fn write<T: ToXml + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        value.write_xml(name, self)
    }

    /// Writes element `name` only when the value is present.
    pub fn write_optional<T: ToXml>(&mut self, name: &str, value: &Option<T>) -> Result<()> {
        match value {
            Some(value) => value.write_xml(name, self),
            None => Ok(()),
        }
    }

    /// Writes one element `name` per value.
    pub fn write_repeated<T: ToXml>(&mut self, name: &str, values: &[T]) -> Result<()> {
        for value in values {
            value.write_xml(name, self)?;
        }
        Ok(())
    }

    /// Copies a parsed element, with its attributes and content, verbatim.
    pub fn write_node(&mut self, node: &XmlNode) -> Result<()> {
        self.write_node_as(node.name(), node)
    }

    fn write_node_as(&mut self, name: &str, node: &XmlNode) -> Result<()> {
        self.start_element(name)?;
        for (key, value) in node.attributes() {
            self.write_attribute(key, value)?;
        }
        for item in node.content() {
            match item {
                XmlContent::Element(child) => self.write_node(child)?,
                XmlContent::Text(text) => self.write_string(text)?,
            }
        }
        self.end_element()
    }

    /// Number of elements currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Returns the document as a string. Every element must be closed.
    pub fn finish(self) -> Result<String> {
        let bytes = self.into_bytes()?;
        String::from_utf8(bytes).map_err(|e| SerdeError::Custom(e.to_string()))
    }

    /// Returns the document bytes. Every element must be closed.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if let Some(name) = self.open.last() {
            return Err(SerdeError::Custom(format!(
                "element <{}> was never closed",
                name
            )));
        }
        Ok(self.writer.into_inner())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

impl ToXml for XmlNode {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> Result<()> {
        writer.write_node_as(name, self)
    }
}

impl ToXml for str {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> Result<()> {
        writer.write_element_string(name, self)
    }
}

impl ToXml for String {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> Result<()> {
        writer.write_element_string(name, self)
    }
}

impl ToXml for bool {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> Result<()> {
        writer.write_element_string(name, utils::bool_to_string(*self))
    }
}

macro_rules! display_to_xml {
    ($($ty:ty),*) => {
        $(
            impl ToXml for $ty {
                fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> Result<()> {
                    writer.write_element_string(name, &self.to_string())
                }
            }
        )*
    };
}

display_to_xml!(i32, u32, i64, f64);
