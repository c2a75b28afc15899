//! Path-based XML reader.
//!
//! Documents are read with quick-xml into a small owned tree of [`XmlNode`]s.
//! Item types then navigate that tree by element name, the same way the
//! platform schema addresses fields (`when/date/y`), and convert the leaves
//! through [`FromXml`].

use crate::error::{Result, SerdeError};
use crate::xml::utils;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::BufRead;
use std::str::FromStr;

/// Conversion from a parsed XML element into a typed value.
pub trait FromXml: Sized {
    /// Builds the value from `node`, which is the element holding it.
    fn from_xml(node: &XmlNode) -> Result<Self>;
}

/// One item of an element's content, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum XmlContent {
    Element(XmlNode),
    Text(String),
}

/// An XML element with its attributes and content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XmlNode {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<XmlContent>,
}

impl XmlNode {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses a complete XML document and returns its root element.
    ///
    /// # Examples
    ///
    /// ```
    /// use hvt_serde::xml::XmlNode;
    ///
    /// let root = XmlNode::parse_str("<weight><value><kg>70</kg></value></weight>").unwrap();
    /// assert_eq!(root.select("value/kg").unwrap().text(), "70");
    /// ```
    pub fn parse_str(xml: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(xml);
        let mut builder = TreeBuilder::default();

        loop {
            match reader.read_event()? {
                Event::Start(start) => builder.open(start_node(&start)?)?,
                Event::Empty(start) => builder.leaf(start_node(&start)?)?,
                Event::End(_) => builder.close()?,
                Event::Text(text) => {
                    let raw = String::from_utf8_lossy(&text);
                    builder.text(&unescape(&raw)?)?;
                }
                Event::CData(data) => {
                    builder.text(&String::from_utf8_lossy(&data))?;
                }
                Event::GeneralRef(reference) => {
                    let name = String::from_utf8_lossy(&reference);
                    builder.text(&unescape(&format!("&{};", name))?)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        builder.finish()
    }

    /// Parses a complete XML document from bytes.
    pub fn parse_slice(xml: &[u8]) -> Result<XmlNode> {
        Self::parse_str(std::str::from_utf8(xml)?)
    }

    /// Parses a complete XML document from a reader.
    pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<XmlNode> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        Self::parse_str(&xml)
    }

    /// Qualified element name, including any prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        utils::local_name(&self.name)
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn content(&self) -> &[XmlContent] {
        &self.content
    }

    /// Returns the value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the named attribute or a `MissingAttribute` error.
    pub fn required_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name)
            .ok_or_else(|| SerdeError::MissingAttribute {
                element: self.name.clone(),
                attribute: name.to_string(),
            })
    }

    /// Sets (or replaces) an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Appends a child element.
    pub fn push_element(&mut self, child: XmlNode) {
        self.content.push(XmlContent::Element(child));
    }

    /// Appends a text run.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.content.push(XmlContent::Text(text.into()));
    }

    /// Concatenated direct text content, trimmed.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for item in &self.content {
            if let XmlContent::Text(run) = item {
                text.push_str(run);
            }
        }
        text.trim().to_string()
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.content.iter().filter_map(|item| match item {
            XmlContent::Element(element) => Some(element),
            XmlContent::Text(_) => None,
        })
    }

    /// Child elements with the given name (`*` matches any).
    pub fn children<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a XmlNode> {
        self.elements().filter(move |element| element.is_named(name))
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children(name).next()
    }

    /// All elements reached by a slash-separated path relative to this node.
    ///
    /// Each step names a child element; `.` stays on the current node and
    /// `*` matches any element.
    pub fn select_all(&self, path: &str) -> Vec<&XmlNode> {
        let mut current = vec![self];
        for step in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            if step == "." {
                continue;
            }
            current = current
                .into_iter()
                .flat_map(|node| node.children(step))
                .collect();
        }
        current
    }

    /// First element reached by a slash-separated path.
    pub fn select(&self, path: &str) -> Option<&XmlNode> {
        self.select_all(path).into_iter().next()
    }

    /// Converts the named child, failing when it is absent.
    pub fn required<T: FromXml>(&self, name: &str) -> Result<T> {
        match self.child(name) {
            Some(child) => T::from_xml(child),
            None => Err(self.missing(name)),
        }
    }

    /// Converts the named child when it is present.
    pub fn optional<T: FromXml>(&self, name: &str) -> Result<Option<T>> {
        self.child(name).map(T::from_xml).transpose()
    }

    /// Converts every child with the given name, in document order.
    pub fn repeated<T: FromXml>(&self, name: &str) -> Result<Vec<T>> {
        self.children(name).map(T::from_xml).collect()
    }

    /// Text of the named child; absent or blank is an error.
    pub fn required_text(&self, name: &str) -> Result<String> {
        self.optional_text(name).ok_or_else(|| self.missing(name))
    }

    /// Text of the named child; absent or blank reads as `None`.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(XmlNode::text)
            .filter(|text| !text.is_empty())
    }

    /// Parses this element's text with `FromStr`.
    pub fn parse_text<T>(&self) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let text = self.text();
        text.parse::<T>().map_err(|err| self.invalid(&text, err))
    }

    /// Builds an `InvalidValue` error for this element.
    pub fn invalid(&self, value: &str, message: impl Display) -> SerdeError {
        SerdeError::InvalidValue {
            element: self.name.clone(),
            value: value.to_string(),
            message: message.to_string(),
        }
    }

    fn missing(&self, element: &str) -> SerdeError {
        SerdeError::MissingElement {
            parent: self.name.clone(),
            element: element.to_string(),
        }
    }

    fn is_named(&self, name: &str) -> bool {
        name == "*" || self.name == name || self.local_name() == name
    }
}

impl FromXml for XmlNode {
    fn from_xml(node: &XmlNode) -> Result<Self> {
        Ok(node.clone())
    }
}

impl FromXml for String {
    fn from_xml(node: &XmlNode) -> Result<Self> {
        Ok(node.text())
    }
}

impl FromXml for bool {
    fn from_xml(node: &XmlNode) -> Result<Self> {
        let text = node.text();
        utils::parse_bool(&text).ok_or_else(|| node.invalid(&text, "expected a boolean"))
    }
}

impl FromXml for i32 {
    fn from_xml(node: &XmlNode) -> Result<Self> {
        node.parse_text()
    }
}

impl FromXml for u32 {
    fn from_xml(node: &XmlNode) -> Result<Self> {
        node.parse_text()
    }
}

impl FromXml for i64 {
    fn from_xml(node: &XmlNode) -> Result<Self> {
        node.parse_text()
    }
}

impl FromXml for f64 {
    fn from_xml(node: &XmlNode) -> Result<Self> {
        let value: f64 = node.parse_text()?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(node.invalid(&node.text(), "expected a finite number"))
        }
    }
}

/// Builds the element tree from the reader's event stream.
#[derive(Default)]
struct TreeBuilder {
    stack: Vec<XmlNode>,
    root: Option<XmlNode>,
    pending_text: String,
}

impl TreeBuilder {
    fn open(&mut self, node: XmlNode) -> Result<()> {
        self.flush_text();
        self.check_single_root(&node)?;
        self.stack.push(node);
        Ok(())
    }

    fn leaf(&mut self, node: XmlNode) -> Result<()> {
        self.flush_text();
        self.check_single_root(&node)?;
        self.attach(node);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush_text();
        let node = self
            .stack
            .pop()
            .ok_or_else(|| SerdeError::Custom("unexpected closing tag".to_string()))?;
        self.attach(node);
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.stack.is_empty() {
            if utils::is_whitespace(text) {
                return Ok(());
            }
            return Err(SerdeError::Custom(
                "text content outside the root element".to_string(),
            ));
        }
        self.pending_text.push_str(text);
        Ok(())
    }

    fn finish(mut self) -> Result<XmlNode> {
        if let Some(open) = self.stack.last() {
            return Err(SerdeError::Custom(format!(
                "unexpected end of document inside <{}>",
                open.name
            )));
        }
        self.root.take().ok_or(SerdeError::NoRootElement)
    }

    fn attach(&mut self, node: XmlNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.push_element(node),
            None => self.root = Some(node),
        }
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        if utils::is_whitespace(&text) {
            return;
        }
        if let Some(parent) = self.stack.last_mut() {
            parent.push_text(text);
        }
    }

    fn check_single_root(&self, node: &XmlNode) -> Result<()> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(SerdeError::Custom(format!(
                "unexpected element <{}> after the root element",
                node.name
            )));
        }
        Ok(())
    }
}

fn start_node(start: &BytesStart) -> Result<XmlNode> {
    let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let root = XmlNode::parse_str(
            r#"<?xml version="1.0"?>
            <!-- a weight reading -->
            <weight>
              <when><date><y>2024</y><m>1</m><d>2</d></date></when>
              <value><kg>70.5</kg><display units="lb">155</display></value>
            </weight>"#,
        )
        .unwrap();

        assert_eq!(root.name(), "weight");
        assert_eq!(root.elements().count(), 2);
        assert_eq!(root.select("when/date/y").unwrap().text(), "2024");
        assert_eq!(
            root.select("value/display").unwrap().attribute("units"),
            Some("lb")
        );
    }

    #[test]
    fn test_entities_are_resolved() {
        let root = XmlNode::parse_str(r#"<note a="x &amp; y">Tom &amp; Jerry &#65;</note>"#)
            .unwrap();
        assert_eq!(root.text(), "Tom & Jerry A");
        assert_eq!(root.attribute("a"), Some("x & y"));
    }

    #[test]
    fn test_cdata_is_text() {
        let root = XmlNode::parse_str("<note><![CDATA[<b>bold</b>]]></note>").unwrap();
        assert_eq!(root.text(), "<b>bold</b>");
    }

    #[test]
    fn test_no_root_element() {
        let err = XmlNode::parse_str("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, SerdeError::NoRootElement));
    }

    #[test]
    fn test_content_after_root_is_rejected() {
        assert!(XmlNode::parse_str("<a/><b/>").is_err());
    }

    #[test]
    fn test_mismatched_end_tag_is_rejected() {
        assert!(XmlNode::parse_str("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_select_all_and_wildcard() {
        let root =
            XmlNode::parse_str("<r><g><x>1</x><x>2</x></g><g><x>3</x></g></r>").unwrap();
        let values: Vec<String> = root.select_all("g/x").iter().map(|n| n.text()).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
        assert_eq!(root.select_all("*/*").len(), 3);
        assert_eq!(root.select(".").unwrap().name(), "r");
        assert!(root.select("g/missing").is_none());
    }

    #[test]
    fn test_prefixed_names_match_local_name() {
        let root =
            XmlNode::parse_str(r#"<wc:thing xmlns:wc="urn:x"><wc:note>hi</wc:note></wc:thing>"#)
                .unwrap();
        assert_eq!(root.local_name(), "thing");
        assert_eq!(root.required_text("note").unwrap(), "hi");
    }

    #[test]
    fn test_typed_accessors() {
        let root = XmlNode::parse_str(
            "<r><n>42</n><f>1.5</f><b>1</b><blank>  </blank><s>a</s><s>b</s></r>",
        )
        .unwrap();

        assert_eq!(root.required::<i32>("n").unwrap(), 42);
        assert_eq!(root.required::<f64>("f").unwrap(), 1.5);
        assert!(root.required::<bool>("b").unwrap());
        assert_eq!(root.optional::<i32>("missing").unwrap(), None);
        assert_eq!(root.optional_text("blank"), None);
        assert_eq!(root.repeated::<String>("s").unwrap(), vec!["a", "b"]);

        let err = root.required_text("blank").unwrap_err();
        assert!(matches!(
            err,
            SerdeError::MissingElement { ref element, .. } if element == "blank"
        ));
    }

    #[test]
    fn test_invalid_values() {
        let root = XmlNode::parse_str("<r><n>forty</n><f>NaN</f><b>yes</b></r>").unwrap();
        assert!(matches!(
            root.required::<i32>("n"),
            Err(SerdeError::InvalidValue { .. })
        ));
        assert!(root.required::<f64>("f").is_err());
        assert!(root.required::<bool>("b").is_err());
    }

    #[test]
    fn test_mixed_content_order_is_preserved() {
        let root = XmlNode::parse_str("<p>one<b>two</b>three</p>").unwrap();
        assert_eq!(root.content().len(), 3);
        assert_eq!(root.text(), "onethree");
    }
}
