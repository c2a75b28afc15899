use hvt_serde::{Result, ToXml, XmlNode, XmlWriter, to_xml_string};

struct Reading {
    systolic: i32,
    diastolic: i32,
    note: Option<String>,
}

impl ToXml for Reading {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> Result<()> {
        writer.start_element(name)?;
        writer.write("systolic", &self.systolic)?;
        writer.write("diastolic", &self.diastolic)?;
        writer.write_optional("note", &self.note)?;
        writer.end_element()
    }
}

#[test]
fn test_custom_type_writes_in_order() -> Result<()> {
    let reading = Reading {
        systolic: 120,
        diastolic: 80,
        note: None,
    };
    assert_eq!(
        to_xml_string("blood-pressure", &reading)?,
        "<blood-pressure><systolic>120</systolic><diastolic>80</diastolic></blood-pressure>"
    );
    Ok(())
}

#[test]
fn test_declaration_and_pretty() -> Result<()> {
    let mut writer = XmlWriter::pretty();
    writer.write_declaration()?;
    let reading = Reading {
        systolic: 118,
        diastolic: 76,
        note: Some("seated".to_string()),
    };
    writer.write("blood-pressure", &reading)?;
    let xml = writer.finish()?;
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains("\n  <note>seated</note>\n"));
    Ok(())
}

#[test]
fn test_declaration_after_root_is_rejected() {
    let mut writer = XmlWriter::new();
    writer.start_element("a").unwrap();
    assert!(writer.write_declaration().is_err());
}

#[test]
fn test_text_outside_root_is_rejected() {
    let mut writer = XmlWriter::new();
    assert!(writer.write_string("loose").is_err());
}

#[test]
fn test_write_node_preserves_parsed_document() -> Result<()> {
    let source = r#"<custom v="a &amp; b"><x>1 &lt; 2</x><y/><z>t</z></custom>"#;
    let node = XmlNode::parse_str(source)?;
    let mut writer = XmlWriter::new();
    writer.write_node(&node)?;
    let written = writer.finish()?;
    assert_eq!(XmlNode::parse_str(&written)?, node);
    Ok(())
}

#[test]
fn test_depth_tracks_open_elements() -> Result<()> {
    let mut writer = XmlWriter::new();
    writer.start_element("a")?;
    writer.start_element("b")?;
    assert_eq!(writer.depth(), 2);
    writer.end_element()?;
    writer.end_element()?;
    assert_eq!(writer.depth(), 0);
    assert_eq!(writer.into_bytes()?, b"<a><b/></a>".to_vec());
    Ok(())
}

#[test]
fn test_empty_string_field_is_written_empty() -> Result<()> {
    let reading = Reading {
        systolic: 120,
        diastolic: 80,
        note: Some(String::new()),
    };
    let xml = to_xml_string("reading", &reading)?;
    assert_eq!(
        xml,
        "<reading><systolic>120</systolic><diastolic>80</diastolic><note/></reading>"
    );
    let node = XmlNode::parse_str(&xml)?;
    assert_eq!(node.child("note").map(|n| n.text()), Some(String::new()));
    Ok(())
}
