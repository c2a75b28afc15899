use std::fs;
use std::path::PathBuf;

use clap::Parser;
use hvt::{CliConfig, Document, parse_document, run};
use hvt_things::ThingData;
use tempfile::TempDir;

const WEIGHT: &str = "<weight><when><date><y>2024</y><m>1</m><d>2</d></date></when>\
                      <value><kg>70</kg></value></weight>";

const THINGS: &str = r#"<things>
  <thing>
    <type-id name="Weight">3d34d87e-7fc1-4153-800f-f56592cb0d17</type-id>
    <data-xml>
      <weight><when><date><y>2024</y><m>1</m><d>2</d></date></when><value><kg>70</kg></value></weight>
    </data-xml>
  </thing>
  <thing>
    <data-xml><condition><name><text>Asthma</text></name></condition></data-xml>
  </thing>
</things>"#;

// Heart rate cannot be negative.
const BAD_HEART_RATE: &str = "<heart-rate><when><date><y>2024</y><m>1</m><d>2</d></date></when>\
                              <value>-5</value></heart-rate>";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run_args(args: &[&str]) -> (bool, String) {
    let config = CliConfig::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let ok = run(&config, &mut out).unwrap();
    (ok, String::from_utf8(out).unwrap())
}

#[test]
fn test_parse_document_kinds() {
    match parse_document(WEIGHT, None).unwrap() {
        Document::Item(ThingData::Weight(weight)) => assert_eq!(weight.value.value, 70.0),
        other => panic!("expected a weight item, got {:?}", other),
    }
    let things = parse_document(THINGS, None).unwrap();
    assert_eq!(things.len(), 2);
    assert!(parse_document("<mystery/>", None).is_err());
}

#[test]
fn test_parse_document_with_type() {
    assert!(parse_document(WEIGHT, Some("Weight")).is_ok());
    assert!(parse_document(WEIGHT, Some("height")).is_err());
    assert!(parse_document(WEIGHT, Some("teleportation")).is_err());
}

#[test]
fn test_validate_reports_each_file() {
    let dir = TempDir::new().unwrap();
    let good = write_file(&dir, "weight.xml", WEIGHT);
    let bad = write_file(&dir, "heart-rate.xml", BAD_HEART_RATE);
    let things = write_file(&dir, "things.xml", THINGS);

    let (ok, report) = run_args(&[
        "hvt",
        "validate",
        good.to_str().unwrap(),
        things.to_str().unwrap(),
    ]);
    assert!(ok);
    assert!(report.contains("weight.xml (1 item(s))"));
    assert!(report.contains("things.xml (2 item(s))"));

    let (ok, report) = run_args(&[
        "hvt",
        "validate",
        good.to_str().unwrap(),
        bad.to_str().unwrap(),
    ]);
    assert!(!ok);
    assert!(report.contains("FAIL"));
    assert!(report.contains("heart-rate.xml"));
}

#[test]
fn test_validate_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.xml");
    let (ok, report) = run_args(&["hvt", "validate", missing.to_str().unwrap()]);
    assert!(!ok);
    assert!(report.contains("failed to read"));
}

#[test]
fn test_convert_to_compact_xml() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "weight.xml", WEIGHT);
    let output = dir.path().join("out.xml");

    let (ok, stdout) = run_args(&[
        "hvt",
        "convert",
        input.to_str().unwrap(),
        "--to",
        "xml",
        "--output",
        output.to_str().unwrap(),
        "--pretty=false",
    ]);
    assert!(ok);
    assert!(stdout.is_empty());
    assert_eq!(fs::read_to_string(&output).unwrap(), WEIGHT);
}

#[test]
fn test_convert_things_to_json() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "things.xml", THINGS);

    let (ok, stdout) = run_args(&["hvt", "convert", input.to_str().unwrap(), "--to", "json"]);
    assert!(ok);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let things = value.as_array().unwrap();
    assert_eq!(things.len(), 2);
    assert_eq!(things[0]["data"]["type"], "weight");
    assert_eq!(things[1]["data"]["type"], "condition");
}

#[test]
fn test_convert_invalid_document_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "heart-rate.xml", BAD_HEART_RATE);
    let config =
        CliConfig::try_parse_from(["hvt", "convert", input.to_str().unwrap(), "--to", "xml"])
            .unwrap();
    let err = run(&config, &mut Vec::new()).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid document"));
}

#[test]
fn test_types_lists_registry() {
    let (ok, stdout) = run_args(&["hvt", "types"]);
    assert!(ok);
    assert_eq!(stdout.lines().count(), hvt_things::registered_types().len());
    assert!(stdout.contains("blood-pressure"));
    assert!(stdout.contains("Blood Pressure"));
}
