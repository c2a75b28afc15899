//! # hvt
//!
//! Command-line front end for [`hvt_things`]: validates item documents,
//! converts them between canonical XML and JSON, and lists the registered
//! item types.

pub mod config;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use hvt_serde::{XmlNode, XmlWriter, json};
use hvt_things::{Thing, ThingData, find_type, registered_types, registry};
use tracing::{info, warn};

pub use config::{CliConfig, Command, OutputFormat};

/// Contents of one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// A `<thing>` or a container of `<thing>` elements.
    Things(Vec<Thing>),
    /// A bare item fragment.
    Item(ThingData),
}

impl Document {
    /// Number of items in the document.
    pub fn len(&self) -> usize {
        match self {
            Document::Things(things) => things.len(),
            Document::Item(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Canonical XML. Several things are wrapped in a `<things>` element.
    pub fn to_xml(&self, pretty: bool) -> anyhow::Result<String> {
        let mut writer = if pretty {
            XmlWriter::pretty()
        } else {
            XmlWriter::new()
        };
        match self {
            Document::Things(things) if things.len() == 1 => things[0].write_xml(&mut writer)?,
            Document::Things(things) => {
                writer.start_element("things")?;
                for thing in things {
                    thing.write_xml(&mut writer)?;
                }
                writer.end_element()?;
            }
            Document::Item(data) => data.write_xml(&mut writer)?,
        }
        Ok(writer.finish()?)
    }

    pub fn to_json(&self, pretty: bool) -> anyhow::Result<String> {
        let json = match (self, pretty) {
            (Document::Things(things), true) if things.len() == 1 => {
                json::to_json_string_pretty(&things[0])?
            }
            (Document::Things(things), false) if things.len() == 1 => {
                json::to_json_string(&things[0])?
            }
            (Document::Things(things), true) => json::to_json_string_pretty(things)?,
            (Document::Things(things), false) => json::to_json_string(things)?,
            (Document::Item(data), true) => json::to_json_string_pretty(data)?,
            (Document::Item(data), false) => json::to_json_string(data)?,
        };
        Ok(json)
    }
}

/// Reads an item document from XML text.
///
/// With `type_name` the root element is read as that item type. Otherwise a
/// `<thing>` or container of things is read as things, and any other root
/// must be the element of a registered type.
pub fn parse_document(xml: &str, type_name: Option<&str>) -> anyhow::Result<Document> {
    let root = XmlNode::parse_str(xml)?;
    if let Some(name) = type_name {
        let registered = find_type(name).ok_or_else(|| anyhow!("unknown item type '{}'", name))?;
        return Ok(Document::Item(registry::parse_as(&registered, &root)?));
    }
    if root.local_name() == "thing" {
        return Ok(Document::Things(vec![Thing::parse_xml(&root)?]));
    }
    if root.children("thing").next().is_some() {
        let things = root
            .children("thing")
            .map(Thing::parse_xml)
            .collect::<hvt_things::Result<Vec<_>>>()?;
        return Ok(Document::Things(things));
    }
    Ok(Document::Item(ThingData::parse_by_element(&root)?))
}

pub fn load_document(path: &Path, type_name: Option<&str>) -> anyhow::Result<Document> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&xml, type_name)
        .with_context(|| format!("invalid document {}", path.display()))
}

/// Outcome of validating one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// Item count on success, the error chain on failure.
    pub outcome: Result<usize, String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub fn validate_files(files: &[PathBuf], type_name: Option<&str>) -> Vec<FileReport> {
    files
        .iter()
        .map(|path| {
            let outcome = load_document(path, type_name)
                .map(|document| document.len())
                .map_err(|e| format!("{:#}", e));
            if let Err(error) = &outcome {
                warn!(path = %path.display(), %error, "validation failed");
            }
            FileReport {
                path: path.clone(),
                outcome,
            }
        })
        .collect()
}

/// Renders the registered types, one per line.
pub fn list_types() -> String {
    let mut out = String::new();
    for registered in registered_types() {
        out.push_str(&format!(
            "{}  {:<24} {}\n",
            registered.type_id, registered.root_element, registered.name
        ));
    }
    out
}

/// Runs the configured command, writing its report to `out`.
///
/// Returns `false` when any input failed validation.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<bool> {
    match &config.command {
        Command::Validate { files, type_name } => {
            info!(files = files.len(), "validating");
            let reports = validate_files(files, type_name.as_deref());
            for report in &reports {
                match &report.outcome {
                    Ok(count) => {
                        writeln!(out, "ok    {} ({} item(s))", report.path.display(), count)?
                    }
                    Err(error) => writeln!(out, "FAIL  {}: {}", report.path.display(), error)?,
                }
            }
            let failed = reports.iter().filter(|r| !r.is_ok()).count();
            info!(checked = reports.len(), failed, "validation finished");
            Ok(failed == 0)
        }
        Command::Convert {
            file,
            to,
            output,
            type_name,
        } => {
            let document = load_document(file, type_name.as_deref())?;
            let rendered = match to {
                OutputFormat::Xml => document.to_xml(config.pretty)?,
                OutputFormat::Json => document.to_json(config.pretty)?,
            };
            match output {
                Some(path) => {
                    fs::write(path, &rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(
                        input = %file.display(),
                        output = %path.display(),
                        format = %to,
                        "converted"
                    );
                }
                None => writeln!(out, "{}", rendered)?,
            }
            Ok(true)
        }
        Command::Types => {
            write!(out, "{}", list_types())?;
            Ok(true)
        }
    }
}

/// Installs the tracing subscriber. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hvt={},hvt_things={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
