//! Command-line configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HVT_LOG_LEVEL` | warn | Log level |
//! | `HVT_PRETTY` | true | Indent XML and JSON output |

use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Options and subcommand for the `hvt` tool.
#[derive(Debug, Clone, Parser)]
#[command(name = "hvt")]
#[command(about = "Validate and convert health-record item XML")]
pub struct CliConfig {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "HVT_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Indent XML and JSON output.
    #[arg(long, global = true, env = "HVT_PRETTY", default_value = "true", action = ArgAction::Set)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Parse and validate item documents.
    Validate {
        /// Files holding a `<thing>`, a container of things, or a bare item.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Read bare item fragments as this type (name, root element or type id).
        #[arg(long = "type")]
        type_name: Option<String>,
    },
    /// Normalize a document to XML or export it as JSON.
    Convert {
        file: PathBuf,

        #[arg(long, value_enum)]
        to: OutputFormat,

        /// Write to this path instead of standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long = "type")]
        type_name: Option<String>,
    },
    /// List registered item types.
    Types,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xml,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Xml => write!(f, "xml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            pretty: true,
            command: Command::Types,
        }
    }
}

impl CliConfig {
    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            errors.push(format!(
                "Unknown log level '{}' (expected one of {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        match &self.command {
            Command::Validate { files, type_name } => {
                if files.is_empty() {
                    errors.push("No files to validate".to_string());
                }
                check_type_name(type_name, &mut errors);
            }
            Command::Convert {
                file,
                output,
                type_name,
                ..
            } => {
                if output.as_ref() == Some(file) {
                    errors.push("Output path cannot be the input file".to_string());
                }
                check_type_name(type_name, &mut errors);
            }
            Command::Types => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_type_name(type_name: &Option<String>, errors: &mut Vec<String>) {
    if let Some(name) = type_name {
        if hvt_things::find_type(name).is_none() {
            errors.push(format!("Unknown item type '{}'", name));
        }
    }
}
