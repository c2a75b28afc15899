//! `hvt`: validate and convert health-record item XML.

use clap::Parser;
use hvt::{CliConfig, init_logging, run};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(command = ?config.command, pretty = config.pretty, "Starting hvt");

    let stdout = std::io::stdout();
    let ok = run(&config, &mut stdout.lock())?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
