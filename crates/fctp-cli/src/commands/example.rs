use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fctp_cli::cli::ExampleFormat;
use fctp_core::{reference, RunConfig};
use tracing::info;

pub fn handle(out: Option<&Path>, format: ExampleFormat) -> Result<()> {
    let instance = reference::four_by_three().context("building reference instance")?;
    let config = RunConfig::from_instance(&instance);

    let text = match format {
        ExampleFormat::Yaml => config.to_yaml_string()?,
        ExampleFormat::Json => serde_json::to_string_pretty(&config)?,
    };

    match out {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("writing example to '{}'", path.display()))?;
            info!("example configuration written to {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
