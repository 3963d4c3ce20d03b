pub mod example;
pub mod solve;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use fctp_core::{load_config_from_path, Instance, RunConfig};

/// Load a run file and build its instance, with file-level context on errors.
pub fn load_run(path: &Path) -> Result<(RunConfig, Instance)> {
    let config = load_config_from_path(path)
        .with_context(|| format!("loading run configuration '{}'", path.display()))?;
    config
        .validate_options()
        .with_context(|| format!("checking run options in '{}'", path.display()))?;
    let instance = config
        .to_instance()
        .with_context(|| format!("validating instance data in '{}'", path.display()))?;
    Ok((config, instance))
}
