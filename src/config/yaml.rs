//! YAML configuration loading and parsing

use crate::config::CiMgmtConfig;
use crate::error::MigrateError;
use crate::system::System;
use crate::utils::fs::read_optional;
use anyhow::Result;
use std::path::Path;
use tracing::debug;

/// Load and parse `.ci-mgmt.yaml`
///
/// A missing file is not an error; migrations that need it check on their
/// own.
pub fn load_config(system: &dyn System, path: &Path) -> Result<Option<CiMgmtConfig>> {
    let Some(content) = read_optional(system, path)? else {
        debug!("No configuration file at {}", path.display());
        return Ok(None);
    };

    if content.trim().is_empty() {
        return Ok(Some(CiMgmtConfig::default()));
    }

    let config: CiMgmtConfig = serde_yaml::from_str(&content).map_err(|err| {
        MigrateError::configuration(format!(
            "Failed to parse YAML configuration in file: {}\n{err}",
            path.display()
        ))
    })?;

    Ok(Some(config))
}
