mod protocol;

pub use protocol::build_protocol;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use mdflow::forcefield::ParameterizeConfig;

/// Reads a custom parameter file, or selects the built-in set for `None`.
pub fn build_forcefield_config(path: Option<&Path>) -> Result<ParameterizeConfig> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .with_context(|| format!("Failed to read force field file: {}", p.display()))?;
            Ok(ParameterizeConfig::with_params(text))
        }
        None => Ok(ParameterizeConfig::default()),
    }
}
