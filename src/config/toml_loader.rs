//! TOML variables file parsing.
use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::variables::{self, Variables};
use crate::error::ConfigError;

/// On-disk shape of a `--vars-file`.
///
/// ```toml
/// [variables]
/// SDK_ROOT = "/opt/sdk"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct VariablesFile {
    #[serde(default)]
    variables: BTreeMap<String, String>,
}

/// Load variable definitions from a TOML file.
///
/// Names are validated and uppercased like command-line definitions. Two keys
/// differing only in case are rejected as duplicates.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or holds
/// an invalid definition.
pub fn load_variables(path: &Path) -> Result<Variables, ConfigError> {
    let file_error = |message: String| ConfigError::VarsFile {
        path: path.to_path_buf(),
        message,
    };

    let content = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    let file: VariablesFile = toml::from_str(&content).map_err(|e| file_error(e.to_string()))?;

    let mut result = Variables::new();
    for (name, value) in file.variables {
        variables::validate(&name, &value).map_err(|reason| ConfigError::InvalidVariable {
            definition: format!("{name}={value}"),
            reason,
        })?;
        if result.insert(&name, value).is_some() {
            return Err(ConfigError::DuplicateVariable(name.to_uppercase()));
        }
    }
    Ok(result)
}
