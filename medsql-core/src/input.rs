//! Argument and entity files produced by the extraction/disambiguation stage.
//!
//! Both JSON and YAML are accepted; serde_yaml parses either.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{io_err, ConfigError};
use crate::types::{ArgumentDictionary, EntitySet};

fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a domain → values mapping, e.g. `{"DRUG": ["1191"], "GENDER": ["FEMALE"]}`.
pub fn load_arguments(path: &Path) -> Result<ArgumentDictionary, ConfigError> {
    load_file(path)
}

/// Load a domain → resolved entity list mapping.
pub fn load_entities(path: &Path) -> Result<EntitySet, ConfigError> {
    load_file(path)
}

/// Parse a `DOMAIN=VALUE` pair as given on the command line.
pub fn parse_assignment(raw: &str) -> Option<(&str, &str)> {
    let (domain, value) = raw.split_once('=')?;
    let domain = domain.trim();
    if domain.is_empty() {
        return None;
    }
    Some((domain, value))
}
