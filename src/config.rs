//! Codec configuration, read once at startup.
//!
//! ```toml
//! binary_keyword = "binary_data"
//! max_depth = 256   # optional
//! ```
//!
//! A missing `binary_keyword` is not a parse error here.  It is reported as
//! `ConfigMissing` when an encoder is built from the config.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::DEFAULT_MAX_DEPTH;
use crate::errors::*;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodecConfig {
    /// Map key whose string value is base64 and encodes as bin.
    #[serde(default)]
    pub binary_keyword: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl CodecConfig {
    pub fn new(binary_keyword: impl Into<String>) -> Self {
        Self {
            binary_keyword: binary_keyword.into(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| CodecError::ConfigInvalid(err.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            CodecError::ConfigInvalid(format!("could not read {}: {}", path.display(), err))
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new(String::new())
    }
}
