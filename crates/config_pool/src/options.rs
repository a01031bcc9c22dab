//! Pool options with TOML loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;

/// Tunables for the config pool's persistence formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolOptions {
    /// Spaces per nesting level in written XML.
    #[serde(default = "default_xml_indent")]
    pub xml_indent: usize,

    /// XML root element used when saving the whole tree (empty section).
    #[serde(default = "default_root_element")]
    pub root_element: String,

    /// Table holding entries in TOML stores (top level when unset).
    #[serde(default)]
    pub toml_table: Option<String>,
}

fn default_xml_indent() -> usize {
    2
}

fn default_root_element() -> String {
    "config".to_string()
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            xml_indent: default_xml_indent(),
            root_element: default_root_element(),
            toml_table: None,
        }
    }
}

impl PoolOptions {
    /// Parse options from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read options from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
