//! Error types shared by the registry, the stores and the pool facade.

use std::io;

use thiserror::Error;

use crate::registry::ConfigId;
use crate::value::TypeTag;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown id or path.
    #[error("Config entry not found: {0}")]
    NotFound(String),

    /// A typed access did not match the registered type.
    #[error(
        "Type mismatch for id {id}: registered as {}, accessed as {requested}",
        describe_tag(.registered)
    )]
    TypeMismatch {
        id: ConfigId,
        /// `None` for structural nodes that carry no value.
        registered: Option<TypeTag>,
        requested: TypeTag,
    },

    #[error("Invalid config path: {0:?}")]
    InvalidPath(String),

    /// Malformed stored value, XML document or TOML file.
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Config store I/O failed: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn describe_tag(tag: &Option<TypeTag>) -> String {
    match tag {
        Some(tag) => tag.to_string(),
        None => "structural node".to_string(),
    }
}

impl From<toml_edit::TomlError> for ConfigError {
    fn from(err: toml_edit::TomlError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<roxmltree::Error> for ConfigError {
    fn from(err: roxmltree::Error) -> Self {
        ConfigError::ParseError(format!("XML parse error: {}", err))
    }
}
