//! Typed config values.
//!
//! Every registered entry has a fixed [`TypeTag`]; its stored value is a
//! [`ConfigValue`] of the matching variant. Values travel to and from the
//! persistence backends in a textual form produced by
//! [`ConfigValue::to_text`] and read back by [`ConfigValue::parse`].

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};

/// Value kind of a registered entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Signed 32-bit integer.
    Int,
    /// Unsigned 32-bit integer.
    UInt,
    /// Signed 8-bit character code.
    Char,
    /// Unicode scalar value.
    WideChar,
    /// Unsigned 8-bit value.
    Byte,
    Bool,
    Float,
    Double,
    String,
}

impl TypeTag {
    /// All tags, in declaration order.
    pub const ALL: [TypeTag; 9] = [
        TypeTag::Int,
        TypeTag::UInt,
        TypeTag::Char,
        TypeTag::WideChar,
        TypeTag::Byte,
        TypeTag::Bool,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::String,
    ];

    /// Name used in the XML `type` attribute.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::UInt => "uint",
            TypeTag::Char => "char",
            TypeTag::WideChar => "wchar",
            TypeTag::Byte => "byte",
            TypeTag::Bool => "bool",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::String => "string",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| ConfigError::ParseError(format!("Unknown value type: {:?}", s)))
    }
}

/// A typed config value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Int(i32),
    UInt(u32),
    Char(i8),
    WideChar(char),
    Byte(u8),
    Bool(bool),
    Float(f32),
    Double(f64),
    String(String),
}

impl ConfigValue {
    /// The tag matching this value's variant.
    pub fn tag(&self) -> TypeTag {
        match self {
            ConfigValue::Int(_) => TypeTag::Int,
            ConfigValue::UInt(_) => TypeTag::UInt,
            ConfigValue::Char(_) => TypeTag::Char,
            ConfigValue::WideChar(_) => TypeTag::WideChar,
            ConfigValue::Byte(_) => TypeTag::Byte,
            ConfigValue::Bool(_) => TypeTag::Bool,
            ConfigValue::Float(_) => TypeTag::Float,
            ConfigValue::Double(_) => TypeTag::Double,
            ConfigValue::String(_) => TypeTag::String,
        }
    }

    /// Textual form written to stores and XML documents.
    ///
    /// Floats use Rust's shortest round-trip representation, so
    /// `parse(tag, to_text())` reproduces the value exactly.
    pub fn to_text(&self) -> String {
        match self {
            ConfigValue::Int(v) => v.to_string(),
            ConfigValue::UInt(v) => v.to_string(),
            ConfigValue::Char(v) => v.to_string(),
            ConfigValue::WideChar(v) => v.to_string(),
            ConfigValue::Byte(v) => v.to_string(),
            ConfigValue::Bool(v) => v.to_string(),
            ConfigValue::Float(v) => v.to_string(),
            ConfigValue::Double(v) => v.to_string(),
            ConfigValue::String(v) => v.clone(),
        }
    }

    /// Parse a textual value as the given type.
    ///
    /// Numbers and booleans tolerate surrounding whitespace; strings and
    /// wide chars are taken verbatim.
    pub fn parse(tag: TypeTag, text: &str) -> ConfigResult<ConfigValue> {
        let trimmed = text.trim();
        let value = match tag {
            TypeTag::Int => trimmed.parse().map(ConfigValue::Int).ok(),
            TypeTag::UInt => trimmed.parse().map(ConfigValue::UInt).ok(),
            TypeTag::Char => trimmed.parse().map(ConfigValue::Char).ok(),
            TypeTag::Byte => trimmed.parse().map(ConfigValue::Byte).ok(),
            TypeTag::Float => trimmed.parse().map(ConfigValue::Float).ok(),
            TypeTag::Double => trimmed.parse().map(ConfigValue::Double).ok(),
            TypeTag::Bool => parse_bool(trimmed).map(ConfigValue::Bool),
            TypeTag::WideChar => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(ConfigValue::WideChar(c)),
                    _ => None,
                }
            }
            TypeTag::String => Some(ConfigValue::String(text.to_string())),
        };

        value.ok_or_else(|| {
            ConfigError::ParseError(format!("Invalid {} value: {:?}", tag, text))
        })
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" => Some(true),
        "0" => Some(false),
        _ if text.eq_ignore_ascii_case("true") => Some(true),
        _ if text.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Rust types that can be stored in the config pool.
///
/// Ties each supported Rust type to its [`TypeTag`] so typed accessors
/// can check the registered type before touching a value.
pub trait ConfigType: Sized {
    const TAG: TypeTag;

    fn into_value(self) -> ConfigValue;

    /// Extract a value of this type, or `None` if the variant differs.
    fn from_value(value: &ConfigValue) -> Option<Self>;
}

macro_rules! impl_config_type {
    ($ty:ty, $variant:ident) => {
        impl ConfigType for $ty {
            const TAG: TypeTag = TypeTag::$variant;

            fn into_value(self) -> ConfigValue {
                ConfigValue::$variant(self)
            }

            fn from_value(value: &ConfigValue) -> Option<Self> {
                match value {
                    ConfigValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_config_type!(i32, Int);
impl_config_type!(u32, UInt);
impl_config_type!(i8, Char);
impl_config_type!(char, WideChar);
impl_config_type!(u8, Byte);
impl_config_type!(bool, Bool);
impl_config_type!(f32, Float);
impl_config_type!(f64, Double);
impl_config_type!(String, String);
