//! XML serialization of config sections.
//!
//! A section is written as one document whose root element is named after
//! the section (`video`, or `a.b` for the nested section `a/b`). Every path
//! segment below it becomes a nested element:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <video>
//!   <width type="uint">1920</width>
//!   <codec>
//!     <name type="string">h264</name>
//!   </codec>
//! </video>
//! ```
//!
//! Leaf values are element text. An entry that has a value and children
//! carries the value in a `value` attribute instead.
//!
//! Values are escaped so they read back unchanged; values containing
//! characters XML cannot carry (most control characters) fail to save.

use crate::error::{ConfigError, ConfigResult};
use crate::options::PoolOptions;
use crate::path;
use crate::registry::{ConfigId, ConfigRegistry};
use crate::value::{ConfigValue, TypeTag};

/// Root element name for a canonical section.
pub fn root_element_name(section: &str, options: &PoolOptions) -> String {
    if section.is_empty() {
        options.root_element.clone()
    } else {
        section.replace(path::SEPARATOR, ".")
    }
}

/// Serialize the registered entries of a canonical section.
pub fn write_section(
    registry: &ConfigRegistry,
    section: &str,
    options: &PoolOptions,
) -> ConfigResult<String> {
    let root_name = root_element_name(section, options);
    check_element_name(&root_name, section)?;

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    match registry.resolve(section) {
        Some(top) => write_node(registry, top, &root_name, 0, options.xml_indent, &mut xml)?,
        None => xml.push_str(&format!("<{}/>\n", root_name)),
    }

    Ok(xml)
}

fn write_node(
    registry: &ConfigRegistry,
    id: ConfigId,
    name: &str,
    depth: usize,
    indent: usize,
    xml: &mut String,
) -> ConfigResult<()> {
    let Some(node) = registry.node(id) else {
        return Ok(());
    };
    let pad = " ".repeat(depth * indent);
    let children = node.children();

    let mut open = format!("{}<{}", pad, name);
    if let Some(value) = node.current_value() {
        open.push_str(&format!(" type=\"{}\"", value.tag()));
        if !children.is_empty() {
            let text = escape_xml(&value.to_text(), Escape::Attribute, node.path())?;
            open.push_str(&format!(" value=\"{}\"", text));
        }
    }

    if children.is_empty() {
        match node.current_value() {
            Some(value) => {
                let text = escape_xml(&value.to_text(), Escape::Text, node.path())?;
                xml.push_str(&format!("{}>{}</{}>\n", open, text, name));
            }
            None => xml.push_str(&format!("{}/>\n", open)),
        }
        return Ok(());
    }

    xml.push_str(&open);
    xml.push_str(">\n");
    for &child in children {
        let child_path = registry.resolve_path(child).unwrap_or_default();
        let child_name = path::leaf_name(child_path);
        check_element_name(child_name, child_path)?;
        write_node(registry, child, child_name, depth + 1, indent, xml)?;
    }
    xml.push_str(&format!("{}</{}>\n", pad, name));

    Ok(())
}

/// Parse a section document into `(id, value)` pairs without applying them.
///
/// Elements for unregistered paths are skipped, as are entries whose
/// `type` attribute disagrees with the registered type. Any malformed
/// value fails the whole document.
pub fn read_section(
    registry: &ConfigRegistry,
    section: &str,
    xml: &str,
    options: &PoolOptions,
) -> ConfigResult<Vec<(ConfigId, ConfigValue)>> {
    let doc = roxmltree::Document::parse(xml)?;

    let expected = root_element_name(section, options);
    let root = doc.root_element();
    if root.tag_name().name() != expected {
        return Err(ConfigError::ParseError(format!(
            "Missing section <{}> (found <{}>)",
            expected,
            root.tag_name().name()
        )));
    }

    let mut parsed = Vec::new();
    read_element(registry, &root, section.to_string(), &mut parsed)?;
    Ok(parsed)
}

fn read_element(
    registry: &ConfigRegistry,
    element: &roxmltree::Node,
    element_path: String,
    parsed: &mut Vec<(ConfigId, ConfigValue)>,
) -> ConfigResult<()> {
    if let Some(type_name) = element.attribute("type") {
        read_value(registry, element, &element_path, type_name, parsed)?;
    }

    for child in element.children().filter(|n| n.is_element()) {
        let name = child.tag_name().name();
        let child_path = if element_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", element_path, name)
        };
        read_element(registry, &child, child_path, parsed)?;
    }

    Ok(())
}

fn read_value(
    registry: &ConfigRegistry,
    element: &roxmltree::Node,
    element_path: &str,
    type_name: &str,
    parsed: &mut Vec<(ConfigId, ConfigValue)>,
) -> ConfigResult<()> {
    let Some(id) = registry.resolve(element_path) else {
        tracing::debug!("Skipping unregistered config path {}", element_path);
        return Ok(());
    };
    let Some(registered) = registry.type_of(id) else {
        return Ok(());
    };

    let tag: TypeTag = type_name.parse()?;
    if tag != registered {
        tracing::warn!(
            "Skipping {}: stored as {}, registered as {}",
            element_path,
            tag,
            registered
        );
        return Ok(());
    }

    let text = element
        .attribute("value")
        .or_else(|| element.text())
        .unwrap_or("");
    let value = ConfigValue::parse(tag, text)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", element_path, e)))?;
    parsed.push((id, value));

    Ok(())
}

/// Check that a path segment can be used as an element name.
fn check_element_name(name: &str, config_path: &str) -> ConfigResult<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid_start && valid_rest && !name.to_ascii_lowercase().starts_with("xml") {
        Ok(())
    } else {
        Err(ConfigError::InvalidPath(format!(
            "{} (segment {:?} is not a valid XML element name)",
            config_path, name
        )))
    }
}

/// Where an escaped value is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    Text,
    Attribute,
}

/// Escape a value so the parser reads back exactly the same characters.
///
/// Carriage returns are written as character references in text, and
/// all whitespace other than spaces is in attributes, since parsers
/// normalize the literal forms. Characters XML 1.0 cannot carry at all
/// are rejected.
fn escape_xml(s: &str, context: Escape, config_path: &str) -> ConfigResult<String> {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\r' => out.push_str("&#xD;"),
            '\n' if context == Escape::Attribute => out.push_str("&#xA;"),
            '\t' if context == Escape::Attribute => out.push_str("&#x9;"),
            '\n' | '\t' => out.push(c),
            c if is_xml_char(c) => out.push(c),
            c => {
                return Err(ConfigError::ParseError(format!(
                    "{}: character {:?} cannot be stored in XML",
                    config_path, c
                )))
            }
        }
    }
    Ok(out)
}

/// XML 1.0 `Char` production (tab, newline and carriage return handled by the caller).
fn is_xml_char(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}
