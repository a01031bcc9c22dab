//! Registry node and id types.

use std::fmt;

use crate::value::{ConfigValue, TypeTag};

/// Numeric handle of a registered config path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigId(pub u32);

impl ConfigId {
    /// Reserved "no entry" id. Never assigned to a node.
    pub const INVALID: ConfigId = ConfigId(0);
    /// Implicit root node, created with the registry.
    pub const ROOT: ConfigId = ConfigId(1);

    /// Arena slot of this id.
    pub(crate) fn index(&self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default and current value of a typed entry.
#[derive(Debug, Clone)]
pub(crate) struct ValueSlot {
    pub default: ConfigValue,
    pub current: ConfigValue,
}

/// One entry in the config hierarchy.
///
/// Nodes without a value slot are structural: they exist only because a
/// descendant path was registered (or they are the root).
#[derive(Debug, Clone)]
pub struct ConfigNode {
    pub(crate) id: ConfigId,
    pub(crate) path: String,
    pub(crate) parent: Option<ConfigId>,
    pub(crate) children: Vec<ConfigId>,
    pub(crate) slot: Option<ValueSlot>,
}

impl ConfigNode {
    pub(crate) fn root() -> Self {
        Self {
            id: ConfigId::ROOT,
            path: String::new(),
            parent: None,
            children: Vec::new(),
            slot: None,
        }
    }

    pub(crate) fn structural(id: ConfigId, path: String, parent: ConfigId) -> Self {
        Self {
            id,
            path,
            parent: Some(parent),
            children: Vec::new(),
            slot: None,
        }
    }

    /// Get the node id.
    pub fn id(&self) -> ConfigId {
        self.id
    }

    /// Canonical path (empty for the root).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the parent id (`None` for the root).
    pub fn parent(&self) -> Option<ConfigId> {
        self.parent
    }

    /// Direct children in registration order.
    pub fn children(&self) -> &[ConfigId] {
        &self.children
    }

    /// Registered type, or `None` for structural nodes.
    pub fn type_tag(&self) -> Option<TypeTag> {
        self.slot.as_ref().map(|slot| slot.default.tag())
    }

    /// Registered default, if the node is typed.
    pub fn default_value(&self) -> Option<&ConfigValue> {
        self.slot.as_ref().map(|slot| &slot.default)
    }

    /// Current value, if the node is typed.
    pub fn current_value(&self) -> Option<&ConfigValue> {
        self.slot.as_ref().map(|slot| &slot.current)
    }

    /// True for nodes that carry no value.
    pub fn is_structural(&self) -> bool {
        self.slot.is_none()
    }
}
