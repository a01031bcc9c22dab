//! Arena-backed config tree.

use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};
use crate::path;
use crate::value::{ConfigType, ConfigValue, TypeTag};

use super::types::{ConfigId, ConfigNode, ValueSlot};

/// Path ↔ id registry holding the config hierarchy and its values.
///
/// Nodes live in an arena indexed by `id - 1`, so ids are allocated
/// densely and never reused. The registry does no I/O and no locking;
/// [`crate::ConfigPool`] wraps it for shared access.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    nodes: Vec<ConfigNode>,
    by_path: HashMap<String, ConfigId>,
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRegistry {
    /// Create a registry containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![ConfigNode::root()],
            by_path: HashMap::new(),
        }
    }

    /// Register `path` with a typed default and return its id.
    ///
    /// An unseen path gets the next free id; missing ancestors are created
    /// as structural nodes and numbered after it. Registering a path that
    /// already carries a value returns the existing id unchanged: the first
    /// registration fixes type and default. A structural node registered
    /// with a value is upgraded in place and keeps its id.
    pub fn register(&mut self, path: &str, default: ConfigValue) -> ConfigResult<ConfigId> {
        let canonical = path::canonicalize(path)?;

        if let Some(&id) = self.by_path.get(&canonical) {
            let node = &mut self.nodes[id.0 as usize - 1];
            if let Some(slot) = &node.slot {
                if slot.default.tag() != default.tag() {
                    tracing::debug!(
                        "Ignoring re-registration of {} as {} (registered as {})",
                        canonical,
                        default.tag(),
                        slot.default.tag()
                    );
                }
            } else {
                tracing::debug!("Upgrading structural node {} to {}", canonical, default.tag());
                node.slot = Some(ValueSlot {
                    current: default.clone(),
                    default,
                });
            }
            return Ok(id);
        }

        let ancestors = path::ancestors(&canonical);
        // Ancestors of a registered node always exist, so the missing ones
        // form a suffix of the list.
        let existing = ancestors
            .iter()
            .take_while(|ancestor| self.by_path.contains_key(**ancestor))
            .count();
        let mut parent = match existing {
            0 => ConfigId::ROOT,
            n => self.by_path[ancestors[n - 1]],
        };

        let leaf_id = self.next_id();
        self.nodes.push(ConfigNode {
            id: leaf_id,
            path: canonical.clone(),
            parent: None,
            children: Vec::new(),
            slot: Some(ValueSlot {
                current: default.clone(),
                default,
            }),
        });

        for ancestor in &ancestors[existing..] {
            let id = self.next_id();
            self.nodes
                .push(ConfigNode::structural(id, ancestor.to_string(), parent));
            self.link(parent, id);
            self.by_path.insert(ancestor.to_string(), id);
            parent = id;
        }

        self.nodes[leaf_id.0 as usize - 1].parent = Some(parent);
        self.link(parent, leaf_id);
        tracing::debug!("Registered {} as id {}", canonical, leaf_id);
        self.by_path.insert(canonical, leaf_id);

        Ok(leaf_id)
    }

    /// Look up the id of a path. The empty path resolves to the root.
    pub fn resolve(&self, path: &str) -> Option<ConfigId> {
        if path.is_empty() {
            return Some(ConfigId::ROOT);
        }
        let canonical = path::canonicalize(path).ok()?;
        self.by_path.get(&canonical).copied()
    }

    /// Canonical path of an id.
    pub fn resolve_path(&self, id: ConfigId) -> Option<&str> {
        self.node(id).map(ConfigNode::path)
    }

    /// Registered type of an id; `None` for unknown ids and structural nodes.
    pub fn type_of(&self, id: ConfigId) -> Option<TypeTag> {
        self.node(id).and_then(ConfigNode::type_tag)
    }

    /// Direct children of an id, empty for leaves and unknown ids.
    pub fn children_of(&self, id: ConfigId) -> &[ConfigId] {
        match self.node(id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    /// Parent of an id; `None` for the root and unknown ids.
    pub fn parent_of(&self, id: ConfigId) -> Option<ConfigId> {
        self.node(id).and_then(ConfigNode::parent)
    }

    /// Node stored under an id.
    pub fn node(&self, id: ConfigId) -> Option<&ConfigNode> {
        self.nodes.get(id.index()?)
    }

    /// Number of nodes, including the root and structural nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing besides the root has been registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Pre-order walk of the subtree rooted at `id` (including `id`).
    pub fn subtree(&self, id: ConfigId) -> Vec<ConfigId> {
        let mut out = Vec::new();
        if self.node(id).is_none() {
            return out;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children_of(current).iter().rev());
        }
        out
    }

    /// Ids of typed entries inside a section, in pre-order.
    ///
    /// An empty section covers the whole tree; an unregistered section has
    /// no entries.
    pub fn ids_under(&self, section: &str) -> ConfigResult<Vec<ConfigId>> {
        let section = path::canonical_section(section)?;
        let Some(top) = self.resolve(&section) else {
            return Ok(Vec::new());
        };
        Ok(self
            .subtree(top)
            .into_iter()
            .filter(|id| self.type_of(*id).is_some())
            .collect())
    }

    /// Read a typed value.
    pub fn get<T: ConfigType>(&self, id: ConfigId) -> ConfigResult<T> {
        let slot = self.slot(id, T::TAG)?;
        T::from_value(&slot.current).ok_or_else(|| self.mismatch(id, T::TAG))
    }

    /// Current value of an entry regardless of type.
    pub fn value(&self, id: ConfigId) -> ConfigResult<&ConfigValue> {
        let node = self.known(id)?;
        node.current_value().ok_or_else(|| self.mismatch_any(id))
    }

    /// Registered default of an entry.
    pub fn default_of(&self, id: ConfigId) -> ConfigResult<&ConfigValue> {
        let node = self.known(id)?;
        node.default_value().ok_or_else(|| self.mismatch_any(id))
    }

    /// Write a typed value.
    pub fn set<T: ConfigType>(&mut self, id: ConfigId, value: T) -> ConfigResult<()> {
        self.set_value(id, value.into_value())
    }

    /// Replace the current value; the variant must match the registered type.
    pub fn set_value(&mut self, id: ConfigId, value: ConfigValue) -> ConfigResult<()> {
        let requested = value.tag();
        self.slot(id, requested)?;
        if let Some(slot) = self.slot_mut(id) {
            slot.current = value;
        }
        Ok(())
    }

    /// Restore an entry's current value to its default.
    pub fn reset(&mut self, id: ConfigId) -> ConfigResult<()> {
        let default = self.default_of(id)?.clone();
        self.set_value(id, default)
    }

    fn next_id(&self) -> ConfigId {
        ConfigId(self.nodes.len() as u32 + 1)
    }

    fn link(&mut self, parent: ConfigId, child: ConfigId) {
        if let Some(index) = parent.index() {
            self.nodes[index].children.push(child);
        }
    }

    fn known(&self, id: ConfigId) -> ConfigResult<&ConfigNode> {
        self.node(id)
            .ok_or_else(|| ConfigError::NotFound(format!("id {}", id)))
    }

    fn slot(&self, id: ConfigId, requested: TypeTag) -> ConfigResult<&ValueSlot> {
        let node = self.known(id)?;
        match &node.slot {
            Some(slot) if slot.default.tag() == requested => Ok(slot),
            _ => Err(self.mismatch(id, requested)),
        }
    }

    fn slot_mut(&mut self, id: ConfigId) -> Option<&mut ValueSlot> {
        let index = id.index()?;
        self.nodes.get_mut(index)?.slot.as_mut()
    }

    fn mismatch(&self, id: ConfigId, requested: TypeTag) -> ConfigError {
        ConfigError::TypeMismatch {
            id,
            registered: self.type_of(id),
            requested,
        }
    }

    fn mismatch_any(&self, id: ConfigId) -> ConfigError {
        ConfigError::NotFound(format!("id {} has no value", id))
    }
}
