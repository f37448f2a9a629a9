//! Node arena for the badge tree.
//!
//! # Responsibility
//! - Own every `BadgeNode`, addressed by key.
//! - Keep parent/children links consistent under add, move and remove.
//! - Bind and unbind UI targets, returning badges to the pool on release.
//!
//! # Invariants
//! - A non-root node appears in exactly one parent's `children`; a root node
//!   appears in `roots`.
//! - Removed nodes leave no key references behind.
//! - Moves never create parent-child cycles.

use crate::badge::binding::{BadgeVisual, UiBinding, UiTarget};
use crate::badge::pool::BadgePool;
use crate::model::node::{clamp_count, BadgeNode, NodeKey, NodeSnapshot};
use crate::registry::error::RegistryError;
use crate::topology::builder::Topology;
use log::{debug, error, info};
use std::collections::{BTreeMap, BTreeSet};

/// What happens to a removed node's descendants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeRemoveMode {
    /// Remove the node only and hand its children to its parent (or the root).
    #[default]
    Dissolve,
    /// Remove the node and its whole subtree.
    Cascade,
}

/// Arena of badge nodes keyed by `NodeKey`.
pub struct NodeRegistry<T, B> {
    nodes: BTreeMap<NodeKey, BadgeNode<T, B>>,
    roots: BTreeSet<NodeKey>,
}

impl<T, B> Default for NodeRegistry<T, B> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: BTreeSet::new(),
        }
    }
}

impl<T, B> NodeRegistry<T, B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materializes every node of a resolved topology.
    pub fn from_topology(topology: &Topology) -> Self {
        let mut registry = Self::new();
        for entry in topology.nodes() {
            registry.nodes.insert(
                entry.key.clone(),
                BadgeNode::new(entry.key.clone(), entry.name.clone(), entry.parent.clone()),
            );
            registry.link(entry.parent.as_deref(), &entry.key);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&BadgeNode<T, B>> {
        self.nodes.get(key)
    }

    pub fn snapshot(&self, key: &str) -> Option<NodeSnapshot> {
        self.nodes.get(key).map(BadgeNode::snapshot)
    }

    /// Top-level node keys in ascending order.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BadgeNode<T, B>> {
        self.nodes.values()
    }

    /// Adds a leaf node under `parent`, or at top level when `parent` is `None`.
    pub fn add_node(&mut self, key: &str, parent: Option<&str>) -> Result<(), RegistryError> {
        if key.trim().is_empty() {
            return Err(RegistryError::InvalidNodeKey);
        }
        if self.nodes.contains_key(key) {
            return Err(RegistryError::DuplicateNode(key.to_string()));
        }
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(RegistryError::ParentNotFound(parent.to_string()));
            }
        }

        self.nodes.insert(
            key.to_string(),
            BadgeNode::new(key.to_string(), None, parent.map(str::to_string)),
        );
        self.link(parent, key);
        Ok(())
    }

    /// Moves `key` under `new_parent` (top level when `None`).
    pub fn move_node(&mut self, key: &str, new_parent: Option<&str>) -> Result<(), RegistryError> {
        let old_parent = self
            .nodes
            .get(key)
            .ok_or_else(|| RegistryError::NodeNotFound(key.to_string()))?
            .parent
            .clone();

        if let Some(parent) = new_parent {
            if !self.nodes.contains_key(parent) {
                return Err(RegistryError::ParentNotFound(parent.to_string()));
            }
            if self.is_ancestor_or_self(key, parent) {
                return Err(RegistryError::CycleDetected {
                    node: key.to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        self.unlink(old_parent.as_deref(), key);
        if let Some(node) = self.nodes.get_mut(key) {
            node.parent = new_parent.map(str::to_string);
        }
        self.link(new_parent, key);
        Ok(())
    }

    /// Overrides `key`'s own count. Negative values clamp to zero.
    pub fn set_manual_count(&mut self, key: &str, count: i64) -> Result<(), RegistryError> {
        let node = self
            .nodes
            .get_mut(key)
            .ok_or_else(|| RegistryError::NodeNotFound(key.to_string()))?;
        node.own_count = clamp_count(count);
        Ok(())
    }

    pub(crate) fn node_mut(&mut self, key: &str) -> Option<&mut BadgeNode<T, B>> {
        self.nodes.get_mut(key)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut BadgeNode<T, B>> {
        self.nodes.values_mut()
    }

    /// Node keys ordered children-before-parents, starting from the roots.
    pub(crate) fn post_order(&self) -> Vec<&str> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = BTreeSet::new();
        let mut stack: Vec<(&str, bool)> = self
            .roots
            .iter()
            .rev()
            .map(|key| (key.as_str(), false))
            .collect();

        while let Some((key, expanded)) = stack.pop() {
            if expanded {
                order.push(key);
                continue;
            }

            let fresh = visited.insert(key);
            debug_assert!(fresh, "badge node reached twice: {key}");
            if !fresh {
                error!("event=invariant_violation module=registry reason=node_reached_twice node={key}");
                continue;
            }
            let Some(node) = self.nodes.get(key) else {
                debug_assert!(false, "dangling badge node reference: {key}");
                error!("event=invariant_violation module=registry reason=dangling_child node={key}");
                continue;
            };

            stack.push((key, true));
            stack.extend(node.children.iter().rev().map(|child| (child.as_str(), false)));
        }
        order
    }

    fn is_ancestor_or_self(&self, ancestor: &str, key: &str) -> bool {
        let mut visited = BTreeSet::new();
        let mut cursor = Some(key);
        while let Some(current) = cursor {
            if current == ancestor || !visited.insert(current) {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|node| node.parent.as_deref());
        }
        false
    }

    fn link(&mut self, parent: Option<&str>, child: &str) {
        match parent {
            Some(parent) => match self.nodes.get_mut(parent) {
                Some(parent_node) => {
                    parent_node.children.insert(child.to_string());
                }
                None => {
                    debug_assert!(false, "linking {child} under missing parent {parent}");
                    error!(
                        "event=invariant_violation module=registry reason=missing_parent node={} parent={}",
                        child, parent
                    );
                    if let Some(node) = self.nodes.get_mut(child) {
                        node.parent = None;
                    }
                    self.roots.insert(child.to_string());
                }
            },
            None => {
                self.roots.insert(child.to_string());
            }
        }
    }

    fn unlink(&mut self, parent: Option<&str>, child: &str) {
        match parent.and_then(|parent| self.nodes.get_mut(parent)) {
            Some(parent_node) => {
                parent_node.children.remove(child);
            }
            None => {
                self.roots.remove(child);
            }
        }
    }
}

impl<T: PartialEq, B> NodeRegistry<T, B> {
    /// Binds `target` to `key`.
    ///
    /// Returns `Ok(false)` when the target is already bound (no state change).
    pub fn attach_target(&mut self, key: &str, target: T) -> Result<bool, RegistryError> {
        let node = self
            .nodes
            .get_mut(key)
            .ok_or_else(|| RegistryError::NodeNotFound(key.to_string()))?;
        if node
            .bindings
            .iter()
            .any(|binding| binding.target() == &target)
        {
            return Ok(false);
        }
        node.bindings.push(UiBinding::new(target));
        Ok(true)
    }
}

impl<T, B> NodeRegistry<T, B>
where
    T: UiTarget<B> + PartialEq,
    B: BadgeVisual,
{
    /// Unbinds `target` from `key`, releasing its badge if one is mounted.
    pub fn detach_target<P>(&mut self, key: &str, target: &T, pool: &mut P) -> Result<(), RegistryError>
    where
        P: BadgePool<Badge = B>,
    {
        let node = self
            .nodes
            .get_mut(key)
            .ok_or_else(|| RegistryError::NodeNotFound(key.to_string()))?;
        let index = node
            .bindings
            .iter()
            .position(|binding| binding.target() == target)
            .ok_or_else(|| RegistryError::TargetNotBound(key.to_string()))?;
        let mut binding = node.bindings.remove(index);
        binding.hide(pool);
        Ok(())
    }

    /// Removes `key` according to `mode`.
    ///
    /// Returns the removed keys, `key` first. Every removed node's badges are
    /// returned to `pool`.
    pub fn remove_node<P>(
        &mut self,
        key: &str,
        mode: NodeRemoveMode,
        pool: &mut P,
    ) -> Result<Vec<NodeKey>, RegistryError>
    where
        P: BadgePool<Badge = B>,
    {
        let parent = self
            .nodes
            .get(key)
            .ok_or_else(|| RegistryError::NodeNotFound(key.to_string()))?
            .parent
            .clone();
        self.unlink(parent.as_deref(), key);

        let removed_keys = match mode {
            NodeRemoveMode::Dissolve => vec![key.to_string()],
            NodeRemoveMode::Cascade => self.subtree_keys(key),
        };

        let mut released = 0;
        for removed_key in &removed_keys {
            let Some(mut node) = self.nodes.remove(removed_key) else {
                continue;
            };
            released += release_bindings(&mut node, pool);
            if mode == NodeRemoveMode::Dissolve {
                for child in std::mem::take(&mut node.children) {
                    if let Some(child_node) = self.nodes.get_mut(&child) {
                        child_node.parent = parent.clone();
                    }
                    self.link(parent.as_deref(), &child);
                }
            }
        }

        info!(
            "event=node_remove module=registry status=ok node={} mode={:?} removed={} released={}",
            key,
            mode,
            removed_keys.len(),
            released
        );
        Ok(removed_keys)
    }

    /// Returns every mounted badge to `pool`. Returns the number released.
    pub fn release_all<P>(&mut self, pool: &mut P) -> usize
    where
        P: BadgePool<Badge = B>,
    {
        let released = self
            .nodes
            .values_mut()
            .map(|node| release_bindings(node, pool))
            .sum();
        debug!("event=badge_release_all module=registry released={released}");
        released
    }

    fn subtree_keys(&self, key: &str) -> Vec<NodeKey> {
        let mut keys = Vec::new();
        let mut stack = vec![key.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().cloned());
            }
            keys.push(current);
        }
        keys
    }
}

fn release_bindings<T, B, P>(node: &mut BadgeNode<T, B>, pool: &mut P) -> usize
where
    T: UiTarget<B>,
    B: BadgeVisual,
    P: BadgePool<Badge = B>,
{
    node.bindings
        .iter_mut()
        .filter(|binding| binding.has_badge())
        .map(|binding| usize::from(binding.hide(pool)))
        .sum()
}
