//! Badge node record.
//!
//! # Responsibility
//! - Hold one node's tree links, counts, on/off flag and UI bindings.
//! - Provide count clamping shared by registries and the aggregation passes.
//!
//! # Invariants
//! - `aggregate_count == own_count + sum(children.aggregate_count)` after every tick.
//! - `is_on == (aggregate_count > 0)`.
//! - `children` never contains the node itself or any of its ancestors.

use crate::badge::binding::UiBinding;
use std::collections::BTreeSet;

/// Stable feature identifier, e.g. `"shop.gold"` or `"131"`.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NodeKey = String;

/// One attention-indicator node stored in the node arena.
pub struct BadgeNode<T, B> {
    pub(crate) key: NodeKey,
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: BTreeSet<NodeKey>,
    pub(crate) own_count: u64,
    pub(crate) aggregate_count: u64,
    pub(crate) is_on: bool,
    pub(crate) bindings: Vec<UiBinding<T, B>>,
}

impl<T, B> BadgeNode<T, B> {
    pub(crate) fn new(key: NodeKey, name: Option<String>, parent: Option<NodeKey>) -> Self {
        Self {
            key,
            name,
            parent,
            children: BTreeSet::new(),
            own_count: 0,
            aggregate_count: 0,
            is_on: false,
            bindings: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Optional display label from topology configuration.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Parent key. `None` means the node hangs off the implicit super-root.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(String::as_str)
    }

    /// Count contributed by this node's own checks or manual count.
    pub fn own_count(&self) -> u64 {
        self.own_count
    }

    /// Own count plus every descendant's own count, as of the last tick.
    pub fn aggregate_count(&self) -> u64 {
        self.aggregate_count
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// UI bindings in registration order.
    pub fn bindings(&self) -> &[UiBinding<T, B>] {
        &self.bindings
    }

    /// Builds a detached read model of this node.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            key: self.key.clone(),
            name: self.name.clone(),
            parent: self.parent.clone(),
            children: self.children.iter().cloned().collect(),
            own_count: self.own_count,
            aggregate_count: self.aggregate_count,
            is_on: self.is_on,
            binding_count: self.bindings.len(),
            visible_badges: self
                .bindings
                .iter()
                .filter(|binding| binding.has_badge())
                .count(),
        }
    }
}

/// Read model of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub key: NodeKey,
    pub name: Option<String>,
    pub parent: Option<NodeKey>,
    /// Child keys in ascending key order.
    pub children: Vec<NodeKey>,
    pub own_count: u64,
    pub aggregate_count: u64,
    pub is_on: bool,
    /// Number of UI targets bound to the node.
    pub binding_count: usize,
    /// Number of bindings currently holding an acquired badge.
    pub visible_badges: usize,
}

/// Clamps a signed pending amount to a non-negative count.
pub fn clamp_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
