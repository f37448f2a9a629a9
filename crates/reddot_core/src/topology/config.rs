//! Topology configuration records.

use crate::model::node::NodeKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for one badge node.
///
/// Deserializes from records shaped like `{"priority": "1.2.0", "name": "Daily"}`.
/// Unknown fields are ignored so hosts can feed richer table rows directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyEntry {
    /// Dot-separated slot indices from the root, e.g. `"1.2.0"`.
    #[serde(alias = "priorityPath")]
    pub priority: String,
    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TopologyEntry {
    pub fn new(priority: impl Into<String>) -> Self {
        Self {
            priority: priority.into(),
            name: None,
        }
    }

    pub fn named(priority: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            priority: priority.into(),
            name: Some(name.into()),
        }
    }
}

/// Full topology configuration keyed by node key.
pub type TopologyConfig = BTreeMap<NodeKey, TopologyEntry>;

/// Default cap on priority path segments.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Tree construction limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum number of path segments. `None` means unlimited.
    pub max_depth: Option<usize>,
}

impl BuildOptions {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }

    /// No depth cap. The builder stays iterative, so only memory bounds depth.
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }
}
