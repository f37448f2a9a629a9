//! Priority-path topology builder.
//!
//! Entries are first placed into a scratch tree of index-addressed slots, then
//! the slot tree is walked depth-first (ascending index order) to emit nodes
//! with their resolved parents.

use crate::model::node::NodeKey;
use crate::topology::config::{BuildOptions, TopologyConfig};
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{btree_map, BTreeMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::IntErrorKind;

static PRIORITY_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)*$").expect("valid priority path regex"));

/// Configuration errors. Fatal to tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Node key is blank.
    EmptyKey,
    /// Priority path is blank after trim.
    EmptyPath { key: NodeKey },
    /// Priority path contains a non-numeric or empty segment.
    InvalidPath { key: NodeKey, path: String },
    /// One segment does not fit a slot index.
    IndexOverflow { key: NodeKey, segment: String },
    /// Path has more segments than allowed.
    PathTooDeep {
        key: NodeKey,
        depth: usize,
        max_depth: usize,
    },
    /// Two entries resolve to the same slot.
    SlotCollision {
        path: String,
        first: NodeKey,
        second: NodeKey,
    },
}

impl Display for TopologyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "topology node key must not be blank"),
            Self::EmptyPath { key } => write!(f, "priority path is empty for node `{key}`"),
            Self::InvalidPath { key, path } => {
                write!(f, "invalid priority path `{path}` for node `{key}`")
            }
            Self::IndexOverflow { key, segment } => write!(
                f,
                "priority path segment `{segment}` is out of range for node `{key}`"
            ),
            Self::PathTooDeep {
                key,
                depth,
                max_depth,
            } => write!(
                f,
                "priority path for node `{key}` has depth {depth}, max is {max_depth}"
            ),
            Self::SlotCollision {
                path,
                first,
                second,
            } => write!(
                f,
                "nodes `{first}` and `{second}` share priority path `{path}`"
            ),
        }
    }
}

impl Error for TopologyError {}

/// One resolved node in build order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyNode {
    pub key: NodeKey,
    pub name: Option<String>,
    /// Nearest configured ancestor, `None` for top-level nodes.
    pub parent: Option<NodeKey>,
    /// Parsed slot indices.
    pub path: Vec<usize>,
}

/// Resolved tree shape. Parents always precede their children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    nodes: Vec<TopologyNode>,
}

impl Topology {
    pub fn nodes(&self) -> &[TopologyNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TopologyNode> {
        self.nodes.iter().find(|node| node.key == key)
    }

    /// Keys of top-level nodes in slot order.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| node.parent.is_none())
            .map(|node| node.key.as_str())
            .collect()
    }

    /// Keys of direct children of `key` in slot order.
    pub fn children_of(&self, key: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| node.parent.as_deref() == Some(key))
            .map(|node| node.key.as_str())
            .collect()
    }
}

#[derive(Default)]
struct Slot {
    key: Option<NodeKey>,
    children: BTreeMap<usize, Slot>,
}

impl Drop for Slot {
    // Flattens teardown so deep slot chains do not recurse.
    fn drop(&mut self) {
        let mut pending: Vec<Slot> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut slot) = pending.pop() {
            pending.extend(std::mem::take(&mut slot.children).into_values());
        }
    }
}

/// Parses a dotted priority path into slot indices.
pub fn parse_priority_path(key: &str, raw: &str) -> Result<Vec<usize>, TopologyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TopologyError::EmptyPath {
            key: key.to_string(),
        });
    }
    if !PRIORITY_PATH_RE.is_match(trimmed) {
        return Err(TopologyError::InvalidPath {
            key: key.to_string(),
            path: trimmed.to_string(),
        });
    }

    trimmed
        .split('.')
        .map(|segment| {
            segment.parse::<usize>().map_err(|err| match err.kind() {
                IntErrorKind::PosOverflow => TopologyError::IndexOverflow {
                    key: key.to_string(),
                    segment: segment.to_string(),
                },
                _ => TopologyError::InvalidPath {
                    key: key.to_string(),
                    path: trimmed.to_string(),
                },
            })
        })
        .collect()
}

/// Resolves `config` into a parent-linked topology.
///
/// # Errors
/// - Any malformed path, depth violation or slot collision aborts the whole
///   build; nothing is partially applied.
pub fn build_topology(
    config: &TopologyConfig,
    options: &BuildOptions,
) -> Result<Topology, TopologyError> {
    match place_entries(config, options) {
        Ok(root) => {
            let nodes = materialize(&root, config);
            info!(
                "event=topology_build module=topology status=ok entries={} nodes={}",
                config.len(),
                nodes.len()
            );
            Ok(Topology { nodes })
        }
        Err(err) => {
            error!(
                "event=topology_build module=topology status=error entries={} error={}",
                config.len(),
                err
            );
            Err(err)
        }
    }
}

fn place_entries(config: &TopologyConfig, options: &BuildOptions) -> Result<Slot, TopologyError> {
    let mut root = Slot::default();
    for (key, entry) in config {
        if key.trim().is_empty() {
            return Err(TopologyError::EmptyKey);
        }

        let indices = parse_priority_path(key, &entry.priority)?;
        if let Some(max_depth) = options.max_depth {
            if indices.len() > max_depth {
                return Err(TopologyError::PathTooDeep {
                    key: key.clone(),
                    depth: indices.len(),
                    max_depth,
                });
            }
        }

        let slot = indices.iter().fold(&mut root, |slot, index| {
            slot.children.entry(*index).or_default()
        });
        if let Some(first) = &slot.key {
            return Err(TopologyError::SlotCollision {
                path: entry.priority.trim().to_string(),
                first: first.clone(),
                second: key.clone(),
            });
        }
        slot.key = Some(key.clone());
    }
    Ok(root)
}

/// Depth-first walk in ascending index order. Each frame holds the remaining
/// children of one slot and the nearest configured ancestor above them.
fn materialize<'a>(root: &'a Slot, config: &TopologyConfig) -> Vec<TopologyNode> {
    let mut out = Vec::with_capacity(config.len());
    let mut path: Vec<usize> = Vec::new();
    let mut stack: Vec<(btree_map::Iter<'a, usize, Slot>, Option<&'a NodeKey>)> =
        vec![(root.children.iter(), None)];

    while let Some((children, parent)) = stack.last_mut() {
        let parent = *parent;
        let Some((index, child)) = children.next() else {
            stack.pop();
            path.pop();
            continue;
        };

        path.push(*index);
        let next_parent = match &child.key {
            Some(key) => {
                debug!(
                    "event=topology_link module=topology node={} parent={}",
                    key,
                    parent.map(String::as_str).unwrap_or("root")
                );
                out.push(TopologyNode {
                    key: key.clone(),
                    name: config.get(key).and_then(|entry| entry.name.clone()),
                    parent: parent.cloned(),
                    path: path.clone(),
                });
                Some(key)
            }
            None => parent,
        };
        stack.push((child.children.iter(), next_parent));
    }
    out
}
