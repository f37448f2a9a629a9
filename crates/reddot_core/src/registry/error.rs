//! Registry error taxonomy.

use crate::model::node::NodeKey;
use crate::registry::event_registry::{OwnerId, RegistrationId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Recoverable registry failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Node key is blank after trim.
    InvalidNodeKey,
    /// Target node does not exist.
    NodeNotFound(NodeKey),
    /// Requested parent node does not exist.
    ParentNotFound(NodeKey),
    /// Node key is already registered.
    DuplicateNode(NodeKey),
    /// UI target is not bound to the node.
    TargetNotBound(NodeKey),
    /// Same check and owner are already registered on the node.
    DuplicateRegistration { node: NodeKey, owner: OwnerId },
    /// No registration carries the requested id.
    RegistrationNotFound(RegistrationId),
    /// Move would make a node its own ancestor.
    CycleDetected { node: NodeKey, parent: NodeKey },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNodeKey => write!(f, "node key must not be blank"),
            Self::NodeNotFound(key) => write!(f, "badge node not found: {key}"),
            Self::ParentNotFound(key) => write!(f, "badge parent not found: {key}"),
            Self::DuplicateNode(key) => write!(f, "badge node already exists: {key}"),
            Self::TargetNotBound(key) => write!(f, "ui target is not bound to node: {key}"),
            Self::DuplicateRegistration { node, owner } => write!(
                f,
                "check already registered on node {node} for owner {owner}"
            ),
            Self::RegistrationNotFound(id) => write!(f, "check registration not found: {id}"),
            Self::CycleDetected { node, parent } => {
                write!(f, "move would create cycle: node {node} under parent {parent}")
            }
        }
    }
}

impl Error for RegistryError {}
