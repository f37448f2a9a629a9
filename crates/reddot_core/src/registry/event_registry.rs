//! Per-node check registrations.
//!
//! # Responsibility
//! - Store ordered check callbacks with their owner and bound arguments.
//! - Reject duplicate (check, owner) pairs on the same node.
//! - Evaluate a node's own pending count from its checks.
//!
//! # Invariants
//! - Check identity is pointer identity of the shared `CheckFn`.
//! - A node's list keeps registration order.
//! - Emptying a list by unregistration keeps the (empty) entry, so the node's
//!   own count drops to zero on the next tick.

use crate::model::node::{clamp_count, NodeKey};
use crate::registry::error::RegistryError;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

/// Generated identifier of one registration.
pub type RegistrationId = Uuid;

/// Check callback: `(owner, bound args) -> pending amount`.
///
/// Results `<= 0` mean "nothing pending". Checks must not call back into the
/// engine that evaluates them.
pub type CheckFn = Rc<dyn Fn(&OwnerId, &[CheckArg]) -> i64>;

/// Identity of the party that registered a check.
///
/// Used for duplicate detection and bulk unregistration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Argument bound to a check at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckArg {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl CheckArg {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<i64> for CheckArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for CheckArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for CheckArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CheckArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One registered check.
pub struct EventRegistration {
    id: RegistrationId,
    check: CheckFn,
    owner: OwnerId,
    args: Vec<CheckArg>,
}

impl EventRegistration {
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn args(&self) -> &[CheckArg] {
        &self.args
    }

    /// Runs the check and clamps its result to a count.
    pub fn evaluate(&self) -> u64 {
        clamp_count((self.check)(&self.owner, &self.args))
    }

    fn matches(&self, check: &CheckFn, owner: &OwnerId) -> bool {
        Rc::ptr_eq(&self.check, check) && &self.owner == owner
    }
}

impl Debug for EventRegistration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistration")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Registry of checks keyed by node key.
#[derive(Debug, Default)]
pub struct EventRegistry {
    lists: BTreeMap<NodeKey, Vec<EventRegistration>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one check to `key`'s list.
    ///
    /// The node does not have to exist yet; checks for unknown keys are skipped
    /// during evaluation until the node appears.
    pub fn register(
        &mut self,
        key: &str,
        check: CheckFn,
        owner: OwnerId,
        args: Vec<CheckArg>,
    ) -> Result<RegistrationId, RegistryError> {
        if key.trim().is_empty() {
            return Err(RegistryError::InvalidNodeKey);
        }

        let list = self.lists.entry(key.to_string()).or_default();
        if list.iter().any(|existing| existing.matches(&check, &owner)) {
            warn!(
                "event=check_register module=registry status=rejected reason=duplicate_registration node={} owner={}",
                key, owner
            );
            return Err(RegistryError::DuplicateRegistration {
                node: key.to_string(),
                owner,
            });
        }

        let id = Uuid::new_v4();
        list.push(EventRegistration {
            id,
            check,
            owner,
            args,
        });
        debug!(
            "event=check_register module=registry status=ok node={} registration={} list_len={}",
            key,
            id,
            list.len()
        );
        Ok(id)
    }

    /// Removes the registration `id`, searching only `key` when given.
    ///
    /// Returns the key of the list it was removed from.
    pub fn unregister(
        &mut self,
        id: RegistrationId,
        key: Option<&str>,
    ) -> Result<NodeKey, RegistryError> {
        let found = match key {
            Some(key) => self
                .lists
                .get_mut(key)
                .and_then(|list| take_by_id(list, id))
                .map(|_| key.to_string()),
            None => self.lists.iter_mut().find_map(|(key, list)| {
                take_by_id(list, id).map(|_| key.clone())
            }),
        };

        match found {
            Some(node) => {
                debug!(
                    "event=check_unregister module=registry status=ok node={} registration={}",
                    node, id
                );
                Ok(node)
            }
            None => Err(RegistryError::RegistrationNotFound(id)),
        }
    }

    /// Removes every registration owned by `owner`, within `key` or everywhere.
    ///
    /// Returns the number of removed registrations.
    pub fn unregister_by_owner(&mut self, owner: &OwnerId, key: Option<&str>) -> usize {
        let mut removed = 0;
        let mut sweep = |list: &mut Vec<EventRegistration>| {
            let before = list.len();
            list.retain(|registration| &registration.owner != owner);
            removed += before - list.len();
        };

        match key {
            Some(key) => {
                if let Some(list) = self.lists.get_mut(key) {
                    sweep(list);
                }
            }
            None => self.lists.values_mut().for_each(sweep),
        }

        debug!(
            "event=check_unregister_owner module=registry owner={} scope={} removed={}",
            owner,
            key.unwrap_or("all"),
            removed
        );
        removed
    }

    /// Drops the whole list for `key`. Returns how many registrations it held.
    pub fn remove_node(&mut self, key: &str) -> usize {
        self.lists.remove(key).map_or(0, |list| list.len())
    }

    /// Sum of `key`'s clamped check results, or `None` when `key` has no list.
    pub fn own_count(&self, key: &str) -> Option<u64> {
        self.lists.get(key).map(|list| sum_checks(list))
    }

    pub fn registrations(&self, key: &str) -> &[EventRegistration] {
        self.lists
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of registrations on `key`.
    pub fn len_of(&self, key: &str) -> usize {
        self.registrations(key).len()
    }

    /// Total number of registrations across all keys.
    pub fn total_len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lists.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub(crate) fn lists(&self) -> impl Iterator<Item = (&NodeKey, &[EventRegistration])> {
        self.lists.iter().map(|(key, list)| (key, list.as_slice()))
    }
}

pub(crate) fn sum_checks(list: &[EventRegistration]) -> u64 {
    list.iter()
        .map(EventRegistration::evaluate)
        .fold(0, u64::saturating_add)
}

fn take_by_id(list: &mut Vec<EventRegistration>, id: RegistrationId) -> Option<EventRegistration> {
    let index = list.iter().position(|registration| registration.id == id)?;
    Some(list.remove(index))
}
