//! Runtime node and event registries.
//!
//! # Responsibility
//! - Own the node arena (tree links, counts, UI bindings).
//! - Own per-node check registrations.
//! - Report recoverable failures as `RegistryError` values.
//!
//! # Invariants
//! - Node keys are unique at any instant; a removed key may be re-added.
//! - A node is never its own ancestor.

pub mod error;
pub mod event_registry;
pub mod node_registry;
