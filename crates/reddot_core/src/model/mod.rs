//! Badge tree domain model.
//!
//! # Responsibility
//! - Define the per-feature node record held by the node arena.
//! - Define read-only snapshots handed to hosts and tests.
//!
//! # Invariants
//! - Every node is identified by a unique `NodeKey` within one registry.
//! - Parent/children links are key references, never owned nodes.

pub mod node;
