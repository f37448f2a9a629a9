//! Badge tree topology from flat priority-path configuration.
//!
//! # Responsibility
//! - Describe per-node configuration records (`TopologyEntry`).
//! - Resolve dotted priority paths into parent/child links.
//!
//! # Invariants
//! - Only configured keys become nodes; path prefixes are structural only.
//! - Building is atomic: a `Topology` is either complete or not produced.

pub mod builder;
pub mod config;
