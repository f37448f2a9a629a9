//! Core engine for hierarchical attention badges ("red dots").
//! This crate owns the badge tree, its check registrations and the tick
//! pipeline that aggregates pending counts up the tree.

pub mod badge;
pub mod engine;
pub mod logging;
pub mod model;
pub mod registry;
pub mod topology;

pub use badge::binding::{Anchor, BadgeVisual, Size, UiBinding, UiTarget};
pub use badge::pool::{BadgePool, PoolStats, PrototypePool};
pub use engine::aggregation::{
    aggregate_counts, evaluate_own_counts, refresh_bindings, run_tick, TickReport,
};
pub use engine::schedule::{TickSchedule, DEFAULT_CHECK_INTERVAL};
pub use engine::system::{RedDotSystem, SystemConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::node::{clamp_count, BadgeNode, NodeKey, NodeSnapshot};
pub use registry::error::RegistryError;
pub use registry::event_registry::{
    CheckArg, CheckFn, EventRegistration, EventRegistry, OwnerId, RegistrationId,
};
pub use registry::node_registry::{NodeRegistry, NodeRemoveMode};
pub use topology::builder::{
    build_topology, parse_priority_path, Topology, TopologyError, TopologyNode,
};
pub use topology::config::{BuildOptions, TopologyConfig, TopologyEntry, DEFAULT_MAX_DEPTH};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
