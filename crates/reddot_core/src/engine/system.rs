//! Badge system facade.
//!
//! # Responsibility
//! - Own the node registry, event registry, badge pool and tick schedule of
//!   one engine instance.
//! - Expose the host-facing API, reporting runtime failures as `bool`/`Option`
//!   sentinels and log records instead of errors.
//!
//! # Invariants
//! - Only topology building fails hard; a failed build leaves state untouched.
//! - After `teardown`, no badge is held by any binding and no tick fires.
//! - Checks must not call back into the system that evaluates them.

use crate::badge::binding::{BadgeVisual, UiTarget};
use crate::badge::pool::{BadgePool, PrototypePool};
use crate::engine::aggregation::{run_tick, TickReport};
use crate::engine::schedule::{TickSchedule, DEFAULT_CHECK_INTERVAL};
use crate::model::node::{BadgeNode, NodeSnapshot};
use crate::registry::error::RegistryError;
use crate::registry::event_registry::{CheckArg, CheckFn, EventRegistry, OwnerId, RegistrationId};
use crate::registry::node_registry::{NodeRegistry, NodeRemoveMode};
use crate::topology::builder::{build_topology, TopologyError};
use crate::topology::config::{BuildOptions, TopologyConfig};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Milliseconds between scheduled ticks. Zero means the default (1000).
    pub check_interval_ms: u64,
}

impl SystemConfig {
    pub fn check_interval(&self) -> Duration {
        if self.check_interval_ms == 0 {
            DEFAULT_CHECK_INTERVAL
        } else {
            Duration::from_millis(self.check_interval_ms)
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: DEFAULT_CHECK_INTERVAL.as_millis() as u64,
        }
    }
}

/// One badge engine instance.
pub struct RedDotSystem<T, P: BadgePool> {
    nodes: NodeRegistry<T, P::Badge>,
    events: EventRegistry,
    pool: P,
    schedule: TickSchedule,
}

impl<T, B> RedDotSystem<T, PrototypePool<B>>
where
    B: Clone + BadgeVisual,
    T: UiTarget<B> + PartialEq,
{
    /// Creates an engine whose badges are clones of `prototype`.
    pub fn init(prototype: B) -> Self {
        Self::with_pool(PrototypePool::new(prototype), SystemConfig::default())
    }
}

impl<T, P> RedDotSystem<T, P>
where
    P: BadgePool,
    P::Badge: BadgeVisual,
    T: UiTarget<P::Badge> + PartialEq,
{
    /// Creates an engine around a host-supplied pool.
    pub fn with_pool(pool: P, config: SystemConfig) -> Self {
        info!(
            "event=system_init module=engine status=ok check_interval_ms={}",
            config.check_interval().as_millis()
        );
        Self {
            nodes: NodeRegistry::new(),
            events: EventRegistry::new(),
            pool,
            schedule: TickSchedule::new(config.check_interval()),
        }
    }

    /// Replaces the node tree with one built from `config`.
    ///
    /// # Errors
    /// - Returns `TopologyError` for malformed configuration; the current tree
    ///   is left untouched in that case.
    pub fn build_tree(&mut self, config: &TopologyConfig) -> Result<(), TopologyError> {
        self.build_tree_with(config, &BuildOptions::default())
    }

    /// Same as [`build_tree`](Self::build_tree) with explicit limits.
    pub fn build_tree_with(
        &mut self,
        config: &TopologyConfig,
        options: &BuildOptions,
    ) -> Result<(), TopologyError> {
        let topology = build_topology(config, options)?;
        let released = self.nodes.release_all(&mut self.pool);
        let replaced = self.nodes.len();
        self.nodes = NodeRegistry::from_topology(&topology);
        info!(
            "event=tree_build module=engine status=ok nodes={} replaced={} released={}",
            self.nodes.len(),
            replaced,
            released
        );
        Ok(())
    }

    /// Adds a leaf node under `parent` (top level when `None`).
    pub fn add_node(&mut self, key: &str, parent: Option<&str>) -> bool {
        match self.nodes.add_node(key, parent) {
            Ok(()) => {
                info!(
                    "event=node_add module=engine status=ok node={} parent={}",
                    key,
                    parent.unwrap_or("root")
                );
                true
            }
            Err(err) => {
                warn!("event=node_add module=engine status=error node={key} error={err}");
                false
            }
        }
    }

    /// Removes `key`, handing its children to its parent.
    ///
    /// With `auto_remove_events`, the node's check list is dropped as well.
    pub fn remove_node(&mut self, key: &str, auto_remove_events: bool) -> bool {
        self.remove_node_with(key, auto_remove_events, NodeRemoveMode::Dissolve)
    }

    /// Removes `key` using an explicit descendant policy.
    pub fn remove_node_with(
        &mut self,
        key: &str,
        auto_remove_events: bool,
        mode: NodeRemoveMode,
    ) -> bool {
        match self.nodes.remove_node(key, mode, &mut self.pool) {
            Ok(removed) => {
                if auto_remove_events {
                    let dropped: usize = removed
                        .iter()
                        .map(|removed_key| self.events.remove_node(removed_key))
                        .sum();
                    info!(
                        "event=node_remove_checks module=engine node={key} dropped={dropped}"
                    );
                }
                true
            }
            Err(err) => {
                warn!("event=node_remove module=engine status=error node={key} error={err}");
                false
            }
        }
    }

    /// Moves `key` under `new_parent` (top level when `None`).
    pub fn move_node(&mut self, key: &str, new_parent: Option<&str>) -> bool {
        match self.nodes.move_node(key, new_parent) {
            Ok(()) => true,
            Err(err) => {
                warn!("event=node_move module=engine status=error node={key} error={err}");
                false
            }
        }
    }

    /// Registers a check on `key`.
    ///
    /// Returns `None` when the same check and owner are already registered.
    pub fn register_event(
        &mut self,
        key: &str,
        check: CheckFn,
        owner: OwnerId,
        args: Vec<CheckArg>,
    ) -> Option<RegistrationId> {
        if !self.nodes.contains(key) {
            info!("event=check_register module=engine status=pending_node node={key}");
        }
        match self.events.register(key, check, owner, args) {
            Ok(id) => Some(id),
            Err(RegistryError::DuplicateRegistration { .. }) => None,
            Err(err) => {
                warn!("event=check_register module=engine status=error node={key} error={err}");
                None
            }
        }
    }

    /// Removes one registration, searching only `key` when given.
    pub fn unregister_event(&mut self, id: RegistrationId, key: Option<&str>) -> bool {
        match self.events.unregister(id, key) {
            Ok(_) => true,
            Err(err) => {
                warn!("event=check_unregister module=engine status=error error={err}");
                false
            }
        }
    }

    /// Removes every registration of `owner`, within `key` or everywhere.
    pub fn unregister_event_by_owner(&mut self, owner: &OwnerId, key: Option<&str>) -> bool {
        self.events.unregister_by_owner(owner, key) > 0
    }

    /// Binds a UI target to `key`.
    ///
    /// Returns `Ok(false)` when the target is already bound.
    ///
    /// # Errors
    /// - `RegistryError::NodeNotFound` when `key` does not exist.
    pub fn register_ui_node(&mut self, key: &str, target: T) -> Result<bool, RegistryError> {
        self.nodes.attach_target(key, target).inspect_err(|err| {
            warn!("event=ui_register module=engine status=error node={key} error={err}");
        })
    }

    /// Unbinds a UI target from `key`, releasing its badge.
    pub fn unregister_ui_node(&mut self, key: &str, target: &T) -> bool {
        match self.nodes.detach_target(key, target, &mut self.pool) {
            Ok(()) => true,
            Err(err) => {
                warn!("event=ui_unregister module=engine status=error node={key} error={err}");
                false
            }
        }
    }

    /// Overrides `key`'s own count. Negative values clamp to zero.
    ///
    /// Checks registered on `key` overwrite the value on the next tick.
    pub fn set_manual_count(&mut self, key: &str, count: i64) -> bool {
        match self.nodes.set_manual_count(key, count) {
            Ok(()) => true,
            Err(err) => {
                warn!("event=manual_count module=engine status=error node={key} error={err}");
                false
            }
        }
    }

    /// Runs one full tick immediately, outside the schedule.
    pub fn refresh_all(&mut self) -> TickReport {
        run_tick(&mut self.nodes, &self.events, &mut self.pool)
    }

    /// Arms the recurring tick; the first one is due one interval after `now`.
    pub fn start(&mut self, now: Instant) {
        self.schedule.start(now);
        info!(
            "event=schedule_start module=engine interval_ms={}",
            self.schedule.interval().as_millis()
        );
    }

    /// Cancels the recurring tick.
    pub fn stop(&mut self) {
        self.schedule.stop();
        info!("event=schedule_stop module=engine");
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_running()
    }

    /// Runs a tick when one is due at `now`.
    pub fn pump(&mut self, now: Instant) -> Option<TickReport> {
        if self.schedule.poll(now) {
            Some(self.refresh_all())
        } else {
            None
        }
    }

    /// Stops the schedule and returns every mounted badge to the pool.
    ///
    /// Returns the number of released badges. Safe to call repeatedly.
    pub fn teardown(&mut self) -> usize {
        self.schedule.stop();
        let released = self.nodes.release_all(&mut self.pool);
        info!("event=system_teardown module=engine status=ok released={released}");
        released
    }

    pub fn node(&self, key: &str) -> Option<NodeSnapshot> {
        self.nodes.snapshot(key)
    }

    pub fn get_node(&self, key: &str) -> Option<&BadgeNode<T, P::Badge>> {
        self.nodes.get(key)
    }

    /// On/off state as of the last tick. Unknown keys are off.
    pub fn is_on(&self, key: &str) -> bool {
        self.nodes.get(key).is_some_and(BadgeNode::is_on)
    }

    pub fn aggregate_count(&self, key: &str) -> Option<u64> {
        self.nodes.get(key).map(BadgeNode::aggregate_count)
    }

    pub fn contains_node(&self, key: &str) -> bool {
        self.nodes.contains(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of checks registered on `key`.
    pub fn event_count(&self, key: &str) -> usize {
        self.events.len_of(key)
    }

    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.nodes.roots()
    }

    pub fn nodes(&self) -> &NodeRegistry<T, P::Badge> {
        &self.nodes
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn schedule(&self) -> &TickSchedule {
        &self.schedule
    }
}
