//! Tick passes over the node and event registries.

use crate::badge::binding::{BadgeVisual, UiTarget};
use crate::badge::pool::BadgePool;
use crate::registry::event_registry::{sum_checks, EventRegistry};
use crate::registry::node_registry::NodeRegistry;
use log::{debug, error};

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Nodes whose own count was recomputed from checks.
    pub evaluated: usize,
    /// Nodes that are on after aggregation.
    pub on_nodes: usize,
    /// Badges taken from the pool.
    pub acquired: usize,
    /// Badges returned to the pool.
    pub released: usize,
}

/// Recomputes own counts for every node that has a check list.
///
/// Nodes without a list keep their manual count. Lists for unknown keys are
/// skipped. Returns the number of evaluated nodes.
pub fn evaluate_own_counts<T, B>(nodes: &mut NodeRegistry<T, B>, events: &EventRegistry) -> usize {
    let mut evaluated = 0;
    for (key, registrations) in events.lists() {
        let Some(node) = nodes.node_mut(key) else {
            debug!("event=own_count module=engine status=skipped reason=unknown_node node={key}");
            continue;
        };
        node.own_count = sum_checks(registrations);
        evaluated += 1;
    }
    evaluated
}

/// Recomputes aggregate counts and on/off flags bottom-up.
///
/// Returns the number of nodes that are on.
pub fn aggregate_counts<T, B>(nodes: &mut NodeRegistry<T, B>) -> usize {
    let totals = subtree_totals(nodes);
    let mut on_nodes = 0;
    for (node, total) in nodes.nodes_mut().zip(totals) {
        node.aggregate_count = total;
        node.is_on = total > 0;
        if node.is_on {
            on_nodes += 1;
        }
    }
    on_nodes
}

/// Aggregate count per node, in key order.
fn subtree_totals<T, B>(nodes: &NodeRegistry<T, B>) -> Vec<u64> {
    let keys: Vec<&str> = nodes.keys().collect();
    let mut totals = vec![0u64; keys.len()];
    for key in nodes.post_order() {
        let (Ok(index), Some(node)) = (keys.binary_search(&key), nodes.get(key)) else {
            continue;
        };
        let child_total = node
            .children
            .iter()
            .map(|child| match keys.binary_search(&child.as_str()) {
                Ok(child_index) => totals[child_index],
                Err(_) => {
                    error!(
                        "event=invariant_violation module=engine reason=dangling_child node={} child={}",
                        key, child
                    );
                    0
                }
            })
            .fold(0, u64::saturating_add);
        totals[index] = node.own_count.saturating_add(child_total);
    }
    totals
}

/// Mounts badges on bindings of on nodes and releases them on off nodes.
///
/// Returns `(acquired, released)`.
pub fn refresh_bindings<T, P>(nodes: &mut NodeRegistry<T, P::Badge>, pool: &mut P) -> (usize, usize)
where
    P: BadgePool,
    P::Badge: BadgeVisual,
    T: UiTarget<P::Badge>,
{
    let mut acquired = 0;
    let mut released = 0;
    for node in nodes.nodes_mut() {
        let count = node.aggregate_count;
        for binding in node.bindings.iter_mut() {
            if node.is_on {
                acquired += usize::from(binding.show(pool, count));
            } else {
                released += usize::from(binding.hide(pool));
            }
        }
    }
    (acquired, released)
}

/// Runs one full tick: own counts, aggregation, refresh.
pub fn run_tick<T, P>(
    nodes: &mut NodeRegistry<T, P::Badge>,
    events: &EventRegistry,
    pool: &mut P,
) -> TickReport
where
    P: BadgePool,
    P::Badge: BadgeVisual,
    T: UiTarget<P::Badge>,
{
    let evaluated = evaluate_own_counts(nodes, events);
    let on_nodes = aggregate_counts(nodes);
    let (acquired, released) = refresh_bindings(nodes, pool);

    let report = TickReport {
        evaluated,
        on_nodes,
        acquired,
        released,
    };
    debug!(
        "event=tick module=engine nodes={} evaluated={} on={} acquired={} released={}",
        nodes.len(),
        report.evaluated,
        report.on_nodes,
        report.acquired,
        report.released
    );
    report
}
