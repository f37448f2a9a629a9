mod common;

use common::{abc_config, config, counting_system, RecordingTarget};
use reddot_core::{
    build_topology, BuildOptions, NodeRegistry, TopologyEntry, TopologyError, DEFAULT_MAX_DEPTH,
};

#[test]
fn builds_parent_child_links_from_shared_prefixes() {
    let topology = build_topology(&abc_config(), &BuildOptions::default()).unwrap();

    assert_eq!(topology.len(), 3);
    assert_eq!(topology.roots(), vec!["A"]);
    assert_eq!(topology.children_of("A"), vec!["B", "C"]);
    assert_eq!(topology.get("C").unwrap().path, vec![0, 1]);
}

#[test]
fn parents_precede_children_in_build_order() {
    let topology = build_topology(
        &config(&[("leaf", "1.0.2"), ("mid", "1.0"), ("top", "1"), ("other", "0")]),
        &BuildOptions::default(),
    )
    .unwrap();

    let keys: Vec<&str> = topology.nodes().iter().map(|node| node.key.as_str()).collect();
    assert_eq!(keys, vec!["other", "top", "mid", "leaf"]);
    assert_eq!(topology.get("leaf").unwrap().parent.as_deref(), Some("mid"));
}

#[test]
fn registry_from_topology_mirrors_links() {
    let topology = build_topology(&abc_config(), &BuildOptions::default()).unwrap();
    let registry: NodeRegistry<(), ()> = NodeRegistry::from_topology(&topology);

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.roots().collect::<Vec<_>>(), vec!["A"]);
    let a = registry.get("A").unwrap();
    assert_eq!(a.children().collect::<Vec<_>>(), vec!["B", "C"]);
    assert_eq!(registry.get("B").unwrap().parent(), Some("A"));
}

#[test]
fn configured_names_are_carried_to_nodes() {
    let mut entries = abc_config();
    entries.insert("D".to_string(), TopologyEntry::named("0.2", "Daily tasks"));

    let mut system = counting_system();
    system.build_tree(&entries).unwrap();

    assert_eq!(system.node("D").unwrap().name.as_deref(), Some("Daily tasks"));
    assert_eq!(system.node("A").unwrap().name, None);
}

#[test]
fn slot_collision_is_rejected() {
    let err = build_topology(
        &config(&[("first", "2.1"), ("second", " 2.1 ")]),
        &BuildOptions::default(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        TopologyError::SlotCollision {
            path: "2.1".to_string(),
            first: "first".to_string(),
            second: "second".to_string(),
        }
    );
}

#[test]
fn malformed_path_fails_the_whole_build() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    system
        .register_ui_node("A", RecordingTarget::new("a-button"))
        .unwrap();

    let err = system
        .build_tree(&config(&[("X", "0"), ("Y", "0.one")]))
        .unwrap_err();
    assert!(matches!(err, TopologyError::InvalidPath { ref key, .. } if key == "Y"));

    assert_eq!(system.node_count(), 3);
    assert!(system.contains_node("A"));
    assert!(!system.contains_node("X"));
    assert_eq!(system.node("A").unwrap().binding_count, 1);
}

#[test]
fn rebuild_replaces_tree_and_releases_badges() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    system
        .register_ui_node("B", RecordingTarget::new("b-button"))
        .unwrap();
    system.set_manual_count("B", 1);
    system.refresh_all();
    assert_eq!(system.pool().outstanding(), 1);

    system.build_tree(&config(&[("Z", "0")])).unwrap();

    assert_eq!(system.node_count(), 1);
    assert!(!system.contains_node("B"));
    assert_eq!(system.pool().outstanding(), 0);
}

#[test]
fn max_depth_option_bounds_paths() {
    let mut system = counting_system();
    let err = system
        .build_tree_with(&abc_config(), &BuildOptions::with_max_depth(1))
        .unwrap_err();

    assert!(matches!(err, TopologyError::PathTooDeep { depth: 2, max_depth: 1, .. }));
    assert_eq!(system.node_count(), 0);
}

#[test]
fn oversized_path_fails_build_and_keeps_current_tree() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    let deep_path = vec!["0"; 200_000].join(".");

    let err = system
        .build_tree(&config(&[("deep", deep_path.as_str())]))
        .unwrap_err();

    assert_eq!(
        err,
        TopologyError::PathTooDeep {
            key: "deep".to_string(),
            depth: 200_000,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    );
    assert_eq!(system.node_count(), 3);
    assert_eq!(system.roots().collect::<Vec<_>>(), vec!["A"]);
}
