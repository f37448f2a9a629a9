mod common;

use common::{abc_config, config, constant, counting_system, RecordingTarget};
use reddot_core::{NodeRemoveMode, OwnerId, RegistryError};

#[test]
fn add_node_requires_existing_parent() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();

    assert!(system.add_node("B1", Some("B")));
    assert!(!system.add_node("B1", Some("B")));
    assert!(!system.add_node("X", Some("ghost")));
    assert!(!system.contains_node("X"));

    let b = system.node("B").unwrap();
    assert_eq!(b.children, vec!["B1".to_string()]);
    assert_eq!(system.node("B1").unwrap().parent.as_deref(), Some("B"));
}

#[test]
fn add_node_without_parent_creates_top_level_node() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();

    assert!(system.add_node("Mail", None));
    assert_eq!(system.roots().collect::<Vec<_>>(), vec!["A", "Mail"]);
}

#[test]
fn dynamic_node_participates_in_aggregation() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    system.add_node("c_0", Some("C"));
    system
        .register_event("c_0", constant(4), OwnerId::new("scene"), vec![])
        .unwrap();

    system.refresh_all();

    assert_eq!(system.aggregate_count("C"), Some(4));
    assert_eq!(system.aggregate_count("A"), Some(4));
}

#[test]
fn remove_node_cleans_up_and_second_remove_fails() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    let owner = OwnerId::new("scene");
    system.register_event("B", constant(2), owner.clone(), vec![]).unwrap();
    system.register_event("C", constant(0), owner, vec![]).unwrap();
    let b_button = RecordingTarget::new("b");
    system.register_ui_node("B", b_button.clone()).unwrap();
    system.refresh_all();
    assert_eq!(system.pool().outstanding(), 1);

    assert!(system.remove_node("B", true));

    assert_eq!(system.pool().outstanding(), 0);
    assert_eq!(b_button.entries().last().map(String::as_str), Some("detach b"));
    assert!(!system.node("A").unwrap().children.contains(&"B".to_string()));
    assert_eq!(system.event_count("B"), 0);
    assert!(!system.events().contains_key("B"));
    assert!(!system.remove_node("B", true));

    system.refresh_all();
    assert_eq!(system.aggregate_count("A"), Some(0));
    assert!(!system.is_on("A"));
}

#[test]
fn remove_without_auto_events_keeps_checks_for_readded_node() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    system
        .register_event("B", constant(2), OwnerId::new("scene"), vec![])
        .unwrap();

    assert!(system.remove_node("B", false));
    assert_eq!(system.event_count("B"), 1);
    system.refresh_all();
    assert_eq!(system.aggregate_count("A"), Some(0));

    assert!(system.add_node("B", Some("A")));
    system.refresh_all();
    assert_eq!(system.aggregate_count("A"), Some(2));
}

#[test]
fn dissolve_hands_children_to_grandparent() {
    let mut system = counting_system();
    system
        .build_tree(&config(&[("top", "0"), ("mid", "0.0"), ("x", "0.0.0"), ("y", "0.0.1")]))
        .unwrap();
    system.set_manual_count("y", 3);

    assert!(system.remove_node("mid", true));

    let top = system.node("top").unwrap();
    assert_eq!(top.children, vec!["x".to_string(), "y".to_string()]);
    assert_eq!(system.node("x").unwrap().parent.as_deref(), Some("top"));
    system.refresh_all();
    assert_eq!(system.aggregate_count("top"), Some(3));
}

#[test]
fn dissolving_a_root_promotes_children_to_roots() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();

    assert!(system.remove_node("A", true));

    assert_eq!(system.roots().collect::<Vec<_>>(), vec!["B", "C"]);
    assert_eq!(system.node("B").unwrap().parent, None);
}

#[test]
fn cascade_removes_subtree_with_badges_and_checks() {
    let mut system = counting_system();
    system
        .build_tree(&config(&[("top", "0"), ("mid", "0.0"), ("leaf", "0.0.0"), ("side", "0.1")]))
        .unwrap();
    system
        .register_event("leaf", constant(1), OwnerId::new("scene"), vec![])
        .unwrap();
    system.register_ui_node("mid", RecordingTarget::new("mid")).unwrap();
    system.register_ui_node("leaf", RecordingTarget::new("leaf")).unwrap();
    system.refresh_all();
    assert_eq!(system.pool().outstanding(), 2);

    assert!(system.remove_node_with("mid", true, NodeRemoveMode::Cascade));

    assert!(!system.contains_node("mid"));
    assert!(!system.contains_node("leaf"));
    assert_eq!(system.node_count(), 2);
    assert_eq!(system.pool().outstanding(), 0);
    assert!(!system.events().contains_key("leaf"));
    assert_eq!(system.node("top").unwrap().children, vec!["side".to_string()]);
}

#[test]
fn register_ui_node_is_idempotent_and_reports_unknown_nodes() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    let button = RecordingTarget::new("btn");

    assert_eq!(system.register_ui_node("A", button.clone()), Ok(true));
    assert_eq!(system.register_ui_node("A", button.clone()), Ok(false));
    assert_eq!(system.node("A").unwrap().binding_count, 1);
    assert_eq!(
        system.register_ui_node("ghost", button),
        Err(RegistryError::NodeNotFound("ghost".to_string()))
    );
}

#[test]
fn one_node_can_drive_several_targets() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    system.register_ui_node("A", RecordingTarget::new("tab")).unwrap();
    system.register_ui_node("A", RecordingTarget::new("menu")).unwrap();
    system.set_manual_count("A", 1);

    let report = system.refresh_all();

    assert_eq!(report.acquired, 2);
    assert_eq!(system.node("A").unwrap().visible_badges, 2);
    let targets: Vec<&str> = system
        .get_node("A")
        .unwrap()
        .bindings()
        .iter()
        .map(|binding| binding.target().name)
        .collect();
    assert_eq!(targets, vec!["tab", "menu"]);
}

#[test]
fn unregister_ui_node_releases_badge() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    let button = RecordingTarget::new("btn");
    system.register_ui_node("A", button.clone()).unwrap();
    system.set_manual_count("A", 2);
    system.refresh_all();

    assert!(system.unregister_ui_node("A", &button));
    assert_eq!(system.pool().outstanding(), 0);
    assert_eq!(system.node("A").unwrap().binding_count, 0);
    assert!(!system.unregister_ui_node("A", &button));
    assert!(!system.unregister_ui_node("ghost", &button));
}

#[test]
fn move_node_rejects_cycles_and_relinks() {
    let mut system = counting_system();
    system.build_tree(&abc_config()).unwrap();
    system.add_node("B1", Some("B"));

    assert!(!system.move_node("A", Some("B1")));
    assert!(system.move_node("B1", Some("C")));
    system.set_manual_count("B1", 2);
    system.refresh_all();

    assert_eq!(system.aggregate_count("C"), Some(2));
    assert_eq!(system.aggregate_count("B"), Some(0));
}
