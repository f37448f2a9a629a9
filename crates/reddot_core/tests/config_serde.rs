use reddot_core::{build_topology, BuildOptions, SystemConfig, TopologyConfig, TopologyEntry};

#[test]
fn topology_config_reads_table_rows() {
    let json = r#"{
        "Home": { "priority": "0", "name": "Home tab" },
        "Daily": { "priorityPath": "0.1", "icon": "sun.png" },
        "Mail": { "priority": "1" }
    }"#;

    let config: TopologyConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config["Home"], TopologyEntry::named("0", "Home tab"));
    assert_eq!(config["Daily"], TopologyEntry::new("0.1"));
    let topology = build_topology(&config, &BuildOptions::default()).unwrap();
    assert_eq!(topology.get("Daily").unwrap().parent.as_deref(), Some("Home"));
    assert_eq!(topology.roots(), vec!["Home", "Mail"]);
}

#[test]
fn topology_entry_serializes_without_empty_name() {
    let value = serde_json::to_value(TopologyEntry::new("2.0")).unwrap();
    assert_eq!(value, serde_json::json!({ "priority": "2.0" }));
}

#[test]
fn topology_entry_requires_priority() {
    let result: Result<TopologyEntry, _> = serde_json::from_str(r#"{ "name": "orphan" }"#);
    assert!(result.is_err());
}

#[test]
fn system_config_fills_missing_fields() {
    let config: SystemConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, SystemConfig::default());

    let config: SystemConfig = serde_json::from_str(r#"{ "check_interval_ms": 200 }"#).unwrap();
    assert_eq!(config.check_interval().as_millis(), 200);
}
