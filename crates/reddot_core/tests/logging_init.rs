use reddot_core::{init_logging, logging_status};

#[test]
fn init_logging_is_idempotent_and_rejects_changes() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let log_dir_str = log_dir.to_str().unwrap();

    init_logging("info", log_dir_str).unwrap();
    init_logging("INFO", log_dir_str).unwrap();

    let (level, active_dir) = logging_status().unwrap();
    assert_eq!(level, "info");
    assert_eq!(active_dir, log_dir);
    assert!(log_dir.is_dir());

    let err = init_logging("debug", log_dir_str).unwrap_err();
    assert!(err.contains("level"));
    let other = dir.path().join("other");
    assert!(init_logging("info", other.to_str().unwrap()).is_err());
    assert!(init_logging("info", "relative/logs").is_err());
}
