use clinic_manager::config::Config;
use clinic_manager::logging::init_logging;

#[test]
fn events_go_to_the_configured_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.log");
    let config = Config::from_pairs(vec![
        ("DATABASE_URL".to_string(), "postgres://localhost/clinic".to_string()),
        ("LOG_FILE".to_string(), path.display().to_string()),
        ("LOG_LEVEL".to_string(), "debug".to_string()),
    ])
    .unwrap();

    init_logging(&config).unwrap();
    tracing::info!(appointment_id = 42, "appointment created");
    tracing::trace!("below the filter");

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("appointment created"));
    assert!(written.contains("appointment_id=42"));
    assert!(!written.contains("below the filter"));

    // a second subscriber cannot be installed over the first
    assert!(init_logging(&config).is_err());
}
