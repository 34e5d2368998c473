//! Integration tests for logging functionality
//!
//! The global subscriber can be installed once per process, so this binary
//! holds a single test that initializes it.

use tabula::config::LoggingConfig;
use tabula::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_file_logging_initialization() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.is_dir());

    tabula::log_export_start!("Addressbook_Model_Contact", "default");
    drop(guard);

    // a second subscriber cannot be installed
    let config = LoggingConfig::default();
    assert!(init_logging("info", &config).is_err());
}
