//! Tests for config functionality.

use crate::config::{Config, GrantPolicy};
use crate::error::LockError;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.grant_policy, GrantPolicy::BatchShared);
    assert!(config.compact_idle_resources);
    assert!(config.interactive_banner);
    assert!(config.events_path.is_none());
}

#[test]
fn test_parse_empty_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
grant_policy: single
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.grant_policy, GrantPolicy::Single);
    assert!(config.compact_idle_resources);
    assert!(config.interactive_banner);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
grant_policy: batch_shared
compact_idle_resources: false
interactive_banner: false
events_path: /tmp/lockman-events.ndjson
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.grant_policy, GrantPolicy::BatchShared);
    assert!(!config.compact_idle_resources);
    assert!(!config.interactive_banner);
    assert_eq!(
        config.events_path,
        Some(PathBuf::from("/tmp/lockman-events.ndjson"))
    );
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
grant_policy: single
deadlock_detection: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.grant_policy, GrantPolicy::Single);
}

#[test]
fn test_invalid_grant_policy_is_rejected() {
    let err = Config::from_yaml("grant_policy: round_robin").unwrap_err();
    assert!(matches!(err, LockError::Config(_)));
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_empty_events_path_fails_validation() {
    let err = Config::from_yaml("events_path: \"\"").unwrap_err();
    assert!(err.to_string().contains("events_path must not be empty"));
}

#[test]
fn test_yaml_roundtrip_keeps_values() {
    let config = Config {
        grant_policy: GrantPolicy::Single,
        compact_idle_resources: false,
        ..Config::default()
    };
    let yaml = config.to_yaml().unwrap();
    assert!(yaml.contains("grant_policy: single"));
    assert!(!yaml.contains("events_path"));

    assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lockman.yaml");
    std::fs::write(&path, "interactive_banner: false\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert!(!config.interactive_banner);

    let config = Config::load_or_default(Some(path.as_path())).unwrap();
    assert!(!config.interactive_banner);
}

#[test]
fn test_load_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(dir.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_load_or_default_without_path() {
    assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
}

#[test]
fn test_grant_policy_from_str() {
    assert_eq!(GrantPolicy::from_str("single"), Some(GrantPolicy::Single));
    assert_eq!(
        GrantPolicy::from_str("batch_shared"),
        Some(GrantPolicy::BatchShared)
    );
    assert_eq!(GrantPolicy::from_str("Single"), None);
    assert_eq!(GrantPolicy::Single.as_str(), "single");
}
