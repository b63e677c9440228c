//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface:
//! default loading, value persistence, reset, and the sort-option fallback.

use std::fs;

use tabsort::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use tabsort::types::settings::{HostSettings, SortSettings};
use tempfile::TempDir;

/// Helper: a SettingsEngine backed by a temp directory the caller keeps alive.
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

/// Without a config file the host starts from built-in defaults.
#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, HostSettings::default());
    assert!(!settings.sort.group_non_matching_tabs_by_domain);
    assert_eq!(settings.refresh.interval_minutes, 1);
    assert_eq!(settings.bridge.call_timeout_ms, 5000);
}

/// A change made through one engine is visible to a fresh engine on the same file.
#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("sort.group_non_matching_tabs_by_domain", serde_json::json!(true))
            .unwrap();
    }

    {
        let mut engine2 = engine_in_temp(&dir);
        let loaded = engine2.load().unwrap();
        assert!(loaded.sort.group_non_matching_tabs_by_domain);
    }
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("refresh.interval_minutes", serde_json::json!(15))
            .unwrap();
        assert_eq!(engine.get_settings().refresh.interval_minutes, 15);

        engine.reset().unwrap();
        assert_eq!(*engine.get_settings(), HostSettings::default());
    }

    {
        let mut engine2 = engine_in_temp(&dir);
        assert_eq!(engine2.load().unwrap(), HostSettings::default());
    }
}

#[test]
fn test_unknown_and_empty_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    assert!(engine.set_value("", serde_json::json!(1)).is_err());
    assert!(engine.set_value("sort.unknown", serde_json::json!(1)).is_err());
    assert!(engine.set_value("nothing.here", serde_json::json!(1)).is_err());
    assert!(engine
        .set_value("sort.group_non_matching_tabs_by_domain.deeper", serde_json::json!(1))
        .is_err());
}

#[test]
fn test_partial_file_fills_missing_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"sort": {"group_non_matching_tabs_by_domain": true}}"#).unwrap();

    let mut engine = engine_in_temp(&dir);
    let loaded = engine.load().unwrap();

    assert!(loaded.sort.group_non_matching_tabs_by_domain);
    assert_eq!(loaded.bridge.call_timeout_ms, 5000);
}

#[test]
fn test_refresh_period_stays_between_a_minute_and_a_day() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine
        .set_value("refresh.interval_minutes", serde_json::json!(0))
        .unwrap();

    assert_eq!(
        engine.get_settings().refresh.period(),
        std::time::Duration::from_secs(60)
    );

    engine
        .set_value("refresh.interval_minutes", serde_json::json!(u64::MAX))
        .unwrap();
    assert_eq!(
        engine.get_settings().refresh.period(),
        std::time::Duration::from_secs(24 * 60 * 60)
    );
}

#[test]
fn test_sort_options_read_fresh_before_each_sort() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    assert_eq!(engine.load_sort_options(), SortSettings::default());

    fs::write(
        dir.path().join("settings.json"),
        r#"{"sort": {"group_non_matching_tabs_by_domain": true}}"#,
    )
    .unwrap();
    assert!(engine.load_sort_options().group_non_matching_tabs_by_domain);

    fs::write(dir.path().join("settings.json"), "not json").unwrap();
    assert_eq!(engine.load_sort_options(), SortSettings::default());
}
