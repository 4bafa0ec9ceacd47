//! Settings Persistence Tests
//!
//! Tests for:
//! - Seven-boolean round-trip in fixed on-disk order
//! - Forgiving load: missing, truncated, and corrupt files fall back to
//!   defaults and leave a diagnostic entry
//! - Case-insensitive boolean parsing and tolerance of trailing lines
//! - The bounded diagnostic log itself

use std::fs;
use std::path::PathBuf;

use gloam::config::{SavedSettings, load_settings, save_settings};
use gloam::diagnostics::DiagnosticLog;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("gloam-{}-{name}.cfg", std::process::id()))
}

// ============================================================================
// Round-Trip
// ============================================================================

#[test]
fn round_trip_preserves_all_seven_values() {
    let path = temp_path("round-trip");
    let settings = SavedSettings {
        texture_mapping: true,
        normal_mapping: false,
        shadow_mapping: true,
        deferred_shading: true,
        flashlight_active: false,
        userlight_active: true,
        moonlight_active: false,
    };

    save_settings(&path, &settings).unwrap();
    let mut diagnostics = DiagnosticLog::new();
    let loaded = load_settings(&path, &mut diagnostics);

    assert_eq!(loaded, settings);
    assert!(diagnostics.is_empty());
    let _ = fs::remove_file(&path);
}

#[test]
fn round_trip_preserves_defaults() {
    let path = temp_path("defaults");
    save_settings(&path, &SavedSettings::default()).unwrap();

    let mut diagnostics = DiagnosticLog::new();
    assert_eq!(
        load_settings(&path, &mut diagnostics),
        SavedSettings::default()
    );
    let _ = fs::remove_file(&path);
}

#[test]
fn file_is_one_boolean_per_line() {
    let path = temp_path("format");
    let settings = SavedSettings {
        texture_mapping: true,
        ..SavedSettings::default()
    };
    save_settings(&path, &settings).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "true");
    assert!(lines.iter().all(|l| *l == "true" || *l == "false"));
    let _ = fs::remove_file(&path);
}

// ============================================================================
// Forgiving Load
// ============================================================================

#[test]
fn missing_file_yields_defaults_and_a_diagnostic() {
    let path = temp_path("missing-nonexistent");
    let mut diagnostics = DiagnosticLog::new();

    let loaded = load_settings(&path, &mut diagnostics);
    assert_eq!(loaded, SavedSettings::default());
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn truncated_file_yields_defaults_and_a_diagnostic() {
    let path = temp_path("truncated");
    fs::write(&path, "true\nfalse\ntrue\n").unwrap();

    let mut diagnostics = DiagnosticLog::new();
    let loaded = load_settings(&path, &mut diagnostics);
    assert_eq!(loaded, SavedSettings::default());
    assert_eq!(diagnostics.len(), 1);
    let _ = fs::remove_file(&path);
}

#[test]
fn corrupt_value_yields_defaults_and_a_diagnostic() {
    let path = temp_path("corrupt");
    fs::write(
        &path,
        "true\nmaybe\ntrue\ntrue\nfalse\ntrue\ntrue\n",
    )
    .unwrap();

    let mut diagnostics = DiagnosticLog::new();
    let loaded = load_settings(&path, &mut diagnostics);
    assert_eq!(loaded, SavedSettings::default());
    assert_eq!(diagnostics.len(), 1);
    let _ = fs::remove_file(&path);
}

#[test]
fn empty_file_yields_defaults_and_a_diagnostic() {
    let path = temp_path("empty");
    fs::write(&path, "").unwrap();

    let mut diagnostics = DiagnosticLog::new();
    let loaded = load_settings(&path, &mut diagnostics);
    assert_eq!(loaded, SavedSettings::default());
    assert!(!diagnostics.is_empty());
    let _ = fs::remove_file(&path);
}

#[test]
fn boolean_parsing_ignores_case_and_whitespace() {
    let path = temp_path("case");
    fs::write(&path, "True\nFALSE\ntrue\n  True  \nfalse\ntrue\nTRUE\n").unwrap();

    let mut diagnostics = DiagnosticLog::new();
    let loaded = load_settings(&path, &mut diagnostics);
    assert!(diagnostics.is_empty());
    assert!(loaded.texture_mapping);
    assert!(!loaded.normal_mapping);
    assert!(loaded.deferred_shading);
    assert!(loaded.moonlight_active);
    let _ = fs::remove_file(&path);
}

#[test]
fn trailing_lines_are_ignored() {
    let path = temp_path("trailing");
    fs::write(
        &path,
        "true\ntrue\ntrue\ntrue\ntrue\ntrue\ntrue\nleftover garbage\n",
    )
    .unwrap();

    let mut diagnostics = DiagnosticLog::new();
    let loaded = load_settings(&path, &mut diagnostics);
    assert!(diagnostics.is_empty());
    assert!(loaded.flashlight_active);
    let _ = fs::remove_file(&path);
}

// ============================================================================
// Diagnostic Log
// ============================================================================

#[test]
fn diagnostics_drain_preserves_order() {
    let mut diagnostics = DiagnosticLog::new();
    diagnostics.push("first");
    diagnostics.push("second");
    assert_eq!(
        diagnostics.drain(),
        vec!["first".to_string(), "second".to_string()]
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn diagnostics_evict_oldest_at_capacity() {
    let mut diagnostics = DiagnosticLog::with_capacity(2);
    diagnostics.push("a");
    diagnostics.push("b");
    diagnostics.push("c");
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics.drain(), vec!["b".to_string(), "c".to_string()]);
}

#[test]
fn diagnostics_iter_does_not_consume() {
    let mut diagnostics = DiagnosticLog::new();
    diagnostics.push("kept");
    assert_eq!(diagnostics.iter().count(), 1);
    assert_eq!(diagnostics.iter().next(), Some("kept"));
    assert_eq!(diagnostics.len(), 1);
}
