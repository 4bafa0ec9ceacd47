//! Engine Shell Tests
//!
//! Tests for:
//! - Drop-frame pacing against the total-elapsed clock
//! - Runtime toggle round-trips through the persisted settings record

use std::time::Duration;

use gloam::config::SavedSettings;
use gloam::engine::{FramePacer, TARGET_FPS};
use gloam::renderer::RenderToggles;

// ============================================================================
// Frame Pacing
// ============================================================================

#[test]
fn pacer_skips_until_the_first_interval() {
    let mut pacer = FramePacer::new(60.0);
    let interval = pacer.min_interval();

    // The reference point starts at zero, so even the very first request
    // waits out one full interval.
    assert!(!pacer.admit(Duration::ZERO));
    assert!(!pacer.admit(interval - Duration::from_nanos(1)));
    assert!(pacer.admit(interval));
}

#[test]
fn pacer_skips_inside_the_interval_after_an_admission() {
    let mut pacer = FramePacer::new(60.0);
    let interval = pacer.min_interval();

    assert!(pacer.admit(interval));
    assert!(!pacer.admit(interval + Duration::from_millis(1)));
    assert!(!pacer.admit(interval * 2 - Duration::from_nanos(1)));
    assert!(pacer.admit(interval * 2));
}

#[test]
fn pacer_skipped_requests_keep_the_reference_point() {
    let mut pacer = FramePacer::new(60.0);
    let interval = pacer.min_interval();

    assert!(pacer.admit(interval));
    // A burst of early requests must not push the next admission out.
    for n in 1..10 {
        assert!(!pacer.admit(interval + Duration::from_micros(n)));
    }
    assert!(pacer.admit(interval * 2));
}

#[test]
fn pacer_reset_forgets_the_reference_point() {
    let mut pacer = FramePacer::new(60.0);
    let interval = pacer.min_interval();
    let late = interval * 100;

    assert!(pacer.admit(late));
    assert!(!pacer.admit(late + Duration::from_millis(1)));

    pacer.reset();
    assert!(pacer.admit(late + Duration::from_millis(2)));
}

#[test]
fn pacer_honors_custom_rates() {
    let mut pacer = FramePacer::new(10.0);
    assert_eq!(pacer.min_interval(), Duration::from_millis(100));
    assert!(!pacer.admit(Duration::from_millis(99)));
    assert!(pacer.admit(Duration::from_millis(100)));
}

#[test]
fn default_pacer_matches_the_target_rate() {
    let pacer = FramePacer::default();
    assert_eq!(
        pacer.min_interval(),
        Duration::from_secs_f64(1.0 / TARGET_FPS)
    );
}

// ============================================================================
// Toggle Persistence
// ============================================================================

#[test]
fn toggle_defaults_match_saved_defaults() {
    let toggles = RenderToggles::default();
    let saved = SavedSettings::default();
    assert_eq!(toggles.texture_mapping, saved.texture_mapping);
    assert_eq!(toggles.normal_mapping, saved.normal_mapping);
    assert_eq!(toggles.shadow_mapping, saved.shadow_mapping);
    assert_eq!(toggles.deferred_shading, saved.deferred_shading);
}

#[test]
fn apply_saved_overwrites_only_the_persisted_toggles() {
    let mut toggles = RenderToggles {
        wireframe: true,
        mod_two: true,
        ..RenderToggles::default()
    };
    let saved = SavedSettings {
        texture_mapping: true,
        normal_mapping: false,
        shadow_mapping: false,
        deferred_shading: false,
        flashlight_active: true,
        userlight_active: false,
        moonlight_active: false,
    };

    toggles.apply_saved(&saved);
    assert!(toggles.texture_mapping);
    assert!(!toggles.normal_mapping);
    assert!(!toggles.shadow_mapping);
    assert!(!toggles.deferred_shading);
    assert!(toggles.wireframe, "session-only toggles survive a load");
    assert!(toggles.mod_two, "session-only toggles survive a load");
}

#[test]
fn to_saved_takes_light_flags_from_the_caller() {
    let toggles = RenderToggles {
        texture_mapping: true,
        ..RenderToggles::default()
    };

    let saved = toggles.to_saved(true, false, true);
    assert!(saved.texture_mapping);
    assert!(saved.flashlight_active);
    assert!(!saved.userlight_active);
    assert!(saved.moonlight_active);
}

#[test]
fn toggles_round_trip_through_saved_settings() {
    let original = RenderToggles {
        texture_mapping: true,
        deferred_shading: false,
        ..RenderToggles::default()
    };

    let saved = original.to_saved(false, true, true);
    let mut restored = RenderToggles::default();
    restored.apply_saved(&saved);

    assert_eq!(restored.texture_mapping, original.texture_mapping);
    assert_eq!(restored.normal_mapping, original.normal_mapping);
    assert_eq!(restored.shadow_mapping, original.shadow_mapping);
    assert_eq!(restored.deferred_shading, original.deferred_shading);
}
