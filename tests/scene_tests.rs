//! Scene Registry and Camera Tests
//!
//! Tests for:
//! - Light registration: the per-kind cap, rejection without registration,
//!   removal by key and by uuid
//! - Light factories: normalization, cone cosines, shadow eligibility
//! - Camera basis vectors, movement, and projection far plane

use glam::{Vec3, Vec4};

use gloam::errors::GloamError;
use gloam::scene::camera::Camera;
use gloam::scene::light::{Light, LightKind, MAX_LIGHTS_PER_KIND};
use gloam::scene::registry::SceneRegistry;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn point_light() -> Light {
    Light::new_point(Vec3::ONE, Vec3::ZERO, 1.0)
}

fn spot_light() -> Light {
    Light::new_spot(Vec3::ONE, Vec3::ZERO, Vec3::NEG_Z, 1.0, 0.2, 0.4, 2.0)
}

// ============================================================================
// Light Cap
// ============================================================================

#[test]
fn light_cap_allows_three_of_a_kind() {
    let mut registry = SceneRegistry::new();
    for _ in 0..MAX_LIGHTS_PER_KIND {
        registry.add_light(point_light()).unwrap();
    }
    assert_eq!(registry.light_count_of(LightKind::Point), 3);
}

#[test]
fn fourth_light_of_a_kind_is_rejected() {
    let mut registry = SceneRegistry::new();
    for _ in 0..MAX_LIGHTS_PER_KIND {
        registry.add_light(point_light()).unwrap();
    }

    let err = registry.add_light(point_light()).unwrap_err();
    match err {
        GloamError::TooManyLights { kind, cap } => {
            assert_eq!(kind, LightKind::Point);
            assert_eq!(cap, MAX_LIGHTS_PER_KIND);
        }
        other => panic!("expected TooManyLights, got {other:?}"),
    }
    // The rejected light never became part of the scene.
    assert_eq!(registry.light_count(), MAX_LIGHTS_PER_KIND);
}

#[test]
fn cap_is_tracked_per_kind() {
    let mut registry = SceneRegistry::new();
    for _ in 0..MAX_LIGHTS_PER_KIND {
        registry.add_light(point_light()).unwrap();
        registry.add_light(spot_light()).unwrap();
        registry
            .add_light(Light::new_directional(Vec3::ONE, Vec3::NEG_Y, 1.0))
            .unwrap();
    }
    assert_eq!(registry.light_count(), 3 * MAX_LIGHTS_PER_KIND);
    assert!(registry.add_light(spot_light()).is_err());
}

#[test]
fn removal_frees_a_slot() {
    let mut registry = SceneRegistry::new();
    let first = registry.add_light(point_light()).unwrap();
    for _ in 1..MAX_LIGHTS_PER_KIND {
        registry.add_light(point_light()).unwrap();
    }
    assert!(registry.add_light(point_light()).is_err());

    assert!(registry.remove_light(first).is_some());
    registry.add_light(point_light()).unwrap();
    assert_eq!(registry.light_count_of(LightKind::Point), 3);
}

// ============================================================================
// Lookup and Removal
// ============================================================================

#[test]
fn lookup_by_key_and_mutation() {
    let mut registry = SceneRegistry::new();
    let key = registry.add_light(point_light()).unwrap();

    registry.light_mut(key).unwrap().intensity = 7.5;
    assert!(approx(registry.light(key).unwrap().intensity, 7.5));
}

#[test]
fn removal_by_uuid() {
    let mut registry = SceneRegistry::new();
    let light = point_light();
    let uuid = light.uuid;
    let key = registry.add_light(light).unwrap();

    let removed = registry.remove_light_by_uuid(uuid).unwrap();
    assert_eq!(removed.uuid, uuid);
    assert!(registry.light(key).is_none());
    assert_eq!(registry.light_count(), 0);
}

#[test]
fn unknown_uuid_removal_returns_none() {
    let mut registry = SceneRegistry::new();
    registry.add_light(point_light()).unwrap();
    assert!(registry.remove_light_by_uuid(uuid::Uuid::new_v4()).is_none());
    assert_eq!(registry.light_count(), 1);
}

#[test]
fn removed_key_no_longer_resolves() {
    let mut registry = SceneRegistry::new();
    let key = registry.add_light(point_light()).unwrap();
    assert!(registry.remove_light(key).is_some());
    assert!(registry.light(key).is_none());
    assert!(registry.light_mut(key).is_none());
}

// ============================================================================
// Light Factories
// ============================================================================

#[test]
fn lights_get_unique_identities() {
    let a = point_light();
    let b = point_light();
    assert_ne!(a.uuid, b.uuid);
    assert_ne!(a.id, b.id);
}

#[test]
fn directional_factory_normalizes_direction() {
    let light = Light::new_directional(Vec3::ONE, Vec3::new(-1.0, -3.0, -1.0), 5.0);
    assert!(approx(light.direction.length(), 1.0));
    assert_eq!(light.kind, LightKind::Directional);
}

#[test]
fn spot_factory_stores_cone_as_radians() {
    let inner = 10.0_f32.to_radians();
    let outer = 35.0_f32.to_radians();
    let light = Light::new_spot(Vec3::ONE, Vec3::ZERO, Vec3::NEG_Z, 1.0, inner, outer, 2.0);
    assert!(approx(light.cos_inner(), inner.cos()));
    assert!(approx(light.cos_outer(), outer.cos()));
    assert!(light.cos_inner() > light.cos_outer());
}

#[test]
fn shadow_map_eligibility_by_kind() {
    assert!(!point_light().casts_shadow_map());
    assert!(spot_light().casts_shadow_map());
    assert!(Light::new_directional(Vec3::ONE, Vec3::NEG_Y, 1.0).casts_shadow_map());
}

#[test]
fn fresh_lights_contribute_with_no_channel() {
    let light = spot_light();
    assert!(light.contributes());
    assert_eq!(light.map_channel, -1);
    assert_eq!(light.range_min, 0.0);
    assert_eq!(light.range_max, f32::INFINITY);
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn default_orientation_looks_down_negative_z() {
    let camera = Camera::new(1.0);
    let look = camera.look();
    assert!(approx(look.x, 0.0));
    assert!(approx(look.y, 0.0));
    assert!(approx(look.z, -1.0));
}

#[test]
fn basis_stays_orthonormal_after_rotation() {
    let mut camera = Camera::new(1.0);
    camera.rotate(1.3, -0.7);

    let (look, right, up) = (camera.look(), camera.right(), camera.up());
    assert!(approx(look.length(), 1.0));
    assert!(approx(right.length(), 1.0));
    assert!(approx(up.length(), 1.0));
    assert!(approx(look.dot(right), 0.0));
    assert!(approx(look.dot(up), 0.0));
    assert!(approx(right.dot(up), 0.0));
}

#[test]
fn pitch_is_clamped_short_of_the_poles() {
    let mut camera = Camera::new(1.0);
    camera.rotate(0.0, 100.0);
    // Even an absurd pitch input leaves a usable basis.
    assert!(camera.look().y < 1.0);
    assert!(approx(camera.right().length(), 1.0));
}

#[test]
fn walk_moves_along_look() {
    let mut camera = Camera::new(1.0);
    let start = camera.position();
    camera.walk(3.0);
    let moved = camera.position() - start;
    assert!(approx(moved.dot(camera.look()), 3.0));
}

#[test]
fn strafe_and_rise_move_along_the_basis() {
    let mut camera = Camera::new(1.0);
    camera.rotate(0.4, -0.2);
    let start = camera.position();
    camera.strafe(2.0);
    camera.rise(-1.0);
    let moved = camera.position() - start;
    assert!(approx(moved.dot(camera.right()), 2.0));
    assert!(approx(moved.dot(camera.up()), -1.0));
    assert!(approx(moved.dot(camera.look()), 0.0));
}

#[test]
fn default_projection_spans_the_configured_far_plane() {
    let camera = Camera::new(2.0);
    assert!(approx(camera.aspect(), 2.0));
    assert_eq!(
        camera.projection_matrix(),
        camera.projection_with_far(Camera::FAR_PLANE)
    );
}

#[test]
fn look_at_points_the_camera() {
    let mut camera = Camera::new(1.0);
    camera.set_position(Vec3::ZERO);
    camera.look_at(Vec3::new(5.0, 0.0, 0.0));
    let look = camera.look();
    assert!(approx(look.x, 1.0));
    assert!(approx(look.y, 0.0));
}

#[test]
fn projection_far_plane_maps_to_depth_one() {
    let camera = Camera::new(1.0);
    let proj = camera.projection_with_far(50.0);
    let clip = proj * Vec4::new(0.0, 0.0, -50.0, 1.0);
    assert!(approx(clip.z / clip.w, 1.0));
}
