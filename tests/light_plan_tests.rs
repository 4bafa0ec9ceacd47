//! Light Planning Tests
//!
//! Tests for:
//! - Spot frustum fitting: near/far from the scene sphere, range clamping,
//!   the out-of-range degeneracy
//! - Directional orthographic fitting
//! - Point-light planning failing loudly
//! - Camera far-plane clamping against the scene sphere
//! - Shadow-map channel assignment order, cap, and reset

use glam::{Mat4, Vec3};

use gloam::errors::GloamError;
use gloam::renderer::light_plan::{
    LightPlan, SHADOW_CHANNEL_COUNT, assign_shadow_channels, clamped_camera_far, plan_directional,
    plan_lights, plan_point, plan_spot,
};
use gloam::scene::bounds::BoundingSphere;
use gloam::scene::camera::Camera;
use gloam::scene::light::{Light, LightKind};
use gloam::scene::registry::SceneRegistry;

const EPSILON: f32 = 1e-4;

fn approx_mat(a: Mat4, b: Mat4) {
    for i in 0..4 {
        for j in 0..4 {
            assert!(
                (a.col(i)[j] - b.col(i)[j]).abs() < EPSILON,
                "matrix mismatch at [{i}][{j}]: {} vs {}",
                a.col(i)[j],
                b.col(i)[j]
            );
        }
    }
}

// ============================================================================
// Spot Planning
// ============================================================================

#[test]
fn spot_fits_scene_sphere_interval() {
    let position = Vec3::new(0.0, 0.0, 10.0);
    let direction = Vec3::NEG_Z;
    let outer = 30.0_f32.to_radians();
    let scene = BoundingSphere::new(Vec3::ZERO, 2.0);

    let plan = plan_spot(position, direction, outer, f32::INFINITY, &scene, Vec3::Y);
    let LightPlan::Fitted { view, proj } = plan else {
        panic!("expected a fitted plan, got {plan:?}");
    };

    // Near at the sphere's leading edge, far at its trailing edge.
    approx_mat(proj, Mat4::perspective_rh(2.0 * outer, 1.0, 8.0, 12.0));
    approx_mat(view, Mat4::look_at_rh(position, position + direction, Vec3::Y));
}

#[test]
fn spot_inside_scene_clamps_near_to_camera_near() {
    // The light sits inside the sphere: the raw near would be negative.
    let scene = BoundingSphere::new(Vec3::ZERO, 5.0);
    let plan = plan_spot(
        Vec3::ZERO,
        Vec3::NEG_Z,
        0.5,
        f32::INFINITY,
        &scene,
        Vec3::Y,
    );
    let LightPlan::Fitted { proj, .. } = plan else {
        panic!("expected a fitted plan, got {plan:?}");
    };
    approx_mat(proj, Mat4::perspective_rh(1.0, 1.0, Camera::NEAR_PLANE, 5.0));
}

#[test]
fn spot_range_caps_far_plane() {
    let scene = BoundingSphere::new(Vec3::ZERO, 2.0);
    let plan = plan_spot(
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::NEG_Z,
        0.5,
        11.0,
        &scene,
        Vec3::Y,
    );
    let LightPlan::Fitted { proj, .. } = plan else {
        panic!("expected a fitted plan, got {plan:?}");
    };
    approx_mat(proj, Mat4::perspective_rh(1.0, 1.0, 8.0, 11.0));
}

#[test]
fn spot_beyond_range_is_out_of_range() {
    // Sphere interval [8, 12] but the light only reaches 5.
    let scene = BoundingSphere::new(Vec3::ZERO, 2.0);
    let plan = plan_spot(
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::NEG_Z,
        0.5,
        5.0,
        &scene,
        Vec3::Y,
    );
    assert_eq!(plan, LightPlan::OutOfRange);
}

// ============================================================================
// Directional Planning
// ============================================================================

#[test]
fn directional_box_matches_scene_sphere() {
    let scene = BoundingSphere::new(Vec3::new(1.0, 2.0, 3.0), 5.0);
    let direction = Vec3::new(0.0, -1.0, 0.0);

    let plan = plan_directional(direction, &scene);
    let LightPlan::Fitted { view, proj } = plan else {
        panic!("expected a fitted plan, got {plan:?}");
    };

    let near = Camera::NEAR_PLANE;
    let far = (near + 2.0 * scene.radius).max(Camera::FAR_PLANE);
    approx_mat(proj, Mat4::orthographic_rh(-5.0, 5.0, -5.0, 5.0, near, far));

    let eye = scene.center - 2.0 * direction * (scene.radius + near);
    approx_mat(view, Mat4::look_at_rh(eye, scene.center, Vec3::Y));
}

#[test]
fn directional_never_degenerates() {
    // Even a tiny faraway scene gets a fitted plan.
    let scene = BoundingSphere::new(Vec3::splat(1e6), 0.001);
    let plan = plan_directional(Vec3::NEG_Y, &scene);
    assert!(matches!(plan, LightPlan::Fitted { .. }));
}

// ============================================================================
// Point Planning
// ============================================================================

#[test]
fn point_planning_fails_loudly() {
    let err = plan_point().unwrap_err();
    assert!(matches!(err, GloamError::Unimplemented(_)));
}

// ============================================================================
// Far-Plane Clamping
// ============================================================================

#[test]
fn far_plane_clamps_to_scene_back() {
    let scene = BoundingSphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0);
    let far = clamped_camera_far(&scene, Vec3::ZERO);
    assert!((far - 12.0).abs() < EPSILON);
}

#[test]
fn far_plane_never_exceeds_configured_far() {
    let scene = BoundingSphere::new(Vec3::new(0.0, 0.0, -300.0), 10.0);
    let far = clamped_camera_far(&scene, Vec3::ZERO);
    assert!((far - Camera::FAR_PLANE).abs() < EPSILON);
}

#[test]
fn far_plane_with_sentinel_scene_keeps_configured_far() {
    let far = clamped_camera_far(&BoundingSphere::sentinel(), Vec3::ZERO);
    assert!((far - Camera::FAR_PLANE).abs() < EPSILON);
}

// ============================================================================
// Registry Planning
// ============================================================================

#[test]
fn out_of_range_spot_keeps_stale_matrices() {
    let mut registry = SceneRegistry::new();
    let mut light = Light::new_spot(
        Vec3::ONE,
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::NEG_Z,
        1.0,
        0.2,
        0.4,
        2.0,
    );
    light.range_max = 5.0;
    let key = registry.add_light(light).unwrap();

    // Scene interval [8, 12] is entirely beyond range 5.
    let scene = BoundingSphere::new(Vec3::ZERO, 2.0);
    plan_lights(&mut registry, &scene, Vec3::Y);

    let light = registry.light(key).unwrap();
    assert!(light.out_of_range);
    assert!(!light.contributes());
    // The planner skipped the transform update entirely.
    approx_mat(light.light_view, Mat4::IDENTITY);
    approx_mat(light.light_proj, Mat4::IDENTITY);
}

#[test]
fn out_of_range_clears_when_scene_returns() {
    let mut registry = SceneRegistry::new();
    let mut light = Light::new_spot(
        Vec3::ONE,
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::NEG_Z,
        1.0,
        0.2,
        0.4,
        2.0,
    );
    light.range_max = 5.0;
    let key = registry.add_light(light).unwrap();

    let far_scene = BoundingSphere::new(Vec3::ZERO, 2.0);
    plan_lights(&mut registry, &far_scene, Vec3::Y);
    assert!(registry.light(key).unwrap().out_of_range);

    // Next frame the scene moved into range; the light recovers.
    let near_scene = BoundingSphere::new(Vec3::new(0.0, 0.0, 7.0), 1.0);
    plan_lights(&mut registry, &near_scene, Vec3::Y);
    let light = registry.light(key).unwrap();
    assert!(!light.out_of_range);
    assert!(light.contributes());
}

#[test]
fn plan_lights_leaves_point_lights_alone() {
    let mut registry = SceneRegistry::new();
    let key = registry
        .add_light(Light::new_point(Vec3::ONE, Vec3::ZERO, 1.0))
        .unwrap();

    plan_lights(
        &mut registry,
        &BoundingSphere::new(Vec3::ZERO, 2.0),
        Vec3::Y,
    );

    let light = registry.light(key).unwrap();
    approx_mat(light.light_view, Mat4::IDENTITY);
    approx_mat(light.light_proj, Mat4::IDENTITY);
    assert!(!light.out_of_range);
}

// ============================================================================
// Channel Assignment
// ============================================================================

fn spot_at_origin() -> Light {
    Light::new_spot(Vec3::ONE, Vec3::ZERO, Vec3::NEG_Z, 1.0, 0.2, 0.4, 2.0)
}

#[test]
fn channels_assigned_in_order() {
    let mut lights = vec![
        Light::new_directional(Vec3::ONE, Vec3::NEG_Y, 1.0),
        spot_at_origin(),
        Light::new_directional(Vec3::ONE, Vec3::NEG_X, 1.0),
    ];
    let assigned = assign_shadow_channels(lights.iter_mut());
    assert_eq!(assigned, 3);
    assert_eq!(lights[0].map_channel, 0);
    assert_eq!(lights[1].map_channel, 1);
    assert_eq!(lights[2].map_channel, 2);
}

#[test]
fn channel_cap_leaves_excess_unassigned() {
    let mut lights = vec![
        spot_at_origin(),
        spot_at_origin(),
        Light::new_directional(Vec3::ONE, Vec3::NEG_Y, 1.0),
        Light::new_directional(Vec3::ONE, Vec3::NEG_X, 1.0),
    ];
    let assigned = assign_shadow_channels(lights.iter_mut());
    assert_eq!(assigned as usize, SHADOW_CHANNEL_COUNT);
    assert_eq!(lights[3].map_channel, -1);
}

#[test]
fn inactive_and_out_of_range_lights_get_no_channel() {
    let mut inactive = spot_at_origin();
    inactive.active = false;
    let mut lost = spot_at_origin();
    lost.out_of_range = true;
    let mut lights = vec![inactive, lost, spot_at_origin()];

    let assigned = assign_shadow_channels(lights.iter_mut());
    assert_eq!(assigned, 1);
    assert_eq!(lights[0].map_channel, -1);
    assert_eq!(lights[1].map_channel, -1);
    assert_eq!(lights[2].map_channel, 0);
}

#[test]
fn point_lights_never_get_a_channel() {
    let mut lights = vec![
        Light::new_point(Vec3::ONE, Vec3::ZERO, 1.0),
        spot_at_origin(),
    ];
    let assigned = assign_shadow_channels(lights.iter_mut());
    assert_eq!(assigned, 1);
    assert_eq!(lights[0].kind, LightKind::Point);
    assert_eq!(lights[0].map_channel, -1);
    assert_eq!(lights[1].map_channel, 0);
}

#[test]
fn stale_channels_are_reset_before_assignment() {
    let mut light = spot_at_origin();
    light.map_channel = 2;
    light.active = false;
    let mut lights = vec![light];

    let assigned = assign_shadow_channels(lights.iter_mut());
    assert_eq!(assigned, 0);
    // Last frame's channel must not survive losing eligibility.
    assert_eq!(lights[0].map_channel, -1);
}
