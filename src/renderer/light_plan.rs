//! Per-light view/projection planning.
//!
//! Once per frame, after culling, every light gets a shadow frustum fitted
//! around the merged scene sphere:
//!
//! - **Spot** lights point from their own position: near/far are the sphere
//!   interval clamped to the light's range, and a near > far crossover means
//!   the sphere is entirely outside the range, flagging the light out of
//!   range for this frame.
//! - **Directional** lights get an orthographic box wide enough for the
//!   sphere, with the eye backed away along the light direction. They can
//!   never degenerate.
//! - **Point** light shadow maps are not implemented; the planner leaves
//!   point lights untouched (their shadows come from the volume path).
//!
//! All functions here are pure math over spheres and matrices, so the whole
//! policy is testable without a device.

use glam::{Mat4, Vec3};

use crate::errors::{GloamError, Result};
use crate::scene::bounds::BoundingSphere;
use crate::scene::camera::Camera;
use crate::scene::light::{Light, LightKind};
use crate::scene::registry::SceneRegistry;

/// Color channels available in the shared shadow map.
pub const SHADOW_CHANNEL_COUNT: usize = 3;

/// Outcome of fitting one light's shadow frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightPlan {
    Fitted { view: Mat4, proj: Mat4 },
    /// The scene sphere lies entirely outside the light's range.
    OutOfRange,
}

/// Fits a spot light's perspective frustum around `scene`.
///
/// The near plane sits where the sphere starts (clamped to the camera near
/// plane), the far plane where it ends (clamped to the light's range). The
/// vertical field of view is twice the outer cone half-angle at unit
/// aspect, so the frustum circumscribes the lit cone. `camera_up` resolves
/// the view roll the same way the main camera does.
#[must_use]
pub fn plan_spot(
    position: Vec3,
    direction: Vec3,
    outer_angle: f32,
    range_max: f32,
    scene: &BoundingSphere,
    camera_up: Vec3,
) -> LightPlan {
    let distance = position.distance(scene.center);
    let near = (distance - scene.radius).max(Camera::NEAR_PLANE);
    let far = (distance + scene.radius).min(range_max);
    if near > far {
        return LightPlan::OutOfRange;
    }

    let view = Mat4::look_at_rh(position, position + direction, camera_up);
    let proj = Mat4::perspective_rh(2.0 * outer_angle, 1.0, near, far);
    LightPlan::Fitted { view, proj }
}

/// Fits a directional light's orthographic box around `scene`.
///
/// The eye is placed behind the sphere along the light direction; the box
/// is exactly as wide as the sphere and deep enough to cover it from the
/// camera near plane out to at least the camera far plane.
#[must_use]
pub fn plan_directional(direction: Vec3, scene: &BoundingSphere) -> LightPlan {
    let near = Camera::NEAR_PLANE;
    let far = (near + 2.0 * scene.radius).max(Camera::FAR_PLANE);
    let extent = scene.radius;

    let eye = scene.center - 2.0 * direction * (scene.radius + near);
    let view = Mat4::look_at_rh(eye, scene.center, Vec3::Y);
    let proj = Mat4::orthographic_rh(-extent, extent, -extent, extent, near, far);
    LightPlan::Fitted { view, proj }
}

/// Point-light shadow maps are a known hole.
///
/// # Errors
///
/// Always returns [`GloamError::Unimplemented`].
pub fn plan_point() -> Result<LightPlan> {
    Err(GloamError::Unimplemented("point-light shadow-map planning"))
}

/// Camera far plane tightened to the visible scene: just past the far side
/// of the scene sphere, never beyond the configured far plane. An empty
/// scene (sentinel sphere) keeps the configured far plane.
#[must_use]
pub fn clamped_camera_far(scene: &BoundingSphere, camera_position: Vec3) -> f32 {
    // f32::min ignores a NaN operand, which resolves the sentinel case.
    (scene.center.distance(camera_position) + scene.radius).min(Camera::FAR_PLANE)
}

/// Runs the planner over every registered light, updating matrices and
/// out-of-range flags in place.
///
/// Callers gate this on shadow mapping being enabled and the visible set
/// being non-empty, so `scene` is never the sentinel here.
pub fn plan_lights(registry: &mut SceneRegistry, scene: &BoundingSphere, camera_up: Vec3) {
    for (_, light) in registry.lights_mut() {
        match light.kind {
            LightKind::Spot => {
                match plan_spot(
                    light.position,
                    light.direction,
                    light.outer_angle,
                    light.range_max,
                    scene,
                    camera_up,
                ) {
                    LightPlan::Fitted { view, proj } => {
                        light.light_view = view;
                        light.light_proj = proj;
                        light.out_of_range = false;
                    }
                    LightPlan::OutOfRange => {
                        log::trace!("spot light {} out of range this frame", light.id);
                        light.out_of_range = true;
                    }
                }
            }
            LightKind::Directional => {
                if let LightPlan::Fitted { view, proj } = plan_directional(light.direction, scene)
                {
                    light.light_view = view;
                    light.light_proj = proj;
                    light.out_of_range = false;
                }
            }
            LightKind::Point => {}
        }
    }
}

/// Assigns shadow-map channels 0..[`SHADOW_CHANNEL_COUNT`] to eligible
/// lights in iteration order and returns how many were assigned.
///
/// Every light's channel is reset first, so a light that lost eligibility
/// since last frame cannot keep a stale assignment. Eligible means active,
/// in range, and of a kind that casts into the shadow map. Lights past the
/// channel cap keep channel −1 and simply cast no shadow.
pub fn assign_shadow_channels<'a>(lights: impl Iterator<Item = &'a mut Light>) -> u32 {
    let mut assigned = 0u32;
    for light in lights {
        light.map_channel = -1;
        if !(light.contributes() && light.casts_shadow_map()) {
            continue;
        }
        if assigned as usize >= SHADOW_CHANNEL_COUNT {
            log::warn!(
                "light {} skipped for shadow mapping, all {} channels taken",
                light.id,
                SHADOW_CHANNEL_COUNT
            );
            continue;
        }
        light.map_channel = assigned as i32;
        assigned += 1;
    }
    assigned
}
