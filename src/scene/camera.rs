//! Free camera and view frustum.
//!
//! The camera supplies the matrices and axes every pass consumes: view and
//! projection, world position, and the look/up/right basis. Movement here is
//! pure transform math; input bindings live with the application shell.
//!
//! [`Frustum`] extracts the six clip planes from a combined view-projection
//! matrix (Gribb–Hartmann) and tests world-space spheres against them.

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

use crate::scene::bounds::BoundingSphere;

/// Free-flying camera with a roll-free yaw/pitch orientation.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    aspect: f32,
}

impl Camera {
    /// Vertical field of view, degrees.
    pub const FOV_DEGREES: f32 = 75.0;
    /// Near clip distance.
    pub const NEAR_PLANE: f32 = 0.1;
    /// Far clip distance; the per-frame far plane is clamped against this.
    pub const FAR_PLANE: f32 = 100.0;
    /// Eye-height start position.
    pub const START_POSITION: Vec3 = Vec3::new(0.0, 1.7, 10.0);
    /// Radians of yaw/pitch per unit of rotation input.
    pub const ROTATION_SPEED: f32 = 0.2;
    /// World units per second while moving.
    pub const RUN_SPEED: f32 = 6.258_56;

    const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

    #[must_use]
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Self::START_POSITION,
            yaw: 0.0,
            pitch: 0.0,
            aspect,
        }
    }

    // ------------------------------------------------------------------
    // Orientation basis
    // ------------------------------------------------------------------

    /// Unit forward vector; yaw 0 / pitch 0 looks down −Z.
    #[must_use]
    pub fn look(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, -cy * cp)
    }

    /// Unit right vector.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.look().cross(Vec3::Y).normalize()
    }

    /// Unit up vector, orthogonal to look and right.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.look())
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    // ------------------------------------------------------------------
    // Matrices
    // ------------------------------------------------------------------

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.look(), self.up())
    }

    /// Projection with the full [`FAR_PLANE`](Self::FAR_PLANE) range.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_with_far(Self::FAR_PLANE)
    }

    /// Projection with a caller-supplied far plane. The renderer rebuilds the
    /// projection each frame with the far distance clamped to the scene.
    #[must_use]
    pub fn projection_with_far(&self, far: f32) -> Mat4 {
        Mat4::perspective_rh(
            Self::FOV_DEGREES.to_radians(),
            self.aspect,
            Self::NEAR_PLANE,
            far,
        )
    }

    // ------------------------------------------------------------------
    // Transform updates
    // ------------------------------------------------------------------

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Moves along the look vector.
    pub fn walk(&mut self, distance: f32) {
        self.position += self.look() * distance;
    }

    /// Moves along the right vector.
    pub fn strafe(&mut self, distance: f32) {
        self.position += self.right() * distance;
    }

    /// Moves along the up vector.
    pub fn rise(&mut self, distance: f32) {
        self.position += self.up() * distance;
    }

    /// Applies yaw and pitch deltas in radians; pitch is clamped short of the
    /// poles to keep the basis well defined.
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Points the camera at a world position.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir != Vec3::ZERO {
            self.pitch = dir.y.asin().clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
            self.yaw = dir.x.atan2(-dir.z);
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

// ============================================================================
// Frustum
// ============================================================================

/// Six view-frustum planes in world space, each stored as (normal, d) with
/// the normal pointing inward.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extracts planes from a combined projection × view matrix
    /// (Gribb–Hartmann). Valid for both perspective and orthographic
    /// projections with 0..1 clip depth.
    #[must_use]
    pub fn from_matrix(view_proj: Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near
            r3 - r2, // far
        ];

        for plane in &mut planes {
            let len = plane.xyz().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// True when the sphere is inside or intersecting the frustum, i.e. not
    /// fully outside any plane. This is exactly the culler's "contained or
    /// intersecting" inclusion test.
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        for plane in &self.planes {
            let distance = plane.xyz().dot(sphere.center) + plane.w;
            if distance < -sphere.radius {
                return false;
            }
        }
        true
    }

    /// True when the sphere lies entirely inside every plane.
    #[must_use]
    pub fn contains_sphere(&self, sphere: &BoundingSphere) -> bool {
        for plane in &self.planes {
            let distance = plane.xyz().dot(sphere.center) + plane.w;
            if distance < sphere.radius {
                return false;
            }
        }
        true
    }

    /// True when the point is inside the frustum.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.xyz().dot(point) + plane.w >= 0.0)
    }
}
