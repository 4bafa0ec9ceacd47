//! Light sources.
//!
//! One tagged record covers all three kinds; [`LightKind`] selects which
//! fields are semantically live. Directional lights use `direction` only,
//! point lights `position` only, spot lights both plus the cone parameters.
//!
//! The planner mutates `light_view`/`light_proj`/`out_of_range` in place each
//! frame; the shadow-map generator owns `map_channel`. Everything else is
//! caller state.

use std::hash::{DefaultHasher, Hash, Hasher};

use glam::{Mat4, Vec3};
use uuid::Uuid;

/// At most this many lights of any one kind may be registered at once.
/// Exceeding it is a configuration error, not a clamp.
pub const MAX_LIGHTS_PER_KIND: usize = 3;

/// Discriminant selecting which fields of a [`Light`] are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// Distance attenuation coefficients: `1 / (constant + linear·d + quadratic·d²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

/// A single light source of any kind.
#[derive(Debug, Clone)]
pub struct Light {
    /// Stable unique identity.
    pub uuid: Uuid,
    /// Short display id derived from the uuid, for logs and overlays.
    pub id: u64,
    pub kind: LightKind,

    pub color: Vec3,
    pub intensity: f32,
    /// World position; live for Point and Spot.
    pub position: Vec3,
    /// Unit direction; live for Directional and Spot.
    pub direction: Vec3,
    pub active: bool,

    /// Set by the planner when the light's shadow frustum degenerates for the
    /// current scene extent. The light contributes nothing this frame and is
    /// re-evaluated next frame.
    pub out_of_range: bool,

    /// Light-space view matrix, written by the planner. Stale (and not to be
    /// trusted) while `out_of_range` is set.
    pub light_view: Mat4,
    /// Light-space projection matrix, written by the planner.
    pub light_proj: Mat4,
    /// Shadow-map channel, −1 when unassigned. Owned by the shadow-map
    /// generator; reset and reassigned every frame.
    pub map_channel: i32,

    /// Valid distance interval of the light. `range_max` bounds the far plane
    /// of the spot shadow frustum; an unlimited light keeps the defaults.
    pub range_min: f32,
    pub range_max: f32,

    pub attenuation: Attenuation,

    /// Spot inner cone half-angle (full brightness), radians.
    pub inner_angle: f32,
    /// Spot outer cone half-angle (cutoff), radians. Also sizes the spot
    /// shadow frustum.
    pub outer_angle: f32,
    /// Spot falloff exponent between the cones.
    pub falloff: f32,
}

fn short_id(uuid: &Uuid) -> u64 {
    let mut hasher = DefaultHasher::new();
    uuid.hash(&mut hasher);
    hasher.finish()
}

impl Light {
    /// Base record with the shared defaults; prefer the kind factories.
    #[must_use]
    pub fn new(kind: LightKind) -> Self {
        let uuid = Uuid::new_v4();
        let id = short_id(&uuid);
        Self {
            uuid,
            id,
            kind,
            color: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            active: true,
            out_of_range: false,
            light_view: Mat4::IDENTITY,
            light_proj: Mat4::IDENTITY,
            map_channel: -1,
            range_min: 0.0,
            range_max: f32::INFINITY,
            attenuation: Attenuation::default(),
            inner_angle: 0.0,
            outer_angle: 0.0,
            falloff: 0.0,
        }
    }

    /// Directional light shining along `direction` (normalized here).
    #[must_use]
    pub fn new_directional(color: Vec3, direction: Vec3, intensity: f32) -> Self {
        let mut light = Self::new(LightKind::Directional);
        light.color = color;
        light.direction = direction.normalize_or_zero();
        light.intensity = intensity;
        light
    }

    /// Point light at `position`.
    #[must_use]
    pub fn new_point(color: Vec3, position: Vec3, intensity: f32) -> Self {
        let mut light = Self::new(LightKind::Point);
        light.color = color;
        light.position = position;
        light.intensity = intensity;
        light
    }

    /// Spot light at `position` aimed along `direction`.
    ///
    /// `inner_angle` and `outer_angle` are half-angles from the cone axis in
    /// radians, `inner_angle <= outer_angle`; `falloff` shapes the transition
    /// between them.
    #[must_use]
    pub fn new_spot(
        color: Vec3,
        position: Vec3,
        direction: Vec3,
        intensity: f32,
        inner_angle: f32,
        outer_angle: f32,
        falloff: f32,
    ) -> Self {
        let mut light = Self::new(LightKind::Spot);
        light.color = color;
        light.position = position;
        light.direction = direction.normalize_or_zero();
        light.intensity = intensity;
        light.inner_angle = inner_angle;
        light.outer_angle = outer_angle;
        light.falloff = falloff;
        light
    }

    /// Cosine of the inner cone half-angle, as uploaded to the shader.
    #[inline]
    #[must_use]
    pub fn cos_inner(&self) -> f32 {
        self.inner_angle.cos()
    }

    /// Cosine of the outer cone half-angle, as uploaded to the shader.
    #[inline]
    #[must_use]
    pub fn cos_outer(&self) -> f32 {
        self.outer_angle.cos()
    }

    /// Combined light-space view-projection.
    #[inline]
    #[must_use]
    pub fn view_proj(&self) -> Mat4 {
        self.light_proj * self.light_view
    }

    /// Whether this kind participates in the shadow-map pass at all.
    /// Point lights never do; their shadows come from the volume path.
    #[inline]
    #[must_use]
    pub fn casts_shadow_map(&self) -> bool {
        matches!(self.kind, LightKind::Directional | LightKind::Spot)
    }

    /// Active and in range: contributes illumination this frame.
    #[inline]
    #[must_use]
    pub fn contributes(&self) -> bool {
        self.active && !self.out_of_range
    }
}
