//! GPU uniform blocks.
//!
//! Every field is a 16-byte multiple (`Mat4`, `Vec4`, or a 4-wide scalar
//! array) so the Rust layout matches WGSL uniform address-space rules with
//! no hidden padding. Booleans travel as `u32` 0/1 since `bool` is not
//! host-shareable.

use bytemuck::Zeroable;
use glam::{Mat4, Vec4};

use crate::renderer::passes::FrameView;
use crate::renderer::settings::RenderToggles;
use crate::resources::{MapFlags, MeshPart};
use crate::scene::light::{Light, LightKind};

/// Largest possible upload: the per-kind cap for each of the three kinds.
pub const MAX_SCENE_LIGHTS: usize = 9;

#[inline]
#[must_use]
pub fn flag(value: bool) -> u32 {
    u32::from(value)
}

/// One light as the scene shader sees it.
///
/// Inactive and out-of-range lights are never uploaded; the array is
/// compacted and the counts in [`LightArrayUniform`] say how far to read.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub view_proj: Mat4,
    /// rgb = color, w = intensity.
    pub color_intensity: Vec4,
    /// xyz = world position (point/spot), w unused.
    pub position: Vec4,
    /// xyz = unit direction (directional/spot), w unused.
    pub direction: Vec4,
    /// x = constant, y = linear, z = quadratic, w = spot falloff exponent.
    pub attenuation: Vec4,
    /// x = cos inner angle, y = cos outer angle, zw unused.
    pub cones: Vec4,
    /// x = kind tag (0 directional, 1 point, 2 spot), y = shadow channel
    /// (−1 when unassigned), zw unused.
    pub meta: [i32; 4],
}

impl LightUniform {
    #[must_use]
    pub fn from_light(light: &Light) -> Self {
        let kind = match light.kind {
            LightKind::Directional => 0,
            LightKind::Point => 1,
            LightKind::Spot => 2,
        };
        Self {
            view_proj: light.view_proj(),
            color_intensity: light.color.extend(light.intensity),
            position: light.position.extend(0.0),
            direction: light.direction.extend(0.0),
            attenuation: Vec4::new(
                light.attenuation.constant,
                light.attenuation.linear,
                light.attenuation.quadratic,
                light.falloff,
            ),
            cones: Vec4::new(light.cos_inner(), light.cos_outer(), 0.0, 0.0),
            meta: [kind, light.map_channel, 0, 0],
        }
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// The compacted light array plus its counts.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightArrayUniform {
    pub lights: [LightUniform; MAX_SCENE_LIGHTS],
    /// x = total uploaded, y = directional count, z = point count,
    /// w = spot count.
    pub counts: [u32; 4],
    /// x = shadow channels in use this frame, yzw unused.
    pub shadow: [u32; 4],
}

impl LightArrayUniform {
    /// Compacts `lights` into the upload layout, keeping only lights that
    /// contribute this frame, in iteration order, capped at the array size.
    pub fn gather<'a>(lights: impl Iterator<Item = &'a Light>, shadow_channels: u32) -> Self {
        let mut out = Self::zeroed();
        let mut total = 0usize;
        for light in lights {
            if !light.contributes() {
                continue;
            }
            if total >= MAX_SCENE_LIGHTS {
                break;
            }
            out.lights[total] = LightUniform::from_light(light);
            let kind_slot = match light.kind {
                LightKind::Directional => 1,
                LightKind::Point => 2,
                LightKind::Spot => 3,
            };
            out.counts[kind_slot] += 1;
            total += 1;
        }
        out.counts[0] = total as u32;
        out.shadow[0] = shadow_channels;
        out
    }
}

/// Per-mesh-part block shared by the normal prepass and the scene pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PartUniform {
    pub world: Mat4,
    pub view_proj: Mat4,
    pub world_view_proj: Mat4,
    pub world_inverse_transpose: Mat4,
    /// xyz = camera position, w = 1 / backbuffer width.
    pub camera_position: Vec4,
    /// xyz = camera look, w = 1 / backbuffer height.
    pub camera_look: Vec4,
    /// x = shadow mapping, y = normal mapping, zw unused.
    pub toggles: [u32; 4],
    /// x, y, z = experimental mods one/two/three, w unused.
    pub mods: [u32; 4],
    /// x = combined mapped, y = diffuse mapped, z = specular mapped,
    /// w = normal mapped.
    pub map_flags: [u32; 4],
    /// rgb = diffuse / π, w = smoothness.
    pub material_kd: Vec4,
    /// rgb = specular · (smoothness + 8) / 8π, w unused.
    pub material_ks: Vec4,
}

impl PartUniform {
    /// Assembles the block for one mesh part. Parts without a material
    /// shade with [`Material::default`], and the per-map flags are only
    /// raised when the matching toggle is on and the map exists.
    #[must_use]
    pub fn for_part(
        world: Mat4,
        frame: &FrameView,
        toggles: &RenderToggles,
        part: &MeshPart,
    ) -> Self {
        let material = part.material.unwrap_or_default();
        let maps = part.maps.flags();
        let texture_on = toggles.texture_mapping;
        let normal_on = toggles.normal_mapping;
        Self {
            world,
            view_proj: frame.view_proj,
            world_view_proj: frame.view_proj * world,
            world_inverse_transpose: world.inverse().transpose(),
            camera_position: frame.camera_position.extend(frame.pixel_width),
            camera_look: frame.camera_look.extend(frame.pixel_height),
            toggles: [
                flag(toggles.shadow_mapping),
                flag(toggles.normal_mapping),
                0,
                0,
            ],
            mods: [
                flag(toggles.mod_one),
                flag(toggles.mod_two),
                flag(toggles.mod_three),
                0,
            ],
            map_flags: [
                flag(texture_on && maps.contains(MapFlags::COMBINED)),
                flag(texture_on && maps.contains(MapFlags::DIFFUSE)),
                flag(texture_on && maps.contains(MapFlags::SPECULAR)),
                flag(normal_on && maps.contains(MapFlags::NORMAL)),
            ],
            material_kd: material.diffuse_term().extend(material.smoothness),
            material_ks: material.specular_term().extend(0.0),
        }
    }
}

/// Per-part block for the shadow-map pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowCasterUniform {
    /// world × light view × light projection.
    pub world_view_proj: Mat4,
    /// x = destination channel index, yzw unused.
    pub channel: [u32; 4],
}

/// Per-billboard block.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BillboardUniform {
    pub view: Mat4,
    pub proj: Mat4,
    pub world: Mat4,
    /// xyz = camera position, w unused.
    pub camera_position: Vec4,
    /// xyz = the axis the quad may rotate around (camera up), w unused.
    pub allowed_rotation: Vec4,
    /// x = half width, y = half height, zw unused.
    pub half_size: Vec4,
}

/// Block for the temporal blur combine.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniform {
    /// 0 = bootstrap (running average), 1 = steady state (slide window).
    pub technique: u32,
    /// Frames accumulated so far, for the bootstrap average weight.
    pub frame_count: u32,
    pub _pad: [u32; 2],
}

/// Block for the shadow-volume stencil pass. Volume vertices are already
/// world-space, so only the camera transform is needed.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VolumeUniform {
    pub view_proj: Mat4,
}
