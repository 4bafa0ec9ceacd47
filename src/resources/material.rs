//! Per-part surface description.
//!
//! A [`Material`] holds the raw Blinn-Phong terms as authored; the shading
//! pass uploads the energy-normalized forms from [`Material::diffuse_term`]
//! and [`Material::specular_term`]. A [`MapSet`] carries whichever texture
//! maps the part actually has; absent maps fall back to the flat material
//! color in the shader.

use std::f32::consts::PI;
use std::sync::Arc;

use bitflags::bitflags;
use glam::Vec3;

use crate::resources::texture::Texture;

/// Blinn-Phong material terms, pre-normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub ambient: Vec3,
    /// Specular exponent. Higher is tighter.
    pub smoothness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            ambient: Vec3::ONE,
            smoothness: 1.0,
        }
    }
}

impl Material {
    #[must_use]
    pub fn new(diffuse: Vec3, specular: Vec3, ambient: Vec3, smoothness: f32) -> Self {
        Self {
            diffuse,
            specular,
            ambient,
            smoothness,
        }
    }

    /// Diffuse term normalized for energy conservation: `diffuse / π`.
    #[inline]
    #[must_use]
    pub fn diffuse_term(&self) -> Vec3 {
        self.diffuse / PI
    }

    /// Specular term scaled by the normalization factor
    /// `(smoothness + 8) / 8π` so highlights stay bounded as the exponent
    /// grows.
    #[inline]
    #[must_use]
    pub fn specular_term(&self) -> Vec3 {
        self.specular * ((self.smoothness + 8.0) / (8.0 * PI))
    }
}

bitflags! {
    /// Which texture maps a mesh part carries. Uploaded per draw so the
    /// shader can choose between sampling and the flat material color.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MapFlags: u32 {
        const DIFFUSE = 1;
        const SPECULAR = 1 << 1;
        const NORMAL = 1 << 2;
        const COMBINED = 1 << 3;
    }
}

/// Optional texture maps for one mesh part.
#[derive(Debug, Clone, Default)]
pub struct MapSet {
    pub diffuse: Option<Arc<Texture>>,
    pub specular: Option<Arc<Texture>>,
    pub normal: Option<Arc<Texture>>,
    /// Single pre-baked texture from the legacy content path.
    pub combined: Option<Arc<Texture>>,
}

impl MapSet {
    #[must_use]
    pub fn flags(&self) -> MapFlags {
        let mut flags = MapFlags::empty();
        if self.diffuse.is_some() {
            flags |= MapFlags::DIFFUSE;
        }
        if self.specular.is_some() {
            flags |= MapFlags::SPECULAR;
        }
        if self.normal.is_some() {
            flags |= MapFlags::NORMAL;
        }
        if self.combined.is_some() {
            flags |= MapFlags::COMBINED;
        }
        flags
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags().is_empty()
    }
}
