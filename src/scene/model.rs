//! Renderable models.
//!
//! A [`RenderableModel`] pairs a [`MeshGroup`] with a world transform and a
//! lazily cached local-space bounding sphere. The cache is dropped by every
//! operation that rewrites vertex data; the world-space sphere is derived
//! from the cached local sphere and the current world matrix on every query,
//! so transform changes can never serve a stale world sphere.

use std::hash::{DefaultHasher, Hash, Hasher};

use glam::{Mat4, Vec3};
use uuid::Uuid;

use crate::errors::{GloamError, Result};
use crate::resources::mesh::MeshGroup;
use crate::scene::bounds::BoundingSphere;

#[derive(Debug)]
pub struct RenderableModel {
    pub uuid: Uuid,
    /// Short display id derived from the uuid, for logs and overlays.
    pub id: u64,
    pub name: String,
    pub geometry: MeshGroup,
    world_transform: Mat4,
    cached_local_bounds: Option<BoundingSphere>,
}

impl RenderableModel {
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: MeshGroup) -> Self {
        let uuid = Uuid::new_v4();
        let mut hasher = DefaultHasher::new();
        uuid.hash(&mut hasher);
        Self {
            uuid,
            id: hasher.finish(),
            name: name.into(),
            geometry,
            world_transform: Mat4::IDENTITY,
            cached_local_bounds: None,
        }
    }

    /// Builder for the legacy single-texture content path, where diffuse,
    /// specular and normal data arrive pre-baked in one combined map.
    ///
    /// # Errors
    ///
    /// Always returns [`GloamError::Unimplemented`]; the combined-map decoder
    /// has no equivalent on this renderer yet.
    pub fn from_combined_maps(_name: &str, _geometry: MeshGroup) -> Result<Self> {
        Err(GloamError::Unimplemented(
            "model construction from combined texture maps",
        ))
    }

    #[inline]
    #[must_use]
    pub fn world_transform(&self) -> Mat4 {
        self.world_transform
    }

    pub fn set_world_transform(&mut self, transform: Mat4) {
        self.world_transform = transform;
    }

    /// Local-space bounding sphere, recomputed only after geometry edits.
    pub fn local_bounding_sphere(&mut self) -> BoundingSphere {
        if let Some(cached) = self.cached_local_bounds {
            return cached;
        }
        let sphere = self.geometry.local_bounds();
        self.cached_local_bounds = Some(sphere);
        sphere
    }

    /// Local sphere carried through the current world matrix.
    pub fn world_bounding_sphere(&mut self) -> BoundingSphere {
        let local = self.local_bounding_sphere();
        if local.is_sentinel() {
            return local;
        }
        local.transformed(&self.world_transform)
    }

    // ========================================================================
    // Extent accessors
    // ========================================================================

    /// Axis-aligned extent of the local geometry.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.geometry
            .bounds_min_max()
            .map_or(Vec3::ZERO, |(min, max)| max - min)
    }

    /// Midpoint of the local geometry.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.geometry
            .bounds_min_max()
            .map_or(Vec3::ZERO, |(min, max)| (min + max) * 0.5)
    }

    /// Midpoint at the geometry's lowest Y, for placing models on a floor.
    #[must_use]
    pub fn center_bottom(&self) -> Vec3 {
        self.geometry.bounds_min_max().map_or(Vec3::ZERO, |(min, max)| {
            let mid = (min + max) * 0.5;
            Vec3::new(mid.x, min.y, mid.z)
        })
    }

    // ========================================================================
    // Geometry mutators. Each bakes into the vertex data and drops the
    // bounds cache.
    // ========================================================================

    /// Uniformly scales the geometry so its largest extent equals `target`.
    /// No-op for empty or degenerate geometry.
    pub fn normalize_size(&mut self, queue: &wgpu::Queue, target: f32) {
        let extent = self.size().max_element();
        if extent <= f32::EPSILON {
            return;
        }
        self.scale(queue, target / extent);
    }

    /// Translates the geometry so its center lands on the local origin.
    pub fn recenter(&mut self, queue: &wgpu::Queue) {
        let center = self.center();
        if center == Vec3::ZERO {
            return;
        }
        self.geometry
            .bake_transform(queue, Mat4::from_translation(-center));
        self.cached_local_bounds = None;
    }

    /// Uniformly scales the geometry about the local origin.
    pub fn scale(&mut self, queue: &wgpu::Queue, factor: f32) {
        self.geometry
            .bake_transform(queue, Mat4::from_scale(Vec3::splat(factor)));
        self.cached_local_bounds = None;
    }
}
