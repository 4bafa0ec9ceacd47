//! Frustum visibility culling.
//!
//! Produces the frame's visible model set plus one sphere enclosing all of
//! it, which the light planner fits shadow frusta around. The sphere is the
//! NaN sentinel when nothing is visible.
//!
//! The sphere test is the whole policy: no occlusion, no cells. Models whose
//! sphere intersects the camera frustum are in, everything else is out.

use glam::Mat4;

use crate::scene::bounds::BoundingSphere;
use crate::scene::camera::Frustum;
use crate::scene::registry::{ModelKey, SceneRegistry};

/// Result of the cull stage.
#[derive(Debug, Clone)]
pub struct VisibleSet {
    pub models: Vec<ModelKey>,
    /// Merged world-space sphere around every visible model; sentinel when
    /// `models` is empty.
    pub bounds: BoundingSphere,
}

impl VisibleSet {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            models: Vec::new(),
            bounds: BoundingSphere::sentinel(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }
}

/// Core sphere-vs-frustum filter over arbitrary keys.
///
/// Sentinel spheres (empty geometry) are never visible. The merged bounds
/// accumulate in iteration order, which keeps the result deterministic for
/// a given scene ordering.
pub fn cull_spheres<K: Copy>(
    items: impl IntoIterator<Item = (K, BoundingSphere)>,
    frustum: &Frustum,
) -> (Vec<K>, BoundingSphere) {
    let mut visible = Vec::new();
    let mut bounds = BoundingSphere::sentinel();
    for (key, sphere) in items {
        if sphere.is_sentinel() {
            continue;
        }
        if frustum.intersects_sphere(&sphere) {
            visible.push(key);
            bounds = bounds.merge(sphere);
        }
    }
    (visible, bounds)
}

/// Culls every registered model against the camera's view-projection.
pub fn cull_models(registry: &mut SceneRegistry, view_proj: &Mat4) -> VisibleSet {
    let frustum = Frustum::from_matrix(*view_proj);
    let spheres: Vec<(ModelKey, BoundingSphere)> = registry
        .models_mut()
        .map(|(key, model)| (key, model.world_bounding_sphere()))
        .collect();
    let (models, bounds) = cull_spheres(spheres, &frustum);
    log::trace!(
        "cull: {} of {} models visible",
        models.len(),
        registry.model_count()
    );
    VisibleSet { models, bounds }
}
