//! Scene registry: the owning collections for models, lights and billboards.
//!
//! Everything is stored in slot maps and addressed by generational handles;
//! a secondary uuid index supports removal by identity from callers that
//! only kept the uuid. Light registration enforces the per-kind cap up
//! front, before anything is inserted, so a rejected light never becomes
//! part of the scene.

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use uuid::Uuid;

use crate::errors::{GloamError, Result};
use crate::scene::billboard::Billboard;
use crate::scene::light::{Light, LightKind, MAX_LIGHTS_PER_KIND};
use crate::scene::model::RenderableModel;

new_key_type! {
    pub struct ModelKey;
    pub struct LightKey;
    pub struct BillboardKey;
}

#[derive(Default)]
pub struct SceneRegistry {
    models: SlotMap<ModelKey, RenderableModel>,
    lights: SlotMap<LightKey, Light>,
    billboards: SlotMap<BillboardKey, Billboard>,
    model_ids: FxHashMap<Uuid, ModelKey>,
    light_ids: FxHashMap<Uuid, LightKey>,
    billboard_ids: FxHashMap<Uuid, BillboardKey>,
}

impl SceneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Models
    // ========================================================================

    pub fn add_model(&mut self, model: RenderableModel) -> ModelKey {
        let uuid = model.uuid;
        log::debug!("registering model {} ({})", model.name, model.id);
        let key = self.models.insert(model);
        self.model_ids.insert(uuid, key);
        key
    }

    pub fn remove_model(&mut self, key: ModelKey) -> Option<RenderableModel> {
        let model = self.models.remove(key)?;
        self.model_ids.remove(&model.uuid);
        Some(model)
    }

    pub fn remove_model_by_uuid(&mut self, uuid: Uuid) -> Option<RenderableModel> {
        let key = self.model_ids.remove(&uuid)?;
        self.models.remove(key)
    }

    #[must_use]
    pub fn model(&self, key: ModelKey) -> Option<&RenderableModel> {
        self.models.get(key)
    }

    pub fn model_mut(&mut self, key: ModelKey) -> Option<&mut RenderableModel> {
        self.models.get_mut(key)
    }

    pub fn models(&self) -> impl Iterator<Item = (ModelKey, &RenderableModel)> {
        self.models.iter()
    }

    pub fn models_mut(&mut self) -> impl Iterator<Item = (ModelKey, &mut RenderableModel)> {
        self.models.iter_mut()
    }

    #[inline]
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    // ========================================================================
    // Lights
    // ========================================================================

    /// Registers a light, enforcing the per-kind cap.
    ///
    /// # Errors
    ///
    /// [`GloamError::TooManyLights`] when the scene already holds
    /// [`MAX_LIGHTS_PER_KIND`] lights of the same kind. The light is not
    /// registered in that case.
    pub fn add_light(&mut self, light: Light) -> Result<LightKey> {
        let kind = light.kind;
        let present = self.light_count_of(kind);
        if present >= MAX_LIGHTS_PER_KIND {
            return Err(GloamError::TooManyLights {
                kind,
                cap: MAX_LIGHTS_PER_KIND,
            });
        }
        let uuid = light.uuid;
        log::debug!("registering {:?} light {}", kind, light.id);
        let key = self.lights.insert(light);
        self.light_ids.insert(uuid, key);
        Ok(key)
    }

    pub fn remove_light(&mut self, key: LightKey) -> Option<Light> {
        let light = self.lights.remove(key)?;
        self.light_ids.remove(&light.uuid);
        Some(light)
    }

    pub fn remove_light_by_uuid(&mut self, uuid: Uuid) -> Option<Light> {
        let key = self.light_ids.remove(&uuid)?;
        self.lights.remove(key)
    }

    #[must_use]
    pub fn light(&self, key: LightKey) -> Option<&Light> {
        self.lights.get(key)
    }

    pub fn light_mut(&mut self, key: LightKey) -> Option<&mut Light> {
        self.lights.get_mut(key)
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightKey, &Light)> {
        self.lights.iter()
    }

    pub fn lights_mut(&mut self) -> impl Iterator<Item = (LightKey, &mut Light)> {
        self.lights.iter_mut()
    }

    #[inline]
    #[must_use]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    #[must_use]
    pub fn light_count_of(&self, kind: LightKind) -> usize {
        self.lights.values().filter(|l| l.kind == kind).count()
    }

    // ========================================================================
    // Billboards
    // ========================================================================

    pub fn add_billboard(&mut self, billboard: Billboard) -> BillboardKey {
        let uuid = billboard.uuid;
        log::debug!("registering billboard {}", billboard.id);
        let key = self.billboards.insert(billboard);
        self.billboard_ids.insert(uuid, key);
        key
    }

    pub fn remove_billboard(&mut self, key: BillboardKey) -> Option<Billboard> {
        let billboard = self.billboards.remove(key)?;
        self.billboard_ids.remove(&billboard.uuid);
        Some(billboard)
    }

    pub fn remove_billboard_by_uuid(&mut self, uuid: Uuid) -> Option<Billboard> {
        let key = self.billboard_ids.remove(&uuid)?;
        self.billboards.remove(key)
    }

    #[must_use]
    pub fn billboard(&self, key: BillboardKey) -> Option<&Billboard> {
        self.billboards.get(key)
    }

    pub fn billboards(&self) -> impl Iterator<Item = (BillboardKey, &Billboard)> {
        self.billboards.iter()
    }

    #[inline]
    #[must_use]
    pub fn billboard_count(&self) -> usize {
        self.billboards.len()
    }
}
