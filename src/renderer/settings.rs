//! Renderer configuration: runtime toggles and GPU bring-up options.
//!
//! [`RenderToggles`] is the mutable switchboard the application shell flips
//! at runtime; the engine snapshots it at frame start so a mid-frame change
//! can never tear a frame. [`ContextSettings`] is consumed once when the GPU
//! context is created.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gloam::renderer::{ContextSettings, RenderToggles};
//!
//! let mut toggles = RenderToggles::default();
//! toggles.wireframe = true;
//!
//! let settings = ContextSettings {
//!     power_preference: wgpu::PowerPreference::LowPower,
//!     ..Default::default()
//! };
//! ```

use crate::config::SavedSettings;

/// Runtime feature switches.
///
/// | Field              | Effect                                        | Default |
/// |--------------------|-----------------------------------------------|---------|
/// | `texture_mapping`  | Sample diffuse/specular maps where present    | `false` |
/// | `normal_mapping`   | Perturb normals by the normal map             | `true`  |
/// | `shadow_mapping`   | Run the shadow-map pass and sample it         | `true`  |
/// | `deferred_shading` | Temporal accumulation (motion blur) path      | `true`  |
/// | `wireframe`        | Line polygon mode for the scene pass          | `false` |
/// | `mod_one`..`three` | Experimental shader modifications             | `false` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderToggles {
    pub texture_mapping: bool,
    pub normal_mapping: bool,
    pub shadow_mapping: bool,
    pub deferred_shading: bool,
    pub wireframe: bool,
    pub mod_one: bool,
    pub mod_two: bool,
    pub mod_three: bool,
}

impl Default for RenderToggles {
    fn default() -> Self {
        Self {
            texture_mapping: false,
            normal_mapping: true,
            shadow_mapping: true,
            deferred_shading: true,
            wireframe: false,
            mod_one: false,
            mod_two: false,
            mod_three: false,
        }
    }
}

impl RenderToggles {
    /// Overwrites the four persisted toggles from a loaded settings file.
    /// Wireframe and the experimental mods are session-only.
    pub fn apply_saved(&mut self, saved: &SavedSettings) {
        self.texture_mapping = saved.texture_mapping;
        self.normal_mapping = saved.normal_mapping;
        self.shadow_mapping = saved.shadow_mapping;
        self.deferred_shading = saved.deferred_shading;
    }

    /// Builds the persistable settings record; the three light flags come
    /// from the scene since they live on the lights themselves.
    #[must_use]
    pub fn to_saved(&self, flashlight: bool, userlight: bool, moonlight: bool) -> SavedSettings {
        SavedSettings {
            texture_mapping: self.texture_mapping,
            normal_mapping: self.normal_mapping,
            shadow_mapping: self.shadow_mapping,
            deferred_shading: self.deferred_shading,
            flashlight_active: flashlight,
            userlight_active: userlight,
            moonlight_active: moonlight,
        }
    }
}

// ---------------------------------------------------------------------------
// ContextSettings
// ---------------------------------------------------------------------------

/// One-shot GPU context configuration.
///
/// | Field               | Description                             | Default           |
/// |---------------------|-----------------------------------------|-------------------|
/// | `backends`          | Forced wgpu backend (or auto)           | `None`            |
/// | `power_preference`  | Adapter selection strategy              | `HighPerformance` |
/// | `required_features` | Features the adapter must support       | `POLYGON_MODE_LINE` |
/// | `required_limits`   | Minimum device limits                   | `Limits::default()` |
///
/// `POLYGON_MODE_LINE` is requested up front so the wireframe toggle can be
/// flipped at runtime without device re-creation.
#[derive(Debug, Clone)]
pub struct ContextSettings {
    pub backends: Option<wgpu::Backends>,
    pub power_preference: wgpu::PowerPreference,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            backends: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::POLYGON_MODE_LINE,
            required_limits: wgpu::Limits::default(),
        }
    }
}
