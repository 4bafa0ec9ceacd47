//! Engine shell: the one type an application drives.
//!
//! [`Engine`] owns the GPU context, the scene registry, the camera, the
//! runtime toggles and the renderer, and strings them together into a
//! per-frame loop. It also carries the standard three-light rig (user light,
//! moonlight, flashlight) and the settings file round-trip.
//!
//! Frame pacing lives here too: [`FramePacer`] drops render requests that
//! arrive faster than the target rate. A dropped frame does no work at all;
//! the previous frame stays presentable.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gloam::engine::Engine;
//!
//! let mut engine = Engine::new(1280, 720)?;
//! engine.add_standard_lighting()?;
//! engine.load_settings_from(std::path::Path::new("config.cfg"));
//!
//! loop {
//!     // feed input to engine.camera_mut() ...
//!     if let Some(report) = engine.render_frame()? {
//!         log::debug!("{} models in view", report.visible_models);
//!     }
//! }
//! ```

use std::path::Path;
use std::time::{Duration, Instant};

use glam::Vec3;

use crate::config::{self, SavedSettings};
use crate::diagnostics::DiagnosticLog;
use crate::errors::{GloamError, Result};
use crate::renderer::settings::{ContextSettings, RenderToggles};
use crate::renderer::{FrameReport, GpuContext, Renderer};
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::registry::{LightKey, SceneRegistry};

/// Target frame rate for the drop-frame pacer.
pub const TARGET_FPS: f64 = 60.0;

/// Default settings file name, resolved against the working directory.
pub const SETTINGS_FILE: &str = "config.cfg";

// ---------------------------------------------------------------------------
// FramePacer
// ---------------------------------------------------------------------------

/// Drop-frame pacing against a total-elapsed clock.
///
/// A render request is admitted only when at least `1 / target_fps` has
/// passed since the previous admitted request; otherwise it is skipped and
/// the clock keeps running. The reference point starts at zero, so the first
/// admission lands one interval after startup.
#[derive(Debug, Clone)]
pub struct FramePacer {
    min_interval: Duration,
    last_render: Duration,
}

impl FramePacer {
    #[must_use]
    pub fn new(target_fps: f64) -> Self {
        Self {
            min_interval: Duration::from_secs_f64(1.0 / target_fps),
            last_render: Duration::ZERO,
        }
    }

    /// Decides whether a frame at `elapsed` total time gets rendered.
    /// Admission moves the reference point to `elapsed`; a skip leaves it
    /// untouched.
    pub fn admit(&mut self, elapsed: Duration) -> bool {
        if elapsed.saturating_sub(self.last_render) < self.min_interval {
            return false;
        }
        self.last_render = elapsed;
        true
    }

    /// Forgets the reference point, as if freshly constructed.
    pub fn reset(&mut self) {
        self.last_render = Duration::ZERO;
    }

    #[inline]
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(TARGET_FPS)
    }
}

// ---------------------------------------------------------------------------
// Standard lighting rig
// ---------------------------------------------------------------------------

/// Handles to the three stock lights installed by
/// [`Engine::add_standard_lighting`].
#[derive(Debug, Clone, Copy)]
pub struct StandardLights {
    /// White point light riding at the camera position.
    pub user: LightKey,
    /// Cool directional fill, the only light with a real tint.
    pub moon: LightKey,
    /// Spot light slung under the camera, aimed along the look vector.
    pub flashlight: LightKey,
}

/// Flashlight cone: full brightness inside 10 degrees, cut off at 35.
const FLASHLIGHT_INNER_DEG: f32 = 10.0;
const FLASHLIGHT_OUTER_DEG: f32 = 35.0;
const FLASHLIGHT_FALLOFF: f32 = 2.0;

const MOONLIGHT_COLOR: Vec3 = Vec3::new(0.4, 0.4, 0.6);
const MOONLIGHT_DIRECTION: Vec3 = Vec3::new(-1.0, -3.0, -1.0);
const MOONLIGHT_INTENSITY: f32 = 5.0;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    gpu: GpuContext,
    registry: SceneRegistry,
    camera: Camera,
    toggles: RenderToggles,
    diagnostics: DiagnosticLog,
    renderer: Renderer,
    pacer: FramePacer,
    started: Instant,
    rig: Option<StandardLights>,
}

impl Engine {
    /// Brings up the GPU with default [`ContextSettings`] and builds every
    /// frame target at `width` x `height`.
    ///
    /// # Errors
    ///
    /// Propagates adapter and device acquisition failures from
    /// [`GpuContext::new`].
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_settings(&ContextSettings::default(), width, height)
    }

    /// As [`Engine::new`] with explicit context settings.
    ///
    /// # Errors
    ///
    /// Propagates adapter and device acquisition failures from
    /// [`GpuContext::new`].
    pub fn with_settings(settings: &ContextSettings, width: u32, height: u32) -> Result<Self> {
        let width = width.max(1);
        let height = height.max(1);
        let gpu = GpuContext::new_blocking(settings)?;
        let renderer = Renderer::new(&gpu, width, height);
        let camera = Camera::new(width as f32 / height as f32);
        log::info!("engine up at {width}x{height}");
        Ok(Self {
            gpu,
            registry: SceneRegistry::new(),
            camera,
            toggles: RenderToggles::default(),
            diagnostics: DiagnosticLog::new(),
            renderer,
            pacer: FramePacer::default(),
            started: Instant::now(),
            rig: None,
        })
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut SceneRegistry {
        &mut self.registry
    }

    #[inline]
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[inline]
    #[must_use]
    pub fn toggles(&self) -> &RenderToggles {
        &self.toggles
    }

    #[inline]
    pub fn toggles_mut(&mut self) -> &mut RenderToggles {
        &mut self.toggles
    }

    #[inline]
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    #[inline]
    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.diagnostics
    }

    /// Handles to the standard rig, when installed.
    #[inline]
    #[must_use]
    pub fn standard_lights(&self) -> Option<StandardLights> {
        self.rig
    }

    /// Total time since engine construction.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// View of the most recently finished frame.
    #[must_use]
    pub fn presentable_view(&self) -> &wgpu::TextureView {
        self.renderer.presentable_view()
    }

    // ------------------------------------------------------------------
    // Standard lighting
    // ------------------------------------------------------------------

    /// Where the user light sits: at the camera.
    #[must_use]
    pub fn user_light_position(&self) -> Vec3 {
        self.camera.position()
    }

    /// Where the flashlight hangs: shoulder height, slightly to the right.
    #[must_use]
    pub fn flashlight_position(&self) -> Vec3 {
        self.camera.position() - 0.75 * self.camera.up() + 0.3 * self.camera.right()
    }

    /// Installs the stock rig: a white point light at the camera, a cool
    /// directional moonlight, and a camera-following spot flashlight. The
    /// flashlight starts switched off, matching the persisted defaults.
    ///
    /// # Errors
    ///
    /// [`GloamError::TooManyLights`] if the registry already carries three
    /// lights of any involved kind; nothing is installed partially, each
    /// registration is checked before the next.
    pub fn add_standard_lighting(&mut self) -> Result<StandardLights> {
        let user = self.registry.add_light(Light::new_point(
            Vec3::ONE,
            self.user_light_position(),
            1.0,
        ))?;
        let moon = self.registry.add_light(Light::new_directional(
            MOONLIGHT_COLOR,
            MOONLIGHT_DIRECTION,
            MOONLIGHT_INTENSITY,
        ))?;
        let mut flash = Light::new_spot(
            Vec3::ONE,
            self.flashlight_position(),
            self.camera.look(),
            1.0,
            FLASHLIGHT_INNER_DEG.to_radians(),
            FLASHLIGHT_OUTER_DEG.to_radians(),
            FLASHLIGHT_FALLOFF,
        );
        flash.active = SavedSettings::default().flashlight_active;
        let flashlight = self.registry.add_light(flash)?;

        let rig = StandardLights {
            user,
            moon,
            flashlight,
        };
        self.rig = Some(rig);
        log::info!("standard lighting installed");
        Ok(rig)
    }

    /// Re-pins the user light and flashlight to the camera. Called once per
    /// admitted frame; harmless when the rig is absent or lights were
    /// removed.
    pub fn follow_camera(&mut self) {
        let Some(rig) = self.rig else { return };
        let user_position = self.user_light_position();
        let flash_position = self.flashlight_position();
        let flash_direction = self.camera.look();
        if let Some(light) = self.registry.light_mut(rig.user) {
            light.position = user_position;
        }
        if let Some(light) = self.registry.light_mut(rig.flashlight) {
            light.position = flash_position;
            light.direction = flash_direction;
        }
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Loads settings from [`SETTINGS_FILE`] in the working directory.
    pub fn load_settings(&mut self) {
        self.load_settings_from(Path::new(SETTINGS_FILE));
    }

    /// Loads settings from `path` and applies them to the toggles and the
    /// standard rig. Failures fall back to defaults and land in the
    /// diagnostic log; this never fails.
    pub fn load_settings_from(&mut self, path: &Path) {
        let saved = config::load_settings(path, &mut self.diagnostics);
        self.toggles.apply_saved(&saved);
        if let Some(rig) = self.rig {
            if let Some(light) = self.registry.light_mut(rig.flashlight) {
                light.active = saved.flashlight_active;
            }
            if let Some(light) = self.registry.light_mut(rig.user) {
                light.active = saved.userlight_active;
            }
            if let Some(light) = self.registry.light_mut(rig.moon) {
                light.active = saved.moonlight_active;
            }
        }
    }

    /// Saves settings to [`SETTINGS_FILE`] in the working directory.
    ///
    /// # Errors
    ///
    /// Propagates the I/O error if the file cannot be written.
    pub fn save_settings(&self) -> Result<()> {
        self.save_settings_to(Path::new(SETTINGS_FILE))
    }

    /// Saves the current toggles and rig light states to `path`.
    ///
    /// # Errors
    ///
    /// Propagates the I/O error if the file cannot be written.
    pub fn save_settings_to(&self, path: &Path) -> Result<()> {
        let defaults = SavedSettings::default();
        let (flash, user, moon) = match self.rig {
            Some(rig) => (
                self.light_active(rig.flashlight, defaults.flashlight_active),
                self.light_active(rig.user, defaults.userlight_active),
                self.light_active(rig.moon, defaults.moonlight_active),
            ),
            None => (
                defaults.flashlight_active,
                defaults.userlight_active,
                defaults.moonlight_active,
            ),
        };
        let saved = self.toggles.to_saved(flash, user, moon);
        config::save_settings(path, &saved)
    }

    fn light_active(&self, key: LightKey, fallback: bool) -> bool {
        self.registry.light(key).map_or(fallback, |light| light.active)
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// Renders one frame, or skips it entirely under the pacer.
    ///
    /// Returns `Ok(None)` for a skipped frame; the previously rendered frame
    /// stays presentable. An admitted frame re-pins the rig to the camera
    /// and runs the full pipeline.
    ///
    /// # Errors
    ///
    /// Propagates renderer failures; a skipped frame cannot fail.
    pub fn render_frame(&mut self) -> Result<Option<FrameReport>> {
        if !self.pacer.admit(self.started.elapsed()) {
            return Ok(None);
        }
        self.follow_camera();
        let report = self
            .renderer
            .render(&self.gpu, &mut self.registry, &self.camera, &self.toggles)?;
        Ok(Some(report))
    }

    /// Resizes every frame target and the camera aspect. Zero extents are
    /// clamped to one pixel.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        self.camera.set_aspect(width as f32 / height as f32);
        self.renderer.resize(&self.gpu, width, height);
        self.pacer.reset();
    }

    /// Ambient-only shading pass. Deliberately unimplemented; calling it is
    /// an error, not a degraded mode.
    ///
    /// # Errors
    ///
    /// Always [`GloamError::Unimplemented`].
    pub fn render_ambient_only(&mut self) -> Result<()> {
        Err(GloamError::Unimplemented("ambient-only scene pass"))
    }
}
