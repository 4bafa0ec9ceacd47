//! The rendering pipeline.
//!
//! A frame walks a fixed sequence of stages: cull against the camera
//! frustum, plan light projections, optionally render shadows, write the
//! normal prepass, shade the scene additively per light, then fold the
//! result through temporal accumulation. [`Renderer`] owns the targets
//! and passes and drives one full frame per [`Renderer::render`] call.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! let gpu = GpuContext::new_blocking(&ContextSettings::default())?;
//! let mut renderer = Renderer::new(&gpu, 1280, 720);
//! let report = renderer.render(&gpu, &mut registry, &camera, &toggles)?;
//! log::info!("visible: {}", report.visible_models);
//! ```

pub mod context;
pub mod culling;
pub mod light_plan;
pub mod passes;
pub mod settings;
pub mod targets;
pub mod uniforms;

pub use context::GpuContext;
pub use culling::VisibleSet;
pub use passes::BlurTechnique;
pub use settings::{ContextSettings, RenderToggles};
pub use targets::FrameTargets;

use crate::errors::Result;
use crate::renderer::light_plan::{assign_shadow_channels, clamped_camera_far, plan_lights};
use crate::renderer::passes::{
    BillboardPass, BlurSequencer, FrameView, MotionBlurPass, NormalPrepass, ScenePass,
    ShadowMapPass, ShadowVolumePass, VolumeGeometry, material_bind_group_layout,
};
use crate::renderer::uniforms::LightArrayUniform;
use crate::resources::Texture;
use crate::scene::{Camera, SceneRegistry};

/// Format shared by every color target so ring entries, accumulation
/// buffers and intermediate maps can all be sampled alike.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Combined depth and stencil, the latter for the shadow-volume path.
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Frame background. The scene pass blends additively on top of it.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::WHITE;

/// Where the frame is in its fixed stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    Idle,
    Cull,
    PlanLights,
    ShadowMap,
    NormalPrepass,
    ShadeScene,
    MotionBlur,
    Present,
}

/// How shadows are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowTechnique {
    /// Packed three-channel shadow maps, the standard path.
    #[default]
    Map,
    /// Stencil shadow volumes. Fills the stencil buffer only; kept for
    /// parity with the old fixed-function path.
    Volumes,
}

/// What [`Renderer::render`] did this frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameReport {
    pub visible_models: usize,
    pub shadow_channels: u32,
    /// `None` when deferred shading was off and no combine ran.
    pub blur: Option<BlurTechnique>,
    /// Far plane after clamping to the visible bounds.
    pub far_plane: f32,
}

/// Which texture holds the finished frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PresentSource {
    /// Accumulation buffer, when the blur combine ran.
    Accumulation(usize),
    /// Raw scene ring entry, when deferred shading was off.
    SceneRing(usize),
}

pub struct Renderer {
    targets: FrameTargets,
    shadow_map: ShadowMapPass,
    normal_prepass: NormalPrepass,
    scene: ScenePass,
    billboards: BillboardPass,
    motion_blur: MotionBlurPass,
    shadow_volumes: ShadowVolumePass,
    sequencer: BlurSequencer,
    shadow_technique: ShadowTechnique,
    fallback_map: Texture,
    stage: FrameStage,
    present_source: PresentSource,
}

impl Renderer {
    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Self {
        let device = &gpu.device;
        let targets = FrameTargets::new(device, width, height);
        let material_layout = material_bind_group_layout(device);
        let fallback_map = Texture::solid_color(
            device,
            &gpu.queue,
            "fallback white",
            [0xFF, 0xFF, 0xFF, 0xFF],
        );
        Self {
            shadow_map: ShadowMapPass::new(device),
            normal_prepass: NormalPrepass::new(device, &material_layout),
            scene: ScenePass::new(device, &material_layout, gpu.wireframe_supported()),
            billboards: BillboardPass::new(device),
            motion_blur: MotionBlurPass::new(device),
            shadow_volumes: ShadowVolumePass::new(device),
            sequencer: BlurSequencer::new(),
            shadow_technique: ShadowTechnique::default(),
            targets,
            fallback_map,
            stage: FrameStage::Idle,
            present_source: PresentSource::SceneRing(0),
        }
    }

    /// Recreates every size-dependent target and forgets blur history.
    pub fn resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        self.targets.resize(&gpu.device, width, height);
        self.sequencer.reset();
    }

    pub fn set_shadow_technique(&mut self, technique: ShadowTechnique) {
        self.shadow_technique = technique;
    }

    #[inline]
    #[must_use]
    pub fn shadow_technique(&self) -> ShadowTechnique {
        self.shadow_technique
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    #[inline]
    #[must_use]
    pub fn targets(&self) -> &FrameTargets {
        &self.targets
    }

    /// View of the texture holding the most recently finished frame.
    #[must_use]
    pub fn presentable_view(&self) -> &wgpu::TextureView {
        match self.present_source {
            PresentSource::Accumulation(index) => &self.targets.accumulation[index].view,
            PresentSource::SceneRing(index) => &self.targets.scene_ring[index].view,
        }
    }

    fn enter(&mut self, stage: FrameStage) {
        log::trace!("frame stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Renders one frame and submits it.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        registry: &mut SceneRegistry,
        camera: &Camera,
        toggles: &RenderToggles,
    ) -> Result<FrameReport> {
        let device = &gpu.device;
        let queue = &gpu.queue;

        // --- Cull ---
        self.enter(FrameStage::Cull);
        let cull_proj = camera.projection_with_far(Camera::FAR_PLANE);
        let visible = culling::cull_models(registry, &(cull_proj * camera.view_matrix()));

        // --- Plan lights ---
        self.enter(FrameStage::PlanLights);
        let shadow_channels = if toggles.shadow_mapping && !visible.is_empty() {
            plan_lights(registry, &visible.bounds, camera.up());
            if self.shadow_technique == ShadowTechnique::Map {
                assign_shadow_channels(registry.lights_mut().map(|(_, light)| light))
            } else {
                for (_, light) in registry.lights_mut() {
                    light.map_channel = -1;
                }
                0
            }
        } else {
            for (_, light) in registry.lights_mut() {
                light.map_channel = -1;
            }
            0
        };

        let far_plane = clamped_camera_far(&visible.bounds, camera.position());
        let view = camera.view_matrix();
        let proj = camera.projection_with_far(far_plane);
        let frame = FrameView {
            view,
            proj,
            view_proj: proj * view,
            camera_position: camera.position(),
            camera_look: camera.look(),
            camera_up: camera.up(),
            pixel_width: 1.0 / self.targets.width() as f32,
            pixel_height: 1.0 / self.targets.height() as f32,
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });

        // --- Shadow maps ---
        if toggles.shadow_mapping && self.shadow_technique == ShadowTechnique::Map {
            self.enter(FrameStage::ShadowMap);
            self.shadow_map.record(
                device,
                queue,
                &mut encoder,
                &self.targets,
                registry,
                &visible.models,
            );
        }

        // --- Normal prepass (unconditional) ---
        self.enter(FrameStage::NormalPrepass);
        self.normal_prepass.record(
            device,
            queue,
            &mut encoder,
            &self.targets,
            registry,
            &visible.models,
            &frame,
            toggles,
            &self.fallback_map,
        );

        // --- Scene shading ---
        self.enter(FrameStage::ShadeScene);
        let lights = LightArrayUniform::gather(
            registry.lights().map(|(_, light)| light),
            shadow_channels,
        );
        let scene_view = &self.targets.scene_ring[self.sequencer.scene_index()].view;
        self.scene.record(
            device,
            queue,
            &mut encoder,
            &self.targets,
            scene_view,
            registry,
            &visible.models,
            &frame,
            toggles,
            &lights,
            &self.fallback_map,
        );
        self.billboards.record(
            device,
            queue,
            &mut encoder,
            &self.targets,
            scene_view,
            registry,
            &frame,
        );
        if toggles.shadow_mapping && self.shadow_technique == ShadowTechnique::Volumes {
            let geometry = VolumeGeometry::generate(registry, &visible.models);
            self.shadow_volumes.record(
                device,
                queue,
                &mut encoder,
                &self.targets,
                scene_view,
                &geometry,
                frame.view_proj,
            );
        }

        // --- Temporal accumulation ---
        let blur = if toggles.deferred_shading {
            self.enter(FrameStage::MotionBlur);
            let technique = self.motion_blur.record(
                device,
                queue,
                &mut encoder,
                &self.targets,
                &mut self.sequencer,
            );
            self.present_source = PresentSource::Accumulation(self.sequencer.presentable_index());
            Some(technique)
        } else {
            self.present_source = PresentSource::SceneRing(self.sequencer.scene_index());
            None
        };

        self.enter(FrameStage::Present);
        queue.submit(Some(encoder.finish()));
        self.enter(FrameStage::Idle);

        Ok(FrameReport {
            visible_models: visible.len(),
            shadow_channels,
            blur,
            far_plane,
        })
    }
}
