//! Offscreen render targets.
//!
//! One [`FrameTargets`] owns every texture the pipeline draws into:
//!
//! - `normal`: per-pixel surface normals from the prepass, consumed as an
//!   input texture by the shading pass.
//! - `shadow`: the shared 3-channel shadow map. Each color channel belongs
//!   to one shadow-casting light.
//! - `scene_ring`: ring of [`PAST_FRAME_COUNT`] scene buffers. The shading
//!   pass draws straight into the current ring entry, which doubles as the
//!   newest history frame for the temporal blur.
//! - `accumulation`: ping-pong pair holding the temporal blur average.
//! - `scene_depth`: depth-stencil for the shading pass, shared with the
//!   shadow-volume pass (volumes are stencil-tested against scene depth).
//!
//! Targets are recreated wholesale on resize; nothing here survives a
//! dimension change.

use crate::renderer::{COLOR_FORMAT, DEPTH_STENCIL_FORMAT};

/// Frames of history kept for temporal accumulation.
pub const PAST_FRAME_COUNT: usize = 8;

/// A color texture usable both as attachment and sampled input.
#[derive(Debug)]
pub struct ColorTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl ColorTarget {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// A depth-stencil attachment.
#[derive(Debug)]
pub struct DepthTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

pub struct FrameTargets {
    width: u32,
    height: u32,
    pub normal: ColorTarget,
    pub normal_depth: DepthTarget,
    pub shadow: ColorTarget,
    pub shadow_depth: DepthTarget,
    pub scene_depth: DepthTarget,
    pub scene_ring: [ColorTarget; PAST_FRAME_COUNT],
    pub accumulation: [ColorTarget; 2],
    /// Linear clamp sampler shared by every pass that reads a target back.
    pub target_sampler: wgpu::Sampler,
}

impl FrameTargets {
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        log::debug!("allocating frame targets at {width}x{height}");
        let scene_ring = std::array::from_fn(|i| {
            ColorTarget::new(device, &format!("target/scene-ring-{i}"), width, height)
        });
        let accumulation = std::array::from_fn(|i| {
            ColorTarget::new(device, &format!("target/accumulation-{i}"), width, height)
        });
        let target_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("target sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            width,
            height,
            normal: ColorTarget::new(device, "target/normal", width, height),
            normal_depth: DepthTarget::new(device, "target/normal-depth", width, height),
            shadow: ColorTarget::new(device, "target/shadow", width, height),
            shadow_depth: DepthTarget::new(device, "target/shadow-depth", width, height),
            scene_depth: DepthTarget::new(device, "target/scene-depth", width, height),
            scene_ring,
            accumulation,
            target_sampler,
        }
    }

    /// Recreates every target at the new size. No-op for degenerate sizes.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        *self = Self::new(device, width, height);
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}
