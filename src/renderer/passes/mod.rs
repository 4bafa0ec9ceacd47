//! Render passes, one module per pipeline stage.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::resources::{MapSet, Texture};

pub mod billboard_pass;
pub mod motion_blur;
pub mod normal_prepass;
pub mod scene_pass;
pub mod shadow_map;
pub mod shadow_volume;

pub use billboard_pass::BillboardPass;
pub use motion_blur::{BlurSequencer, BlurTechnique, MotionBlurPass};
pub use normal_prepass::NormalPrepass;
pub use scene_pass::ScenePass;
pub use shadow_map::ShadowMapPass;
pub use shadow_volume::{ShadowVolumePass, VolumeGeometry};

/// Camera-derived values shared by every pass in one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView {
    pub view: Mat4,
    pub proj: Mat4,
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub camera_look: Vec3,
    pub camera_up: Vec3,
    pub pixel_width: f32,
    pub pixel_height: f32,
}

/// Layout for the per-part texture maps, shared by the normal prepass and
/// the scene pass so one bind group serves both.
pub(crate) fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("material maps layout"),
        entries: &[
            // combined, diffuse, specular, normal
            texture_entry(0),
            texture_entry(1),
            texture_entry(2),
            texture_entry(3),
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn view_or<'a>(map: &'a Option<Arc<Texture>>, fallback: &'a Texture) -> &'a wgpu::TextureView {
    map.as_ref().map_or(&fallback.view, |texture| &texture.view)
}

/// Binds a part's texture maps, substituting `fallback` for absent slots.
/// The shader never samples a substituted slot because the matching map
/// flag stays low.
pub(crate) fn material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    maps: &MapSet,
    fallback: &Texture,
) -> wgpu::BindGroup {
    let sampler = [&maps.combined, &maps.diffuse, &maps.specular, &maps.normal]
        .into_iter()
        .find_map(|map| map.as_deref())
        .map_or(&fallback.sampler, |texture| &texture.sampler);
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("material maps"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view_or(&maps.combined, fallback)),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view_or(&maps.diffuse, fallback)),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(view_or(&maps.specular, fallback)),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(view_or(&maps.normal, fallback)),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// Uniform buffer offset alignment every backend accepts.
const UNIFORM_ALIGN: u64 = 256;

/// A grow-only uniform buffer that passes refill each frame.
///
/// Draw loops push one block per draw and remember the returned dynamic
/// offset; `flush` uploads everything in one write, recreating the buffer
/// at the next power-of-two size when the frame outgrew it. Bind groups
/// against the arena are rebuilt per frame, so growth is invisible to
/// callers.
pub struct UniformArena {
    label: &'static str,
    buffer: wgpu::Buffer,
    item_size: u64,
    stride: u64,
    staging: Vec<u8>,
}

impl UniformArena {
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &'static str, item_size: u64, slots: u64) -> Self {
        let stride = item_size.div_ceil(UNIFORM_ALIGN) * UNIFORM_ALIGN;
        let buffer = Self::create_buffer(device, label, stride * slots.max(1));
        Self {
            label,
            buffer,
            item_size,
            stride,
            staging: Vec::new(),
        }
    }

    fn create_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn reset(&mut self) {
        self.staging.clear();
    }

    /// Appends one block, returning its dynamic offset.
    pub fn push<T: bytemuck::Pod>(&mut self, value: &T) -> u32 {
        debug_assert_eq!(std::mem::size_of::<T>() as u64, self.item_size);
        let offset = self.staging.len();
        self.staging.resize(offset + self.stride as usize, 0);
        let bytes = bytemuck::bytes_of(value);
        self.staging[offset..offset + bytes.len()].copy_from_slice(bytes);
        u32::try_from(offset).unwrap_or(u32::MAX)
    }

    /// Uploads the frame's blocks, growing the buffer first if needed.
    pub fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let needed = self.staging.len() as u64;
        if needed == 0 {
            return;
        }
        if needed > self.buffer.size() {
            let size = needed.next_power_of_two();
            log::debug!("growing uniform arena {} to {} bytes", self.label, size);
            self.buffer = Self::create_buffer(device, self.label, size);
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Binding size for one block (the struct size, not the stride).
    #[inline]
    #[must_use]
    pub fn item_size(&self) -> u64 {
        self.item_size
    }
}
