//! GPU texture resources.
//!
//! [`Texture`] bundles a `wgpu` texture with its view and sampler so mesh
//! parts can hand a single object to the bind-group builders. Data is
//! uploaded once at creation; the renderer treats textures as immutable.

use uuid::Uuid;

/// An uploaded 2D texture plus its default view and sampler.
#[derive(Debug)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Uploads tightly packed RGBA8 `pixels` (sRGB) as a 2D texture.
    ///
    /// `pixels.len()` must equal `width * height * 4`.
    #[must_use]
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Self {
        debug_assert_eq!(pixels.len() as u32, width * height * 4);

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(name),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// A 1×1 texture of a single color, used as the stand-in for absent maps.
    #[must_use]
    pub fn solid_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        color: [u8; 4],
    ) -> Self {
        Self::from_rgba8(device, queue, name, 1, 1, &color)
    }

    /// A black and white checkerboard, handy when wiring up new passes.
    #[must_use]
    pub fn checkerboard(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        width: u32,
        height: u32,
        check_size: u32,
    ) -> Self {
        let check = check_size.max(1);
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let on = ((x / check) + (y / check)) % 2 == 0;
                let value = if on { 255 } else { 0 };
                pixels.extend_from_slice(&[value, value, value, 255]);
            }
        }
        Self::from_rgba8(device, queue, name, width, height, &pixels)
    }
}
