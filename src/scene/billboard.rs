//! Camera-facing billboards.
//!
//! A billboard is a textured quad that always faces the camera. The CPU side
//! stores only six texture coordinates; the vertex shader reconstructs the
//! world-space corners from the billboard's position, half extents and the
//! camera basis, so no per-frame vertex upload is needed.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use glam::Vec3;
use uuid::Uuid;
use wgpu::util::DeviceExt;

use crate::resources::texture::Texture;

/// Billboard vertices carry texture coordinates only.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BillboardVertex {
    pub uv: [f32; 2],
}

impl BillboardVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BillboardVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Two triangles; `u` selects left/right of center, `v` top/bottom.
const QUAD_UVS: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

#[derive(Debug)]
pub struct Billboard {
    pub uuid: Uuid,
    /// Short display id derived from the uuid.
    pub id: u64,
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
    pub texture: Arc<Texture>,
    vertex_buffer: wgpu::Buffer,
}

impl Billboard {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        texture: Arc<Texture>,
        position: Vec3,
        width: f32,
        height: f32,
    ) -> Self {
        let uuid = Uuid::new_v4();
        let mut hasher = DefaultHasher::new();
        uuid.hash(&mut hasher);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("billboard/vertices"),
            contents: bytemuck::cast_slice(&quad_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            uuid,
            id: hasher.finish(),
            position,
            width,
            height,
            texture,
            vertex_buffer,
        }
    }

    #[inline]
    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    #[inline]
    #[must_use]
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    #[inline]
    #[must_use]
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    #[inline]
    #[must_use]
    pub const fn vertex_count() -> u32 {
        QUAD_UVS.len() as u32
    }
}

#[must_use]
fn quad_vertices() -> [BillboardVertex; 6] {
    QUAD_UVS.map(|uv| BillboardVertex { uv })
}
