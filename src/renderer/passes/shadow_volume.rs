//! Stencil shadow volumes, the legacy alternative to shadow maps.
//!
//! For every active point light the generator builds two closed fans: a
//! "light pyramid" from the light down to each occluder triangle, and a
//! "shadow pyramid" from the light through each triangle out to a far
//! shell. Rasterizing both with two-sided stencil (front faces increment,
//! back faces decrement) leaves a nonzero stencil count exactly where a
//! point sits inside some volume.
//!
//! Generation is pure CPU work over the retained mesh data; the pass
//! only fills the stencil buffer and masks all color writes.

use std::borrow::Cow;

use glam::{Mat4, Vec3};
use smallvec::SmallVec;
use wgpu::util::DeviceExt;

use crate::renderer::targets::FrameTargets;
use crate::renderer::uniforms::VolumeUniform;
use crate::renderer::{COLOR_FORMAT, DEPTH_STENCIL_FORMAT};
use crate::resources::Vertex;
use crate::scene::{Camera, LightKind, ModelKey, SceneRegistry};

const SHADOW_VOLUME_SHADER: &str = include_str!("shaders/shadow_volume.wgsl");

/// How far the shadow pyramid extends past the light, beyond any
/// geometry the camera can see.
pub const VOLUME_REACH: f32 = 2.0 * Camera::FAR_PLANE;

/// Position-only vertex for volume rasterization.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VolumeVertex {
    pub position: [f32; 3],
}

impl VolumeVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side volume meshes for one frame. Indices are 32-bit from the
/// start; the source meshes index with 16 bits but the concatenated
/// volume lists easily outgrow that.
#[derive(Debug, Default, Clone)]
pub struct VolumeGeometry {
    pub light_vertices: Vec<VolumeVertex>,
    pub light_indices: Vec<u32>,
    pub shadow_vertices: Vec<VolumeVertex>,
    pub shadow_indices: Vec<u32>,
}

impl VolumeGeometry {
    /// Builds both pyramids for every active point light against the
    /// visible models. Returns empty geometry when there is no point
    /// light or nothing to occlude.
    #[must_use]
    pub fn generate(registry: &SceneRegistry, visible: &[ModelKey]) -> Self {
        let mut out = Self::default();

        for (_, light) in registry.lights() {
            if !(light.active && light.kind == LightKind::Point) {
                continue;
            }
            let apex = out.add_light(light.position);

            for &key in visible {
                let Some(model) = registry.model(key) else {
                    continue;
                };
                let world = model.world_transform();
                let start_vertex =
                    out.add_occluder_vertices(light.position, &world, model.geometry.vertices());

                for mesh in &model.geometry.meshes {
                    for part in &mesh.parts {
                        let range = part.index_range();
                        let indices =
                            &model.geometry.indices()[range.start as usize..range.end as usize];
                        for triangle in indices.chunks_exact(3) {
                            out.add_triangle(
                                apex,
                                start_vertex,
                                [triangle[0], triangle[1], triangle[2]],
                            );
                        }
                    }
                }
            }
        }

        out
    }

    /// Appends one light apex. The apex sits at the same index in both
    /// vertex lists; every subsequent pyramid face fans out from it.
    pub fn add_light(&mut self, position: Vec3) -> u32 {
        let apex = self.light_vertices.len() as u32;
        let vertex = VolumeVertex {
            position: position.to_array(),
        };
        self.light_vertices.push(vertex);
        self.shadow_vertices.push(vertex);
        apex
    }

    /// Appends one occluder's base: world-transformed positions into the
    /// light list, their far-shell projections away from the light into
    /// the shadow list. Returns the index the occluder's vertices start
    /// at, for [`add_triangle`](Self::add_triangle).
    pub fn add_occluder_vertices(
        &mut self,
        light_position: Vec3,
        world: &Mat4,
        vertices: &[Vertex],
    ) -> u32 {
        let start_vertex = self.light_vertices.len() as u32;
        for vertex in vertices {
            let transformed = world.transform_point3(Vec3::from_array(vertex.position));
            self.light_vertices.push(VolumeVertex {
                position: transformed.to_array(),
            });
            let ray = (transformed - light_position).normalize_or_zero();
            self.shadow_vertices.push(VolumeVertex {
                position: (light_position + VOLUME_REACH * ray).to_array(),
            });
        }
        start_vertex
    }

    /// Appends the three fan faces each pyramid grows per occluder
    /// triangle. Mesh indices are 16-bit; the concatenated volume lists
    /// index with 32 bits.
    pub fn add_triangle(&mut self, apex: u32, start_vertex: u32, triangle: [u16; 3]) {
        let i0 = start_vertex + u32::from(triangle[0]);
        let i1 = start_vertex + u32::from(triangle[1]);
        let i2 = start_vertex + u32::from(triangle[2]);

        // Light pyramid: one face per occluder edge, wound against the
        // base triangle.
        self.light_indices.extend([apex, i1, i0]);
        self.light_indices.extend([apex, i2, i1]);
        self.light_indices.extend([apex, i0, i2]);

        // Shadow pyramid: same edges, opposite winding, pushed out to
        // the far shell.
        self.shadow_indices.extend([apex, i0, i1]);
        self.shadow_indices.extend([apex, i1, i2]);
        self.shadow_indices.extend([apex, i2, i0]);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.light_indices.is_empty() && self.shadow_indices.is_empty()
    }
}

pub struct ShadowVolumePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
}

impl ShadowVolumePass {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow volume shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADOW_VOLUME_SHADER)),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow volume layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow volume pipeline layout"),
            bind_group_layouts: &[Some(&layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow volume pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VolumeVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: None,
                    // Stencil only; the frame image stays untouched.
                    write_mask: wgpu::ColorWrites::empty(),
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Both faces rasterize; the stencil ops tell them apart.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_STENCIL_FORMAT,
                depth_write_enabled: Some(false),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState {
                    front: wgpu::StencilFaceState {
                        compare: wgpu::CompareFunction::Always,
                        fail_op: wgpu::StencilOperation::Keep,
                        depth_fail_op: wgpu::StencilOperation::Keep,
                        pass_op: wgpu::StencilOperation::IncrementWrap,
                    },
                    back: wgpu::StencilFaceState {
                        compare: wgpu::CompareFunction::Always,
                        fail_op: wgpu::StencilOperation::Keep,
                        depth_fail_op: wgpu::StencilOperation::Keep,
                        pass_op: wgpu::StencilOperation::DecrementWrap,
                    },
                    read_mask: 0xFF,
                    write_mask: 0xFF,
                },
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shadow volume uniforms"),
            size: std::mem::size_of::<VolumeUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            layout,
            uniform_buffer,
        }
    }

    /// Rasterizes both volume meshes into the stencil buffer, over the
    /// depth the scene pass left behind.
    pub fn record(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &FrameTargets,
        color_view: &wgpu::TextureView,
        geometry: &VolumeGeometry,
        view_proj: Mat4,
    ) {
        if geometry.is_empty() {
            return;
        }

        let uniform = VolumeUniform { view_proj };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow volume bind group"),
            layout: &self.layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: self.uniform_buffer.as_entire_binding(),
            }],
        });

        let meshes = [
            (&geometry.light_vertices, &geometry.light_indices, "light"),
            (&geometry.shadow_vertices, &geometry.shadow_indices, "shadow"),
        ];
        let buffers: SmallVec<[(wgpu::Buffer, wgpu::Buffer, u32); 2]> = meshes
            .iter()
            .filter(|(_, indices, _)| !indices.is_empty())
            .map(|(vertices, indices, name)| {
                let vertex_buffer =
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("volume/{name}/vertices")),
                        contents: bytemuck::cast_slice(vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("volume/{name}/indices")),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                (vertex_buffer, index_buffer, indices.len() as u32)
            })
            .collect();

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow volume pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.scene_depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
            }),
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);

        for (vertex_buffer, index_buffer, index_count) in &buffers {
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..*index_count, 0, 0..1);
        }
    }
}
