//! Axis-constrained billboard rendering.
//!
//! Draws after the scene pass into the same target, sharing its depth so
//! quads sit correctly among geometry. Corners are placed in the vertex
//! shader; the CPU side only supplies texture coordinates per quad.

use std::borrow::Cow;

use crate::renderer::passes::{FrameView, UniformArena};
use crate::renderer::targets::FrameTargets;
use crate::renderer::uniforms::BillboardUniform;
use crate::renderer::{COLOR_FORMAT, DEPTH_STENCIL_FORMAT};
use crate::scene::{Billboard, BillboardVertex, SceneRegistry};

const BILLBOARD_SHADER: &str = include_str!("shaders/billboard.wgsl");

pub struct BillboardPass {
    pipeline: wgpu::RenderPipeline,
    board_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    arena: UniformArena,
}

impl BillboardPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("billboard shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(BILLBOARD_SHADER)),
        });

        let board_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("billboard layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("billboard texture layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("billboard pipeline layout"),
            bind_group_layouts: &[Some(&board_layout), Some(&texture_layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("billboard pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[BillboardVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Quads must show from both sides.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_STENCIL_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let arena = UniformArena::new(
            device,
            "billboard uniforms",
            std::mem::size_of::<BillboardUniform>() as u64,
            16,
        );

        Self {
            pipeline,
            board_layout,
            texture_layout,
            arena,
        }
    }

    /// Draws every registered billboard over the scene target.
    pub fn record(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &FrameTargets,
        color_view: &wgpu::TextureView,
        registry: &SceneRegistry,
        frame: &FrameView,
    ) {
        if registry.billboard_count() == 0 {
            return;
        }

        self.arena.reset();
        let mut draws = Vec::new();
        for (key, board) in registry.billboards() {
            let uniform = BillboardUniform {
                view: frame.view,
                proj: frame.proj,
                world: glam::Mat4::from_translation(board.position),
                camera_position: frame.camera_position.extend(0.0),
                allowed_rotation: frame.camera_up.extend(0.0),
                half_size: glam::Vec4::new(board.half_width(), board.half_height(), 0.0, 0.0),
            };
            let texture_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("billboard texture"),
                layout: &self.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&board.texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&board.texture.sampler),
                    },
                ],
            });
            draws.push((key, self.arena.push(&uniform), texture_group));
        }

        self.arena.flush(device, queue);
        let board_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("billboard bind group"),
            layout: &self.board_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: self.arena.buffer(),
                    offset: 0,
                    size: wgpu::BufferSize::new(self.arena.item_size()),
                }),
            }],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("billboard pass"),
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

        for (key, offset, texture_group) in &draws {
            let Some(board) = registry.billboard(*key) else {
                continue;
            };
            pass.set_bind_group(0, &board_bind_group, &[*offset]);
            pass.set_bind_group(1, texture_group, &[]);
            pass.set_vertex_buffer(0, board.vertex_buffer().slice(..));
            pass.draw(0..Billboard::vertex_count(), 0..1);
        }
    }
}
