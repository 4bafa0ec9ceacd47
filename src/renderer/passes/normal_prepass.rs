//! Screen-space normal prepass.
//!
//! Runs every frame regardless of the normal-mapping toggle: the toggle
//! only decides whether the scene pass reads the buffer back. An empty
//! visible set still clears the target so stale normals never leak into
//! the next frame.

use std::borrow::Cow;
use std::ops::Range;

use crate::renderer::passes::{FrameView, UniformArena, material_bind_group};
use crate::renderer::settings::RenderToggles;
use crate::renderer::targets::FrameTargets;
use crate::renderer::uniforms::PartUniform;
use crate::renderer::{COLOR_FORMAT, DEPTH_STENCIL_FORMAT};
use crate::resources::{Texture, Vertex};
use crate::scene::{ModelKey, SceneRegistry};

const NORMAL_PREPASS_SHADER: &str = include_str!("shaders/normal_prepass.wgsl");

struct PrepassDraw {
    model: ModelKey,
    indices: Range<u32>,
    offset: u32,
    maps: wgpu::BindGroup,
}

pub struct NormalPrepass {
    pipeline: wgpu::RenderPipeline,
    part_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    arena: UniformArena,
}

impl NormalPrepass {
    pub fn new(device: &wgpu::Device, material_layout: &wgpu::BindGroupLayout) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("normal prepass shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(NORMAL_PREPASS_SHADER)),
        });

        let part_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("normal prepass part layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("normal prepass pipeline layout"),
            bind_group_layouts: &[Some(&part_layout), Some(material_layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("normal prepass pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::Src,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::SrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
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
            "normal prepass uniforms",
            std::mem::size_of::<PartUniform>() as u64,
            64,
        );

        Self {
            pipeline,
            part_layout,
            material_layout: material_layout.clone(),
            arena,
        }
    }

    pub fn record(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &FrameTargets,
        registry: &SceneRegistry,
        visible: &[ModelKey],
        frame: &FrameView,
        toggles: &RenderToggles,
        fallback: &Texture,
    ) {
        self.arena.reset();
        let mut draws: Vec<PrepassDraw> = Vec::new();
        for &key in visible {
            let Some(model) = registry.model(key) else {
                continue;
            };
            let world = model.world_transform();
            for mesh in &model.geometry.meshes {
                for part in &mesh.parts {
                    let uniform = PartUniform::for_part(world, frame, toggles, part);
                    draws.push(PrepassDraw {
                        model: key,
                        indices: part.index_range(),
                        offset: self.arena.push(&uniform),
                        maps: material_bind_group(
                            device,
                            &self.material_layout,
                            &part.maps,
                            fallback,
                        ),
                    });
                }
            }
        }

        self.arena.flush(device, queue);
        let part_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("normal prepass part bind group"),
            layout: &self.part_layout,
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
            label: Some("normal prepass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.normal.view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.normal_depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);

        for draw in &draws {
            let Some(model) = registry.model(draw.model) else {
                continue;
            };
            pass.set_bind_group(0, &part_bind_group, &[draw.offset]);
            pass.set_bind_group(1, &draw.maps, &[]);
            pass.set_vertex_buffer(0, model.geometry.vertex_buffer().slice(..));
            pass.set_index_buffer(
                model.geometry.index_buffer().slice(..),
                wgpu::IndexFormat::Uint16,
            );
            pass.draw_indexed(draw.indices.clone(), 0, 0..1);
        }
    }
}
