//! Additive multi-light scene shading.
//!
//! Every contributing light is folded into one draw per mesh part; the
//! pass blends additively onto the frame's ring target so a later frame
//! combine can reuse the raw output. The target is cleared here even when
//! nothing is visible, keeping the motion-blur history well defined.

use std::borrow::Cow;
use std::ops::Range;

use crate::renderer::passes::{FrameView, UniformArena, material_bind_group};
use crate::renderer::settings::RenderToggles;
use crate::renderer::targets::FrameTargets;
use crate::renderer::uniforms::{LightArrayUniform, PartUniform};
use crate::renderer::{CLEAR_COLOR, COLOR_FORMAT, DEPTH_STENCIL_FORMAT};
use crate::resources::{Texture, Vertex};
use crate::scene::{ModelKey, SceneRegistry};

const SCENE_SHADER: &str = include_str!("shaders/scene.wgsl");

const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

struct SceneDraw {
    model: ModelKey,
    indices: Range<u32>,
    offset: u32,
    maps: wgpu::BindGroup,
}

pub struct ScenePass {
    solid: wgpu::RenderPipeline,
    /// Only present when the adapter negotiated line polygon fill.
    wire: Option<wgpu::RenderPipeline>,
    part_layout: wgpu::BindGroupLayout,
    frame_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    light_buffer: wgpu::Buffer,
    arena: UniformArena,
    wire_warned: bool,
}

impl ScenePass {
    pub fn new(
        device: &wgpu::Device,
        material_layout: &wgpu::BindGroupLayout,
        wireframe_supported: bool,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SCENE_SHADER)),
        });

        let part_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene part layout"),
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

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene frame layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene pipeline layout"),
            bind_group_layouts: &[Some(&part_layout), Some(&frame_layout), Some(material_layout)],
            immediate_size: 0,
        });

        let vertex_buffers = [Vertex::layout()];
        let descriptor = |polygon_mode: wgpu::PolygonMode| wgpu::RenderPipelineDescriptor {
            label: Some("scene pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(ADDITIVE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode,
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
        };

        let solid = device.create_render_pipeline(&descriptor(wgpu::PolygonMode::Fill));
        let wire = wireframe_supported
            .then(|| device.create_render_pipeline(&descriptor(wgpu::PolygonMode::Line)));

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene light array"),
            size: std::mem::size_of::<LightArrayUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let arena = UniformArena::new(
            device,
            "scene part uniforms",
            std::mem::size_of::<PartUniform>() as u64,
            64,
        );

        Self {
            solid,
            wire,
            part_layout,
            frame_layout,
            material_layout: material_layout.clone(),
            light_buffer,
            arena,
            wire_warned: false,
        }
    }

    pub fn record(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &FrameTargets,
        color_view: &wgpu::TextureView,
        registry: &SceneRegistry,
        visible: &[ModelKey],
        frame: &FrameView,
        toggles: &RenderToggles,
        lights: &LightArrayUniform,
        fallback: &Texture,
    ) {
        queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(lights));

        self.arena.reset();
        let mut draws: Vec<SceneDraw> = Vec::new();
        for &key in visible {
            let Some(model) = registry.model(key) else {
                continue;
            };
            let world = model.world_transform();
            for mesh in &model.geometry.meshes {
                for part in &mesh.parts {
                    let uniform = PartUniform::for_part(world, frame, toggles, part);
                    draws.push(SceneDraw {
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
            label: Some("scene part bind group"),
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
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene frame bind group"),
            layout: &self.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.shadow.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&targets.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&targets.target_sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.scene_depth.view,
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

        let pipeline = if toggles.wireframe {
            match &self.wire {
                Some(wire) => wire,
                None => {
                    if !self.wire_warned {
                        log::warn!("wireframe requested but the adapter lacks line fill");
                        self.wire_warned = true;
                    }
                    &self.solid
                }
            }
        } else {
            &self.solid
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(1, &frame_bind_group, &[]);

        for draw in &draws {
            let Some(model) = registry.model(draw.model) else {
                continue;
            };
            pass.set_bind_group(0, &part_bind_group, &[draw.offset]);
            pass.set_bind_group(2, &draw.maps, &[]);
            pass.set_vertex_buffer(0, model.geometry.vertex_buffer().slice(..));
            pass.set_index_buffer(
                model.geometry.index_buffer().slice(..),
                wgpu::IndexFormat::Uint16,
            );
            pass.draw_indexed(draw.indices.clone(), 0, 0..1);
        }
    }
}
