//! Packed shadow-map generation.
//!
//! All shadow casters share one color target: each light gets a channel
//! (r, g or b) and writes closeness values under max blending, so up to
//! three maps coexist in a single texture. Depth is cleared between
//! lights while the color channels accumulate across the whole pass.

use std::borrow::Cow;
use std::ops::Range;

use smallvec::SmallVec;

use crate::renderer::passes::UniformArena;
use crate::renderer::targets::FrameTargets;
use crate::renderer::uniforms::ShadowCasterUniform;
use crate::renderer::{COLOR_FORMAT, DEPTH_STENCIL_FORMAT};
use crate::resources::Vertex;
use crate::scene::{ModelKey, SceneRegistry};

const SHADOW_MAP_SHADER: &str = include_str!("shaders/shadow_map.wgsl");

struct CasterDraw {
    model: ModelKey,
    indices: Range<u32>,
    offset: u32,
}

struct CasterBatch {
    label_channel: i32,
    draws: Vec<CasterDraw>,
}

pub struct ShadowMapPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    arena: UniformArena,
}

impl ShadowMapPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow map shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADOW_MAP_SHADER)),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow map layout"),
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
            label: Some("shadow map pipeline layout"),
            bind_group_layouts: &[Some(&layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow map pipeline"),
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
                    // max() keeps the nearest occluder per channel and
                    // leaves the other lights' channels intact.
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Max,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Max,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Casters render both faces so thin geometry still occludes.
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
            "shadow caster uniforms",
            std::mem::size_of::<ShadowCasterUniform>() as u64,
            64,
        );

        Self {
            pipeline,
            layout,
            arena,
        }
    }

    /// Renders every channel-assigned light's casters into the packed map.
    ///
    /// Nothing is recorded when the visible set is empty; the map then
    /// keeps whatever the previous frame left, which is harmless because
    /// the scene pass has nothing to shade either.
    pub fn record(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &FrameTargets,
        registry: &SceneRegistry,
        visible: &[ModelKey],
    ) {
        if visible.is_empty() {
            return;
        }

        self.arena.reset();
        // One batch per shadow channel, three at most.
        let mut batches: SmallVec<[CasterBatch; 3]> = SmallVec::new();

        for (_, light) in registry.lights() {
            if !(light.casts_shadow_map() && light.contributes() && light.map_channel >= 0) {
                continue;
            }
            let light_view_proj = light.view_proj();
            let mut draws = Vec::new();
            for &key in visible {
                let Some(model) = registry.model(key) else {
                    continue;
                };
                let world_view_proj = light_view_proj * model.world_transform();
                let uniform = ShadowCasterUniform {
                    world_view_proj,
                    channel: [light.map_channel as u32, 0, 0, 0],
                };
                for mesh in &model.geometry.meshes {
                    for part in &mesh.parts {
                        let offset = self.arena.push(&uniform);
                        draws.push(CasterDraw {
                            model: key,
                            indices: part.index_range(),
                            offset,
                        });
                    }
                }
            }
            batches.push(CasterBatch {
                label_channel: light.map_channel,
                draws,
            });
        }

        self.arena.flush(device, queue);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow caster bind group"),
            layout: &self.layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: self.arena.buffer(),
                    offset: 0,
                    size: wgpu::BufferSize::new(self.arena.item_size()),
                }),
            }],
        });

        // One full clear first, then the color channels accumulate while
        // depth restarts per light.
        {
            let _clear = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow map clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &targets.shadow.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.shadow_depth.view,
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
        }

        for batch in &batches {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow map casters"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &targets.shadow.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.shadow_depth.view,
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
            log::trace!(
                "shadow pass: channel {} with {} draws",
                batch.label_channel,
                batch.draws.len()
            );

            for draw in &batch.draws {
                let Some(model) = registry.model(draw.model) else {
                    continue;
                };
                pass.set_bind_group(0, &bind_group, &[draw.offset]);
                pass.set_vertex_buffer(0, model.geometry.vertex_buffer().slice(..));
                pass.set_index_buffer(
                    model.geometry.index_buffer().slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                pass.draw_indexed(draw.indices.clone(), 0, 0..1);
            }
        }
    }
}
