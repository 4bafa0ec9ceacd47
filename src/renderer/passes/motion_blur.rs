//! Temporal accumulation motion blur.
//!
//! The scene renders into a ring of eight history targets; each frame a
//! fullscreen combine folds the newest entry into one of two accumulation
//! buffers while subtracting the entry that just fell out of the window.
//! Until the ring has filled once, a bootstrap technique builds a running
//! average instead, so the first frames fade in rather than flash.
//!
//! [`BlurSequencer`] owns all the indexing and never touches the GPU,
//! which keeps the arithmetic testable on its own.

use std::borrow::Cow;

use crate::renderer::COLOR_FORMAT;
use crate::renderer::targets::{FrameTargets, PAST_FRAME_COUNT};
use crate::renderer::uniforms::BlurUniform;

const MOTION_BLUR_SHADER: &str = include_str!("shaders/motion_blur.wgsl");

/// Which combine formula the shader applies this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurTechnique {
    /// Running average while the history ring is still filling.
    Bootstrap,
    /// Sliding window once eight frames exist.
    Steady,
}

impl BlurTechnique {
    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            Self::Bootstrap => 0,
            Self::Steady => 1,
        }
    }
}

/// Frame bookkeeping for the blur: the ring cursor, the accumulation
/// ping-pong, and the bootstrap frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurSequencer {
    current: usize,
    frames_seen: u32,
    front: usize,
}

impl Default for BlurSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl BlurSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: 0,
            frames_seen: 0,
            front: 0,
        }
    }

    /// Forgets all history, for when the targets were recreated.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Ring slot the scene pass renders into this frame.
    #[inline]
    #[must_use]
    pub fn scene_index(&self) -> usize {
        self.current
    }

    /// Ring slot leaving the window this frame, subtracted by the
    /// steady-state combine.
    #[inline]
    #[must_use]
    pub fn oldest_index(&self) -> usize {
        (self.current + 1) % PAST_FRAME_COUNT
    }

    /// Accumulation buffer the combine reads from.
    #[inline]
    #[must_use]
    pub fn read_index(&self) -> usize {
        self.front
    }

    /// Accumulation buffer the combine writes to.
    #[inline]
    #[must_use]
    pub fn write_index(&self) -> usize {
        1 - self.front
    }

    /// After [`advance`](Self::advance), the buffer holding the finished
    /// combined image.
    #[inline]
    #[must_use]
    pub fn presentable_index(&self) -> usize {
        self.front
    }

    #[inline]
    #[must_use]
    pub fn frames_seen(&self) -> u32 {
        self.frames_seen
    }

    /// Picks the technique for this frame and counts it. Returns the
    /// technique together with the number of frames accumulated so far,
    /// including this one.
    pub fn begin_frame(&mut self) -> (BlurTechnique, u32) {
        if (self.frames_seen as usize) < PAST_FRAME_COUNT {
            self.frames_seen += 1;
            (BlurTechnique::Bootstrap, self.frames_seen)
        } else {
            (BlurTechnique::Steady, self.frames_seen)
        }
    }

    /// Moves the ring cursor and flips the accumulation ping-pong. Call
    /// once per combined frame, after recording the combine.
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % PAST_FRAME_COUNT;
        self.front = 1 - self.front;
    }
}

pub struct MotionBlurPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
}

impl MotionBlurPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("motion blur shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(MOTION_BLUR_SHADER)),
        });

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
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("motion blur layout"),
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
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("motion blur pipeline layout"),
            bind_group_layouts: &[Some(&layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("motion blur pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
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
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("motion blur uniforms"),
            size: std::mem::size_of::<BlurUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            layout,
            uniform_buffer,
        }
    }

    /// Records the combine for this frame and advances the sequencer.
    /// Returns the technique that ran.
    pub fn record(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &FrameTargets,
        sequencer: &mut BlurSequencer,
    ) -> BlurTechnique {
        let (technique, frame_count) = sequencer.begin_frame();
        let uniform = BlurUniform {
            technique: technique.index(),
            frame_count,
            _pad: [0; 2],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("motion blur bind group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(
                        &targets.scene_ring[sequencer.scene_index()].view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(
                        &targets.accumulation[sequencer.read_index()].view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(
                        &targets.scene_ring[sequencer.oldest_index()].view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&targets.target_sampler),
                },
            ],
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("motion blur combine"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &targets.accumulation[sequencer.write_index()].view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        sequencer.advance();
        technique
    }
}
