//! Point-list renderer for the READABLE particle buffer.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::shaders::points_source;
use super::GpuContext;
use crate::particles::buffer_size_bytes;
use crate::render::{FrameSubmission, PointSource, RenderBackend};

/// Uniforms of `points.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RenderUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub coeffs: [[f32; 4]; 8],
    pub slow_color: [f32; 4],
    pub fast_color: [f32; 4],
    pub speed_k: f32,
    pub alpha_k: f32,
    pub alpha_min: f32,
    pub _pad: f32,
}

impl RenderUniforms {
    pub fn from_frame(frame: &FrameSubmission<'_>) -> Self {
        let [sr, sg, sb] = frame.color.slow_color;
        let [fr, fg, fb] = frame.color.fast_color;
        Self {
            view_proj: frame.transform.view_proj().to_cols_array_2d(),
            view: frame.view().to_cols_array_2d(),
            model: frame.model().to_cols_array_2d(),
            coeffs: frame.field.to_gpu(),
            slow_color: [sr, sg, sb, 1.0],
            fast_color: [fr, fg, fb, 1.0],
            speed_k: frame.color.speed_k,
            alpha_k: frame.color.alpha_k,
            alpha_min: frame.color.alpha_min,
            _pad: 0.0,
        }
    }
}

pub struct PointRenderer {
    context: GpuContext,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// Upload target when the positions live in host memory.
    host_buffer: Option<wgpu::Buffer>,
}

impl PointRenderer {
    pub fn new(context: GpuContext) -> Self {
        let device = context.device();

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Uniforms"),
            contents: bytemuck::bytes_of(&RenderUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Point Uniform Layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(points_source().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        // Additive blending: dense regions of the attractor glow.
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 12,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.format(),
                    blend: Some(additive),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            host_buffer: None,
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// Reconfigure the surface at its current size after it was lost.
    pub fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Copy host positions into the upload buffer, growing it if needed.
    fn upload(&mut self, points: &[glam::Vec3]) {
        let size = buffer_size_bytes(points.len());
        let fits = self.host_buffer.as_ref().is_some_and(|b| b.size() >= size);
        if !fits {
            let buffer = self.context.device().create_buffer(&wgpu::BufferDescriptor {
                label: Some("Host Particle Upload"),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.host_buffer = Some(buffer);
        }
        if let Some(buffer) = &self.host_buffer {
            self.context
                .queue()
                .write_buffer(buffer, 0, bytemuck::cast_slice(points));
        }
    }
}

impl RenderBackend for PointRenderer {
    fn submit_frame(&mut self, frame: &FrameSubmission<'_>) -> Result<(), wgpu::SurfaceError> {
        let uniforms = RenderUniforms::from_frame(frame);
        self.context
            .queue()
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = self.context.surface().get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let PointSource::Host(points) = frame.points {
            self.upload(points);
        }
        let vertices = match frame.points {
            PointSource::Device(buffer) => buffer,
            PointSource::Host(_) => match &self.host_buffer {
                Some(buffer) => buffer,
                None => return Ok(()),
            },
        };

        let mut encoder = self
            .context
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Point Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, vertices.slice(..));
            render_pass.draw(0..frame.point_count, 0..1);
        }

        self.context.queue().submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        // three mat4, eight vec4 coefficients, two vec4 colours, one vec4 of scalars
        assert_eq!(std::mem::size_of::<RenderUniforms>(), 3 * 64 + 8 * 16 + 2 * 16 + 16);
    }
}
