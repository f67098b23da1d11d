//! Compute-shader integration over device-resident particle buffers.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use super::shaders::{integrate_source, WORKGROUP_SIZE};
use crate::attractor::AttractorField;
use crate::double_buffer::{DoubleBuffer, Slot};
use crate::integrator::{IntegrationBackend, StepParams};
use crate::particles::buffer_size_bytes;
use crate::render::PointSource;

/// Uniforms of `integrate.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct IntegrateParams {
    pub coeffs: [[f32; 4]; 8],
    pub step_size: f32,
    pub sub_steps: u32,
    pub count: u32,
    pub _pad: u32,
}

impl IntegrateParams {
    pub fn new(field: &AttractorField, params: StepParams, count: u32) -> Self {
        Self {
            coeffs: field.to_gpu(),
            step_size: params.step_size,
            sub_steps: params.sub_steps,
            count,
            _pad: 0,
        }
    }
}

/// Two storage buffers plus one pre-built bind group per direction.
///
/// The bind group used for a step is picked by the front slot: with A in
/// front the kernel reads A and writes B, and vice versa. Submissions on
/// one queue execute in order, so the draw that follows a step always
/// sees the finished output.
pub struct GpuIntegrator {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::ComputePipeline,
    params_buffer: wgpu::Buffer,
    buffers: DoubleBuffer<wgpu::Buffer>,
    /// Indexed by the slot that is READABLE when the group is used.
    bind_groups: DoubleBuffer<wgpu::BindGroup>,
    count: u32,
    max_groups_x: u32,
}

impl GpuIntegrator {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, count: u32) -> Self {
        let size = buffer_size_bytes(count as usize);
        let buffers = DoubleBuffer::from_fn(|slot| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(match slot {
                    Slot::A => "Particle Buffer A",
                    Slot::B => "Particle Buffer B",
                }),
                size,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Integrate Params"),
            contents: bytemuck::bytes_of(&IntegrateParams::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Integrate Bind Group Layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_groups = DoubleBuffer::from_fn(|front| {
            let src = buffers.get(front);
            let dst = buffers.get(front.other());
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(match front {
                    Slot::A => "Integrate A -> B",
                    Slot::B => "Integrate B -> A",
                }),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: src.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: dst.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Integrate Shader"),
            source: wgpu::ShaderSource::Wgsl(integrate_source().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Integrate Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Integrate Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let max_groups_x = device.limits().max_compute_workgroups_per_dimension;

        Self {
            device,
            queue,
            pipeline,
            params_buffer,
            buffers,
            bind_groups,
            count,
            max_groups_x,
        }
    }

    pub fn buffers(&self) -> &DoubleBuffer<wgpu::Buffer> {
        &self.buffers
    }
}

/// Split `groups` workgroups over x and y so neither exceeds `max_x`.
pub(crate) fn dispatch_size(groups: u32, max_x: u32) -> (u32, u32) {
    if groups <= max_x {
        (groups, 1)
    } else {
        (max_x, groups.div_ceil(max_x))
    }
}

impl IntegrationBackend for GpuIntegrator {
    fn particle_count(&self) -> usize {
        self.count as usize
    }

    fn load(&mut self, positions: &[Vec3]) {
        let bytes: &[u8] = bytemuck::cast_slice(positions);
        let (front, back) = self.buffers.both_mut();
        self.queue.write_buffer(front, 0, bytes);
        self.queue.write_buffer(back, 0, bytes);
    }

    fn advance(&mut self, field: &AttractorField, params: StepParams) {
        let uniforms = IntegrateParams::new(field, params, self.count);
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Integrate Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Integrate Pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, self.bind_groups.get(self.buffers.front_slot()), &[]);

            let groups = self.count.div_ceil(WORKGROUP_SIZE);
            let (x, y) = dispatch_size(groups, self.max_groups_x);
            compute_pass.dispatch_workgroups(x, y, 1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.buffers.swap();
    }

    fn front_slot(&self) -> Slot {
        self.buffers.front_slot()
    }

    fn front_points(&self) -> PointSource<'_> {
        PointSource::Device(self.buffers.front())
    }

    fn finish(&self) {
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }

    fn name(&self) -> &'static str {
        "gpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_layout_matches_wgsl() {
        // array<vec4<f32>, 8> + four 4-byte scalars
        assert_eq!(std::mem::size_of::<IntegrateParams>(), 144);
    }

    #[test]
    fn test_dispatch_size_splits_large_counts() {
        assert_eq!(dispatch_size(10, 65_535), (10, 1));
        assert_eq!(dispatch_size(65_535, 65_535), (65_535, 1));
        assert_eq!(dispatch_size(70_000, 65_535), (65_535, 2));
    }
}
