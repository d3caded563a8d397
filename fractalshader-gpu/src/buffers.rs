//! Uniform buffer layout shared with the generated fragment programs.

use bytemuck::{Pod, Zeroable};
use fractalshader_core::FrameUniforms;
use std::num::NonZeroU64;

/// std140 image of the `FractalUniforms` block.
///
/// `viewport` is a `vec3`, which std140 aligns to 16 bytes; the trailing
/// pad rounds the block up to 32.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FrameUniformsGpu {
    pub canvas_size: [f32; 2],
    pub param: [f32; 2],
    pub viewport: [f32; 3],
    pub _pad: f32,
}

impl FrameUniformsGpu {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

impl From<&FrameUniforms> for FrameUniformsGpu {
    fn from(uniforms: &FrameUniforms) -> Self {
        let [re, im] = uniforms.param.unwrap_or([0.0, 0.0]);
        let [u0, u1, u2] = uniforms.viewport;
        Self {
            canvas_size: [uniforms.canvas_size[0] as f32, uniforms.canvas_size[1] as f32],
            param: [re as f32, im as f32],
            viewport: [u0 as f32, u1 as f32, u2 as f32],
            _pad: 0.0,
        }
    }
}

/// Create the uniform buffer for one surface.
pub fn create_uniform_buffer(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("fractal_uniforms"),
        size: FrameUniformsGpu::SIZE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Layout of bind group 0: the uniform block at binding 0.
///
/// Identical layouts are interchangeable, so the compiler and each surface
/// create their own.
pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("fractal_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(FrameUniformsGpu::SIZE),
            },
            count: None,
        }],
    })
}
