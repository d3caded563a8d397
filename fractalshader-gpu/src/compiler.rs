//! GLSL front end and render pipeline creation.
//!
//! Programs are parsed and validated with naga before wgpu sees them, so a
//! bad custom colour formula becomes a diagnostic string instead of a
//! device error.

use crate::buffers::create_bind_group_layout;
use crate::device::GpuContext;
use crate::error::GpuError;
use fractalshader_core::{ProgramSource, ShaderCompiler};
use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use std::borrow::Cow;
use std::sync::Arc;

/// Colour format of every surface the programs draw into.
pub const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Parse and validate one GLSL stage.
pub fn parse_stage(source: &str, stage: naga::ShaderStage) -> Result<naga::Module, GpuError> {
    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(stage), source)
        .map_err(|errors| GpuError::Parse(errors.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|error| GpuError::Validation(error.emit_to_string(source)))?;

    Ok(module)
}

/// A compiled fractal program.
pub struct GpuProgram {
    pub pipeline: wgpu::RenderPipeline,
}

/// [`ShaderCompiler`] backed by naga and wgpu.
pub struct GlslCompiler {
    context: Arc<GpuContext>,
    pipeline_layout: wgpu::PipelineLayout,
}

impl GlslCompiler {
    pub fn new(context: Arc<GpuContext>) -> Self {
        let device = &context.device;

        let bind_group_layout = create_bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fractal_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        Self {
            context,
            pipeline_layout,
        }
    }

    /// Parse, validate and build the pipeline for a vertex/fragment pair.
    pub fn build(&self, vertex: &str, fragment: &str) -> Result<GpuProgram, GpuError> {
        let vertex_module = parse_stage(vertex, naga::ShaderStage::Vertex)?;
        let fragment_module = parse_stage(fragment, naga::ShaderStage::Fragment)?;

        let device = &self.context.device;
        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fullscreen_vertex"),
            source: wgpu::ShaderSource::Naga(Cow::Owned(vertex_module)),
        });
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fractal_fragment"),
            source: wgpu::ShaderSource::Naga(Cow::Owned(fragment_module)),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fractal_pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: SURFACE_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        Ok(GpuProgram { pipeline })
    }
}

impl ShaderCompiler for GlslCompiler {
    type Program = GpuProgram;

    fn compile(&mut self, vertex: &str, fragment: &ProgramSource) -> Result<GpuProgram, String> {
        self.build(vertex, fragment.as_str()).map_err(|e| e.to_string())
    }
}
