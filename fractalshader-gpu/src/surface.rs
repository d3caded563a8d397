//! Off-screen render target with pixel read-back.

use crate::buffers::{create_bind_group_layout, create_uniform_buffer, FrameUniformsGpu};
use crate::compiler::{GpuProgram, SURFACE_FORMAT};
use crate::device::GpuContext;
use crate::error::GpuError;
use fractalshader_core::{FrameUniforms, RenderSurface};
use std::sync::Arc;

const BYTES_PER_PIXEL: u32 = 4;

/// RGBA8 texture the fractal programs draw into.
pub struct OffscreenSurface {
    context: Arc<GpuContext>,
    bind_group_layout: wgpu::BindGroupLayout,
    texture: wgpu::Texture,
    uniforms: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl OffscreenSurface {
    pub fn new(context: Arc<GpuContext>, width: u32, height: u32) -> Self {
        let bind_group_layout = create_bind_group_layout(&context.device);
        let texture = create_target(&context.device, width, height);
        let uniforms = create_uniform_buffer(&context.device);
        Self {
            context,
            bind_group_layout,
            texture,
            uniforms,
            width,
            height,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Read the last drawn frame as tightly packed RGBA8 rows, top row first.
    pub async fn read_pixels(&self) -> Result<Vec<u8>, GpuError> {
        let unpadded_row = self.width * BYTES_PER_PIXEL;
        let padded_row = unpadded_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let staging = self.context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixel_staging"),
            size: u64::from(padded_row) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("pixel_readback_encoder"),
                });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            extent(self.width, self.height),
        );
        self.context.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures_channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        #[cfg(not(target_arch = "wasm32"))]
        self.context.device.poll(wgpu::Maintain::Wait);

        rx.await
            .map_err(|_| GpuError::Unavailable("Channel closed".into()))?
            .map_err(GpuError::BufferMap)?;

        let pixels = {
            let view = slice.get_mapped_range();
            view.chunks_exact(padded_row as usize)
                .flat_map(|row| &row[..unpadded_row as usize])
                .copied()
                .collect()
        };
        staging.unmap();

        Ok(pixels)
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn create_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("fractal_target"),
        size: extent(width.max(1), height.max(1)),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SURFACE_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

impl RenderSurface for OffscreenSurface {
    type Program = GpuProgram;

    fn set_surface_size(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("Resizing surface to {width}x{height}");
        self.texture = create_target(&self.context.device, width, height);
        self.width = width;
        self.height = height;
    }

    fn set_uniforms(&mut self, uniforms: &FrameUniforms) {
        let gpu = FrameUniformsGpu::from(uniforms);
        self.context
            .queue
            .write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&gpu));
    }

    fn draw_full_surface(&mut self, program: &GpuProgram) {
        let device = &self.context.device;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fractal_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: self.uniforms.as_entire_binding(),
            }],
        });

        let view = self
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("fractal_draw_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("fractal_draw_pass"),
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
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(Some(encoder.finish()));
    }
}
