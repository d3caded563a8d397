//! wgpu-backed shader compiler and render surface for fractalshader sessions.

mod buffers;
mod compiler;
mod device;
mod error;
mod surface;

pub use buffers::FrameUniformsGpu;
pub use compiler::{parse_stage, GlslCompiler, GpuProgram, SURFACE_FORMAT};
pub use device::{GpuAvailability, GpuContext};
pub use error::GpuError;
pub use surface::OffscreenSurface;
