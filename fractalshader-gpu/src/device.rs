//! Device acquisition.
//!
//! A [`GlslCompiler`](crate::GlslCompiler) and every
//! [`OffscreenSurface`](crate::OffscreenSurface) drawing its programs must
//! share one device, so the context is handed out behind an [`Arc`].

use crate::error::GpuError;
use std::sync::Arc;

/// Device and queue shared by the compiler and its surfaces.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    adapter_name: String,
}

/// Outcome of [`GpuContext::try_acquire`].
pub enum GpuAvailability {
    Available(Arc<GpuContext>),
    /// Headless machines and CI runners without an adapter end up here.
    Unavailable(String),
}

impl GpuContext {
    /// Request a device, reporting failure as [`GpuAvailability::Unavailable`]
    /// so callers can fall back or skip.
    pub async fn try_acquire() -> GpuAvailability {
        match Self::request().await {
            Ok(context) => GpuAvailability::Available(context),
            Err(e) => {
                log::warn!("No device for fractal programs: {e}");
                GpuAvailability::Unavailable(e.to_string())
            }
        }
    }

    pub async fn request() -> Result<Arc<Self>, GpuError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("fractalshader"),
                    required_features: wgpu::Features::empty(),
                    // One fragment program and one uniform block fit the WebGL2 limits.
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;

        Ok(Arc::new(Self {
            device,
            queue,
            adapter_name: info.name,
        }))
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }
}
