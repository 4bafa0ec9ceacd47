//! GPU context bring-up.
//!
//! [`GpuContext`] holds the device and queue. The renderer is headless:
//! there is no surface here, frames end in an offscreen texture that the
//! application shell presents (or reads back) however it likes.

use crate::errors::{GloamError, Result};
use crate::renderer::settings::ContextSettings;

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    wireframe_supported: bool,
}

impl GpuContext {
    /// Acquires an adapter and device per `settings`.
    ///
    /// `POLYGON_MODE_LINE` is negotiated rather than required: adapters
    /// without it still initialize, with the wireframe toggle reported as
    /// unsupported.
    ///
    /// # Errors
    ///
    /// [`GloamError::AdapterRequestFailed`] when no adapter matches, and
    /// [`GloamError::DeviceCreateFailed`] when the device request is denied.
    pub async fn new(settings: &ContextSettings) -> Result<Self> {
        let instance = match settings.backends {
            Some(backends) => wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends,
                ..wgpu::InstanceDescriptor::new_without_display_handle()
            }),
            None => wgpu::Instance::default(),
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GloamError::AdapterRequestFailed(e.to_string()))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "using adapter {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let supported = adapter.features();
        let requested = settings.required_features;
        let features = requested & supported;
        let wireframe_supported = features.contains(wgpu::Features::POLYGON_MODE_LINE);
        if requested != features {
            log::warn!(
                "adapter is missing requested features: {:?}",
                requested - supported
            );
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("gloam device"),
                required_features: features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        Ok(Self {
            device,
            queue,
            adapter_info,
            wireframe_supported,
        })
    }

    /// Blocking wrapper around [`GpuContext::new`] for non-async callers.
    ///
    /// # Errors
    ///
    /// Same as [`GpuContext::new`].
    pub fn new_blocking(settings: &ContextSettings) -> Result<Self> {
        pollster::block_on(Self::new(settings))
    }

    #[inline]
    #[must_use]
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Whether line polygon mode was granted at device creation.
    #[inline]
    #[must_use]
    pub fn wireframe_supported(&self) -> bool {
        self.wireframe_supported
    }
}
