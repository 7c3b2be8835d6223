/// Renderer configuration
///
/// Plain data consumed by the backend at device creation and by the
/// `FrameController` when it opens the presentation render pass.

use crate::graphics_device::{ClearValue, PresentMode, TextureFormat};

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Enable validation/debug layers (needs the backend's `vulkan-validation` feature)
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Present mode requested from the surface; Fifo is used when unavailable
    pub preferred_present_mode: PresentMode,
    /// Color format requested from the surface (sRGB non-linear color space)
    pub preferred_color_format: TextureFormat,
    /// RGBA clear color of the presentation render pass
    pub clear_color: [f32; 4],
    /// Depth clear value of the presentation render pass
    pub clear_depth: f32,
    /// Timeout for fence waits and image acquisition, in nanoseconds
    pub acquire_timeout_ns: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Lumen3D Application".to_string(),
            app_version: (1, 0, 0),
            preferred_present_mode: PresentMode::Mailbox,
            preferred_color_format: TextureFormat::B8G8R8A8_SRGB,
            clear_color: [0.01, 0.01, 0.01, 1.0],
            clear_depth: 1.0,
            acquire_timeout_ns: u64::MAX,
        }
    }
}

impl RendererConfig {
    pub fn with_validation(mut self, enable: bool) -> Self {
        self.enable_validation = enable;
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn with_app_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.app_version = (major, minor, patch);
        self
    }

    pub fn with_present_mode(mut self, mode: PresentMode) -> Self {
        self.preferred_present_mode = mode;
        self
    }

    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.preferred_color_format = format;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_clear_depth(mut self, depth: f32) -> Self {
        self.clear_depth = depth;
        self
    }

    pub fn with_acquire_timeout_ns(mut self, timeout_ns: u64) -> Self {
        self.acquire_timeout_ns = timeout_ns;
        self
    }

    /// Clear values for the color and depth attachments, in attachment order
    pub fn clear_values(&self) -> [ClearValue; 2] {
        [
            ClearValue::Color(self.clear_color),
            ClearValue::DepthStencil { depth: self.clear_depth, stencil: 0 },
        ]
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
