/*!
# Lumen 3D Engine - Vulkan Backend

Vulkan implementation of the Lumen 3D frame loop.

This crate implements the `GraphicsDevice` and `PresentationChain` traits of
`lumen_3d_engine` using the Ash library for Vulkan bindings and
gpu-allocator for memory management, plus the flat-color
`SimpleRenderSystem` the demo draws with.

Validation layers are compiled in with the `vulkan-validation` feature and
enabled at runtime through `RendererConfig::enable_validation`.

# Example

```no_run
use lumen_3d_engine::lumen3d::RendererConfig;
use lumen_3d_engine_renderer_vulkan::VulkanGraphicsDevice;
# fn demo(window: &winit::window::Window) -> lumen_3d_engine::lumen3d::Result<()> {
let device = VulkanGraphicsDevice::new(window, &RendererConfig::default())?;
# Ok(())
# }
```
*/

// Vulkan implementation modules
mod vulkan_context;
mod vulkan_format;
mod vulkan_graphics_device;
mod vulkan_swapchain;
mod vulkan_render_pass;
mod vulkan_frame_buffer;
mod vulkan_texture;
mod vulkan_sync;
mod vulkan_buffer;
mod vulkan_shader;
mod vulkan_pipeline;
mod vulkan_model;
mod simple_render_system;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan_context::GpuContext;
pub use vulkan_graphics_device::VulkanGraphicsDevice;
pub use vulkan_swapchain::VulkanPresentationChain;
pub use vulkan_model::{Model, Vertex};
pub use simple_render_system::{SimpleRenderSystem, SimplePushConstantData};

// Re-export debug utilities
#[cfg(feature = "vulkan-validation")]
pub use debug::{get_validation_stats, print_validation_stats_report, ValidationStats};
