/// Framebuffer - one presentable image view plus its depth view
///
/// Bound to the chain's render pass. Created with the chain, destroyed
/// before the image views it references.

use lumen_3d_engine::lumen3d::{Error, Result};
use lumen_3d_engine::engine_error;
use ash::vk;

/// Vulkan framebuffer
///
/// Wraps a VkFramebuffer. Destroyed when dropped.
pub struct Framebuffer {
    /// Vulkan framebuffer handle
    pub(crate) framebuffer: vk::Framebuffer,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl Framebuffer {
    /// # Arguments
    ///
    /// * `device` - Vulkan logical device
    /// * `render_pass` - Render pass the attachments are used with
    /// * `color_view` - Presentable image view (attachment 0)
    /// * `depth_view` - Depth attachment view (attachment 1)
    /// * `extent` - Size of both attachments
    pub(crate) fn new(
        device: &ash::Device,
        render_pass: vk::RenderPass,
        color_view: vk::ImageView,
        depth_view: vk::ImageView,
        extent: vk::Extent2D,
    ) -> Result<Self> {
        let attachments = [color_view, depth_view];
        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = unsafe {
            device.create_framebuffer(&create_info, None).map_err(|e| {
                engine_error!("lumen3d::vulkan", "Failed to create framebuffer: {:?}", e);
                Error::InitializationFailed(format!("Failed to create framebuffer: {:?}", e))
            })?
        };

        Ok(Self {
            framebuffer,
            device: device.clone(),
        })
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}
