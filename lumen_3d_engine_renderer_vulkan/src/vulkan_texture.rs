/// DepthAttachment - device-local depth image paired with one presentable image

use lumen_3d_engine::lumen3d::{Error, Result};
use lumen_3d_engine::engine_error;
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::depth_aspect;

/// Depth image, its memory and its view
pub struct DepthAttachment {
    /// Shared GPU context (device, allocator)
    ctx: Arc<GpuContext>,
    /// Vulkan image
    pub(crate) image: vk::Image,
    /// Vulkan image view
    pub(crate) view: vk::ImageView,
    /// GPU memory allocation
    allocation: Option<Allocation>,
}

impl DepthAttachment {
    /// Create a depth attachment
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared GPU context
    /// * `format` - Depth format (see `find_depth_format`)
    /// * `extent` - Attachment size, equal to the chain extent
    pub fn new(ctx: Arc<GpuContext>, format: vk::Format, extent: vk::Extent2D) -> Result<Self> {
        unsafe {
            let image_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D {
                    width: extent.width,
                    height: extent.height,
                    depth: 1,
                })
                .mip_levels(1)
                .array_layers(1)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = ctx.device.create_image(&image_info, None).map_err(|e| {
                engine_error!("lumen3d::vulkan", "Failed to create depth image: {:?}", e);
                Error::InitializationFailed(format!("Failed to create depth image: {:?}", e))
            })?;

            let requirements = ctx.device.get_image_memory_requirements(image);

            let allocation = {
                let mut allocator = match ctx.allocator.lock() {
                    Ok(allocator) => allocator,
                    Err(_) => {
                        ctx.device.destroy_image(image, None);
                        engine_error!("lumen3d::vulkan", "GPU allocator mutex poisoned");
                        return Err(Error::BackendError("GPU allocator mutex poisoned".to_string()));
                    }
                };
                allocator.allocate(&AllocationCreateDesc {
                    name: "depth attachment",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
            };
            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(_) => {
                    ctx.device.destroy_image(image, None);
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!("lumen3d::vulkan", "Out of GPU memory for depth attachment (required: {:.2} MB)", size_mb);
                    return Err(Error::OutOfMemory);
                }
            };

            // From here on, Drop releases whatever has been created
            let mut attachment = Self {
                ctx,
                image,
                view: vk::ImageView::null(),
                allocation: Some(allocation),
            };

            if let Some(allocation) = &attachment.allocation {
                attachment
                    .ctx
                    .device
                    .bind_image_memory(image, allocation.memory(), allocation.offset())
                    .map_err(|e| {
                        engine_error!("lumen3d::vulkan", "Failed to bind depth image memory: {:?}", e);
                        Error::InitializationFailed(format!("Failed to bind depth image memory: {:?}", e))
                    })?;
            }

            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: depth_aspect(format),
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            attachment.view = attachment
                .ctx
                .device
                .create_image_view(&view_info, None)
                .map_err(|e| {
                    engine_error!("lumen3d::vulkan", "Failed to create depth image view: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create depth image view: {:?}", e))
                })?;

            Ok(attachment)
        }
    }
}

impl Drop for DepthAttachment {
    fn drop(&mut self) {
        unsafe {
            // Destroy image view
            if self.view != vk::ImageView::null() {
                self.ctx.device.destroy_image_view(self.view, None);
            }

            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the image
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            // Destroy image
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}
