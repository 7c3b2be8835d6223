/// VulkanPresentationChain - Vulkan implementation of the PresentationChain trait
///
/// Swapchain images with their views, depth attachments and framebuffers,
/// the shared render pass, and one set of sync primitives per frame slot.

use lumen_3d_engine::lumen3d::{Error, Result, RendererConfig};
use lumen_3d_engine::lumen3d::render::{
    Extent2D, ImageAcquisition, ImagesInFlight, PresentMode, PresentationChain, SurfaceFormat,
    SurfaceStatus, MAX_FRAMES_IN_FLIGHT,
};
use lumen_3d_engine::{engine_debug, engine_error, engine_info};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_format::{
    choose_extent, choose_image_count, choose_present_mode, choose_surface_format,
    find_depth_format, format_to_vk, vk_to_format, vk_to_present_mode, DEPTH_FORMAT_CANDIDATES,
};
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_render_pass::RenderPass;
use crate::vulkan_sync::{FrameSync, RenderFinished};
use crate::vulkan_texture::DepthAttachment;

/// Vulkan presentation chain
///
/// Never resized in place. A successor is built from the same context with
/// this chain passed as `previous`, then this one is dropped.
pub struct VulkanPresentationChain {
    /// Swapchain
    swapchain_loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,

    /// One depth attachment and one framebuffer per image
    depth_attachments: Vec<DepthAttachment>,
    framebuffers: Vec<Framebuffer>,

    /// Render pass shared by every framebuffer
    render_pass: RenderPass,

    /// One per frame slot
    frame_sync: Vec<FrameSync>,
    /// One per image
    render_finished: Vec<RenderFinished>,
    /// Frame slot that last submitted into each image
    images_in_flight: ImagesInFlight,

    color_format: vk::Format,
    depth_format: vk::Format,
    format: SurfaceFormat,
    extent: vk::Extent2D,
    present_mode: vk::PresentModeKHR,
    acquire_timeout_ns: u64,

    /// Declared last: dropped after every handle above is destroyed
    ctx: Arc<GpuContext>,
}

impl VulkanPresentationChain {
    /// Create a presentation chain
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared GPU context (owns the surface)
    /// * `config` - Preferred color format, present mode and acquire timeout
    /// * `extent` - Requested extent, must not be zero
    /// * `previous` - Chain being replaced; its swapchain is passed as `old_swapchain`
    pub fn new(
        ctx: Arc<GpuContext>,
        config: &RendererConfig,
        extent: Extent2D,
        previous: Option<&VulkanPresentationChain>,
    ) -> Result<Self> {
        if extent.is_zero() {
            engine_error!("lumen3d::vulkan", "Cannot build a presentation chain for a {}x{} surface",
                extent.width, extent.height);
            return Err(Error::SurfaceUnsupported(format!(
                "zero extent {}x{}", extent.width, extent.height
            )));
        }

        unsafe {
            // Query surface support
            let capabilities = ctx
                .surface_loader
                .get_physical_device_surface_capabilities(ctx.physical_device, ctx.surface)
                .map_err(|e| vk_error("get surface capabilities", e))?;

            let surface_formats = ctx
                .surface_loader
                .get_physical_device_surface_formats(ctx.physical_device, ctx.surface)
                .map_err(|e| vk_error("get surface formats", e))?;

            let present_modes = ctx
                .surface_loader
                .get_physical_device_surface_present_modes(ctx.physical_device, ctx.surface)
                .map_err(|e| vk_error("get surface present modes", e))?;

            let surface_format = choose_surface_format(
                &surface_formats,
                format_to_vk(config.preferred_color_format),
            )
            .ok_or_else(|| {
                engine_error!("lumen3d::vulkan", "Surface reports no formats");
                Error::SurfaceUnsupported("surface reports no formats".to_string())
            })?;

            let present_mode = choose_present_mode(&present_modes, config.preferred_present_mode)
                .ok_or_else(|| {
                    engine_error!("lumen3d::vulkan", "Surface reports no present modes");
                    Error::SurfaceUnsupported("surface reports no present modes".to_string())
                })?;

            let depth_format = find_depth_format(&DEPTH_FORMAT_CANDIDATES, |format| {
                ctx.format_properties(format)
            })
            .ok_or_else(|| {
                engine_error!("lumen3d::vulkan", "No supported depth attachment format");
                Error::SurfaceUnsupported("no supported depth attachment format".to_string())
            })?;

            let format = match (vk_to_format(surface_format.format), vk_to_format(depth_format)) {
                (Some(color), Some(depth)) => SurfaceFormat::new(color, depth),
                _ => {
                    engine_error!("lumen3d::vulkan", "Surface only offers unsupported color formats (first: {:?})",
                        surface_format.format);
                    return Err(Error::SurfaceUnsupported(format!(
                        "unsupported color format {:?}", surface_format.format
                    )));
                }
            };

            let swapchain_extent = choose_extent(&capabilities, extent);
            if swapchain_extent.width == 0 || swapchain_extent.height == 0 {
                engine_error!("lumen3d::vulkan", "Surface extent collapsed to {}x{}",
                    swapchain_extent.width, swapchain_extent.height);
                return Err(Error::SurfaceUnsupported("zero surface extent".to_string()));
            }

            let render_pass = RenderPass::new(&ctx.device, surface_format.format, depth_format)?;

            // Create swapchain, reusing the previous one as a hint
            let (sharing_mode, queue_families) = ctx.image_sharing();
            let old_swapchain = previous
                .map(|chain| chain.swapchain)
                .unwrap_or_else(vk::SwapchainKHR::null);

            let swapchain_create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(ctx.surface)
                .min_image_count(choose_image_count(&capabilities))
                .image_format(surface_format.format)
                .image_color_space(surface_format.color_space)
                .image_extent(swapchain_extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .image_sharing_mode(sharing_mode)
                .queue_family_indices(&queue_families)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);

            let swapchain_loader = ash::khr::swapchain::Device::new(&ctx.instance, &ctx.device);
            let swapchain = swapchain_loader
                .create_swapchain(&swapchain_create_info, None)
                .map_err(|e| {
                    engine_error!("lumen3d::vulkan", "Failed to create swapchain: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
                })?;

            // From here on, Drop releases whatever has been created
            let mut chain = Self {
                swapchain_loader,
                swapchain,
                images: Vec::new(),
                image_views: Vec::new(),
                depth_attachments: Vec::new(),
                framebuffers: Vec::new(),
                render_pass,
                frame_sync: Vec::with_capacity(MAX_FRAMES_IN_FLIGHT),
                render_finished: Vec::new(),
                images_in_flight: ImagesInFlight::new(0),
                color_format: surface_format.format,
                depth_format,
                format,
                extent: swapchain_extent,
                present_mode,
                acquire_timeout_ns: config.acquire_timeout_ns,
                ctx,
            };

            chain.images = chain
                .swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| {
                    engine_error!("lumen3d::vulkan", "Failed to get swapchain images: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
                })?;

            chain.create_image_resources()?;

            for _ in 0..MAX_FRAMES_IN_FLIGHT {
                chain.frame_sync.push(FrameSync::new(&chain.ctx.device)?);
            }
            chain.images_in_flight = ImagesInFlight::new(chain.images.len());

            engine_info!("lumen3d::vulkan",
                "Presentation chain created: {}x{}, {} images, color {:?}, depth {:?}, present mode {:?}",
                chain.extent.width, chain.extent.height, chain.images.len(),
                chain.color_format, chain.depth_format, chain.present_mode());

            Ok(chain)
        }
    }

    /// Views, depth attachments, framebuffers and render-finished semaphores
    /// for every swapchain image
    fn create_image_resources(&mut self) -> Result<()> {
        let device = &self.ctx.device;

        for &image in &self.images {
            let create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.color_format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = unsafe {
                device.create_image_view(&create_info, None).map_err(|e| {
                    engine_error!("lumen3d::vulkan", "Failed to create swapchain image view: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create image view: {:?}", e))
                })?
            };
            self.image_views.push(view);

            let depth = DepthAttachment::new(Arc::clone(&self.ctx), self.depth_format, self.extent)?;
            let framebuffer = Framebuffer::new(
                device,
                self.render_pass.render_pass,
                view,
                depth.view,
                self.extent,
            )?;
            self.depth_attachments.push(depth);
            self.framebuffers.push(framebuffer);

            self.render_finished.push(RenderFinished::new(device)?);
        }

        Ok(())
    }

    /// Framebuffer of a presentable image
    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize].framebuffer
    }

    /// Extent as a Vulkan struct
    pub fn vk_extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Present mode in use; only modes `choose_present_mode` can pick are created
    pub fn present_mode(&self) -> PresentMode {
        vk_to_present_mode(self.present_mode).unwrap_or(PresentMode::Fifo)
    }
}

impl PresentationChain for VulkanPresentationChain {
    type CommandBuffer = vk::CommandBuffer;
    type RenderPass = vk::RenderPass;

    fn acquire_next_image(&mut self, frame_index: usize) -> Result<ImageAcquisition> {
        let sync = &self.frame_sync[frame_index];

        unsafe {
            self.ctx
                .device
                .wait_for_fences(&[sync.in_flight], true, self.acquire_timeout_ns)
                .map_err(|e| vk_error("wait for in-flight fence", e))?;

            match self.swapchain_loader.acquire_next_image(
                self.swapchain,
                self.acquire_timeout_ns,
                sync.image_available,
                vk::Fence::null(),
            ) {
                Ok((image_index, false)) => Ok(ImageAcquisition::Ready(image_index)),
                Ok((image_index, true)) => Ok(ImageAcquisition::Suboptimal(image_index)),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    engine_debug!("lumen3d::vulkan", "Swapchain out of date during acquire");
                    Ok(ImageAcquisition::OutOfDate)
                }
                Err(e) => Err(vk_error("acquire next swapchain image", e)),
            }
        }
    }

    fn submit(
        &mut self,
        command_buffer: vk::CommandBuffer,
        image_index: u32,
        frame_index: usize,
    ) -> Result<SurfaceStatus> {
        let device = &self.ctx.device;

        unsafe {
            // An earlier slot may still be rendering into this image
            if let Some(owner) = self.images_in_flight.owner(image_index) {
                device
                    .wait_for_fences(&[self.frame_sync[owner].in_flight], true, self.acquire_timeout_ns)
                    .map_err(|e| vk_error("wait for image fence", e))?;
            }
            self.images_in_flight.claim(image_index, frame_index);

            let sync = &self.frame_sync[frame_index];
            let render_finished = self.render_finished[image_index as usize].semaphore;

            device
                .reset_fences(&[sync.in_flight])
                .map_err(|e| vk_error("reset in-flight fence", e))?;

            let wait_semaphores = [sync.image_available];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let command_buffers = [command_buffer];
            let signal_semaphores = [render_finished];

            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            device
                .queue_submit(self.ctx.graphics_queue, &[submit_info], sync.in_flight)
                .map_err(|e| vk_error("submit draw command buffer", e))?;

            // Present
            let swapchains = [self.swapchain];
            let image_indices = [image_index];
            let present_info = vk::PresentInfoKHR::default()
                .wait_semaphores(&signal_semaphores)
                .swapchains(&swapchains)
                .image_indices(&image_indices);

            match self
                .swapchain_loader
                .queue_present(self.ctx.present_queue, &present_info)
            {
                Ok(false) => Ok(SurfaceStatus::Optimal),
                Ok(true) => Ok(SurfaceStatus::Suboptimal),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    engine_debug!("lumen3d::vulkan", "Swapchain out of date during present");
                    Ok(SurfaceStatus::OutOfDate)
                }
                Err(e) => Err(vk_error("present swapchain image", e)),
            }
        }
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }

    fn extent(&self) -> Extent2D {
        Extent2D::new(self.extent.width, self.extent.height)
    }

    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn frames_in_flight(&self) -> usize {
        self.frame_sync.len()
    }

    fn render_pass(&self) -> vk::RenderPass {
        self.render_pass.render_pass
    }
}

impl Drop for VulkanPresentationChain {
    fn drop(&mut self) {
        unsafe {
            // Wait for device to finish
            self.ctx.device.device_wait_idle().ok();

            // Framebuffers and depth attachments reference the views
            self.framebuffers.clear();
            self.depth_attachments.clear();

            // Destroy image views
            for image_view in self.image_views.drain(..) {
                self.ctx.device.destroy_image_view(image_view, None);
            }

            // Destroy swapchain (images are owned by it)
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
        engine_debug!("lumen3d::vulkan", "Presentation chain {}x{} destroyed",
            self.extent.width, self.extent.height);
    }
}
