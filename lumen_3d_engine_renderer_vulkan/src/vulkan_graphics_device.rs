/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait

use lumen_3d_engine::lumen3d::{Error, Result, RendererConfig};
use lumen_3d_engine::lumen3d::render::{
    ClearValue, Extent2D, GraphicsDevice, PresentationChain, Rect2D, Viewport,
};
use lumen_3d_engine::{engine_debug, engine_error, engine_info, engine_warn};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CString;
use std::sync::{Arc, MutexGuard};

use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_swapchain::VulkanPresentationChain;

/// Queue family indices of a physical device that can render to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
}

/// Vulkan device implementation
///
/// Brings up instance, surface, device, allocator and command pool for one
/// window, then builds presentation chains on demand. All Vulkan objects live
/// in the shared `GpuContext`; this type adds the chain preferences.
pub struct VulkanGraphicsDevice {
    /// Shared GPU context
    ctx: Arc<GpuContext>,
    /// Chain preferences (present mode, color format, acquire timeout)
    config: RendererConfig,
}

impl VulkanGraphicsDevice {
    /// Create a new Vulkan device for `window`
    ///
    /// # Arguments
    ///
    /// * `window` - Window for surface creation
    /// * `config` - Renderer configuration
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: &RendererConfig,
    ) -> Result<Self> {
        unsafe {
            // Create Vulkan Entry
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!("lumen3d::vulkan", "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            // Application Info
            let app_name = CString::new(config.app_name.as_str()).map_err(|e| {
                engine_error!("lumen3d::vulkan", "Invalid application name {:?}: {}", config.app_name, e);
                Error::InitializationFailed(format!("Invalid application name: {}", e))
            })?;
            let (major, minor, patch) = config.app_version;

            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, major, minor, patch))
                .engine_name(c"Lumen3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_2);

            // Get required extensions
            let display_handle = window.display_handle().map_err(|e| {
                engine_error!("lumen3d::vulkan", "Failed to get display handle: {}", e);
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
                .map_err(|e| {
                    engine_error!("lumen3d::vulkan", "Failed to get required extensions: {}", e);
                    Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                })?
                .to_vec();

            let validation = Self::validation_enabled(config);

            // Add debug utils extension and layer if validation is enabled
            if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }
            let layer_names = if validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                engine_error!("lumen3d::vulkan", "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            // Setup debug messenger if validation is enabled
            let (debug_utils_loader, debug_messenger) = if validation {
                match Self::create_debug_messenger(&entry, &instance) {
                    Ok(pair) => pair,
                    Err(e) => {
                        instance.destroy_instance(None);
                        return Err(e);
                    }
                }
            } else {
                (None, None)
            };

            // Until GpuContext exists, failures tear down what was created so far
            let destroy_instance = |instance: &ash::Instance| {
                if let (Some(debug_utils), Some(messenger)) = (&debug_utils_loader, &debug_messenger) {
                    debug_utils.destroy_debug_utils_messenger(*messenger, None);
                }
                instance.destroy_instance(None);
            };

            // Create Surface
            let window_handle = match window.window_handle() {
                Ok(handle) => handle,
                Err(e) => {
                    destroy_instance(&instance);
                    engine_error!("lumen3d::vulkan", "Failed to get window handle: {}", e);
                    return Err(Error::InitializationFailed(format!("Failed to get window handle: {}", e)));
                }
            };
            let surface = match ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            ) {
                Ok(surface) => surface,
                Err(e) => {
                    destroy_instance(&instance);
                    engine_error!("lumen3d::vulkan", "Failed to create surface: {:?}", e);
                    return Err(Error::InitializationFailed(format!("Failed to create surface: {:?}", e)));
                }
            };
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let (physical_device, families, device, allocator, command_pool) =
                match Self::bring_up_device(&instance, &surface_loader, surface) {
                    Ok(parts) => parts,
                    Err(e) => {
                        surface_loader.destroy_surface(surface, None);
                        destroy_instance(&instance);
                        return Err(e);
                    }
                };

            let graphics_queue = device.get_device_queue(families.graphics, 0);
            let present_queue = device.get_device_queue(families.present, 0);

            // Create shared GPU context, which owns destruction from now on
            let ctx = Arc::new(GpuContext::new(
                entry,
                instance,
                surface,
                surface_loader,
                physical_device,
                device,
                allocator,
                (graphics_queue, families.graphics, present_queue, families.present),
                command_pool,
                debug_utils_loader,
                debug_messenger,
            ));

            Ok(Self {
                ctx,
                config: config.clone(),
            })
        }
    }

    /// Validation is compiled in only with the `vulkan-validation` feature
    fn validation_enabled(config: &RendererConfig) -> bool {
        if config.enable_validation && !cfg!(feature = "vulkan-validation") {
            engine_warn!("lumen3d::vulkan",
                "Validation requested but the backend was built without the vulkan-validation feature");
        }
        config.enable_validation && cfg!(feature = "vulkan-validation")
    }

    #[cfg(feature = "vulkan-validation")]
    fn create_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
    ) -> Result<(Option<ash::ext::debug_utils::Instance>, Option<vk::DebugUtilsMessengerEXT>)> {
        unsafe {
            let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);

            crate::debug::init_debug_config();

            let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
                .message_severity(
                    vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                        | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
                )
                .message_type(
                    vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                )
                .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

            let messenger = debug_utils
                .create_debug_utils_messenger(&debug_info, None)
                .map_err(|e| {
                    crate::debug::cleanup_debug_config();
                    engine_error!("lumen3d::vulkan", "Failed to create debug messenger: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
                })?;

            Ok((Some(debug_utils), Some(messenger)))
        }
    }

    #[cfg(not(feature = "vulkan-validation"))]
    fn create_debug_messenger(
        _entry: &ash::Entry,
        _instance: &ash::Instance,
    ) -> Result<(Option<ash::ext::debug_utils::Instance>, Option<vk::DebugUtilsMessengerEXT>)> {
        Ok((None, None))
    }

    /// Pick a physical device, create the logical device, allocator and command pool
    #[allow(clippy::type_complexity)]
    fn bring_up_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<(vk::PhysicalDevice, QueueFamilies, ash::Device, Allocator, vk::CommandPool)> {
        unsafe {
            // Pick Physical Device
            let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
                engine_error!("lumen3d::vulkan", "Failed to enumerate physical devices: {:?}", e);
                Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
            })?;

            let (physical_device, families) = physical_devices
                .into_iter()
                .find_map(|physical_device| {
                    Self::rate_physical_device(instance, surface_loader, surface, physical_device)
                        .map(|families| (physical_device, families))
                })
                .ok_or_else(|| {
                    engine_error!("lumen3d::vulkan", "No Vulkan-capable GPU can present to this surface");
                    Error::InitializationFailed("No suitable GPU found".to_string())
                })?;

            let properties = instance.get_physical_device_properties(physical_device);
            let device_name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "<unnamed>".to_string());
            engine_info!("lumen3d::vulkan", "Using GPU: {} ({:?})", device_name, properties.device_type);

            // Create Logical Device
            let queue_priorities = [1.0];
            let mut queue_create_infos = vec![vk::DeviceQueueCreateInfo::default()
                .queue_family_index(families.graphics)
                .queue_priorities(&queue_priorities)];
            if families.present != families.graphics {
                queue_create_infos.push(
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(families.present)
                        .queue_priorities(&queue_priorities),
                );
            }

            let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
            let device_features = vk::PhysicalDeviceFeatures::default();

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .enabled_features(&device_features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    engine_error!("lumen3d::vulkan", "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            // Create GPU allocator
            let allocator = match Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            }) {
                Ok(allocator) => allocator,
                Err(e) => {
                    device.destroy_device(None);
                    engine_error!("lumen3d::vulkan", "Failed to create GPU allocator: {:?}", e);
                    return Err(Error::InitializationFailed(format!("Failed to create allocator: {:?}", e)));
                }
            };

            // Create command pool (RESET so each frame slot's buffer can be re-begun)
            let pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(families.graphics)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = match device.create_command_pool(&pool_create_info, None) {
                Ok(pool) => pool,
                Err(e) => {
                    drop(allocator);
                    device.destroy_device(None);
                    engine_error!("lumen3d::vulkan", "Failed to create command pool: {:?}", e);
                    return Err(Error::InitializationFailed(format!("Failed to create command pool: {:?}", e)));
                }
            };

            Ok((physical_device, families, device, allocator, command_pool))
        }
    }

    /// Queue families of `physical_device` if it can render and present to
    /// `surface` through a swapchain
    fn rate_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        physical_device: vk::PhysicalDevice,
    ) -> Option<QueueFamilies> {
        unsafe {
            let has_swapchain = instance
                .enumerate_device_extension_properties(physical_device)
                .map(|extensions| {
                    extensions.iter().any(|ext| {
                        ext.extension_name_as_c_str()
                            .map(|name| name == ash::khr::swapchain::NAME)
                            .unwrap_or(false)
                    })
                })
                .unwrap_or(false);
            if !has_swapchain {
                return None;
            }

            let has_formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map(|formats| !formats.is_empty())
                .unwrap_or(false);
            let has_present_modes = surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .map(|modes| !modes.is_empty())
                .unwrap_or(false);
            if !has_formats || !has_present_modes {
                return None;
            }

            let queue_families = instance.get_physical_device_queue_family_properties(physical_device);
            let graphics = queue_families
                .iter()
                .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))? as u32;
            let present = (0..queue_families.len() as u32).find(|&i| {
                surface_loader
                    .get_physical_device_surface_support(physical_device, i, surface)
                    .unwrap_or(false)
            })?;

            Some(QueueFamilies { graphics, present })
        }
    }

    /// Shared GPU context
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    /// Vulkan logical device
    pub fn device(&self) -> &ash::Device {
        &self.ctx.device
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    fn command_pool(&self) -> Result<MutexGuard<'_, vk::CommandPool>> {
        self.ctx.command_pool.lock().map_err(|_| {
            engine_error!("lumen3d::vulkan", "Command pool mutex poisoned");
            Error::BackendError("Command pool mutex poisoned".to_string())
        })
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    type CommandBuffer = vk::CommandBuffer;
    type Chain = VulkanPresentationChain;

    fn create_presentation_chain(
        &self,
        extent: Extent2D,
        previous: Option<&VulkanPresentationChain>,
    ) -> Result<VulkanPresentationChain> {
        VulkanPresentationChain::new(Arc::clone(&self.ctx), &self.config, extent, previous)
    }

    fn allocate_command_buffers(&self, count: usize) -> Result<Vec<vk::CommandBuffer>> {
        let pool = self.command_pool()?;
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(*pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count as u32);

        let command_buffers = unsafe {
            self.ctx
                .device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| vk_error("allocate command buffers", e))?
        };
        engine_debug!("lumen3d::vulkan", "Allocated {} command buffers", command_buffers.len());
        Ok(command_buffers)
    }

    fn free_command_buffers(&self, command_buffers: &[vk::CommandBuffer]) {
        if command_buffers.is_empty() {
            return;
        }
        // A poisoned pool lock still guards a valid handle
        let pool = match self.ctx.command_pool.lock() {
            Ok(pool) => pool,
            Err(poisoned) => poisoned.into_inner(),
        };
        unsafe {
            self.ctx.device.free_command_buffers(*pool, command_buffers);
        }
    }

    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer) -> Result<()> {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe {
            self.ctx
                .device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| vk_error("begin recording command buffer", e))
        }
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .end_command_buffer(command_buffer)
                .map_err(|e| vk_error("record command buffer", e))
        }
    }

    fn cmd_begin_render_pass(
        &self,
        command_buffer: vk::CommandBuffer,
        chain: &VulkanPresentationChain,
        image_index: u32,
        clear_values: &[ClearValue],
    ) {
        // Convert clear values
        let vk_clear_values: Vec<vk::ClearValue> = clear_values
            .iter()
            .map(|cv| match cv {
                ClearValue::Color(color) => vk::ClearValue {
                    color: vk::ClearColorValue { float32: *color },
                },
                ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
                    depth_stencil: vk::ClearDepthStencilValue {
                        depth: *depth,
                        stencil: *stencil,
                    },
                },
            })
            .collect();

        let render_pass_info = vk::RenderPassBeginInfo::default()
            .render_pass(chain.render_pass())
            .framebuffer(chain.framebuffer(image_index))
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: chain.vk_extent(),
            })
            .clear_values(&vk_clear_values);

        unsafe {
            self.ctx.device.cmd_begin_render_pass(
                command_buffer,
                &render_pass_info,
                vk::SubpassContents::INLINE,
            );
        }
    }

    fn cmd_set_viewport(&self, command_buffer: vk::CommandBuffer, viewport: &Viewport) {
        let vk_viewport = vk::Viewport::default()
            .x(viewport.x)
            .y(viewport.y)
            .width(viewport.width)
            .height(viewport.height)
            .min_depth(viewport.min_depth)
            .max_depth(viewport.max_depth);

        unsafe {
            self.ctx.device.cmd_set_viewport(command_buffer, 0, &[vk_viewport]);
        }
    }

    fn cmd_set_scissor(&self, command_buffer: vk::CommandBuffer, scissor: &Rect2D) {
        let vk_scissor = vk::Rect2D::default()
            .offset(vk::Offset2D { x: scissor.x, y: scissor.y })
            .extent(vk::Extent2D { width: scissor.width, height: scissor.height });

        unsafe {
            self.ctx.device.cmd_set_scissor(command_buffer, 0, &[vk_scissor]);
        }
    }

    fn cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer) {
        unsafe {
            self.ctx.device.cmd_end_render_pass(command_buffer);
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .device_wait_idle()
                .map_err(|e| vk_error("wait for device idle", e))
        }
    }
}
