/// GpuContext - Shared GPU resources for all Vulkan objects
///
/// Contains everything the device, the presentation chains and the
/// resources built on top of them need:
/// - Instance and surface (for chain creation)
/// - Physical and logical device
/// - Allocator for memory management
/// - Graphics and present queues
/// - Command pool the frame loop allocates its command buffers from

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use lumen_3d_engine::lumen3d::Error;
use lumen_3d_engine::{engine_debug, engine_error};
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

/// Shared GPU context for all Vulkan resources.
///
/// Shared (via `Arc`) by the graphics device, every presentation chain, and
/// every buffer, pipeline and attachment. It is therefore the last Vulkan
/// object alive and owns instance, surface and device destruction.
pub struct GpuContext {
    /// Vulkan entry (keeps the loader library loaded)
    _entry: ash::Entry,

    /// Vulkan instance
    pub instance: ash::Instance,

    /// Window surface and its loader
    pub surface: vk::SurfaceKHR,
    pub surface_loader: ash::khr::surface::Instance,

    /// Physical device the logical device was created on
    pub physical_device: vk::PhysicalDevice,

    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator (shared, requires mutex for thread safety)
    /// Wrapped in ManuallyDrop to ensure it's dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Arc<Mutex<Allocator>>>,

    /// Graphics queue for command submission
    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,

    /// Present queue (may be the same as graphics)
    pub present_queue: vk::Queue,
    pub present_queue_family: u32,

    /// Pool for the frame loop's primary command buffers
    /// (created with RESET_COMMAND_BUFFER so each buffer can be re-begun)
    pub command_pool: Mutex<vk::CommandPool>,

    /// Debug utils loader (for validation layers)
    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,

    /// Debug messenger handle
    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl GpuContext {
    /// Create a new GPU context
    ///
    /// # Arguments
    ///
    /// * `entry` - Loaded Vulkan entry
    /// * `instance` - Vulkan instance
    /// * `surface` - Window surface
    /// * `surface_loader` - Surface extension loader
    /// * `physical_device` - Selected physical device
    /// * `device` - Vulkan logical device
    /// * `allocator` - GPU memory allocator
    /// * `queues` - (graphics queue, graphics family, present queue, present family)
    /// * `command_pool` - Command pool for the frame loop
    /// * `debug_utils_loader` - Debug utils loader (if validation enabled)
    /// * `debug_messenger` - Debug messenger handle (if validation enabled)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entry: ash::Entry,
        instance: ash::Instance,
        surface: vk::SurfaceKHR,
        surface_loader: ash::khr::surface::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        allocator: Allocator,
        queues: (vk::Queue, u32, vk::Queue, u32),
        command_pool: vk::CommandPool,
        debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
        debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    ) -> Self {
        let (graphics_queue, graphics_queue_family, present_queue, present_queue_family) = queues;
        Self {
            _entry: entry,
            instance,
            surface,
            surface_loader,
            physical_device,
            device,
            allocator: ManuallyDrop::new(Arc::new(Mutex::new(allocator))),
            graphics_queue,
            graphics_queue_family,
            present_queue,
            present_queue_family,
            command_pool: Mutex::new(command_pool),
            debug_utils_loader,
            debug_messenger,
        }
    }

    /// Query the format properties of `format` on the physical device
    pub fn format_properties(&self, format: vk::Format) -> vk::FormatProperties {
        unsafe {
            self.instance
                .get_physical_device_format_properties(self.physical_device, format)
        }
    }

    /// Sharing mode and queue family list for images shared by both queues
    pub fn image_sharing(&self) -> (vk::SharingMode, Vec<u32>) {
        if self.graphics_queue_family == self.present_queue_family {
            (vk::SharingMode::EXCLUSIVE, Vec::new())
        } else {
            (
                vk::SharingMode::CONCURRENT,
                vec![self.graphics_queue_family, self.present_queue_family],
            )
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            // Wait for device to finish
            self.device.device_wait_idle().ok();

            // 1. Destroy the command pool (frees any remaining command buffers)
            if let Ok(pool) = self.command_pool.get_mut() {
                if *pool != vk::CommandPool::null() {
                    self.device.destroy_command_pool(*pool, None);
                    *pool = vk::CommandPool::null();
                }
            }

            // 2. Drop allocator: free VkDeviceMemory pages BEFORE destroying device.
            ManuallyDrop::drop(&mut self.allocator);

            // 3. Destroy device, then surface
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);

            // 4. Stop routing validation messages, then destroy the messenger
            #[cfg(feature = "vulkan-validation")]
            crate::debug::cleanup_debug_config();

            if let (Some(debug_utils), Some(messenger)) =
                (&self.debug_utils_loader, &self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }

            // 5. Destroy instance
            self.instance.destroy_instance(None);
        }
        engine_debug!("lumen3d::vulkan", "GPU context destroyed");
    }
}

/// Log a failed Vulkan call and convert it to an engine error
///
/// Device loss and memory exhaustion keep their own variants; everything
/// else becomes a `BackendError`.
pub(crate) fn vk_error(operation: &str, result: vk::Result) -> Error {
    engine_error!("lumen3d::vulkan", "Failed to {}: {:?}", operation, result);
    match result {
        vk::Result::ERROR_DEVICE_LOST => Error::DeviceLost(format!("{}: {:?}", operation, result)),
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            Error::OutOfMemory
        }
        _ => Error::BackendError(format!("Failed to {}: {:?}", operation, result)),
    }
}
