/// Synchronization primitives of the presentation chain

use lumen_3d_engine::lumen3d::{Error, Result};
use lumen_3d_engine::engine_error;
use ash::vk;

/// Image-available semaphore and in-flight fence of one frame slot
///
/// The fence is created signaled so the first wait on a fresh slot returns
/// immediately. Destroyed when dropped.
pub struct FrameSync {
    pub(crate) image_available: vk::Semaphore,
    pub(crate) in_flight: vk::Fence,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl FrameSync {
    pub fn new(device: &ash::Device) -> Result<Self> {
        let mut sync = Self {
            image_available: vk::Semaphore::null(),
            in_flight: vk::Fence::null(),
            device: device.clone(),
        };

        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

        sync.image_available = create_semaphore(device, "image-available")?;
        sync.in_flight = unsafe {
            device.create_fence(&fence_info, None).map_err(|e| {
                engine_error!("lumen3d::vulkan", "Failed to create in-flight fence: {:?}", e);
                Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
            })?
        };

        Ok(sync)
    }
}

impl Drop for FrameSync {
    fn drop(&mut self) {
        unsafe {
            // Destroying a null handle is a no-op
            self.device.destroy_fence(self.in_flight, None);
            self.device.destroy_semaphore(self.image_available, None);
        }
    }
}

/// Render-finished semaphore of one presentable image
///
/// Indexed by image rather than by frame slot: the presentation engine may
/// still hold the semaphore of an image when the slot comes around again.
pub struct RenderFinished {
    pub(crate) semaphore: vk::Semaphore,
    device: ash::Device,
}

impl RenderFinished {
    pub fn new(device: &ash::Device) -> Result<Self> {
        Ok(Self {
            semaphore: create_semaphore(device, "render-finished")?,
            device: device.clone(),
        })
    }
}

impl Drop for RenderFinished {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

fn create_semaphore(device: &ash::Device, label: &str) -> Result<vk::Semaphore> {
    let info = vk::SemaphoreCreateInfo::default();
    unsafe {
        device.create_semaphore(&info, None).map_err(|e| {
            engine_error!("lumen3d::vulkan", "Failed to create {} semaphore: {:?}", label, e);
            Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
        })
    }
}
