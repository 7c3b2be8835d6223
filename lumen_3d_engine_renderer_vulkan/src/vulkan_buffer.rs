/// Buffer - host-visible Vulkan buffer backed by gpu-allocator

use lumen_3d_engine::lumen3d::{Error, Result};
use lumen_3d_engine::{engine_err, engine_error};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// CPU-writable GPU buffer
pub struct Buffer {
    /// Shared GPU context (device, allocator)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation
    allocation: Option<Allocation>,
    /// Buffer size in bytes
    size: u64,
}

impl Buffer {
    /// Create a buffer and bind CPU-to-GPU memory to it
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared GPU context
    /// * `size` - Size in bytes, must be non-zero
    /// * `usage` - Vulkan usage flags
    /// * `name` - Allocation name shown by allocator diagnostics
    pub fn new(ctx: Arc<GpuContext>, size: u64, usage: vk::BufferUsageFlags, name: &str) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidResource(format!("Buffer '{}' has zero size", name)));
        }

        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = ctx.device.create_buffer(&buffer_create_info, None)
                .map_err(|e| engine_err!("lumen3d::vulkan", "Failed to create buffer of size {} bytes: {:?}", size, e))?;

            // Wrap immediately so Drop releases the buffer on any later failure
            let mut result = Self {
                ctx,
                buffer,
                allocation: None,
                size,
            };

            let requirements = result.ctx.device.get_buffer_memory_requirements(buffer);

            let allocation = {
                let mut allocator = result.ctx.allocator.lock().map_err(|_| {
                    engine_error!("lumen3d::vulkan", "GPU allocator mutex poisoned");
                    Error::BackendError("GPU allocator mutex poisoned".to_string())
                })?;
                allocator.allocate(&AllocationCreateDesc {
                    name,
                    requirements,
                    location: MemoryLocation::CpuToGpu,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| {
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!("lumen3d::vulkan", "Out of GPU memory for buffer '{}' (required: {:.2} MB)", name, size_mb);
                    Error::OutOfMemory
                })?
            };

            let (memory, offset) = (allocation.memory(), allocation.offset());
            result.allocation = Some(allocation);

            result.ctx.device.bind_buffer_memory(buffer, memory, offset)
                .map_err(|e| engine_err!("lumen3d::vulkan", "Failed to bind buffer memory: {:?}", e))?;

            Ok(result)
        }
    }

    /// Copy `data` into the buffer at `offset`
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > self.size) {
            engine_error!("lumen3d::vulkan",
                "Buffer write out of range: offset {} + {} bytes > size {}", offset, data.len(), self.size);
            return Err(Error::InvalidResource(format!(
                "Write of {} bytes at offset {} exceeds buffer size {}",
                data.len(), offset, self.size
            )));
        }

        let allocation = self.allocation.as_ref().ok_or_else(|| {
            engine_error!("lumen3d::vulkan", "Buffer write failed: no GPU allocation");
            Error::BackendError("Buffer has no allocation".to_string())
        })?;
        let mapped_ptr = allocation
            .mapped_ptr()
            .ok_or_else(|| Error::BackendError("Buffer is not CPU-accessible".to_string()))?
            .as_ptr() as *mut u8;

        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped_ptr.add(offset as usize), data.len());
        }
        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
