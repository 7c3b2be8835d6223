/// Shader - SPIR-V shader module owned for the lifetime of a pipeline build

use lumen_3d_engine::lumen3d::{Error, Result};
use lumen_3d_engine::{engine_err, engine_error};
use ash::vk;
use std::io::Cursor;

/// SPIR-V of the flat-color shader, compiled from WGSL by build.rs
pub const SIMPLE_SHADER_SPV: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/simple_shader.spv"));

/// Vulkan shader module
pub struct Shader {
    pub(crate) module: vk::ShaderModule,
    device: ash::Device,
}

impl Shader {
    /// Create a shader module from SPIR-V bytes
    ///
    /// # Arguments
    ///
    /// * `device` - Vulkan logical device
    /// * `code` - SPIR-V binary, length must be a multiple of 4
    pub fn new(device: &ash::Device, code: &[u8]) -> Result<Self> {
        // read_spv also handles unaligned input
        let words = ash::util::read_spv(&mut Cursor::new(code)).map_err(|e| {
            engine_error!("lumen3d::vulkan", "Invalid SPIR-V ({} bytes): {}", code.len(), e);
            Error::InvalidResource(format!("Invalid SPIR-V: {}", e))
        })?;

        let create_info = vk::ShaderModuleCreateInfo::default().code(&words);

        let module = unsafe {
            device.create_shader_module(&create_info, None)
                .map_err(|e| engine_err!("lumen3d::vulkan", "Failed to create shader module: {:?}", e))?
        };

        Ok(Self {
            module,
            device: device.clone(),
        })
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}
