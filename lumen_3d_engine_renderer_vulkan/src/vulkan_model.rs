/// Model - vertex buffer plus the vertex layout the simple pipeline consumes

use lumen_3d_engine::lumen3d::{Error, Result};
use lumen_3d_engine::{engine_debug, engine_error};
use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::mem::{offset_of, size_of};

use crate::vulkan_buffer::Buffer;
use crate::vulkan_graphics_device::VulkanGraphicsDevice;

/// Per-vertex position and color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Vec3,
}

impl Vertex {
    pub const fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }

    /// One interleaved binding at slot 0
    pub fn binding_descriptions() -> [vk::VertexInputBindingDescription; 1] {
        [vk::VertexInputBindingDescription {
            binding: 0,
            stride: size_of::<Vertex>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }]
    }

    /// Location 0: position, location 1: color
    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 2] {
        [
            vk::VertexInputAttributeDescription {
                location: 0,
                binding: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, position) as u32,
            },
            vk::VertexInputAttributeDescription {
                location: 1,
                binding: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, color) as u32,
            },
        ]
    }
}

/// Immutable triangle list uploaded once at creation
pub struct Model {
    vertex_buffer: Buffer,
    vertex_count: u32,
    device: ash::Device,
}

impl Model {
    /// Upload `vertices` into a new vertex buffer
    ///
    /// Fails with `InvalidResource` for fewer than 3 vertices.
    pub fn new(device: &VulkanGraphicsDevice, vertices: &[Vertex]) -> Result<Self> {
        if vertices.len() < 3 {
            engine_error!("lumen3d::vulkan", "Model needs at least 3 vertices, got {}", vertices.len());
            return Err(Error::InvalidResource(format!(
                "Model needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }

        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let vertex_buffer = Buffer::new(
            std::sync::Arc::clone(device.context()),
            bytes.len() as u64,
            vk::BufferUsageFlags::VERTEX_BUFFER,
            "model vertices",
        )?;
        vertex_buffer.write(0, bytes)?;

        engine_debug!("lumen3d::vulkan", "Model created with {} vertices ({} bytes)",
            vertices.len(), vertex_buffer.size());

        Ok(Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            device: device.device().clone(),
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn bind(&self, command_buffer: vk::CommandBuffer) {
        unsafe {
            self.device.cmd_bind_vertex_buffers(command_buffer, 0, &[self.vertex_buffer.buffer], &[0]);
        }
    }

    pub fn draw(&self, command_buffer: vk::CommandBuffer) {
        unsafe {
            self.device.cmd_draw(command_buffer, self.vertex_count, 1, 0, 0);
        }
    }
}
