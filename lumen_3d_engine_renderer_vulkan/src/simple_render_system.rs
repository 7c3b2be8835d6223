/// SimpleRenderSystem - draws every object with one flat-color pipeline

use lumen_3d_engine::lumen3d::frame::{DrawSystem, FrameInfo};
use lumen_3d_engine::lumen3d::Result;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::vulkan_graphics_device::VulkanGraphicsDevice;
use crate::vulkan_model::Model;
use crate::vulkan_pipeline::{Pipeline, PipelineConfig};
use crate::vulkan_shader::{Shader, SIMPLE_SHADER_SPV};

/// Push constant block shared by the vertex and fragment stages
///
/// Layout matches the shader's `Push` struct: a mat4 followed by a vec3
/// padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SimplePushConstantData {
    pub transform: Mat4,
    pub color: Vec3,
    _pad: f32,
}

impl SimplePushConstantData {
    pub fn new(transform: Mat4, color: Vec3) -> Self {
        Self { transform, color, _pad: 0.0 }
    }
}

/// Records one draw per object that has a model
pub struct SimpleRenderSystem {
    pipeline: Pipeline,
    device: ash::Device,
}

impl SimpleRenderSystem {
    /// Build the pipeline against `render_pass`
    ///
    /// The render pass only has to stay compatible; rebuilt presentation
    /// chains with the same formats reuse this pipeline.
    pub fn new(device: &VulkanGraphicsDevice, render_pass: vk::RenderPass) -> Result<Self> {
        let vk_device = device.device();

        // Shader modules are only needed until the pipeline exists
        let shader = Shader::new(vk_device, SIMPLE_SHADER_SPV)?;
        let config = PipelineConfig {
            push_constant_size: std::mem::size_of::<SimplePushConstantData>() as u32,
            ..Default::default()
        };
        let pipeline = Pipeline::new(vk_device, render_pass, &shader, &shader, &config)?;

        Ok(Self {
            pipeline,
            device: vk_device.clone(),
        })
    }
}

impl DrawSystem for SimpleRenderSystem {
    type CommandBuffer = vk::CommandBuffer;
    type Model = Model;

    fn render(&mut self, frame: &FrameInfo<'_, vk::CommandBuffer, Model>) -> Result<()> {
        let command_buffer = frame.command_buffer;
        self.pipeline.bind(command_buffer);

        let projection_view = frame.camera.projection_view();

        for object in frame.objects.iter() {
            let Some(model) = &object.model else {
                continue;
            };

            let push = SimplePushConstantData::new(
                projection_view * object.transform.mat4(),
                object.color,
            );

            unsafe {
                self.device.cmd_push_constants(
                    command_buffer,
                    self.pipeline.pipeline_layout,
                    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                    0,
                    bytemuck::bytes_of(&push),
                );
            }
            model.bind(command_buffer);
            model.draw(command_buffer);
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "simple_render_system_tests.rs"]
mod tests;
