/// Pipeline - graphics pipeline and layout for flat-colored models

use lumen_3d_engine::lumen3d::Result;
use lumen_3d_engine::{engine_debug, engine_err};
use ash::vk;

use crate::vulkan_model::Vertex;
use crate::vulkan_shader::Shader;

/// Fixed-function settings of a graphics pipeline
///
/// Viewport and scissor are always dynamic, so one pipeline survives every
/// presentation chain rebuild that keeps the render pass compatible.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub topology: vk::PrimitiveTopology,
    pub polygon_mode: vk::PolygonMode,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_compare_op: vk::CompareOp,
    /// Size in bytes of the single push constant range (vertex + fragment)
    pub push_constant_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::NONE,
            front_face: vk::FrontFace::CLOCKWISE,
            depth_test: true,
            depth_write: true,
            depth_compare_op: vk::CompareOp::LESS,
            push_constant_size: 0,
        }
    }
}

/// Graphics pipeline with its layout
pub struct Pipeline {
    /// Vulkan graphics pipeline
    pub(crate) pipeline: vk::Pipeline,
    /// Pipeline layout (needed for push constants)
    pub(crate) pipeline_layout: vk::PipelineLayout,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl Pipeline {
    /// Build a pipeline for `render_pass` subpass 0
    ///
    /// # Arguments
    ///
    /// * `device` - Vulkan logical device
    /// * `render_pass` - Render pass the pipeline must be compatible with
    /// * `vertex_shader` - Module with a `vs_main` entry point
    /// * `fragment_shader` - Module with a `fs_main` entry point
    /// * `config` - Fixed-function settings
    pub fn new(
        device: &ash::Device,
        render_pass: vk::RenderPass,
        vertex_shader: &Shader,
        fragment_shader: &Shader,
        config: &PipelineConfig,
    ) -> Result<Self> {
        unsafe {
            let shader_stages = [
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::VERTEX)
                    .module(vertex_shader.module)
                    .name(c"vs_main"),
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::FRAGMENT)
                    .module(fragment_shader.module)
                    .name(c"fs_main"),
            ];

            // Vertex input state
            let vertex_bindings = Vertex::binding_descriptions();
            let vertex_attributes = Vertex::attribute_descriptions();
            let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
                .vertex_binding_descriptions(&vertex_bindings)
                .vertex_attribute_descriptions(&vertex_attributes);

            // Input assembly state
            let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(config.topology)
                .primitive_restart_enable(false);

            // Viewport state (dynamic)
            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewport_count(1)
                .scissor_count(1);

            // Rasterization state
            let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
                .depth_clamp_enable(false)
                .rasterizer_discard_enable(false)
                .polygon_mode(config.polygon_mode)
                .line_width(1.0)
                .cull_mode(config.cull_mode)
                .front_face(config.front_face)
                .depth_bias_enable(false);

            // Depth/stencil state
            let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
                .depth_test_enable(config.depth_test)
                .depth_write_enable(config.depth_write)
                .depth_compare_op(config.depth_compare_op)
                .depth_bounds_test_enable(false)
                .stencil_test_enable(false);

            // Multisample state
            let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
                .sample_shading_enable(false)
                .rasterization_samples(vk::SampleCountFlags::TYPE_1);

            // Color blend state
            let color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA)
                .blend_enable(false);

            let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
                .logic_op_enable(false)
                .attachments(std::slice::from_ref(&color_blend_attachment));

            // Dynamic state
            let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
            let dynamic_state = vk::PipelineDynamicStateCreateInfo::default()
                .dynamic_states(&dynamic_states);

            // Pipeline layout with push constants
            let push_constant_ranges = [vk::PushConstantRange {
                stage_flags: vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                offset: 0,
                size: config.push_constant_size,
            }];

            let mut layout_create_info = vk::PipelineLayoutCreateInfo::default();
            if config.push_constant_size > 0 {
                layout_create_info = layout_create_info.push_constant_ranges(&push_constant_ranges);
            }

            let layout = device.create_pipeline_layout(&layout_create_info, None)
                .map_err(|e| engine_err!("lumen3d::vulkan", "Failed to create pipeline layout: {:?}", e))?;

            let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&shader_stages)
                .vertex_input_state(&vertex_input_state)
                .input_assembly_state(&input_assembly_state)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterization_state)
                .depth_stencil_state(&depth_stencil_state)
                .multisample_state(&multisample_state)
                .color_blend_state(&color_blend_state)
                .dynamic_state(&dynamic_state)
                .layout(layout)
                .render_pass(render_pass)
                .subpass(0);

            let pipelines = match device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                &[pipeline_create_info],
                None,
            ) {
                Ok(pipelines) => pipelines,
                Err((_, e)) => {
                    device.destroy_pipeline_layout(layout, None);
                    return Err(engine_err!("lumen3d::vulkan", "Failed to create graphics pipeline: {:?}", e));
                }
            };

            engine_debug!("lumen3d::vulkan", "Graphics pipeline created");

            Ok(Self {
                pipeline: pipelines[0],
                pipeline_layout: layout,
                device: device.clone(),
            })
        }
    }

    pub fn bind(&self, command_buffer: vk::CommandBuffer) {
        unsafe {
            self.device.cmd_bind_pipeline(command_buffer, vk::PipelineBindPoint::GRAPHICS, self.pipeline);
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.pipeline_layout, None);
        }
    }
}
