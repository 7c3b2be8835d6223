/// GraphicsDevice trait - logical device, command pool and presentation chains

use std::fmt::Debug;
use crate::error::Result;
use crate::graphics_device::{ClearValue, Extent2D, PresentationChain, Rect2D, Viewport};

/// Logical GPU connection used by the frame loop
///
/// Creates presentation chains, hands out command buffers from its pool and
/// records the few commands the frame loop issues itself (render pass
/// begin/end, dynamic viewport and scissor). Everything else is recorded by
/// draw systems through the backend's own API.
pub trait GraphicsDevice {
    /// Primary command buffer handle
    type CommandBuffer: Copy + PartialEq + Debug;

    /// Presentation chain type built by this device
    type Chain: PresentationChain<CommandBuffer = Self::CommandBuffer>;

    /// Build a presentation chain for `extent`
    ///
    /// # Arguments
    ///
    /// * `extent` - Surface extent, must not be zero
    /// * `previous` - Chain being replaced; its native swap object is reused as a
    ///   hint. The new chain does not borrow from it once this returns.
    fn create_presentation_chain(
        &self,
        extent: Extent2D,
        previous: Option<&Self::Chain>,
    ) -> Result<Self::Chain>;

    /// Allocate `count` primary command buffers from the device pool
    fn allocate_command_buffers(&self, count: usize) -> Result<Vec<Self::CommandBuffer>>;

    /// Return command buffers to the device pool
    fn free_command_buffers(&self, command_buffers: &[Self::CommandBuffer]);

    /// Begin recording (resets the buffer implicitly)
    fn begin_command_buffer(&self, command_buffer: Self::CommandBuffer) -> Result<()>;

    /// End recording
    fn end_command_buffer(&self, command_buffer: Self::CommandBuffer) -> Result<()>;

    /// Begin the chain's render pass on the framebuffer of `image_index`
    ///
    /// # Arguments
    ///
    /// * `command_buffer` - Recording command buffer
    /// * `chain` - Chain owning the render pass and framebuffers
    /// * `image_index` - Framebuffer to render into
    /// * `clear_values` - Color then depth clear values
    fn cmd_begin_render_pass(
        &self,
        command_buffer: Self::CommandBuffer,
        chain: &Self::Chain,
        image_index: u32,
        clear_values: &[ClearValue],
    );

    fn cmd_set_viewport(&self, command_buffer: Self::CommandBuffer, viewport: &Viewport);

    fn cmd_set_scissor(&self, command_buffer: Self::CommandBuffer, scissor: &Rect2D);

    fn cmd_end_render_pass(&self, command_buffer: Self::CommandBuffer);

    /// Block until every queue of the device is idle
    fn wait_idle(&self) -> Result<()>;
}
