/// DrawSystem trait - per-object recording inside the presentation render pass

use crate::error::Result;
use crate::scene::{Camera, ObjectRegistry};

/// Everything a draw system needs for one frame
pub struct FrameInfo<'a, C, M> {
    /// Frame slot of the active frame
    pub frame_index: usize,
    /// Seconds since the previous frame
    pub frame_time: f32,
    /// Command buffer, already inside the presentation render pass
    pub command_buffer: C,
    pub camera: &'a Camera,
    pub objects: &'a ObjectRegistry<M>,
}

/// Records draw calls for a set of objects
///
/// Called between `FrameController::begin_render_pass` and
/// `end_render_pass`; implementations bind their own pipeline and must not
/// begin or end the render pass themselves.
pub trait DrawSystem {
    type CommandBuffer: Copy;
    type Model;

    fn render(&mut self, frame: &FrameInfo<'_, Self::CommandBuffer, Self::Model>) -> Result<()>;
}

#[cfg(test)]
#[path = "draw_system_tests.rs"]
mod tests;
