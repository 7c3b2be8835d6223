/// PresentationChain trait - presentable images and their per-frame synchronization

use std::fmt::Debug;
use crate::error::Result;
use crate::graphics_device::{Extent2D, SurfaceFormat};

/// Number of frames the CPU may record ahead of the GPU
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Presentation modes, in the order the engine prefers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentMode {
    /// Vsync, always available
    Fifo,
    /// Triple buffering, newest image replaces the queued one
    Mailbox,
    /// No vsync, may tear
    Immediate,
}

/// Result of acquiring the next presentable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAcquisition {
    /// Image is ready and the chain still matches the surface
    Ready(u32),
    /// Image is usable this frame, the chain should be rebuilt afterwards
    Suboptimal(u32),
    /// No image; the chain must be rebuilt before rendering
    OutOfDate,
}

impl ImageAcquisition {
    /// Acquired image index, if any
    pub fn image_index(&self) -> Option<u32> {
        match self {
            ImageAcquisition::Ready(index) | ImageAcquisition::Suboptimal(index) => Some(*index),
            ImageAcquisition::OutOfDate => None,
        }
    }
}

/// Surface status reported by submit/present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    Optimal,
    Suboptimal,
    OutOfDate,
}

impl SurfaceStatus {
    /// True for both stale-surface statuses
    pub fn needs_recreation(self) -> bool {
        !matches!(self, SurfaceStatus::Optimal)
    }
}

/// Set of presentable images bound to one surface
///
/// Owns the images, their views, the depth attachments, the framebuffers,
/// the shared render pass and `frames_in_flight()` synchronization slots.
/// A chain is never resized in place: the owner builds a successor with
/// `GraphicsDevice::create_presentation_chain(extent, Some(&old))` and drops
/// the old one afterwards.
///
/// The frame slot index is owned by the caller and passed in; the acquired
/// image index is unrelated to it.
pub trait PresentationChain {
    /// Command buffer handle submitted by `submit`
    type CommandBuffer: Copy + PartialEq + Debug;

    /// Render pass handle shared by every framebuffer of the chain
    type RenderPass: Copy + Debug;

    /// Wait for the slot's fence, then acquire the next presentable image
    ///
    /// # Arguments
    ///
    /// * `frame_index` - Frame slot whose fence and image-available signal are used
    fn acquire_next_image(&mut self, frame_index: usize) -> Result<ImageAcquisition>;

    /// Submit a recorded command buffer and present the image
    ///
    /// Waits first for any earlier submission still writing into `image_index`,
    /// then records the slot as the image's new owner.
    ///
    /// # Arguments
    ///
    /// * `command_buffer` - Recorded command buffer
    /// * `image_index` - Image returned by `acquire_next_image`
    /// * `frame_index` - Frame slot used for the acquisition
    fn submit(
        &mut self,
        command_buffer: Self::CommandBuffer,
        image_index: u32,
        frame_index: usize,
    ) -> Result<SurfaceStatus>;

    /// Color and depth formats of the chain
    fn format(&self) -> SurfaceFormat;

    /// True iff both chains use the same color and depth formats
    fn compare_format(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.format() == other.format()
    }

    /// Extent fixed at construction
    fn extent(&self) -> Extent2D;

    fn aspect_ratio(&self) -> f32 {
        self.extent().aspect_ratio()
    }

    /// Number of presentable images
    fn image_count(&self) -> usize;

    /// Number of synchronization slots
    fn frames_in_flight(&self) -> usize {
        MAX_FRAMES_IN_FLIGHT
    }

    fn render_pass(&self) -> Self::RenderPass;
}

#[cfg(test)]
#[path = "swapchain_tests.rs"]
mod tests;
