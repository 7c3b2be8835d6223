/// FrameController - begin/end frame protocol over a presentation chain
///
/// State machine: Idle -> FrameActive -> Idle. Stale-surface conditions
/// (out of date, suboptimal, resize) rebuild the presentation chain; all
/// other failures are returned to the caller. Misuse of the protocol
/// (double begin, end without begin, foreign command buffer) panics.

use std::sync::Arc;

use crate::config::RendererConfig;
use crate::error::{Error, Result};
use crate::frame::SurfaceProvider;
use crate::graphics_device::{
    ClearValue, Extent2D, GraphicsDevice, ImageAcquisition, PresentationChain, Rect2D, Viewport,
};
use crate::{engine_debug, engine_error, engine_info, engine_trace, engine_warn};

/// Render pass handle type of a device's presentation chain
pub type ChainRenderPass<D> = <<D as GraphicsDevice>::Chain as PresentationChain>::RenderPass;

/// Drives acquisition, recording and presentation of frames
///
/// Owns one command buffer per frame slot and, exclusively, the current
/// presentation chain. The chain is replaced wholesale on recreation and
/// never mutated in place.
///
/// # Example
///
/// ```ignore
/// let mut frames = FrameController::new(device.clone(), &mut window, &config)?;
/// while !window.should_close() {
///     window.poll_events();
///     if let Some(cb) = frames.begin_frame(&mut window)? {
///         frames.begin_render_pass(cb);
///         // draw systems record here
///         frames.end_render_pass(cb);
///         frames.end_frame(&mut window)?;
///     }
/// }
/// ```
pub struct FrameController<D: GraphicsDevice> {
    chain: D::Chain,
    device: Arc<D>,
    command_buffers: Vec<D::CommandBuffer>,
    clear_values: [ClearValue; 2],
    current_image_index: u32,
    current_frame_index: usize,
    frame_started: bool,
    /// Acquisition reported Suboptimal; rebuild after this frame is presented
    rebuild_after_present: bool,
    recreation_count: u64,
}

impl<D: GraphicsDevice> FrameController<D> {
    /// Build the first presentation chain and allocate the per-slot command buffers
    ///
    /// Blocks on `surface.wait_events()` while the surface extent is zero.
    /// Fails with `SurfaceUnsupported` if the surface asks to close before
    /// it ever had a drawable extent.
    ///
    /// # Arguments
    ///
    /// * `device` - Graphics device shared with draw systems
    /// * `surface` - Window the chain presents to
    /// * `config` - Provides the render pass clear values
    pub fn new<S: SurfaceProvider>(
        device: Arc<D>,
        surface: &mut S,
        config: &RendererConfig,
    ) -> Result<Self> {
        let Some(extent) = wait_for_drawable_extent(surface) else {
            engine_warn!(
                "lumen3d::FrameController",
                "Surface closed before it had a drawable extent"
            );
            return Err(Error::SurfaceUnsupported(
                "surface closed while minimized".to_string(),
            ));
        };
        let chain = device.create_presentation_chain(extent, None)?;
        let command_buffers = device.allocate_command_buffers(chain.frames_in_flight())?;

        engine_info!(
            "lumen3d::FrameController",
            "Frame controller ready: {}x{}, {} images, {} frames in flight",
            extent.width,
            extent.height,
            chain.image_count(),
            command_buffers.len()
        );

        Ok(Self {
            chain,
            device,
            command_buffers,
            clear_values: config.clear_values(),
            current_image_index: 0,
            current_frame_index: 0,
            frame_started: false,
            rebuild_after_present: false,
            recreation_count: 0,
        })
    }

    // ===== FRAME PROTOCOL =====

    /// Acquire the next image and begin recording the slot's command buffer
    ///
    /// Returns `Ok(None)` when the chain was out of date; it has been rebuilt
    /// and the caller skips this frame.
    ///
    /// # Panics
    ///
    /// Panics if a frame is already in progress.
    pub fn begin_frame<S: SurfaceProvider>(
        &mut self,
        surface: &mut S,
    ) -> Result<Option<D::CommandBuffer>> {
        assert!(
            !self.frame_started,
            "Can't call begin_frame while a frame is already in progress"
        );

        let image_index = match self.chain.acquire_next_image(self.current_frame_index)? {
            ImageAcquisition::Ready(index) => index,
            ImageAcquisition::Suboptimal(index) => {
                engine_debug!(
                    "lumen3d::FrameController",
                    "Suboptimal acquisition (image {}), chain rebuilt after present",
                    index
                );
                self.rebuild_after_present = true;
                index
            }
            ImageAcquisition::OutOfDate => {
                engine_debug!(
                    "lumen3d::FrameController",
                    "Presentation chain out of date on acquire, skipping frame"
                );
                self.recreate_presentation_chain(surface)?;
                return Ok(None);
            }
        };

        let command_buffer = self.command_buffers[self.current_frame_index];
        self.device.begin_command_buffer(command_buffer)?;

        self.current_image_index = image_index;
        self.frame_started = true;

        engine_trace!(
            "lumen3d::FrameController",
            "Frame slot {} recording into image {}",
            self.current_frame_index,
            image_index
        );

        Ok(Some(command_buffer))
    }

    /// Finish recording, submit, present and advance the frame slot
    ///
    /// Rebuilds the chain when presentation reports a stale surface, when the
    /// acquisition was suboptimal, or when the surface was resized. The slot
    /// advances whenever submission succeeded, including the rebuild path.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn end_frame<S: SurfaceProvider>(&mut self, surface: &mut S) -> Result<()> {
        assert!(
            self.frame_started,
            "Can't call end_frame while frame is not in progress"
        );

        let command_buffer = self.command_buffers[self.current_frame_index];
        self.device.end_command_buffer(command_buffer)?;

        let status = self.chain.submit(
            command_buffer,
            self.current_image_index,
            self.current_frame_index,
        )?;

        self.frame_started = false;
        self.current_frame_index = (self.current_frame_index + 1) % self.command_buffers.len();

        let resized = surface.was_resized();
        if status.needs_recreation() || resized || self.rebuild_after_present {
            engine_debug!(
                "lumen3d::FrameController",
                "Rebuilding presentation chain (present: {:?}, resized: {}, suboptimal acquire: {})",
                status,
                resized,
                self.rebuild_after_present
            );
            surface.clear_resized_flag();
            self.rebuild_after_present = false;
            self.recreate_presentation_chain(surface)?;
        }

        Ok(())
    }

    /// Begin the chain's render pass on the current image
    ///
    /// Also sets a full-surface viewport and scissor.
    ///
    /// # Panics
    ///
    /// Panics outside an active frame or for a command buffer of another frame.
    pub fn begin_render_pass(&self, command_buffer: D::CommandBuffer) {
        assert!(
            self.frame_started,
            "Can't call begin_render_pass if frame is not in progress"
        );
        assert!(
            command_buffer == self.command_buffers[self.current_frame_index],
            "Can't begin render pass on command buffer from a different frame"
        );

        let extent = self.chain.extent();
        self.device.cmd_begin_render_pass(
            command_buffer,
            &self.chain,
            self.current_image_index,
            &self.clear_values,
        );
        self.device.cmd_set_viewport(command_buffer, &Viewport::full(extent));
        self.device.cmd_set_scissor(command_buffer, &Rect2D::full(extent));
    }

    /// End the render pass opened by `begin_render_pass`
    ///
    /// # Panics
    ///
    /// Panics outside an active frame or for a command buffer of another frame.
    pub fn end_render_pass(&self, command_buffer: D::CommandBuffer) {
        assert!(
            self.frame_started,
            "Can't call end_render_pass if frame is not in progress"
        );
        assert!(
            command_buffer == self.command_buffers[self.current_frame_index],
            "Can't end render pass on command buffer from a different frame"
        );

        self.device.cmd_end_render_pass(command_buffer);
    }

    // ===== RECREATION =====

    /// Leaves the stale chain in place when the surface asks to close while
    /// minimized; the caller's loop ends on `should_close()`.
    fn recreate_presentation_chain<S: SurfaceProvider>(&mut self, surface: &mut S) -> Result<()> {
        let Some(extent) = wait_for_drawable_extent(surface) else {
            engine_debug!(
                "lumen3d::FrameController",
                "Close requested while minimized, presentation chain not rebuilt"
            );
            return Ok(());
        };

        self.device.wait_idle()?;

        let new_chain = self.device.create_presentation_chain(extent, Some(&self.chain))?;
        let old_chain = std::mem::replace(&mut self.chain, new_chain);

        if !old_chain.compare_format(&self.chain) {
            let previous = old_chain.format();
            let current = self.chain.format();
            engine_error!(
                "lumen3d::FrameController",
                "Presentation chain color or depth format changed: {:?} -> {:?}",
                previous,
                current
            );
            return Err(Error::FormatMismatch { previous, current });
        }
        drop(old_chain);

        if self.chain.frames_in_flight() != self.command_buffers.len() {
            let old_buffers = std::mem::take(&mut self.command_buffers);
            self.device.free_command_buffers(&old_buffers);
            self.command_buffers = self
                .device
                .allocate_command_buffers(self.chain.frames_in_flight())?;
            self.current_frame_index %= self.command_buffers.len();
        }

        self.recreation_count += 1;
        engine_info!(
            "lumen3d::FrameController",
            "Presentation chain rebuilt: {}x{}, {} images",
            extent.width,
            extent.height,
            self.chain.image_count()
        );

        Ok(())
    }

    // ===== QUERIES =====

    pub fn is_frame_in_progress(&self) -> bool {
        self.frame_started
    }

    /// Command buffer of the active frame
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn current_command_buffer(&self) -> D::CommandBuffer {
        assert!(
            self.frame_started,
            "Cannot get command buffer when frame not in progress"
        );
        self.command_buffers[self.current_frame_index]
    }

    /// Frame slot of the active frame
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn frame_index(&self) -> usize {
        assert!(
            self.frame_started,
            "Cannot get frame index when frame not in progress"
        );
        self.current_frame_index
    }

    /// Image acquired for the active frame, `None` outside a frame
    pub fn current_image_index(&self) -> Option<u32> {
        self.frame_started.then_some(self.current_image_index)
    }

    /// Render pass of the current chain
    ///
    /// Re-query after any call that may rebuild the chain.
    pub fn current_render_pass(&self) -> ChainRenderPass<D> {
        self.chain.render_pass()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.chain.aspect_ratio()
    }

    pub fn extent(&self) -> Extent2D {
        self.chain.extent()
    }

    /// Number of chain rebuilds since construction
    pub fn recreation_count(&self) -> u64 {
        self.recreation_count
    }

    pub fn presentation_chain(&self) -> &D::Chain {
        &self.chain
    }

    pub fn device(&self) -> &Arc<D> {
        &self.device
    }
}

impl<D: GraphicsDevice> Drop for FrameController<D> {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            engine_error!(
                "lumen3d::FrameController",
                "wait_idle failed during teardown: {}",
                e
            );
        }
        self.device.free_command_buffers(&self.command_buffers);
        self.command_buffers.clear();
    }
}

/// Current extent of `surface`, blocking on OS events while it is zero
///
/// `None` once the surface asks to close.
fn wait_for_drawable_extent<S: SurfaceProvider>(surface: &mut S) -> Option<Extent2D> {
    let mut extent = surface.current_extent();
    if extent.is_zero() {
        engine_info!(
            "lumen3d::FrameController",
            "Surface has zero extent, waiting for the window to be restored"
        );
    }
    while extent.is_zero() {
        if surface.should_close() {
            return None;
        }
        surface.wait_events();
        extent = surface.current_extent();
    }
    Some(extent)
}

#[cfg(test)]
#[path = "frame_controller_tests.rs"]
mod tests;
