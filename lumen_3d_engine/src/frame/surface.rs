/// SurfaceProvider trait - the window as seen by the frame loop

use crate::graphics_device::Extent2D;

/// Window and drawable surface driven from the single control thread
///
/// Resize notification is poll-based: the frame loop asks `was_resized()`
/// once per frame and clears the flag itself. Implementations never call
/// back into the engine.
pub trait SurfaceProvider {
    /// Current drawable size in pixels (zero while minimized)
    fn current_extent(&self) -> Extent2D;

    /// True once the user asked to close the window
    fn should_close(&self) -> bool;

    /// Process pending OS events without blocking
    fn poll_events(&mut self);

    /// Block until at least one OS event arrived, then process it
    fn wait_events(&mut self);

    /// True if the surface was resized since the flag was last cleared
    fn was_resized(&self) -> bool;

    fn clear_resized_flag(&mut self);
}
