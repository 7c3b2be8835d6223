/// Graphics device module - backend-neutral presentation types and traits

pub mod graphics_device;
pub mod swapchain;
pub mod texture;
pub mod command_list;
pub mod images_in_flight;

pub use graphics_device::*;
pub use swapchain::*;
pub use texture::*;
pub use command_list::*;
pub use images_in_flight::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
