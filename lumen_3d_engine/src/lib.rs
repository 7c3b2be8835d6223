/*!
# Lumen 3D Engine

Core traits and types for the Lumen 3D renderer.

This crate owns the platform-agnostic frame loop: the begin/end frame
protocol, presentation chain recreation and the small scene layer the
demo drives. Backends (currently Vulkan, in `lumen_3d_engine_renderer_vulkan`)
implement the device and chain traits.

## Architecture

- **GraphicsDevice**: logical device, command buffers, chain factory
- **PresentationChain**: presentable images, render pass, per-frame sync slots
- **SurfaceProvider**: window extent, events and resize flag
- **FrameController**: begin/end frame state machine and chain recreation
- **DrawSystem**: records per-object draws inside the presentation render pass
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod graphics_device;
pub mod frame;
pub mod scene;

// Main lumen3d namespace module
pub mod lumen3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::RendererConfig;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, format_entry};
    }

    // Backend-neutral device and presentation types
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Frame protocol
    pub mod frame {
        pub use crate::frame::*;
    }

    // Scene helpers
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
