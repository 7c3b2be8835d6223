//! Error types for the Lumen3D engine
//!
//! Only runtime failures are represented here. Misuse of the frame protocol
//! (double begin, end without begin, stale command buffers) is a programmer
//! error and panics at the call site instead.

use std::fmt;
use crate::graphics_device::SurfaceFormat;

/// Result type for Lumen3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan call failure, etc.)
    BackendError(String),

    /// Out of GPU or host memory
    OutOfMemory,

    /// Invalid resource (shader, buffer, model, etc.)
    InvalidResource(String),

    /// Initialization failed (instance, device, subsystems)
    InitializationFailed(String),

    /// The logical device was lost; nothing can be recovered without a full restart
    DeviceLost(String),

    /// The surface cannot be presented to (no formats, no present modes, zero extent)
    SurfaceUnsupported(String),

    /// A rebuilt presentation chain picked different color/depth formats
    FormatMismatch {
        previous: SurfaceFormat,
        current: SurfaceFormat,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::DeviceLost(msg) => write!(f, "Device lost: {}", msg),
            Error::SurfaceUnsupported(msg) => write!(f, "Surface unsupported: {}", msg),
            Error::FormatMismatch { previous, current } => write!(
                f,
                "Presentation chain format changed: {:?}/{:?} -> {:?}/{:?}",
                previous.color, previous.depth, current.color, current.depth
            ),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR (with file:line) and evaluate to `Error::BackendError`
///
/// # Example
///
/// ```ignore
/// device.end_command_buffer(cb)
///     .map_err(|e| engine_err!("lumen3d::vulkan", "Failed to end command buffer: {:?}", e))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::lumen3d::Engine::log_detailed(
            $crate::lumen3d::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::lumen3d::Error::BackendError(message)
    }};
}

/// Log an ERROR (with file:line) and return `Err(Error::BackendError)` early
///
/// # Example
///
/// ```ignore
/// if image_index >= image_count {
///     engine_bail!("lumen3d::vulkan", "image index {} out of range", image_index);
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
