/// Format conversion and surface negotiation helpers
///
/// Pure functions over Vulkan enums and capability structs, so the chain
/// negotiation rules are testable without a GPU.

use ash::vk;
use lumen_3d_engine::lumen3d::render::{Extent2D, PresentMode, TextureFormat};

/// Depth formats tried for the depth attachment, most precise first
pub const DEPTH_FORMAT_CANDIDATES: [vk::Format; 3] = [
    vk::Format::D32_SFLOAT,
    vk::Format::D32_SFLOAT_S8_UINT,
    vk::Format::D24_UNORM_S8_UINT,
];

// ============================================================================
// Conversions
// ============================================================================

/// Convert TextureFormat to Vulkan format
pub fn format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::D16_UNORM => vk::Format::D16_UNORM,
        TextureFormat::D32_FLOAT => vk::Format::D32_SFLOAT,
        TextureFormat::D32_FLOAT_S8_UINT => vk::Format::D32_SFLOAT_S8_UINT,
        TextureFormat::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
    }
}

/// Convert Vulkan format to engine TextureFormat
///
/// Returns `None` for formats the engine has no name for.
pub fn vk_to_format(format: vk::Format) -> Option<TextureFormat> {
    match format {
        vk::Format::R8G8B8A8_SRGB => Some(TextureFormat::R8G8B8A8_SRGB),
        vk::Format::R8G8B8A8_UNORM => Some(TextureFormat::R8G8B8A8_UNORM),
        vk::Format::B8G8R8A8_SRGB => Some(TextureFormat::B8G8R8A8_SRGB),
        vk::Format::B8G8R8A8_UNORM => Some(TextureFormat::B8G8R8A8_UNORM),
        vk::Format::D16_UNORM => Some(TextureFormat::D16_UNORM),
        vk::Format::D32_SFLOAT => Some(TextureFormat::D32_FLOAT),
        vk::Format::D32_SFLOAT_S8_UINT => Some(TextureFormat::D32_FLOAT_S8_UINT),
        vk::Format::D24_UNORM_S8_UINT => Some(TextureFormat::D24_UNORM_S8_UINT),
        _ => None,
    }
}

pub fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
    }
}

pub fn vk_to_present_mode(mode: vk::PresentModeKHR) -> Option<PresentMode> {
    match mode {
        vk::PresentModeKHR::FIFO => Some(PresentMode::Fifo),
        vk::PresentModeKHR::MAILBOX => Some(PresentMode::Mailbox),
        vk::PresentModeKHR::IMMEDIATE => Some(PresentMode::Immediate),
        _ => None,
    }
}

/// Image aspect of a depth format
pub fn depth_aspect(format: vk::Format) -> vk::ImageAspectFlags {
    match format {
        vk::Format::D32_SFLOAT_S8_UINT | vk::Format::D24_UNORM_S8_UINT => {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        }
        _ => vk::ImageAspectFlags::DEPTH,
    }
}

// ============================================================================
// Surface negotiation
// ============================================================================

/// Pick the surface format
///
/// The preferred format in the sRGB non-linear color space if the surface
/// offers it, then the first format the engine has a name for, then the
/// first reported format. `None` when the surface reports no formats at all.
pub fn choose_surface_format(
    available: &[vk::SurfaceFormatKHR],
    preferred: vk::Format,
) -> Option<vk::SurfaceFormatKHR> {
    available
        .iter()
        .find(|f| f.format == preferred && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR)
        .or_else(|| available.iter().find(|f| vk_to_format(f.format).is_some()))
        .or_else(|| available.first())
        .copied()
}

/// Pick the present mode
///
/// The preferred mode if available, else FIFO (always supported).
/// `None` when the surface reports no present modes.
pub fn choose_present_mode(
    available: &[vk::PresentModeKHR],
    preferred: PresentMode,
) -> Option<vk::PresentModeKHR> {
    if available.is_empty() {
        return None;
    }
    let preferred = present_mode_to_vk(preferred);
    if available.contains(&preferred) {
        Some(preferred)
    } else {
        Some(vk::PresentModeKHR::FIFO)
    }
}

/// Pick the chain extent
///
/// Uses the surface's current extent unless the surface leaves it to the
/// application (`u32::MAX`), in which case `requested` is clamped to the
/// supported range.
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, requested: Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    vk::Extent2D {
        width: requested.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: requested.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One image more than the minimum, capped by the maximum (0 means no cap)
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

/// First candidate whose optimal tiling supports depth/stencil attachments
///
/// # Arguments
///
/// * `candidates` - Formats in order of preference
/// * `properties` - Format properties lookup (the physical device query)
pub fn find_depth_format(
    candidates: &[vk::Format],
    properties: impl Fn(vk::Format) -> vk::FormatProperties,
) -> Option<vk::Format> {
    candidates.iter().copied().find(|&format| {
        properties(format)
            .optimal_tiling_features
            .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
    })
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
