/// Attachment formats shared by all backends

/// Pixel formats of presentation and depth attachments
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    // Color formats
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,

    // Depth formats
    D16_UNORM,
    D32_FLOAT,
    D32_FLOAT_S8_UINT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// True for formats usable as a depth attachment
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM
                | TextureFormat::D32_FLOAT
                | TextureFormat::D32_FLOAT_S8_UINT
                | TextureFormat::D24_UNORM_S8_UINT
        )
    }

    /// True for depth formats carrying a stencil component
    pub fn has_stencil(self) -> bool {
        matches!(
            self,
            TextureFormat::D32_FLOAT_S8_UINT | TextureFormat::D24_UNORM_S8_UINT
        )
    }

    /// True for color formats stored in sRGB encoding
    pub fn is_srgb(self) -> bool {
        matches!(self, TextureFormat::R8G8B8A8_SRGB | TextureFormat::B8G8R8A8_SRGB)
    }
}

/// Color + depth formats of a presentation chain
///
/// Pipelines are compiled against these; two chains with equal
/// `SurfaceFormat` share compatible render passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    pub color: TextureFormat,
    pub depth: TextureFormat,
}

impl SurfaceFormat {
    pub fn new(color: TextureFormat, depth: TextureFormat) -> Self {
        Self { color, depth }
    }
}
