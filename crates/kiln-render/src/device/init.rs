/// Texture sampling filter applied when a texture is bound for drawing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    /// Weighted average of the four nearest texels.
    #[default]
    Linear,
    /// Texel nearest to the sample point.
    Nearest,
}

impl TextureFilter {
    #[inline]
    pub const fn gl_enum(self) -> i32 {
        match self {
            TextureFilter::Linear => glow::LINEAR as i32,
            TextureFilter::Nearest => glow::NEAREST as i32,
        }
    }
}

/// Initialization parameters for the rendering layer.
///
/// Keep this structure small. Add flags only when a concrete backend
/// requirement exists.
#[derive(Debug, Clone)]
pub struct RendererInit {
    /// Poll `glGetError` after every GPU call and log failures.
    ///
    /// Read by the backend ([`GlowGles::new`](super::GlowGles::new)); the
    /// renderer only checks that the backend agrees.
    ///
    /// Costs a driver round-trip per call; enabled by default in debug builds only.
    pub check_errors: bool,

    /// Minification filter used when sampling client textures.
    pub texture_filter: TextureFilter,
}

impl Default for RendererInit {
    fn default() -> Self {
        Self {
            check_errors: cfg!(debug_assertions),
            texture_filter: TextureFilter::Linear,
        }
    }
}
