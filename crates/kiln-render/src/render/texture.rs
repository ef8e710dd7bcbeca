use crate::error::RenderError;

/// `GL_TEXTURE_EXTERNAL_OES` (OES_EGL_image_external).
pub const TEXTURE_EXTERNAL_OES: u32 = 0x8D65;

/// Texture format class. Each class needs its own shader variant to be
/// sampled correctly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// Regular 2D texture with four channels.
    #[default]
    Rgba = 0,
    /// Regular 2D texture whose alpha channel must be ignored.
    Rgbx = 1,
    /// Externally imported image (e.g. zero-copy buffer sharing), sampled
    /// through the external-image sampler.
    External = 2,
}

impl TextureFormat {
    pub const COUNT: usize = 3;
    pub const ALL: [TextureFormat; Self::COUNT] =
        [TextureFormat::Rgba, TextureFormat::Rgbx, TextureFormat::External];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// GL sampling target of a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum TextureTarget {
    #[default]
    Texture2d,
    /// `GL_TEXTURE_EXTERNAL_OES`.
    External,
    /// Any other raw GL target reported by an importer, bound as given.
    Other(u32),
}

impl TextureTarget {
    #[inline]
    pub const fn gl_enum(self) -> u32 {
        match self {
            TextureTarget::Texture2d => glow::TEXTURE_2D,
            TextureTarget::External => TEXTURE_EXTERNAL_OES,
            TextureTarget::Other(target) => target,
        }
    }

    /// Maps a raw GL target, keeping unknown values intact.
    #[inline]
    pub const fn from_gl(target: u32) -> Self {
        match target {
            glow::TEXTURE_2D => TextureTarget::Texture2d,
            TEXTURE_EXTERNAL_OES => TextureTarget::External,
            other => TextureTarget::Other(other),
        }
    }

    #[inline]
    pub const fn is_2d(self) -> bool {
        matches!(self, TextureTarget::Texture2d)
    }
}

/// Attributes reported by a texture importer for one of its textures.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImportedTexture {
    /// Raw GL sampling target.
    pub target: u32,
    /// GL texture name.
    pub texture: u32,
    pub has_alpha: bool,
    /// Whether the importer stores the image bottom-up.
    pub inverted_y: bool,
}

/// Texture-import provider (buffer/surface system).
///
/// `handle` is the importer's opaque texture handle.
pub trait TextureImport {
    /// Whether `handle` is a GLES texture owned by this importer.
    fn is_gles_texture(&self, handle: u64) -> bool;

    fn attributes(&self, handle: u64) -> ImportedTexture;
}

/// Non-owning description of a GPU texture, built per draw call.
///
/// The GL texture's lifetime belongs to whoever handed it over.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureView {
    pub format: TextureFormat,
    pub target: TextureTarget,
    /// Sample with the Y axis flipped.
    pub invert_y: bool,
    pub texture: u32,
}

impl TextureView {
    /// A non-inverted RGBA 2D view of `texture`.
    #[inline]
    pub const fn new(texture: u32) -> Self {
        Self {
            format: TextureFormat::Rgba,
            target: TextureTarget::Texture2d,
            invert_y: false,
            texture,
        }
    }

    /// Classifies an imported texture.
    ///
    /// Non-2D targets are `External` (the raw target is kept for binding);
    /// 2D ones are `Rgba` or `Rgbx` depending on the alpha channel. The
    /// importer's Y convention is the opposite of this layer's, so `invert_y`
    /// is the negation of the importer's flag.
    pub fn from_imported(attribs: ImportedTexture) -> Self {
        let target = TextureTarget::from_gl(attribs.target);
        if let TextureTarget::Other(raw) = target {
            log::warn!("imported texture {} has unexpected target {raw:#x}", attribs.texture);
        }

        let format = if !target.is_2d() {
            TextureFormat::External
        } else if attribs.has_alpha {
            TextureFormat::Rgba
        } else {
            TextureFormat::Rgbx
        };

        Self {
            format,
            target,
            invert_y: !attribs.inverted_y,
            texture: attribs.texture,
        }
    }

    /// Queries `import` for `handle` and classifies the result.
    pub fn from_import(import: &dyn TextureImport, handle: u64) -> Result<Self, RenderError> {
        if !import.is_gles_texture(handle) {
            log::error!("texture handle {handle:#x} is not a GLES texture");
            return Err(RenderError::ForeignTexture(handle));
        }
        Ok(Self::from_imported(import.attributes(handle)))
    }
}
