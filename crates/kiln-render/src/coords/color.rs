/// RGBA color with `f32` channels.
///
/// Used both as a clear color and as a per-channel multiplier for textured
/// draws. Blending assumes premultiplied alpha.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<ColorRgba> for glam::Vec4 {
    fn from(c: ColorRgba) -> Self {
        glam::Vec4::new(c.r, c.g, c.b, c.a)
    }
}

impl From<glam::Vec4> for ColorRgba {
    fn from(v: glam::Vec4) -> Self {
        ColorRgba::new(v.x, v.y, v.z, v.w)
    }
}
