use std::ops::{Deref, DerefMut};

use glam::Mat4;

use crate::coords::{Rect, Region};
use crate::error::RenderError;

use super::{OutputTransform, RenderTarget};

/// Render target covering a region of compositor space (an output or a
/// workspace stream), with its scale and rotation/flip.
///
/// Three coordinate spaces are involved:
/// - compositor space: output-local logical units, where views are placed
/// - damage space: compositor space times `scale`
/// - framebuffer space: damage space after the rotation/flip
///
/// Conversions are pure geometry and need no GL context.
///
/// When `has_nonstandard_transform` is set, `transform` is authoritative and
/// `output_transform`/`scale` no longer describe the mapping; box conversions
/// into framebuffer space then fail with [`RenderError::UnsupportedTransform`].
#[derive(Debug)]
pub struct OutputTarget {
    pub base: RenderTarget,

    /// Region of compositor space this target represents.
    pub geometry: Rect,

    pub output_transform: OutputTransform,

    /// Logical-to-physical pixel multiplier.
    pub scale: f32,

    pub has_nonstandard_transform: bool,

    /// Output rotation plus any extra compositing transform; applied after
    /// the orthographic projection.
    pub transform: Mat4,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self {
            base: RenderTarget::new(),
            geometry: Rect::default(),
            output_transform: OutputTransform::Normal,
            scale: 1.0,
            has_nonstandard_transform: false,
            transform: Mat4::IDENTITY,
        }
    }
}

impl OutputTarget {
    pub fn new(geometry: Rect, output_transform: OutputTransform, scale: f32) -> Self {
        Self {
            geometry,
            output_transform,
            scale,
            transform: output_transform.matrix(),
            ..Self::default()
        }
    }

    /// Replaces the discrete transform pair with a free-form matrix.
    pub fn set_nonstandard_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.has_nonstandard_transform = true;
    }

    /// Compositor box → damage box: origin floored, extent ceiled.
    pub fn damage_box_from_geometry_box(&self, rect: Rect) -> Rect {
        rect.scaled_outward(self.scale)
    }

    /// Damage box → framebuffer box, applying the rotation/flip.
    pub fn framebuffer_box_from_damage_box(&self, rect: Rect) -> Result<Rect, RenderError> {
        if self.has_nonstandard_transform {
            log::error!("framebuffer box conversion requested with a non-standard transform");
            return Err(RenderError::UnsupportedTransform);
        }

        let (mut width, mut height) = (self.base.width(), self.base.height());
        if self.output_transform.swaps_axes() {
            std::mem::swap(&mut width, &mut height);
        }

        Ok(self.output_transform.invert().transform_rect(rect, width, height))
    }

    /// Compositor box → framebuffer box.
    pub fn framebuffer_box_from_geometry_box(&self, rect: Rect) -> Result<Rect, RenderError> {
        self.framebuffer_box_from_damage_box(self.damage_box_from_geometry_box(rect))
    }

    /// Damage-space region covering the whole target.
    pub fn damage_region(&self) -> Region {
        Region::from(self.damage_box_from_geometry_box(Rect::from_size(
            self.geometry.width,
            self.geometry.height,
        )))
    }

    /// Projection from compositor coordinates to clip space.
    ///
    /// Maps `geometry` onto the full clip-space square with Y flipped (top-left
    /// origin in compositor space), then applies `transform`.
    pub fn orthographic_projection(&self) -> Mat4 {
        let g = self.geometry;
        let left = g.x as f32;
        let top = g.y as f32;
        let ortho = Mat4::orthographic_rh_gl(
            left,
            left + g.width as f32,
            top + g.height as f32,
            top,
            -1.0,
            1.0,
        );

        self.transform * ortho
    }
}

impl Deref for OutputTarget {
    type Target = RenderTarget;

    fn deref(&self) -> &RenderTarget {
        &self.base
    }
}

impl DerefMut for OutputTarget {
    fn deref_mut(&mut self) -> &mut RenderTarget {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn target(geometry: Rect, transform: OutputTransform, scale: f32, fb: (i32, i32)) -> OutputTarget {
        OutputTarget {
            base: RenderTarget::default_surface(fb.0, fb.1),
            ..OutputTarget::new(geometry, transform, scale)
        }
    }

    // ── damage space ──────────────────────────────────────────────────────

    #[test]
    fn damage_box_rounds_outward() {
        let t = target(Rect::from_size(100, 100), OutputTransform::Normal, 1.5, (150, 150));
        assert_eq!(t.damage_box_from_geometry_box(Rect::new(0, 0, 3, 3)), Rect::new(0, 0, 5, 5));

        let shifted = t.damage_box_from_geometry_box(Rect::new(1, 1, 3, 3));
        assert_eq!((shifted.x, shifted.y), (1, 1));
    }

    #[test]
    fn damage_region_covers_output() {
        for scale in [1.0, 1.25, 1.5, 2.0, 3.0] {
            let t = target(Rect::new(40, 20, 333, 217), OutputTransform::Normal, scale, (1, 1));
            let expected = t.damage_box_from_geometry_box(Rect::from_size(333, 217));
            assert_eq!(t.damage_region(), Region::from(expected), "scale {scale}");
        }
    }

    // ── framebuffer space ─────────────────────────────────────────────────

    #[test]
    fn identity_round_trip() {
        let t = target(Rect::from_size(200, 100), OutputTransform::Normal, 1.0, (200, 100));
        for rect in [Rect::new(0, 0, 200, 100), Rect::new(10, 20, 30, 40), Rect::new(199, 99, 1, 1)] {
            assert_eq!(t.framebuffer_box_from_geometry_box(rect), Ok(rect));
        }
    }

    #[test]
    fn rotated_output_uses_inverse_transform() {
        // 90° output: the framebuffer is 100x200 while damage space is 200x100.
        let t = target(Rect::from_size(200, 100), OutputTransform::Rot90, 1.0, (100, 200));
        let fb = t.framebuffer_box_from_damage_box(Rect::new(0, 0, 10, 20)).unwrap();
        assert_eq!(fb, Rect::new(0, 190, 20, 10));
    }

    #[test]
    fn nonstandard_transform_fails_loudly() {
        let mut t = target(Rect::from_size(10, 10), OutputTransform::Normal, 1.0, (10, 10));
        t.set_nonstandard_transform(Mat4::from_scale(glam::Vec3::splat(2.0)));
        assert_eq!(
            t.framebuffer_box_from_geometry_box(Rect::new(0, 0, 1, 1)),
            Err(RenderError::UnsupportedTransform)
        );
        // Damage conversion does not depend on the matrix.
        assert_eq!(t.damage_box_from_geometry_box(Rect::new(0, 0, 1, 1)), Rect::new(0, 0, 1, 1));
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn projection_maps_geometry_corners_to_clip_space() {
        let t = target(Rect::new(100, 50, 200, 100), OutputTransform::Normal, 1.0, (200, 100));
        let m = t.orthographic_projection();

        let top_left = m * Vec4::new(100.0, 50.0, 0.0, 1.0);
        let bottom_right = m * Vec4::new(300.0, 150.0, 0.0, 1.0);

        assert!(top_left.abs_diff_eq(Vec4::new(-1.0, 1.0, 0.0, 1.0), 1e-6));
        assert!(bottom_right.abs_diff_eq(Vec4::new(1.0, -1.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn projection_applies_output_transform_last() {
        let t = target(Rect::from_size(200, 100), OutputTransform::Rot90, 1.0, (100, 200));
        let m = t.orthographic_projection();

        // Top-left corner lands at (1, 1) after a clockwise quarter turn of (-1, 1).
        let top_left = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(top_left.abs_diff_eq(Vec4::new(1.0, 1.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn deref_exposes_base_target() {
        let t = target(Rect::from_size(10, 10), OutputTransform::Normal, 1.0, (12, 34));
        assert_eq!((t.width(), t.height()), (12, 34));
    }
}
