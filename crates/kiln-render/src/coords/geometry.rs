use super::Rect;

/// Quad corners in float coordinates, as fed to vertex attributes.
///
/// `(x1, y1)` is the top-left corner and `(x2, y2)` the bottom-right one,
/// unless the quad has been flipped.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Geometry {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Geometry {
    #[inline]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn flipped_x(self) -> Self {
        Self::new(self.x2, self.y1, self.x1, self.y2)
    }

    #[inline]
    pub fn flipped_y(self) -> Self {
        Self::new(self.x1, self.y2, self.x2, self.y1)
    }

    /// Corners in triangle-fan order, starting bottom-left and going
    /// counter-clockwise in a +Y-down space.
    #[inline]
    pub fn fan_corners(self) -> [[f32; 2]; 4] {
        [
            [self.x1, self.y2],
            [self.x2, self.y2],
            [self.x2, self.y1],
            [self.x1, self.y1],
        ]
    }
}

impl From<Rect> for Geometry {
    fn from(r: Rect) -> Self {
        let x1 = r.x as f32;
        let y1 = r.y as f32;
        Self::new(x1, y1, x1 + r.width as f32, y1 + r.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rect_spans_extent() {
        let g = Geometry::from(Rect::new(2, 3, 10, 20));
        assert_eq!(g, Geometry::new(2.0, 3.0, 12.0, 23.0));
    }

    #[test]
    fn flips_swap_one_axis_only() {
        let g = Geometry::new(0.0, 1.0, 2.0, 3.0);
        assert_eq!(g.flipped_x(), Geometry::new(2.0, 1.0, 0.0, 3.0));
        assert_eq!(g.flipped_y(), Geometry::new(0.0, 3.0, 2.0, 1.0));
    }

    #[test]
    fn fan_corners_order() {
        let c = Geometry::new(0.0, 0.0, 10.0, 10.0).fan_corners();
        assert_eq!(c, [[0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]]);
    }
}
