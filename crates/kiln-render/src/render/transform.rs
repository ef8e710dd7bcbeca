use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec3};

use crate::coords::Rect;

/// Discrete output rotation/flip.
///
/// Discriminants match the wire values used by display protocols: the
/// rotation in 90° steps is `value & 3`, and flipped variants are the
/// rotation plus [`FLIPPED_BIT`](Self::FLIPPED_BIT). Positive rotations are
/// clockwise on screen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum OutputTransform {
    #[default]
    Normal = 0,
    Rot90 = 1,
    Rot180 = 2,
    Rot270 = 3,
    Flipped = 4,
    Flipped90 = 5,
    Flipped180 = 6,
    Flipped270 = 7,
}

impl OutputTransform {
    pub const FLIPPED_BIT: u32 = 4;

    /// Parses a wire value. Unknown values yield `None`.
    pub const fn from_raw(value: u32) -> Option<Self> {
        Some(match value {
            0 => OutputTransform::Normal,
            1 => OutputTransform::Rot90,
            2 => OutputTransform::Rot180,
            3 => OutputTransform::Rot270,
            4 => OutputTransform::Flipped,
            5 => OutputTransform::Flipped90,
            6 => OutputTransform::Flipped180,
            7 => OutputTransform::Flipped270,
            _ => return None,
        })
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn is_flipped(self) -> bool {
        self.raw() >= Self::FLIPPED_BIT
    }

    /// Rotation component in 90° steps (0..=3).
    #[inline]
    pub const fn quarter_turns(self) -> u32 {
        self.raw() & 3
    }

    /// Whether the transform exchanges width and height.
    #[inline]
    pub const fn swaps_axes(self) -> bool {
        self.raw() & 1 == 1
    }

    /// The transform undoing this one.
    ///
    /// Flipped transforms are their own inverse; plain 90° and 270° swap.
    pub const fn invert(self) -> Self {
        match self {
            OutputTransform::Rot90 => OutputTransform::Rot270,
            OutputTransform::Rot270 => OutputTransform::Rot90,
            other => other,
        }
    }

    /// Applies the transform to `rect`, which lives in a `width` x `height`
    /// space before the transform.
    pub fn transform_rect(self, rect: Rect, width: i32, height: i32) -> Rect {
        let (w, h) = if self.swaps_axes() {
            (rect.height, rect.width)
        } else {
            (rect.width, rect.height)
        };

        let (x, y) = match self {
            OutputTransform::Normal => (rect.x, rect.y),
            OutputTransform::Rot90 => (height - rect.y - rect.height, rect.x),
            OutputTransform::Rot180 => (width - rect.x - rect.width, height - rect.y - rect.height),
            OutputTransform::Rot270 => (rect.y, width - rect.x - rect.width),
            OutputTransform::Flipped => (width - rect.x - rect.width, rect.y),
            OutputTransform::Flipped90 => (rect.y, rect.x),
            OutputTransform::Flipped180 => (rect.x, height - rect.y - rect.height),
            OutputTransform::Flipped270 => {
                (height - rect.y - rect.height, width - rect.x - rect.width)
            }
        };

        Rect::new(x, y, w, h)
    }

    /// 4x4 matrix for this transform, see [`output_matrix`].
    #[inline]
    pub fn matrix(self) -> Mat4 {
        output_matrix(self)
    }
}

/// Converts a discrete output transform into a 4x4 matrix.
///
/// Flipped transforms mirror X first; the rotation is then applied about Z
/// (-90° for 90, 180° for 180, +90° for 270). The result is `rotation * mirror`.
pub fn output_matrix(transform: OutputTransform) -> Mat4 {
    let mirror = if transform.is_flipped() {
        Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0))
    } else {
        Mat4::IDENTITY
    };

    let rotation = match transform.quarter_turns() {
        1 => Mat4::from_rotation_z(-FRAC_PI_2),
        2 => Mat4::from_rotation_z(PI),
        3 => Mat4::from_rotation_z(FRAC_PI_2),
        _ => Mat4::IDENTITY,
    };

    rotation * mirror
}
