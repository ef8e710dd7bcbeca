//! Coordinate and geometry types shared by render targets and the pipeline.
//!
//! Compositor space:
//! - Integer logical units, output-local
//! - Origin top-left
//! - +X right, +Y down
//!
//! Damage and framebuffer space reuse `Rect`; which space a value lives in is
//! carried by the function that produced it, not by the type.

mod color;
mod geometry;
mod rect;
mod region;

pub use color::ColorRgba;
pub use geometry::Geometry;
pub use rect::Rect;
pub use region::Region;
