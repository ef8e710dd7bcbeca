//! Kiln rendering crate.
//!
//! GPU rendering layer for the kiln compositor: render targets, output
//! coordinate conversions, texture views and per-format shader programs
//! over an OpenGL ES context.

pub mod coords;
pub mod device;
pub mod error;
pub mod logging;
pub mod render;

pub use error::RenderError;
