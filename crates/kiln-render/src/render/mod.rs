//! Compositor-side rendering: offscreen targets, output targets, texture
//! views and the shader program multiplexer, tied together by [`Renderer`].
//!
//! Convention:
//! - Layout and damage boxes are in logical pixels (top-left origin, +Y down).
//! - Framebuffer boxes are in physical pixels after scale and output transform.
//! - Texture space is bottom-up; [`TextureView::invert_y`] flips sampling.

mod output;
mod pipeline;
mod program;
pub mod shaders;
mod target;
mod texture;
mod transform;

pub use output::OutputTarget;
pub use pipeline::{ClearMask, Renderer, TextureFlags, compile_program, compile_shader};
pub use program::Program;
pub use target::RenderTarget;
pub use texture::{
    ImportedTexture, TEXTURE_EXTERNAL_OES, TextureFormat, TextureImport, TextureTarget, TextureView,
};
pub use transform::{OutputTransform, output_matrix};
