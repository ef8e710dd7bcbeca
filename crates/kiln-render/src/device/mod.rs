//! GPU call surface + rendering session.
//!
//! This module is responsible for:
//! - the `Gles` trait every render component issues its GPU calls through
//! - polling GPU errors after each call (`gl_call!`)
//! - the `glow` backed implementation used in production
//! - the `RenderSession` contract owned by the backend-integration layer
//! - an instrumented recording backend for tests and headless callers

mod check;
mod gles;
mod glow_backend;
mod init;
pub mod recording;
mod session;

pub use check::{check_error, format_gl_error, gl_error_string};
pub use gles::{Gles, ShaderStage};
pub use glow_backend::GlowGles;
pub use init::{RendererInit, TextureFilter};
pub use session::RenderSession;
