use thiserror::Error;

use crate::device::ShaderStage;
use crate::render::TextureFormat;

/// Errors surfaced by the rendering layer.
///
/// GPU-call errors are not represented here: they are polled, logged and
/// swallowed (see [`gl_call!`](crate::gl_call)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// `use_program` was called for a format class with no registered program.
    #[error("no program registered for texture format {format:?}")]
    NoProgram { format: TextureFormat },

    /// The program for this format class failed to compile or link.
    #[error("program for texture format {format:?} failed to compile or link")]
    ProgramFailed { format: TextureFormat },

    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("failed to link program: {log}")]
    ProgramLink { log: String },

    /// The framebuffer completeness check failed after (re)allocation.
    #[error("framebuffer incomplete (status {status:#x})")]
    IncompleteFramebuffer { status: u32 },

    /// Box conversions are only defined for the discrete transform + scale pair.
    #[error("box conversion is unsupported with a non-standard output transform")]
    UnsupportedTransform,

    /// The import provider does not recognize the handle as one of its textures.
    #[error("texture handle {0:#x} was not created by the GLES importer")]
    ForeignTexture(u64),

    /// The backend refused to create a GPU object.
    #[error("GL object creation failed: {0}")]
    Gl(String),
}
