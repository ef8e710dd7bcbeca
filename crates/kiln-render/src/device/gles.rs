use std::fmt;

/// Shader stage passed to [`Gles::create_shader`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    #[inline]
    pub const fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// The subset of OpenGL ES the rendering layer issues.
///
/// Object names are raw `u32` GL names; `0` is the implicit default object
/// (default framebuffer, unbound program/texture). Enum arguments take the
/// GL constants re-exported by `glow`.
///
/// Every method assumes the GL context is current on the calling thread.
/// Implementations use interior mutability where they need state: the GL
/// context itself is a shared, stateful object.
pub trait Gles {
    fn get_error(&self) -> u32;

    /// Whether `gl_call!` should poll `get_error` after each call.
    fn poll_errors(&self) -> bool {
        cfg!(debug_assertions)
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<u32, String>;
    fn delete_texture(&self, texture: u32);
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: u32);
    fn tex_parameter_i32(&self, target: u32, pname: u32, value: i32);
    /// Allocates uninitialized RGBA8 storage for the bound 2D texture.
    fn tex_storage_rgba(&self, width: i32, height: i32);

    // ── framebuffers ──────────────────────────────────────────────────────

    fn create_framebuffer(&self) -> Result<u32, String>;
    fn delete_framebuffer(&self, framebuffer: u32);
    fn bind_framebuffer(&self, target: u32, framebuffer: u32);
    fn framebuffer_texture_2d(&self, target: u32, attachment: u32, tex_target: u32, texture: u32);
    fn check_framebuffer_status(&self, target: u32) -> u32;

    // ── fixed-function state ──────────────────────────────────────────────

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    fn enable(&self, cap: u32);
    fn disable(&self, cap: u32);
    fn blend_func(&self, src: u32, dst: u32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: u32);
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);

    // ── shaders / programs ────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String>;
    fn shader_source(&self, shader: u32, source: &str);
    fn compile_shader(&self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&self, shader: u32);

    fn create_program(&self) -> Result<u32, String>;
    fn attach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn delete_program(&self, program: u32);
    fn use_program(&self, program: u32);

    // ── uniforms / attributes ─────────────────────────────────────────────

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32>;
    fn attrib_location(&self, program: u32, name: &str) -> Option<u32>;

    fn uniform_1_i32(&self, location: u32, x: i32);
    fn uniform_1_f32(&self, location: u32, x: f32);
    fn uniform_2_f32(&self, location: u32, x: f32, y: f32);
    fn uniform_4_f32(&self, location: u32, x: f32, y: f32, z: f32, w: f32);
    /// Column-major 4x4 matrix.
    fn uniform_matrix_4_f32(&self, location: u32, value: &[f32; 16]);

    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);
    /// Streams `data` as float components of attribute `index`.
    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, data: &[f32]);
    fn vertex_attrib_divisor(&self, index: u32, divisor: u32);
}
