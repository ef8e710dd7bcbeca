use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroU32;

use glow::HasContext;

use super::{Gles, RendererInit, ShaderStage};

/// [`Gles`] implementation over a `glow` OpenGL ES context.
///
/// Vertex attribute data is streamed through one array buffer per attribute
/// location, created lazily and reused across draws.
pub struct GlowGles {
    gl: glow::Context,
    check_errors: bool,
    attrib_buffers: RefCell<HashMap<u32, glow::NativeBuffer>>,
}

fn name<T>(id: u32, wrap: fn(NonZeroU32) -> T) -> Option<T> {
    NonZeroU32::new(id).map(wrap)
}

impl GlowGles {
    /// Wraps a loaded `glow` context.
    ///
    /// # Safety
    ///
    /// `gl` must belong to a GLES context that is current whenever a method of
    /// the returned value is invoked, and every GL name passed to it must have
    /// been created by that context.
    pub unsafe fn new(gl: glow::Context, init: &RendererInit) -> Self {
        log::debug!("gles: wrapping glow context (check_errors = {})", init.check_errors);
        Self {
            gl,
            check_errors: init.check_errors,
            attrib_buffers: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the wrapped context.
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }

    /// Deletes the attribute streaming buffers. Call with the context current
    /// before dropping.
    pub fn release_buffers(&self) {
        for (_, buffer) in self.attrib_buffers.borrow_mut().drain() {
            unsafe { self.gl.delete_buffer(buffer) };
        }
    }

    fn attrib_buffer(&self, index: u32) -> Option<glow::NativeBuffer> {
        let mut buffers = self.attrib_buffers.borrow_mut();
        if let Some(buffer) = buffers.get(&index) {
            return Some(*buffer);
        }

        match unsafe { self.gl.create_buffer() } {
            Ok(buffer) => {
                buffers.insert(index, buffer);
                Some(buffer)
            }
            Err(err) => {
                log::error!("gles: failed to create attribute buffer: {err}");
                None
            }
        }
    }
}

impl Gles for GlowGles {
    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }

    fn poll_errors(&self) -> bool {
        self.check_errors
    }

    fn create_texture(&self) -> Result<u32, String> {
        unsafe { self.gl.create_texture() }.map(|t| t.0.get())
    }

    fn delete_texture(&self, texture: u32) {
        if let Some(t) = name(texture, glow::NativeTexture) {
            unsafe { self.gl.delete_texture(t) };
        }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(unit) };
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        unsafe { self.gl.bind_texture(target, name(texture, glow::NativeTexture)) };
    }

    fn tex_parameter_i32(&self, target: u32, pname: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(target, pname, value) };
    }

    fn tex_storage_rgba(&self, width: i32, height: i32) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(None),
            );
        }
    }

    fn create_framebuffer(&self) -> Result<u32, String> {
        unsafe { self.gl.create_framebuffer() }.map(|f| f.0.get())
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        if let Some(f) = name(framebuffer, glow::NativeFramebuffer) {
            unsafe { self.gl.delete_framebuffer(f) };
        }
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: u32) {
        unsafe {
            self.gl
                .bind_framebuffer(target, name(framebuffer, glow::NativeFramebuffer))
        };
    }

    fn framebuffer_texture_2d(&self, target: u32, attachment: u32, tex_target: u32, texture: u32) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                target,
                attachment,
                tex_target,
                name(texture, glow::NativeTexture),
                0,
            )
        };
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        unsafe { self.gl.check_framebuffer_status(target) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) };
    }

    fn enable(&self, cap: u32) {
        unsafe { self.gl.enable(cap) };
    }

    fn disable(&self, cap: u32) {
        unsafe { self.gl.disable(cap) };
    }

    fn blend_func(&self, src: u32, dst: u32) {
        unsafe { self.gl.blend_func(src, dst) };
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { self.gl.clear_color(r, g, b, a) };
    }

    fn clear(&self, mask: u32) {
        unsafe { self.gl.clear(mask) };
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode, first, count) };
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        unsafe { self.gl.create_shader(stage.gl_enum()) }.map(|s| s.0.get())
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = name(shader, glow::NativeShader) {
            unsafe { self.gl.shader_source(s, source) };
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = name(shader, glow::NativeShader) {
            unsafe { self.gl.compile_shader(s) };
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        name(shader, glow::NativeShader)
            .is_some_and(|s| unsafe { self.gl.get_shader_compile_status(s) })
    }

    fn shader_info_log(&self, shader: u32) -> String {
        name(shader, glow::NativeShader)
            .map(|s| unsafe { self.gl.get_shader_info_log(s) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        if let Some(s) = name(shader, glow::NativeShader) {
            unsafe { self.gl.delete_shader(s) };
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        unsafe { self.gl.create_program() }.map(|p| p.0.get())
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let (Some(p), Some(s)) = (
            name(program, glow::NativeProgram),
            name(shader, glow::NativeShader),
        ) {
            unsafe { self.gl.attach_shader(p, s) };
        }
    }

    fn link_program(&self, program: u32) {
        if let Some(p) = name(program, glow::NativeProgram) {
            unsafe { self.gl.link_program(p) };
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        name(program, glow::NativeProgram)
            .is_some_and(|p| unsafe { self.gl.get_program_link_status(p) })
    }

    fn program_info_log(&self, program: u32) -> String {
        name(program, glow::NativeProgram)
            .map(|p| unsafe { self.gl.get_program_info_log(p) })
            .unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        if let Some(p) = name(program, glow::NativeProgram) {
            unsafe { self.gl.delete_program(p) };
        }
    }

    fn use_program(&self, program: u32) {
        unsafe { self.gl.use_program(name(program, glow::NativeProgram)) };
    }

    fn uniform_location(&self, program: u32, name_str: &str) -> Option<u32> {
        let p = name(program, glow::NativeProgram)?;
        unsafe { self.gl.get_uniform_location(p, name_str) }.map(|l| l.0)
    }

    fn attrib_location(&self, program: u32, name_str: &str) -> Option<u32> {
        let p = name(program, glow::NativeProgram)?;
        unsafe { self.gl.get_attrib_location(p, name_str) }
    }

    fn uniform_1_i32(&self, location: u32, x: i32) {
        let loc = glow::NativeUniformLocation(location);
        unsafe { self.gl.uniform_1_i32(Some(&loc), x) };
    }

    fn uniform_1_f32(&self, location: u32, x: f32) {
        let loc = glow::NativeUniformLocation(location);
        unsafe { self.gl.uniform_1_f32(Some(&loc), x) };
    }

    fn uniform_2_f32(&self, location: u32, x: f32, y: f32) {
        let loc = glow::NativeUniformLocation(location);
        unsafe { self.gl.uniform_2_f32(Some(&loc), x, y) };
    }

    fn uniform_4_f32(&self, location: u32, x: f32, y: f32, z: f32, w: f32) {
        let loc = glow::NativeUniformLocation(location);
        unsafe { self.gl.uniform_4_f32(Some(&loc), x, y, z, w) };
    }

    fn uniform_matrix_4_f32(&self, location: u32, value: &[f32; 16]) {
        let loc = glow::NativeUniformLocation(location);
        unsafe { self.gl.uniform_matrix_4_f32_slice(Some(&loc), false, value) };
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) };
    }

    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, data: &[f32]) {
        let Some(buffer) = self.attrib_buffer(index) else { return };
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STREAM_DRAW,
            );
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, 0);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        unsafe { self.gl.vertex_attrib_divisor(index, divisor) };
    }
}
