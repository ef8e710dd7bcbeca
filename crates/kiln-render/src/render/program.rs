use std::collections::{BTreeSet, HashMap};

use crate::device::{Gles, TextureFilter};
use crate::error::RenderError;
use crate::gl_call;

use super::pipeline::compile_program;
use super::shaders;
use super::{TextureFormat, TextureView};

/// Per-format program slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
enum Slot {
    #[default]
    Empty,
    Ready(u32),
    /// Compilation or linking failed; reported on first use.
    Failed,
}

impl Slot {
    fn id(self) -> Option<u32> {
        match self {
            Slot::Ready(id) => Some(id),
            _ => None,
        }
    }
}

type LocationCache = HashMap<String, Option<u32>>;

/// One logical shader effect compiled into a GL program per texture format.
///
/// Uniform and attribute locations are resolved on first use and cached per
/// format, so a location is only ever reused with the program it was
/// resolved against.
///
/// All methods expect to run inside a render pass. Every
/// [`use_program`](Self::use_program) must be paired with one
/// [`deactivate`](Self::deactivate): enabled attributes and divisors are not
/// reset between unrelated draws otherwise.
#[derive(Debug, Default)]
pub struct Program {
    slots: [Slot; TextureFormat::COUNT],
    uniforms: [LocationCache; TextureFormat::COUNT],
    attribs: [LocationCache; TextureFormat::COUNT],
    active: TextureFormat,
    active_attribs: BTreeSet<u32>,
    active_divisors: BTreeSet<u32>,
    texture_filter: TextureFilter,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter applied by [`set_active_texture`](Self::set_active_texture).
    pub fn set_texture_filter(&mut self, filter: TextureFilter) {
        self.texture_filter = filter;
    }

    /// Builds one program per texture format from a shared vertex source and
    /// a fragment template (see [`shaders`] for the placeholders).
    ///
    /// A format whose program fails to build is logged and marked failed;
    /// the other formats stay usable.
    pub fn compile(&mut self, gl: &dyn Gles, vertex_source: &str, fragment_source: &str) {
        self.free_resources(gl);

        for format in TextureFormat::ALL {
            let fragment = shaders::specialize(fragment_source, format);
            self.slots[format.index()] = match compile_program(gl, vertex_source, &fragment) {
                Ok(id) => Slot::Ready(id),
                Err(err) => {
                    log::error!("failed to build {format:?} program variant: {err}");
                    Slot::Failed
                }
            };
        }
    }

    /// Registers a pre-built program for `format` only.
    ///
    /// Any previously held programs are deleted first.
    pub fn set_simple(&mut self, gl: &dyn Gles, program: u32, format: TextureFormat) {
        self.free_resources(gl);
        self.slots[format.index()] = Slot::Ready(program);
    }

    /// Deletes every program and clears the location caches. Idempotent.
    pub fn free_resources(&mut self, gl: &dyn Gles) {
        for slot in &mut self.slots {
            if let Some(id) = slot.id() {
                gl_call!(gl, delete_program(id));
            }
            *slot = Slot::Empty;
        }

        for cache in self.uniforms.iter_mut().chain(self.attribs.iter_mut()) {
            cache.clear();
        }
    }

    /// Activates the program for `format`.
    pub fn use_program(&mut self, gl: &dyn Gles, format: TextureFormat) -> Result<(), RenderError> {
        let id = match self.slots[format.index()] {
            Slot::Ready(id) => id,
            Slot::Empty => return Err(RenderError::NoProgram { format }),
            Slot::Failed => return Err(RenderError::ProgramFailed { format }),
        };

        gl_call!(gl, use_program(id));
        self.active = format;
        Ok(())
    }

    /// GL program name for `format`, if one is registered and built.
    pub fn program_id(&self, format: TextureFormat) -> Option<u32> {
        self.slots[format.index()].id()
    }

    /// Format selected by the last successful [`use_program`](Self::use_program).
    pub fn active_format(&self) -> TextureFormat {
        self.active
    }

    /// Attribute locations enabled since the last activation.
    pub fn enabled_attribs(&self) -> &BTreeSet<u32> {
        &self.active_attribs
    }

    /// Attribute locations with a non-default divisor.
    pub fn divisor_attribs(&self) -> &BTreeSet<u32> {
        &self.active_divisors
    }

    // ── location lookup ───────────────────────────────────────────────────

    fn active_id(&self) -> u32 {
        self.slots[self.active.index()].id().unwrap_or(0)
    }

    fn uniform_loc(&mut self, gl: &dyn Gles, name: &str) -> Option<u32> {
        let idx = self.active.index();
        if let Some(loc) = self.uniforms[idx].get(name) {
            return *loc;
        }

        let loc = gl_call!(gl, uniform_location(self.active_id(), name));
        if loc.is_none() {
            log::debug!("uniform {name} not found in {:?} program", self.active);
        }
        self.uniforms[idx].insert(name.to_owned(), loc);
        loc
    }

    fn attrib_loc(&mut self, gl: &dyn Gles, name: &str) -> Option<u32> {
        let idx = self.active.index();
        if let Some(loc) = self.attribs[idx].get(name) {
            return *loc;
        }

        let loc = gl_call!(gl, attrib_location(self.active_id(), name));
        if loc.is_none() {
            log::debug!("attribute {name} not found in {:?} program", self.active);
        }
        self.attribs[idx].insert(name.to_owned(), loc);
        loc
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    pub fn uniform1i(&mut self, gl: &dyn Gles, name: &str, value: i32) {
        if let Some(loc) = self.uniform_loc(gl, name) {
            gl_call!(gl, uniform_1_i32(loc, value));
        }
    }

    pub fn uniform1f(&mut self, gl: &dyn Gles, name: &str, value: f32) {
        if let Some(loc) = self.uniform_loc(gl, name) {
            gl_call!(gl, uniform_1_f32(loc, value));
        }
    }

    pub fn uniform2f(&mut self, gl: &dyn Gles, name: &str, x: f32, y: f32) {
        if let Some(loc) = self.uniform_loc(gl, name) {
            gl_call!(gl, uniform_2_f32(loc, x, y));
        }
    }

    pub fn uniform4f(&mut self, gl: &dyn Gles, name: &str, value: glam::Vec4) {
        if let Some(loc) = self.uniform_loc(gl, name) {
            gl_call!(gl, uniform_4_f32(loc, value.x, value.y, value.z, value.w));
        }
    }

    pub fn uniform_matrix4f(&mut self, gl: &dyn Gles, name: &str, value: &glam::Mat4) {
        if let Some(loc) = self.uniform_loc(gl, name) {
            gl_call!(gl, uniform_matrix_4_f32(loc, &value.to_cols_array()));
        }
    }

    // ── attributes ────────────────────────────────────────────────────────

    /// Enables attribute `name` and streams `data` into it
    /// (`size` components per vertex, `stride` in bytes).
    pub fn attrib_pointer(&mut self, gl: &dyn Gles, name: &str, size: i32, stride: i32, data: &[f32]) {
        let Some(loc) = self.attrib_loc(gl, name) else { return };
        self.active_attribs.insert(loc);

        gl_call!(gl, enable_vertex_attrib_array(loc));
        gl_call!(gl, vertex_attrib_f32(loc, size, stride, data));
    }

    /// Sets the per-instance divisor of attribute `name`.
    pub fn attrib_divisor(&mut self, gl: &dyn Gles, name: &str, divisor: u32) {
        let Some(loc) = self.attrib_loc(gl, name) else { return };
        self.active_divisors.insert(loc);

        gl_call!(gl, vertex_attrib_divisor(loc, divisor));
    }

    // ── texture ───────────────────────────────────────────────────────────

    /// Binds `view` to texture unit 0 and sets the Y-flip uniforms read by
    /// the built-in `get_pixel`. Only meaningful for templated programs.
    pub fn set_active_texture(&mut self, gl: &dyn Gles, view: &TextureView) {
        let target = view.target.gl_enum();
        gl_call!(gl, active_texture(glow::TEXTURE0));
        gl_call!(gl, bind_texture(target, view.texture));
        gl_call!(gl, tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, self.texture_filter.gl_enum()));

        let (base, mult) = if view.invert_y { (1.0, -1.0) } else { (0.0, 1.0) };
        self.uniform1f(gl, shaders::Y_BASE_UNIFORM, base);
        self.uniform1f(gl, shaders::Y_MULT_UNIFORM, mult);
    }

    /// Undoes the attribute state set since activation and unbinds the program.
    pub fn deactivate(&mut self, gl: &dyn Gles) {
        for &loc in &self.active_divisors {
            gl_call!(gl, vertex_attrib_divisor(loc, 0));
        }

        for &loc in &self.active_attribs {
            gl_call!(gl, disable_vertex_attrib_array(loc));
        }

        self.active_divisors.clear();
        self.active_attribs.clear();
        gl_call!(gl, use_program(0));
    }
}
