use anyhow::Context;
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::coords::{ColorRgba, Geometry, Rect};
use crate::device::{Gles, RenderSession, RendererInit, ShaderStage};
use crate::error::RenderError;
use crate::gl_call;

use super::shaders::{DEFAULT_VERTEX, SOLID_FRAGMENT, TEXTURED_FRAGMENT};
use super::{OutputTarget, Program, RenderTarget, TextureFormat, TextureView};

bitflags! {
    /// Options for textured quad draws.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct TextureFlags: u32 {
        /// Mirror the quad horizontally.
        const INVERT_X = 1 << 0;
        /// Mirror the quad vertically.
        const INVERT_Y = 1 << 1;
        /// Sample the sub-rectangle given as texture geometry instead of the
        /// whole texture.
        const USE_TEX_GEOMETRY = 1 << 2;
    }
}

bitflags! {
    /// Buffers affected by [`Renderer::clear`].
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ClearMask: u32 {
        const COLOR = glow::COLOR_BUFFER_BIT;
        const DEPTH = glow::DEPTH_BUFFER_BIT;
        const STENCIL = glow::STENCIL_BUFFER_BIT;
    }
}

impl Default for ClearMask {
    fn default() -> Self {
        ClearMask::COLOR
    }
}

// ── quad data ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    pos: [f32; 2],
}

fn fan(geometry: Geometry) -> [QuadVertex; 4] {
    geometry.fan_corners().map(|pos| QuadVertex { pos })
}

/// Whole texture in fan order. Texture space is bottom-up, so v runs
/// opposite to the quad's Y.
const FULL_TEXTURE: Geometry = Geometry::new(0.0, 1.0, 1.0, 0.0);

const POSITION_ATTRIB: &str = "position";
const UV_ATTRIB: &str = "uvPosition";
const MVP_UNIFORM: &str = "MVP";
const COLOR_UNIFORM: &str = "color";

/// Viewport used when a pass only needs the context bound.
const CONTEXT_ONLY_VIEWPORT: (i32, i32) = (10, 10);

// ── compile helpers ───────────────────────────────────────────────────────

/// Compiles one shader stage.
///
/// On failure the source and compiler output are logged and the shader is
/// deleted; the returned error must not be used as a handle.
pub fn compile_shader(gl: &dyn Gles, source: &str, stage: ShaderStage) -> Result<u32, RenderError> {
    let shader = gl_call!(gl, create_shader(stage)).map_err(RenderError::Gl)?;
    gl_call!(gl, shader_source(shader, source));
    gl_call!(gl, compile_shader(shader));

    if !gl_call!(gl, shader_compile_status(shader)) {
        let log = gl_call!(gl, shader_info_log(shader));
        log::error!("failed to load {stage} shader:\n{source}\ncompiler output:\n{log}");
        gl_call!(gl, delete_shader(shader));
        return Err(RenderError::ShaderCompile { stage, log });
    }

    Ok(shader)
}

/// Compiles and links a program from vertex and fragment sources.
pub fn compile_program(gl: &dyn Gles, vertex_source: &str, fragment_source: &str) -> Result<u32, RenderError> {
    let vertex = compile_shader(gl, vertex_source, ShaderStage::Vertex)?;
    let fragment = match compile_shader(gl, fragment_source, ShaderStage::Fragment) {
        Ok(fragment) => fragment,
        Err(err) => {
            gl_call!(gl, delete_shader(vertex));
            return Err(err);
        }
    };

    let program = match gl_call!(gl, create_program()) {
        Ok(program) => program,
        Err(err) => {
            gl_call!(gl, delete_shader(vertex));
            gl_call!(gl, delete_shader(fragment));
            return Err(RenderError::Gl(err));
        }
    };

    gl_call!(gl, attach_shader(program, vertex));
    gl_call!(gl, attach_shader(program, fragment));
    gl_call!(gl, link_program(program));

    // Attached shaders live until the program is deleted.
    gl_call!(gl, delete_shader(vertex));
    gl_call!(gl, delete_shader(fragment));

    if !gl_call!(gl, program_link_status(program)) {
        let log = gl_call!(gl, program_info_log(program));
        log::error!("failed to link program:\n{log}");
        gl_call!(gl, delete_program(program));
        return Err(RenderError::ProgramLink { log });
    }

    Ok(program)
}

fn draw_blended_fan(gl: &dyn Gles) {
    gl_call!(gl, enable(glow::BLEND));
    gl_call!(gl, blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA));
    gl_call!(gl, draw_arrays(glow::TRIANGLE_FAN, 0, 4));
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Rendering context threaded through every draw: the GPU call surface, the
/// backend session and the built-in programs.
///
/// Drawing happens between [`render_begin`](Self::render_begin) (or one of
/// its variants) and [`render_end`](Self::render_end), on the thread owning
/// the GL context. Passes do not nest.
pub struct Renderer {
    gl: Box<dyn Gles>,
    session: Box<dyn RenderSession>,

    /// Textured quads, one variant per texture format.
    texture_program: Program,
    /// Solid fills, RGBA only.
    color_program: Program,

    output_bound: bool,
    in_pass: bool,
}

impl Renderer {
    /// Creates the renderer and compiles the built-in programs.
    ///
    /// Only `init.texture_filter` is read here. Error polling is a property
    /// of the backend (see [`GlowGles::new`](crate::device::GlowGles::new)),
    /// so `init.check_errors` must be passed there; a mismatch is logged.
    pub fn new(gl: Box<dyn Gles>, session: Box<dyn RenderSession>, init: RendererInit) -> anyhow::Result<Self> {
        let mut renderer = Self {
            gl,
            session,
            texture_program: Program::new(),
            color_program: Program::new(),
            output_bound: false,
            in_pass: false,
        };
        renderer.texture_program.set_texture_filter(init.texture_filter);
        if renderer.gl.poll_errors() != init.check_errors {
            log::warn!(
                "backend error polling is {}, renderer config asks for {}",
                renderer.gl.poll_errors(),
                init.check_errors
            );
        }

        renderer.render_begin_context();
        let built = renderer.compile_builtin();
        if built.is_err() {
            let gl = &*renderer.gl;
            renderer.texture_program.free_resources(gl);
            renderer.color_program.free_resources(gl);
        }
        renderer.render_end();
        built?;

        log::info!("renderer initialized");
        Ok(renderer)
    }

    fn compile_builtin(&mut self) -> anyhow::Result<()> {
        let gl = &*self.gl;
        self.texture_program.compile(gl, DEFAULT_VERTEX, TEXTURED_FRAGMENT);

        let solid = compile_program(gl, DEFAULT_VERTEX, SOLID_FRAGMENT)
            .context("failed to build solid-color program")?;
        self.color_program.set_simple(gl, solid, TextureFormat::Rgba);
        Ok(())
    }

    /// Deletes the built-in programs. Draws fail afterwards.
    pub fn shutdown(&mut self) {
        self.render_begin_context();
        let gl = &*self.gl;
        self.texture_program.free_resources(gl);
        self.color_program.free_resources(gl);
        self.render_end();
        log::debug!("renderer programs released");
    }

    /// GPU call surface, for allocating targets and custom programs.
    pub fn gl(&self) -> &dyn Gles {
        &*self.gl
    }

    pub fn texture_program(&self) -> &Program {
        &self.texture_program
    }

    pub fn color_program(&self) -> &Program {
        &self.color_program
    }

    /// Marks an output as owning the current context. While bound, passes
    /// do not force the session's own context current.
    pub fn bind_output(&mut self) {
        self.output_bound = true;
    }

    pub fn unbind_output(&mut self) {
        self.output_bound = false;
    }

    // ── passes ────────────────────────────────────────────────────────────

    /// Begins a pass that only needs the context (no drawing).
    pub fn render_begin_context(&mut self) {
        let (w, h) = CONTEXT_ONLY_VIEWPORT;
        self.render_begin(w, h, 0);
    }

    /// Begins a pass targeting `target` at its full size.
    pub fn render_begin_target(&mut self, target: &RenderTarget) {
        self.render_begin(target.width(), target.height(), target.framebuffer_or_default());
    }

    /// Begins a pass with the given viewport, bound to `framebuffer`
    /// (`0` for the default surface).
    pub fn render_begin(&mut self, width: i32, height: i32, framebuffer: u32) {
        if self.in_pass {
            log::warn!("render_begin called while a render pass is active");
        }

        if !self.output_bound && !self.session.is_current() {
            self.session.make_current();
        }

        self.session.begin(width, height);
        gl_call!(&*self.gl, bind_framebuffer(glow::FRAMEBUFFER, framebuffer));
        self.in_pass = true;
    }

    /// Ends the current pass: default framebuffer, no scissor, session ended.
    pub fn render_end(&mut self) {
        let gl = &*self.gl;
        gl_call!(gl, bind_framebuffer(glow::FRAMEBUFFER, 0));
        gl_call!(gl, disable(glow::SCISSOR_TEST));
        self.session.set_scissor(None);
        self.session.end();
        self.in_pass = false;
    }

    /// Whether a pass is open.
    pub fn in_pass(&self) -> bool {
        self.in_pass
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Clears the bound framebuffer.
    pub fn clear(&self, color: ColorRgba, mask: ClearMask) {
        let gl = &*self.gl;
        gl_call!(gl, clear_color(color.r, color.g, color.b, color.a));
        gl_call!(gl, clear(mask.bits()));
    }

    /// Draws `view` over `geometry`, transformed by `transform`, with each
    /// channel multiplied by `color`.
    ///
    /// `tex_geometry` is only read with [`TextureFlags::USE_TEX_GEOMETRY`].
    pub fn draw_textured_quad(
        &mut self,
        view: &TextureView,
        geometry: Geometry,
        tex_geometry: Geometry,
        transform: &Mat4,
        color: ColorRgba,
        flags: TextureFlags,
    ) -> Result<(), RenderError> {
        let gl = &*self.gl;
        let program = &mut self.texture_program;
        program.use_program(gl, view.format)?;

        let mut quad = geometry;
        if flags.contains(TextureFlags::INVERT_Y) {
            quad = quad.flipped_y();
        }
        if flags.contains(TextureFlags::INVERT_X) {
            quad = quad.flipped_x();
        }

        let tex = if flags.contains(TextureFlags::USE_TEX_GEOMETRY) {
            tex_geometry
        } else {
            FULL_TEXTURE
        };

        let vertices = fan(quad);
        let uvs = fan(tex);

        program.set_active_texture(gl, view);
        program.attrib_pointer(gl, POSITION_ATTRIB, 2, 0, bytemuck::cast_slice(&vertices));
        program.attrib_pointer(gl, UV_ATTRIB, 2, 0, bytemuck::cast_slice(&uvs));
        program.uniform_matrix4f(gl, MVP_UNIFORM, transform);
        program.uniform4f(gl, COLOR_UNIFORM, color.into());

        draw_blended_fan(gl);
        program.deactivate(gl);
        Ok(())
    }

    /// [`draw_textured_quad`](Self::draw_textured_quad) over an integer box,
    /// always sampling the whole texture.
    pub fn draw_texture_rect(
        &mut self,
        view: &TextureView,
        rect: Rect,
        transform: &Mat4,
        color: ColorRgba,
        flags: TextureFlags,
    ) -> Result<(), RenderError> {
        let flags = flags - TextureFlags::USE_TEX_GEOMETRY;
        self.draw_textured_quad(view, Geometry::from(rect), FULL_TEXTURE, transform, color, flags)
    }

    /// Draws `view` onto `target` at `rect`, given relative to the target's
    /// geometry, using the target's projection.
    pub fn draw_texture_on(
        &mut self,
        view: &TextureView,
        target: &OutputTarget,
        rect: Rect,
        color: ColorRgba,
        flags: TextureFlags,
    ) -> Result<(), RenderError> {
        let rect = rect.translated(target.geometry.x, target.geometry.y);
        let projection = target.orthographic_projection();
        self.draw_texture_rect(view, rect, &projection, color, flags)
    }

    /// Fills `rect` with `color`, transformed by `matrix`.
    pub fn draw_rectangle(&mut self, rect: Rect, color: ColorRgba, matrix: &Mat4) -> Result<(), RenderError> {
        let gl = &*self.gl;
        let program = &mut self.color_program;
        program.use_program(gl, TextureFormat::Rgba)?;

        let vertices = fan(Geometry::from(rect));
        program.attrib_pointer(gl, POSITION_ATTRIB, 2, 0, bytemuck::cast_slice(&vertices));
        program.uniform_matrix4f(gl, MVP_UNIFORM, matrix);
        program.uniform4f(gl, COLOR_UNIFORM, color.into());

        draw_blended_fan(gl);
        program.deactivate(gl);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::TextureFilter;
    use crate::device::recording::{GlCall, RecordingGles, RecordingSession, SessionEvent};
    use crate::render::OutputTransform;

    fn renderer() -> (Renderer, RecordingGles, RecordingSession) {
        let gl = RecordingGles::new();
        let session = RecordingSession::new();
        let renderer = Renderer::new(
            Box::new(gl.clone()),
            Box::new(session.clone()),
            RendererInit::default(),
        )
        .unwrap();
        gl.clear_calls();
        session.clear_events();
        (renderer, gl, session)
    }

    fn attrib_data(gl: &RecordingGles) -> Vec<Vec<f32>> {
        gl.calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::AttribData { data, .. } => Some(data),
                _ => None,
            })
            .collect()
    }

    fn last_matrix(gl: &RecordingGles) -> Option<[f32; 16]> {
        gl.calls().into_iter().rev().find_map(|c| match c {
            GlCall::UniformMatrix4 { value, .. } => Some(value),
            _ => None,
        })
    }

    // ── setup ─────────────────────────────────────────────────────────────

    #[test]
    fn new_compiles_builtin_programs_in_a_pass() {
        let gl = RecordingGles::new();
        let session = RecordingSession::new();
        let renderer = Renderer::new(
            Box::new(gl.clone()),
            Box::new(session.clone()),
            RendererInit::default(),
        )
        .unwrap();

        assert_eq!(gl.count(|c| matches!(c, GlCall::LinkProgram(_))), 4);
        for format in TextureFormat::ALL {
            assert!(renderer.texture_program().program_id(format).is_some());
        }
        assert!(renderer.color_program().program_id(TextureFormat::Rgba).is_some());
        assert!(renderer.color_program().program_id(TextureFormat::Rgbx).is_none());

        let events = session.events();
        assert_eq!(events.first(), Some(&SessionEvent::MakeCurrent));
        assert_eq!(events.get(1), Some(&SessionEvent::Begin(10, 10)));
        assert_eq!(events.last(), Some(&SessionEvent::End));
        assert!(!renderer.in_pass());
    }

    #[test]
    fn new_fails_when_solid_program_does_not_build() {
        let gl = RecordingGles::new();
        gl.fail_shaders_containing("gl_FragColor = color;");
        let session = RecordingSession::new();
        let result = Renderer::new(
            Box::new(gl.clone()),
            Box::new(session.clone()),
            RendererInit::default(),
        );
        assert!(result.is_err());

        // The textured variants built before the failure are deleted.
        let created: Vec<u32> = gl
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::CreateProgram(id) => Some(id),
                _ => None,
            })
            .collect();
        assert!(!created.is_empty());
        for id in created {
            assert!(!gl.is_live(id), "program {id} still live");
        }
        assert_eq!(gl.double_deletes(), 0);
        assert_eq!(session.events().last(), Some(&SessionEvent::End));
    }

    #[test]
    fn texture_filter_reaches_bound_views() {
        let gl = RecordingGles::new();
        let init = RendererInit { texture_filter: TextureFilter::Nearest, ..RendererInit::default() };
        let mut r = Renderer::new(Box::new(gl.clone()), Box::new(RecordingSession::new()), init).unwrap();
        gl.clear_calls();

        r.draw_texture_rect(&TextureView::new(4), Rect::new(0, 0, 2, 2), &Mat4::IDENTITY, ColorRgba::white(), TextureFlags::empty())
            .unwrap();

        assert!(gl.calls().contains(&GlCall::TexParameter {
            target: glow::TEXTURE_2D,
            pname: glow::TEXTURE_MIN_FILTER,
            value: glow::NEAREST as i32,
        }));
    }

    #[test]
    fn default_filter_is_linear() {
        let (mut r, gl, _session) = renderer();
        r.draw_texture_rect(&TextureView::new(4), Rect::new(0, 0, 2, 2), &Mat4::IDENTITY, ColorRgba::white(), TextureFlags::empty())
            .unwrap();

        let filters: Vec<i32> = gl
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::TexParameter { pname: glow::TEXTURE_MIN_FILTER, value, .. } => Some(value),
                _ => None,
            })
            .collect();
        assert_eq!(filters, vec![glow::LINEAR as i32]);
    }

    #[test]
    fn error_polling_stays_with_the_backend() {
        let gl = RecordingGles::new();
        let init = RendererInit { check_errors: false, ..RendererInit::default() };
        let r = Renderer::new(Box::new(gl), Box::new(RecordingSession::new()), init).unwrap();
        assert!(r.gl().poll_errors());
    }

    #[test]
    fn compile_shader_failure_returns_error_and_deletes() {
        let gl = RecordingGles::new();
        gl.fail_shaders_containing("broken");

        let err = compile_shader(&gl, "broken", ShaderStage::Fragment).unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { stage: ShaderStage::Fragment, .. }));
        assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteShader(_))), 1);
        assert_eq!(gl.double_deletes(), 0);
    }

    // ── passes ────────────────────────────────────────────────────────────

    #[test]
    fn pass_brackets_session_and_framebuffer() {
        let (mut r, gl, session) = renderer();

        r.render_begin(640, 480, 7);
        r.render_end();

        assert_eq!(
            session.events(),
            vec![
                SessionEvent::Begin(640, 480),
                SessionEvent::Scissor(None),
                SessionEvent::End,
            ]
        );
        assert_eq!(
            gl.calls(),
            vec![
                GlCall::BindFramebuffer { target: glow::FRAMEBUFFER, framebuffer: 7 },
                GlCall::BindFramebuffer { target: glow::FRAMEBUFFER, framebuffer: 0 },
                GlCall::Disable(glow::SCISSOR_TEST),
            ]
        );
    }

    #[test]
    fn bound_output_skips_make_current() {
        let (mut r, _gl, session) = renderer();
        session.set_current(false);

        r.bind_output();
        r.render_begin_context();
        r.render_end();
        assert!(!session.events().contains(&SessionEvent::MakeCurrent));

        r.unbind_output();
        r.render_begin_context();
        r.render_end();
        assert!(session.events().contains(&SessionEvent::MakeCurrent));
    }

    #[test]
    fn begin_target_uses_target_size() {
        let (mut r, gl, session) = renderer();
        let mut target = RenderTarget::new();
        target.allocate(r.gl(), 32, 16).unwrap();
        let fb = target.framebuffer().unwrap();
        gl.clear_calls();

        r.render_begin_target(&target);
        r.render_end();

        assert_eq!(session.events()[0], SessionEvent::Begin(32, 16));
        assert_eq!(
            gl.calls()[0],
            GlCall::BindFramebuffer { target: glow::FRAMEBUFFER, framebuffer: fb }
        );
        target.release(r.gl());
    }

    #[test]
    fn clear_sets_color_then_clears() {
        let (r, gl, _session) = renderer();
        r.clear(ColorRgba::new(0.1, 0.2, 0.3, 1.0), ClearMask::default());
        assert_eq!(
            gl.calls(),
            vec![
                GlCall::ClearColor([0.1, 0.2, 0.3, 1.0]),
                GlCall::Clear(glow::COLOR_BUFFER_BIT),
            ]
        );
    }

    // ── textured quads ────────────────────────────────────────────────────

    #[test]
    fn textured_quad_end_to_end() {
        let (mut r, gl, _session) = renderer();
        let rgba = r.texture_program().program_id(TextureFormat::Rgba).unwrap();

        r.render_begin(10, 10, 0);
        r.draw_texture_rect(
            &TextureView::new(3),
            Rect::new(0, 0, 10, 10),
            &Mat4::IDENTITY,
            ColorRgba::white(),
            TextureFlags::empty(),
        )
        .unwrap();
        r.render_end();

        let calls = gl.calls();
        assert!(calls.contains(&GlCall::UseProgram(rgba)));
        assert!(calls.contains(&GlCall::Enable(glow::BLEND)));
        assert!(calls.contains(&GlCall::BlendFunc(glow::ONE, glow::ONE_MINUS_SRC_ALPHA)));
        assert!(calls.contains(&GlCall::DrawArrays { mode: glow::TRIANGLE_FAN, first: 0, count: 4 }));
        assert!(calls.iter().any(|c| matches!(c, GlCall::Uniform4f { value: [1.0, 1.0, 1.0, 1.0], .. })));
        assert_eq!(last_matrix(&gl), Some(Mat4::IDENTITY.to_cols_array()));

        let data = attrib_data(&gl);
        assert_eq!(data[0], vec![0.0, 10.0, 10.0, 10.0, 10.0, 0.0, 0.0, 0.0]);
        assert_eq!(data[1], vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);

        // The program is deactivated right after the draw.
        let draw = calls.iter().position(|c| matches!(c, GlCall::DrawArrays { .. })).unwrap();
        assert_eq!(calls[draw + 1..].iter().filter(|c| matches!(c, GlCall::DisableAttrib(_))).count(), 2);
        assert!(r.texture_program().enabled_attribs().is_empty());
    }

    #[test]
    fn format_selects_program_variant() {
        let (mut r, gl, _session) = renderer();
        let external = r.texture_program().program_id(TextureFormat::External).unwrap();

        let view = TextureView {
            format: TextureFormat::External,
            target: crate::render::TextureTarget::External,
            ..TextureView::new(9)
        };
        r.draw_texture_rect(&view, Rect::new(0, 0, 1, 1), &Mat4::IDENTITY, ColorRgba::white(), TextureFlags::empty())
            .unwrap();

        assert!(gl.calls().contains(&GlCall::UseProgram(external)));
        assert!(gl.calls().contains(&GlCall::BindTexture {
            target: crate::render::TEXTURE_EXTERNAL_OES,
            texture: 9,
        }));
    }

    #[test]
    fn invert_flags_flip_the_quad() {
        let (mut r, gl, _session) = renderer();
        let flags = TextureFlags::INVERT_X | TextureFlags::INVERT_Y;
        r.draw_texture_rect(&TextureView::new(1), Rect::new(0, 0, 4, 2), &Mat4::IDENTITY, ColorRgba::white(), flags)
            .unwrap();

        // (x1, y1, x2, y2) = (4, 2, 0, 0) after both flips.
        assert_eq!(attrib_data(&gl)[0], vec![4.0, 0.0, 0.0, 0.0, 0.0, 2.0, 4.0, 2.0]);
    }

    #[test]
    fn tex_geometry_only_with_flag() {
        let (mut r, gl, _session) = renderer();
        let view = TextureView::new(1);
        let quad = Geometry::new(0.0, 0.0, 1.0, 1.0);
        let sub = Geometry::new(0.25, 0.5, 0.75, 1.0);

        r.draw_textured_quad(&view, quad, sub, &Mat4::IDENTITY, ColorRgba::white(), TextureFlags::USE_TEX_GEOMETRY)
            .unwrap();
        assert_eq!(attrib_data(&gl)[1], vec![0.25, 1.0, 0.75, 1.0, 0.75, 0.5, 0.25, 0.5]);

        gl.clear_calls();
        r.draw_texture_rect(&view, Rect::new(0, 0, 1, 1), &Mat4::IDENTITY, ColorRgba::white(), TextureFlags::USE_TEX_GEOMETRY)
            .unwrap();
        assert_eq!(attrib_data(&gl)[1], vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn draw_on_output_offsets_and_projects() {
        let (mut r, gl, _session) = renderer();
        let output = OutputTarget::new(Rect::new(100, 50, 200, 100), OutputTransform::Normal, 1.0);

        r.draw_texture_on(&TextureView::new(1), &output, Rect::new(0, 0, 10, 10), ColorRgba::white(), TextureFlags::empty())
            .unwrap();

        assert_eq!(
            attrib_data(&gl)[0],
            vec![100.0, 60.0, 110.0, 60.0, 110.0, 50.0, 100.0, 50.0]
        );
        assert_eq!(last_matrix(&gl), Some(output.orthographic_projection().to_cols_array()));
    }

    // ── rectangles ────────────────────────────────────────────────────────

    #[test]
    fn rectangle_uses_solid_program_without_uvs() {
        let (mut r, gl, _session) = renderer();
        let solid = r.color_program().program_id(TextureFormat::Rgba).unwrap();

        r.draw_rectangle(Rect::new(1, 2, 3, 4), ColorRgba::new(1.0, 0.0, 0.0, 1.0), &Mat4::IDENTITY)
            .unwrap();

        assert!(gl.calls().contains(&GlCall::UseProgram(solid)));
        let data = attrib_data(&gl);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0], vec![1.0, 6.0, 4.0, 6.0, 4.0, 2.0, 1.0, 2.0]);
        assert!(gl.calls().contains(&GlCall::DrawArrays { mode: glow::TRIANGLE_FAN, first: 0, count: 4 }));
        assert_eq!(gl.calls().last(), Some(&GlCall::UseProgram(0)));
    }

    #[test]
    fn draws_fail_after_shutdown() {
        let (mut r, gl, _session) = renderer();
        r.shutdown();
        assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteProgram(_))), 4);

        assert_eq!(
            r.draw_rectangle(Rect::new(0, 0, 1, 1), ColorRgba::white(), &Mat4::IDENTITY),
            Err(RenderError::NoProgram { format: TextureFormat::Rgba })
        );
        assert_eq!(
            r.draw_texture_rect(&TextureView::new(1), Rect::new(0, 0, 1, 1), &Mat4::IDENTITY, ColorRgba::white(), TextureFlags::empty()),
            Err(RenderError::NoProgram { format: TextureFormat::Rgba })
        );
    }
}
