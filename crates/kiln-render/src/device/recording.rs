//! Instrumented in-memory GPU backend.
//!
//! `RecordingGles` implements [`Gles`] without a GPU: every call is appended to
//! a shared log, object names are handed out from a counter, and failures can
//! be injected. `RecordingSession` does the same for [`RenderSession`].
//!
//! Both types are cheap handles over shared state; clone one before moving
//! it into a `Renderer` to keep inspecting the log afterwards.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::coords::Rect;

use super::{Gles, RenderSession, ShaderStage};

/// One recorded GPU call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateTexture(u32),
    DeleteTexture(u32),
    ActiveTexture(u32),
    BindTexture { target: u32, texture: u32 },
    TexParameter { target: u32, pname: u32, value: i32 },
    TexStorage { width: i32, height: i32 },
    CreateFramebuffer(u32),
    DeleteFramebuffer(u32),
    BindFramebuffer { target: u32, framebuffer: u32 },
    FramebufferTexture2d { texture: u32 },
    CheckFramebufferStatus,
    Viewport(i32, i32, i32, i32),
    Scissor(i32, i32, i32, i32),
    Enable(u32),
    Disable(u32),
    BlendFunc(u32, u32),
    ClearColor([f32; 4]),
    Clear(u32),
    DrawArrays { mode: u32, first: i32, count: i32 },
    CreateShader { shader: u32, stage: ShaderStage },
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(u32),
    UniformLocation { program: u32, name: String },
    AttribLocation { program: u32, name: String },
    Uniform1i { location: u32, value: i32 },
    Uniform1f { location: u32, value: f32 },
    Uniform2f { location: u32, value: [f32; 2] },
    Uniform4f { location: u32, value: [f32; 4] },
    UniformMatrix4 { location: u32, value: [f32; 16] },
    EnableAttrib(u32),
    DisableAttrib(u32),
    AttribData { index: u32, size: i32, stride: i32, data: Vec<f32> },
    AttribDivisor { index: u32, divisor: u32 },
}

#[derive(Debug)]
struct GlState {
    calls: Vec<GlCall>,
    next_name: u32,
    pending_errors: VecDeque<u32>,
    framebuffer_status: u32,
    shader_fail_marker: Option<String>,
    fail_links: bool,
    sources: HashMap<u32, String>,
    compiled: HashMap<u32, bool>,
    program_shaders: HashMap<u32, Vec<u32>>,
    linked: HashMap<u32, bool>,
    locations: HashMap<(u32, String), u32>,
    live: HashSet<u32>,
    double_deletes: usize,
}

impl Default for GlState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            next_name: 1,
            pending_errors: VecDeque::new(),
            framebuffer_status: glow::FRAMEBUFFER_COMPLETE,
            shader_fail_marker: None,
            fail_links: false,
            sources: HashMap::new(),
            compiled: HashMap::new(),
            program_shaders: HashMap::new(),
            linked: HashMap::new(),
            locations: HashMap::new(),
            live: HashSet::new(),
            double_deletes: 0,
        }
    }
}

impl GlState {
    fn alloc(&mut self) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        self.live.insert(name);
        name
    }

    fn free(&mut self, name: u32) {
        if !self.live.remove(&name) {
            self.double_deletes += 1;
        }
    }

    fn location(&mut self, program: u32, name: &str) -> u32 {
        let next = self.locations.len() as u32;
        *self.locations.entry((program, name.to_owned())).or_insert(next)
    }
}

/// Recording [`Gles`] backend.
#[derive(Debug, Clone, Default)]
pub struct RecordingGles {
    state: Rc<RefCell<GlState>>,
}

impl RecordingGles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every call recorded so far.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Queues `err` to be returned by the next `get_error`.
    pub fn inject_error(&self, err: u32) {
        self.state.borrow_mut().pending_errors.push_back(err);
    }

    /// Status returned by subsequent framebuffer completeness checks.
    pub fn set_framebuffer_status(&self, status: u32) {
        self.state.borrow_mut().framebuffer_status = status;
    }

    /// Shaders whose source contains `marker` fail to compile.
    pub fn fail_shaders_containing(&self, marker: &str) {
        self.state.borrow_mut().shader_fail_marker = Some(marker.to_owned());
    }

    /// Every subsequent link fails.
    pub fn fail_links(&self, fail: bool) {
        self.state.borrow_mut().fail_links = fail;
    }

    /// Source last uploaded for `shader`.
    pub fn shader_source_of(&self, shader: u32) -> Option<String> {
        self.state.borrow().sources.get(&shader).cloned()
    }

    /// Sources of the shaders attached to `program`, in attach order.
    pub fn program_sources(&self, program: u32) -> Vec<String> {
        let state = self.state.borrow();
        state
            .program_shaders
            .get(&program)
            .map(|shaders| {
                shaders
                    .iter()
                    .filter_map(|s| state.sources.get(s).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `name` was created and not yet deleted.
    pub fn is_live(&self, name: u32) -> bool {
        self.state.borrow().live.contains(&name)
    }

    /// Deletions of names that were not live (double frees, foreign names).
    pub fn double_deletes(&self) -> usize {
        self.state.borrow().double_deletes
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Gles for RecordingGles {
    fn get_error(&self) -> u32 {
        self.state
            .borrow_mut()
            .pending_errors
            .pop_front()
            .unwrap_or(glow::NO_ERROR)
    }

    fn poll_errors(&self) -> bool {
        true
    }

    fn create_texture(&self) -> Result<u32, String> {
        let name = self.state.borrow_mut().alloc();
        self.record(GlCall::CreateTexture(name));
        Ok(name)
    }

    fn delete_texture(&self, texture: u32) {
        self.state.borrow_mut().free(texture);
        self.record(GlCall::DeleteTexture(texture));
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.record(GlCall::BindTexture { target, texture });
    }

    fn tex_parameter_i32(&self, target: u32, pname: u32, value: i32) {
        self.record(GlCall::TexParameter { target, pname, value });
    }

    fn tex_storage_rgba(&self, width: i32, height: i32) {
        self.record(GlCall::TexStorage { width, height });
    }

    fn create_framebuffer(&self) -> Result<u32, String> {
        let name = self.state.borrow_mut().alloc();
        self.record(GlCall::CreateFramebuffer(name));
        Ok(name)
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.state.borrow_mut().free(framebuffer);
        self.record(GlCall::DeleteFramebuffer(framebuffer));
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: u32) {
        self.record(GlCall::BindFramebuffer { target, framebuffer });
    }

    fn framebuffer_texture_2d(&self, _target: u32, _attachment: u32, _tex_target: u32, texture: u32) {
        self.record(GlCall::FramebufferTexture2d { texture });
    }

    fn check_framebuffer_status(&self, _target: u32) -> u32 {
        self.record(GlCall::CheckFramebufferStatus);
        self.state.borrow().framebuffer_status
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Scissor(x, y, width, height));
    }

    fn enable(&self, cap: u32) {
        self.record(GlCall::Enable(cap));
    }

    fn disable(&self, cap: u32) {
        self.record(GlCall::Disable(cap));
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.record(GlCall::BlendFunc(src, dst));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let shader = self.state.borrow_mut().alloc();
        self.record(GlCall::CreateShader { shader, stage });
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.state.borrow_mut().sources.insert(shader, source.to_owned());
        self.record(GlCall::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: u32) {
        {
            let mut state = self.state.borrow_mut();
            let source = state.sources.get(&shader).cloned().unwrap_or_default();
            let ok = state
                .shader_fail_marker
                .as_deref()
                .is_none_or(|marker| !source.contains(marker));
            state.compiled.insert(shader, ok);
        }
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().compiled.get(&shader).copied().unwrap_or(false)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            format!("0:1(1): error: shader {shader} rejected")
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().free(shader);
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let program = self.state.borrow_mut().alloc();
        self.record(GlCall::CreateProgram(program));
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.state
            .borrow_mut()
            .program_shaders
            .entry(program)
            .or_default()
            .push(shader);
        self.record(GlCall::AttachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        {
            let mut state = self.state.borrow_mut();
            let shaders_ok = state
                .program_shaders
                .get(&program)
                .is_some_and(|s| s.iter().all(|s| state.compiled.get(s) == Some(&true)));
            let ok = shaders_ok && !state.fail_links;
            state.linked.insert(program, ok);
        }
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state.borrow().linked.get(&program).copied().unwrap_or(false)
    }

    fn program_info_log(&self, program: u32) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            format!("error: program {program} failed to link")
        }
    }

    fn delete_program(&self, program: u32) {
        self.state.borrow_mut().free(program);
        self.record(GlCall::DeleteProgram(program));
    }

    fn use_program(&self, program: u32) {
        self.record(GlCall::UseProgram(program));
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let location = self.state.borrow_mut().location(program, name);
        self.record(GlCall::UniformLocation { program, name: name.to_owned() });
        Some(location)
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let location = self.state.borrow_mut().location(program, name);
        self.record(GlCall::AttribLocation { program, name: name.to_owned() });
        Some(location)
    }

    fn uniform_1_i32(&self, location: u32, value: i32) {
        self.record(GlCall::Uniform1i { location, value });
    }

    fn uniform_1_f32(&self, location: u32, value: f32) {
        self.record(GlCall::Uniform1f { location, value });
    }

    fn uniform_2_f32(&self, location: u32, x: f32, y: f32) {
        self.record(GlCall::Uniform2f { location, value: [x, y] });
    }

    fn uniform_4_f32(&self, location: u32, x: f32, y: f32, z: f32, w: f32) {
        self.record(GlCall::Uniform4f { location, value: [x, y, z, w] });
    }

    fn uniform_matrix_4_f32(&self, location: u32, value: &[f32; 16]) {
        self.record(GlCall::UniformMatrix4 { location, value: *value });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableAttrib(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::DisableAttrib(index));
    }

    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, data: &[f32]) {
        self.record(GlCall::AttribData { index, size, stride, data: data.to_vec() });
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        self.record(GlCall::AttribDivisor { index, divisor });
    }
}

// ── session ───────────────────────────────────────────────────────────────

/// One recorded session call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    MakeCurrent,
    Begin(i32, i32),
    End,
    Scissor(Option<Rect>),
}

#[derive(Debug, Default)]
struct SessionState {
    current: bool,
    events: Vec<SessionEvent>,
}

/// Recording [`RenderSession`].
///
/// Starts with no current context; `make_current` flips it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    state: Rc<RefCell<SessionState>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    /// Overrides whether the context reports as current.
    pub fn set_current(&self, current: bool) {
        self.state.borrow_mut().current = current;
    }
}

impl RenderSession for RecordingSession {
    fn is_current(&self) -> bool {
        self.state.borrow().current
    }

    fn make_current(&mut self) {
        let mut state = self.state.borrow_mut();
        state.current = true;
        state.events.push(SessionEvent::MakeCurrent);
    }

    fn begin(&mut self, width: i32, height: i32) {
        self.state.borrow_mut().events.push(SessionEvent::Begin(width, height));
    }

    fn end(&mut self) {
        self.state.borrow_mut().events.push(SessionEvent::End);
    }

    fn set_scissor(&mut self, rect: Option<Rect>) {
        self.state.borrow_mut().events.push(SessionEvent::Scissor(rect));
    }
}
