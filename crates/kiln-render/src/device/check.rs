use super::Gles;

/// Issues a GPU call and polls the GL error state afterwards.
///
/// Errors are logged with the calling module, line and GL call name; they
/// never abort the caller. Polling is skipped when the backend reports
/// [`Gles::poll_errors`] as disabled.
///
/// ```ignore
/// let status = gl_call!(gl, check_framebuffer_status(glow::FRAMEBUFFER));
/// ```
#[macro_export]
macro_rules! gl_call {
    ($gl:expr, $method:ident ( $($arg:expr),* $(,)? )) => {{
        let gl = $gl;
        let ret = gl.$method($($arg),*);
        $crate::device::check_error(gl, module_path!(), line!(), stringify!($method));
        ret
    }};
}

/// Symbolic name for a `glGetError` code.
pub fn gl_error_string(err: u32) -> &'static str {
    match err {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        _ => "UNKNOWN GL ERROR",
    }
}

/// Polls the GL error flag and logs it against the given call site.
pub fn check_error(gl: &dyn Gles, site: &str, line: u32, call: &str) {
    if !gl.poll_errors() {
        return;
    }

    let err = gl.get_error();
    if err != glow::NO_ERROR {
        log::error!("{}", format_gl_error(site, line, call, err));
    }
}

/// Diagnostic line logged for a failed GPU call.
pub fn format_gl_error(site: &str, line: u32, call: &str, err: u32) -> String {
    format!("gles: {call} in {site} line {line}: {}", gl_error_string(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{GlCall, RecordingGles};

    #[test]
    fn error_strings() {
        assert_eq!(gl_error_string(glow::INVALID_ENUM), "GL_INVALID_ENUM");
        assert_eq!(gl_error_string(glow::OUT_OF_MEMORY), "GL_OUT_OF_MEMORY");
        assert_eq!(gl_error_string(0xdead), "UNKNOWN GL ERROR");
    }

    #[test]
    fn error_line_names_call_site() {
        let line = format_gl_error("kiln_render::render::target", 120, "bind_texture", glow::INVALID_OPERATION);
        assert_eq!(
            line,
            "gles: bind_texture in kiln_render::render::target line 120: GL_INVALID_OPERATION"
        );
    }

    #[test]
    fn gl_call_polls_after_each_call() {
        let gl = RecordingGles::new();
        gl.inject_error(glow::INVALID_VALUE);

        let gl_ref: &dyn Gles = &gl;
        crate::gl_call!(gl_ref, viewport(0, 0, 4, 4));

        // The injected error is consumed by the poll; nothing is left queued.
        assert_eq!(gl.get_error(), glow::NO_ERROR);
        assert_eq!(gl.calls(), vec![GlCall::Viewport(0, 0, 4, 4)]);
    }
}
