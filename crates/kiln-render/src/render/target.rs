use crate::coords::Rect;
use crate::device::Gles;
use crate::error::RenderError;
use crate::gl_call;

/// GPU texture + framebuffer pair usable as a draw destination.
///
/// Both GL names are `None` until allocated. A framebuffer name of `0` is the
/// implicit default surface: it is never resized and never deleted.
///
/// GL objects are not released on drop (there is no context to release them
/// with); call [`release`](Self::release). Moving a target out with
/// [`take`](Self::take) leaves the source unallocated, and
/// [`assign`](Self::assign) releases the destination's objects before taking
/// ownership. The type is not `Clone`.
#[derive(Debug, Default)]
pub struct RenderTarget {
    texture: Option<u32>,
    framebuffer: Option<u32>,
    width: i32,
    height: i32,
}

impl RenderTarget {
    /// An unallocated target.
    pub const fn new() -> Self {
        Self {
            texture: None,
            framebuffer: None,
            width: 0,
            height: 0,
        }
    }

    /// Adopts GL objects created elsewhere. They are released like owned ones.
    pub const fn from_raw(framebuffer: u32, texture: u32, width: i32, height: i32) -> Self {
        Self {
            texture: Some(texture),
            framebuffer: Some(framebuffer),
            width,
            height,
        }
    }

    /// A view onto the default surface (framebuffer `0`) of the given size.
    pub const fn default_surface(width: i32, height: i32) -> Self {
        Self::from_raw(0, 0, width, height)
    }

    #[inline]
    pub fn texture(&self) -> Option<u32> {
        self.texture
    }

    #[inline]
    pub fn framebuffer(&self) -> Option<u32> {
        self.framebuffer
    }

    /// Framebuffer name to bind: the owned one, or the default surface.
    #[inline]
    pub fn framebuffer_or_default(&self) -> u32 {
        self.framebuffer.unwrap_or(0)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.texture.is_some() && self.framebuffer.is_some()
    }

    #[inline]
    pub fn is_default_surface(&self) -> bool {
        self.framebuffer == Some(0)
    }

    /// Creates the texture/framebuffer on first use and (re)allocates texture
    /// storage when the size changes.
    ///
    /// Reallocation invalidates the previous contents. Returns `Ok(true)` when
    /// objects were created or storage was reallocated, so callers know cached
    /// geometry must be recomputed. Fails if the framebuffer is incomplete
    /// afterwards; the size is then left unchanged.
    pub fn allocate(&mut self, gl: &dyn Gles, width: i32, height: i32) -> Result<bool, RenderError> {
        let mut first_allocate = false;

        let framebuffer = match self.framebuffer {
            Some(fb) => fb,
            None => {
                first_allocate = true;
                let fb = gl_call!(gl, create_framebuffer()).map_err(RenderError::Gl)?;
                self.framebuffer = Some(fb);
                fb
            }
        };

        let texture = match self.texture {
            Some(tex) => tex,
            None => {
                first_allocate = true;
                let tex = gl_call!(gl, create_texture()).map_err(RenderError::Gl)?;
                self.texture = Some(tex);
                init_texture(gl, tex);
                tex
            }
        };

        let mut resized = false;
        if framebuffer != 0 && (first_allocate || width != self.width || height != self.height) {
            resized = true;
            gl_call!(gl, bind_texture(glow::TEXTURE_2D, texture));
            gl_call!(gl, tex_storage_rgba(width, height));
        }

        if first_allocate {
            gl_call!(gl, bind_framebuffer(glow::FRAMEBUFFER, framebuffer));
            gl_call!(gl, bind_texture(glow::TEXTURE_2D, texture));
            gl_call!(gl, framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                texture,
            ));
        }

        if resized || first_allocate {
            let status = gl_call!(gl, check_framebuffer_status(glow::FRAMEBUFFER));
            if status != glow::FRAMEBUFFER_COMPLETE {
                log::error!("failed to initialize framebuffer {framebuffer} ({width}x{height}): status {status:#x}");
                gl_call!(gl, bind_texture(glow::TEXTURE_2D, 0));
                gl_call!(gl, bind_framebuffer(glow::FRAMEBUFFER, 0));
                return Err(RenderError::IncompleteFramebuffer { status });
            }
        }

        self.width = width;
        self.height = height;

        gl_call!(gl, bind_texture(glow::TEXTURE_2D, 0));
        gl_call!(gl, bind_framebuffer(glow::FRAMEBUFFER, 0));

        Ok(resized || first_allocate)
    }

    /// Makes this target the draw destination with a full-size viewport.
    pub fn bind(&self, gl: &dyn Gles) {
        gl_call!(gl, bind_framebuffer(glow::DRAW_FRAMEBUFFER, self.framebuffer_or_default()));
        gl_call!(gl, viewport(0, 0, self.width, self.height));
    }

    /// Restricts drawing to `rect`, given with Y measured from the top.
    pub fn scissor(&self, gl: &dyn Gles, rect: Rect) {
        gl_call!(gl, enable(glow::SCISSOR_TEST));
        gl_call!(gl, scissor(
            rect.x,
            self.height - rect.y - rect.height,
            rect.width,
            rect.height,
        ));
    }

    /// Deletes the owned GL objects and returns to the unallocated state.
    ///
    /// The default surface is left alone. Idempotent.
    pub fn release(&mut self, gl: &dyn Gles) {
        if let Some(fb) = self.framebuffer.filter(|&fb| fb != 0) {
            gl_call!(gl, delete_framebuffer(fb));
        }

        if let Some(tex) = self.texture {
            if !self.is_default_surface() || tex != 0 {
                gl_call!(gl, delete_texture(tex));
            }
        }

        self.reset();
    }

    /// Forgets the GL objects without deleting them.
    pub fn reset(&mut self) {
        self.texture = None;
        self.framebuffer = None;
        self.width = 0;
        self.height = 0;
    }

    /// Moves the objects out, leaving `self` unallocated.
    #[must_use]
    pub fn take(&mut self) -> RenderTarget {
        std::mem::take(self)
    }

    /// Releases `self`'s objects, then takes ownership of `other`'s.
    pub fn assign(&mut self, gl: &dyn Gles, mut other: RenderTarget) {
        self.release(gl);
        *self = other.take();
    }
}

impl Drop for RenderTarget {
    fn drop(&mut self) {
        let owns_objects = self.framebuffer.is_some_and(|fb| fb != 0)
            || self.texture.is_some_and(|tex| tex != 0);
        if owns_objects {
            log::warn!(
                "render target dropped with live GL objects (fb {:?}, tex {:?})",
                self.framebuffer,
                self.texture
            );
        }
    }
}

fn init_texture(gl: &dyn Gles, texture: u32) {
    gl_call!(gl, bind_texture(glow::TEXTURE_2D, texture));
    gl_call!(gl, tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32));
    gl_call!(gl, tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32));
    gl_call!(gl, tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32));
    gl_call!(gl, tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32));
}
