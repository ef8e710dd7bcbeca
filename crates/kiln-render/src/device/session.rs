use crate::coords::Rect;

/// The GPU context and swap-session lifecycle, owned by the backend layer.
///
/// The rendering layer only brackets its work with these calls; it never
/// creates contexts or surfaces itself.
pub trait RenderSession {
    /// Whether the rendering context is current on this thread.
    fn is_current(&self) -> bool;

    /// Makes the rendering context current without a draw surface.
    fn make_current(&mut self);

    /// Begins a rendering session with the given viewport size in pixels.
    fn begin(&mut self, width: i32, height: i32);

    /// Ends the session started by [`begin`](Self::begin).
    fn end(&mut self);

    /// Sets (`Some`) or clears (`None`) the session-level scissor box.
    fn set_scissor(&mut self, rect: Option<Rect>);
}
