//! Window surface contract consumed by the frame loop

/// A presentable window with its own clock
///
/// Implementations are expected to be driven from the main thread only; the
/// frame loop calls them in a fixed order each frame (size query, clock,
/// swap, poll, title).
pub trait WindowSurface {
    /// Whether the user or the application asked the window to close
    fn should_close(&self) -> bool;

    /// Request (or cancel a request) to close the window
    fn set_should_close(&mut self, should_close: bool);

    /// Current framebuffer size in pixels
    fn framebuffer_size(&self) -> (u32, u32);

    /// Monotonic time in seconds since the surface was created
    fn time(&self) -> f64;

    /// Replace the window title
    fn set_title(&mut self, title: &str);

    /// Present the back buffer
    fn swap_buffers(&mut self);

    /// Process pending window system events
    fn poll_events(&mut self);
}
