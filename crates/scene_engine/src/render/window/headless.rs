//! Headless window surface
//!
//! Presents nowhere. Useful for running the frame loop in tests, on CI
//! machines without a display, or for benchmarking update logic.

use std::time::Instant;

use crate::render::window::WindowSurface;

/// Fixed-size surface timed by the wall clock
#[derive(Debug)]
pub struct HeadlessWindow {
    width: u32,
    height: u32,
    title: String,
    created_at: Instant,
    frames_presented: u64,
    frame_limit: Option<u64>,
    should_close: bool,
}

impl HeadlessWindow {
    /// Create a surface with the given framebuffer size
    pub fn new(title: &str, width: u32, height: u32) -> Self {
        log::info!("Created headless surface {}x{}", width, height);
        Self {
            width,
            height,
            title: title.to_string(),
            created_at: Instant::now(),
            frames_presented: 0,
            frame_limit: None,
            should_close: false,
        }
    }

    /// Close automatically once `frames` buffers have been presented
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Simulate a resize of the framebuffer
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Current title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of presented frames
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl WindowSurface for HeadlessWindow {
    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.should_close = should_close;
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn time(&self) -> f64 {
        self.created_at.elapsed().as_secs_f64()
    }

    fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
        }
    }

    fn swap_buffers(&mut self) {
        self.frames_presented += 1;
    }

    fn poll_events(&mut self) {
        if let Some(limit) = self.frame_limit {
            if self.frames_presented >= limit {
                self.should_close = true;
            }
        }
    }
}
