//! Window management using GLFW
//!
//! Creates a double-buffered window with a current GL context, honouring the
//! multisample and vsync settings of [`WindowConfig`]. The GL function
//! loading and the [`DrawApi`](crate::render::DrawApi) implementation on top
//! of the context belong to the embedding application.

use glfw::Context;

use crate::core::config::WindowConfig;
use crate::render::window::{WindowError, WindowResult, WindowSurface};

/// GLFW window wrapper with proper resource management
pub struct GlfwWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl GlfwWindow {
    /// Open a window described by `config` and make its context current
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::InitializationFailed(format!("{:?}", e)))?;

        glfw.window_hint(glfw::WindowHint::DoubleBuffer(true));
        if config.samples > 1 {
            glfw.window_hint(glfw::WindowHint::Samples(Some(config.samples)));
        }

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or_else(|| WindowError::CreationFailed(format!("{}x{} '{}'", config.width, config.height, config.title)))?;

        window.make_current();
        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);

        log::info!(
            "Opened GLFW window {}x{} (samples: {}, vsync: {})",
            config.width,
            config.height,
            config.samples,
            config.vsync
        );

        Ok(Self { glfw, window, events })
    }

    /// The underlying GLFW window, for GL function loading
    pub fn window_mut(&mut self) -> &mut glfw::PWindow {
        &mut self.window
    }
}

impl WindowSurface for GlfwWindow {
    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    #[allow(clippy::cast_sign_loss)]
    fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    fn poll_events(&mut self) {
        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.events) {
            match event {
                glfw::WindowEvent::Key(glfw::Key::Escape, _, glfw::Action::Press, _) => {
                    self.window.set_should_close(true);
                }
                glfw::WindowEvent::FramebufferSize(width, height) => {
                    log::debug!("Framebuffer resized to {}x{}", width, height);
                }
                _ => {}
            }
        }
    }
}
