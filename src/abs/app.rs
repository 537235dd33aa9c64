//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2 window
//! and the OpenGL context it renders into. Everything is released when the
//! [`App`] is dropped.

use std::sync::Arc;

/// Errors produced while bringing up the window and its context.
#[derive(Debug, thiserror::Error)]
#[error("Cannot create window: {0}")]
pub struct AppError(String);

impl AppError {
    fn new(e: impl ToString) -> Self {
        Self(e.to_string())
    }
}

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates a new [`App`] with a resizable window of the given title and size, and makes
    /// a 3.3 core context current on it.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, AppError> {
        let sdl = sdl2::init().map_err(AppError::new)?;
        let video_subsystem = sdl.video().map_err(AppError::new)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        let window = video_subsystem
            .window(title, width, height)
            .opengl()
            .resizable()
            .build()
            .map_err(AppError::new)?;
        let gl_context = window.gl_create_context().map_err(AppError::new)?;
        window
            .gl_make_current(&gl_context)
            .map_err(AppError::new)?;
        if let Err(e) = video_subsystem.gl_set_swap_interval(sdl2::video::SwapInterval::VSync) {
            log::warn!("Cannot enable vsync: {e}");
        }
        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(AppError::new)?;
        let gl = Arc::new(gl);

        log::info!("Created {width}x{height} window \"{title}\"");

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl,
            event_pump,
        })
    }

    /// Current size of the drawable area in pixels.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    /// Drains pending window events, returning `true` if a close was requested.
    pub fn poll_close_requested(&mut self) -> bool {
        let mut close = false;
        for event in self.event_pump.poll_iter() {
            if let sdl2::event::Event::Quit { .. } = event {
                close = true;
            }
        }
        close
    }

    pub fn swap_buffers(&self) {
        self.window.gl_swap_window();
    }
}
