//! This module contains the thin wrappers over SDL2 and OpenGL used by the demo:
//! application setup, shader management and vertex buffers.

pub mod app;
pub mod buffer;
pub mod shader;

pub use app::*;
pub use buffer::*;
pub use shader::*;
