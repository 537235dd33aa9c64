//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders,
//! and the [`Uniform`] trait for uploading uniform variables to a linked program.
//!
//! Shader sources are read from disk at runtime. Every failure is reported through
//! [`ShaderError`], whose `Display` text is the diagnostic line printed to the console.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use glam::Mat4;
use glow::HasContext;

/// Errors produced while loading, compiling or linking shaders.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// The source file is missing, unreadable, not UTF-8 or empty.
    #[error("Cannot load shader file {path} !")]
    Load { path: String },
    #[error("Cannot create shader {stage} !")]
    Create { stage: ShaderStage },
    #[error("Shader log: {log}")]
    Compile { log: String },
    #[error("Cannot create shader program !")]
    CreateProgram,
    #[error("Program log: {log}")]
    Link { log: String },
    #[error("Cannot get uniform {name} location !")]
    MissingUniform { name: String },
}

/// The programmable pipeline stages used by the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// The GL enum for this stage.
    pub fn gl_kind(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Printed as the raw GL enum, which is what driver logs refer to.
        write!(f, "{}", self.gl_kind())
    }
}

/// Reads a whole shader source file.
///
/// Missing, unreadable and zero-length files all map to [`ShaderError::Load`]. A file that is
/// not valid UTF-8 is reported the same way, since GLSL sources are text.
pub fn read_shader_source(path: impl AsRef<Path>) -> Result<String, ShaderError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(source) if !source.is_empty() => Ok(source),
        _ => Err(ShaderError::Load {
            path: path.display().to_string(),
        }),
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
    stage: ShaderStage,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    pub fn new(
        gl: &Arc<glow::Context>,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self, ShaderError> {
        unsafe {
            let id = gl
                .create_shader(stage.gl_kind())
                .map_err(|_| ShaderError::Create { stage })?;
            // Owned from here on so the handle is released on the failure path too.
            let shader = Self {
                gl: Arc::clone(gl),
                id,
                stage,
            };

            gl.shader_source(id, source);
            gl.compile_shader(id);

            if !gl.get_shader_compile_status(id) {
                return Err(ShaderError::Compile {
                    log: gl.get_shader_info_log(id),
                });
            }

            Ok(shader)
        }
    }

    /// Reads the source at `path` and compiles it for `stage`.
    pub fn from_file(
        gl: &Arc<glow::Context>,
        path: impl AsRef<Path>,
        stage: ShaderStage,
    ) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let source = read_shader_source(path)?;
        let shader = Self::new(gl, stage, &source)?;
        log::debug!("Compiled {:?} shader {}", shader.stage(), path.display());
        Ok(shader)
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    /// Uploads the value to the given, already resolved, uniform location.
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation);
}

impl Uniform for Mat4 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_matrix_4_f32_slice(Some(location), false, self.as_ref());
        }
    }
}

/// Represents an OpenGL shader program linked from a vertex and a fragment shader.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self, ShaderError> {
        unsafe {
            let id = gl
                .create_program()
                .map_err(|_| ShaderError::CreateProgram)?;
            let program = Self {
                gl: Arc::clone(gl),
                id,
            };

            for shader in shaders {
                gl.attach_shader(id, shader.id);
            }

            gl.link_program(id);

            if !gl.get_program_link_status(id) {
                return Err(ShaderError::Link {
                    log: gl.get_program_info_log(id),
                });
            }

            for shader in shaders {
                gl.detach_shader(id, shader.id);
            }

            Ok(program)
        }
    }

    /// Compiles the vertex shader, then the fragment shader, then links them.
    ///
    /// Stops at the first failing step: a vertex shader that fails to load or compile means
    /// the fragment file is never read and no program object is created.
    pub fn from_files(
        gl: &Arc<glow::Context>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vertex = Shader::from_file(gl, vertex_path, ShaderStage::Vertex)?;
        let fragment = Shader::from_file(gl, fragment_path, ShaderStage::Fragment)?;
        Self::new(gl, &[&vertex, &fragment])
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    pub fn handle(&self) -> glow::Program {
        self.id
    }

    /// Sets a uniform variable in the shader program.
    ///
    /// Fails with [`ShaderError::MissingUniform`] when the linked program has no uniform `name`.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) -> Result<(), ShaderError> {
        unsafe {
            let location = self.gl.get_uniform_location(self.id, name).ok_or_else(|| {
                ShaderError::MissingUniform {
                    name: name.to_string(),
                }
            })?;
            // glUniform* writes to the bound program.
            self.gl.use_program(Some(self.id));
            value.set_uniform(&self.gl, &location);
        }
        Ok(())
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}
