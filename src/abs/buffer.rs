//! Vertex buffer management module.
//!
//! This module defines the [`VertexBuffer`] struct for uploading vertex data to the GPU and
//! wiring its layout to the named inputs of a linked [`ShaderProgram`].
//! Vertices should implement the [`Vertex`] trait.

use std::sync::Arc;

use glow::HasContext;

use crate::abs::ShaderProgram;

/// Errors produced while creating a [`VertexBuffer`].
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Cannot generate vertex buffer !")]
    Create(String),
    #[error("Cannot get attribute {name} location !")]
    MissingAttribute { name: &'static str },
}

/// A float attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Name of the `in` variable in the vertex shader.
    pub name: &'static str,
    pub components: i32,
    /// Byte offset from the start of the vertex.
    pub offset: i32,
}

/// Trait that describes the memory layout of a vertex.
pub trait Vertex: Copy {
    /// The attributes of the vertex, resolved by name against the program.
    fn attributes() -> &'static [VertexAttribute];
}

/// Vertex data stored on the GPU side, together with the vertex array that records its layout.
pub struct VertexBuffer {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: usize,
}

impl VertexBuffer {
    /// Uploads `vertices` and binds each attribute of `V` to the matching input of `program`.
    pub fn new<V: Vertex>(
        gl: &Arc<glow::Context>,
        program: &ShaderProgram,
        vertices: &[V],
    ) -> Result<Self, BufferError> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(BufferError::Create)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(BufferError::Create(e));
                }
            };
            // Dropping `buffer` on any error below releases both handles.
            let buffer = Self {
                gl: Arc::clone(gl),
                vao,
                vbo,
                vertex_count: vertices.len(),
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    vertices.as_ptr() as *const u8,
                    std::mem::size_of_val(vertices),
                ),
                glow::STATIC_DRAW,
            );

            let result = buffer.bind_attributes::<V>(program);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            result.map(|()| buffer)
        }
    }

    fn bind_attributes<V: Vertex>(&self, program: &ShaderProgram) -> Result<(), BufferError> {
        let stride = std::mem::size_of::<V>() as i32;
        for attribute in V::attributes() {
            let location = unsafe { self.gl.get_attrib_location(program.handle(), attribute.name) }
                .ok_or(BufferError::MissingAttribute {
                    name: attribute.name,
                })?;
            unsafe {
                self.gl.enable_vertex_attrib_array(location);
                self.gl.vertex_attrib_pointer_f32(
                    location,
                    attribute.components,
                    glow::FLOAT,
                    false,
                    stride,
                    attribute.offset,
                );
            }
        }
        Ok(())
    }

    /// Draws the whole buffer with the given primitive mode.
    pub fn draw(&self, mode: u32) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(mode, 0, self.vertex_count as i32);
            self.gl.bind_vertex_array(None);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BufferError::MissingAttribute { name: "position" }.to_string(),
            "Cannot get attribute position location !"
        );
        assert_eq!(
            BufferError::MissingAttribute { name: "color" }.to_string(),
            "Cannot get attribute color location !"
        );
        assert_eq!(
            BufferError::Create("out of memory".to_string()).to_string(),
            "Cannot generate vertex buffer !"
        );
    }
}
