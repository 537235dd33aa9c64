//! The animated quad.
//!
//! This module holds the two hard-coded shapes, the [`Animation`] state that decides which one
//! is drawn and where, the MVP transform, and the fixed-timestep frame loop that ties them to
//! the window.

use std::time::Duration;

use glam::{Mat4, Vec3};
use glow::HasContext;

use crate::abs::{App, ShaderProgram, Vertex, VertexAttribute, VertexBuffer};

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.5, 1.0];
const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.0);
const ROTATION_AXIS: Vec3 = Vec3::Y;
const ORBIT_RADIUS: f32 = 0.5;
const ANGLE_STEP: f32 = 10.0;
const FULL_TURN: f32 = 360.0;
const FRAME_DELAY: Duration = Duration::from_millis(50);
const MVP_UNIFORM: &str = "MVPMatrix";

const FOV_Y_DEGREES: f32 = 45.0;
const Z_NEAR: f32 = 1.0;
const Z_FAR: f32 = 100.0;

/// Interleaved position and color, as consumed by `simple.vert`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

const FLOAT_SIZE: i32 = std::mem::size_of::<f32>() as i32;

static COLOR_VERTEX_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        name: "position",
        components: 3,
        offset: 0,
    },
    VertexAttribute {
        name: "color",
        components: 3,
        offset: 3 * FLOAT_SIZE,
    },
];

impl Vertex for ColorVertex {
    fn attributes() -> &'static [VertexAttribute] {
        &COLOR_VERTEX_ATTRIBUTES
    }
}

const SQUARE: [ColorVertex; 4] = [
    ColorVertex::new([1.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ColorVertex::new([-1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
    ColorVertex::new([1.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
    ColorVertex::new([-1.0, -1.0, 0.0], [1.0, 0.0, 1.0]),
];

const DIAMOND: [ColorVertex; 4] = [
    ColorVertex::new([1.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
    ColorVertex::new([0.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
    ColorVertex::new([0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
    ColorVertex::new([-1.0, 0.0, 0.0], [1.0, 0.0, 1.0]),
];

/// Which of the two vertex arrays is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Square,
    Diamond,
}

impl Shape {
    /// Triangle-strip vertices of the shape.
    pub fn vertices(self) -> &'static [ColorVertex; 4] {
        match self {
            Shape::Square => &SQUARE,
            Shape::Diamond => &DIAMOND,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Shape::Square => Shape::Diamond,
            Shape::Diamond => Shape::Square,
        }
    }
}

/// Rotation angle and active shape, advanced once per frame.
///
/// The angle lives in `[0, 360)` degrees. Each full turn resets it to exactly zero and swaps
/// the shape, so the vertex buffer only has to be rebuilt on frames where the angle is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    angle: f32,
    shape: Shape,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Animation {
    pub fn new() -> Self {
        Self {
            angle: 0.0,
            shape: Shape::Square,
        }
    }

    pub fn angle_degrees(&self) -> f32 {
        self.angle
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Whether this frame starts a new turn and needs fresh vertex data.
    pub fn needs_rebuild(&self) -> bool {
        self.angle == 0.0
    }

    /// Position on the circular orbit in the XY plane.
    pub fn model_translation(&self) -> Vec3 {
        let radians = self.angle.to_radians();
        Vec3::new(
            ORBIT_RADIUS * radians.cos(),
            ORBIT_RADIUS * radians.sin(),
            0.0,
        )
    }

    pub fn rotation_radians(&self) -> f32 {
        self.angle.to_radians()
    }

    /// Steps the angle; returns `true` when a full turn completed and the shape flipped.
    pub fn advance(&mut self) -> bool {
        self.angle += ANGLE_STEP;
        if self.angle >= FULL_TURN {
            self.angle = 0.0;
            self.shape = self.shape.toggled();
            return true;
        }
        false
    }
}

/// Projection * view * model for a viewport of `width` x `height` pixels.
///
/// The camera looks at the origin with +Y up. The model is translated, then rotated by
/// `rotation` radians about `axis`.
pub fn mvp_matrix(
    width: u32,
    height: u32,
    camera: Vec3,
    translation: Vec3,
    rotation: f32,
    axis: Vec3,
) -> Mat4 {
    // A minimized window reports a zero height.
    let aspect = width as f32 / height.max(1) as f32;
    let projection = Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR);
    let view = Mat4::look_at_rh(camera, Vec3::ZERO, Vec3::Y);
    let model = Mat4::from_translation(translation) * Mat4::from_axis_angle(axis.normalize(), rotation);
    projection * view * model
}

/// Frame loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Closing,
}

/// Per-run rendering state: the animation and the buffer holding the current shape.
pub struct Renderer<'a> {
    app: &'a mut App,
    program: &'a ShaderProgram,
    animation: Animation,
    vertex_buffer: Option<VertexBuffer>,
}

impl<'a> Renderer<'a> {
    pub fn new(app: &'a mut App, program: &'a ShaderProgram) -> Self {
        Self {
            app,
            program,
            animation: Animation::default(),
            vertex_buffer: None,
        }
    }

    /// Renders frames every [`FRAME_DELAY`] until the window is closed or the MVP uniform
    /// cannot be found.
    pub fn run(&mut self) {
        while self.frame() == RunState::Running {
            std::thread::sleep(FRAME_DELAY);
            if self.animation.advance() {
                log::debug!("Switching to {:?}", self.animation.shape());
            }
        }
        log::info!("Render loop finished");
    }

    fn frame(&mut self) -> RunState {
        let gl = &self.app.gl;
        let (width, height) = self.app.framebuffer_size();

        unsafe {
            gl.clear_color(CLEAR_COLOR[0], CLEAR_COLOR[1], CLEAR_COLOR[2], CLEAR_COLOR[3]);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.viewport(0, 0, width as i32, height as i32);
        }

        if self.animation.needs_rebuild() {
            let shape = self.animation.shape();
            match VertexBuffer::new(gl, self.program, shape.vertices()) {
                Ok(buffer) => {
                    log::debug!("Uploaded {} vertices for {shape:?}", buffer.vertex_count());
                    // Replacing the old buffer releases it.
                    self.vertex_buffer = Some(buffer);
                }
                Err(e) => log::error!("{e}"),
            }
        }

        let mvp = mvp_matrix(
            width,
            height,
            CAMERA_POSITION,
            self.animation.model_translation(),
            self.animation.rotation_radians(),
            ROTATION_AXIS,
        );
        if let Err(e) = self.program.set_uniform(MVP_UNIFORM, mvp) {
            log::error!("{e}");
            return RunState::Closing;
        }

        self.program.use_program();
        if let Some(buffer) = &self.vertex_buffer {
            buffer.draw(glow::TRIANGLE_STRIP);
        }

        self.app.swap_buffers();

        if self.app.poll_close_requested() {
            RunState::Closing
        } else {
            RunState::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_vertex_layout() {
        assert_eq!(std::mem::size_of::<ColorVertex>(), 6 * std::mem::size_of::<f32>());
        let attributes = ColorVertex::attributes();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].name, "position");
        assert_eq!(attributes[0].offset, 0);
        assert_eq!(attributes[1].name, "color");
        assert_eq!(attributes[1].offset, 12);
    }

    #[test]
    fn test_animation_starts_on_square_at_zero() {
        let animation = Animation::default();
        assert_eq!(animation, Animation::new());
        assert_eq!(animation.angle_degrees(), 0.0);
        assert_eq!(animation.shape(), Shape::Square);
        assert!(animation.needs_rebuild());
    }

    #[test]
    fn test_angle_wraps_after_full_turn() {
        let mut animation = Animation::new();
        for frame in 1..36 {
            assert!(!animation.advance());
            assert_eq!(animation.angle_degrees(), frame as f32 * ANGLE_STEP);
        }
        assert!(animation.advance());
        assert_eq!(animation.angle_degrees(), 0.0);
        assert_eq!(animation.shape(), Shape::Diamond);
    }

    #[test]
    fn test_rebuild_only_at_start_of_turn() {
        let mut animation = Animation::new();
        let mut rebuilds = Vec::new();
        for frame in 0..720 {
            if animation.needs_rebuild() {
                rebuilds.push(frame);
            }
            animation.advance();
        }
        assert_eq!(rebuilds.len(), 20);
        assert!(rebuilds.iter().all(|frame| frame % 36 == 0));
    }

    #[test]
    fn test_shapes_alternate_and_return() {
        let mut animation = Animation::new();
        let mut flips = 0;
        let mut seen = vec![animation.shape()];
        for _ in 0..72 {
            if animation.advance() {
                flips += 1;
                seen.push(animation.shape());
            }
        }
        assert_eq!(flips, 2);
        assert_eq!(seen, [Shape::Square, Shape::Diamond, Shape::Square]);
        assert_eq!(animation.shape().vertices(), &SQUARE);
    }

    #[test]
    fn test_orbit_translation() {
        let mut animation = Animation::new();
        assert_eq!(animation.model_translation(), Vec3::new(0.5, 0.0, 0.0));
        for _ in 0..9 {
            animation.advance();
        }
        assert!(
            animation
                .model_translation()
                .abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6)
        );
        assert!((animation.rotation_radians() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_mvp_at_rest() {
        let mvp = mvp_matrix(640, 480, Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.0, Vec3::Y);
        let expected = Mat4::perspective_rh_gl(45f32.to_radians(), 640.0 / 480.0, 1.0, 100.0)
            * Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            * Mat4::IDENTITY;
        assert!(mvp.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_mvp_is_deterministic() {
        let args = (800, 600, CAMERA_POSITION, Vec3::new(0.1, 0.2, 0.0), 1.3, Vec3::Y);
        let a = mvp_matrix(args.0, args.1, args.2, args.3, args.4, args.5);
        let b = mvp_matrix(args.0, args.1, args.2, args.3, args.4, args.5);
        assert_eq!(a.to_cols_array(), b.to_cols_array());
    }

    #[test]
    fn test_viewport_size_only_changes_aspect() {
        let translation = Vec3::new(0.3, -0.2, 0.0);
        let a = mvp_matrix(640, 480, CAMERA_POSITION, translation, 0.7, Vec3::Y);
        let b = mvp_matrix(1280, 480, CAMERA_POSITION, translation, 0.7, Vec3::Y);
        // Only the x row of the projection depends on the aspect ratio.
        assert!(a.row(1).abs_diff_eq(b.row(1), 1e-6));
        assert!(a.row(2).abs_diff_eq(b.row(2), 1e-6));
        assert!(a.row(3).abs_diff_eq(b.row(3), 1e-6));
        assert!((a.row(0) - b.row(0) * 2.0).length() < 1e-5);
    }

    #[test]
    fn test_mvp_translates_then_rotates() {
        let translation = Vec3::new(0.5, 0.0, 0.0);
        let mvp = mvp_matrix(640, 480, CAMERA_POSITION, translation, 1.0, Vec3::new(0.0, 2.0, 0.0));
        let projection_view = mvp_matrix(640, 480, CAMERA_POSITION, Vec3::ZERO, 0.0, Vec3::Y);
        // The model origin lands on the translation regardless of rotation.
        let origin = mvp * glam::Vec4::W;
        let expected = projection_view * translation.extend(1.0);
        assert!(origin.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_zero_height_does_not_produce_nan() {
        let mvp = mvp_matrix(640, 0, CAMERA_POSITION, Vec3::ZERO, 0.0, Vec3::Y);
        assert!(!mvp.is_nan());
    }
}
