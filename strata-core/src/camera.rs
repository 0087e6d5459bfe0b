/// Cameras for the 3-D pipeline and the layered scene
use crate::config::RenderConfig;
use crate::matrix::{Matrix, POINT_AT_TRANSLATION_W};
use crate::vertex::Vertex;

/// Perspective camera for the mesh renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vertex,
    pub target: Vertex,
    pub up: Vertex,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// `w` written into the translation row of [`Camera::world_matrix`].
    pub translation_w: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vertex::point(0.0, 0.0, 25.0),
            target: Vertex::point(0.0, 0.0, 0.0),
            up: Vertex::direction(0.0, 1.0, 0.0),
            fov: 60.0,
            aspect: width as f32 / height as f32,
            near: 0.1,
            far: 1000.0,
            translation_w: POINT_AT_TRANSLATION_W,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            fov: config.fov,
            aspect: config.aspect_ratio(),
            near: config.near_plane,
            far: config.far_plane,
            translation_w: config.point_at_translation_w,
            ..Self::new(config.window_width, config.window_height)
        }
    }

    /// Camera placement in world space (the point-at matrix).
    pub fn world_matrix(&self) -> Matrix {
        Matrix::point_at_with_w(self.position, self.target, self.up, self.translation_w)
    }

    /// World to view transform.
    pub fn view_matrix(&self) -> Matrix {
        self.world_matrix().quick_invert()
    }

    pub fn projection_matrix(&self) -> Matrix {
        Matrix::projection(self.fov, self.aspect, self.near, self.far)
    }

    /// Moves the eye and what it looks at together, keeping the view direction.
    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.position.translate(dx, dy, dz);
        self.target.translate(dx, dy, dz);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// Offset of the layered scene in normalized viewport units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneCamera {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SceneCamera {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}
