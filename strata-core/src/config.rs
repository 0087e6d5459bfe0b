/// Read-only rendering parameters shared by every component
use serde::Deserialize;

use crate::error::{Result, StrataError};
use crate::matrix::{Matrix, POINT_AT_TRANSLATION_W};
use crate::mesh::RenderOptions;

/// Numeric parameters for the pipeline and the compositor.
///
/// Built once at startup (from defaults or deserialized by the host) and
/// then only ever passed by shared reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub fps: u32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// How quickly layers shrink with depth in the layered scene.
    pub depth_scale: f32,
    /// Parallax given to layers made by `LayeredScene::create_default_layer`.
    pub default_parallax: f32,
    /// Draws the centre crosshair and per-layer bounds.
    pub debug_overlay: bool,
    /// Triangle limit for meshes built from this configuration.
    pub max_triangles: usize,
    /// `w` of the point-at translation row.
    pub point_at_translation_w: f32,
    /// Sort mesh triangles back-to-front before drawing.
    pub depth_sort: bool,
    pub wireframe: bool,
    pub fish_eye: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 640,
            window_height: 480,
            fps: 60,
            fov: 60.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            depth_scale: 1.0,
            default_parallax: 1.0,
            debug_overlay: false,
            max_triangles: 1000,
            point_at_translation_w: POINT_AT_TRANSLATION_W,
            depth_sort: false,
            wireframe: false,
            fish_eye: false,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(StrataError::InvalidConfig(format!(
                "viewport {}x{} has no area",
                self.window_width, self.window_height
            )));
        }
        if self.fps == 0 {
            return Err(StrataError::InvalidConfig("fps must be positive".into()));
        }
        let scalars = [
            ("fov", self.fov),
            ("near_plane", self.near_plane),
            ("far_plane", self.far_plane),
            ("depth_scale", self.depth_scale),
            ("default_parallax", self.default_parallax),
            ("point_at_translation_w", self.point_at_translation_w),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(StrataError::InvalidConfig(format!("{} is not finite", name)));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(StrataError::InvalidConfig(format!("fov {} out of (0, 180)", self.fov)));
        }
        if self.near_plane <= 0.0 || self.far_plane <= self.near_plane {
            return Err(StrataError::InvalidConfig(format!(
                "clip planes near={} far={} must satisfy 0 < near < far",
                self.near_plane, self.far_plane
            )));
        }
        Ok(())
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.window_width as f32, self.window_height as f32)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }

    /// Target frame time in milliseconds.
    pub fn target_frame_delta(&self) -> f32 {
        1000.0 / self.fps as f32
    }

    pub fn projection_matrix(&self) -> Matrix {
        Matrix::projection(self.fov, self.aspect_ratio(), self.near_plane, self.far_plane)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            wireframe: self.wireframe,
            depth_sort: self.depth_sort,
            fish_eye: self.fish_eye,
        }
    }
}
