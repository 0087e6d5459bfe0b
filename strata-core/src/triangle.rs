/// Triangle primitive and the per-triangle stages of the 3-D pipeline
use std::cmp::Ordering;

use crate::draw::{Color, DrawTarget, ScreenPoint};
use crate::error::Result;
use crate::matrix::Matrix;
use crate::quaternion::Quaternion;
use crate::vertex::Vertex;

/// Three ordered vertices. Winding decides the sign of [`Triangle::face_normal`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Triangle {
    pub v: [Vertex; 3],
}

impl Triangle {
    pub fn new(a: Vertex, b: Vertex, c: Vertex) -> Self {
        Self { v: [a, b, c] }
    }

    fn map(&self, f: impl Fn(Vertex) -> Vertex) -> Triangle {
        Triangle { v: self.v.map(f) }
    }

    fn zip(&self, other: &Triangle, f: impl Fn(Vertex, Vertex) -> Vertex) -> Triangle {
        Triangle {
            v: [
                f(self.v[0], other.v[0]),
                f(self.v[1], other.v[1]),
                f(self.v[2], other.v[2]),
            ],
        }
    }

    pub fn add(&self, other: &Triangle) -> Triangle {
        self.zip(other, Vertex::add)
    }

    pub fn subtract(&self, other: &Triangle) -> Triangle {
        self.zip(other, Vertex::subtract)
    }

    pub fn multiply(&self, other: &Triangle) -> Triangle {
        self.zip(other, Vertex::multiply)
    }

    pub fn divide(&self, other: &Triangle) -> Triangle {
        self.zip(other, Vertex::divide)
    }

    pub fn add_scalar(&self, x: f32, y: f32, z: f32) -> Triangle {
        self.map(|v| v.add_scalar(x, y, z))
    }

    pub fn subtract_scalar(&self, x: f32, y: f32, z: f32) -> Triangle {
        self.map(|v| v.subtract_scalar(x, y, z))
    }

    pub fn multiply_scalar(&self, x: f32, y: f32, z: f32) -> Triangle {
        self.map(|v| v.multiply_scalar(x, y, z))
    }

    pub fn divide_scalar(&self, x: f32, y: f32, z: f32) -> Triangle {
        self.map(|v| v.divide_scalar(x, y, z))
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        for v in &mut self.v {
            v.translate(dx, dy, dz);
        }
    }

    /// Transforms every vertex by `m` using each vertex's own `w`.
    pub fn transform(&self, m: &Matrix) -> Triangle {
        self.map(|v| m.transform(v))
    }

    pub fn rotate(&self, q: &Quaternion) -> Triangle {
        self.map(|v| q.rotate(v))
    }

    /// Normalizes every vertex position as a vector. Applied after projection
    /// this bends geometry around a sphere (fish-eye look).
    pub fn normalize_vertices(&self) -> Triangle {
        self.map(Vertex::normalize)
    }

    /// Unit normal of `(v1 - v0) x (v2 - v0)`; zero for degenerate triangles.
    pub fn face_normal(&self) -> Vertex {
        let edge1 = self.v[1] - self.v[0];
        let edge2 = self.v[2] - self.v[0];
        edge1.cross(edge2).normalize()
    }

    /// Projects the triangle with `projection` and applies the perspective divide.
    ///
    /// Every vertex is forced to `w = 1` first. Vertices that come out with
    /// `w == 0` lie at infinity and are left un-divided; nothing is clipped.
    pub fn project(&self, projection: &Matrix) -> Triangle {
        self.map(|v| {
            let p = projection.transform(Vertex::point(v.x, v.y, v.z));
            if p.w != 0.0 {
                p.divide_scalar(p.w, p.w, p.w)
            } else {
                p
            }
        })
    }

    pub fn average_depth(&self) -> f32 {
        (self.v[0].z + self.v[1].z + self.v[2].z) / 3.0
    }

    /// Ascending average-z ordering for painter's-algorithm sorts.
    pub fn compare_by_depth(a: &Triangle, b: &Triangle) -> Ordering {
        a.average_depth()
            .partial_cmp(&b.average_depth())
            .unwrap_or(Ordering::Equal)
    }

    pub fn screen_points(&self) -> [ScreenPoint; 3] {
        self.v.map(|v| ScreenPoint::new(v.x, v.y))
    }

    /// Emits the triangle as one filled primitive with a uniform colour.
    pub fn render_fill<T: DrawTarget + ?Sized>(&self, target: &mut T, color: Color) -> Result<()> {
        target.draw_filled_triangle(self.screen_points(), color, None, None)
    }

    /// Emits the three edges as lines.
    pub fn render_wire<T: DrawTarget + ?Sized>(&self, target: &mut T, color: Color) -> Result<()> {
        let p = self.screen_points();
        target.draw_line(p[0], p[1], color)?;
        target.draw_line(p[1], p[2], color)?;
        target.draw_line(p[2], p[0], color)
    }
}
