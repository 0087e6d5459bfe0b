/// Triangle meshes and the shaded 3-D mesh renderer
use crate::draw::{Color, DrawTarget};
use crate::error::{Result, StrataError};
use crate::matrix::Matrix;
use crate::quaternion::Quaternion;
use crate::triangle::Triangle;
use crate::vertex::Vertex;

/// Override colour used for the player object.
pub const PLAYER_TINT: Color = Color::rgb(255, 100, 50);

/// A collection of triangles, optionally bounded.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    limit: Option<usize>,
    /// Replaces the computed shade of every triangle when set.
    pub tint: Option<Color>,
}

impl Mesh {
    /// Unbounded mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh that refuses to grow past `limit` triangles.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(limit.min(4096)),
            limit: Some(limit),
            tint: None,
        }
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = Some(tint);
        self
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangles_mut(&mut self) -> &mut [Triangle] {
        &mut self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn ensure_room(&self, additional: usize) -> Result<()> {
        match self.limit {
            Some(capacity) if self.triangles.len() + additional > capacity => {
                Err(StrataError::CapacityExceeded { capacity })
            }
            _ => Ok(()),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) -> Result<()> {
        self.ensure_room(1)?;
        self.triangles.push(triangle);
        Ok(())
    }

    /// Adds a unit tile spanning `(x, y)`-`(x + 1, y + 1)` at height `z`.
    /// Either both triangles are added or neither.
    pub fn add_tile(&mut self, x: f32, y: f32, z: f32) -> Result<()> {
        self.ensure_room(2)?;
        self.triangles.push(Triangle::new(
            Vertex::point(x, y, z),
            Vertex::point(x + 1.0, y, z),
            Vertex::point(x, y + 1.0, z),
        ));
        self.triangles.push(Triangle::new(
            Vertex::point(x + 1.0, y + 1.0, z),
            Vertex::point(x, y + 1.0, z),
            Vertex::point(x + 1.0, y, z),
        ));
        Ok(())
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        for t in &mut self.triangles {
            t.translate(dx, dy, dz);
        }
    }

    /// Rotates every triangle by `q` around `pivot`.
    pub fn rotate_about(&mut self, q: &Quaternion, pivot: Vertex) {
        for t in &mut self.triangles {
            *t = t
                .subtract_scalar(pivot.x, pivot.y, pivot.z)
                .rotate(q)
                .add_scalar(pivot.x, pivot.y, pivot.z);
        }
    }

    /// Axis-aligned cube centred on the origin with outward winding.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let faces = [
            // +z
            [(-h, -h, h), (h, -h, h), (h, h, h), (-h, h, h)],
            // -z
            [(h, -h, -h), (-h, -h, -h), (-h, h, -h), (h, h, -h)],
            // +x
            [(h, -h, h), (h, -h, -h), (h, h, -h), (h, h, h)],
            // -x
            [(-h, -h, -h), (-h, -h, h), (-h, h, h), (-h, h, -h)],
            // +y
            [(-h, h, h), (h, h, h), (h, h, -h), (-h, h, -h)],
            // -y
            [(-h, -h, -h), (h, -h, -h), (h, -h, h), (-h, -h, h)],
        ];

        let mut mesh = Self::new();
        for [a, b, c, d] in faces {
            let [a, b, c, d] = [a, b, c, d].map(|(x, y, z)| Vertex::point(x, y, z));
            mesh.triangles.push(Triangle::new(a, b, c));
            mesh.triangles.push(Triangle::new(a, c, d));
        }
        mesh
    }
}

/// Knobs for [`MeshRenderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Draw edges instead of filled triangles.
    pub wireframe: bool,
    /// Sort view-space triangles far-to-near before drawing. Off keeps
    /// storage order.
    pub depth_sort: bool,
    /// Normalize projected vertices before the pixel remap, bending the
    /// image around a sphere.
    pub fish_eye: bool,
}

/// Greyscale level for a face: `127.5 * dot(normal, light)` truncated and
/// clamped to `[0, 255]`.
pub fn shade(normal: Vertex, light_dir: Vertex) -> Color {
    let level = (127.5 * normal.dot(light_dir)).trunc().clamp(0.0, 255.0);
    Color::grey(level as u8)
}

/// Shades, transforms and projects meshes into screen-space fills.
///
/// No depth buffer, culling or clipping: triangles are emitted in storage
/// order unless [`RenderOptions::depth_sort`] is set.
#[derive(Debug, Clone, Copy)]
pub struct MeshRenderer {
    pub projection: Matrix,
    pub view: Matrix,
    pub light_dir: Vertex,
    pub width: f32,
    pub height: f32,
    pub options: RenderOptions,
}

impl MeshRenderer {
    pub fn new(
        projection: Matrix,
        view: Matrix,
        light_dir: Vertex,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            projection,
            view,
            light_dir,
            width,
            height,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Colour for `triangle` before any transform: its local-space face normal
    /// against the light, or the mesh tint.
    pub fn shade_triangle(&self, mesh: &Mesh, triangle: &Triangle) -> Color {
        mesh.tint
            .unwrap_or_else(|| shade(triangle.face_normal(), self.light_dir))
    }

    /// Projection and the NDC to pixel remap for a view-space triangle.
    ///
    /// NDC `[-1, 1]` is shifted to `[0, 2]` and scaled by half the viewport.
    pub fn to_screen(&self, view_space: &Triangle) -> Triangle {
        let mut projected = view_space.project(&self.projection);
        if self.options.fish_eye {
            projected = projected.normalize_vertices();
        }
        projected
            .add_scalar(1.0, 1.0, 0.0)
            .multiply_scalar(self.width * 0.5, self.height * 0.5, 0.0)
    }

    /// Renders `mesh` and returns the number of triangles drawn.
    pub fn render<T: DrawTarget + ?Sized>(&self, target: &mut T, mesh: &Mesh) -> Result<usize> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(StrataError::InvalidTarget(format!(
                "viewport {}x{} has no area",
                self.width, self.height
            )));
        }

        let mut prepared: Vec<(Triangle, Color)> = mesh
            .triangles()
            .iter()
            .map(|t| (t.transform(&self.view), self.shade_triangle(mesh, t)))
            .collect();

        if self.options.depth_sort {
            prepared.sort_by(|(a, _), (b, _)| Triangle::compare_by_depth(b, a));
        }

        for (view_space, color) in &prepared {
            let screen = self.to_screen(view_space);
            if self.options.wireframe {
                screen.render_wire(target, *color)?;
            } else {
                screen.render_fill(target, *color)?;
            }
        }

        log::trace!("mesh rendered: {} triangles", prepared.len());
        Ok(prepared.len())
    }
}
