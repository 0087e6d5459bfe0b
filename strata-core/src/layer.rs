/// Renderable planes of the layered scene
///
/// Every plane stores its triangles in normalized `[0, 1]` viewport
/// coordinates (origin top-left) with one colour, optional texture and UV
/// triple per triangle. The plane kinds form a closed set, see [`Plane`].
use crate::draw::{Color, TexCoord, TextureHandle};
use crate::grid::GridPlane;
use crate::triangle::Triangle;
use crate::vertex::Vertex;

/// Texture sub-rectangle in normalized UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect { u0: 0.0, v0: 0.0, u1: 1.0, v1: 1.0 };

    pub const fn new(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self { u0, v0, u1, v1 }
    }

    /// UVs for the two triangles `(a, b, c)` and `(a, c, d)` of a quad.
    pub fn quad_uvs(&self) -> [[TexCoord; 3]; 2] {
        let (a, b, c, d) = (
            TexCoord::new(self.u0, self.v0),
            TexCoord::new(self.u1, self.v0),
            TexCoord::new(self.u1, self.v1),
            TexCoord::new(self.u0, self.v1),
        );
        [[a, b, c], [a, c, d]]
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// Triangle list with parallel per-triangle attributes.
#[derive(Debug, Clone, Default)]
pub struct PlaneGeometry {
    triangles: Vec<Triangle>,
    colors: Vec<Color>,
    textures: Vec<Option<TextureHandle>>,
    uvs: Vec<[TexCoord; 3]>,
}

impl PlaneGeometry {
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn textures(&self) -> &[Option<TextureHandle>] {
        &self.textures
    }

    pub fn uvs(&self) -> &[[TexCoord; 3]] {
        &self.uvs
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    fn quad_triangles(x: f32, y: f32, w: f32, h: f32, z: f32) -> [Triangle; 2] {
        let a = Vertex::point(x, y, z);
        let b = Vertex::point(x + w, y, z);
        let c = Vertex::point(x + w, y + h, z);
        let d = Vertex::point(x, y + h, z);
        [Triangle::new(a, b, c), Triangle::new(a, c, d)]
    }

    /// Appends a quad as two triangles and returns the index of the first.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn push_quad(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        z: f32,
        color: Color,
        texture: Option<TextureHandle>,
        uv: Option<UvRect>,
    ) -> usize {
        let first = self.triangles.len();
        let uvs = uv.unwrap_or_default().quad_uvs();
        for (tri, uv) in Self::quad_triangles(x, y, w, h, z).into_iter().zip(uvs) {
            self.triangles.push(tri);
            self.colors.push(color);
            self.textures.push(texture);
            self.uvs.push(uv);
        }
        first
    }

    /// Rewrites the attributes of the quad starting at triangle `first`.
    pub(crate) fn restyle_quad(
        &mut self,
        first: usize,
        color: Color,
        texture: Option<TextureHandle>,
        uv: Option<UvRect>,
    ) {
        let uvs = uv.unwrap_or_default().quad_uvs();
        for (i, uv) in (first..first + 2).zip(uvs) {
            self.colors[i] = color;
            self.textures[i] = texture;
            self.uvs[i] = uv;
        }
    }
}

/// A world layer made of quads, drawn with parallax and depth scaling.
#[derive(Debug, Clone)]
pub struct PlaneLayer {
    depth: f32,
    /// 1.0 moves with the camera; smaller values move slower.
    parallax: f32,
    overlay: bool,
    geometry: PlaneGeometry,
}

impl PlaneLayer {
    pub fn new(depth: f32, parallax: f32, overlay: bool) -> Self {
        Self {
            depth,
            parallax,
            overlay,
            geometry: PlaneGeometry::default(),
        }
    }

    /// Adds a quad with top-left `(x, y)` and size `(w, h)`, all as fractions
    /// of the viewport. Without `uv` the quad maps the whole texture.
    #[allow(clippy::too_many_arguments)]
    pub fn add_quad(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
        texture: Option<TextureHandle>,
        uv: Option<UvRect>,
    ) -> &mut Self {
        self.geometry.push_quad(x, y, w, h, self.depth, color, texture, uv);
        self
    }
}

/// Depth 0, moving with the camera, in the world pass.
impl Default for PlaneLayer {
    fn default() -> Self {
        Self::new(0.0, 1.0, false)
    }
}

/// Screen-space UI plane. Always an overlay, parallax fixed at 1.
#[derive(Debug, Clone, Default)]
pub struct OverlayPlane {
    depth: f32,
    geometry: PlaneGeometry,
}

impl OverlayPlane {
    pub fn new(depth: f32) -> Self {
        Self {
            depth,
            geometry: PlaneGeometry::default(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_quad(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
        texture: Option<TextureHandle>,
        uv: Option<UvRect>,
    ) -> &mut Self {
        self.geometry.push_quad(x, y, w, h, self.depth, color, texture, uv);
        self
    }
}

/// The closed set of plane kinds a [`crate::scene::LayeredScene`] can hold.
#[derive(Debug, Clone)]
pub enum Plane {
    Quad(PlaneLayer),
    Grid(GridPlane),
    Overlay(OverlayPlane),
}

impl Plane {
    pub fn geometry(&self) -> &PlaneGeometry {
        match self {
            Plane::Quad(p) => &p.geometry,
            Plane::Grid(p) => p.geometry(),
            Plane::Overlay(p) => &p.geometry,
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        self.geometry().triangles()
    }

    pub fn colors(&self) -> &[Color] {
        self.geometry().colors()
    }

    pub fn textures(&self) -> &[Option<TextureHandle>] {
        self.geometry().textures()
    }

    pub fn uvs(&self) -> &[[TexCoord; 3]] {
        self.geometry().uvs()
    }

    pub fn depth(&self) -> f32 {
        match self {
            Plane::Quad(p) => p.depth,
            Plane::Grid(p) => p.depth(),
            Plane::Overlay(p) => p.depth,
        }
    }

    pub fn parallax(&self) -> f32 {
        match self {
            Plane::Quad(p) => p.parallax,
            Plane::Grid(p) => p.parallax(),
            Plane::Overlay(_) => 1.0,
        }
    }

    pub fn is_overlay(&self) -> bool {
        match self {
            Plane::Quad(p) => p.overlay,
            Plane::Grid(p) => p.is_overlay(),
            Plane::Overlay(_) => true,
        }
    }
}

impl From<PlaneLayer> for Plane {
    fn from(p: PlaneLayer) -> Self {
        Plane::Quad(p)
    }
}

impl From<GridPlane> for Plane {
    fn from(p: GridPlane) -> Self {
        Plane::Grid(p)
    }
}

impl From<OverlayPlane> for Plane {
    fn from(p: OverlayPlane) -> Self {
        Plane::Overlay(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_quad_builds_two_triangles() {
        let mut layer = PlaneLayer::new(2.0, 0.5, false);
        layer.add_quad(0.1, 0.2, 0.3, 0.4, Color::WHITE, None, None);
        let plane = Plane::from(layer);

        assert_eq!(plane.triangles().len(), 2);
        assert_eq!(plane.colors(), &[Color::WHITE, Color::WHITE]);
        assert_eq!(plane.textures(), &[None, None]);

        let t = plane.triangles();
        assert_eq!(t[0].v[0], Vertex::point(0.1, 0.2, 2.0));
        assert_eq!(t[0].v[2], t[1].v[1]);
        assert!((t[1].v[2].y - 0.6).abs() < 1e-6);
        assert_eq!(plane.depth(), 2.0);
        assert_eq!(plane.parallax(), 0.5);
        assert!(!plane.is_overlay());
    }

    #[test]
    fn test_default_layer_follows_camera() {
        let mut layer = PlaneLayer::default();
        layer.add_quad(0.0, 0.0, 0.5, 0.5, Color::WHITE, None, None);
        let plane = Plane::from(layer);
        assert_eq!(plane.parallax(), 1.0);
        assert_eq!(plane.depth(), 0.0);
        assert!(!plane.is_overlay());
    }

    #[test]
    fn test_default_and_custom_uvs() {
        let mut layer = PlaneLayer::new(0.0, 1.0, false);
        let tex = Some(TextureHandle(7));
        layer
            .add_quad(0.0, 0.0, 1.0, 1.0, Color::WHITE, tex, None)
            .add_quad(
                0.0,
                0.0,
                1.0,
                1.0,
                Color::WHITE,
                tex,
                Some(UvRect::new(0.25, 0.5, 0.75, 1.0)),
            );
        let plane = Plane::from(layer);
        let uvs = plane.uvs();
        let tc = |u, v| TexCoord::new(u, v);

        assert_eq!(uvs[0], [tc(0.0, 0.0), tc(1.0, 0.0), tc(1.0, 1.0)]);
        assert_eq!(uvs[1], [tc(0.0, 0.0), tc(1.0, 1.0), tc(0.0, 1.0)]);
        assert_eq!(uvs[2], [tc(0.25, 0.5), tc(0.75, 0.5), tc(0.75, 1.0)]);
        assert_eq!(uvs[3], [tc(0.25, 0.5), tc(0.75, 1.0), tc(0.25, 1.0)]);
        assert!(plane.textures().iter().all(|t| *t == tex));
    }

    #[test]
    fn test_overlay_plane_is_always_overlay() {
        let mut overlay = OverlayPlane::new(3.0);
        overlay.add_quad(0.0, 0.0, 0.1, 0.1, Color::YELLOW, None, None);
        let plane = Plane::from(overlay);
        assert!(plane.is_overlay());
        assert_eq!(plane.parallax(), 1.0);
        assert_eq!(plane.depth(), 3.0);
        assert_eq!(plane.triangles().len(), 2);
    }
}
