/// Grid of fixed pixel-size cells addressed by integer coordinates
use std::collections::HashMap;

use crate::config::RenderConfig;
use crate::draw::{Color, TextureHandle};
use crate::layer::{PlaneGeometry, UvRect};

pub const DEFAULT_CELL_SIZE_PX: u32 = 64;

/// Cells are baked into normalized quads using the viewport size captured
/// when the grid is created. Later viewport changes do not rescale it.
#[derive(Debug, Clone)]
pub struct GridPlane {
    depth: f32,
    parallax: f32,
    overlay: bool,
    cell_size_px: u32,
    viewport: (f32, f32),
    geometry: PlaneGeometry,
    /// Cell coordinates to the index of the cell's first triangle.
    cells: HashMap<(i32, i32), usize>,
}

impl GridPlane {
    pub fn new(
        depth: f32,
        parallax: f32,
        overlay: bool,
        cell_size_px: u32,
        config: &RenderConfig,
    ) -> Self {
        Self {
            depth,
            parallax,
            overlay,
            cell_size_px,
            viewport: config.viewport(),
            geometry: PlaneGeometry::default(),
            cells: HashMap::new(),
        }
    }

    /// Places the cell at `(gx, gy)`, or restyles it if it already exists.
    pub fn set_cell(
        &mut self,
        gx: i32,
        gy: i32,
        color: Color,
        texture: Option<TextureHandle>,
        uv: Option<UvRect>,
    ) -> &mut Self {
        if let Some(&first) = self.cells.get(&(gx, gy)) {
            self.geometry.restyle_quad(first, color, texture, uv);
            return self;
        }

        let (width, height) = self.viewport;
        let size = self.cell_size_px as f32;
        let px = gx as f32 * size;
        let py = gy as f32 * size;
        let first = self.geometry.push_quad(
            px / width,
            py / height,
            size / width,
            size / height,
            self.depth,
            color,
            texture,
            uv,
        );
        self.cells.insert((gx, gy), first);
        self
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_size_px(&self) -> u32 {
        self.cell_size_px
    }

    pub fn geometry(&self) -> &PlaneGeometry {
        &self.geometry
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn parallax(&self) -> f32 {
        self.parallax
    }

    pub fn is_overlay(&self) -> bool {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridPlane {
        GridPlane::new(0.0, 1.0, false, DEFAULT_CELL_SIZE_PX, &RenderConfig::default())
    }

    #[test]
    fn test_origin_cell_bounds() {
        let mut g = grid();
        g.set_cell(0, 0, Color::WHITE, None, None);
        let tris = g.geometry().triangles();
        assert_eq!(tris.len(), 2);

        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        for v in tris.iter().flat_map(|t| t.v) {
            min_x = min_x.min(v.x);
            min_y = min_y.min(v.y);
            max_x = max_x.max(v.x);
            max_y = max_y.max(v.y);
        }
        assert_eq!((min_x, min_y), (0.0, 0.0));
        assert!((max_x - 0.1).abs() < 1e-6);
        assert!((max_y - 64.0 / 480.0).abs() < 1e-6);
    }

    #[test]
    fn test_cells_offset_by_cell_size() {
        let mut g = grid();
        g.set_cell(2, -1, Color::WHITE, None, None);
        let a = g.geometry().triangles()[0].v[0];
        assert!((a.x - 0.2).abs() < 1e-6);
        assert!((a.y + 64.0 / 480.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_cell_updates_in_place() {
        let mut g = grid();
        g.set_cell(1, 1, Color::WHITE, None, None)
            .set_cell(3, 0, Color::WHITE, None, None)
            .set_cell(
                1,
                1,
                Color::YELLOW,
                Some(TextureHandle(2)),
                Some(UvRect::new(0.0, 0.0, 0.5, 0.5)),
            );

        assert_eq!(g.cell_count(), 2);
        let geo = g.geometry();
        assert_eq!(geo.len(), 4);
        assert_eq!(&geo.colors()[..2], &[Color::YELLOW, Color::YELLOW]);
        assert_eq!(&geo.colors()[2..], &[Color::WHITE, Color::WHITE]);
        assert_eq!(geo.textures()[1], Some(TextureHandle(2)));
        assert_eq!(geo.uvs()[0][1].u, 0.5);
    }

    #[test]
    fn test_viewport_is_captured_at_construction() {
        let mut config = RenderConfig {
            window_width: 320,
            window_height: 240,
            ..Default::default()
        };
        let mut g = GridPlane::new(0.0, 1.0, false, 32, &config);
        config.window_width = 1280;
        assert_eq!(config.viewport(), (1280.0, 240.0));
        g.set_cell(1, 0, Color::WHITE, None, None);
        assert!((g.geometry().triangles()[0].v[0].x - 0.1).abs() < 1e-6);
    }
}
