/// Depth-layered 2-D compositor
///
/// Layers are stored in insertion order. A frame is drawn in two passes:
///
/// 1. world layers in reverse insertion order, each shifted by the camera,
///    multiplied by its parallax and shrunk about the viewport centre by
///    `1 / (1 + depth * depth_scale)`;
/// 2. overlay layers in insertion order, mapped straight onto the viewport.
///
/// Draw order is the only occlusion mechanism, so callers that want the
/// far-to-near look either insert near layers first or call
/// [`LayeredScene::sort_by_depth`].
use log::{debug, trace};

use crate::camera::SceneCamera;
use crate::config::RenderConfig;
use crate::draw::{Color, DrawTarget, ScreenPoint};
use crate::error::{Result, StrataError};
use crate::layer::{Plane, PlaneLayer};
use crate::vertex::Vertex;

/// Layers whose scale drops to this value or below are not drawn.
pub const MIN_LAYER_SCALE: f32 = 0.001;

const CROSSHAIR_HALF_SIZE: f32 = 5.0;

/// Per-frame counters returned by [`LayeredScene::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub triangles: usize,
    pub skipped_layers: usize,
}

/// Shrink factor of a world layer at `depth`.
pub fn layer_scale(depth: f32, depth_scale: f32) -> f32 {
    1.0 / (1.0 + depth * depth_scale)
}

fn world_to_screen(
    v: Vertex,
    camera: &SceneCamera,
    parallax: f32,
    scale: f32,
    viewport: (f32, f32),
) -> ScreenPoint {
    let nx = (v.x - camera.x) * parallax * scale + 0.5;
    let ny = (v.y - camera.y) * parallax * scale + 0.5;
    ScreenPoint::new(nx * viewport.0, ny * viewport.1)
}

fn overlay_to_screen(v: Vertex, viewport: (f32, f32)) -> ScreenPoint {
    ScreenPoint::new(v.x * viewport.0, v.y * viewport.1)
}

fn debug_color(index: usize) -> Color {
    Color::new(
        (index.wrapping_mul(47) & 0xff) as u8,
        (index.wrapping_mul(97) & 0xff) as u8,
        (index.wrapping_mul(157) & 0xff) as u8,
        200,
    )
}

#[derive(Debug, Clone, Default)]
pub struct LayeredScene {
    planes: Vec<Plane>,
}

impl LayeredScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty quad layer and hands it back for population.
    pub fn create_layer(&mut self, depth: f32, parallax: f32, overlay: bool) -> &mut PlaneLayer {
        self.planes.push(Plane::Quad(PlaneLayer::new(depth, parallax, overlay)));
        let Some(Plane::Quad(layer)) = self.planes.last_mut() else {
            unreachable!("a quad layer was just pushed");
        };
        layer
    }

    /// [`LayeredScene::create_layer`] for a world layer using
    /// `config.default_parallax`.
    pub fn create_default_layer(&mut self, depth: f32, config: &RenderConfig) -> &mut PlaneLayer {
        self.create_layer(depth, config.default_parallax, false)
    }

    pub fn add_plane(&mut self, plane: impl Into<Plane>) {
        self.planes.push(plane.into());
    }

    /// Stable ascending sort on depth, so nearer layers come first in
    /// storage and are drawn last by the world pass.
    pub fn sort_by_depth(&mut self) {
        self.planes.sort_by(|a, b| a.depth().total_cmp(&b.depth()));
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn render<T: DrawTarget + ?Sized>(
        &self,
        target: &mut T,
        camera: &SceneCamera,
        config: &RenderConfig,
    ) -> Result<FrameStats> {
        let viewport = config.viewport();
        if viewport.0 <= 0.0 || viewport.1 <= 0.0 {
            return Err(StrataError::InvalidTarget(format!(
                "viewport {}x{} has no area",
                viewport.0, viewport.1
            )));
        }

        let mut stats = FrameStats::default();

        for (index, plane) in self.planes.iter().enumerate().rev() {
            if plane.is_overlay() {
                continue;
            }
            let scale = layer_scale(plane.depth(), config.depth_scale);
            if scale <= MIN_LAYER_SCALE {
                debug!("skipping layer {} at depth {} (scale {})", index, plane.depth(), scale);
                stats.skipped_layers += 1;
                continue;
            }
            let parallax = plane.parallax();
            stats.triangles += emit_plane(target, plane, |v| {
                world_to_screen(v, camera, parallax, scale, viewport)
            })?;
        }

        for plane in self.planes.iter().filter(|p| p.is_overlay()) {
            stats.triangles += emit_plane(target, plane, |v| overlay_to_screen(v, viewport))?;
        }

        if config.debug_overlay {
            self.render_debug(target, camera, config)?;
        }

        trace!(
            "layered frame: {} triangles, {} layers skipped",
            stats.triangles,
            stats.skipped_layers
        );
        Ok(stats)
    }

    fn render_debug<T: DrawTarget + ?Sized>(
        &self,
        target: &mut T,
        camera: &SceneCamera,
        config: &RenderConfig,
    ) -> Result<()> {
        let viewport = config.viewport();
        let (cx, cy) = (viewport.0 * 0.5, viewport.1 * 0.5);
        target.draw_line(
            ScreenPoint::new(cx - CROSSHAIR_HALF_SIZE, cy),
            ScreenPoint::new(cx + CROSSHAIR_HALF_SIZE, cy),
            Color::YELLOW,
        )?;
        target.draw_line(
            ScreenPoint::new(cx, cy - CROSSHAIR_HALF_SIZE),
            ScreenPoint::new(cx, cy + CROSSHAIR_HALF_SIZE),
            Color::YELLOW,
        )?;

        for (index, plane) in self.planes.iter().enumerate() {
            if plane.triangles().is_empty() {
                continue;
            }
            let scale = layer_scale(plane.depth(), config.depth_scale);
            let parallax = plane.parallax();
            let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
            let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
            for v in plane.triangles().iter().flat_map(|t| t.v) {
                let p = if plane.is_overlay() {
                    overlay_to_screen(v, viewport)
                } else {
                    world_to_screen(v, camera, parallax, scale, viewport)
                };
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            let w = (max_x - min_x).max(1.0);
            let h = (max_y - min_y).max(1.0);

            debug!(
                "layer {} bounds normalized [{:.3},{:.3}]-[{:.3},{:.3}] \
                 pixels [{:.0},{:.0}]-[{:.0},{:.0}]",
                index,
                min_x / viewport.0,
                min_y / viewport.1,
                max_x / viewport.0,
                max_y / viewport.1,
                min_x,
                min_y,
                min_x + w,
                min_y + h
            );

            let color = debug_color(index);
            let corners = [
                ScreenPoint::new(min_x, min_y),
                ScreenPoint::new(min_x + w, min_y),
                ScreenPoint::new(min_x + w, min_y + h),
                ScreenPoint::new(min_x, min_y + h),
            ];
            for i in 0..4 {
                target.draw_line(corners[i], corners[(i + 1) % 4], color)?;
            }
        }
        Ok(())
    }
}

fn emit_plane<T: DrawTarget + ?Sized>(
    target: &mut T,
    plane: &Plane,
    to_screen: impl Fn(Vertex) -> ScreenPoint,
) -> Result<usize> {
    let colors = plane.colors();
    let textures = plane.textures();
    let uvs = plane.uvs();
    for (i, tri) in plane.triangles().iter().enumerate() {
        target.draw_filled_triangle(
            tri.v.map(&to_screen),
            colors.get(i).copied().unwrap_or(Color::WHITE),
            textures.get(i).copied().flatten(),
            uvs.get(i).copied(),
        )?;
    }
    Ok(plane.triangles().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{DrawCall, DrawRecorder, TexCoord, TextureHandle};
    use crate::grid::GridPlane;
    use crate::layer::{OverlayPlane, UvRect};

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn triangle_calls(rec: &DrawRecorder) -> Vec<([ScreenPoint; 3], Color)> {
        rec.triangles()
            .filter_map(|c| match c {
                DrawCall::Triangle { points, color, .. } => Some((*points, *color)),
                _ => None,
            })
            .collect()
    }

    fn close(p: ScreenPoint, x: f32, y: f32) -> bool {
        (p.x - x).abs() < 1e-3 && (p.y - y).abs() < 1e-3
    }

    #[test]
    fn test_depth_zero_has_unit_scale() {
        for k in [0.0, 0.5, 1.0, 1000.0] {
            assert_eq!(layer_scale(0.0, k), 1.0);
        }
        assert_eq!(layer_scale(1.0, 1.0), 0.5);
    }

    #[test]
    fn test_world_mapping_with_camera_and_parallax() {
        let mut scene = LayeredScene::new();
        scene
            .create_layer(0.0, 0.5, false)
            .add_quad(0.5, 0.5, 0.5, 0.5, RED, None, None);
        let mut rec = DrawRecorder::new();
        let cam = SceneCamera::new(0.2, 0.1);
        scene.render(&mut rec, &cam, &RenderConfig::default()).unwrap();

        let calls = triangle_calls(&rec);
        assert_eq!(calls.len(), 2);
        // (0.5 - 0.2) * 0.5 + 0.5 = 0.65 and (0.5 - 0.1) * 0.5 + 0.5 = 0.7
        assert!(close(calls[0].0[0], 0.65 * 640.0, 0.7 * 480.0));
    }

    #[test]
    fn test_default_layer_keeps_quad_extent() {
        let mut scene = LayeredScene::new();
        let mut layer = PlaneLayer::default();
        layer.add_quad(0.0, 0.0, 0.5, 0.5, RED, None, None);
        scene.add_plane(layer);
        let mut rec = DrawRecorder::new();
        scene
            .render(&mut rec, &SceneCamera::default(), &RenderConfig::default())
            .unwrap();

        let first = triangle_calls(&rec)[0].0;
        // (0.0 - 0.0) * 1.0 + 0.5 and (0.5 - 0.0) * 1.0 + 0.5
        assert!(close(first[0], 320.0, 240.0));
        assert!(close(first[1], 640.0, 240.0));
        assert!(close(first[2], 640.0, 480.0));
    }

    #[test]
    fn test_default_parallax_comes_from_config() {
        let config = RenderConfig {
            default_parallax: 0.5,
            ..RenderConfig::default()
        };
        let mut scene = LayeredScene::new();
        scene
            .create_default_layer(0.0, &config)
            .add_quad(0.5, 0.5, 0.5, 0.5, RED, None, None);
        assert_eq!(scene.planes()[0].parallax(), 0.5);
        assert!(!scene.planes()[0].is_overlay());

        let mut rec = DrawRecorder::new();
        let cam = SceneCamera::new(0.2, 0.1);
        scene.render(&mut rec, &cam, &config).unwrap();
        assert!(close(triangle_calls(&rec)[0].0[0], 0.65 * 640.0, 0.7 * 480.0));
    }

    #[test]
    fn test_depth_shrinks_about_center() {
        let mut scene = LayeredScene::new();
        scene
            .create_layer(1.0, 1.0, false)
            .add_quad(0.0, 0.0, 1.0, 1.0, RED, None, None);
        let mut rec = DrawRecorder::new();
        scene
            .render(&mut rec, &SceneCamera::default(), &RenderConfig::default())
            .unwrap();

        let first = triangle_calls(&rec)[0].0;
        assert!(close(first[0], 320.0, 240.0));
        assert!(close(first[2], 640.0, 480.0));
    }

    #[test]
    fn test_tiny_scale_layer_is_skipped() {
        let config = RenderConfig { depth_scale: 2000.0, ..Default::default() };
        let mut scene = LayeredScene::new();
        scene.create_layer(1.0, 1.0, false).add_quad(0.0, 0.0, 1.0, 1.0, RED, None, None);
        scene.create_layer(0.0, 1.0, false).add_quad(0.0, 0.0, 1.0, 1.0, BLUE, None, None);

        let mut rec = DrawRecorder::new();
        let stats = scene.render(&mut rec, &SceneCamera::default(), &config).unwrap();

        assert_eq!(stats, FrameStats { triangles: 2, skipped_layers: 1 });
        assert!(triangle_calls(&rec).iter().all(|(_, c)| *c == BLUE));
    }

    #[test]
    fn test_world_pass_runs_in_reverse_insertion_order() {
        let mut scene = LayeredScene::new();
        scene.create_layer(0.0, 1.0, false).add_quad(0.0, 0.0, 0.5, 0.5, RED, None, None);
        scene.create_layer(1.0, 1.0, false).add_quad(0.0, 0.0, 0.5, 0.5, BLUE, None, None);

        let mut rec = DrawRecorder::new();
        scene
            .render(&mut rec, &SceneCamera::default(), &RenderConfig::default())
            .unwrap();
        let colors: Vec<Color> = triangle_calls(&rec).into_iter().map(|(_, c)| c).collect();
        assert_eq!(colors, vec![BLUE, BLUE, RED, RED]);
    }

    #[test]
    fn test_sort_by_depth_puts_near_layers_first() {
        let mut scene = LayeredScene::new();
        scene.create_layer(3.0, 1.0, false);
        scene.create_layer(0.0, 1.0, false);
        scene.create_layer(1.0, 1.0, false);
        scene.sort_by_depth();
        let depths: Vec<f32> = scene.planes().iter().map(Plane::depth).collect();
        assert_eq!(depths, vec![0.0, 1.0, 3.0]);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_overlay_pass_ignores_camera_and_runs_last() {
        let mut overlay = OverlayPlane::new(5.0);
        overlay.add_quad(0.5, 0.5, 0.25, 0.25, Color::YELLOW, None, None);

        let mut scene = LayeredScene::new();
        scene.add_plane(overlay);
        scene.create_layer(0.0, 1.0, false).add_quad(0.0, 0.0, 0.1, 0.1, RED, None, None);

        let mut rec = DrawRecorder::new();
        let cam = SceneCamera::new(3.0, -2.0);
        let config = RenderConfig { depth_scale: 10.0, ..Default::default() };
        let stats = scene.render(&mut rec, &cam, &config).unwrap();

        assert_eq!(stats.triangles, 4);
        let calls = triangle_calls(&rec);
        assert_eq!(calls[0].1, RED);
        assert_eq!(calls[2].1, Color::YELLOW);
        assert!(close(calls[2].0[0], 320.0, 240.0));
        assert!(close(calls[2].0[1], 480.0, 240.0));
    }

    #[test]
    fn test_texture_and_uv_pass_through() {
        let mut scene = LayeredScene::new();
        scene.create_layer(0.0, 1.0, false).add_quad(
            0.0,
            0.0,
            1.0,
            1.0,
            Color::WHITE,
            Some(TextureHandle(4)),
            Some(UvRect::new(0.0, 0.0, 0.5, 0.5)),
        );
        let mut rec = DrawRecorder::new();
        scene
            .render(&mut rec, &SceneCamera::default(), &RenderConfig::default())
            .unwrap();
        match &rec.calls()[0] {
            DrawCall::Triangle { texture, uv, .. } => {
                assert_eq!(*texture, Some(TextureHandle(4)));
                assert_eq!(uv.unwrap()[1], TexCoord::new(0.5, 0.0));
            }
            other => panic!("expected triangle, got {:?}", other),
        }
    }

    #[test]
    fn test_grid_plane_renders_through_scene() {
        let config = RenderConfig::default();
        let mut grid = GridPlane::new(0.0, 1.0, false, 64, &config);
        grid.set_cell(0, 0, RED, None, None).set_cell(1, 0, BLUE, None, None);
        let mut scene = LayeredScene::new();
        scene.add_plane(grid);

        let mut rec = DrawRecorder::new();
        let stats = scene.render(&mut rec, &SceneCamera::default(), &config).unwrap();
        assert_eq!(stats.triangles, 4);
        // Cell (0,0) starts at the viewport centre with the camera at the origin.
        assert!(close(triangle_calls(&rec)[0].0[0], 320.0, 240.0));
    }

    #[test]
    fn test_debug_overlay_draws_crosshair_and_bounds() {
        let config = RenderConfig { debug_overlay: true, ..Default::default() };
        let mut scene = LayeredScene::new();
        scene.create_layer(0.0, 1.0, false).add_quad(0.0, 0.0, 0.25, 0.25, RED, None, None);
        scene.create_layer(1.0, 1.0, false);
        scene.add_plane(OverlayPlane::new(0.0));

        let mut rec = DrawRecorder::new();
        scene.render(&mut rec, &SceneCamera::default(), &config).unwrap();

        let lines: Vec<&DrawCall> = rec
            .calls()
            .iter()
            .filter(|c| matches!(c, DrawCall::Line { .. }))
            .collect();
        // Crosshair plus one rectangle for the only non-empty layer.
        assert_eq!(lines.len(), 6);
        assert!(matches!(lines[0], DrawCall::Line { color: Color::YELLOW, .. }));
        assert!(matches!(
            lines[2],
            DrawCall::Line { color, .. } if *color == Color::new(0, 0, 0, 200)
        ));
    }

    #[test]
    fn test_zero_viewport_is_rejected() {
        let config = RenderConfig { window_width: 0, ..Default::default() };
        let mut rec = DrawRecorder::new();
        let err = LayeredScene::new()
            .render(&mut rec, &SceneCamera::default(), &config)
            .unwrap_err();
        assert!(matches!(err, StrataError::InvalidTarget(_)));
    }
}
