/// Draw primitives consumed by the pipeline and the compositor
///
/// The core never rasterizes by itself: it emits screen-space triangles and
/// lines into a [`DrawTarget`] provided by the surrounding renderer, and
/// asks a [`TextureLoader`] for texture handles.
use std::path::Path;

use log::warn;

use crate::error::Result;

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Opaque grey with all three channels set to `level`.
    pub const fn grey(level: u8) -> Self {
        Self::rgb(level, level, level)
    }
}

/// A position in target pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Normalized texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
}

impl TexCoord {
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

/// Opaque handle to a texture owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// The device-side drawing surface.
pub trait DrawTarget {
    /// Fill one triangle with a uniform colour, optionally textured.
    ///
    /// When `texture` is set the colour modulates the sampled texel and
    /// `uv` gives the per-vertex coordinates (missing `uv` samples `(0,0)`).
    fn draw_filled_triangle(
        &mut self,
        points: [ScreenPoint; 3],
        color: Color,
        texture: Option<TextureHandle>,
        uv: Option<[TexCoord; 3]>,
    ) -> Result<()>;

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) -> Result<()>;
}

/// Resolves asset paths into texture handles.
///
/// Failure is recoverable: callers log it and keep the geometry untextured.
pub trait TextureLoader {
    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle>;
}

/// Loads a texture, or logs a warning and returns `None` so the caller can
/// build the geometry untextured.
pub fn load_texture_or_warn<L: TextureLoader + ?Sized>(
    loader: &mut L,
    path: &Path,
) -> Option<TextureHandle> {
    match loader.load_texture(path) {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!("drawing without texture {}: {}", path.display(), err);
            None
        }
    }
}

/// A draw call captured by [`DrawRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Triangle {
        points: [ScreenPoint; 3],
        color: Color,
        texture: Option<TextureHandle>,
        uv: Option<[TexCoord; 3]>,
    },
    Line {
        from: ScreenPoint,
        to: ScreenPoint,
        color: Color,
    },
}

/// Draw target that records calls in emission order instead of drawing.
#[derive(Debug, Default)]
pub struct DrawRecorder {
    calls: Vec<DrawCall>,
}

impl DrawRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn triangles(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Triangle { .. }))
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawTarget for DrawRecorder {
    fn draw_filled_triangle(
        &mut self,
        points: [ScreenPoint; 3],
        color: Color,
        texture: Option<TextureHandle>,
        uv: Option<[TexCoord; 3]>,
    ) -> Result<()> {
        self.calls.push(DrawCall::Triangle { points, color, texture, uv });
        Ok(())
    }

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) -> Result<()> {
        self.calls.push(DrawCall::Line { from, to, color });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrataError;

    struct OneTexture;

    impl TextureLoader for OneTexture {
        fn load_texture(&mut self, path: &Path) -> Result<TextureHandle> {
            if path == Path::new("tiles.png") {
                Ok(TextureHandle(1))
            } else {
                Err(StrataError::TextureLoad {
                    path: path.to_path_buf(),
                    reason: "not found".into(),
                })
            }
        }
    }

    #[test]
    fn test_failed_texture_load_yields_none() {
        let mut loader = OneTexture;
        assert_eq!(
            load_texture_or_warn(&mut loader, Path::new("tiles.png")),
            Some(TextureHandle(1))
        );
        assert_eq!(load_texture_or_warn(&mut loader, Path::new("missing.png")), None);
    }

    #[test]
    fn test_recorder_keeps_order() {
        let mut rec = DrawRecorder::new();
        let p = [ScreenPoint::new(0.0, 0.0); 3];
        rec.draw_filled_triangle(p, Color::WHITE, None, None).unwrap();
        rec.draw_line(p[0], p[1], Color::YELLOW).unwrap();
        rec.draw_filled_triangle(p, Color::BLACK, Some(TextureHandle(3)), None).unwrap();

        assert_eq!(rec.calls().len(), 3);
        assert_eq!(rec.triangles().count(), 2);
        assert!(matches!(
            rec.calls()[2],
            DrawCall::Triangle { color: Color::BLACK, texture: Some(TextureHandle(3)), .. }
        ));

        rec.clear();
        assert!(rec.calls().is_empty());
    }
}
