/// Software RGBA framebuffer implementing the core draw primitive
///
/// Triangles are filled in submission order with no depth buffer, so the
/// last triangle drawn over a pixel wins (subject to its alpha).
use strata_core::{Color, DrawTarget, Result, ScreenPoint, StrataError, TexCoord, TextureHandle};

use crate::texture::TextureStore;

pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    textures: TextureStore,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
            textures: TextureStore::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureStore {
        &mut self.textures
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Changes the size and clears to black. Textures are kept.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Color::BLACK; width * height];
    }

    fn ensure_drawable(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StrataError::InvalidTarget(format!(
                "framebuffer {}x{} has no pixels",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Source-over blend of `color` onto the pixel at `(x, y)`.
    fn blend_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.width || y >= self.height || color.a == 0 {
            return;
        }
        let idx = y * self.width + x;
        self.pixels[idx] = blend(color, self.pixels[idx]);
    }
}

fn blend(front: Color, back: Color) -> Color {
    let a = front.a as u16;
    let inv_a = 255 - a;
    let mix = |f: u8, b: u8| ((f as u16 * a + b as u16 * inv_a) / 255) as u8;
    Color::new(
        mix(front.r, back.r),
        mix(front.g, back.g),
        mix(front.b, back.b),
        (a + back.a as u16 * inv_a / 255) as u8,
    )
}

fn modulate(texel: Color, color: Color) -> Color {
    let m = |t: u8, c: u8| ((t as u16 * c as u16) / 255) as u8;
    Color::new(m(texel.r, color.r), m(texel.g, color.g), m(texel.b, color.b), m(texel.a, color.a))
}

/// Barycentric weights of `p`. Independent of winding; `None` when degenerate.
fn barycentric(
    v0: ScreenPoint,
    v1: ScreenPoint,
    v2: ScreenPoint,
    px: f32,
    py: f32,
) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (px - v2.x) + (v2.x - v1.x) * (py - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (px - v2.x) + (v0.x - v2.x) * (py - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

impl DrawTarget for Framebuffer {
    fn draw_filled_triangle(
        &mut self,
        points: [ScreenPoint; 3],
        color: Color,
        texture: Option<TextureHandle>,
        uv: Option<[TexCoord; 3]>,
    ) -> Result<()> {
        self.ensure_drawable()?;
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Ok(());
        }
        let [v0, v1, v2] = points;

        // Bounding box, clipped to the buffer
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i64).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i64).min(self.width as i64 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i64).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i64).min(self.height as i64 - 1);

        let uv = uv.unwrap_or([TexCoord::default(); 3]);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let Some((w0, w1, w2)) = barycentric(v0, v1, v2, px, py) else {
                    return Ok(());
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let shade = match texture.and_then(|h| self.textures.get(h)) {
                    Some(tex) => {
                        let u = w0 * uv[0].u + w1 * uv[1].u + w2 * uv[2].u;
                        let v = w0 * uv[0].v + w1 * uv[1].v + w2 * uv[2].v;
                        modulate(tex.sample(u, v), color)
                    }
                    None => color,
                };
                self.blend_pixel(x as usize, y as usize, shade);
            }
        }
        Ok(())
    }

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) -> Result<()> {
        self.ensure_drawable()?;
        if !(from.x.is_finite() && from.y.is_finite() && to.x.is_finite() && to.y.is_finite()) {
            return Ok(());
        }
        let (x0, y0) = (from.x.floor() as i64, from.y.floor() as i64);
        let (x1, y1) = (to.x.floor() as i64, to.y.floor() as i64);

        // Bresenham
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            if x >= 0 && y >= 0 {
                self.blend_pixel(x as usize, y as usize, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Ok(())
    }
}
