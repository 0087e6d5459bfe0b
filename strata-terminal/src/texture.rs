/// Image-backed textures for the software framebuffer
use std::path::Path;

use log::info;
use strata_core::{Color, Result, StrataError, TextureHandle, TextureLoader};

/// RGBA texel grid, row-major from the top-left.
#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<Color>,
}

impl Texture {
    /// Returns `None` if `texels` does not hold exactly `width * height` entries
    /// or either side is zero.
    pub fn new(width: usize, height: usize, texels: Vec<Color>) -> Option<Self> {
        if width == 0 || height == 0 || texels.len() != width * height {
            return None;
        }
        Some(Self { width, height, texels })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .map_err(|e| StrataError::TextureLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let texels = img
            .pixels()
            .map(|p| Color::new(p[0], p[1], p[2], p[3]))
            .collect();
        Self::new(width as usize, height as usize, texels).ok_or_else(|| StrataError::TextureLoad {
            path: path.to_path_buf(),
            reason: "image has no pixels".into(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Nearest-texel lookup. Coordinates outside `[0, 1)` wrap.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let u_wrapped = u.rem_euclid(1.0);
        let v_wrapped = v.rem_euclid(1.0);
        let tx = ((u_wrapped * self.width as f32) as usize).min(self.width - 1);
        let ty = ((v_wrapped * self.height as f32) as usize).min(self.height - 1);
        self.texels[ty * self.width + tx]
    }
}

/// Owns every loaded texture; handles index into it.
#[derive(Debug, Default)]
pub struct TextureStore {
    textures: Vec<Texture>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, texture: Texture) -> TextureHandle {
        self.textures.push(texture);
        TextureHandle((self.textures.len() - 1) as u32)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureLoader for TextureStore {
    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle> {
        let texture = Texture::from_file(path)?;
        info!(
            "loaded texture {} ({}x{})",
            path.display(),
            texture.width(),
            texture.height()
        );
        Ok(self.insert(texture))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        Texture::new(
            2,
            2,
            vec![Color::WHITE, Color::BLACK, Color::BLACK, Color::WHITE],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_mismatched_texels() {
        assert!(Texture::new(2, 2, vec![Color::WHITE; 3]).is_none());
        assert!(Texture::new(0, 0, Vec::new()).is_none());
    }

    #[test]
    fn test_nearest_sampling_wraps() {
        let tex = checker();
        assert_eq!(tex.sample(0.1, 0.1), Color::WHITE);
        assert_eq!(tex.sample(0.9, 0.1), Color::BLACK);
        assert_eq!(tex.sample(0.9, 0.9), Color::WHITE);
        assert_eq!(tex.sample(1.0, 0.0), Color::WHITE);
        assert_eq!(tex.sample(-0.1, 0.1), Color::BLACK);
    }

    #[test]
    fn test_store_handles_index_in_order() {
        let mut store = TextureStore::new();
        let a = store.insert(checker());
        let b = store.insert(checker());
        assert_eq!((a, b), (TextureHandle(0), TextureHandle(1)));
        assert!(store.get(b).is_some());
        assert!(store.get(TextureHandle(9)).is_none());
    }

    #[test]
    fn test_missing_file_is_texture_error() {
        let mut store = TextureStore::new();
        let err = store.load_texture(Path::new("/nonexistent/tiles.png")).unwrap_err();
        assert!(matches!(err, StrataError::TextureLoad { .. }));
        assert!(store.is_empty());
    }
}
