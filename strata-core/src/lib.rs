/// Strata Core Library - 3-D transform pipeline and layered 2-D compositor
///
/// This library holds the device-independent part of the renderer: vector,
/// matrix and quaternion algebra, the triangle/mesh pipeline, the
/// depth-layered scene compositor and configuration. Drawing, texture
/// loading and mesh files belong to the host; the first two are reached
/// through [`DrawTarget`] and [`TextureLoader`].

pub mod camera;
pub mod config;
pub mod draw;
pub mod error;
pub mod grid;
pub mod layer;
pub mod logging;
pub mod matrix;
pub mod mesh;
pub mod quaternion;
pub mod scene;
pub mod triangle;
pub mod vertex;

// Re-export commonly used types
pub use camera::{Camera, SceneCamera};
pub use config::RenderConfig;
pub use draw::{
    load_texture_or_warn, Color, DrawCall, DrawRecorder, DrawTarget, ScreenPoint, TexCoord,
    TextureHandle, TextureLoader,
};
pub use error::{Result, StrataError};
pub use grid::GridPlane;
pub use layer::{OverlayPlane, Plane, PlaneLayer, UvRect};
pub use logging::{init_logging, LoggingConfig};
pub use matrix::Matrix;
pub use mesh::{Mesh, MeshRenderer, RenderOptions, PLAYER_TINT};
pub use quaternion::Quaternion;
pub use scene::{FrameStats, LayeredScene};
pub use triangle::Triangle;
pub use vertex::Vertex;
