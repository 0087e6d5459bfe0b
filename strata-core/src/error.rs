/// Error types shared by the pipeline, the compositor and the collaborators
use std::path::PathBuf;

/// Errors that can occur while building or rendering geometry.
#[derive(Debug)]
pub enum StrataError {
    /// The draw target cannot accept draw calls (e.g. zero-sized surface).
    InvalidTarget(String),
    /// A triangle was appended to a mesh that is already at its limit.
    CapacityExceeded { capacity: usize },
    /// A texture could not be loaded. Recoverable: geometry stays untextured.
    TextureLoad { path: PathBuf, reason: String },
    /// Configuration failed validation.
    InvalidConfig(String),
    /// Mesh data was invalid or corrupt.
    MeshParse(String),
    /// Underlying IO failure.
    Io(std::io::Error),
}

impl std::fmt::Display for StrataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrataError::InvalidTarget(msg) => write!(f, "invalid draw target: {}", msg),
            StrataError::CapacityExceeded { capacity } => {
                write!(f, "mesh capacity of {} triangles exceeded", capacity)
            }
            StrataError::TextureLoad { path, reason } => {
                write!(f, "failed to load texture '{}': {}", path.display(), reason)
            }
            StrataError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            StrataError::MeshParse(msg) => write!(f, "mesh parse error: {}", msg),
            StrataError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StrataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StrataError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StrataError {
    fn from(e: std::io::Error) -> Self {
        StrataError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, StrataError>;
