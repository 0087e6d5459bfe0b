/// Homogeneous 4-component vector used for points, directions and normals
use nalgebra::Vector3;
use std::ops::{Add, Mul, Neg, Sub};

/// A homogeneous vertex.
///
/// `w` is 1.0 for points and 0.0 for directions. The arithmetic below only
/// ever reads and writes `x`, `y` and `z`; the result carries the left
/// operand's `w` untouched. Only the constructors assign `w` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vertex {
    pub const ZERO: Vertex = Vertex { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// A position (`w = 1`).
    pub const fn point(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 1.0)
    }

    /// A direction (`w = 0`).
    pub const fn direction(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 0.0)
    }

    /// The `x`, `y`, `z` part as a nalgebra vector.
    pub fn xyz(self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Rebuilds a vertex from `v` with an explicit `w`.
    pub fn from_xyz(v: Vector3<f32>, w: f32) -> Self {
        Self::new(v.x, v.y, v.z, w)
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32, w: f32) {
        *self = Self::new(x, y, z, w);
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn add(self, other: Vertex) -> Vertex {
        self.add_scalar(other.x, other.y, other.z)
    }

    pub fn subtract(self, other: Vertex) -> Vertex {
        self.subtract_scalar(other.x, other.y, other.z)
    }

    pub fn multiply(self, other: Vertex) -> Vertex {
        self.multiply_scalar(other.x, other.y, other.z)
    }

    /// Component-wise division. A zero component in `other` yields an
    /// infinite or NaN component, as with plain float division.
    pub fn divide(self, other: Vertex) -> Vertex {
        self.divide_scalar(other.x, other.y, other.z)
    }

    pub fn add_scalar(self, x: f32, y: f32, z: f32) -> Vertex {
        Vertex { x: self.x + x, y: self.y + y, z: self.z + z, w: self.w }
    }

    pub fn subtract_scalar(self, x: f32, y: f32, z: f32) -> Vertex {
        Vertex { x: self.x - x, y: self.y - y, z: self.z - z, w: self.w }
    }

    pub fn multiply_scalar(self, x: f32, y: f32, z: f32) -> Vertex {
        Vertex { x: self.x * x, y: self.y * y, z: self.z * z, w: self.w }
    }

    pub fn divide_scalar(self, x: f32, y: f32, z: f32) -> Vertex {
        Vertex { x: self.x / x, y: self.y / y, z: self.z / z, w: self.w }
    }

    /// Three-component dot product; `w` is ignored.
    pub fn dot(self, other: Vertex) -> f32 {
        self.xyz().dot(&other.xyz())
    }

    /// Standard 3-D cross product. The result is a direction (`w = 0`).
    pub fn cross(self, other: Vertex) -> Vertex {
        Vertex::from_xyz(self.xyz().cross(&other.xyz()), 0.0)
    }

    pub fn length(self) -> f32 {
        self.xyz().norm()
    }

    /// Unit-length copy of this vector.
    ///
    /// A zero-length vector has no direction; it is returned as the zero
    /// vector (keeping `w`) instead of dividing by zero.
    pub fn normalize(self) -> Vertex {
        self.try_normalize().unwrap_or(Vertex { w: self.w, ..Vertex::ZERO })
    }

    /// Like [`Vertex::normalize`] but reports the zero-length case.
    pub fn try_normalize(self) -> Option<Vertex> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        Some(Vertex::from_xyz(self.xyz() / len, self.w))
    }
}

impl Add for Vertex {
    type Output = Vertex;
    fn add(self, other: Vertex) -> Vertex {
        self.add_scalar(other.x, other.y, other.z)
    }
}

impl Sub for Vertex {
    type Output = Vertex;
    fn sub(self, other: Vertex) -> Vertex {
        self.subtract(other)
    }
}

impl Mul<f32> for Vertex {
    type Output = Vertex;
    fn mul(self, s: f32) -> Vertex {
        self.multiply_scalar(s, s, s)
    }
}

impl Neg for Vertex {
    type Output = Vertex;
    fn neg(self) -> Vertex {
        self.multiply_scalar(-1.0, -1.0, -1.0)
    }
}
