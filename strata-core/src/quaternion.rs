/// Rotation quaternions: composition, vector rotation and spherical interpolation
use nalgebra::Matrix4;
use std::ops::Mul;

use crate::matrix::Matrix;
use crate::vertex::Vertex;

/// Per-component tolerance for equality and the slerp small-angle fallback.
pub const QUATERNION_EPS: f32 = 1e-4;

/// A rotation `w + xi + yj + zk`.
///
/// Callers are expected to keep it unit length; nothing here enforces it.
#[derive(Debug, Clone, Copy)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Rotation of `angle` radians around `axis` (normalized here).
    pub fn from_axis_angle(axis: Vertex, angle: f32) -> Self {
        let axis = axis.normalize();
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(c, axis.x * s, axis.y * s, axis.z * s)
    }

    pub fn to_nalgebra(&self) -> nalgebra::Quaternion<f32> {
        nalgebra::Quaternion::new(self.w, self.x, self.y, self.z)
    }

    pub fn conjugate(&self) -> Self {
        self.to_nalgebra().conjugate().into()
    }

    /// Four-component dot product.
    pub fn dot(&self, other: &Quaternion) -> f32 {
        self.to_nalgebra().dot(&other.to_nalgebra())
    }

    pub fn magnitude(&self) -> f32 {
        self.to_nalgebra().norm()
    }

    /// Unit-length copy. A zero quaternion has no rotation to preserve and
    /// normalizes to identity.
    pub fn normalize(&self) -> Self {
        let m = self.magnitude();
        if m == 0.0 || !m.is_finite() {
            return Self::IDENTITY;
        }
        Self::new(self.w / m, self.x / m, self.y / m, self.z / m)
    }

    /// Hamilton product `self * other` (apply `other`, then `self`).
    pub fn multiply(&self, other: &Quaternion) -> Self {
        (self.to_nalgebra() * other.to_nalgebra()).into()
    }

    /// Rotates `v` by this quaternion (`q v q*` expanded in closed form).
    /// The returned vertex keeps `v.w`.
    pub fn rotate(&self, v: Vertex) -> Vertex {
        let ww = self.w * self.w;
        let xx = self.x * self.x;
        let yy = self.y * self.y;
        let zz = self.z * self.z;
        let wx = self.w * self.x;
        let wy = self.w * self.y;
        let wz = self.w * self.z;
        let xy = self.x * self.y;
        let xz = self.x * self.z;
        let yz = self.y * self.z;

        Vertex::new(
            ww * v.x + 2.0 * wy * v.z - 2.0 * wz * v.y + xx * v.x + 2.0 * xy * v.y
                + 2.0 * xz * v.z
                - zz * v.x
                - yy * v.x,
            2.0 * xy * v.x + yy * v.y + 2.0 * yz * v.z + 2.0 * wz * v.x - zz * v.y + ww * v.y
                - 2.0 * wx * v.z
                - xx * v.y,
            2.0 * xz * v.x + 2.0 * yz * v.y + zz * v.z - 2.0 * wy * v.x - yy * v.z
                + 2.0 * wx * v.y
                - xx * v.z
                + ww * v.z,
            v.w,
        )
    }

    /// Rotation matrix in row-vector convention: `v * q.to_matrix()` equals
    /// `q.rotate(v)` for unit quaternions.
    pub fn to_matrix(&self) -> Matrix {
        let rx = self.rotate(Vertex::direction(1.0, 0.0, 0.0));
        let ry = self.rotate(Vertex::direction(0.0, 1.0, 0.0));
        let rz = self.rotate(Vertex::direction(0.0, 0.0, 1.0));
        #[rustfmt::skip]
        let m = Matrix4::new(
            rx.x, rx.y, rx.z, 0.0,
            ry.x, ry.y, ry.z, 0.0,
            rz.x, rz.y, rz.z, 0.0,
            0.0,  0.0,  0.0,  1.0,
        );
        Matrix::from_nalgebra(m)
    }

    /// Spherical linear interpolation from `self` (t = 0) to `other` (t = 1).
    ///
    /// No shortest-path correction: when the inputs are coincident or
    /// antipodal (`|cos| >= 1`) `self` is returned unchanged, and a
    /// negative dot product interpolates the long way round.
    pub fn slerp(&self, other: &Quaternion, t: f32) -> Self {
        let cos_half_theta = self.dot(other);
        if cos_half_theta.abs() >= 1.0 {
            return *self;
        }

        let half_theta = cos_half_theta.acos();
        let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();

        let (ra, rb) = if sin_half_theta.abs() < QUATERNION_EPS {
            (0.5, 0.5)
        } else {
            (
                ((1.0 - t) * half_theta).sin() / sin_half_theta,
                (t * half_theta).sin() / sin_half_theta,
            )
        };

        Self::new(
            self.w * ra + other.w * rb,
            self.x * ra + other.x * rb,
            self.y * ra + other.y * rb,
            self.z * ra + other.z * rb,
        )
    }
}

impl From<nalgebra::Quaternion<f32>> for Quaternion {
    fn from(q: nalgebra::Quaternion<f32>) -> Self {
        Self::new(q.w, q.i, q.j, q.k)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Approximate equality: every component within [`QUATERNION_EPS`].
impl PartialEq for Quaternion {
    fn eq(&self, other: &Self) -> bool {
        (self.w - other.w).abs() <= QUATERNION_EPS
            && (self.x - other.x).abs() <= QUATERNION_EPS
            && (self.y - other.y).abs() <= QUATERNION_EPS
            && (self.z - other.z).abs() <= QUATERNION_EPS
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;
    fn mul(self, other: Quaternion) -> Quaternion {
        self.multiply(&other)
    }
}
