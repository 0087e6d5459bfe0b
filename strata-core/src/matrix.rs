/// 4x4 transform matrices in row-vector convention
///
/// A vertex is transformed as `v' = v * M`: every output component is the
/// weighted sum of the input components over one matrix *column*, so the
/// rows of `M` are the transform axes and row 3 carries the translation.
use nalgebra::{Matrix3, Matrix4, RowVector3, RowVector4, Vector3};
use std::ops::Mul;

use crate::vertex::Vertex;

/// Translation-row `w` written by [`Matrix::point_at`].
///
/// The value is discarded by [`Matrix::quick_invert`], so it never reaches a
/// view matrix built with [`Matrix::camera`]. It only shows up when a
/// point-at matrix is used directly as an object transform.
pub const POINT_AT_TRANSLATION_W: f32 = 1.0;

/// Row-vector transform backed by a nalgebra `Matrix4`.
///
/// `m[(r, c)]` is row `r`, column `c` exactly as written in the row-vector
/// layout, so nalgebra's column-vector builders are transposed on the way in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub m: Matrix4<f32>,
}

impl Matrix {
    pub fn from_nalgebra(m: Matrix4<f32>) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::from_nalgebra(Matrix4::identity())
    }

    pub fn zero() -> Self {
        Self::from_nalgebra(Matrix4::zeros())
    }

    /// Perspective projection.
    ///
    /// `fov_deg` is the vertical field of view in degrees. The resulting `w`
    /// equals the view-space `z`, ready for the perspective divide.
    pub fn projection(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        let inv_tan = 1.0 / (fov_deg.to_radians() * 0.5).tan();
        let q = far / (far - near);
        #[rustfmt::skip]
        let m = Matrix4::new(
            inv_tan / aspect, 0.0,     0.0,       0.0,
            0.0,              inv_tan, 0.0,       0.0,
            0.0,              0.0,     q,         1.0,
            0.0,              0.0,     -near * q, 0.0,
        );
        Self::from_nalgebra(m)
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self::from_nalgebra(Matrix4::new_translation(&Vector3::new(x, y, z)).transpose())
    }

    pub fn scale(sx: f32, sy: f32, sz: f32) -> Self {
        Self::from_nalgebra(Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)))
    }

    pub fn rotation_x(angle: f32) -> Self {
        Self::from_nalgebra(Matrix4::new_rotation(Vector3::new(angle, 0.0, 0.0)).transpose())
    }

    pub fn rotation_y(angle: f32) -> Self {
        Self::from_nalgebra(Matrix4::new_rotation(Vector3::new(0.0, angle, 0.0)).transpose())
    }

    pub fn rotation_z(angle: f32) -> Self {
        Self::from_nalgebra(Matrix4::new_rotation(Vector3::new(0.0, 0.0, angle)).transpose())
    }

    /// Row-vector product `self * other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Self::from_nalgebra(self.m * other.m)
    }

    /// `o[c] = sum_k v[k] * m[(k, c)]` over all four components.
    pub fn transform(&self, v: Vertex) -> Vertex {
        let o = RowVector4::new(v.x, v.y, v.z, v.w) * self.m;
        Vertex::new(o[0], o[1], o[2], o[3])
    }

    /// Orthonormal matrix placing an object at `pos` looking at `target`.
    pub fn point_at(pos: Vertex, target: Vertex, up: Vertex) -> Matrix {
        Self::point_at_with_w(pos, target, up, POINT_AT_TRANSLATION_W)
    }

    /// [`Matrix::point_at`] with an explicit translation-row `w`.
    pub fn point_at_with_w(pos: Vertex, target: Vertex, up: Vertex, translation_w: f32) -> Matrix {
        let forward = (target - pos).normalize();

        // Gram-Schmidt: strip the forward component out of `up`.
        let along = up.dot(forward);
        let new_up = (up - forward * along).normalize();
        let right = new_up.cross(forward);

        #[rustfmt::skip]
        let m = Matrix4::new(
            right.x,   right.y,   right.z,   0.0,
            new_up.x,  new_up.y,  new_up.z,  0.0,
            forward.x, forward.y, forward.z, 0.0,
            pos.x,     pos.y,     pos.z,     translation_w,
        );
        Self::from_nalgebra(m)
    }

    /// View matrix: the inverse of the camera's point-at matrix.
    pub fn camera(pos: Vertex, target: Vertex, up: Vertex) -> Matrix {
        Self::point_at(pos, target, up).quick_invert()
    }

    /// Inverse of a rotation + translation matrix.
    ///
    /// Only valid when the upper 3x3 block is orthonormal: the rotation is
    /// transposed and the translation row becomes `-pos * R^T`. The corner is
    /// always 1.0 whatever `w` the input carried.
    pub fn quick_invert(&self) -> Matrix {
        let rotation: Matrix3<f32> = self.m.fixed_view::<3, 3>(0, 0).transpose();
        let position: RowVector3<f32> = self.m.fixed_view::<1, 3>(3, 0).into_owned();

        let mut out = Matrix4::identity();
        out.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
        out.fixed_view_mut::<1, 3>(3, 0).copy_from(&-(position * rotation));
        Self::from_nalgebra(out)
    }

    pub fn approx_eq(&self, other: &Matrix, eps: f32) -> bool {
        self.m.iter().zip(other.m.iter()).all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Matrix {
    type Output = Matrix;
    fn mul(self, other: Matrix) -> Matrix {
        self.multiply(&other)
    }
}

impl Mul<Matrix> for Vertex {
    type Output = Vertex;
    fn mul(self, m: Matrix) -> Vertex {
        m.transform(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        #[rustfmt::skip]
        let m = Matrix4::new(
            1.0,  2.0,   3.0, 4.0,
            -5.0, 6.5,   0.0, 1.0,
            0.25, -0.75, 9.0, 2.0,
            3.0,  1.0,  -2.0, 0.5,
        );
        Matrix::from_nalgebra(m)
    }

    #[test]
    fn test_identity_is_neutral() {
        let m = sample();
        assert!(Matrix::identity().multiply(&m).approx_eq(&m, 1e-5));
        assert!(m.multiply(&Matrix::identity()).approx_eq(&m, 1e-5));
    }

    #[test]
    fn test_multiply_applies_left_first() {
        let p = Vertex::point(1.0, 0.0, 0.0);
        let turn = Matrix::rotation_z(std::f32::consts::FRAC_PI_2);
        let shift = Matrix::translation(5.0, 0.0, 0.0);

        let via_product = (turn * shift).transform(p);
        let step_by_step = shift.transform(turn.transform(p));
        assert!((via_product.x - 5.0).abs() < 1e-5);
        assert!((via_product.y - 1.0).abs() < 1e-5);
        assert!((via_product.x - step_by_step.x).abs() < 1e-5);
        assert!((via_product.y - step_by_step.y).abs() < 1e-5);
    }

    #[test]
    fn test_rotations_use_row_vector_layout() {
        let (s, c) = 0.3f32.sin_cos();
        let rz = Matrix::rotation_z(0.3);
        assert!((rz.m[(0, 1)] - s).abs() < 1e-6);
        assert!((rz.m[(1, 0)] + s).abs() < 1e-6);
        assert!((rz.m[(0, 0)] - c).abs() < 1e-6);

        let rx = Matrix::rotation_x(0.3);
        assert!((rx.m[(1, 2)] - s).abs() < 1e-6);
        assert!((rx.m[(2, 1)] + s).abs() < 1e-6);

        let ry = Matrix::rotation_y(0.3);
        assert!((ry.m[(0, 2)] + s).abs() < 1e-6);
        assert!((ry.m[(2, 0)] - s).abs() < 1e-6);

        let t = Matrix::translation(1.0, 2.0, 3.0);
        assert_eq!((t.m[(3, 0)], t.m[(3, 1)], t.m[(3, 2)]), (1.0, 2.0, 3.0));
        assert_eq!(t.m[(0, 3)], 0.0);
    }

    #[test]
    fn test_transform_row_vector() {
        let t = Matrix::translation(1.0, 2.0, 3.0);
        let p = t.transform(Vertex::point(1.0, 1.0, 1.0));
        assert_eq!(p, Vertex::point(2.0, 3.0, 4.0));

        // Directions are not translated.
        let d = t.transform(Vertex::direction(1.0, 1.0, 1.0));
        assert_eq!(d, Vertex::direction(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_projection_fields() {
        let p = Matrix::projection(90.0, 2.0, 0.1, 100.0);
        assert!((p.m[(0, 0)] - 0.5).abs() < 1e-5);
        assert!((p.m[(1, 1)] - 1.0).abs() < 1e-5);
        assert!((p.m[(2, 2)] - 100.0 / 99.9).abs() < 1e-5);
        assert!((p.m[(3, 2)] + 100.0 * 0.1 / 99.9).abs() < 1e-5);
        assert_eq!(p.m[(2, 3)], 1.0);
        assert_eq!(p.m[(3, 3)], 0.0);
    }

    #[test]
    fn test_projection_w_is_view_z() {
        let p = Matrix::projection(60.0, 16.0 / 9.0, 0.1, 1000.0);
        let v = p.transform(Vertex::point(3.0, -1.0, 42.0));
        assert!((v.w - 42.0).abs() < 1e-4);
    }

    #[test]
    fn test_forward_axis_projects_to_center() {
        let p = Matrix::projection(60.0, 16.0 / 9.0, 0.1, 1000.0);
        for d in [0.5, 10.0, 250.0, 999.0] {
            let v = p.transform(Vertex::point(0.0, 0.0, d));
            assert!((v.x / v.w).abs() < 1e-6);
            assert!((v.y / v.w).abs() < 1e-6);
        }
    }

    #[test]
    fn test_point_at_is_orthonormal() {
        let pos = Vertex::point(1.0, 2.0, 3.0);
        let target = Vertex::point(-4.0, 0.5, 10.0);
        let up = Vertex::direction(0.0, 1.0, 0.0);
        let m = Matrix::point_at(pos, target, up);

        let rows: Vec<Vertex> = (0..3)
            .map(|r| Vertex::direction(m.m[(r, 0)], m.m[(r, 1)], m.m[(r, 2)]))
            .collect();
        for (i, a) in rows.iter().enumerate() {
            assert!((a.length() - 1.0).abs() < 1e-5);
            for b in rows.iter().skip(i + 1) {
                assert!(a.dot(*b).abs() < 1e-5);
            }
        }
        assert_eq!(
            (m.m[(3, 0)], m.m[(3, 1)], m.m[(3, 2)], m.m[(3, 3)]),
            (1.0, 2.0, 3.0, 1.0)
        );
    }

    #[test]
    fn test_quick_invert_round_trip() {
        let m = Matrix::point_at(
            Vertex::point(5.0, -3.0, 2.0),
            Vertex::point(0.0, 0.0, 0.0),
            Vertex::direction(0.0, 1.0, 0.0),
        );
        let inv = m.quick_invert();
        assert!(m.multiply(&inv).approx_eq(&Matrix::identity(), 1e-5));
    }

    #[test]
    fn test_camera_maps_eye_to_origin_and_target_to_forward() {
        let pos = Vertex::point(0.0, 0.0, 25.0);
        let target = Vertex::point(0.0, 0.0, 0.0);
        let view = Matrix::camera(pos, target, Vertex::direction(0.0, 1.0, 0.0));

        let eye = view.transform(pos);
        assert!(eye.x.abs() < 1e-5 && eye.y.abs() < 1e-5 && eye.z.abs() < 1e-5);

        let t = view.transform(target);
        assert!(t.x.abs() < 1e-5 && t.y.abs() < 1e-5);
        assert!((t.z - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_camera_ignores_translation_w() {
        let pos = Vertex::point(2.0, 1.0, -6.0);
        let target = Vertex::point(0.0, 0.5, 0.0);
        let up = Vertex::direction(0.0, 1.0, 0.0);

        let with_one = Matrix::point_at_with_w(pos, target, up, 1.0).quick_invert();
        let with_typo = Matrix::point_at_with_w(pos, target, up, 1.1).quick_invert();
        assert_eq!(with_one, with_typo);
        assert_eq!(with_one, Matrix::camera(pos, target, up));
    }
}
