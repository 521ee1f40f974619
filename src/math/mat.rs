use std::ops::Mul;

use super::geom::cot;
use super::vec::{Vec3, Vec4};

/// 4×4 row-major matrix. `RMat4 * RMat4` composes, `RMat4 * Vec4` transforms;
/// the operand shape selects the overload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RMat4(pub [[f64; 4]; 4]);

impl RMat4 {
    pub fn identity() -> Self {
        Self([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn zero() -> Self {
        Self([[0.0; 4]; 4])
    }

    pub fn scale(scale: Vec3) -> Self {
        let mut m = Self::identity();
        for i in 0..3 {
            m.0[i][i] = scale[i];
        }
        m
    }

    pub fn translation(translation: Vec3) -> Self {
        let mut m = Self::identity();
        for i in 0..3 {
            m.0[i][3] = translation[i];
        }
        m
    }

    /// Rotation about `axis` (unit length) by `angle_rad`, Rodrigues' formula.
    pub fn rotation(axis: Vec3, angle_rad: f64) -> Self {
        let (u, v, w) = (axis[0], axis[1], axis[2]);
        let rcos = angle_rad.cos();
        let rsin = angle_rad.sin();
        let mut m = Self::identity();
        m.0[0][0] = rcos + u * u * (1.0 - rcos);
        m.0[1][0] = w * rsin + v * u * (1.0 - rcos);
        m.0[2][0] = -v * rsin + w * u * (1.0 - rcos);
        m.0[0][1] = -w * rsin + u * v * (1.0 - rcos);
        m.0[1][1] = rcos + v * v * (1.0 - rcos);
        m.0[2][1] = u * rsin + w * v * (1.0 - rcos);
        m.0[0][2] = v * rsin + u * w * (1.0 - rcos);
        m.0[1][2] = -u * rsin + v * w * (1.0 - rcos);
        m.0[2][2] = rcos + w * w * (1.0 - rcos);
        m
    }

    /// Camera-space basis from eye position and unit forward/up directions,
    /// with right = forward × up.
    pub fn view(eye: Vec3, forward: Vec3, up: Vec3) -> Self {
        let right = forward.cross(up);
        Self([
            [right[0], right[1], right[2], -right.dot(eye)],
            [up[0], up[1], up[2], -up.dot(eye)],
            [forward[0], forward[1], forward[2], -forward.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Scaled-orthographic stand-in for perspective: a uniform scale by
    /// cot(fov / 2), with no divide by z. Downstream depth keys and shading
    /// are defined against this exact transform.
    pub fn perspective_projection(fov_rad: f64) -> Self {
        Self::orthographic_projection(cot(fov_rad / 2.0))
    }

    pub fn orthographic_projection(scale: f64) -> Self {
        Self::scale(Vec3::new(scale, scale, 1.0))
    }
}

impl Mul<RMat4> for RMat4 {
    type Output = RMat4;

    fn mul(self, rhs: RMat4) -> RMat4 {
        let mut out = RMat4::zero();
        for r in 0..4 {
            for c in 0..4 {
                for i in 0..4 {
                    out.0[r][c] += self.0[r][i] * rhs.0[i][c];
                }
            }
        }
        out
    }
}

impl Mul<Vec4> for RMat4 {
    type Output = Vec4;

    fn mul(self, rhs: Vec4) -> Vec4 {
        let mut out = Vec4::zero();
        for r in 0..4 {
            for i in 0..4 {
                out[r] += self.0[r][i] * rhs[i];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geom::deg2rad;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).is_almost_null(), "{a:?} != {b:?}");
    }

    #[test]
    fn identity_is_multiplicative_unit() {
        let m = RMat4::translation(Vec3::new(1.0, 2.0, 3.0)) * RMat4::scale(Vec3::splat(2.0));
        assert_eq!(m * RMat4::identity(), m);
        assert_eq!(RMat4::identity() * m, m);
    }

    #[test]
    fn translation_moves_points_not_directions() {
        let t = RMat4::translation(Vec3::new(1.0, -2.0, 3.0));
        let p = (t * Vec3::new(1.0, 1.0, 1.0).homog()).dehomog();
        assert_eq!(p, Vec3::new(2.0, -1.0, 4.0));
        let d = t * Vec4::new(1.0, 1.0, 1.0, 0.0);
        assert_eq!(d, Vec4::new(1.0, 1.0, 1.0, 0.0));
    }

    #[test]
    fn rotation_quarter_turn_about_z() {
        let r = RMat4::rotation(Vec3::new(0.0, 0.0, 1.0), deg2rad(90.0));
        let p = (r * Vec3::new(1.0, 0.0, 0.0).homog()).dehomog();
        assert_vec_close(p, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn view_maps_eye_to_origin_and_forward_to_z() {
        let eye = Vec3::new(0.0, 0.0, -5.0);
        let forward = Vec3::new(0.0, 0.0, 1.0);
        let up = Vec3::new(0.0, 1.0, 0.0);
        let v = RMat4::view(eye, forward, up);
        assert_vec_close((v * eye.homog()).dehomog(), Vec3::zero());
        // A point one unit ahead of the eye lands at z = 1 in camera space.
        assert_vec_close(
            (v * Vec3::new(0.0, 0.0, -4.0).homog()).dehomog(),
            Vec3::new(0.0, 0.0, 1.0),
        );
    }

    #[test]
    fn perspective_is_uniform_cot_scale() {
        // cot(45°) = 1, so a 90° fov leaves x and y untouched.
        let m = RMat4::perspective_projection(deg2rad(90.0));
        let p = (m * Vec3::new(3.0, -2.0, 7.0).homog()).dehomog();
        assert_vec_close(p, Vec3::new(3.0, -2.0, 7.0));

        // Narrower fov scales x and y up, never touches z.
        let m = RMat4::perspective_projection(deg2rad(60.0));
        let p = (m * Vec3::new(1.0, 1.0, 5.0).homog()).dehomog();
        let s = cot(deg2rad(30.0));
        assert_vec_close(p, Vec3::new(s, s, 5.0));
    }

    #[test]
    fn orthographic_scales_xy_only() {
        let m = RMat4::orthographic_projection(2.0);
        let p = (m * Vec3::new(1.0, 2.0, 3.0).homog()).dehomog();
        assert_eq!(p, Vec3::new(2.0, 4.0, 3.0));
    }
}
