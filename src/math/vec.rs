use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};

/// Fixed-dimension real vector. The arithmetic operators come in two shapes:
/// vector ⊕ vector combines componentwise, vector ⊕ scalar broadcasts the
/// scalar to every component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RVec<const N: usize>(pub [f64; N]);

// serde only provides `Serialize` for arrays of concrete length, not for a
// const-generic `[f64; N]`, so a derive won't compile; serialize via the
// slice impl, which emits the same plain JSON array.
impl<const N: usize> serde::Serialize for RVec<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_slice().serialize(serializer)
    }
}

pub type Vec2 = RVec<2>;
pub type Vec3 = RVec<3>;
pub type Vec4 = RVec<4>;

pub const ALMOST_NULL_EPS: f64 = 1e-6;

impl<const N: usize> RVec<N> {
    pub fn splat(value: f64) -> Self {
        Self([value; N])
    }

    pub fn zero() -> Self {
        Self::splat(0.0)
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = self.0;
        for c in &mut out {
            *c = f(*c);
        }
        Self(out)
    }

    pub fn zip(self, rhs: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut out = self.0;
        for (c, r) in out.iter_mut().zip(rhs.0) {
            *c = f(*c, r);
        }
        Self(out)
    }

    pub fn dot(self, rhs: Self) -> f64 {
        self.0.iter().zip(rhs.0).map(|(a, b)| a * b).sum()
    }

    pub fn sqr_len(self) -> f64 {
        self.dot(self)
    }

    pub fn len(self) -> f64 {
        self.sqr_len().sqrt()
    }

    pub fn dist(self, rhs: Self) -> f64 {
        (self - rhs).len()
    }

    pub fn normalized(self) -> Self {
        self / self.len()
    }

    pub fn abs(self) -> Self {
        self.map(f64::abs)
    }

    pub fn min(self, rhs: impl Broadcast<N>) -> Self {
        self.zip(rhs.splat(), f64::min)
    }

    pub fn max(self, rhs: impl Broadcast<N>) -> Self {
        self.zip(rhs.splat(), f64::max)
    }

    pub fn min_component(self) -> f64 {
        self.0.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_component(self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn is_finite(self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    pub fn is_almost_null(self) -> bool {
        self.0.iter().all(|c| c.abs() < ALMOST_NULL_EPS)
    }

    pub fn x(self) -> f64 {
        self.0[0]
    }

    pub fn y(self) -> f64 {
        self.0[1]
    }
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self([x, y])
    }
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    pub fn z(self) -> f64 {
        self.0[2]
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self([
            self.0[1] * rhs.0[2] - self.0[2] * rhs.0[1],
            self.0[2] * rhs.0[0] - self.0[0] * rhs.0[2],
            self.0[0] * rhs.0[1] - self.0[1] * rhs.0[0],
        ])
    }

    /// Homogeneous promotion: appends w = 1.
    pub fn homog(self) -> Vec4 {
        RVec([self.0[0], self.0[1], self.0[2], 1.0])
    }

    /// Drops the z component.
    pub fn truncate(self) -> Vec2 {
        RVec([self.0[0], self.0[1]])
    }
}

impl Vec4 {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self([x, y, z, w])
    }

    pub fn z(self) -> f64 {
        self.0[2]
    }

    pub fn w(self) -> f64 {
        self.0[3]
    }

    /// Homogeneous demotion: divides x, y, z by w.
    pub fn dehomog(self) -> Vec3 {
        RVec([self.0[0], self.0[1], self.0[2]]) / self.0[3]
    }
}

/// Right-hand operand of a componentwise combine: either a vector of the same
/// dimension or a scalar broadcast to every component.
pub trait Broadcast<const N: usize> {
    fn splat(self) -> RVec<N>;
}

impl<const N: usize> Broadcast<N> for RVec<N> {
    fn splat(self) -> RVec<N> {
        self
    }
}

impl<const N: usize> Broadcast<N> for f64 {
    fn splat(self) -> RVec<N> {
        RVec::splat(self)
    }
}

macro_rules! elementwise_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<const N: usize, B: Broadcast<N>> $trait<B> for RVec<N> {
            type Output = Self;

            fn $method(self, rhs: B) -> Self {
                self.zip(rhs.splat(), |a, b| a $op b)
            }
        }
    };
}

elementwise_op!(Add, add, +);
elementwise_op!(Sub, sub, -);
elementwise_op!(Mul, mul, *);
elementwise_op!(Div, div, /);

impl<const N: usize> Neg for RVec<N> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|c| -c)
    }
}

impl<const N: usize> From<[f64; N]> for RVec<N> {
    fn from(components: [f64; N]) -> Self {
        Self(components)
    }
}

impl<const N: usize> Index<usize> for RVec<N> {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl<const N: usize> IndexMut<usize> for RVec<N> {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_broadcasts_scalars_and_zips_vectors() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v + 1.0, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(v * Vec3::new(2.0, 0.5, -1.0), Vec3::new(2.0, 1.0, -3.0));
        assert_eq!(v - v, Vec3::zero());
        assert_eq!(v / 2.0, Vec3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn dot_cross_len() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(x.dot(y), 0.0);
        assert_eq!(x.cross(y), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(Vec3::new(3.0, 4.0, 0.0).len(), 5.0);
        assert_eq!(Vec2::new(0.0, 0.0).dist(Vec2::new(0.0, 7.0)), 7.0);
    }

    #[test]
    fn normalized_has_unit_len() {
        let n = Vec3::new(1.0, 2.0, 2.0).normalized();
        assert!((n.len() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn homog_roundtrip_divides_by_w() {
        let p = Vec3::new(2.0, 4.0, 6.0);
        assert_eq!(p.homog().w(), 1.0);
        assert_eq!(p.homog().dehomog(), p);
        assert_eq!(Vec4::new(2.0, 4.0, 6.0, 2.0).dehomog(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn component_reductions() {
        let v = Vec3::new(-1.0, 5.0, 2.0);
        assert_eq!(v.min_component(), -1.0);
        assert_eq!(v.max_component(), 5.0);
        assert_eq!(v.min(0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(v.max(Vec3::new(0.0, 9.0, 2.0)), Vec3::new(0.0, 9.0, 2.0));
    }

    #[test]
    fn almost_null_and_finiteness() {
        assert!(Vec3::splat(1e-9).is_almost_null());
        assert!(!Vec3::new(0.0, 1e-3, 0.0).is_almost_null());
        assert!(Vec3::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Vec3::new(f64::NAN, 0.0, 0.0).is_finite());
    }

    #[test]
    fn serializes_as_plain_array() {
        let json = serde_json::to_value(Vec2::new(1.5, -2.0)).unwrap();
        assert_eq!(json, serde_json::json!([1.5, -2.0]));
    }
}
