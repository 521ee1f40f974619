//! Fixed-dimension vector and matrix kernel for the scene pipeline.

pub mod geom;
pub mod mat;
pub mod vec;

pub use geom::{cot, deg2rad, polygon_normal, rad2deg, triangle_normal};
pub use mat::RMat4;
pub use vec::{RVec, Vec2, Vec3, Vec4};
