use super::vec::{ALMOST_NULL_EPS, Vec3};
use crate::error::{FlatshadeError, FlatshadeResult};

pub fn deg2rad(deg: f64) -> f64 {
    deg / 180.0 * std::f64::consts::PI
}

pub fn rad2deg(rad: f64) -> f64 {
    rad / std::f64::consts::PI * 180.0
}

pub fn cot(angle_rad: f64) -> f64 {
    1.0 / angle_rad.tan()
}

pub fn almost_null(value: f64) -> bool {
    value.abs() < ALMOST_NULL_EPS
}

pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

/// Normal of a planar polygon from its first three vertices. Fails on fewer
/// than three vertices or when any later vertex leaves the plane.
pub fn polygon_normal(vertices: &[Vec3]) -> FlatshadeResult<Vec3> {
    let [a, b, c, rest @ ..] = vertices else {
        return Err(FlatshadeError::geometry(
            "not a polygon (less than 3 vertices)",
        ));
    };
    let normal = triangle_normal(*a, *b, *c);
    for (i, vert) in rest.iter().enumerate() {
        let offset = (*vert - *a).dot(normal);
        if !almost_null(offset) {
            return Err(FlatshadeError::geometry(format!(
                "polygon is not planar (vertex {} is off-plane)",
                i + 3
            )));
        }
    }
    Ok(normal)
}
