//! Typed scene/project model. Every invariant (unit directions, bounded
//! colors, uniform keyframe topology, ascending unique times) is established
//! by the loader at construction time and never re-checked afterwards.

use crate::math::{Vec2, Vec3};

/// RGB color, every component in [0, 1].
pub type Color = Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
    },
    Directional {
        /// Unit length.
        direction: Vec3,
        color: Color,
    },
    Point {
        point: Vec3,
        /// Falloff radius, > 0.
        radius: f64,
        color: Color,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Scaled-orthographic approximation; see `RMat4::perspective_projection`.
    Perspective { fov_rad: f64 },
    Orthographic { scale: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub eye: Vec3,
    /// Unit length.
    pub forward: Vec3,
    /// Unit length.
    pub up: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub view: View,
    pub projection: Projection,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    /// At least 3 vertices, planar.
    pub vertices: Vec<Vec3>,
    /// Derived from the vertex winding; not normalized.
    pub normal: Vec3,
    pub color: Color,
}

impl Polygon {
    /// Vertex average; the reference point for point-light shading.
    pub fn centroid(&self) -> Vec3 {
        let sum = self.vertices.iter().fold(Vec3::zero(), |acc, v| acc + *v);
        sum / self.vertices.len() as f64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub camera: Camera,
    pub polygons: Vec<Polygon>,
    pub lights: Vec<Light>,
    pub stroke_color: Color,
    pub stroke_thickness: f64,
    pub anchor_point: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Seconds, in [0, 86400].
    pub time: f64,
    pub scene: Scene,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fit {
    Width,
    Height,
    Min,
    Max,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub name: String,
    /// Logical frame size (width, height), both > 0.
    pub frame_size: Vec2,
    pub fit: Fit,
    pub cull_back: bool,
    /// Sorted by strictly ascending time; all keyframes share the same
    /// polygon count and per-polygon vertex counts.
    pub keyframes: Vec<Keyframe>,
}
