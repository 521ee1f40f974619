//! Projects one scene into flat-shaded 2D shapes with a painter's-algorithm
//! depth order.

use crate::math::{RMat4, Vec2, Vec3};
use crate::model::{Color, Light, Polygon, Projection, Scene};

#[derive(Clone, Debug, serde::Serialize)]
pub struct SceneShape {
    pub points: Vec<Vec2>,
    pub fill: Color,
    pub back: bool,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct SceneRender {
    pub shapes: Vec<SceneShape>,
    pub stroke_color: Color,
    pub stroke_thickness: f64,
    pub anchor_point: Vec2,
    /// Shape indices sorted ascending by depth, ties kept in input order.
    pub order: Vec<usize>,
}

/// Transforms, flips Y into screen convention, keeps Z as the depth source.
fn project_point(point: Vec3, mat: &RMat4) -> Vec3 {
    (*mat * point.homog()).dehomog() * Vec3::new(1.0, -1.0, 1.0)
}

fn shade_polygon(polygon: &Polygon, lights: &[Light]) -> Color {
    let mut color = Vec3::zero();
    for light in lights {
        match light {
            Light::Ambient { color: light_color } => {
                color = color + *light_color;
            }
            Light::Directional {
                direction,
                color: light_color,
            } => {
                let lambert = (-direction.dot(polygon.normal)).max(0.0);
                color = color + *light_color * lambert;
            }
            Light::Point {
                point,
                radius,
                color: light_color,
            } => {
                let centroid = polygon.centroid();
                // The direction is left unnormalized, so distance scales the
                // cosine term on top of the radius falloff.
                let direction = centroid - *point;
                let lambert = (-direction.dot(polygon.normal)).max(0.0);
                let falloff = 1.0 - (point.dist(centroid) / radius).clamp(0.0, 1.0);
                color = color + *light_color * (lambert * falloff);
            }
        }
    }
    color.min(1.0) * polygon.color
}

pub fn render_scene(scene: &Scene) -> SceneRender {
    let projection = match scene.camera.projection {
        Projection::Perspective { fov_rad } => RMat4::perspective_projection(fov_rad),
        Projection::Orthographic { scale } => RMat4::orthographic_projection(scale),
    };
    let view = scene.camera.view;
    let mat = projection * RMat4::view(view.eye, view.forward, view.up);

    let mut shapes = Vec::with_capacity(scene.polygons.len());
    let mut depths = Vec::with_capacity(scene.polygons.len());
    for polygon in &scene.polygons {
        let projected: Vec<Vec3> = polygon
            .vertices
            .iter()
            .map(|v| project_point(*v, &mat))
            .collect();
        let depth =
            projected.iter().map(|v| v.z()).sum::<f64>() / projected.len() as f64;
        shapes.push(SceneShape {
            points: projected.iter().map(|v| v.truncate()).collect(),
            fill: shade_polygon(polygon, &scene.lights),
            back: view.forward.dot(polygon.normal) >= 0.0,
        });
        depths.push(depth);
    }

    let mut order: Vec<usize> = (0..shapes.len()).collect();
    // sort_by is stable: equal depths keep their original order.
    order.sort_by(|&a, &b| depths[a].total_cmp(&depths[b]));

    SceneRender {
        shapes,
        stroke_color: scene.stroke_color,
        stroke_thickness: scene.stroke_thickness,
        anchor_point: project_point(scene.anchor_point, &mat).truncate(),
        order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::deg2rad;
    use crate::model::{Camera, View};

    fn camera() -> Camera {
        Camera {
            view: View {
                eye: Vec3::new(0.0, 0.0, -5.0),
                forward: Vec3::new(0.0, 0.0, 1.0),
                up: Vec3::new(0.0, 1.0, 0.0),
            },
            projection: Projection::Orthographic { scale: 1.0 },
        }
    }

    fn square(z: f64, color: Color) -> Polygon {
        let vertices = vec![
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(1.0, 1.0, z),
            Vec3::new(-1.0, 1.0, z),
        ];
        let normal = crate::math::polygon_normal(&vertices).unwrap();
        Polygon {
            vertices,
            normal,
            color,
        }
    }

    fn scene_with(polygons: Vec<Polygon>, lights: Vec<Light>) -> Scene {
        Scene {
            camera: camera(),
            polygons,
            lights,
            stroke_color: Vec3::zero(),
            stroke_thickness: 10.0,
            anchor_point: Vec3::zero(),
        }
    }

    #[test]
    fn ambient_alone_tints_polygon_color() {
        let scene = scene_with(
            vec![square(0.0, Vec3::splat(1.0))],
            vec![Light::Ambient {
                color: Vec3::splat(0.8),
            }],
        );
        let render = render_scene(&scene);
        assert_eq!(render.shapes[0].fill, Vec3::splat(0.8));
    }

    #[test]
    fn accumulated_light_clamps_before_polygon_tint() {
        let scene = scene_with(
            vec![square(0.0, Vec3::new(0.5, 0.5, 0.5))],
            vec![
                Light::Ambient {
                    color: Vec3::splat(0.9),
                },
                Light::Ambient {
                    color: Vec3::splat(0.9),
                },
            ],
        );
        let render = render_scene(&scene);
        assert_eq!(render.shapes[0].fill, Vec3::splat(0.5));
    }

    #[test]
    fn directional_light_is_one_sided() {
        // Square normal points toward +z; light traveling along -z strikes
        // that side, light traveling along +z arrives from behind.
        let lit = scene_with(
            vec![square(0.0, Vec3::splat(1.0))],
            vec![Light::Directional {
                direction: Vec3::new(0.0, 0.0, -1.0),
                color: Vec3::splat(1.0),
            }],
        );
        assert_eq!(render_scene(&lit).shapes[0].fill, Vec3::splat(1.0));

        let unlit = scene_with(
            vec![square(0.0, Vec3::splat(1.0))],
            vec![Light::Directional {
                direction: Vec3::new(0.0, 0.0, 1.0),
                color: Vec3::splat(1.0),
            }],
        );
        assert_eq!(render_scene(&unlit).shapes[0].fill, Vec3::zero());
    }

    #[test]
    fn point_light_fades_out_at_radius() {
        let mk = |radius: f64| {
            scene_with(
                vec![square(0.0, Vec3::splat(1.0))],
                vec![Light::Point {
                    point: Vec3::new(0.0, 0.0, -2.0),
                    radius,
                    color: Vec3::splat(1.0),
                }],
            )
        };
        // Distance 2 with radius 2 puts the falloff exactly at zero.
        assert_eq!(render_scene(&mk(2.0)).shapes[0].fill, Vec3::zero());
        // Larger radius leaves some contribution.
        let fill = render_scene(&mk(8.0)).shapes[0].fill;
        assert!(fill.x() > 0.0);
    }

    #[test]
    fn depth_order_is_a_stable_permutation() {
        let scene = scene_with(
            vec![
                square(3.0, Vec3::splat(1.0)),
                square(1.0, Vec3::splat(1.0)),
                square(1.0, Vec3::splat(1.0)),
                square(2.0, Vec3::splat(1.0)),
            ],
            vec![],
        );
        let render = render_scene(&scene);
        let mut sorted = render.order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
        // Depths in camera space: z=3 → far, z=1 → near. Equal depths (1, 2)
        // keep input order.
        assert_eq!(render.order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn back_facing_flag_follows_camera_forward() {
        let toward = square(0.0, Vec3::splat(1.0));
        let mut away = square(0.0, Vec3::splat(1.0));
        away.vertices.reverse();
        away.normal = crate::math::polygon_normal(&away.vertices).unwrap();

        let render = render_scene(&scene_with(vec![toward, away], vec![]));
        // Camera forward is +z; the +z normal faces away from the camera.
        assert!(render.shapes[0].back);
        assert!(!render.shapes[1].back);
    }

    #[test]
    fn screen_y_is_flipped() {
        let scene = scene_with(vec![square(0.0, Vec3::splat(1.0))], vec![]);
        let render = render_scene(&scene);
        // Model vertex (-1, -1) lands at screen y = +1.
        assert_eq!(render.shapes[0].points[0], Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn perspective_coordinates_stay_finite() {
        let mut scene = scene_with(vec![square(0.0, Vec3::splat(1.0))], vec![]);
        scene.camera.projection = Projection::Perspective {
            fov_rad: deg2rad(170.0),
        };
        let render = render_scene(&scene);
        for shape in &render.shapes {
            for point in &shape.points {
                assert!(point.is_finite());
            }
        }
        assert!(render.anchor_point.is_finite());
    }
}
