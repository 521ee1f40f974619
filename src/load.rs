//! Decoders from untyped JSON into the typed project model, plus the
//! file-loading entry points. Each decoder accepts a reference token in
//! place of an inline value and substitutes the concrete definition.

use std::path::PathBuf;

use serde_json::Value;

use crate::decode::{
    as_array, as_bool, as_enum, as_number, as_object, as_open_object, as_string, elems,
    is_valid_name, parse_hex_color, prop, prop_or, ref_name,
};
use crate::defs::{DefKind, DefValue, Defs, Resolver, build_definitions};
use crate::error::{FlatshadeError, FlatshadeResult, ResultExt};
use crate::math::{Vec2, Vec3, deg2rad, polygon_normal};
use crate::model::{
    Camera, Color, Fit, Keyframe, Light, Polygon, Project, Projection, Scene, View,
};

const DEFAULT_PROJECT_NAME: &str = "flatshade";
const MAX_TIME_SECS: f64 = 60.0 * 60.0 * 24.0;

/// Extracts the typed payload of a definition, or fails with a kind
/// mismatch. `$def` is a `DefValue`, `$kind` the expected variant.
macro_rules! expect_def {
    ($def:expr, $kind:ident, $name:expr) => {
        match $def {
            DefValue::$kind(v) => v,
            def => {
                return Err(FlatshadeError::reference(format!(
                    "definition \"{}\" has type \"{}\", not \"{}\"",
                    $name,
                    def.kind().as_str(),
                    DefKind::$kind.as_str()
                )));
            }
        }
    };
}

pub fn coerce_color(value: &Value, resolver: &Resolver) -> FlatshadeResult<Color> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(resolver.lookup(DefKind::Color, name)?, Color, name));
    }
    if value.is_array() {
        let array = as_array(value, 3, 3)?;
        let components = elems(array, |v| as_number(v, 0.0, 1.0))?;
        Ok(Vec3::new(components[0], components[1], components[2]))
    } else if let Some(str) = value.as_str() {
        let [r, g, b] = parse_hex_color(str)?;
        Ok(Vec3::new(r, g, b))
    } else if value.is_object() {
        let obj = as_object(value, &[], &["r", "g", "b"])?;
        Ok(Vec3::new(
            prop(obj, "r", |v| as_number(v, 0.0, 1.0))?,
            prop(obj, "g", |v| as_number(v, 0.0, 1.0))?,
            prop(obj, "b", |v| as_number(v, 0.0, 1.0))?,
        ))
    } else {
        Err(FlatshadeError::validation(
            "not a color array, object or hex string",
        ))
    }
}

pub fn coerce_vector(value: &Value, resolver: &Resolver) -> FlatshadeResult<Vec3> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(
            resolver.lookup(DefKind::Vector, name)?,
            Vector,
            name
        ));
    }
    if value.is_array() {
        let array = as_array(value, 3, 3)?;
        let components = elems(array, |v| as_number(v, f64::NEG_INFINITY, f64::INFINITY))?;
        Ok(Vec3::new(components[0], components[1], components[2]))
    } else if value.is_object() {
        let obj = as_object(value, &[], &["x", "y", "z"])?;
        let num = |v: &Value| as_number(v, f64::NEG_INFINITY, f64::INFINITY);
        Ok(Vec3::new(
            prop(obj, "x", num)?,
            prop(obj, "y", num)?,
            prop(obj, "z", num)?,
        ))
    } else {
        Err(FlatshadeError::validation("not a vector array or object"))
    }
}

/// A vector constrained to unit length; null vectors are rejected.
pub fn coerce_direction(value: &Value, resolver: &Resolver) -> FlatshadeResult<Vec3> {
    let vec = coerce_vector(value, resolver)?;
    if vec.is_almost_null() {
        return Err(FlatshadeError::geometry("null direction vector"));
    }
    Ok(vec.normalized())
}

pub fn coerce_radius(value: &Value, resolver: &Resolver) -> FlatshadeResult<f64> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(
            resolver.lookup(DefKind::Radius, name)?,
            Radius,
            name
        ));
    }
    as_number(value, f64::MIN_POSITIVE, f64::INFINITY)
}

pub fn coerce_scale(value: &Value, resolver: &Resolver) -> FlatshadeResult<f64> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(resolver.lookup(DefKind::Scale, name)?, Scale, name));
    }
    as_number(value, f64::MIN_POSITIVE, f64::INFINITY)
}

/// Field of view in degrees, within [10, 170].
pub fn coerce_fov(value: &Value, resolver: &Resolver) -> FlatshadeResult<f64> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(resolver.lookup(DefKind::Fov, name)?, Fov, name));
    }
    as_number(value, 10.0, 170.0)
}

pub fn coerce_thickness(value: &Value, resolver: &Resolver) -> FlatshadeResult<f64> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(
            resolver.lookup(DefKind::Thickness, name)?,
            Thickness,
            name
        ));
    }
    as_number(value, 0.0, 65535.0)
}

fn default_color(resolver: &Resolver, name: &str) -> FlatshadeResult<Color> {
    Ok(expect_def!(resolver.default_for(DefKind::Color, name)?, Color, name))
}

fn coerce_ambient_light(value: &Value, resolver: &Resolver) -> FlatshadeResult<Light> {
    let obj = as_object(value, &["color"], &["kind"])?;
    Ok(Light::Ambient {
        color: prop_or(
            obj,
            "color",
            || default_color(resolver, "$defaultLightColor"),
            |v| coerce_color(v, resolver),
        )?,
    })
}

fn coerce_directional_light(value: &Value, resolver: &Resolver) -> FlatshadeResult<Light> {
    let obj = as_object(value, &["color"], &["direction", "kind"])?;
    Ok(Light::Directional {
        direction: prop(obj, "direction", |v| coerce_direction(v, resolver))?,
        color: prop_or(
            obj,
            "color",
            || default_color(resolver, "$defaultLightColor"),
            |v| coerce_color(v, resolver),
        )?,
    })
}

fn coerce_point_light(value: &Value, resolver: &Resolver) -> FlatshadeResult<Light> {
    let obj = as_object(value, &["color"], &["point", "radius", "kind"])?;
    Ok(Light::Point {
        point: prop(obj, "point", |v| coerce_vector(v, resolver))?,
        radius: prop(obj, "radius", |v| coerce_radius(v, resolver))?,
        color: prop_or(
            obj,
            "color",
            || default_color(resolver, "$defaultLightColor"),
            |v| coerce_color(v, resolver),
        )?,
    })
}

pub fn coerce_light(value: &Value, resolver: &Resolver) -> FlatshadeResult<Light> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(resolver.lookup(DefKind::Light, name)?, Light, name));
    }
    let obj = as_open_object(value)?;
    let kind = prop(obj, "kind", |v| {
        as_enum(v, &["ambient", "directional", "point"]).map(str::to_owned)
    })?;
    match kind.as_str() {
        "ambient" => {
            coerce_ambient_light(value, resolver).while_doing(|| "parsing ambient light")
        }
        "directional" => coerce_directional_light(value, resolver)
            .while_doing(|| "parsing directional light"),
        _ => coerce_point_light(value, resolver).while_doing(|| "parsing point light"),
    }
}

pub fn coerce_lights(value: &Value, resolver: &Resolver) -> FlatshadeResult<Vec<Light>> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(
            resolver.lookup(DefKind::Lights, name)?,
            Lights,
            name
        ));
    }
    elems(as_array(value, 0, usize::MAX)?, |v| {
        coerce_light(v, resolver)
    })
}

pub fn coerce_view(value: &Value, resolver: &Resolver) -> FlatshadeResult<View> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(resolver.lookup(DefKind::View, name)?, View, name));
    }
    let obj = as_object(value, &[], &["eye", "forward", "up"])?;
    Ok(View {
        eye: prop(obj, "eye", |v| coerce_vector(v, resolver))?,
        forward: prop(obj, "forward", |v| coerce_direction(v, resolver))?,
        up: prop(obj, "up", |v| coerce_direction(v, resolver))?,
    })
}

fn coerce_perspective_projection(
    value: &Value,
    resolver: &Resolver,
) -> FlatshadeResult<Projection> {
    let obj = as_object(value, &["fov"], &["kind"])?;
    let fov_deg = prop_or(
        obj,
        "fov",
        || Ok(expect_def!(
            resolver.default_for(DefKind::Fov, "$defaultProjectionFov")?,
            Fov,
            "$defaultProjectionFov"
        )),
        |v| coerce_fov(v, resolver),
    )?;
    Ok(Projection::Perspective {
        fov_rad: deg2rad(fov_deg),
    })
}

fn coerce_orthographic_projection(
    value: &Value,
    resolver: &Resolver,
) -> FlatshadeResult<Projection> {
    let obj = as_object(value, &["scale"], &["kind"])?;
    Ok(Projection::Orthographic {
        scale: prop_or(
            obj,
            "scale",
            || Ok(expect_def!(
                resolver.default_for(DefKind::Scale, "$defaultProjectionScale")?,
                Scale,
                "$defaultProjectionScale"
            )),
            |v| coerce_scale(v, resolver),
        )?,
    })
}

pub fn coerce_projection(value: &Value, resolver: &Resolver) -> FlatshadeResult<Projection> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(
            resolver.lookup(DefKind::Projection, name)?,
            Projection,
            name
        ));
    }
    let obj = as_open_object(value)?;
    let kind = prop(obj, "kind", |v| {
        as_enum(v, &["perspective", "orthographic"]).map(str::to_owned)
    })?;
    if kind == "perspective" {
        coerce_perspective_projection(value, resolver)
            .while_doing(|| "parsing perspective projection")
    } else {
        coerce_orthographic_projection(value, resolver)
            .while_doing(|| "parsing orthographic projection")
    }
}

pub fn coerce_camera(value: &Value, resolver: &Resolver) -> FlatshadeResult<Camera> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(
            resolver.lookup(DefKind::Camera, name)?,
            Camera,
            name
        ));
    }
    let obj = as_object(value, &["projection"], &["view"])?;
    Ok(Camera {
        view: prop(obj, "view", |v| coerce_view(v, resolver))?,
        projection: prop_or(
            obj,
            "projection",
            || Ok(expect_def!(
                resolver.default_for(DefKind::Projection, "$defaultProjection")?,
                Projection,
                "$defaultProjection"
            )),
            |v| coerce_projection(v, resolver),
        )?,
    })
}

pub fn coerce_vertices(value: &Value, resolver: &Resolver) -> FlatshadeResult<Vec<Vec3>> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(
            resolver.lookup(DefKind::Vertices, name)?,
            Vertices,
            name
        ));
    }
    elems(as_array(value, 3, usize::MAX)?, |v| {
        coerce_vector(v, resolver)
    })
}

pub fn coerce_polygon(value: &Value, resolver: &Resolver) -> FlatshadeResult<Polygon> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(
            resolver.lookup(DefKind::Polygon, name)?,
            Polygon,
            name
        ));
    }
    let obj = as_object(value, &["color"], &["vertices"])?;
    let vertices = prop(obj, "vertices", |v| coerce_vertices(v, resolver))?;
    let normal = polygon_normal(&vertices)?;
    Ok(Polygon {
        vertices,
        normal,
        color: prop_or(
            obj,
            "color",
            || default_color(resolver, "$defaultPolygonColor"),
            |v| coerce_color(v, resolver),
        )?,
    })
}

pub fn coerce_polygons(value: &Value, resolver: &Resolver) -> FlatshadeResult<Vec<Polygon>> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(
            resolver.lookup(DefKind::Polygons, name)?,
            Polygons,
            name
        ));
    }
    elems(as_array(value, 0, usize::MAX)?, |v| {
        coerce_polygon(v, resolver)
    })
}

pub fn coerce_scene(value: &Value, resolver: &Resolver) -> FlatshadeResult<Scene> {
    if let Some(name) = ref_name(value) {
        return Ok(expect_def!(resolver.lookup(DefKind::Scene, name)?, Scene, name));
    }
    let obj = as_object(
        value,
        &["lights", "strokeColor", "strokeThickness", "anchorPoint"],
        &["camera", "polygons"],
    )?;
    Ok(Scene {
        camera: prop(obj, "camera", |v| coerce_camera(v, resolver))?,
        polygons: prop(obj, "polygons", |v| coerce_polygons(v, resolver))?,
        lights: prop_or(
            obj,
            "lights",
            || Ok(expect_def!(
                resolver.default_for(DefKind::Lights, "$defaultLights")?,
                Lights,
                "$defaultLights"
            )),
            |v| coerce_lights(v, resolver),
        )?,
        stroke_color: prop_or(
            obj,
            "strokeColor",
            || default_color(resolver, "$defaultStrokeColor"),
            |v| coerce_color(v, resolver),
        )?,
        stroke_thickness: prop_or(
            obj,
            "strokeThickness",
            || Ok(expect_def!(
                resolver.default_for(DefKind::Thickness, "$defaultStrokeThickness")?,
                Thickness,
                "$defaultStrokeThickness"
            )),
            |v| coerce_thickness(v, resolver),
        )?,
        anchor_point: prop_or(
            obj,
            "anchorPoint",
            || Ok(expect_def!(
                resolver.default_for(DefKind::Vector, "$defaultAnchorPoint")?,
                Vector,
                "$defaultAnchorPoint"
            )),
            |v| coerce_vector(v, resolver),
        )?,
    })
}

pub fn coerce_time(value: &Value) -> FlatshadeResult<f64> {
    as_number(value, 0.0, MAX_TIME_SECS)
}

fn coerce_keyframe(value: &Value, resolver: &Resolver) -> FlatshadeResult<Keyframe> {
    let obj = as_object(value, &[], &["time", "scene"])?;
    Ok(Keyframe {
        time: prop(obj, "time", coerce_time)?,
        scene: prop(obj, "scene", |v| coerce_scene(v, resolver))?,
    })
}

/// Decodes, sorts by time, then enforces unique times and uniform topology
/// against keyframe 0.
fn coerce_keyframes(value: &Value, resolver: &Resolver) -> FlatshadeResult<Vec<Keyframe>> {
    let mut keyframes = elems(as_array(value, 1, usize::MAX)?, |v| {
        coerce_keyframe(v, resolver)
    })?;
    keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));

    let polygon_counts: Vec<usize> = keyframes[0]
        .scene
        .polygons
        .iter()
        .map(|p| p.vertices.len())
        .collect();
    for (i, keyframe) in keyframes.iter().enumerate() {
        (|| {
            if i > 0 && keyframe.time == keyframes[i - 1].time {
                return Err(FlatshadeError::validation(format!(
                    "two keyframes at the same time {}",
                    keyframe.time
                )));
            }
            if keyframe.scene.polygons.len() != polygon_counts.len() {
                return Err(FlatshadeError::geometry(format!(
                    "polygon count mismatch between keyframes: expected {}, got {}",
                    polygon_counts.len(),
                    keyframe.scene.polygons.len()
                )));
            }
            for (p, polygon) in keyframe.scene.polygons.iter().enumerate() {
                if polygon.vertices.len() != polygon_counts[p] {
                    return Err(FlatshadeError::geometry(format!(
                        "vertex count mismatch between keyframes: expected {}, got {}",
                        polygon_counts[p],
                        polygon.vertices.len()
                    ))
                    .while_doing(format!("validating polygon with index {p}")));
                }
            }
            Ok(())
        })()
        .while_doing(|| format!("validating keyframe with index {i}"))?;
    }
    Ok(keyframes)
}

fn coerce_fit(value: &Value) -> FlatshadeResult<Fit> {
    Ok(match as_enum(value, &["width", "height", "min", "max"])? {
        "width" => Fit::Width,
        "height" => Fit::Height,
        "max" => Fit::Max,
        _ => Fit::Min,
    })
}

fn coerce_name(value: &Value) -> FlatshadeResult<String> {
    let str = as_string(value)?;
    if !is_valid_name(str) {
        return Err(FlatshadeError::validation(format!("invalid name \"{str}\"")));
    }
    Ok(str.to_owned())
}

fn coerce_frame_dimension(value: &Value) -> FlatshadeResult<f64> {
    as_number(value, f64::MIN_POSITIVE, f64::INFINITY)
}

fn coerce_frame_size(value: &Value) -> FlatshadeResult<Vec2> {
    let obj = as_object(value, &[], &["width", "height"])?;
    Ok(Vec2::new(
        prop(obj, "width", coerce_frame_dimension)?,
        prop(obj, "height", coerce_frame_dimension)?,
    ))
}

fn coerce_project(value: &Value, defs: &Defs) -> FlatshadeResult<Project> {
    let resolver = Resolver::Linked(defs);
    let obj = as_object(
        value,
        &["fit", "cullBack", "name", "frameSize", "definitions"],
        &["keyframes"],
    )?;
    Ok(Project {
        name: prop_or(obj, "name", || Ok(DEFAULT_PROJECT_NAME.to_owned()), coerce_name)?,
        frame_size: prop_or(obj, "frameSize", || Ok(Vec2::splat(1.0)), coerce_frame_size)?,
        fit: prop_or(obj, "fit", || Ok(Fit::Min), coerce_fit)?,
        cull_back: prop_or(obj, "cullBack", || Ok(true), as_bool)?,
        keyframes: prop(obj, "keyframes", |v| coerce_keyframes(v, &resolver))?,
    })
}

/// Loads a project from an already-parsed JSON document: builds the
/// definitions table, then decodes the body against it.
pub fn load_project(value: &Value) -> FlatshadeResult<Project> {
    let obj = as_open_object(value)?;
    let defs = build_definitions(obj.get("definitions"))
        .while_doing(|| "parsing definitions block")?;
    let project = coerce_project(value, &defs).while_doing(|| "parsing project")?;
    tracing::debug!(
        name = %project.name,
        keyframes = project.keyframes.len(),
        polygons = project.keyframes[0].scene.polygons.len(),
        "project loaded"
    );
    Ok(project)
}

/// Injected capability for the one blocking operation: reading the input
/// document.
pub trait FileLoader {
    fn read_to_string(&self) -> FlatshadeResult<String>;
}

pub struct FsFileLoader {
    path: PathBuf,
}

impl FsFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FileLoader for FsFileLoader {
    fn read_to_string(&self) -> FlatshadeResult<String> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            FlatshadeError::io(format!("cannot read \"{}\": {e}", self.path.display()))
        })
    }
}

/// Read → parse → load, each phase breadcrumbed.
#[tracing::instrument(skip_all)]
pub fn load_project_from(loader: &impl FileLoader) -> FlatshadeResult<Project> {
    let text = loader
        .read_to_string()
        .while_doing(|| "reading project file")?;
    let json: Value = serde_json::from_str(&text)
        .map_err(|e| FlatshadeError::parse(format!("malformed JSON: {e}")))
        .while_doing(|| "parsing project file")?;
    load_project(&json)
}

/// Dispatch used by the definitions builder: decodes a raw value as the
/// declared definition kind.
pub(crate) fn coerce_def_value(
    kind: DefKind,
    value: &Value,
    resolver: &Resolver,
) -> FlatshadeResult<DefValue> {
    Ok(match kind {
        DefKind::Camera => DefValue::Camera(coerce_camera(value, resolver)?),
        DefKind::Color => DefValue::Color(coerce_color(value, resolver)?),
        DefKind::Fov => DefValue::Fov(coerce_fov(value, resolver)?),
        DefKind::Light => DefValue::Light(coerce_light(value, resolver)?),
        DefKind::Lights => DefValue::Lights(coerce_lights(value, resolver)?),
        DefKind::Polygon => DefValue::Polygon(coerce_polygon(value, resolver)?),
        DefKind::Polygons => DefValue::Polygons(coerce_polygons(value, resolver)?),
        DefKind::Projection => DefValue::Projection(coerce_projection(value, resolver)?),
        DefKind::Radius => DefValue::Radius(coerce_radius(value, resolver)?),
        DefKind::Scale => DefValue::Scale(coerce_scale(value, resolver)?),
        DefKind::Scene => DefValue::Scene(coerce_scene(value, resolver)?),
        DefKind::Thickness => DefValue::Thickness(coerce_thickness(value, resolver)?),
        DefKind::Vector => DefValue::Vector(coerce_vector(value, resolver)?),
        DefKind::Vertices => DefValue::Vertices(coerce_vertices(value, resolver)?),
        DefKind::View => DefValue::View(coerce_view(value, resolver)?),
    })
}
