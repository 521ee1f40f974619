//! Named definitions (`$name`) and the two-phase reference linker. Phase 1
//! builds the table: built-in defaults first, then user entries decoded with
//! a sealed resolver so a definition can never reference another one. Phase 2
//! decodes the project body against the linked table, substituting each
//! reference token with the type-checked concrete value in place. The table
//! is consumed by loading; the runtime model carries no references.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::decode::{as_object, as_open_object, as_string, is_ref, is_ref_name, prop};
use crate::error::{FlatshadeError, FlatshadeResult, ResultExt};
use crate::load::coerce_def_value;
use crate::math::{Vec3, deg2rad};
use crate::model::{Camera, Light, Polygon, Projection, Scene, View};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefKind {
    Camera,
    Color,
    Fov,
    Light,
    Lights,
    Polygon,
    Polygons,
    Projection,
    Radius,
    Scale,
    Scene,
    Thickness,
    Vector,
    Vertices,
    View,
}

impl DefKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "camera" => DefKind::Camera,
            "color" => DefKind::Color,
            "fov" => DefKind::Fov,
            "light" => DefKind::Light,
            "lights" => DefKind::Lights,
            "polygon" => DefKind::Polygon,
            "polygons" => DefKind::Polygons,
            "projection" => DefKind::Projection,
            "radius" => DefKind::Radius,
            "scale" => DefKind::Scale,
            "scene" => DefKind::Scene,
            "thickness" => DefKind::Thickness,
            "vector" => DefKind::Vector,
            "vertices" => DefKind::Vertices,
            "view" => DefKind::View,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DefKind::Camera => "camera",
            DefKind::Color => "color",
            DefKind::Fov => "fov",
            DefKind::Light => "light",
            DefKind::Lights => "lights",
            DefKind::Polygon => "polygon",
            DefKind::Polygons => "polygons",
            DefKind::Projection => "projection",
            DefKind::Radius => "radius",
            DefKind::Scale => "scale",
            DefKind::Scene => "scene",
            DefKind::Thickness => "thickness",
            DefKind::Vector => "vector",
            DefKind::Vertices => "vertices",
            DefKind::View => "view",
        }
    }
}

/// A linked definition value; one variant per `DefKind`.
#[derive(Clone, Debug, PartialEq)]
pub enum DefValue {
    Camera(Camera),
    Color(Vec3),
    Fov(f64),
    Light(Light),
    Lights(Vec<Light>),
    Polygon(Polygon),
    Polygons(Vec<Polygon>),
    Projection(Projection),
    Radius(f64),
    Scale(f64),
    Scene(Scene),
    Thickness(f64),
    Vector(Vec3),
    Vertices(Vec<Vec3>),
    View(View),
}

impl DefValue {
    pub fn kind(&self) -> DefKind {
        match self {
            DefValue::Camera(_) => DefKind::Camera,
            DefValue::Color(_) => DefKind::Color,
            DefValue::Fov(_) => DefKind::Fov,
            DefValue::Light(_) => DefKind::Light,
            DefValue::Lights(_) => DefKind::Lights,
            DefValue::Polygon(_) => DefKind::Polygon,
            DefValue::Polygons(_) => DefKind::Polygons,
            DefValue::Projection(_) => DefKind::Projection,
            DefValue::Radius(_) => DefKind::Radius,
            DefValue::Scale(_) => DefKind::Scale,
            DefValue::Scene(_) => DefKind::Scene,
            DefValue::Thickness(_) => DefKind::Thickness,
            DefValue::Vector(_) => DefKind::Vector,
            DefValue::Vertices(_) => DefKind::Vertices,
            DefValue::View(_) => DefKind::View,
        }
    }
}

/// The finished name → value table.
#[derive(Clone, Debug, Default)]
pub struct Defs {
    table: BTreeMap<String, DefValue>,
}

impl Defs {
    pub fn get(&self, kind: DefKind, name: &str) -> FlatshadeResult<&DefValue> {
        let Some(def) = self.table.get(name) else {
            return Err(FlatshadeError::reference(format!(
                "no definition with key \"{name}\""
            )));
        };
        if def.kind() != kind {
            return Err(FlatshadeError::reference(format!(
                "definition \"{name}\" has type \"{}\", not \"{}\"",
                def.kind().as_str(),
                kind.as_str()
            )));
        }
        Ok(def)
    }

    fn insert(&mut self, name: impl Into<String>, value: DefValue) {
        self.table.insert(name.into(), value);
    }
}

/// How reference tokens behave while decoding. Definitions decode sealed —
/// an explicit reference inside a definition is an error, and absent
/// optional fields fall back to the built-in defaults only. The project body
/// decodes linked against the finished table.
#[derive(Clone, Copy, Debug)]
pub enum Resolver<'a> {
    Sealed { builtins: &'a Defs },
    Linked(&'a Defs),
}

impl Resolver<'_> {
    /// Resolves an explicit `$name` token written in the input.
    pub fn lookup(&self, kind: DefKind, name: &str) -> FlatshadeResult<DefValue> {
        match self {
            Resolver::Sealed { .. } => Err(FlatshadeError::reference(
                "definitions may not reference other definitions",
            )),
            Resolver::Linked(defs) => Ok(defs.get(kind, name)?.clone()),
        }
    }

    /// Resolves the default for an absent optional field. Inside a sealed
    /// definition decode this reaches the built-in defaults, never a user
    /// entry.
    pub fn default_for(&self, kind: DefKind, name: &str) -> FlatshadeResult<DefValue> {
        let defs = match self {
            Resolver::Sealed { builtins } => builtins,
            Resolver::Linked(defs) => defs,
        };
        Ok(defs.get(kind, name)?.clone())
    }
}

fn builtin_defaults() -> Defs {
    let white = Vec3::splat(1.0);
    let mut defs = Defs::default();
    defs.insert(
        "$defaultProjection",
        DefValue::Projection(Projection::Perspective {
            fov_rad: deg2rad(60.0),
        }),
    );
    defs.insert("$defaultLightColor", DefValue::Color(white));
    defs.insert("$defaultPolygonColor", DefValue::Color(white));
    defs.insert("$defaultProjectionScale", DefValue::Scale(1.0));
    defs.insert("$defaultProjectionFov", DefValue::Fov(60.0));
    defs.insert("$defaultStrokeColor", DefValue::Color(Vec3::zero()));
    defs.insert("$defaultStrokeThickness", DefValue::Thickness(10.0));
    defs.insert(
        "$defaultLights",
        DefValue::Lights(vec![Light::Ambient {
            color: Vec3::splat(0.8),
        }]),
    );
    defs.insert("$defaultAnchorPoint", DefValue::Vector(Vec3::zero()));
    defs
}

fn coerce_definition(value: &Value, builtins: &Defs) -> FlatshadeResult<DefValue> {
    let obj = as_object(value, &[], &["type", "value"])?;
    let kind = prop(obj, "type", |v| {
        let name = as_string(v)?;
        DefKind::from_name(name).ok_or_else(|| {
            FlatshadeError::validation(format!("\"{name}\" is not a definition type"))
        })
    })?;
    prop(obj, "value", |v| {
        if is_ref(v) {
            return Err(FlatshadeError::reference(
                "definition value cannot be a direct reference",
            ));
        }
        coerce_def_value(kind, v, &Resolver::Sealed { builtins })
    })
}

/// Builds the definitions table from the optional `definitions` block:
/// built-in defaults seeded first, user entries overriding same names.
pub fn build_definitions(raw: Option<&Value>) -> FlatshadeResult<Defs> {
    let builtins = builtin_defaults();
    let mut user = Vec::new();
    if let Some(raw) = raw {
        let obj = as_open_object(raw)?;
        for (name, entry) in obj {
            let def = (|| {
                if !is_ref_name(name) {
                    return Err(FlatshadeError::validation(format!(
                        "invalid definition key \"{name}\" (expected $[A-Za-z0-9_-]+)"
                    )));
                }
                coerce_definition(entry, &builtins)
            })()
            .while_doing(|| format!("parsing definition \"{name}\""))?;
            user.push((name.clone(), def));
        }
    }
    let mut defs = builtins;
    for (name, def) in user {
        defs.insert(name, def);
    }
    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtins_are_seeded() {
        let defs = build_definitions(None).unwrap();
        assert!(matches!(
            defs.get(DefKind::Lights, "$defaultLights").unwrap(),
            DefValue::Lights(lights) if lights.len() == 1
        ));
        assert!(defs.get(DefKind::Color, "$defaultStrokeColor").is_ok());
    }

    #[test]
    fn user_entries_override_builtins() {
        let raw = json!({
            "$defaultStrokeThickness": { "type": "thickness", "value": 3 }
        });
        let defs = build_definitions(Some(&raw)).unwrap();
        assert_eq!(
            defs.get(DefKind::Thickness, "$defaultStrokeThickness")
                .unwrap(),
            &DefValue::Thickness(3.0)
        );
    }

    #[test]
    fn lookup_checks_name_and_kind() {
        let raw = json!({ "$red": { "type": "color", "value": [1, 0, 0] } });
        let defs = build_definitions(Some(&raw)).unwrap();
        assert_eq!(
            defs.get(DefKind::Color, "$red").unwrap(),
            &DefValue::Color(Vec3::new(1.0, 0.0, 0.0))
        );

        let err = defs.get(DefKind::Color, "$blue").unwrap_err();
        assert!(matches!(err, FlatshadeError::Reference(_)));
        let err = defs.get(DefKind::Vector, "$red").unwrap_err();
        assert!(err.to_string().contains("has type \"color\""));
    }

    #[test]
    fn definitions_may_not_reference_definitions() {
        let raw = json!({
            "$red": { "type": "color", "value": [1, 0, 0] },
            "$alias": { "type": "color", "value": "$red" }
        });
        let err = build_definitions(Some(&raw)).unwrap_err();
        assert!(matches!(err, FlatshadeError::Reference(_)));
        assert!(err.to_string().contains("parsing definition \"$alias\""));

        let raw = json!({
            "$poly": { "type": "polygon", "value": {
                "vertices": [[0,0,0],[1,0,0],[0,1,0]],
                "color": "$red"
            }}
        });
        let err = build_definitions(Some(&raw)).unwrap_err();
        assert!(matches!(err, FlatshadeError::Reference(_)));
    }

    #[test]
    fn bad_definition_keys_and_schemas_fail() {
        let raw = json!({ "red": { "type": "color", "value": [1, 0, 0] } });
        assert!(build_definitions(Some(&raw)).is_err());

        let raw = json!({ "$red": { "type": "color", "value": [1, 0, 0], "extra": 1 } });
        assert!(build_definitions(Some(&raw)).is_err());

        let raw = json!({ "$red": { "type": "colour", "value": [1, 0, 0] } });
        assert!(build_definitions(Some(&raw)).is_err());
    }
}
