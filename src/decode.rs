//! Validating primitives over untyped JSON. Every function is pure: it takes
//! a `serde_json::Value` and returns a typed value or a described failure.
//! Object decoding is closed-schema — keys outside the declared optional and
//! required sets are rejected.

use serde_json::{Map, Value};

use crate::error::{FlatshadeError, FlatshadeResult, ResultExt};

pub type JsonObject = Map<String, Value>;

pub fn as_object<'a>(
    value: &'a Value,
    optional: &[&str],
    required: &[&str],
) -> FlatshadeResult<&'a JsonObject> {
    let obj = as_open_object(value)?;
    for key in obj.keys() {
        if !optional.contains(&key.as_str()) && !required.contains(&key.as_str()) {
            return Err(FlatshadeError::validation(format!(
                "unexpected property \"{key}\" in object"
            )));
        }
    }
    for key in required {
        if !obj.contains_key(*key) {
            return Err(FlatshadeError::validation(format!(
                "missing property \"{key}\" in object"
            )));
        }
    }
    Ok(obj)
}

/// Object check without a schema; used where keys are data (definitions).
pub fn as_open_object(value: &Value) -> FlatshadeResult<&JsonObject> {
    value
        .as_object()
        .ok_or_else(|| FlatshadeError::validation("not an object"))
}

pub fn as_number(value: &Value, min: f64, max: f64) -> FlatshadeResult<f64> {
    let num = value
        .as_f64()
        .ok_or_else(|| FlatshadeError::validation("not a number"))?;
    if !num.is_finite() {
        return Err(FlatshadeError::validation("number is not finite"));
    }
    if num < min || num > max {
        return Err(FlatshadeError::validation(format!(
            "number not in range [{min}, {max}]"
        )));
    }
    Ok(num)
}

pub fn as_string(value: &Value) -> FlatshadeResult<&str> {
    value
        .as_str()
        .ok_or_else(|| FlatshadeError::validation("not a string"))
}

pub fn as_bool(value: &Value) -> FlatshadeResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| FlatshadeError::validation("not a boolean"))
}

pub fn as_array(value: &Value, min_len: usize, max_len: usize) -> FlatshadeResult<&[Value]> {
    let array = value
        .as_array()
        .ok_or_else(|| FlatshadeError::validation("not an array"))?;
    if array.len() < min_len || array.len() > max_len {
        if min_len == max_len {
            return Err(FlatshadeError::validation(format!(
                "array length is not {min_len}"
            )));
        }
        return Err(FlatshadeError::validation(format!(
            "array length not in range [{min_len}, {max_len}]"
        )));
    }
    Ok(array)
}

pub fn as_enum<'a>(value: &'a Value, allowed: &[&str]) -> FlatshadeResult<&'a str> {
    let str = as_string(value)?;
    if !allowed.contains(&str) {
        return Err(FlatshadeError::validation(format!(
            "\"{str}\" not in {allowed:?}"
        )));
    }
    Ok(str)
}

/// Required property lookup; failures carry a `parsing property` breadcrumb.
pub fn prop<T>(
    obj: &JsonObject,
    key: &str,
    decode: impl FnOnce(&Value) -> FlatshadeResult<T>,
) -> FlatshadeResult<T> {
    let Some(value) = obj.get(key) else {
        return Err(FlatshadeError::validation(format!(
            "missing required property \"{key}\""
        )));
    };
    decode(value).while_doing(|| format!("parsing property \"{key}\""))
}

/// Optional property lookup with a fallback built only when the key is absent.
pub fn prop_or<T>(
    obj: &JsonObject,
    key: &str,
    default: impl FnOnce() -> FlatshadeResult<T>,
    decode: impl FnOnce(&Value) -> FlatshadeResult<T>,
) -> FlatshadeResult<T> {
    match obj.get(key) {
        Some(value) => decode(value).while_doing(|| format!("parsing property \"{key}\"")),
        None => default(),
    }
}

/// Decodes every element, breadcrumbing failures with the element index.
pub fn elems<T>(
    array: &[Value],
    decode: impl Fn(&Value) -> FlatshadeResult<T>,
) -> FlatshadeResult<Vec<T>> {
    array
        .iter()
        .enumerate()
        .map(|(i, v)| decode(v).while_doing(|| format!("processing element with index {i}")))
        .collect()
}

/// Reference-key pattern: `$` followed by one or more of [A-Za-z0-9_-].
pub fn is_ref_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('$') else {
        return false;
    };
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// True when the value is a string holding a reference token.
pub fn is_ref(value: &Value) -> bool {
    ref_name(value).is_some()
}

/// The reference token held by the value, if any.
pub fn ref_name(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| is_ref_name(s))
}

/// Project names: printable ASCII without leading or trailing blanks.
pub fn is_valid_name(name: &str) -> bool {
    name.chars().all(|c| c == ' ' || c.is_ascii_graphic())
        && name.trim_ascii() == name
}

/// Parses `#rgb`, `#rrggbb` (leading `#` optional) into components in [0, 1].
pub fn parse_hex_color(str: &str) -> FlatshadeResult<[f64; 3]> {
    let digits = str.strip_prefix('#').unwrap_or(str);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FlatshadeError::validation(format!(
            "invalid hex color string \"{str}\""
        )));
    }
    let channel = |hi: u32, lo: u32| f64::from(hi * 16 + lo) / 255.0;
    let nibbles: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(16)).collect();
    match nibbles.as_slice() {
        [r, g, b] => Ok([channel(*r, *r), channel(*g, *g), channel(*b, *b)]),
        [r1, r0, g1, g0, b1, b0] => Ok([channel(*r1, *r0), channel(*g1, *g0), channel(*b1, *b0)]),
        _ => Err(FlatshadeError::validation(format!(
            "invalid hex color string \"{str}\""
        ))),
    }
}
