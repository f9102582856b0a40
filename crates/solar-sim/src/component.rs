//! Typed reads and writes on component maps
//!
//! Components are plain `ValueMap`s so they serialize without help from
//! the systems. These helpers give each system a typed view: an absent or
//! null key reads as `None`, a key holding the wrong kind of value is
//! reported as [`Malformed`].

use solar_core::{EntityId, Value, ValueMap, Vec2};

/// Name of the component field that failed to decode
#[derive(Debug, Clone, PartialEq)]
pub struct Malformed(pub String);

type Field<T> = std::result::Result<Option<T>, Malformed>;

fn present<'a>(map: &'a ValueMap, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

pub(crate) fn opt_f64(map: &ValueMap, key: &str) -> Field<f64> {
    match present(map, key) {
        None => Ok(None),
        Some(v) => match v.as_float() {
            Some(f) if f.is_finite() => Ok(Some(f)),
            _ => Err(Malformed(key.to_string())),
        },
    }
}

pub(crate) fn opt_point(map: &ValueMap, key: &str) -> Field<Vec2> {
    match present(map, key) {
        None => Ok(None),
        Some(v) => match v.as_point() {
            Some(p) if p.is_finite() => Ok(Some(p)),
            _ => Err(Malformed(key.to_string())),
        },
    }
}

pub(crate) fn opt_points(map: &ValueMap, key: &str) -> Field<Vec<Vec2>> {
    match present(map, key) {
        None => Ok(None),
        Some(v) => match v.as_points() {
            Some(points) if points.iter().all(|p| p.is_finite()) => Ok(Some(points)),
            _ => Err(Malformed(key.to_string())),
        },
    }
}

pub(crate) fn opt_string(map: &ValueMap, key: &str) -> Field<String> {
    match present(map, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Malformed(key.to_string())),
    }
}

pub(crate) fn opt_index(map: &ValueMap, key: &str) -> Field<usize> {
    match present(map, key) {
        None => Ok(None),
        Some(v) => v
            .as_int()
            .and_then(|i| usize::try_from(i).ok())
            .map(Some)
            .ok_or_else(|| Malformed(key.to_string())),
    }
}

pub(crate) fn opt_entity(map: &ValueMap, key: &str) -> Field<EntityId> {
    match present(map, key) {
        None => Ok(None),
        Some(v) => v
            .as_entity_id()
            .map(Some)
            .ok_or_else(|| Malformed(key.to_string())),
    }
}

pub(crate) fn opt_map(map: &ValueMap, key: &str) -> Field<ValueMap> {
    match present(map, key) {
        None => Ok(None),
        Some(Value::Map(m)) => Ok(Some(m.clone())),
        Some(_) => Err(Malformed(key.to_string())),
    }
}

/// Write `value`, or drop the key when there is nothing to store
pub(crate) fn set_or_remove<T: Into<Value>>(map: &mut ValueMap, key: &str, value: Option<T>) {
    match value {
        Some(v) => {
            map.insert(key.to_string(), v.into());
        }
        None => {
            map.shift_remove(key);
        }
    }
}
