//! Dynamic value types for properties, components and AI memory

use crate::identity::EntityId;
use crate::math::Vec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamic value drawn from a small closed set of kinds
///
/// Serialized untagged so component maps read as plain JSON:
/// `{"velocity": [1.0, 0.0], "behavior": "seek", "fuel": 80}`.
/// Variant order matters for deserialization: a two-number array becomes
/// a `Point`, any other array a `List`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// No value / null
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (counts, indices, entity ids)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// 2D coordinate pair
    Point(Vec2),
    /// List of values
    List(Vec<Value>),
    /// Map of string keys to values
    Map(ValueMap),
}

/// A map of string keys to dynamic values
///
/// Uses IndexMap to preserve insertion order (deterministic serialization)
pub type ValueMap = IndexMap<String, Value>;

impl Value {
    /// Create a point value
    pub fn point(x: f64, y: f64) -> Self {
        Value::Point(Vec2::new(x, y))
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get this value as a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an entity id (stored as a non-negative int)
    pub fn as_entity_id(&self) -> Option<EntityId> {
        match self {
            Value::Int(i) if *i >= 0 => Some(EntityId(*i as u64)),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get this value as a point
    ///
    /// Accepts a `Point` or a two-element list of numbers.
    pub fn as_point(&self) -> Option<Vec2> {
        match self {
            Value::Point(p) => Some(*p),
            Value::List(list) if list.len() == 2 => {
                Some(Vec2::new(list[0].as_float()?, list[1].as_float()?))
            }
            _ => None,
        }
    }

    /// Try to get this value as a list of points
    pub fn as_points(&self) -> Option<Vec<Vec2>> {
        self.as_list()?.iter().map(Value::as_point).collect()
    }

    /// Try to get this value as a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to get this value as a map
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Point(_) => "point",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Point(p) => write!(f, "({}, {})", p.x, p.y),
            Value::List(list) => {
                write!(f, "[")?;
                for (i, v) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec2> for Value {
    fn from(p: Vec2) -> Self {
        Value::Point(p)
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::Int(id.raw() as i64)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(vec: Vec<T>) -> Self {
        Value::List(vec.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::Float(2.5).as_float(), Some(2.5));
        assert_eq!(Value::Int(42).as_float(), Some(42.0));
        assert_eq!(Value::String("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::point(1.0, 2.0).as_point(), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_point_from_number_list() {
        let list = Value::List(vec![Value::Int(3), Value::Float(4.5)]);
        assert_eq!(list.as_point(), Some(Vec2::new(3.0, 4.5)));
        assert_eq!(Value::List(vec![Value::Int(3)]).as_point(), None);
    }

    #[test]
    fn test_entity_id_value() {
        let v: Value = EntityId(9).into();
        assert_eq!(v.as_entity_id(), Some(EntityId(9)));
        assert_eq!(Value::Int(-1).as_entity_id(), None);
    }

    #[test]
    fn test_json_shape() {
        let mut map = ValueMap::new();
        map.insert("behavior".into(), "seek".into());
        map.insert("velocity".into(), Value::point(1.0, -2.0));
        map.insert("fuel".into(), 80i64.into());
        map.insert("target_position".into(), Value::Null);

        let json = serde_json::to_string(&Value::Map(map.clone())).unwrap();
        assert_eq!(
            json,
            r#"{"behavior":"seek","velocity":[1.0,-2.0],"fuel":80,"target_position":null}"#
        );

        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Map(map));
    }

    #[test]
    fn test_ron_component() {
        let fixture = r#"{
            "behavior": "patrol",
            "waypoints": [[0.0, 0.0], [50.0, 25.5]],
            "fuel": 80,
            "docked": false,
        }"#;
        let value: Value = ron::from_str(fixture).unwrap();
        let map = value.as_map().unwrap();

        assert_eq!(map.get("behavior"), Some(&Value::from("patrol")));
        assert_eq!(
            map.get("waypoints"),
            Some(&Value::List(vec![Value::point(0.0, 0.0), Value::point(50.0, 25.5)]))
        );
        assert_eq!(map.get("fuel").and_then(Value::as_int), Some(80));
        assert_eq!(map.get("docked"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_json_lists() {
        let waypoints: Value = serde_json::from_str("[[0, 0], [100.5, 0], [100, 100]]").unwrap();
        let points = waypoints.as_points().unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Vec2::new(100.5, 0.0));

        let triple: Value = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(triple.as_list().map(|l| l.len()), Some(3));
    }
}
