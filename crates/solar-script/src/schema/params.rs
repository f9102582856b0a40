//! Typed field access over a raw definition map

use crate::error::{Error, Result};
use solar_core::{Value, ValueMap, Vec2};

/// Reads typed parameters out of one behavior definition
///
/// Every accessor reports failures against the definition's name so a
/// rejected entry can be traced back to the file.
pub struct Params<'a> {
    definition: &'a str,
    map: &'a ValueMap,
}

impl<'a> Params<'a> {
    /// Wrap a definition map
    ///
    /// The definition name is read eagerly since every error mentions it.
    pub fn new(map: &'a ValueMap) -> Result<Self> {
        let definition = match map.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.as_str(),
            Some(Value::String(_)) => {
                return Err(Error::InvalidField {
                    definition: "<unnamed>".to_string(),
                    field: "name".to_string(),
                    reason: "must not be empty".to_string(),
                })
            }
            Some(other) => {
                return Err(Error::InvalidField {
                    definition: "<unnamed>".to_string(),
                    field: "name".to_string(),
                    reason: format!("expected string, got {}", other.type_name()),
                })
            }
            None => {
                return Err(Error::MissingField {
                    definition: "<unnamed>".to_string(),
                    field: "name".to_string(),
                })
            }
        };
        Ok(Self { definition, map })
    }

    /// The definition's name
    pub fn name(&self) -> &'a str {
        self.definition
    }

    /// The `type` discriminator
    pub fn kind(&self) -> Result<&'a str> {
        match self.map.get("type") {
            Some(Value::String(kind)) => Ok(kind.as_str()),
            Some(other) => Err(self.invalid("type", format!("expected string, got {}", other.type_name()))),
            None => Err(self.missing("type")),
        }
    }

    fn missing(&self, field: &str) -> Error {
        Error::MissingField {
            definition: self.definition.to_string(),
            field: field.to_string(),
        }
    }

    fn invalid(&self, field: &str, reason: impl Into<String>) -> Error {
        Error::InvalidField {
            definition: self.definition.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Look up a field, treating an explicit null as absent
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// A boolean flag with a default
    pub fn bool_or(&self, field: &str, default: bool) -> Result<bool> {
        match self.get(field) {
            None => Ok(default),
            Some(v) => v
                .as_bool()
                .ok_or_else(|| self.invalid(field, format!("expected bool, got {}", v.type_name()))),
        }
    }

    /// An integer with a default
    pub fn i32_or(&self, field: &str, default: i32) -> Result<i32> {
        match self.get(field) {
            None => Ok(default),
            Some(v) => v
                .as_int()
                .and_then(|i| i32::try_from(i).ok())
                .ok_or_else(|| self.invalid(field, format!("expected integer, got {}", v))),
        }
    }

    /// A finite number with a default
    pub fn f64_or(&self, field: &str, default: f64) -> Result<f64> {
        match self.get(field) {
            None => Ok(default),
            Some(v) => self.finite(field, v),
        }
    }

    /// A finite, non-negative number with a default
    pub fn non_negative_or(&self, field: &str, default: f64) -> Result<f64> {
        let value = self.f64_or(field, default)?;
        if value < 0.0 {
            return Err(self.invalid(field, format!("must be non-negative, got {}", value)));
        }
        Ok(value)
    }

    /// A finite, strictly positive number with a default
    pub fn positive_or(&self, field: &str, default: f64) -> Result<f64> {
        let value = self.f64_or(field, default)?;
        if value <= 0.0 {
            return Err(self.invalid(field, format!("must be positive, got {}", value)));
        }
        Ok(value)
    }

    fn finite(&self, field: &str, value: &Value) -> Result<f64> {
        match value.as_float() {
            Some(f) if f.is_finite() => Ok(f),
            Some(f) => Err(self.invalid(field, format!("must be finite, got {}", f))),
            None => Err(self.invalid(field, format!("expected number, got {}", value.type_name()))),
        }
    }

    /// An `[x, y]` point with a default
    pub fn point_or(&self, field: &str, default: Vec2) -> Result<Vec2> {
        match self.get(field) {
            None => Ok(default),
            Some(v) => self.point(field, v),
        }
    }

    fn point(&self, field: &str, value: &Value) -> Result<Vec2> {
        match value.as_point() {
            Some(p) if p.is_finite() => Ok(p),
            Some(_) => Err(self.invalid(field, "coordinates must be finite")),
            None => Err(self.invalid(field, format!("expected [x, y], got {}", value))),
        }
    }

    /// A list of points; absent means empty
    pub fn points_or_empty(&self, field: &str) -> Result<Vec<Vec2>> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(v) => self.points(field, v),
        }
    }

    /// A non-empty list of points
    pub fn required_points(&self, field: &str) -> Result<Vec<Vec2>> {
        let value = self.get(field).ok_or_else(|| self.missing(field))?;
        let points = self.points(field, value)?;
        if points.is_empty() {
            return Err(self.invalid(field, "must contain at least one point"));
        }
        Ok(points)
    }

    fn points(&self, field: &str, value: &Value) -> Result<Vec<Vec2>> {
        let list = value
            .as_list()
            .ok_or_else(|| self.invalid(field, format!("expected list of points, got {}", value.type_name())))?;
        list.iter().map(|p| self.point(field, p)).collect()
    }

    /// A non-empty list of non-empty point lists
    pub fn required_routes(&self, field: &str) -> Result<Vec<Vec<Vec2>>> {
        let value = self.get(field).ok_or_else(|| self.missing(field))?;
        let routes = value
            .as_list()
            .ok_or_else(|| self.invalid(field, format!("expected list of routes, got {}", value.type_name())))?;
        if routes.is_empty() {
            return Err(self.invalid(field, "must contain at least one route"));
        }
        routes
            .iter()
            .enumerate()
            .map(|(i, route)| {
                let points = self.points(field, route)?;
                if points.is_empty() {
                    return Err(self.invalid(field, format!("route {} is empty", i)));
                }
                Ok(points)
            })
            .collect()
    }

    /// A list of strings; absent means empty
    pub fn strings_or_empty(&self, field: &str) -> Result<Vec<String>> {
        let Some(value) = self.get(field) else {
            return Ok(Vec::new());
        };
        let list = value
            .as_list()
            .ok_or_else(|| self.invalid(field, format!("expected list of strings, got {}", value.type_name())))?;
        list.iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(field, format!("expected string, got {}", item)))
            })
            .collect()
    }

    /// A non-empty list of strings
    pub fn required_strings(&self, field: &str) -> Result<Vec<String>> {
        if self.get(field).is_none() {
            return Err(self.missing(field));
        }
        let strings = self.strings_or_empty(field)?;
        if strings.is_empty() {
            return Err(self.invalid(field, "must name at least one type"));
        }
        Ok(strings)
    }

    /// An optional string
    pub fn optional_string(&self, field: &str) -> Result<Option<String>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(field, format!("expected string, got {}", other.type_name()))),
        }
    }
}

/// Encode a list of points as a value
pub(crate) fn points_value(points: &[Vec2]) -> Value {
    Value::List(points.iter().copied().map(Value::Point).collect())
}

/// Encode a list of strings as a value
pub(crate) fn strings_value(strings: &[String]) -> Value {
    Value::List(strings.iter().map(|s| Value::from(s.as_str())).collect())
}
