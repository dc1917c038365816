//! Dynamic value model
//!
//! CRD fields frequently have shapes that are not statically known:
//! `x-kubernetes-preserve-unknown-fields` objects, numeric fields that may
//! arrive as integer or float literals, and the int-or-string union used for
//! ports and quantities. [`Dynamic`] and its companions represent those
//! values as explicit tagged unions that round-trip losslessly through both
//! JSON and YAML.

use indexmap::IndexMap;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::fmt;

use crate::error::{CoreError, Result};

/// An arbitrary configuration value
///
/// Maps preserve insertion order, which in turn fixes the key order of the
/// serialized manifest. Map keys are always strings; decoding a document
/// with non-string keys fails with [`CoreError::UnsupportedShape`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dynamic {
    #[default]
    Null,
    Bool(bool),
    Number(DynamicNumber),
    String(String),
    List(Vec<Dynamic>),
    Map(IndexMap<String, Dynamic>),
}

/// A number that is either an integer or a float, preserving which form was
/// originally supplied. Pure pass-through storage; no arithmetic is ever
/// performed on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DynamicNumber {
    Int(i64),
    Float(f64),
}

/// Kubernetes' int-or-string union (ports, quantities, percentages)
///
/// Serialization emits whichever form was stored; the two forms are never
/// coerced into one another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntOrString {
    Int(i64),
    String(String),
}

impl Dynamic {
    /// Create an empty map value
    pub fn object() -> Self {
        Self::Map(IndexMap::new())
    }

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Create an integer value
    pub fn int(i: i64) -> Self {
        Self::Number(DynamicNumber::Int(i))
    }

    /// Create a float value
    pub fn float(f: f64) -> Self {
        Self::Number(DynamicNumber::Float(f))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(DynamicNumber::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value widened to f64, whichever form it was stored in
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(DynamicNumber::Int(i)) => Some(*i as f64),
            Self::Number(DynamicNumber::Float(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Dynamic]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Dynamic>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Dynamic>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Human-readable name of this value's shape, for diagnostics
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(DynamicNumber::Int(_)) => "integer",
            Self::Number(DynamicNumber::Float(_)) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Parse a YAML document into a dynamic value
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let value: YamlValue = serde_yaml::from_str(yaml)?;
        Self::from_yaml(&value)
    }

    /// Convert from a parsed YAML value
    ///
    /// Tagged values, non-string map keys, and non-finite floats have no
    /// representation here and fail with `UnsupportedShape`.
    pub fn from_yaml(value: &YamlValue) -> Result<Self> {
        match value {
            YamlValue::Null => Ok(Self::Null),
            YamlValue::Bool(b) => Ok(Self::Bool(*b)),
            YamlValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Number(DynamicNumber::Int(i)))
                } else if n.as_u64().is_some() {
                    Err(CoreError::unsupported(format!(
                        "integer {} does not fit in a signed 64-bit value",
                        n
                    )))
                } else {
                    match n.as_f64() {
                        Some(f) if f.is_finite() => Ok(Self::Number(DynamicNumber::Float(f))),
                        _ => Err(CoreError::unsupported(format!("non-finite number {}", n))),
                    }
                }
            }
            YamlValue::String(s) => Ok(Self::String(s.clone())),
            YamlValue::Sequence(items) => {
                let converted: Result<Vec<_>> = items.iter().map(Self::from_yaml).collect();
                Ok(Self::List(converted?))
            }
            YamlValue::Mapping(mapping) => {
                let mut map = IndexMap::with_capacity(mapping.len());
                for (key, val) in mapping {
                    let key = key.as_str().ok_or_else(|| {
                        CoreError::unsupported("map keys must be strings".to_string())
                    })?;
                    map.insert(key.to_string(), Self::from_yaml(val)?);
                }
                Ok(Self::Map(map))
            }
            YamlValue::Tagged(tagged) => Err(CoreError::unsupported(format!(
                "tagged value {}",
                tagged.tag
            ))),
        }
    }

    /// Serialize to a YAML document string
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Convert from a parsed JSON value
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(b) => Ok(Self::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Number(DynamicNumber::Int(i)))
                } else if n.as_u64().is_some() {
                    Err(CoreError::unsupported(format!(
                        "integer {} does not fit in a signed 64-bit value",
                        n
                    )))
                } else {
                    match n.as_f64() {
                        Some(f) if f.is_finite() => Ok(Self::Number(DynamicNumber::Float(f))),
                        _ => Err(CoreError::unsupported(format!("non-finite number {}", n))),
                    }
                }
            }
            JsonValue::String(s) => Ok(Self::String(s.clone())),
            JsonValue::Array(items) => {
                let converted: Result<Vec<_>> = items.iter().map(Self::from_json).collect();
                Ok(Self::List(converted?))
            }
            JsonValue::Object(obj) => {
                let mut map = IndexMap::with_capacity(obj.len());
                for (key, val) in obj {
                    map.insert(key.clone(), Self::from_json(val)?);
                }
                Ok(Self::Map(map))
            }
        }
    }

    /// Convert to a JSON value (always representable)
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Number(DynamicNumber::Int(i)) => JsonValue::Number((*i).into()),
            Self::Number(DynamicNumber::Float(f)) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => {
                let mut obj = serde_json::Map::new();
                for (key, val) in map {
                    obj.insert(key.clone(), val.to_json());
                }
                JsonValue::Object(obj)
            }
        }
    }

    /// Get a nested value by dotted path (e.g., "metadata.name")
    pub fn get(&self, path: &str) -> Option<&Dynamic> {
        let mut current = self;
        for part in path.split('.') {
            current = current.as_map()?.get(part)?;
        }
        Some(current)
    }

    /// Set a nested value by dotted path, creating intermediate maps
    ///
    /// Non-map values along the path are replaced by maps, matching overlay
    /// semantics for `--set`-style overrides.
    pub fn set(&mut self, path: &str, value: Dynamic) {
        let parts: Vec<&str> = path.split('.').collect();
        set_nested(self, &parts, value);
    }

    /// Deep merge another value into this one
    ///
    /// Rules:
    /// - Scalars and lists: overlay replaces base
    /// - Maps: recursive merge
    pub fn merge(&mut self, overlay: &Dynamic) {
        match (self, overlay) {
            (Dynamic::Map(base), Dynamic::Map(over)) => {
                for (key, over_value) in over {
                    match base.get_mut(key) {
                        Some(base_value) => base_value.merge(over_value),
                        None => {
                            base.insert(key.clone(), over_value.clone());
                        }
                    }
                }
            }
            (base, overlay) => {
                *base = overlay.clone();
            }
        }
    }
}

fn set_nested(value: &mut Dynamic, path: &[&str], new_value: Dynamic) {
    if path.is_empty() {
        *value = new_value;
        return;
    }

    if value.as_map().is_none() {
        *value = Dynamic::object();
    }
    let map = value
        .as_map_mut()
        .expect("value was just replaced with a map");

    let key = path[0];
    let remaining = &path[1..];

    if remaining.is_empty() {
        map.insert(key.to_string(), new_value);
    } else {
        let entry = map.entry(key.to_string()).or_insert_with(Dynamic::object);
        set_nested(entry, remaining, new_value);
    }
}

/// Parse `--set key=value` style overrides into (path, value) pairs
///
/// Values parse as booleans, null, integers, floats, or inline JSON where
/// they look like it, falling back to plain strings.
pub fn parse_set_overrides(args: &[String]) -> Result<Vec<(String, Dynamic)>> {
    let mut overrides = Vec::with_capacity(args.len());

    for arg in args {
        let (key, val) = arg.split_once('=').ok_or_else(|| CoreError::InvalidOverride {
            message: format!("Invalid --set format: '{}'. Expected key=value", arg),
        })?;

        let value = if val == "true" {
            Dynamic::Bool(true)
        } else if val == "false" {
            Dynamic::Bool(false)
        } else if val == "null" {
            Dynamic::Null
        } else if let Ok(num) = val.parse::<i64>() {
            Dynamic::int(num)
        } else if let Ok(num) = val.parse::<f64>() {
            Dynamic::float(num)
        } else if val.starts_with('[') || val.starts_with('{') {
            match serde_json::from_str::<JsonValue>(val) {
                Ok(json) => Dynamic::from_json(&json)?,
                Err(_) => Dynamic::string(val),
            }
        } else {
            Dynamic::string(val)
        };

        overrides.push((key.to_string(), value));
    }

    Ok(overrides)
}

impl Serialize for Dynamic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => serializer.collect_seq(items),
            Self::Map(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a YAML-representable value")
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_none<E: serde::de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_some<D: Deserializer<'de>>(
                self,
                deserializer: D,
            ) -> std::result::Result<Dynamic, D::Error> {
                Dynamic::deserialize(deserializer)
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Bool(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::int(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Dynamic, E> {
                i64::try_from(v)
                    .map(Dynamic::int)
                    .map_err(|_| E::custom("integer does not fit in a signed 64-bit value"))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::float(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::string(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<Dynamic, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Dynamic::List(items))
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Dynamic, A::Error> {
                let mut map = IndexMap::new();
                while let Some((key, value)) = access.next_entry::<String, Dynamic>()? {
                    map.insert(key, value);
                }
                Ok(Dynamic::Map(map))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

impl Serialize for DynamicNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

impl<'de> Deserialize<'de> for DynamicNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct NumberVisitor;

        impl Visitor<'_> for NumberVisitor {
            type Value = DynamicNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a float")
            }

            fn visit_i64<E: serde::de::Error>(
                self,
                v: i64,
            ) -> std::result::Result<DynamicNumber, E> {
                Ok(DynamicNumber::Int(v))
            }

            fn visit_u64<E: serde::de::Error>(
                self,
                v: u64,
            ) -> std::result::Result<DynamicNumber, E> {
                i64::try_from(v)
                    .map(DynamicNumber::Int)
                    .map_err(|_| E::custom("integer does not fit in a signed 64-bit value"))
            }

            fn visit_f64<E: serde::de::Error>(
                self,
                v: f64,
            ) -> std::result::Result<DynamicNumber, E> {
                Ok(DynamicNumber::Float(v))
            }
        }

        deserializer.deserialize_any(NumberVisitor)
    }
}

impl Serialize for IntOrString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for IntOrString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct IntOrStringVisitor;

        impl Visitor<'_> for IntOrStringVisitor {
            type Value = IntOrString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a string")
            }

            fn visit_i64<E: serde::de::Error>(
                self,
                v: i64,
            ) -> std::result::Result<IntOrString, E> {
                Ok(IntOrString::Int(v))
            }

            fn visit_u64<E: serde::de::Error>(
                self,
                v: u64,
            ) -> std::result::Result<IntOrString, E> {
                i64::try_from(v)
                    .map(IntOrString::Int)
                    .map_err(|_| E::custom("integer does not fit in a signed 64-bit value"))
            }

            fn visit_str<E: serde::de::Error>(
                self,
                v: &str,
            ) -> std::result::Result<IntOrString, E> {
                Ok(IntOrString::String(v.to_string()))
            }
        }

        deserializer.deserialize_any(IntOrStringVisitor)
    }
}
