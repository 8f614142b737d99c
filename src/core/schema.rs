//! core::schema
//!
//! Declarative field schemas and the structural checker.
//!
//! # Schema Design
//!
//! A [`Schema`] is a `'static` table naming an entity, the document version it
//! describes, and its fields. Each [`Field`] is required or optional and has a
//! [`Kind`]. Schemas never change after compilation, so they are freely shared
//! between threads.
//!
//! # Checking
//!
//! [`Schema::check`] walks a [`Value`] against the table:
//! - Unknown fields are ignored (forward compatible)
//! - Missing required fields fail with `got nothing`
//! - Type mismatches report both expected and actual kinds
//! - Nested records and list elements extend the error path
//!   (`revision.size`, `remote-applications[0]`)
//!
//! On success the checker returns a [`FieldSet`] holding only the declared
//! fields, already coerced.
//!
//! # Example
//!
//! ```
//! use model_description::core::schema::{Field, Kind, Schema};
//! use model_description::core::value::Value;
//!
//! static PET: Schema = Schema {
//!     entity: "pet",
//!     version: 1,
//!     fields: &[
//!         Field::required("name", Kind::Str),
//!         Field::optional("legs", Kind::Int),
//!     ],
//! };
//!
//! let ok = PET.check(&Value::from(serde_json::json!({"name": "rex"}))).unwrap();
//! assert_eq!(ok.str("name"), "rex");
//! assert_eq!(ok.int("legs"), 0);
//!
//! let err = PET.check(&Value::from(serde_json::json!({"name": 7}))).unwrap_err();
//! assert_eq!(err.to_string(), "name: expected string, got int(7)");
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use super::types::{TypeError, UtcTimestamp};
use super::value::{Map, Value};

/// A structural mismatch at a specific document path.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}expected {expected}, got {got}", path_prefix(.path))]
pub struct SchemaError {
    /// Dotted path to the offending field; empty at the document root.
    pub path: String,
    /// Rendering of the expected kind.
    pub expected: String,
    /// Rendering of what was found (`nothing` when absent).
    pub got: String,
}

impl SchemaError {
    fn new(path: &str, expected: impl Into<String>, got: Option<&Value>) -> Self {
        Self {
            path: path.to_string(),
            expected: expected.into(),
            got: got.map_or_else(|| "nothing".to_string(), Value::describe),
        }
    }
}

fn path_prefix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{path}: ")
    }
}

/// The expected shape of a field value.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    Bool,
    Int,
    Str,
    /// An RFC3339 timestamp string.
    Time,
    /// A string restricted to the given literals.
    Enum(&'static [&'static str]),
    /// A string-keyed map with values of any kind.
    Map,
    /// A string-keyed map with string values.
    StringMap,
    /// A list whose elements all have the given kind.
    List(&'static Kind),
    /// A map satisfying another schema.
    Record(&'static Schema),
}

impl Kind {
    fn name(&self) -> String {
        match self {
            Kind::Bool => "bool".to_string(),
            Kind::Int => "int".to_string(),
            Kind::Str => "string".to_string(),
            Kind::Time => "time".to_string(),
            Kind::Enum(options) => format!("one of {}", options.join(", ")),
            Kind::Map | Kind::StringMap | Kind::Record(_) => "map".to_string(),
            Kind::List(_) => "list".to_string(),
        }
    }

    /// Check `value` at `path`, returning the coerced value.
    fn coerce(&self, path: &str, value: Option<&Value>) -> Result<Value, SchemaError> {
        let mismatch = || SchemaError::new(path, self.name(), value);
        let value = match value {
            Some(v) if !v.is_null() => v,
            _ => return Err(mismatch()),
        };

        match self {
            Kind::Bool => value.as_bool().map(Value::Bool).ok_or_else(mismatch),
            Kind::Int => value.as_int().map(Value::Int).ok_or_else(mismatch),
            Kind::Str => value.as_str().map(Value::from).ok_or_else(mismatch),
            Kind::Time => match value.as_str() {
                Some(s) if UtcTimestamp::parse(s).is_ok() => Ok(value.clone()),
                _ => Err(mismatch()),
            },
            Kind::Enum(options) => match value.as_str() {
                Some(s) if options.contains(&s) => Ok(value.clone()),
                _ => Err(mismatch()),
            },
            Kind::Map => value.as_map().map(|m| Value::Map(m.clone())).ok_or_else(mismatch),
            Kind::StringMap => {
                let map = value.as_map().ok_or_else(mismatch)?;
                let mut out = Map::new();
                for (key, item) in map {
                    let item = Kind::Str.coerce(&join(path, key), Some(item))?;
                    out.insert(key.clone(), item);
                }
                Ok(Value::Map(out))
            }
            Kind::List(element) => {
                let items = value.as_list().ok_or_else(mismatch)?;
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    out.push(element.coerce(&format!("{path}[{index}]"), Some(item))?);
                }
                Ok(Value::List(out))
            }
            Kind::Record(schema) => {
                let fields = schema.check_at(path, value)?;
                Ok(Value::Map(fields.into_map()))
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// A single declared field.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// An immutable schema identified by (entity, version).
#[derive(Debug)]
pub struct Schema {
    pub entity: &'static str,
    pub version: u32,
    pub fields: &'static [Field],
}

impl Schema {
    /// Check a document against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, in declaration order.
    pub fn check(&self, value: &Value) -> Result<FieldSet, SchemaError> {
        self.check_at("", value)
    }

    fn check_at(&self, path: &str, value: &Value) -> Result<FieldSet, SchemaError> {
        let map = value
            .as_map()
            .ok_or_else(|| SchemaError::new(path, "map", Some(value)))?;

        let mut fields = BTreeMap::new();
        for field in self.fields {
            let found = map.get(field.name).filter(|v| !v.is_null());
            if found.is_none() && !field.required {
                continue;
            }
            let coerced = field.kind.coerce(&join(path, field.name), found)?;
            fields.insert(field.name, coerced);
        }
        Ok(FieldSet { fields })
    }
}

/// The checked, coerced fields of a document.
///
/// Accessors return the zero value for absent optional fields. Because the
/// set was produced by a schema check, a present field always has the
/// declared kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: BTreeMap<&'static str, Value>,
}

impl FieldSet {
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn str(&self, name: &str) -> String {
        self.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    pub fn opt_str(&self, name: &str) -> Option<String> {
        self.get(name).and_then(Value::as_str).map(str::to_string)
    }

    pub fn bool(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or_default()
    }

    pub fn int(&self, name: &str) -> i64 {
        self.get(name).and_then(Value::as_int).unwrap_or_default()
    }

    pub fn opt_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    /// An optional timestamp; `None` when absent.
    pub fn time(&self, name: &str) -> Option<UtcTimestamp> {
        self.get(name)
            .and_then(Value::as_str)
            .and_then(|s| UtcTimestamp::parse(s).ok())
    }

    /// A timestamp that must be present.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTimestamp` if the field is absent.
    pub fn required_time(&self, name: &str) -> Result<UtcTimestamp, TypeError> {
        UtcTimestamp::parse(&self.str(name))
    }

    /// A list of strings; empty when absent.
    pub fn strings(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(Value::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A string-to-string map; empty when absent.
    pub fn string_map(&self, name: &str) -> BTreeMap<String, String> {
        self.get(name)
            .and_then(Value::as_map)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The fields of a `Kind::Record(schema)` field, already checked and
    /// coerced by [`Schema::check`]; empty when absent.
    pub fn record(&self, name: &str, schema: &'static Schema) -> FieldSet {
        let fields = self
            .get(name)
            .and_then(Value::as_map)
            .map(|map| {
                schema
                    .fields
                    .iter()
                    .filter_map(|f| map.get(f.name).map(|v| (f.name, v.clone())))
                    .collect()
            })
            .unwrap_or_default();
        FieldSet { fields }
    }

    /// A map of arbitrary values; `None` when absent.
    pub fn opt_map(&self, name: &str) -> Option<Map> {
        self.get(name).and_then(Value::as_map).cloned()
    }

    fn into_map(self) -> Map {
        self.fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}
