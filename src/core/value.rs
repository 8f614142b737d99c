//! core::value
//!
//! The universal document representation.
//!
//! Every import and export in this crate is expressed in terms of [`Value`].
//! Bytes never reach the engine: callers decode YAML/JSON/whatever with a
//! serde codec straight into a `Value` (it implements `Deserialize`) and
//! encode the result of an export the same way.
//!
//! # Kinds
//!
//! | variant | kind name |
//! |---------|-----------|
//! | `Null` | `nothing` |
//! | `Bool` | `bool` |
//! | `Int` | `int` |
//! | `Float` | `float` |
//! | `String` | `string` |
//! | `List` | `list` |
//! | `Map` | `map` |
//!
//! Maps are `BTreeMap`s so exported documents have a deterministic key order.
//!
//! # Example
//!
//! ```
//! use model_description::core::value::Value;
//!
//! let doc = Value::from(serde_json::json!({"version": 1, "units": []}));
//! assert_eq!(doc.get("version").and_then(Value::as_int), Some(1));
//! assert_eq!(Value::from(1234).describe(), "int(1234)");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use sha2::{Digest, Sha256};

/// A string-keyed, ordered mapping of values.
pub type Map = BTreeMap<String, Value>;

/// A dynamically typed document node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// The kind name used in schema error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "nothing",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Render the kind, plus the literal for scalars.
    ///
    /// ```
    /// use model_description::core::value::Value;
    ///
    /// assert_eq!(Value::from("blah").describe(), r#"string("blah")"#);
    /// assert_eq!(Value::Null.describe(), "nothing");
    /// assert_eq!(Value::List(vec![]).describe(), "list");
    /// ```
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "nothing".to_string(),
            Value::Bool(b) => format!("bool({b})"),
            Value::Int(i) => format!("int({i})"),
            Value::Float(f) => format!("float({f})"),
            Value::String(s) => format!("string({s:?})"),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "map".to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Mutable lookup of a key when this value is a map.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Map(map) => map.get_mut(key),
            _ => None,
        }
    }

    /// SHA-256 over the canonical JSON rendering of this value.
    ///
    /// Two values with equal content always produce the same digest, because
    /// map keys are already ordered.
    ///
    /// ```
    /// use model_description::core::value::Value;
    ///
    /// let a = Value::from(serde_json::json!({"b": 1, "a": [true, "x"]}));
    /// let b = Value::from(serde_json::json!({"a": [true, "x"], "b": 1}));
    /// assert_eq!(a.digest(), b.digest());
    /// assert_eq!(a.digest().len(), 64);
    /// ```
    pub fn digest(&self) -> String {
        let canonical = serde_json::Value::from(self.clone()).to_string();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::from(self.clone()))
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
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<&[String]> for Value {
    fn from(items: &[String]) -> Self {
        Value::List(items.iter().map(|s| Value::from(s.as_str())).collect())
    }
}

impl From<&BTreeMap<String, String>> for Value {
    fn from(map: &BTreeMap<String, String>) -> Self {
        Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            // Non-finite floats have no JSON form.
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(map) => {
                serde_json::Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a document value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<Value, E> {
        Ok(Value::Int(i))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<Value, E> {
        match i64::try_from(u) {
            Ok(i) => Ok(Value::Int(i)),
            Err(_) => Ok(Value::Float(u as f64)),
        }
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<Value, E> {
        Ok(Value::Float(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Incremental builder for exported maps.
///
/// Exporters use the `*_nonempty` helpers to leave out optional fields that
/// hold their zero value.
#[derive(Debug, Default)]
pub struct MapBuilder(Map);

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always emit the field.
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Emit the field when `value` is `Some`.
    pub fn field_opt(mut self, key: &str, value: Option<impl Into<Value>>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), value.into());
        }
        self
    }

    /// Emit a string field unless it is empty.
    pub fn str_nonempty(self, key: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.field(key, value)
        }
    }

    /// Emit an integer field unless it is zero.
    pub fn int_nonzero(self, key: &str, value: i64) -> Self {
        if value == 0 {
            self
        } else {
            self.field(key, value)
        }
    }

    /// Emit a string list unless it is empty.
    pub fn list_nonempty(self, key: &str, items: &[String]) -> Self {
        if items.is_empty() {
            self
        } else {
            self.field(key, items)
        }
    }

    /// Emit a string map unless it is empty.
    pub fn string_map_nonempty(self, key: &str, map: &BTreeMap<String, String>) -> Self {
        if map.is_empty() {
            self
        } else {
            self.field(key, map)
        }
    }

    pub fn build(self) -> Value {
        Value::Map(self.0)
    }
}

/// Render a versioned collection envelope: `{version, <key>: [items]}`.
pub fn envelope(version: u32, key: &str, items: Vec<Value>) -> Value {
    MapBuilder::new()
        .field("version", version)
        .field(key, items)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod describe {
        use super::*;

        #[test]
        fn scalars_include_literal() {
            assert_eq!(Value::from(true).describe(), "bool(true)");
            assert_eq!(Value::from(1234).describe(), "int(1234)");
            assert_eq!(Value::from(1.5).describe(), "float(1.5)");
            assert_eq!(Value::from("blah").describe(), "string(\"blah\")");
        }

        #[test]
        fn compound_kinds_are_bare() {
            assert_eq!(Value::List(vec![Value::Null]).describe(), "list");
            assert_eq!(Value::Map(Map::new()).describe(), "map");
        }

        #[test]
        fn null_is_nothing() {
            assert_eq!(Value::Null.describe(), "nothing");
            assert_eq!(Value::Null.kind(), "nothing");
        }
    }

    mod json_bridge {
        use super::*;

        #[test]
        fn ints_and_floats_stay_distinct() {
            let value = Value::from(json!({"i": 3, "f": 3.5}));
            assert_eq!(value.get("i"), Some(&Value::Int(3)));
            assert_eq!(value.get("f"), Some(&Value::Float(3.5)));
        }

        #[test]
        fn deserialize_matches_from() {
            let text = r#"{"version": 1, "items": [1, "two", null, {"x": false}]}"#;
            let parsed: Value = serde_json::from_str(text).unwrap();
            let converted = Value::from(serde_json::from_str::<serde_json::Value>(text).unwrap());
            assert_eq!(parsed, converted);
        }

        #[test]
        fn serialize_is_canonical() {
            let value = Value::from(json!({"b": 2, "a": 1}));
            assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"a":1,"b":2}"#);
        }
    }

    mod builder {
        use super::*;

        #[test]
        fn nonempty_helpers_skip_zero_values() {
            let value = MapBuilder::new()
                .str_nonempty("empty", "")
                .str_nonempty("full", "x")
                .int_nonzero("zero", 0)
                .list_nonempty("none", &[])
                .string_map_nonempty("nomap", &BTreeMap::new())
                .field_opt("absent", None::<Value>)
                .build();
            assert_eq!(value, Value::from(json!({"full": "x"})));
        }

        #[test]
        fn envelope_shape() {
            let value = envelope(3, "things", vec![Value::from(1)]);
            assert_eq!(value, Value::from(json!({"version": 3, "things": [1]})));
        }
    }

    #[test]
    fn digest_differs_for_different_content() {
        let a = Value::from(json!({"a": 1}));
        let b = Value::from(json!({"a": 2}));
        assert_ne!(a.digest(), b.digest());
    }
}
