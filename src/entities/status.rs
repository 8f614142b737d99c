//! entities::status
//!
//! Status values and status history.
//!
//! # Document shapes
//!
//! A status is wrapped: `{version: 2, status: {value, message, data, updated, neverset}}`.
//! A history is a collection: `{version: 1, history: [point, ...]}`.
//!
//! # Never set
//!
//! `neverset` distinguishes a status that was explicitly recorded as empty
//! from one that was never recorded at all. Together with `Option<Status>` on
//! the owner this gives three states: absent, explicitly empty, populated.
//! Version 1 documents predate the flag and import with `never_set = false`.

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::types::UtcTimestamp;
use crate::core::value::{envelope, Map, MapBuilder, Value};

/// Arguments for constructing a [`Status`] or a history point.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusArgs {
    pub value: String,
    pub message: String,
    pub data: Option<Map>,
    pub updated: UtcTimestamp,
    pub never_set: bool,
}

impl StatusArgs {
    /// Arguments for a populated status with no message or data.
    pub fn new(value: impl Into<String>, updated: UtcTimestamp) -> Self {
        Self {
            value: value.into(),
            message: String::new(),
            data: None,
            updated,
            never_set: false,
        }
    }
}

/// A single recorded status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPoint {
    value: String,
    message: String,
    data: Option<Map>,
    updated: UtcTimestamp,
    never_set: bool,
}

impl StatusPoint {
    pub fn new(args: StatusArgs) -> Self {
        Self {
            value: args.value,
            message: args.message,
            data: args.data,
            updated: args.updated,
            never_set: args.never_set,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured data; `None` when it was never set.
    pub fn data(&self) -> Option<&Map> {
        self.data.as_ref()
    }

    pub fn updated(&self) -> UtcTimestamp {
        self.updated
    }

    pub fn never_set(&self) -> bool {
        self.never_set
    }

    fn from_fields(fields: &FieldSet, never_set: bool) -> Result<Self, ImportError> {
        Ok(Self {
            value: fields.str("value"),
            message: fields.str("message"),
            data: fields.opt_map("data"),
            updated: fields
                .required_time("updated")
                .map_err(|e| ImportError::invalid("updated", e))?,
            never_set,
        })
    }

    fn to_value(&self) -> Value {
        MapBuilder::new()
            .field("value", self.value.as_str())
            .str_nonempty("message", &self.message)
            .field_opt("data", self.data.clone())
            .field("updated", self.updated.to_string())
            .field("neverset", self.never_set)
            .build()
    }
}

/// The current status of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Status(StatusPoint);

impl Status {
    pub fn new(args: StatusArgs) -> Self {
        Self(StatusPoint::new(args))
    }

    /// Import a wrapped status document.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] if the document does not match any
    /// supported status version.
    pub fn import(doc: &Value) -> Result<Self, ImportError> {
        STATUS.import_one(doc)
    }

    /// Render at the latest status version.
    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("version", STATUS.latest())
            .field("status", self.0.to_value())
            .build()
    }

    pub fn point(&self) -> &StatusPoint {
        &self.0
    }

    pub fn value(&self) -> &str {
        self.0.value()
    }

    pub fn message(&self) -> &str {
        self.0.message()
    }

    pub fn data(&self) -> Option<&Map> {
        self.0.data()
    }

    pub fn updated(&self) -> UtcTimestamp {
        self.0.updated()
    }

    pub fn never_set(&self) -> bool {
        self.0.never_set()
    }
}

/// An append-only sequence of status points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusHistory {
    points: Vec<StatusPoint>,
}

impl StatusHistory {
    pub fn new(args: Vec<StatusArgs>) -> Self {
        Self {
            points: args.into_iter().map(StatusPoint::new).collect(),
        }
    }

    /// Import a history collection.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] if the envelope or any point is malformed.
    pub fn import(doc: &Value) -> Result<Self, ImportError> {
        Ok(Self {
            points: STATUS_HISTORY.import_collection(doc)?,
        })
    }

    pub fn export(&self) -> Value {
        envelope(
            STATUS_HISTORY.latest(),
            STATUS_HISTORY.key,
            self.points.iter().map(StatusPoint::to_value).collect(),
        )
    }

    pub fn push(&mut self, args: StatusArgs) {
        self.points.push(StatusPoint::new(args));
    }

    pub fn points(&self) -> &[StatusPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

static STATUS_V1: Schema = Schema {
    entity: "status",
    version: 1,
    fields: &[
        Field::required("value", Kind::Str),
        Field::optional("message", Kind::Str),
        Field::optional("data", Kind::Map),
        Field::required("updated", Kind::Time),
    ],
};

static STATUS_V2: Schema = Schema {
    entity: "status",
    version: 2,
    fields: &[
        Field::required("value", Kind::Str),
        Field::optional("message", Kind::Str),
        Field::optional("data", Kind::Map),
        Field::required("updated", Kind::Time),
        Field::optional("neverset", Kind::Bool),
    ],
};

static STATUS_POINT_V1: Schema = Schema {
    entity: "status history point",
    version: 1,
    fields: &[
        Field::required("value", Kind::Str),
        Field::optional("message", Kind::Str),
        Field::optional("data", Kind::Map),
        Field::required("updated", Kind::Time),
        Field::optional("neverset", Kind::Bool),
    ],
};

fn status_v1(fields: FieldSet) -> Result<Status, ImportError> {
    StatusPoint::from_fields(&fields, false).map(Status)
}

fn status_v2(fields: FieldSet) -> Result<Status, ImportError> {
    let never_set = fields.bool("neverset");
    StatusPoint::from_fields(&fields, never_set).map(Status)
}

fn status_point_v1(fields: FieldSet) -> Result<StatusPoint, ImportError> {
    let never_set = fields.bool("neverset");
    StatusPoint::from_fields(&fields, never_set)
}

/// Status document versions.
pub static STATUS: VersionTable<Status> = VersionTable {
    label: "status",
    plural: "status",
    key: "status",
    shape: Shape::Wrapped,
    envelope: &[
        Field::required("version", Kind::Int),
        Field::required("status", Kind::Map),
    ],
    versions: &[
        Importer {
            schema: &STATUS_V1,
            build: status_v1,
        },
        Importer {
            schema: &STATUS_V2,
            build: status_v2,
        },
    ],
};

/// Status history document versions.
pub static STATUS_HISTORY: VersionTable<StatusPoint> = VersionTable {
    label: "status history point",
    plural: "status history",
    key: "history",
    shape: Shape::Collection,
    envelope: &[
        Field::required("version", Kind::Int),
        Field::required("history", Kind::List(&Kind::Map)),
    ],
    versions: &[Importer {
        schema: &STATUS_POINT_V1,
        build: status_point_v1,
    }],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn updated() -> UtcTimestamp {
        UtcTimestamp::parse("2016-01-28T11:50:00Z").unwrap()
    }

    fn full_args() -> StatusArgs {
        StatusArgs {
            value: "running".into(),
            message: "monkey & bear".into(),
            data: Some(
                [("after".to_string(), Value::from("the curtain"))]
                    .into_iter()
                    .collect(),
            ),
            updated: updated(),
            never_set: false,
        }
    }

    mod status {
        use super::*;

        #[test]
        fn tables_are_contiguous() {
            assert!(STATUS.is_contiguous());
            assert!(STATUS_HISTORY.is_contiguous());
        }

        #[test]
        fn minimal_export_shape() {
            let status = Status::new(StatusArgs::new("running", updated()));
            assert_eq!(
                status.export(),
                Value::from(json!({
                    "version": 2,
                    "status": {
                        "value": "running",
                        "updated": "2016-01-28T11:50:00Z",
                        "neverset": false
                    }
                }))
            );
        }

        #[test]
        fn full_round_trip() {
            let status = Status::new(full_args());
            let imported = Status::import(&status.export()).unwrap();
            assert_eq!(imported, status);
            assert_eq!(imported.message(), "monkey & bear");
            assert_eq!(
                imported.data().and_then(|d| d.get("after")),
                Some(&Value::from("the curtain"))
            );
        }

        #[test]
        fn empty_data_is_distinct_from_unset() {
            let mut args = StatusArgs::new("idle", updated());
            args.data = Some(Map::new());
            let status = Status::new(args);
            let exported = status.export();
            assert!(exported
                .get("status")
                .and_then(|s| s.get("data"))
                .is_some());
            assert_eq!(Status::import(&exported).unwrap().data(), Some(&Map::new()));
        }

        #[test]
        fn never_set_round_trips() {
            let mut args = StatusArgs::new("", updated());
            args.never_set = true;
            let status = Status::new(args);
            assert!(Status::import(&status.export()).unwrap().never_set());
        }

        #[test]
        fn version_one_ignores_never_set() {
            let doc = Value::from(json!({
                "version": 1,
                "status": {"value": "", "updated": "2016-01-28T11:50:00Z", "neverset": true}
            }));
            assert!(!Status::import(&doc).unwrap().never_set());
        }

        #[test]
        fn missing_value() {
            let doc = Value::from(json!({
                "version": 2,
                "status": {"updated": "2016-01-28T11:50:00Z"}
            }));
            assert_eq!(
                Status::import(&doc).unwrap_err().to_string(),
                "status v2 schema check failed: value: expected string, got nothing"
            );
        }

        #[test]
        fn missing_body() {
            let doc = Value::from(json!({"version": 2}));
            assert_eq!(
                Status::import(&doc).unwrap_err().to_string(),
                "status version schema check failed: status: expected map, got nothing"
            );
        }
    }

    mod status_history {
        use super::*;

        #[test]
        fn empty_export_shape() {
            assert_eq!(
                StatusHistory::default().export(),
                Value::from(json!({"version": 1, "history": []}))
            );
        }

        #[test]
        fn round_trip_preserves_order() {
            let mut second = full_args();
            second.value = "blocked".into();
            let history = StatusHistory::new(vec![full_args(), second]);
            let imported = StatusHistory::import(&history.export()).unwrap();
            assert_eq!(imported, history);
            assert_eq!(imported.points()[1].value(), "blocked");
        }

        #[test]
        fn push_appends() {
            let mut history = StatusHistory::default();
            assert!(history.is_empty());
            history.push(StatusArgs::new("a", updated()));
            history.push(StatusArgs::new("b", updated()));
            let values: Vec<_> = history.points().iter().map(StatusPoint::value).collect();
            assert_eq!(values, vec!["a", "b"]);
        }

        #[test]
        fn bad_point() {
            let doc = Value::from(json!({
                "version": 1,
                "history": [{"value": "x", "updated": "never"}]
            }));
            assert_eq!(
                StatusHistory::import(&doc).unwrap_err().to_string(),
                "status history point 0 v1 schema check failed: updated: expected time, got string(\"never\")"
            );
        }
    }
}
