//! entities::payload
//!
//! Workload processes tracked for a unit.

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::value::{envelope, MapBuilder, Value};

/// Arguments for constructing a [`Payload`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadArgs {
    pub name: String,
    pub payload_type: String,
    pub raw_id: String,
    pub state: String,
    pub labels: Vec<String>,
}

/// A payload, keyed by name within its unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    name: String,
    payload_type: String,
    raw_id: String,
    state: String,
    labels: Vec<String>,
}

impl Payload {
    pub fn new(args: PayloadArgs) -> Self {
        Self {
            name: args.name,
            payload_type: args.payload_type,
            raw_id: args.raw_id,
            state: args.state,
            labels: args.labels,
        }
    }

    /// Import a `payloads` collection.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] describing the first malformed payload.
    pub fn import_all(doc: &Value) -> Result<Vec<Self>, ImportError> {
        PAYLOADS.import_collection(doc)
    }

    pub fn export_all(payloads: &[Payload]) -> Value {
        envelope(
            PAYLOADS.latest(),
            PAYLOADS.key,
            payloads.iter().map(Payload::export).collect(),
        )
    }

    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("name", self.name.as_str())
            .field("type", self.payload_type.as_str())
            .field("raw-id", self.raw_id.as_str())
            .field("state", self.state.as_str())
            .list_nonempty("labels", &self.labels)
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    /// The identifier assigned by the payload's own technology.
    pub fn raw_id(&self) -> &str {
        &self.raw_id
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

static PAYLOAD_V1: Schema = Schema {
    entity: "payload",
    version: 1,
    fields: &[
        Field::required("name", Kind::Str),
        Field::required("type", Kind::Str),
        Field::required("raw-id", Kind::Str),
        Field::required("state", Kind::Str),
        Field::optional("labels", Kind::List(&Kind::Str)),
    ],
};

fn payload_v1(fields: FieldSet) -> Result<Payload, ImportError> {
    Ok(Payload::new(PayloadArgs {
        name: fields.str("name"),
        payload_type: fields.str("type"),
        raw_id: fields.str("raw-id"),
        state: fields.str("state"),
        labels: fields.strings("labels"),
    }))
}

/// Payload collection versions.
pub static PAYLOADS: VersionTable<Payload> = VersionTable {
    label: "payload",
    plural: "payloads",
    key: "payloads",
    shape: Shape::Collection,
    envelope: &[
        Field::required("version", Kind::Int),
        Field::required("payloads", Kind::List(&Kind::Map)),
    ],
    versions: &[Importer {
        schema: &PAYLOAD_V1,
        build: payload_v1,
    }],
};
