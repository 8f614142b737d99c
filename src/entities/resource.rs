//! entities::resource
//!
//! Charm resources in use by a unit. Each resource carries the revision the
//! unit last saw as a nested record.

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::types::UtcTimestamp;
use crate::core::value::{envelope, MapBuilder, Value};

/// Arguments for constructing a [`ResourceRevision`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRevisionArgs {
    pub revision: i64,
    pub resource_type: String,
    pub path: String,
    pub description: String,
    pub origin: String,
    pub fingerprint: String,
    pub size: i64,
    pub timestamp: Option<UtcTimestamp>,
    pub username: String,
}

/// One revision of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRevision {
    revision: i64,
    resource_type: String,
    path: String,
    description: String,
    origin: String,
    fingerprint: String,
    size: i64,
    timestamp: Option<UtcTimestamp>,
    username: String,
}

impl ResourceRevision {
    pub fn new(args: ResourceRevisionArgs) -> Self {
        Self {
            revision: args.revision,
            resource_type: args.resource_type,
            path: args.path,
            description: args.description,
            origin: args.origin,
            fingerprint: args.fingerprint,
            size: args.size,
            timestamp: args.timestamp,
            username: args.username,
        }
    }

    fn from_fields(fields: &FieldSet) -> Self {
        Self {
            revision: fields.int("revision"),
            resource_type: fields.str("type"),
            path: fields.str("path"),
            description: fields.str("description"),
            origin: fields.str("origin"),
            fingerprint: fields.str("fingerprint"),
            size: fields.int("size"),
            timestamp: fields.time("timestamp"),
            username: fields.str("username"),
        }
    }

    fn to_value(&self) -> Value {
        MapBuilder::new()
            .field("revision", self.revision)
            .field("type", self.resource_type.as_str())
            .field("path", self.path.as_str())
            .field("description", self.description.as_str())
            .field("origin", self.origin.as_str())
            .field("fingerprint", self.fingerprint.as_str())
            .field("size", self.size)
            .field_opt("timestamp", self.timestamp.map(|t| t.to_string()))
            .str_nonempty("username", &self.username)
            .build()
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// When the revision was uploaded, if known.
    pub fn timestamp(&self) -> Option<UtcTimestamp> {
        self.timestamp
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Arguments for constructing a [`UnitResource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitResourceArgs {
    pub name: String,
    pub revision: ResourceRevisionArgs,
}

/// A resource as seen by one unit, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitResource {
    name: String,
    revision: ResourceRevision,
}

impl UnitResource {
    pub fn new(args: UnitResourceArgs) -> Self {
        Self {
            name: args.name,
            revision: ResourceRevision::new(args.revision),
        }
    }

    /// Import a `resources` collection.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] describing the first malformed resource.
    pub fn import_all(doc: &Value) -> Result<Vec<Self>, ImportError> {
        RESOURCES.import_collection(doc)
    }

    pub fn export_all(resources: &[UnitResource]) -> Value {
        envelope(
            RESOURCES.latest(),
            RESOURCES.key,
            resources.iter().map(UnitResource::export).collect(),
        )
    }

    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("name", self.name.as_str())
            .field("revision", self.revision.to_value())
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn revision(&self) -> &ResourceRevision {
        &self.revision
    }
}

static RESOURCE_REVISION_V1: Schema = Schema {
    entity: "resource revision",
    version: 1,
    fields: &[
        Field::required("revision", Kind::Int),
        Field::optional("type", Kind::Str),
        Field::optional("path", Kind::Str),
        Field::optional("description", Kind::Str),
        Field::optional("origin", Kind::Str),
        Field::optional("fingerprint", Kind::Str),
        Field::optional("size", Kind::Int),
        Field::optional("timestamp", Kind::Time),
        Field::optional("username", Kind::Str),
    ],
};

static UNIT_RESOURCE_V1: Schema = Schema {
    entity: "resource",
    version: 1,
    fields: &[
        Field::required("name", Kind::Str),
        Field::required("revision", Kind::Record(&RESOURCE_REVISION_V1)),
    ],
};

fn unit_resource_v1(fields: FieldSet) -> Result<UnitResource, ImportError> {
    Ok(UnitResource {
        name: fields.str("name"),
        revision: ResourceRevision::from_fields(&fields.record("revision", &RESOURCE_REVISION_V1)),
    })
}

/// Unit resource collection versions.
pub static RESOURCES: VersionTable<UnitResource> = VersionTable {
    label: "resource",
    plural: "resources",
    key: "resources",
    shape: Shape::Collection,
    envelope: &[
        Field::required("version", Kind::Int),
        Field::required("resources", Kind::List(&Kind::Map)),
    ],
    versions: &[Importer {
        schema: &UNIT_RESOURCE_V1,
        build: unit_resource_v1,
    }],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full() -> UnitResource {
        UnitResource::new(UnitResourceArgs {
            name: "blob".into(),
            revision: ResourceRevisionArgs {
                revision: 7,
                resource_type: "file".into(),
                path: "blob.tgz".into(),
                description: "a blob".into(),
                origin: "store".into(),
                fingerprint: "aaaa".into(),
                size: 1024,
                timestamp: Some(UtcTimestamp::parse("2016-10-18T02:03:04Z").unwrap()),
                username: "fred".into(),
            },
        })
    }

    #[test]
    fn full_round_trip() {
        let resources = vec![full()];
        let imported = UnitResource::import_all(&UnitResource::export_all(&resources)).unwrap();
        assert_eq!(imported, resources);
    }

    #[test]
    fn optional_revision_fields_omitted() {
        let resource = UnitResource::new(UnitResourceArgs {
            name: "foo".into(),
            revision: ResourceRevisionArgs {
                revision: 3,
                ..Default::default()
            },
        });
        let revision = resource.export();
        let revision = revision.get("revision").unwrap();
        assert!(revision.get("timestamp").is_none());
        assert!(revision.get("username").is_none());
        assert_eq!(revision.get("revision"), Some(&Value::from(3)));
    }

    #[test]
    fn nested_path_in_error() {
        let doc = Value::from(json!({
            "version": 1,
            "resources": [{"name": "foo", "revision": {"revision": "three"}}]
        }));
        assert_eq!(
            UnitResource::import_all(&doc).unwrap_err().to_string(),
            "resource 0 v1 schema check failed: revision.revision: expected int, got string(\"three\")"
        );
    }

    #[test]
    fn revision_read_from_checked_record() {
        let doc = Value::from(json!({
            "version": 1,
            "resources": [{
                "name": "foo",
                "revision": {"revision": 2, "size": 10, "username": "fred", "unknown": true}
            }]
        }));
        let imported = UnitResource::import_all(&doc).unwrap();
        let revision = imported[0].revision();
        assert_eq!(revision.revision(), 2);
        assert_eq!(revision.size(), 10);
        assert_eq!(revision.username(), "fred");
        assert!(revision.timestamp().is_none());
    }

    #[test]
    fn bad_revision_timestamp_fails_at_element() {
        let doc = Value::from(json!({
            "version": 1,
            "resources": [{"name": "foo", "revision": {"revision": 1, "timestamp": "soon"}}]
        }));
        assert_eq!(
            UnitResource::import_all(&doc).unwrap_err().to_string(),
            "resource 0 v1 schema check failed: revision.timestamp: expected time, got string(\"soon\")"
        );
    }
}
