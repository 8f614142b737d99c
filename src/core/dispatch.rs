//! core::dispatch
//!
//! Version dispatch for versioned documents.
//!
//! # Shapes
//!
//! Every entity kind is described by one [`VersionTable`]. Documents come in
//! three shapes:
//!
//! - [`Shape::Collection`]: `{version: N, <key>: [element, ...]}`
//! - [`Shape::Wrapped`]: `{version: N, <key>: {...}}`
//! - [`Shape::Inline`]: `{version: N, ...fields}`
//!
//! The `version` selects one [`Importer`]: a schema plus a pure build
//! function. Every importer of a table yields the same canonical type; older
//! versions fill in defaults for fields they predate.
//!
//! # Errors
//!
//! Failures carry two tiers of context so a single bad element can be found
//! without losing the enclosing collection:
//!
//! ```text
//! remote applications version schema check failed: remote-applications[0]: expected map, got int(1234)
//! remote application 0 v1 schema check failed: is-consumer-proxy: expected bool, got string("blah")
//! remote application 0: remote endpoints version schema check failed: endpoints: expected list, got nothing
//! ```
//!
//! # Invariants
//!
//! - Tables are `'static` and immutable; there is no runtime registration
//! - `versions[i]` handles version `i + 1`

use thiserror::Error;
use tracing::debug;

use super::schema::{Field, FieldSet, Schema, SchemaError};
use super::types::TypeError;
use super::value::Value;

/// Errors from importing a document.
#[derive(Debug, Error, PartialEq)]
pub enum ImportError {
    /// The envelope (`version` plus payload key) is malformed.
    #[error("{label} version schema check failed: {source}")]
    Envelope {
        label: &'static str,
        source: SchemaError,
    },

    /// One element of a collection failed its versioned schema.
    #[error("{label} {index} v{version} schema check failed: {source}")]
    Element {
        label: &'static str,
        index: usize,
        version: u32,
        source: SchemaError,
    },

    /// A single wrapped or inline document failed its versioned schema.
    #[error("{label} v{version} schema check failed: {source}")]
    Schema {
        label: &'static str,
        version: u32,
        source: SchemaError,
    },

    /// No importer is registered for the declared version.
    #[error("{label} version {version} not valid")]
    UnknownVersion { label: &'static str, version: i64 },

    /// Building element `index` failed further down.
    #[error("{label} {index}: {source}")]
    Nested {
        label: &'static str,
        index: usize,
        source: Box<ImportError>,
    },

    /// Importing the named sub-document failed.
    #[error("{field}: {source}")]
    Field {
        field: &'static str,
        source: Box<ImportError>,
    },

    /// A field had the right kind but an invalid value.
    #[error("{field}: {source}")]
    InvalidValue {
        field: &'static str,
        source: TypeError,
    },
}

impl ImportError {
    /// Attach the name of the field whose sub-document failed.
    pub fn in_field(self, field: &'static str) -> Self {
        ImportError::Field {
            field,
            source: Box::new(self),
        }
    }

    /// Wrap an identity parsing failure for `field`.
    pub fn invalid(field: &'static str, source: TypeError) -> Self {
        ImportError::InvalidValue { field, source }
    }
}

/// Signature of a per-version build function.
pub type BuildFn<T> = fn(FieldSet) -> Result<T, ImportError>;

/// The importer for one version of an entity kind.
pub struct Importer<T: 'static> {
    pub schema: &'static Schema,
    pub build: BuildFn<T>,
}

/// Where the versioned payload lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Collection,
    Wrapped,
    Inline,
}

/// The immutable (entity kind, version) -> importer table.
pub struct VersionTable<T: 'static> {
    /// Singular label used in element errors ("remote application").
    pub label: &'static str,
    /// Label used in envelope errors ("remote applications").
    pub plural: &'static str,
    /// Payload key; unused for [`Shape::Inline`].
    pub key: &'static str,
    pub shape: Shape,
    /// Fields of the envelope itself.
    pub envelope: &'static [Field],
    pub versions: &'static [Importer<T>],
}

impl<T: 'static> VersionTable<T> {
    /// The version written by exporters.
    pub fn latest(&self) -> u32 {
        self.versions.len() as u32
    }

    /// Whether `versions[i]` declares version `i + 1` for every entry.
    pub fn is_contiguous(&self) -> bool {
        self.versions
            .iter()
            .enumerate()
            .all(|(i, importer)| importer.schema.version as usize == i + 1)
    }

    /// Select the importer for `version`.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::UnknownVersion` if no importer is registered.
    pub fn importer(&self, version: i64) -> Result<&Importer<T>, ImportError> {
        usize::try_from(version)
            .ok()
            .and_then(|v| v.checked_sub(1))
            .and_then(|i| self.versions.get(i))
            .ok_or(ImportError::UnknownVersion {
                label: self.plural,
                version,
            })
    }

    fn open_envelope(&self, doc: &Value) -> Result<(u32, &Importer<T>), ImportError> {
        let schema = Schema {
            entity: self.plural,
            version: 0,
            fields: self.envelope,
        };
        let fields = schema.check(doc).map_err(|source| ImportError::Envelope {
            label: self.plural,
            source,
        })?;
        let version = fields.int("version");
        let importer = self.importer(version)?;
        Ok((importer.schema.version, importer))
    }

    /// Import every element of a collection envelope.
    ///
    /// Elements are imported independently and in order; the first failure
    /// aborts the whole collection.
    ///
    /// # Errors
    ///
    /// Returns an envelope, version, element schema or nested error.
    pub fn import_collection(&self, doc: &Value) -> Result<Vec<T>, ImportError> {
        let (version, importer) = self.open_envelope(doc)?;
        let items = doc.get(self.key).and_then(Value::as_list).unwrap_or_default();
        debug!(
            collection = self.plural,
            version,
            count = items.len(),
            "importing collection"
        );

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let fields = importer
                    .schema
                    .check(item)
                    .map_err(|source| ImportError::Element {
                        label: self.label,
                        index,
                        version,
                        source,
                    })?;
                (importer.build)(fields).map_err(|source| ImportError::Nested {
                    label: self.label,
                    index,
                    source: Box::new(source),
                })
            })
            .collect()
    }

    /// Import a wrapped or inline document.
    ///
    /// # Errors
    ///
    /// Returns an envelope, version, schema or build error.
    pub fn import_one(&self, doc: &Value) -> Result<T, ImportError> {
        let (version, importer) = self.open_envelope(doc)?;
        let body = match self.shape {
            Shape::Wrapped => doc.get(self.key).unwrap_or(&Value::Null),
            Shape::Collection | Shape::Inline => doc,
        };
        let fields = importer
            .schema
            .check(body)
            .map_err(|source| ImportError::Schema {
                label: self.label,
                version,
                source,
            })?;
        (importer.build)(fields)
    }
}
