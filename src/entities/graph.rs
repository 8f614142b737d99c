//! entities::graph
//!
//! The root container for decoded entities.
//!
//! # Document shape
//!
//! ```text
//! {
//!   remote-applications: {version, remote-applications: [...]},
//!   units: {version, units: [...]},
//! }
//! ```
//!
//! Both collections are optional on import and always present on export.
//!
//! # References
//!
//! Units refer to each other by tag. The graph owns every unit, so it is the
//! only place those references can be resolved: see [`EntityGraph::unit`]
//! and [`EntityGraph::dangling_references`]. Whether a dangling reference
//! matters is decided by [`Config::reference_policy`].
//!
//! # Example
//!
//! ```
//! use model_description::entities::graph::EntityGraph;
//! use model_description::core::value::Value;
//!
//! let graph = EntityGraph::import(&Value::from(serde_json::json!({}))).unwrap();
//! assert!(graph.units().is_empty());
//!
//! let doc = graph.export();
//! assert!(doc.get("units").is_some());
//! assert!(doc.get("remote-applications").is_some());
//! ```

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::{Config, ReferencePolicy};
use crate::core::dispatch::ImportError;
use crate::core::schema::{Field, Kind, Schema, SchemaError};
use crate::core::types::UnitTag;
use crate::core::value::{MapBuilder, Value};
use crate::core::verify::{Validate, ValidationError};

use super::remote_application::{RemoteApplication, RemoteApplicationArgs};
use super::unit::{Unit, UnitArgs};

/// Errors from graph-level operations.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("entity graph schema check failed: {0}")]
    Schema(SchemaError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

static ENTITY_GRAPH: Schema = Schema {
    entity: "entity graph",
    version: 1,
    fields: &[
        Field::optional("remote-applications", Kind::Map),
        Field::optional("units", Kind::Map),
    ],
};

/// Every decoded entity, owned in a tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityGraph {
    remote_applications: Vec<RemoteApplication>,
    units: Vec<Unit>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a graph document without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Schema`] if the document is not a map of
    /// collections, or [`GraphError::Import`] for the first malformed entity.
    pub fn import(doc: &Value) -> Result<Self, GraphError> {
        let fields = ENTITY_GRAPH.check(doc).map_err(GraphError::Schema)?;

        let mut graph = Self::new();
        if let Some(applications) = fields.get("remote-applications") {
            graph.remote_applications = RemoteApplication::import_all(applications)?;
        }
        if let Some(units) = fields.get("units") {
            graph.units = Unit::import_all(units)?;
        }

        debug!(
            remote_applications = graph.remote_applications.len(),
            units = graph.units.len(),
            "imported entity graph"
        );
        Ok(graph)
    }

    /// Decode a graph document, validating it if `config` asks for it.
    ///
    /// # Errors
    ///
    /// Returns an import error, or the first validation failure when
    /// `validate_on_import` is set.
    pub fn import_with(doc: &Value, config: &Config) -> Result<Self, GraphError> {
        let graph = Self::import(doc)?;
        if config.validate_on_import() {
            graph.validate(config)?;
        }
        Ok(graph)
    }

    /// Render every collection at its latest version.
    pub fn export(&self) -> Value {
        debug!(
            remote_applications = self.remote_applications.len(),
            units = self.units.len(),
            "exporting entity graph"
        );
        MapBuilder::new()
            .field(
                "remote-applications",
                RemoteApplication::export_all(&self.remote_applications),
            )
            .field("units", Unit::export_all(&self.units))
            .build()
    }

    /// Append a remote application and return it for further mutation.
    pub fn add_remote_application(&mut self, args: RemoteApplicationArgs) -> &mut RemoteApplication {
        self.remote_applications.push(RemoteApplication::new(args));
        let last = self.remote_applications.len() - 1;
        &mut self.remote_applications[last]
    }

    /// Append a unit and return it for further mutation.
    pub fn add_unit(&mut self, args: UnitArgs) -> &mut Unit {
        self.units.push(Unit::new(args));
        let last = self.units.len() - 1;
        &mut self.units[last]
    }

    pub fn remote_applications(&self) -> &[RemoteApplication] {
        &self.remote_applications
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Resolve a unit reference.
    pub fn unit(&self, tag: &UnitTag) -> Option<&Unit> {
        self.units.iter().find(|u| u.tag() == tag)
    }

    /// Every principal or subordinate reference that names no unit in the
    /// graph, in unit order.
    pub fn dangling_references(&self) -> Vec<ValidationError> {
        self.units
            .iter()
            .flat_map(|unit| {
                unit.references()
                    .filter(move |(_, target)| self.unit(target).is_none())
                    .map(move |(relation, target)| ValidationError::DanglingReference {
                        unit: unit.tag().clone(),
                        relation,
                        target: target.clone(),
                    })
            })
            .collect()
    }

    /// Validate every entity, then apply the configured reference policy.
    ///
    /// # Errors
    ///
    /// Returns the first entity validation failure, or the first dangling
    /// reference under [`ReferencePolicy::Error`].
    pub fn validate(&self, config: &Config) -> Result<(), ValidationError> {
        for application in &self.remote_applications {
            application.validate()?;
        }
        for unit in &self.units {
            unit.validate()?;
        }

        match config.reference_policy() {
            ReferencePolicy::Ignore => {}
            ReferencePolicy::Warn => {
                for dangling in self.dangling_references() {
                    warn!(%dangling, "dangling unit reference");
                }
            }
            ReferencePolicy::Error => {
                if let Some(dangling) = self.dangling_references().into_iter().next() {
                    return Err(dangling);
                }
            }
        }
        Ok(())
    }

    /// SHA-256 of the exported document.
    pub fn digest(&self) -> String {
        self.export().digest()
    }
}
