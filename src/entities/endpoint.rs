//! entities::endpoint
//!
//! Endpoints offered by a remote application.

use std::str::FromStr;

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::types::TypeError;
use crate::core::value::{envelope, MapBuilder, Value};

/// Relation role of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Provider,
    Requirer,
    Peer,
}

/// Role literals in document form.
pub const ROLES: &[&str] = &["provider", "requirer", "peer"];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Provider => "provider",
            Role::Requirer => "requirer",
            Role::Peer => "peer",
        }
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "provider" => Ok(Role::Provider),
            "requirer" => Ok(Role::Requirer),
            "peer" => Ok(Role::Peer),
            other => Err(TypeError::InvalidEndpointRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments for constructing a [`RemoteEndpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpointArgs {
    pub name: String,
    pub role: Role,
    pub interface: String,
}

/// An endpoint of a remote application, identified by name within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    name: String,
    role: Role,
    interface: String,
}

impl RemoteEndpoint {
    pub fn new(args: RemoteEndpointArgs) -> Self {
        Self {
            name: args.name,
            role: args.role,
            interface: args.interface,
        }
    }

    /// Import an `endpoints` collection.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] describing the first malformed endpoint.
    pub fn import_all(doc: &Value) -> Result<Vec<Self>, ImportError> {
        REMOTE_ENDPOINTS.import_collection(doc)
    }

    pub fn export_all(endpoints: &[RemoteEndpoint]) -> Value {
        envelope(
            REMOTE_ENDPOINTS.latest(),
            REMOTE_ENDPOINTS.key,
            endpoints.iter().map(RemoteEndpoint::export).collect(),
        )
    }

    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("name", self.name.as_str())
            .field("role", self.role.as_str())
            .field("interface", self.interface.as_str())
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

static REMOTE_ENDPOINT_V1: Schema = Schema {
    entity: "remote endpoint",
    version: 1,
    fields: &[
        Field::required("name", Kind::Str),
        Field::required("role", Kind::Enum(ROLES)),
        Field::required("interface", Kind::Str),
    ],
};

fn remote_endpoint_v1(fields: FieldSet) -> Result<RemoteEndpoint, ImportError> {
    let role = fields
        .str("role")
        .parse()
        .map_err(|e| ImportError::invalid("role", e))?;
    Ok(RemoteEndpoint::new(RemoteEndpointArgs {
        name: fields.str("name"),
        role,
        interface: fields.str("interface"),
    }))
}

/// Remote endpoint collection versions.
pub static REMOTE_ENDPOINTS: VersionTable<RemoteEndpoint> = VersionTable {
    label: "remote endpoint",
    plural: "remote endpoints",
    key: "endpoints",
    shape: Shape::Collection,
    envelope: &[
        Field::required("version", Kind::Int),
        Field::required("endpoints", Kind::List(&Kind::Map)),
    ],
    versions: &[Importer {
        schema: &REMOTE_ENDPOINT_V1,
        build: remote_endpoint_v1,
    }],
};
