//! entities::space
//!
//! Spaces exposed by a remote application. A space owns its subnets; the
//! nested `subnets` document is versioned independently of the space.

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::value::{envelope, Map, MapBuilder, Value};

use super::subnet::{Subnet, SubnetArgs};

/// Arguments for constructing a [`RemoteSpace`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSpaceArgs {
    pub cloud_type: String,
    pub name: String,
    pub provider_id: String,
    pub provider_attributes: Map,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSpace {
    cloud_type: String,
    name: String,
    provider_id: String,
    provider_attributes: Map,
    subnets: Vec<Subnet>,
}

impl RemoteSpace {
    /// Create a space with no subnets.
    pub fn new(args: RemoteSpaceArgs) -> Self {
        Self {
            cloud_type: args.cloud_type,
            name: args.name,
            provider_id: args.provider_id,
            provider_attributes: args.provider_attributes,
            subnets: Vec::new(),
        }
    }

    /// Import a `spaces` collection, subnets included.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] describing the first malformed space or
    /// subnet.
    pub fn import_all(doc: &Value) -> Result<Vec<Self>, ImportError> {
        REMOTE_SPACES.import_collection(doc)
    }

    pub fn export_all(spaces: &[RemoteSpace]) -> Value {
        envelope(
            REMOTE_SPACES.latest(),
            REMOTE_SPACES.key,
            spaces.iter().map(RemoteSpace::export).collect(),
        )
    }

    pub fn export(&self) -> Value {
        let attributes = (!self.provider_attributes.is_empty())
            .then(|| self.provider_attributes.clone());
        MapBuilder::new()
            .field("cloud-type", self.cloud_type.as_str())
            .field("name", self.name.as_str())
            .field("provider-id", self.provider_id.as_str())
            .field_opt("provider-attributes", attributes)
            .field("subnets", Subnet::export_all(&self.subnets))
            .build()
    }

    /// Append a subnet and return it.
    pub fn add_subnet(&mut self, args: SubnetArgs) -> &Subnet {
        self.subnets.push(Subnet::new(args));
        &self.subnets[self.subnets.len() - 1]
    }

    pub fn cloud_type(&self) -> &str {
        &self.cloud_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn provider_attributes(&self) -> &Map {
        &self.provider_attributes
    }

    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }
}

static REMOTE_SPACE_V1: Schema = Schema {
    entity: "remote space",
    version: 1,
    fields: &[
        Field::required("cloud-type", Kind::Str),
        Field::required("name", Kind::Str),
        Field::required("provider-id", Kind::Str),
        Field::optional("provider-attributes", Kind::Map),
        Field::required("subnets", Kind::Map),
    ],
};

fn remote_space_v1(fields: FieldSet) -> Result<RemoteSpace, ImportError> {
    let mut space = RemoteSpace::new(RemoteSpaceArgs {
        cloud_type: fields.str("cloud-type"),
        name: fields.str("name"),
        provider_id: fields.str("provider-id"),
        provider_attributes: fields.opt_map("provider-attributes").unwrap_or_default(),
    });
    space.subnets = Subnet::import_all(fields.get("subnets").unwrap_or(&Value::Null))?;
    Ok(space)
}

/// Remote space collection versions.
pub static REMOTE_SPACES: VersionTable<RemoteSpace> = VersionTable {
    label: "remote space",
    plural: "remote spaces",
    key: "spaces",
    shape: Shape::Collection,
    envelope: &[
        Field::required("version", Kind::Int),
        Field::required("spaces", Kind::List(&Kind::Map)),
    ],
    versions: &[Importer {
        schema: &REMOTE_SPACE_V1,
        build: remote_space_v1,
    }],
};
