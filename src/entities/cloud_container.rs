//! entities::cloud_container
//!
//! Container placement of a CAAS unit. Both documents here are inline:
//! `{version: 1, ...fields}`.

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::value::{MapBuilder, Value};

/// Arguments for constructing an [`Address`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressArgs {
    pub value: String,
    pub address_type: String,
    pub scope: String,
    pub origin: String,
}

/// A network address with optional scope and origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    value: String,
    address_type: String,
    scope: String,
    origin: String,
}

impl Address {
    pub fn new(args: AddressArgs) -> Self {
        Self {
            value: args.value,
            address_type: args.address_type,
            scope: args.scope,
            origin: args.origin,
        }
    }

    /// # Errors
    ///
    /// Returns an [`ImportError`] if the document matches no address version.
    pub fn import(doc: &Value) -> Result<Self, ImportError> {
        ADDRESS.import_one(doc)
    }

    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("version", ADDRESS.latest())
            .field("value", self.value.as_str())
            .field("type", self.address_type.as_str())
            .str_nonempty("scope", &self.scope)
            .str_nonempty("origin", &self.origin)
            .build()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn address_type(&self) -> &str {
        &self.address_type
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

/// Arguments for constructing a [`CloudContainer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudContainerArgs {
    pub provider_id: String,
    pub address: AddressArgs,
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudContainer {
    provider_id: String,
    address: Address,
    ports: Vec<String>,
}

impl CloudContainer {
    pub fn new(args: CloudContainerArgs) -> Self {
        Self {
            provider_id: args.provider_id,
            address: Address::new(args.address),
            ports: args.ports,
        }
    }

    /// # Errors
    ///
    /// Returns an [`ImportError`] if the container or its address is
    /// malformed.
    pub fn import(doc: &Value) -> Result<Self, ImportError> {
        CLOUD_CONTAINER.import_one(doc)
    }

    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("version", CLOUD_CONTAINER.latest())
            .field("provider-id", self.provider_id.as_str())
            .field("address", self.address.export())
            .list_nonempty("ports", &self.ports)
            .build()
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn ports(&self) -> &[String] {
        &self.ports
    }
}

static ADDRESS_V1: Schema = Schema {
    entity: "address",
    version: 1,
    fields: &[
        Field::required("value", Kind::Str),
        Field::required("type", Kind::Str),
        Field::optional("scope", Kind::Str),
        Field::optional("origin", Kind::Str),
    ],
};

fn address_v1(fields: FieldSet) -> Result<Address, ImportError> {
    Ok(Address::new(AddressArgs {
        value: fields.str("value"),
        address_type: fields.str("type"),
        scope: fields.str("scope"),
        origin: fields.str("origin"),
    }))
}

static CLOUD_CONTAINER_V1: Schema = Schema {
    entity: "cloud container",
    version: 1,
    fields: &[
        Field::required("provider-id", Kind::Str),
        Field::required("address", Kind::Map),
        Field::optional("ports", Kind::List(&Kind::Str)),
    ],
};

fn cloud_container_v1(fields: FieldSet) -> Result<CloudContainer, ImportError> {
    let address = Address::import(fields.get("address").unwrap_or(&Value::Null))
        .map_err(|e| e.in_field("address"))?;
    Ok(CloudContainer {
        provider_id: fields.str("provider-id"),
        address,
        ports: fields.strings("ports"),
    })
}

/// Address document versions.
pub static ADDRESS: VersionTable<Address> = VersionTable {
    label: "address",
    plural: "address",
    key: "",
    shape: Shape::Inline,
    envelope: &[Field::required("version", Kind::Int)],
    versions: &[Importer {
        schema: &ADDRESS_V1,
        build: address_v1,
    }],
};

/// Cloud container document versions.
pub static CLOUD_CONTAINER: VersionTable<CloudContainer> = VersionTable {
    label: "cloud container",
    plural: "cloud container",
    key: "",
    shape: Shape::Inline,
    envelope: &[Field::required("version", Kind::Int)],
    versions: &[Importer {
        schema: &CLOUD_CONTAINER_V1,
        build: cloud_container_v1,
    }],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_args() -> CloudContainerArgs {
        CloudContainerArgs {
            provider_id: "some-provider".into(),
            address: AddressArgs {
                value: "10.0.0.1".into(),
                address_type: "special".into(),
                ..Default::default()
            },
            ports: vec!["80".into(), "443".into()],
        }
    }

    mod address {
        use super::*;

        #[test]
        fn optional_fields_round_trip() {
            let address = Address::new(AddressArgs {
                value: "10.0.0.1".into(),
                address_type: "ipv4".into(),
                scope: "local-cloud".into(),
                origin: "provider".into(),
            });
            assert_eq!(Address::import(&address.export()).unwrap(), address);
        }

        #[test]
        fn missing_type() {
            let doc = Value::from(json!({"version": 1, "value": "10.0.0.1"}));
            assert_eq!(
                Address::import(&doc).unwrap_err().to_string(),
                "address v1 schema check failed: type: expected string, got nothing"
            );
        }
    }

    mod cloud_container {
        use super::*;

        #[test]
        fn minimal_export_shape() {
            assert_eq!(
                CloudContainer::new(minimal_args()).export(),
                Value::from(json!({
                    "version": 1,
                    "provider-id": "some-provider",
                    "address": {"version": 1, "value": "10.0.0.1", "type": "special"},
                    "ports": ["80", "443"]
                }))
            );
        }

        #[test]
        fn round_trip() {
            let container = CloudContainer::new(minimal_args());
            assert_eq!(CloudContainer::import(&container.export()).unwrap(), container);
        }

        #[test]
        fn bad_address_names_field() {
            let doc = Value::from(json!({
                "version": 1,
                "provider-id": "p",
                "address": {"value": "10.0.0.1", "type": "special"}
            }));
            assert_eq!(
                CloudContainer::import(&doc).unwrap_err().to_string(),
                "address: address version schema check failed: version: expected int, got nothing"
            );
        }

        #[test]
        fn unknown_version() {
            let doc = Value::from(json!({"version": 2, "provider-id": "p", "address": {}}));
            assert_eq!(
                CloudContainer::import(&doc).unwrap_err().to_string(),
                "cloud container version 2 not valid"
            );
        }
    }
}
