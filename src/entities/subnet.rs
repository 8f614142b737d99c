//! entities::subnet
//!
//! Subnets owned by a remote space.
//!
//! # Versions
//!
//! - v1: `cidr`, `provider-id`, `vlan-tag`, `space-name`, `provider-space-id`
//!   and a single `availability-zone`
//! - v2: `availability-zones` (list) replaces `availability-zone`; adds
//!   `provider-network-id`
//! - v3: adds `subnet-id`, `is-public`, `space-id`
//!
//! Every field of the latest version is always exported, including empty
//! strings: a subnet is a plain value object and round-trips exactly.

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::value::{envelope, MapBuilder, Value};

/// Arguments for constructing a [`Subnet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubnetArgs {
    pub cidr: String,
    pub subnet_id: String,
    pub provider_id: String,
    pub provider_network_id: String,
    pub provider_space_id: String,
    pub vlan_tag: i64,
    pub availability_zones: Vec<String>,
    pub space_id: String,
    pub space_name: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    cidr: String,
    subnet_id: String,
    provider_id: String,
    provider_network_id: String,
    provider_space_id: String,
    vlan_tag: i64,
    availability_zones: Vec<String>,
    space_id: String,
    space_name: String,
    is_public: bool,
}

impl Subnet {
    pub fn new(args: SubnetArgs) -> Self {
        Self {
            cidr: args.cidr,
            subnet_id: args.subnet_id,
            provider_id: args.provider_id,
            provider_network_id: args.provider_network_id,
            provider_space_id: args.provider_space_id,
            vlan_tag: args.vlan_tag,
            availability_zones: args.availability_zones,
            space_id: args.space_id,
            space_name: args.space_name,
            is_public: args.is_public,
        }
    }

    /// Import a `subnets` collection.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] describing the first malformed subnet.
    pub fn import_all(doc: &Value) -> Result<Vec<Self>, ImportError> {
        SUBNETS.import_collection(doc)
    }

    /// Render a `subnets` collection at the latest version.
    pub fn export_all(subnets: &[Subnet]) -> Value {
        envelope(
            SUBNETS.latest(),
            SUBNETS.key,
            subnets.iter().map(Subnet::export).collect(),
        )
    }

    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("cidr", self.cidr.as_str())
            .field("subnet-id", self.subnet_id.as_str())
            .field("provider-id", self.provider_id.as_str())
            .field("provider-network-id", self.provider_network_id.as_str())
            .field("provider-space-id", self.provider_space_id.as_str())
            .field("vlan-tag", self.vlan_tag)
            .field("availability-zones", self.availability_zones.as_slice())
            .field("space-id", self.space_id.as_str())
            .field("space-name", self.space_name.as_str())
            .field("is-public", self.is_public)
            .build()
    }

    pub fn cidr(&self) -> &str {
        &self.cidr
    }

    pub fn subnet_id(&self) -> &str {
        &self.subnet_id
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn provider_network_id(&self) -> &str {
        &self.provider_network_id
    }

    pub fn provider_space_id(&self) -> &str {
        &self.provider_space_id
    }

    pub fn vlan_tag(&self) -> i64 {
        self.vlan_tag
    }

    pub fn availability_zones(&self) -> &[String] {
        &self.availability_zones
    }

    pub fn space_id(&self) -> &str {
        &self.space_id
    }

    pub fn space_name(&self) -> &str {
        &self.space_name
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }
}

static SUBNET_V1: Schema = Schema {
    entity: "subnet",
    version: 1,
    fields: &[
        Field::required("cidr", Kind::Str),
        Field::optional("provider-id", Kind::Str),
        Field::optional("provider-space-id", Kind::Str),
        Field::optional("vlan-tag", Kind::Int),
        Field::optional("space-name", Kind::Str),
        Field::optional("availability-zone", Kind::Str),
    ],
};

static SUBNET_V2: Schema = Schema {
    entity: "subnet",
    version: 2,
    fields: &[
        Field::required("cidr", Kind::Str),
        Field::optional("provider-id", Kind::Str),
        Field::optional("provider-network-id", Kind::Str),
        Field::optional("provider-space-id", Kind::Str),
        Field::optional("vlan-tag", Kind::Int),
        Field::optional("space-name", Kind::Str),
        Field::optional("availability-zones", Kind::List(&Kind::Str)),
    ],
};

static SUBNET_V3: Schema = Schema {
    entity: "subnet",
    version: 3,
    fields: &[
        Field::required("cidr", Kind::Str),
        Field::optional("subnet-id", Kind::Str),
        Field::optional("provider-id", Kind::Str),
        Field::optional("provider-network-id", Kind::Str),
        Field::optional("provider-space-id", Kind::Str),
        Field::optional("vlan-tag", Kind::Int),
        Field::optional("availability-zones", Kind::List(&Kind::Str)),
        Field::optional("space-id", Kind::Str),
        Field::optional("space-name", Kind::Str),
        Field::optional("is-public", Kind::Bool),
    ],
};

fn subnet_v1(fields: FieldSet) -> Result<Subnet, ImportError> {
    Ok(Subnet::new(SubnetArgs {
        cidr: fields.str("cidr"),
        provider_id: fields.str("provider-id"),
        provider_space_id: fields.str("provider-space-id"),
        vlan_tag: fields.int("vlan-tag"),
        space_name: fields.str("space-name"),
        availability_zones: fields.opt_str("availability-zone").into_iter().collect(),
        ..Default::default()
    }))
}

fn subnet_v2(fields: FieldSet) -> Result<Subnet, ImportError> {
    Ok(Subnet::new(SubnetArgs {
        cidr: fields.str("cidr"),
        provider_id: fields.str("provider-id"),
        provider_network_id: fields.str("provider-network-id"),
        provider_space_id: fields.str("provider-space-id"),
        vlan_tag: fields.int("vlan-tag"),
        space_name: fields.str("space-name"),
        availability_zones: fields.strings("availability-zones"),
        ..Default::default()
    }))
}

fn subnet_v3(fields: FieldSet) -> Result<Subnet, ImportError> {
    Ok(Subnet::new(SubnetArgs {
        cidr: fields.str("cidr"),
        subnet_id: fields.str("subnet-id"),
        provider_id: fields.str("provider-id"),
        provider_network_id: fields.str("provider-network-id"),
        provider_space_id: fields.str("provider-space-id"),
        vlan_tag: fields.int("vlan-tag"),
        availability_zones: fields.strings("availability-zones"),
        space_id: fields.str("space-id"),
        space_name: fields.str("space-name"),
        is_public: fields.bool("is-public"),
    }))
}

/// Subnet collection versions.
pub static SUBNETS: VersionTable<Subnet> = VersionTable {
    label: "subnet",
    plural: "subnets",
    key: "subnets",
    shape: Shape::Collection,
    envelope: &[
        Field::required("version", Kind::Int),
        Field::required("subnets", Kind::List(&Kind::Map)),
    ],
    versions: &[
        Importer {
            schema: &SUBNET_V1,
            build: subnet_v1,
        },
        Importer {
            schema: &SUBNET_V2,
            build: subnet_v2,
        },
        Importer {
            schema: &SUBNET_V3,
            build: subnet_v3,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Subnet {
        Subnet::new(SubnetArgs {
            cidr: "2.3.4.0/24".into(),
            provider_id: "juju-subnet-1".into(),
            availability_zones: vec!["az1".into(), "az2".into()],
            provider_space_id: "juju-space-private".into(),
            provider_network_id: "network-1".into(),
            ..Default::default()
        })
    }

    #[test]
    fn table_is_contiguous() {
        assert!(SUBNETS.is_contiguous());
        assert_eq!(SUBNETS.latest(), 3);
    }

    #[test]
    fn export_emits_empty_strings() {
        assert_eq!(
            sample().export(),
            Value::from(json!({
                "cidr": "2.3.4.0/24",
                "subnet-id": "",
                "is-public": false,
                "space-id": "",
                "space-name": "",
                "vlan-tag": 0,
                "provider-id": "juju-subnet-1",
                "availability-zones": ["az1", "az2"],
                "provider-space-id": "juju-space-private",
                "provider-network-id": "network-1"
            }))
        );
    }

    #[test]
    fn round_trip_latest() {
        let subnets = vec![sample()];
        let imported = Subnet::import_all(&Subnet::export_all(&subnets)).unwrap();
        assert_eq!(imported, subnets);
    }

    #[test]
    fn version_one_single_zone() {
        let doc = Value::from(json!({
            "version": 1,
            "subnets": [{"cidr": "10.0.0.0/8", "availability-zone": "az9", "vlan-tag": 4}]
        }));
        let subnets = Subnet::import_all(&doc).unwrap();
        assert_eq!(subnets[0].availability_zones(), ["az9".to_string()]);
        assert_eq!(subnets[0].vlan_tag(), 4);
        assert_eq!(subnets[0].provider_network_id(), "");
    }

    #[test]
    fn version_two_drops_v3_fields() {
        let mut exported = Subnet::export_all(&[Subnet::new(SubnetArgs {
            cidr: "10.0.0.0/8".into(),
            subnet_id: "42".into(),
            is_public: true,
            ..Default::default()
        })]);
        if let Some(version) = exported.get_mut("version") {
            *version = Value::from(2);
        }
        let subnets = Subnet::import_all(&exported).unwrap();
        assert_eq!(subnets[0].subnet_id(), "");
        assert!(!subnets[0].is_public());
    }

    #[test]
    fn missing_cidr() {
        let doc = Value::from(json!({"version": 3, "subnets": [{}]}));
        assert_eq!(
            Subnet::import_all(&doc).unwrap_err().to_string(),
            "subnet 0 v3 schema check failed: cidr: expected string, got nothing"
        );
    }
}
