//! entities::remote_application
//!
//! Applications offered from another model and consumed by this one.
//!
//! # Versions
//!
//! - v1: identity, offer, source model, endpoints, spaces, bindings, status
//! - v2: adds `macaroon`
//! - v3: adds `consume-version`
//!
//! Documents older than v3 import with `consume-version = 1`. Once present
//! the value is kept verbatim and always exported.
//!
//! # Example
//!
//! ```
//! use model_description::core::types::{ApplicationTag, ModelTag};
//! use model_description::entities::endpoint::{RemoteEndpointArgs, Role};
//! use model_description::entities::remote_application::{
//!     RemoteApplication, RemoteApplicationArgs,
//! };
//!
//! let mut app = RemoteApplication::new(RemoteApplicationArgs::new(
//!     ApplicationTag::new("civil-wars").unwrap(),
//!     ModelTag::new("abcd-1234").unwrap(),
//! ));
//! app.add_endpoint(RemoteEndpointArgs {
//!     name: "lana".into(),
//!     role: Role::Provider,
//!     interface: "mysql".into(),
//! });
//!
//! let doc = RemoteApplication::export_all(&[app.clone()]);
//! let imported = RemoteApplication::import_all(&doc).unwrap();
//! assert_eq!(imported, vec![app]);
//! ```

use std::collections::BTreeMap;

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::types::{ApplicationTag, ModelTag};
use crate::core::value::{envelope, MapBuilder, Value};
use crate::core::verify::{Validate, ValidationError};

use super::endpoint::{RemoteEndpoint, RemoteEndpointArgs};
use super::space::{RemoteSpace, RemoteSpaceArgs};
use super::status::{Status, StatusArgs};

/// Consume version assumed for documents that predate the field.
pub const DEFAULT_CONSUME_VERSION: i64 = 1;

/// Arguments for constructing a [`RemoteApplication`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteApplicationArgs {
    pub tag: ApplicationTag,
    pub offer_uuid: String,
    pub url: String,
    pub source_model: ModelTag,
    pub is_consumer_proxy: bool,
    pub consume_version: i64,
    pub macaroon: String,
    pub bindings: BTreeMap<String, String>,
}

impl RemoteApplicationArgs {
    /// Arguments with only the identity set.
    pub fn new(tag: ApplicationTag, source_model: ModelTag) -> Self {
        Self {
            tag,
            offer_uuid: String::new(),
            url: String::new(),
            source_model,
            is_consumer_proxy: false,
            consume_version: DEFAULT_CONSUME_VERSION,
            macaroon: String::new(),
            bindings: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteApplication {
    tag: ApplicationTag,
    offer_uuid: String,
    url: String,
    source_model: ModelTag,
    is_consumer_proxy: bool,
    consume_version: i64,
    macaroon: String,
    endpoints: Vec<RemoteEndpoint>,
    spaces: Vec<RemoteSpace>,
    bindings: BTreeMap<String, String>,
    status: Option<Status>,
}

impl RemoteApplication {
    /// Create an application with no endpoints, spaces or status.
    pub fn new(args: RemoteApplicationArgs) -> Self {
        Self {
            tag: args.tag,
            offer_uuid: args.offer_uuid,
            url: args.url,
            source_model: args.source_model,
            is_consumer_proxy: args.is_consumer_proxy,
            consume_version: args.consume_version,
            macaroon: args.macaroon,
            endpoints: Vec::new(),
            spaces: Vec::new(),
            bindings: args.bindings,
            status: None,
        }
    }

    /// Import a `remote-applications` collection.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] describing the first malformed application
    /// or nested document.
    pub fn import_all(doc: &Value) -> Result<Vec<Self>, ImportError> {
        REMOTE_APPLICATIONS.import_collection(doc)
    }

    /// Render a `remote-applications` collection at the latest version.
    pub fn export_all(applications: &[RemoteApplication]) -> Value {
        envelope(
            REMOTE_APPLICATIONS.latest(),
            REMOTE_APPLICATIONS.key,
            applications.iter().map(RemoteApplication::export).collect(),
        )
    }

    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("name", self.tag.as_str())
            .field("offer-uuid", self.offer_uuid.as_str())
            .field("url", self.url.as_str())
            .field("source-model-uuid", self.source_model.as_str())
            .field("is-consumer-proxy", self.is_consumer_proxy)
            .field("consume-version", self.consume_version)
            .str_nonempty("macaroon", &self.macaroon)
            .field("endpoints", RemoteEndpoint::export_all(&self.endpoints))
            .field("spaces", RemoteSpace::export_all(&self.spaces))
            .string_map_nonempty("bindings", &self.bindings)
            .field_opt("status", self.status.as_ref().map(Status::export))
            .build()
    }

    /// Append an endpoint and return it.
    pub fn add_endpoint(&mut self, args: RemoteEndpointArgs) -> &RemoteEndpoint {
        self.endpoints.push(RemoteEndpoint::new(args));
        &self.endpoints[self.endpoints.len() - 1]
    }

    /// Append a space and return it so subnets can be added.
    pub fn add_space(&mut self, args: RemoteSpaceArgs) -> &mut RemoteSpace {
        self.spaces.push(RemoteSpace::new(args));
        let last = self.spaces.len() - 1;
        &mut self.spaces[last]
    }

    /// Replace the status.
    pub fn set_status(&mut self, args: StatusArgs) {
        self.status = Some(Status::new(args));
    }

    pub fn tag(&self) -> &ApplicationTag {
        &self.tag
    }

    pub fn name(&self) -> &str {
        self.tag.as_str()
    }

    pub fn offer_uuid(&self) -> &str {
        &self.offer_uuid
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source_model_tag(&self) -> &ModelTag {
        &self.source_model
    }

    pub fn is_consumer_proxy(&self) -> bool {
        self.is_consumer_proxy
    }

    pub fn consume_version(&self) -> i64 {
        self.consume_version
    }

    pub fn macaroon(&self) -> &str {
        &self.macaroon
    }

    pub fn endpoints(&self) -> &[RemoteEndpoint] {
        &self.endpoints
    }

    pub fn spaces(&self) -> &[RemoteSpace] {
        &self.spaces
    }

    pub fn bindings(&self) -> &BTreeMap<String, String> {
        &self.bindings
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}

impl Validate for RemoteApplication {
    /// Every non-default binding must name one of the application's
    /// endpoints. The empty key is the application's default space.
    fn validate(&self) -> Result<(), ValidationError> {
        for endpoint in self.bindings.keys().filter(|k| !k.is_empty()) {
            if !self.endpoints.iter().any(|e| e.name() == endpoint) {
                return Err(ValidationError::UnknownBinding {
                    application: self.tag.to_string(),
                    endpoint: endpoint.clone(),
                });
            }
        }
        Ok(())
    }
}

const V1_FIELDS: [Field; 9] = [
    Field::required("name", Kind::Str),
    Field::optional("offer-uuid", Kind::Str),
    Field::optional("url", Kind::Str),
    Field::required("source-model-uuid", Kind::Str),
    Field::optional("is-consumer-proxy", Kind::Bool),
    Field::required("endpoints", Kind::Map),
    Field::optional("spaces", Kind::Map),
    Field::optional("bindings", Kind::StringMap),
    Field::optional("status", Kind::Map),
];

static REMOTE_APPLICATION_V1: Schema = Schema {
    entity: "remote application",
    version: 1,
    fields: &V1_FIELDS,
};

static REMOTE_APPLICATION_V2: Schema = Schema {
    entity: "remote application",
    version: 2,
    fields: &[
        V1_FIELDS[0],
        V1_FIELDS[1],
        V1_FIELDS[2],
        V1_FIELDS[3],
        V1_FIELDS[4],
        V1_FIELDS[5],
        V1_FIELDS[6],
        V1_FIELDS[7],
        V1_FIELDS[8],
        Field::optional("macaroon", Kind::Str),
    ],
};

static REMOTE_APPLICATION_V3: Schema = Schema {
    entity: "remote application",
    version: 3,
    fields: &[
        V1_FIELDS[0],
        V1_FIELDS[1],
        V1_FIELDS[2],
        V1_FIELDS[3],
        V1_FIELDS[4],
        V1_FIELDS[5],
        V1_FIELDS[6],
        V1_FIELDS[7],
        V1_FIELDS[8],
        Field::optional("macaroon", Kind::Str),
        Field::optional("consume-version", Kind::Int),
    ],
};

/// Shared by every version; `macaroon` and `consume-version` are filled in
/// by the caller.
fn build_common(fields: &FieldSet) -> Result<RemoteApplication, ImportError> {
    let tag = ApplicationTag::new(fields.str("name"))
        .map_err(|e| ImportError::invalid("name", e))?;
    let source_model = ModelTag::new(fields.str("source-model-uuid"))
        .map_err(|e| ImportError::invalid("source-model-uuid", e))?;

    let mut application = RemoteApplication::new(RemoteApplicationArgs {
        tag,
        offer_uuid: fields.str("offer-uuid"),
        url: fields.str("url"),
        source_model,
        is_consumer_proxy: fields.bool("is-consumer-proxy"),
        consume_version: DEFAULT_CONSUME_VERSION,
        macaroon: String::new(),
        bindings: fields.string_map("bindings"),
    });

    application.endpoints =
        RemoteEndpoint::import_all(fields.get("endpoints").unwrap_or(&Value::Null))?;
    if let Some(spaces) = fields.get("spaces") {
        application.spaces = RemoteSpace::import_all(spaces)?;
    }
    if let Some(status) = fields.get("status") {
        application.status = Some(Status::import(status).map_err(|e| e.in_field("status"))?);
    }
    Ok(application)
}

fn remote_application_v1(fields: FieldSet) -> Result<RemoteApplication, ImportError> {
    build_common(&fields)
}

fn remote_application_v2(fields: FieldSet) -> Result<RemoteApplication, ImportError> {
    let mut application = build_common(&fields)?;
    application.macaroon = fields.str("macaroon");
    Ok(application)
}

fn remote_application_v3(fields: FieldSet) -> Result<RemoteApplication, ImportError> {
    let mut application = build_common(&fields)?;
    application.macaroon = fields.str("macaroon");
    application.consume_version = fields
        .opt_int("consume-version")
        .unwrap_or(DEFAULT_CONSUME_VERSION);
    Ok(application)
}

/// Remote application collection versions.
pub static REMOTE_APPLICATIONS: VersionTable<RemoteApplication> = VersionTable {
    label: "remote application",
    plural: "remote applications",
    key: "remote-applications",
    shape: Shape::Collection,
    envelope: &[
        Field::required("version", Kind::Int),
        Field::required("remote-applications", Kind::List(&Kind::Map)),
    ],
    versions: &[
        Importer {
            schema: &REMOTE_APPLICATION_V1,
            build: remote_application_v1,
        },
        Importer {
            schema: &REMOTE_APPLICATION_V2,
            build: remote_application_v2,
        },
        Importer {
            schema: &REMOTE_APPLICATION_V3,
            build: remote_application_v3,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::endpoint::Role;

    fn app() -> RemoteApplication {
        let mut app = RemoteApplication::new(RemoteApplicationArgs {
            bindings: [("lana".to_string(), "private".to_string())]
                .into_iter()
                .collect(),
            ..RemoteApplicationArgs::new(
                ApplicationTag::new("civil-wars").unwrap(),
                ModelTag::new("abcd-1234").unwrap(),
            )
        });
        app.add_endpoint(RemoteEndpointArgs {
            name: "lana".into(),
            role: Role::Provider,
            interface: "mysql".into(),
        });
        app
    }

    mod construction {
        use super::*;

        #[test]
        fn defaults() {
            let app = app();
            assert_eq!(app.name(), "civil-wars");
            assert_eq!(app.consume_version(), DEFAULT_CONSUME_VERSION);
            assert_eq!(app.macaroon(), "");
            assert!(app.status().is_none());
            assert!(app.spaces().is_empty());
        }

        #[test]
        fn add_space_allows_nested_mutation() {
            let mut app = app();
            app.add_space(RemoteSpaceArgs {
                name: "private".into(),
                ..Default::default()
            })
            .add_subnet(crate::entities::subnet::SubnetArgs {
                cidr: "10.0.0.0/24".into(),
                ..Default::default()
            });
            assert_eq!(app.spaces()[0].subnets()[0].cidr(), "10.0.0.0/24");
        }
    }

    mod validate {
        use super::*;

        #[test]
        fn bound_endpoint_is_valid() {
            assert!(app().validate().is_ok());
        }

        #[test]
        fn default_binding_is_valid() {
            let mut app = app();
            app.bindings.insert(String::new(), "alpha".into());
            assert!(app.validate().is_ok());
        }

        #[test]
        fn unknown_binding() {
            let mut app = app();
            app.bindings.insert("db".into(), "private".into());
            assert_eq!(
                app.validate().unwrap_err().to_string(),
                "remote application \"civil-wars\" binding for unknown endpoint \"db\" not valid"
            );
        }
    }

    mod import {
        use super::*;
        use serde_json::json;

        #[test]
        fn table_is_contiguous() {
            assert!(REMOTE_APPLICATIONS.is_contiguous());
            assert_eq!(REMOTE_APPLICATIONS.latest(), 3);
        }

        #[test]
        fn invalid_name() {
            let mut exported = app().export();
            if let Some(name) = exported.get_mut("name") {
                *name = Value::from("Civil_Wars");
            }
            let doc = envelope(3, "remote-applications", vec![exported]);
            assert_eq!(
                RemoteApplication::import_all(&doc).unwrap_err().to_string(),
                "remote application 0: name: invalid application name: \"Civil_Wars\""
            );
        }

        #[test]
        fn bad_status_names_field() {
            let mut exported = app().export();
            if let Value::Map(map) = &mut exported {
                map.insert("status".into(), Value::from(json!({"version": 7, "status": {}})));
            }
            let doc = envelope(3, "remote-applications", vec![exported]);
            assert_eq!(
                RemoteApplication::import_all(&doc).unwrap_err().to_string(),
                "remote application 0: status: status version 7 not valid"
            );
        }

        #[test]
        fn unknown_version() {
            let doc = Value::from(json!({"version": 4, "remote-applications": []}));
            assert_eq!(
                RemoteApplication::import_all(&doc).unwrap_err().to_string(),
                "remote applications version 4 not valid"
            );
        }
    }
}
