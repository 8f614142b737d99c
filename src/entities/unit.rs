//! entities::unit
//!
//! Units: the running instances of an application.
//!
//! # Versions
//!
//! - v1: identity, placement, statuses and histories, tools, resources,
//!   payloads, constraints, annotations
//! - v2: adds the model `type` and `cloud-container`
//!
//! A v1 document imports with no model type and no cloud container even if
//! the document happens to carry them.
//!
//! # References
//!
//! `principal` and `subordinates` are weak references by tag. They are
//! stored as identifiers and resolved through
//! [`EntityGraph::unit`](crate::entities::graph::EntityGraph::unit); a tag
//! that names no unit is not an import error.
//!
//! # Model type coupling
//!
//! IAAS units (and units whose model type is unknown) must carry agent
//! tools. CAAS units must carry a cloud container and no tools. These rules
//! are checked by [`Validate`], never by import.

use std::collections::BTreeMap;

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::types::{MachineTag, ModelType, TypeError, UnitTag, MODEL_TYPES};
use crate::core::value::{envelope, MapBuilder, Value};
use crate::core::verify::{Relation, Validate, ValidationError};

use super::agent_tools::{AgentTools, AgentToolsArgs};
use super::cloud_container::{CloudContainer, CloudContainerArgs};
use super::constraints::{Constraints, ConstraintsArgs};
use super::payload::{Payload, PayloadArgs};
use super::resource::{UnitResource, UnitResourceArgs};
use super::status::{Status, StatusArgs, StatusHistory};

/// Arguments for constructing a [`Unit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitArgs {
    pub tag: UnitTag,
    pub model_type: Option<ModelType>,
    pub machine: Option<MachineTag>,
    pub password_hash: String,
    pub principal: Option<UnitTag>,
    pub subordinates: Vec<UnitTag>,
    pub workload_version: String,
    pub meter_status_code: String,
    pub meter_status_info: String,
    pub cloud_container: Option<CloudContainerArgs>,
}

impl UnitArgs {
    /// Arguments with only the identity set.
    pub fn new(tag: UnitTag) -> Self {
        Self {
            tag,
            model_type: None,
            machine: None,
            password_hash: String::new(),
            principal: None,
            subordinates: Vec::new(),
            workload_version: String::new(),
            meter_status_code: String::new(),
            meter_status_info: String::new(),
            cloud_container: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    tag: UnitTag,
    model_type: Option<ModelType>,
    machine: Option<MachineTag>,
    password_hash: String,
    principal: Option<UnitTag>,
    subordinates: Vec<UnitTag>,

    workload_version: String,
    meter_status_code: String,
    meter_status_info: String,

    agent_status: Option<Status>,
    agent_status_history: StatusHistory,
    workload_status: Option<Status>,
    workload_status_history: StatusHistory,
    workload_version_history: StatusHistory,

    tools: Option<AgentTools>,
    cloud_container: Option<CloudContainer>,
    resources: Vec<UnitResource>,
    payloads: Vec<Payload>,
    constraints: Option<Constraints>,
    annotations: BTreeMap<String, String>,
}

impl Unit {
    /// Create a unit with no statuses, tools, resources or payloads.
    pub fn new(args: UnitArgs) -> Self {
        Self {
            tag: args.tag,
            model_type: args.model_type,
            machine: args.machine,
            password_hash: args.password_hash,
            principal: args.principal,
            subordinates: args.subordinates,
            workload_version: args.workload_version,
            meter_status_code: args.meter_status_code,
            meter_status_info: args.meter_status_info,
            agent_status: None,
            agent_status_history: StatusHistory::default(),
            workload_status: None,
            workload_status_history: StatusHistory::default(),
            workload_version_history: StatusHistory::default(),
            tools: None,
            cloud_container: args.cloud_container.map(CloudContainer::new),
            resources: Vec::new(),
            payloads: Vec::new(),
            constraints: None,
            annotations: BTreeMap::new(),
        }
    }

    /// Import a `units` collection.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] describing the first malformed unit or
    /// nested document.
    pub fn import_all(doc: &Value) -> Result<Vec<Self>, ImportError> {
        UNITS.import_collection(doc)
    }

    /// Render a `units` collection at the latest version.
    pub fn export_all(units: &[Unit]) -> Value {
        envelope(
            UNITS.latest(),
            UNITS.key,
            units.iter().map(Unit::export).collect(),
        )
    }

    pub fn export(&self) -> Value {
        let subordinates: Vec<String> = self.subordinates.iter().map(UnitTag::to_string).collect();
        MapBuilder::new()
            .field("name", self.tag.as_str())
            .field_opt("type", self.model_type.map(|t| t.as_str()))
            .field_opt("machine", self.machine.as_ref().map(MachineTag::as_str))
            .field("password-hash", self.password_hash.as_str())
            .field_opt("principal", self.principal.as_ref().map(UnitTag::as_str))
            .list_nonempty("subordinates", &subordinates)
            .str_nonempty("workload-version", &self.workload_version)
            .str_nonempty("meter-status-code", &self.meter_status_code)
            .str_nonempty("meter-status-info", &self.meter_status_info)
            .field_opt("agent-status", self.agent_status.as_ref().map(Status::export))
            .field("agent-status-history", self.agent_status_history.export())
            .field_opt(
                "workload-status",
                self.workload_status.as_ref().map(Status::export),
            )
            .field("workload-status-history", self.workload_status_history.export())
            .field(
                "workload-version-history",
                self.workload_version_history.export(),
            )
            .field_opt("tools", self.tools.as_ref().map(AgentTools::export))
            .field_opt(
                "cloud-container",
                self.cloud_container.as_ref().map(CloudContainer::export),
            )
            .field("resources", UnitResource::export_all(&self.resources))
            .field("payloads", Payload::export_all(&self.payloads))
            .field_opt("constraints", self.constraints.as_ref().map(Constraints::export))
            .string_map_nonempty("annotations", &self.annotations)
            .build()
    }

    // =========================================================================
    // Setters
    // =========================================================================

    pub fn set_agent_status(&mut self, args: StatusArgs) {
        self.agent_status = Some(Status::new(args));
    }

    pub fn set_workload_status(&mut self, args: StatusArgs) {
        self.workload_status = Some(Status::new(args));
    }

    pub fn set_agent_status_history(&mut self, args: Vec<StatusArgs>) {
        self.agent_status_history = StatusHistory::new(args);
    }

    pub fn set_workload_status_history(&mut self, args: Vec<StatusArgs>) {
        self.workload_status_history = StatusHistory::new(args);
    }

    pub fn set_workload_version_history(&mut self, args: Vec<StatusArgs>) {
        self.workload_version_history = StatusHistory::new(args);
    }

    pub fn set_tools(&mut self, args: AgentToolsArgs) {
        self.tools = Some(AgentTools::new(args));
    }

    pub fn set_cloud_container(&mut self, args: CloudContainerArgs) {
        self.cloud_container = Some(CloudContainer::new(args));
    }

    pub fn set_constraints(&mut self, args: ConstraintsArgs) {
        self.constraints = Some(Constraints::new(args));
    }

    pub fn set_annotations(&mut self, annotations: BTreeMap<String, String>) {
        self.annotations = annotations;
    }

    pub fn set_model_type(&mut self, model_type: ModelType) {
        self.model_type = Some(model_type);
    }

    /// Append a resource and return it.
    pub fn add_resource(&mut self, args: UnitResourceArgs) -> &UnitResource {
        self.resources.push(UnitResource::new(args));
        &self.resources[self.resources.len() - 1]
    }

    /// Append a payload and return it.
    pub fn add_payload(&mut self, args: PayloadArgs) -> &Payload {
        self.payloads.push(Payload::new(args));
        &self.payloads[self.payloads.len() - 1]
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn tag(&self) -> &UnitTag {
        &self.tag
    }

    pub fn name(&self) -> &str {
        self.tag.as_str()
    }

    /// `None` for units imported from v1 documents.
    pub fn model_type(&self) -> Option<ModelType> {
        self.model_type
    }

    pub fn machine(&self) -> Option<&MachineTag> {
        self.machine.as_ref()
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn principal(&self) -> Option<&UnitTag> {
        self.principal.as_ref()
    }

    pub fn subordinates(&self) -> &[UnitTag] {
        &self.subordinates
    }

    /// Every weak reference this unit holds, principal first.
    pub fn references(&self) -> impl Iterator<Item = (Relation, &UnitTag)> {
        self.principal
            .iter()
            .map(|tag| (Relation::Principal, tag))
            .chain(self.subordinates.iter().map(|tag| (Relation::Subordinate, tag)))
    }

    pub fn workload_version(&self) -> &str {
        &self.workload_version
    }

    pub fn meter_status_code(&self) -> &str {
        &self.meter_status_code
    }

    pub fn meter_status_info(&self) -> &str {
        &self.meter_status_info
    }

    pub fn agent_status(&self) -> Option<&Status> {
        self.agent_status.as_ref()
    }

    pub fn agent_status_history(&self) -> &StatusHistory {
        &self.agent_status_history
    }

    pub fn workload_status(&self) -> Option<&Status> {
        self.workload_status.as_ref()
    }

    pub fn workload_status_history(&self) -> &StatusHistory {
        &self.workload_status_history
    }

    pub fn workload_version_history(&self) -> &StatusHistory {
        &self.workload_version_history
    }

    pub fn tools(&self) -> Option<&AgentTools> {
        self.tools.as_ref()
    }

    pub fn cloud_container(&self) -> Option<&CloudContainer> {
        self.cloud_container.as_ref()
    }

    pub fn resources(&self) -> &[UnitResource] {
        &self.resources
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    pub fn constraints(&self) -> Option<&Constraints> {
        self.constraints.as_ref()
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }
}

impl Validate for Unit {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.agent_status.is_none() {
            return Err(ValidationError::MissingAgentStatus(self.tag.clone()));
        }
        if self.workload_status.is_none() {
            return Err(ValidationError::MissingWorkloadStatus(self.tag.clone()));
        }
        match self.model_type {
            Some(ModelType::Caas) => {
                if self.cloud_container.is_none() {
                    return Err(ValidationError::MissingCloudContainer(self.tag.clone()));
                }
                if self.tools.is_some() {
                    return Err(ValidationError::UnexpectedTools(self.tag.clone()));
                }
            }
            Some(ModelType::Iaas) | None => {
                if self.tools.is_none() {
                    return Err(ValidationError::MissingTools(self.tag.clone()));
                }
            }
        }
        Ok(())
    }
}

const V1_FIELDS: [Field; 17] = [
    Field::required("name", Kind::Str),
    Field::optional("machine", Kind::Str),
    Field::required("password-hash", Kind::Str),
    Field::optional("principal", Kind::Str),
    Field::optional("subordinates", Kind::List(&Kind::Str)),
    Field::optional("workload-version", Kind::Str),
    Field::optional("meter-status-code", Kind::Str),
    Field::optional("meter-status-info", Kind::Str),
    Field::required("agent-status", Kind::Map),
    Field::required("agent-status-history", Kind::Map),
    Field::required("workload-status", Kind::Map),
    Field::required("workload-status-history", Kind::Map),
    Field::optional("workload-version-history", Kind::Map),
    Field::optional("tools", Kind::Map),
    Field::optional("resources", Kind::Map),
    Field::optional("payloads", Kind::Map),
    Field::optional("constraints", Kind::Map),
];

static UNIT_V1: Schema = Schema {
    entity: "unit",
    version: 1,
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
        V1_FIELDS[9],
        V1_FIELDS[10],
        V1_FIELDS[11],
        V1_FIELDS[12],
        V1_FIELDS[13],
        V1_FIELDS[14],
        V1_FIELDS[15],
        V1_FIELDS[16],
        Field::optional("annotations", Kind::StringMap),
    ],
};

static UNIT_V2: Schema = Schema {
    entity: "unit",
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
        V1_FIELDS[9],
        V1_FIELDS[10],
        V1_FIELDS[11],
        V1_FIELDS[12],
        V1_FIELDS[13],
        V1_FIELDS[14],
        V1_FIELDS[15],
        V1_FIELDS[16],
        Field::optional("annotations", Kind::StringMap),
        Field::optional("type", Kind::Enum(MODEL_TYPES)),
        Field::optional("cloud-container", Kind::Map),
    ],
};

/// Parse an optional tag field. An empty string is the same as absent.
fn optional_tag<T>(
    fields: &FieldSet,
    name: &'static str,
    parse: impl Fn(String) -> Result<T, TypeError>,
) -> Result<Option<T>, ImportError> {
    fields
        .opt_str(name)
        .filter(|s| !s.is_empty())
        .map(|s| parse(s).map_err(|e| ImportError::invalid(name, e)))
        .transpose()
}

/// Import an optional nested document, tagging failures with the field name.
fn nested<T>(
    fields: &FieldSet,
    name: &'static str,
    import: fn(&Value) -> Result<T, ImportError>,
) -> Result<Option<T>, ImportError> {
    fields
        .get(name)
        .map(|doc| import(doc).map_err(|e| e.in_field(name)))
        .transpose()
}

fn build_common(fields: &FieldSet) -> Result<Unit, ImportError> {
    let tag = UnitTag::new(fields.str("name")).map_err(|e| ImportError::invalid("name", e))?;
    let subordinates = fields
        .strings("subordinates")
        .into_iter()
        .map(UnitTag::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ImportError::invalid("subordinates", e))?;

    let mut unit = Unit::new(UnitArgs {
        tag,
        model_type: None,
        machine: optional_tag(fields, "machine", MachineTag::new)?,
        password_hash: fields.str("password-hash"),
        principal: optional_tag(fields, "principal", UnitTag::new)?,
        subordinates,
        workload_version: fields.str("workload-version"),
        meter_status_code: fields.str("meter-status-code"),
        meter_status_info: fields.str("meter-status-info"),
        cloud_container: None,
    });

    unit.agent_status = nested(fields, "agent-status", Status::import)?;
    unit.agent_status_history =
        nested(fields, "agent-status-history", StatusHistory::import)?.unwrap_or_default();
    unit.workload_status = nested(fields, "workload-status", Status::import)?;
    unit.workload_status_history =
        nested(fields, "workload-status-history", StatusHistory::import)?.unwrap_or_default();
    unit.workload_version_history =
        nested(fields, "workload-version-history", StatusHistory::import)?.unwrap_or_default();
    unit.tools = nested(fields, "tools", AgentTools::import)?;
    unit.constraints = nested(fields, "constraints", Constraints::import)?;

    if let Some(resources) = fields.get("resources") {
        unit.resources = UnitResource::import_all(resources)?;
    }
    if let Some(payloads) = fields.get("payloads") {
        unit.payloads = Payload::import_all(payloads)?;
    }
    unit.annotations = fields.string_map("annotations");
    Ok(unit)
}

fn unit_v1(fields: FieldSet) -> Result<Unit, ImportError> {
    build_common(&fields)
}

fn unit_v2(fields: FieldSet) -> Result<Unit, ImportError> {
    let mut unit = build_common(&fields)?;
    unit.model_type = fields
        .opt_str("type")
        .map(|s| s.parse::<ModelType>())
        .transpose()
        .map_err(|e| ImportError::invalid("type", e))?;
    unit.cloud_container = nested(&fields, "cloud-container", CloudContainer::import)?;
    Ok(unit)
}

/// Unit collection versions.
pub static UNITS: VersionTable<Unit> = VersionTable {
    label: "unit",
    plural: "units",
    key: "units",
    shape: Shape::Collection,
    envelope: &[
        Field::required("version", Kind::Int),
        Field::required("units", Kind::List(&Kind::Map)),
    ],
    versions: &[
        Importer {
            schema: &UNIT_V1,
            build: unit_v1,
        },
        Importer {
            schema: &UNIT_V2,
            build: unit_v2,
        },
    ],
};
