//! entities::constraints
//!
//! Placement constraints. Every field is optional and omitted from exported
//! documents when empty or zero.
//!
//! # Versions
//!
//! - v1: architecture, container, cores, cpu-power, instance-type, memory,
//!   root-disk, spaces, tags
//! - v2: adds `virt-type` and `zones`

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::value::{MapBuilder, Value};

/// Arguments for constructing [`Constraints`]. Sizes are in MiB.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintsArgs {
    pub architecture: String,
    pub container: String,
    pub cores: i64,
    pub cpu_power: i64,
    pub instance_type: String,
    pub memory: i64,
    pub root_disk: i64,
    pub spaces: Vec<String>,
    pub tags: Vec<String>,
    pub virt_type: String,
    pub zones: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    architecture: String,
    container: String,
    cores: i64,
    cpu_power: i64,
    instance_type: String,
    memory: i64,
    root_disk: i64,
    spaces: Vec<String>,
    tags: Vec<String>,
    virt_type: String,
    zones: Vec<String>,
}

impl Constraints {
    pub fn new(args: ConstraintsArgs) -> Self {
        Self {
            architecture: args.architecture,
            container: args.container,
            cores: args.cores,
            cpu_power: args.cpu_power,
            instance_type: args.instance_type,
            memory: args.memory,
            root_disk: args.root_disk,
            spaces: args.spaces,
            tags: args.tags,
            virt_type: args.virt_type,
            zones: args.zones,
        }
    }

    /// # Errors
    ///
    /// Returns an [`ImportError`] if the document matches no constraints
    /// version.
    pub fn import(doc: &Value) -> Result<Self, ImportError> {
        CONSTRAINTS.import_one(doc)
    }

    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("version", CONSTRAINTS.latest())
            .str_nonempty("architecture", &self.architecture)
            .str_nonempty("container", &self.container)
            .int_nonzero("cores", self.cores)
            .int_nonzero("cpu-power", self.cpu_power)
            .str_nonempty("instance-type", &self.instance_type)
            .int_nonzero("memory", self.memory)
            .int_nonzero("root-disk", self.root_disk)
            .list_nonempty("spaces", &self.spaces)
            .list_nonempty("tags", &self.tags)
            .str_nonempty("virt-type", &self.virt_type)
            .list_nonempty("zones", &self.zones)
            .build()
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn cores(&self) -> i64 {
        self.cores
    }

    pub fn cpu_power(&self) -> i64 {
        self.cpu_power
    }

    pub fn instance_type(&self) -> &str {
        &self.instance_type
    }

    pub fn memory(&self) -> i64 {
        self.memory
    }

    pub fn root_disk(&self) -> i64 {
        self.root_disk
    }

    pub fn spaces(&self) -> &[String] {
        &self.spaces
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn virt_type(&self) -> &str {
        &self.virt_type
    }

    pub fn zones(&self) -> &[String] {
        &self.zones
    }
}

const V1_FIELDS: [Field; 9] = [
    Field::optional("architecture", Kind::Str),
    Field::optional("container", Kind::Str),
    Field::optional("cores", Kind::Int),
    Field::optional("cpu-power", Kind::Int),
    Field::optional("instance-type", Kind::Str),
    Field::optional("memory", Kind::Int),
    Field::optional("root-disk", Kind::Int),
    Field::optional("spaces", Kind::List(&Kind::Str)),
    Field::optional("tags", Kind::List(&Kind::Str)),
];

static CONSTRAINTS_V1: Schema = Schema {
    entity: "constraints",
    version: 1,
    fields: &V1_FIELDS,
};

static CONSTRAINTS_V2: Schema = Schema {
    entity: "constraints",
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
        Field::optional("virt-type", Kind::Str),
        Field::optional("zones", Kind::List(&Kind::Str)),
    ],
};

fn v1_args(fields: &FieldSet) -> ConstraintsArgs {
    ConstraintsArgs {
        architecture: fields.str("architecture"),
        container: fields.str("container"),
        cores: fields.int("cores"),
        cpu_power: fields.int("cpu-power"),
        instance_type: fields.str("instance-type"),
        memory: fields.int("memory"),
        root_disk: fields.int("root-disk"),
        spaces: fields.strings("spaces"),
        tags: fields.strings("tags"),
        ..Default::default()
    }
}

fn constraints_v1(fields: FieldSet) -> Result<Constraints, ImportError> {
    Ok(Constraints::new(v1_args(&fields)))
}

fn constraints_v2(fields: FieldSet) -> Result<Constraints, ImportError> {
    Ok(Constraints::new(ConstraintsArgs {
        virt_type: fields.str("virt-type"),
        zones: fields.strings("zones"),
        ..v1_args(&fields)
    }))
}

/// Constraints document versions.
pub static CONSTRAINTS: VersionTable<Constraints> = VersionTable {
    label: "constraints",
    plural: "constraints",
    key: "",
    shape: Shape::Inline,
    envelope: &[Field::required("version", Kind::Int)],
    versions: &[
        Importer {
            schema: &CONSTRAINTS_V1,
            build: constraints_v1,
        },
        Importer {
            schema: &CONSTRAINTS_V2,
            build: constraints_v2,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GIG: i64 = 1024;

    fn all_args() -> ConstraintsArgs {
        ConstraintsArgs {
            architecture: "amd64".into(),
            container: "lxd".into(),
            cores: 8,
            cpu_power: 4000,
            instance_type: "magic".into(),
            memory: 16 * GIG,
            root_disk: 200 * GIG,
            spaces: vec!["my".into(), "own".into()],
            tags: vec!["much".into(), "strong".into()],
            virt_type: "kvm".into(),
            zones: vec!["az1".into()],
        }
    }

    #[test]
    fn table_is_contiguous() {
        assert!(CONSTRAINTS.is_contiguous());
        assert_eq!(CONSTRAINTS.latest(), 2);
    }

    #[test]
    fn empty_exports_only_version() {
        let constraints = Constraints::default();
        assert_eq!(constraints.export(), Value::from(json!({"version": 2})));
    }

    #[test]
    fn full_round_trip() {
        let constraints = Constraints::new(all_args());
        assert_eq!(Constraints::import(&constraints.export()).unwrap(), constraints);
    }

    #[test]
    fn version_one_drops_later_fields() {
        let mut doc = Constraints::new(all_args()).export();
        if let Some(version) = doc.get_mut("version") {
            *version = Value::from(1);
        }
        let imported = Constraints::import(&doc).unwrap();
        assert_eq!(imported.virt_type(), "");
        assert!(imported.zones().is_empty());
        assert_eq!(imported.memory(), 16 * GIG);
    }

    #[test]
    fn bad_cores() {
        let doc = Value::from(json!({"version": 2, "cores": "many"}));
        assert_eq!(
            Constraints::import(&doc).unwrap_err().to_string(),
            "constraints v2 schema check failed: cores: expected int, got string(\"many\")"
        );
    }
}
