//! entities::agent_tools
//!
//! The agent binary installed for an IAAS unit.

use crate::core::dispatch::{ImportError, Importer, Shape, VersionTable};
use crate::core::schema::{Field, FieldSet, Kind, Schema};
use crate::core::value::{MapBuilder, Value};

/// Arguments for constructing [`AgentTools`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentToolsArgs {
    pub version: String,
    pub url: String,
    pub sha256: String,
    pub size: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTools {
    version: String,
    url: String,
    sha256: String,
    size: i64,
}

impl AgentTools {
    pub fn new(args: AgentToolsArgs) -> Self {
        Self {
            version: args.version,
            url: args.url,
            sha256: args.sha256,
            size: args.size,
        }
    }

    /// # Errors
    ///
    /// Returns an [`ImportError`] if the document matches no tools version.
    pub fn import(doc: &Value) -> Result<Self, ImportError> {
        AGENT_TOOLS.import_one(doc)
    }

    pub fn export(&self) -> Value {
        MapBuilder::new()
            .field("version", AGENT_TOOLS.latest())
            .field("tools-version", self.version.as_str())
            .field("url", self.url.as_str())
            .field("sha256", self.sha256.as_str())
            .field("size", self.size)
            .build()
    }

    /// The binary version string, e.g. `2.9.0-ubuntu-amd64`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn size(&self) -> i64 {
        self.size
    }
}

static AGENT_TOOLS_V1: Schema = Schema {
    entity: "agent tools",
    version: 1,
    fields: &[
        Field::required("tools-version", Kind::Str),
        Field::optional("url", Kind::Str),
        Field::optional("sha256", Kind::Str),
        Field::optional("size", Kind::Int),
    ],
};

fn agent_tools_v1(fields: FieldSet) -> Result<AgentTools, ImportError> {
    Ok(AgentTools::new(AgentToolsArgs {
        version: fields.str("tools-version"),
        url: fields.str("url"),
        sha256: fields.str("sha256"),
        size: fields.int("size"),
    }))
}

/// Agent tools document versions.
pub static AGENT_TOOLS: VersionTable<AgentTools> = VersionTable {
    label: "agent tools",
    plural: "agent tools",
    key: "",
    shape: Shape::Inline,
    envelope: &[Field::required("version", Kind::Int)],
    versions: &[Importer {
        schema: &AGENT_TOOLS_V1,
        build: agent_tools_v1,
    }],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn export_shape() {
        let tools = AgentTools::new(AgentToolsArgs {
            version: "3.2.1-ubuntu-amd64".into(),
            url: "some-url".into(),
            sha256: "long-hash".into(),
            size: 123_456_789,
        });
        assert_eq!(
            tools.export(),
            Value::from(json!({
                "version": 1,
                "tools-version": "3.2.1-ubuntu-amd64",
                "url": "some-url",
                "sha256": "long-hash",
                "size": 123_456_789
            }))
        );
        assert_eq!(AgentTools::import(&tools.export()).unwrap(), tools);
    }

    #[test]
    fn size_must_be_int() {
        let doc = Value::from(json!({"version": 1, "tools-version": "x", "size": "big"}));
        assert_eq!(
            AgentTools::import(&doc).unwrap_err().to_string(),
            "agent tools v1 schema check failed: size: expected int, got string(\"big\")"
        );
    }
}
