//! Integration tests for the entity graph.
//!
//! These tests exercise whole-document import and export, reference
//! resolution between units, and configuration-driven validation.

use serde_json::json;

use model_description::core::config::Config;
use model_description::core::types::{ApplicationTag, MachineTag, ModelTag, ModelType, UnitTag, UtcTimestamp};
use model_description::core::value::Value;
use model_description::core::verify::{Relation, ValidationError};
use model_description::entities::agent_tools::AgentToolsArgs;
use model_description::entities::endpoint::{RemoteEndpointArgs, Role};
use model_description::entities::graph::{EntityGraph, GraphError};
use model_description::entities::remote_application::RemoteApplicationArgs;
use model_description::entities::status::StatusArgs;
use model_description::entities::unit::UnitArgs;

// =============================================================================
// Test Helpers
// =============================================================================

fn updated() -> UtcTimestamp {
    UtcTimestamp::parse("2016-01-28T11:50:00Z").unwrap()
}

fn add_unit(graph: &mut EntityGraph, name: &str, principal: Option<&str>, subordinates: &[&str]) {
    let mut args = UnitArgs::new(UnitTag::new(name).unwrap());
    args.model_type = Some(ModelType::Iaas);
    args.machine = Some(MachineTag::new("0").unwrap());
    args.password_hash = "secure-hash".into();
    args.principal = principal.map(|p| UnitTag::new(p).unwrap());
    args.subordinates = subordinates
        .iter()
        .map(|s| UnitTag::new(*s).unwrap())
        .collect();

    let unit = graph.add_unit(args);
    unit.set_agent_status(StatusArgs::new("idle", updated()));
    unit.set_workload_status(StatusArgs::new("active", updated()));
    unit.set_tools(AgentToolsArgs {
        version: "3.2.1-ubuntu-amd64".into(),
        url: "some-url".into(),
        sha256: "long-hash".into(),
        size: 1,
    });
}

fn sample_graph() -> EntityGraph {
    let mut graph = EntityGraph::new();
    let app = graph.add_remote_application(RemoteApplicationArgs::new(
        ApplicationTag::new("mysql").unwrap(),
        ModelTag::new("deadbeef-0bad-400d-8000-4b1d0d06f00d").unwrap(),
    ));
    app.add_endpoint(RemoteEndpointArgs {
        name: "db".into(),
        role: Role::Provider,
        interface: "mysql".into(),
    });
    app.set_status(StatusArgs::new("active", updated()));

    add_unit(&mut graph, "wordpress/0", None, &["logger/0"]);
    add_unit(&mut graph, "logger/0", Some("wordpress/0"), &[]);
    graph
}

// =============================================================================
// Import / Export
// =============================================================================

#[test]
fn empty_graph_shape() {
    assert_eq!(
        EntityGraph::new().export(),
        Value::from(json!({
            "remote-applications": {"version": 3, "remote-applications": []},
            "units": {"version": 2, "units": []}
        }))
    );
}

#[test]
fn missing_collections_import_empty() {
    let graph = EntityGraph::import(&Value::from(json!({}))).unwrap();
    assert!(graph.remote_applications().is_empty());
    assert!(graph.units().is_empty());
}

#[test]
fn round_trip() {
    let graph = sample_graph();
    let imported = EntityGraph::import(&graph.export()).unwrap();
    assert_eq!(imported, graph);
    assert_eq!(imported.export(), graph.export());
}

#[test]
fn json_text_round_trip() {
    let graph = sample_graph();
    let text = serde_json::to_string(&graph.export()).unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(EntityGraph::import(&parsed).unwrap(), graph);
}

#[test]
fn digest_is_stable() {
    let graph = sample_graph();
    let imported = EntityGraph::import(&graph.export()).unwrap();
    assert_eq!(imported.digest(), graph.digest());
    assert_eq!(graph.digest().len(), 64);

    let mut other = sample_graph();
    add_unit(&mut other, "extra/0", None, &[]);
    assert_ne!(other.digest(), graph.digest());
}

#[test]
fn unit_without_statuses_does_not_import() {
    let mut graph = sample_graph();
    graph.add_unit(UnitArgs::new(UnitTag::new("bare/0").unwrap()));
    assert_eq!(
        EntityGraph::import(&graph.export()).unwrap_err().to_string(),
        "unit 2 v2 schema check failed: agent-status: expected map, got nothing"
    );
}

#[test]
fn collection_error_surfaces() {
    let doc = Value::from(json!({
        "remote-applications": {"version": 1, "remote-applications": [1234]}
    }));
    assert!(matches!(
        EntityGraph::import(&doc),
        Err(GraphError::Import(_))
    ));
}

#[test]
fn collection_must_be_map() {
    let doc = Value::from(json!({"units": []}));
    assert_eq!(
        EntityGraph::import(&doc).unwrap_err().to_string(),
        "entity graph schema check failed: units: expected map, got list"
    );
}

// =============================================================================
// References
// =============================================================================

#[test]
fn references_resolve() {
    let graph = sample_graph();
    let logger = graph.unit(&UnitTag::new("logger/0").unwrap()).unwrap();
    let principal = graph.unit(logger.principal().unwrap()).unwrap();
    assert_eq!(principal.name(), "wordpress/0");
    assert!(graph.dangling_references().is_empty());
}

#[test]
fn dangling_references_are_not_import_errors() {
    let mut graph = EntityGraph::new();
    add_unit(&mut graph, "logger/0", Some("wordpress/0"), &[]);
    add_unit(&mut graph, "mysql/0", None, &["nrpe/0", "logger/0"]);

    let imported = EntityGraph::import(&graph.export()).unwrap();
    assert_eq!(
        imported.dangling_references(),
        vec![
            ValidationError::DanglingReference {
                unit: UnitTag::new("logger/0").unwrap(),
                relation: Relation::Principal,
                target: UnitTag::new("wordpress/0").unwrap(),
            },
            ValidationError::DanglingReference {
                unit: UnitTag::new("mysql/0").unwrap(),
                relation: Relation::Subordinate,
                target: UnitTag::new("nrpe/0").unwrap(),
            },
        ]
    );
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn valid_graph_validates() {
    let strict = Config::parse("reference_policy = \"error\"").unwrap();
    assert!(sample_graph().validate(&strict).is_ok());
}

#[test]
fn invalid_unit_fails_validation() {
    let mut graph = sample_graph();
    let mut args = UnitArgs::new(UnitTag::new("bare/0").unwrap());
    args.model_type = Some(ModelType::Iaas);
    graph.add_unit(args);
    assert_eq!(
        graph.validate(&Config::default()).unwrap_err().to_string(),
        "unit \"bare/0\" missing agent status not valid"
    );
}

#[test]
fn invalid_binding_fails_validation() {
    let mut graph = EntityGraph::new();
    graph.add_remote_application(RemoteApplicationArgs {
        bindings: [("website".to_string(), "public".to_string())]
            .into_iter()
            .collect(),
        ..RemoteApplicationArgs::new(
            ApplicationTag::new("haproxy").unwrap(),
            ModelTag::new("abcd-1234").unwrap(),
        )
    });
    assert!(matches!(
        graph.validate(&Config::default()),
        Err(ValidationError::UnknownBinding { .. })
    ));
}

#[test]
fn import_with_skips_validation_by_default() {
    let mut graph = sample_graph();
    add_unit(&mut graph, "orphan/0", Some("gone/0"), &[]);
    let doc = graph.export();
    assert!(EntityGraph::import_with(&doc, &Config::default()).is_ok());

    let strict = Config::parse("validate_on_import = true\nreference_policy = \"error\"").unwrap();
    assert_eq!(
        EntityGraph::import_with(&doc, &strict).unwrap_err().to_string(),
        "unit \"orphan/0\" principal \"gone/0\" not found"
    );
}
